use crate::{
    error::MenuError,
    menu_item::{MenuChange, MenuItem, RowRendering},
    subscription::{StatusSubscription, SubscriptionId},
    tunnel::{Tunnel, TunnelKey},
    tunnels_manager::TunnelsManager,
};

/// Rows above the tunnel list: the status row and the networks row.
pub const SUMMARY_ROWS: usize = 2;

/// A tunnel's menu row together with the status subscription that keeps it
/// current. The row refers to its tunnel by key only.
#[derive(Debug)]
pub struct TunnelRow {
    title: String,
    checked: bool,
    key: TunnelKey,
    subscription: StatusSubscription,
}

impl TunnelRow {
    fn new(tunnel: &Tunnel, subscription: StatusSubscription, rendering: RowRendering) -> Self {
        let (title, checked) = rendering.render(tunnel);
        Self {
            title,
            checked,
            key: tunnel.key(),
            subscription,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn checked(&self) -> bool {
        self.checked
    }

    pub fn key(&self) -> TunnelKey {
        self.key
    }

    pub fn subscription_id(&self) -> SubscriptionId {
        self.subscription.id()
    }

    pub fn item(&self) -> MenuItem {
        MenuItem::Tunnel {
            title: self.title.clone(),
            checked: self.checked,
            key: self.key,
        }
    }
}

/// Tunnel rows of the menu, index-aligned with the tunnels manager.
///
/// Row `i` sits at menu position `base_offset + i`. A separator follows the
/// last row whenever there is at least one row. Every edit is also recorded
/// as a [`MenuChange`] until [`TunnelList::take_changes`] collects it.
pub struct TunnelList {
    rows: Vec<TunnelRow>,
    base_offset: usize,
    rendering: RowRendering,
    changes: Vec<MenuChange>,
}

impl TunnelList {
    pub fn initialize(tunnels: &TunnelsManager, rendering: RowRendering) -> Self {
        let rows = tunnels
            .iter()
            .map(|tunnel| TunnelRow::new(tunnel, tunnels.observe_status(tunnel.key()), rendering))
            .collect();
        let list = Self {
            rows,
            base_offset: SUMMARY_ROWS + 1,
            rendering,
            changes: Vec::new(),
        };
        list.check_invariants();
        list
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn base_offset(&self) -> usize {
        self.base_offset
    }

    pub fn rows(&self) -> &[TunnelRow] {
        &self.rows
    }

    pub fn separator_position(&self) -> Option<usize> {
        (!self.rows.is_empty()).then(|| self.base_offset + self.rows.len())
    }

    /// Menu items owned by the list: the rows, then the trailing separator.
    pub fn items(&self) -> impl Iterator<Item = MenuItem> + '_ {
        self.rows
            .iter()
            .map(TunnelRow::item)
            .chain(self.separator_position().map(|_| MenuItem::Separator))
    }

    pub fn row_index_at(&self, position: usize) -> Option<usize> {
        position
            .checked_sub(self.base_offset)
            .filter(|index| *index < self.rows.len())
    }

    pub fn index_of_subscription(&self, id: SubscriptionId) -> Option<usize> {
        self.rows.iter().position(|row| row.subscription_id() == id)
    }

    pub fn take_changes(&mut self) -> Vec<MenuChange> {
        std::mem::take(&mut self.changes)
    }

    /// Inserts a row for `tunnel` at `index`. The row is rendered from the
    /// live tunnel when the manager still has it, else from `tunnel` itself,
    /// so a tunnel removed before its `Added` event is handled still gets a
    /// row for the queued `Removed` to take away.
    pub fn insert(
        &mut self,
        tunnels: &TunnelsManager,
        tunnel: &Tunnel,
        index: usize,
    ) -> Result<(), MenuError> {
        self.check_index(index, self.rows.len() + 1)?;
        let key = tunnel.key();
        let current = tunnels.tunnel(key).unwrap_or(tunnel);

        let row = TunnelRow::new(current, tunnels.observe_status(key), self.rendering);
        let was_empty = self.rows.is_empty();
        let position = self.base_offset + index;
        self.changes.push(MenuChange::Insert {
            position,
            item: row.item(),
        });
        self.rows.insert(index, row);

        if was_empty {
            self.changes.push(MenuChange::Insert {
                position: position + 1,
                item: MenuItem::Separator,
            });
        }
        log::debug!("[menu] inserted row {index} for {key}");
        self.check_invariants();
        Ok(())
    }

    /// Removes the row at `index`. Its subscription is released with it.
    pub fn remove(&mut self, index: usize) -> Result<(), MenuError> {
        self.check_index(index, self.rows.len())?;

        let row = self.rows.remove(index);
        self.changes.push(MenuChange::Remove {
            position: self.base_offset + index,
        });
        if self.rows.is_empty() {
            self.changes.push(MenuChange::Remove {
                position: self.base_offset,
            });
        }
        log::debug!("[menu] removed row {index} for {}", row.key);
        drop(row);
        self.check_invariants();
        Ok(())
    }

    /// Relocates the row at `from` to `to`, keeping its title, tunnel key and
    /// subscription. The trailing separator is untouched.
    pub fn move_row(&mut self, from: usize, to: usize) -> Result<(), MenuError> {
        self.check_index(from, self.rows.len())?;
        self.check_index(to, self.rows.len())?;

        let row = self.rows.remove(from);
        self.changes.push(MenuChange::Remove {
            position: self.base_offset + from,
        });
        self.changes.push(MenuChange::Insert {
            position: self.base_offset + to,
            item: row.item(),
        });
        self.rows.insert(to, row);
        log::debug!("[menu] moved row {from} -> {to}");
        self.check_invariants();
        Ok(())
    }

    pub fn update_title_and_checkmark(
        &mut self,
        tunnels: &TunnelsManager,
        index: usize,
    ) -> Result<(), MenuError> {
        self.check_index(index, self.rows.len())?;
        let row = &mut self.rows[index];
        let tunnel = tunnels.tunnel(row.key).ok_or(MenuError::StaleTunnel(row.key))?;

        let (title, checked) = self.rendering.render(tunnel);
        row.title = title;
        row.checked = checked;
        self.changes.push(MenuChange::Update {
            position: self.base_offset + index,
            item: row.item(),
        });
        Ok(())
    }

    fn check_index(&self, index: usize, bound: usize) -> Result<(), MenuError> {
        if index < bound {
            Ok(())
        } else {
            Err(MenuError::IndexOutOfRange {
                index,
                len: self.rows.len(),
            })
        }
    }

    fn check_invariants(&self) {
        debug_assert!(
            self.rows.iter().all(|row| row.subscription.key() == row.key),
            "tunnel row and subscription refer to different tunnels"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{tunnel::TunnelStatus, tunnels_manager::TunnelEvent};

    fn manager(names: &[&str]) -> TunnelsManager {
        let (manager, _events) = TunnelsManager::with_tunnels(
            names.iter().map(|name| (name.to_string(), Vec::new())),
        );
        manager
    }

    fn keys(list: &TunnelList) -> Vec<TunnelKey> {
        list.rows().iter().map(TunnelRow::key).collect()
    }

    fn titles(list: &TunnelList) -> Vec<&str> {
        list.rows().iter().map(TunnelRow::title).collect()
    }

    #[test]
    fn initialize_builds_one_row_per_tunnel() {
        let tunnels = manager(&["a", "b", "c"]);
        let list = TunnelList::initialize(&tunnels, RowRendering::default());

        assert_eq!(list.base_offset(), 3);
        assert_eq!(titles(&list), vec!["a", "b", "c"]);
        assert_eq!(tunnels.observer_count(), 3);
        assert_eq!(list.separator_position(), Some(6));
        assert_eq!(list.items().count(), 4);
    }

    #[test]
    fn empty_list_has_no_separator() {
        let tunnels = manager(&[]);
        let list = TunnelList::initialize(&tunnels, RowRendering::default());
        assert_eq!(list.separator_position(), None);
        assert_eq!(list.items().count(), 0);
    }

    #[test]
    fn first_insert_adds_the_separator_and_last_remove_drops_it() {
        let (mut tunnels, _events) = TunnelsManager::new();
        let mut list = TunnelList::initialize(&tunnels, RowRendering::default());
        tunnels.add("a", vec![]).unwrap();
        let tunnel = tunnels.tunnel_at(0).unwrap().clone();
        let key = tunnel.key();

        list.insert(&tunnels, &tunnel, 0).unwrap();
        assert_eq!(
            list.take_changes(),
            vec![
                MenuChange::Insert {
                    position: 3,
                    item: MenuItem::Tunnel {
                        title: "a".into(),
                        checked: false,
                        key
                    }
                },
                MenuChange::Insert {
                    position: 4,
                    item: MenuItem::Separator
                },
            ]
        );
        assert_eq!(list.separator_position(), Some(4));

        list.remove(0).unwrap();
        assert_eq!(
            list.take_changes(),
            vec![
                MenuChange::Remove { position: 3 },
                MenuChange::Remove { position: 3 },
            ]
        );
        assert_eq!(list.separator_position(), None);
    }

    #[test]
    fn out_of_range_indices_fail_without_mutation() {
        let tunnels = manager(&["a", "b"]);
        let mut list = TunnelList::initialize(&tunnels, RowRendering::default());
        let tunnel = tunnels.tunnel_at(0).unwrap().clone();

        assert_eq!(
            list.insert(&tunnels, &tunnel, 3),
            Err(MenuError::IndexOutOfRange { index: 3, len: 2 })
        );
        assert_eq!(
            list.remove(2),
            Err(MenuError::IndexOutOfRange { index: 2, len: 2 })
        );
        assert_eq!(
            list.move_row(0, 2),
            Err(MenuError::IndexOutOfRange { index: 2, len: 2 })
        );
        assert_eq!(
            list.update_title_and_checkmark(&tunnels, 5),
            Err(MenuError::IndexOutOfRange { index: 5, len: 2 })
        );
        assert_eq!(titles(&list), vec!["a", "b"]);
        assert!(list.take_changes().is_empty());
        assert_eq!(tunnels.observer_count(), 2);
    }

    #[test]
    fn move_preserves_row_and_subscription_pairing() {
        let tunnels = manager(&["x", "y", "z"]);
        let mut list = TunnelList::initialize(&tunnels, RowRendering::default());
        let before = keys(&list);
        let subscriptions: Vec<_> = list.rows().iter().map(TunnelRow::subscription_id).collect();

        list.move_row(0, 2).unwrap();

        assert_eq!(titles(&list), vec!["y", "z", "x"]);
        assert_eq!(keys(&list), vec![before[1], before[2], before[0]]);
        assert_eq!(
            list.rows()
                .iter()
                .map(TunnelRow::subscription_id)
                .collect::<Vec<_>>(),
            vec![subscriptions[1], subscriptions[2], subscriptions[0]]
        );
        assert_eq!(list.separator_position(), Some(6));
        assert_eq!(tunnels.observer_count(), 3);
    }

    #[test]
    fn removal_releases_the_subscription() {
        let (mut tunnels, mut events) =
            TunnelsManager::with_tunnels([("a".to_string(), vec![]), ("b".to_string(), vec![])]);
        let mut list = TunnelList::initialize(&tunnels, RowRendering::default());
        let removed = list.rows()[0].subscription_id();
        let key = list.rows()[0].key();

        list.remove(0).unwrap();

        assert_eq!(tunnels.observer_count(), 1);
        assert_eq!(list.index_of_subscription(removed), None);
        tunnels.set_status(key, TunnelStatus::Active).unwrap();
        assert_eq!(events.try_next(), None::<TunnelEvent>);
    }

    #[test]
    fn update_rerenders_from_the_live_tunnel() {
        let (mut tunnels, _events) = TunnelsManager::with_tunnels([("a".to_string(), vec![])]);
        let mut list = TunnelList::initialize(&tunnels, RowRendering::default());
        let key = list.rows()[0].key();
        let subscription = list.rows()[0].subscription_id();

        tunnels.modify(key, "b", vec![]).unwrap();
        tunnels.set_status(key, TunnelStatus::Active).unwrap();
        list.update_title_and_checkmark(&tunnels, 0).unwrap();

        assert_eq!(list.rows()[0].title(), "b");
        assert!(list.rows()[0].checked());
        assert_eq!(list.rows()[0].subscription_id(), subscription);
    }

    #[test]
    fn stale_tunnel_keys_are_detected() {
        let (mut tunnels, _events) = TunnelsManager::with_tunnels([("a".to_string(), vec![])]);
        let mut list = TunnelList::initialize(&tunnels, RowRendering::default());
        let key = list.rows()[0].key();
        tunnels.remove(key).unwrap();

        assert_eq!(
            list.update_title_and_checkmark(&tunnels, 0),
            Err(MenuError::StaleTunnel(key))
        );
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn insert_falls_back_to_the_added_snapshot() {
        let (mut tunnels, _events) = TunnelsManager::new();
        let mut list = TunnelList::initialize(&tunnels, RowRendering::default());
        tunnels.add("gone", vec![]).unwrap();
        let snapshot = tunnels.tunnel_at(0).unwrap().clone();
        tunnels.remove(snapshot.key()).unwrap();

        list.insert(&tunnels, &snapshot, 0).unwrap();

        assert_eq!(titles(&list), vec!["gone"]);
        assert_eq!(keys(&list), vec![snapshot.key()]);
        list.remove(0).unwrap();
        assert!(list.is_empty());
        assert_eq!(tunnels.observer_count(), 0);
    }

    #[test]
    fn rows_track_a_model_through_mixed_operations() {
        let (mut tunnels, _events) = TunnelsManager::new();
        for name in ["a", "b", "c", "d", "e"] {
            tunnels.add(name, vec![]).unwrap();
        }
        let all: Vec<_> = tunnels.iter().cloned().collect();
        let mut list = TunnelList::initialize(&manager(&[]), RowRendering::default());
        let mut model: Vec<TunnelKey> = Vec::new();

        let check = |list: &TunnelList, model: &[TunnelKey]| {
            assert_eq!(keys(list), model);
            assert_eq!(list.len(), model.len());
            assert_eq!(list.separator_position().is_some(), !model.is_empty());
        };

        for (index, tunnel) in [(0, &all[0]), (1, &all[1]), (0, &all[2]), (3, &all[3])] {
            list.insert(&tunnels, tunnel, index).unwrap();
            model.insert(index, tunnel.key());
            check(&list, &model);
        }
        for (from, to) in [(0, 3), (2, 1), (3, 3)] {
            list.move_row(from, to).unwrap();
            let key = model.remove(from);
            model.insert(to, key);
            check(&list, &model);
        }
        for index in [1, 2, 0, 0] {
            list.remove(index).unwrap();
            model.remove(index);
            check(&list, &model);
        }
        assert!(list.is_empty());
    }
}
