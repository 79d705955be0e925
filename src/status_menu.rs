use std::error::Error;

use crate::{
    error::MenuError,
    menu_item::{MenuChange, MenuCommand, MenuItem, RowRendering},
    strings::Strings,
    summary::SummaryProjector,
    tunnel::TunnelKey,
    tunnel_list::{TunnelList, TunnelRow},
    tunnels_manager::{TunnelEvent, TunnelEvents, TunnelsManager},
};

const STATUS_POSITION: usize = 0;
const NETWORKS_POSITION: usize = 1;

/// What the menu needs from the application presenting it.
pub trait MenuHost {
    fn show_manage_tunnels(&mut self);
    fn import_tunnels(&mut self);
    fn show_about(&mut self);
    fn quit(&mut self);
    fn show_alert(&mut self, error: &dyn Error);
}

pub struct StatusMenu {
    strings: Strings,
    summary: SummaryProjector,
    list: TunnelList,
    changes: Vec<MenuChange>,
}

impl StatusMenu {
    pub fn new(tunnels: &TunnelsManager, strings: Strings, rendering: RowRendering) -> Self {
        let mut summary = SummaryProjector::new(&strings);
        let source = tunnels
            .iter()
            .find(|tunnel| summary.update(tunnel, true, &strings));
        match source {
            Some(tunnel) => log::info!("[menu] summary initialized from {:?}", tunnel.name()),
            None => log::info!("[menu] no operational tunnel, summary left inactive"),
        }

        let list = TunnelList::initialize(tunnels, rendering);
        log::info!("[menu] built with {} tunnel rows", list.len());
        Self {
            strings,
            summary,
            list,
            changes: Vec::new(),
        }
    }

    pub fn summary(&self) -> &SummaryProjector {
        &self.summary
    }

    pub fn tunnel_rows(&self) -> &[TunnelRow] {
        self.list.rows()
    }

    pub fn base_offset(&self) -> usize {
        self.list.base_offset()
    }

    /// The whole menu, top to bottom.
    pub fn items(&self) -> Vec<MenuItem> {
        let mut items = vec![
            self.summary.status_item(),
            self.summary.networks_item(),
            MenuItem::Separator,
        ];
        items.extend(self.list.items());
        items.extend([
            self.command(MenuCommand::ManageTunnels, "menu.manage_tunnels"),
            self.command(MenuCommand::ImportTunnels, "menu.import_tunnels"),
            MenuItem::Separator,
            self.command(MenuCommand::About, "menu.about"),
            self.command(MenuCommand::Quit, "menu.quit"),
        ]);
        items
    }

    /// Edits made since the last call, in the order they were made.
    pub fn take_changes(&mut self) -> Vec<MenuChange> {
        self.flush_list_changes();
        std::mem::take(&mut self.changes)
    }

    /// Handles every queued event. Stops at the first event that does not
    /// match the menu's rows.
    pub fn process_events(
        &mut self,
        tunnels: &TunnelsManager,
        events: &mut TunnelEvents,
    ) -> Result<usize, MenuError> {
        let mut handled = 0;
        while let Some(event) = events.try_next() {
            self.handle_event(tunnels, event)?;
            handled += 1;
        }
        Ok(handled)
    }

    pub fn handle_event(
        &mut self,
        tunnels: &TunnelsManager,
        event: TunnelEvent,
    ) -> Result<(), MenuError> {
        log::trace!("[menu] {event:?}");
        match event {
            TunnelEvent::Added { index, tunnel } => self.list.insert(tunnels, &tunnel, index),
            TunnelEvent::Modified { index, key } => {
                self.expect_row(index, key)?;
                self.refresh(tunnels, index, key)
            }
            TunnelEvent::Moved { from, to, key } => {
                self.expect_row(from, key)?;
                self.list.move_row(from, to)
            }
            TunnelEvent::Removed { index, key } => {
                self.expect_row(index, key)?;
                self.list.remove(index)
            }
            TunnelEvent::StatusChanged { subscription, key } => {
                match self.list.index_of_subscription(subscription) {
                    Some(index) => self.refresh(tunnels, index, key),
                    None => {
                        log::debug!("[menu] ignoring notification from released {subscription:?}");
                        Ok(())
                    }
                }
            }
        }
    }

    /// Acts on a click at `position`. Tunnel rows toggle their tunnel:
    /// unchecked rows request activation, checked rows deactivation.
    /// Activation failures go to the host's alert and change nothing here.
    pub fn select(
        &mut self,
        position: usize,
        tunnels: &mut TunnelsManager,
        host: &mut dyn MenuHost,
    ) -> Result<(), MenuError> {
        if let Some(index) = self.list.row_index_at(position) {
            let row = &self.list.rows()[index];
            let key = row.key();
            let result = if row.checked() {
                tunnels.start_deactivation(key)
            } else {
                tunnels.start_activation(key)
            };
            if let Err(error) = result {
                log::warn!("[menu] {key}: {error}");
                host.show_alert(&error);
            }
            return Ok(());
        }

        match self.items().get(position) {
            Some(MenuItem::Command { command, .. }) => {
                log::info!("[menu] command {command:?}");
                match command {
                    MenuCommand::ManageTunnels => host.show_manage_tunnels(),
                    MenuCommand::ImportTunnels => host.import_tunnels(),
                    MenuCommand::About => host.show_about(),
                    MenuCommand::Quit => host.quit(),
                }
                Ok(())
            }
            _ => Err(MenuError::NotSelectable(position)),
        }
    }

    /// Re-renders row `index` and offers its tunnel to the summary. A tunnel
    /// the manager no longer has is skipped: its `Removed` event is still
    /// queued and will take the row away.
    fn refresh(
        &mut self,
        tunnels: &TunnelsManager,
        index: usize,
        key: TunnelKey,
    ) -> Result<(), MenuError> {
        let Some(tunnel) = tunnels.tunnel(key) else {
            log::debug!("[menu] {key} is gone, skipping refresh of row {index}");
            return Ok(());
        };
        self.list.update_title_and_checkmark(tunnels, index)?;
        if self.summary.update(tunnel, false, &self.strings) {
            self.flush_list_changes();
            self.changes.push(MenuChange::Update {
                position: STATUS_POSITION,
                item: self.summary.status_item(),
            });
            self.changes.push(MenuChange::Update {
                position: NETWORKS_POSITION,
                item: self.summary.networks_item(),
            });
        }
        Ok(())
    }

    fn expect_row(&self, index: usize, key: TunnelKey) -> Result<(), MenuError> {
        let row = self
            .list
            .rows()
            .get(index)
            .ok_or(MenuError::IndexOutOfRange {
                index,
                len: self.list.len(),
            })?;
        if row.key() != key {
            return Err(MenuError::EventMismatch {
                index,
                expected: key,
                found: row.key(),
            });
        }
        Ok(())
    }

    fn flush_list_changes(&mut self) {
        self.changes.extend(self.list.take_changes());
    }

    fn command(&self, command: MenuCommand, key: &str) -> MenuItem {
        MenuItem::Command {
            title: self.strings.translate(key),
            command,
        }
    }
}
