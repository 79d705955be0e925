use std::{cell::RefCell, rc::Rc};

use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::{
    error::{ActivationError, MenuError},
    subscription::{ObserverRegistry, StatusSubscription, SubscriptionId},
    tunnel::{Tunnel, TunnelKey, TunnelStatus},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TunnelEvent {
    /// Carries the tunnel as it was when added, so the row can still be
    /// built if the tunnel is gone by the time the event is handled.
    Added {
        index: usize,
        tunnel: Tunnel,
    },
    Modified {
        index: usize,
        key: TunnelKey,
    },
    Moved {
        from: usize,
        to: usize,
        key: TunnelKey,
    },
    Removed {
        index: usize,
        key: TunnelKey,
    },
    StatusChanged {
        subscription: SubscriptionId,
        key: TunnelKey,
    },
}

/// Receiving side of the manager's event feed.
pub struct TunnelEvents {
    receiver: UnboundedReceiver<TunnelEvent>,
}

impl TunnelEvents {
    /// Next queued event, without waiting. `None` once the queue is empty.
    pub fn try_next(&mut self) -> Option<TunnelEvent> {
        self.receiver.try_recv().ok()
    }

    pub fn drain(&mut self) -> Vec<TunnelEvent> {
        std::iter::from_fn(|| self.try_next()).collect()
    }
}

/// The ordered tunnel collection.
///
/// Tunnels are kept sorted by case-insensitive name. Every mutation is
/// published on the event feed before the call returns, so a consumer that
/// drains the feed after each call always sees indices that are valid for
/// the list as it was right after the corresponding mutation.
pub struct TunnelsManager {
    tunnels: Vec<Tunnel>,
    next_key: u64,
    observers: Rc<RefCell<ObserverRegistry>>,
    events: UnboundedSender<TunnelEvent>,
}

impl TunnelsManager {
    pub fn new() -> (Self, TunnelEvents) {
        let (sender, receiver) = mpsc::unbounded();
        let manager = Self {
            tunnels: Vec::new(),
            next_key: 0,
            observers: Rc::new(RefCell::new(ObserverRegistry::default())),
            events: sender,
        };
        (manager, TunnelEvents { receiver })
    }

    /// Builds a manager pre-populated with `tunnels` without publishing
    /// `Added` events for them. Duplicate names are skipped.
    pub fn with_tunnels(
        tunnels: impl IntoIterator<Item = (String, Vec<String>)>,
    ) -> (Self, TunnelEvents) {
        let (mut manager, events) = Self::new();
        for (name, addresses) in tunnels {
            if manager.tunnel_named(&name).is_some() {
                log::warn!("[tunnels] skipping duplicate tunnel name {name:?}");
                continue;
            }
            let index = manager.sorted_index(&name);
            let key = manager.allocate_key();
            manager.tunnels.insert(index, Tunnel::new(key, name, addresses));
        }
        log::info!("[tunnels] loaded {} tunnels", manager.tunnels.len());
        (manager, events)
    }

    pub fn len(&self) -> usize {
        self.tunnels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tunnels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tunnel> {
        self.tunnels.iter()
    }

    pub fn tunnel_at(&self, index: usize) -> Option<&Tunnel> {
        self.tunnels.get(index)
    }

    pub fn tunnel(&self, key: TunnelKey) -> Option<&Tunnel> {
        self.tunnels.iter().find(|tunnel| tunnel.key() == key)
    }

    pub fn index_of(&self, key: TunnelKey) -> Option<usize> {
        self.tunnels.iter().position(|tunnel| tunnel.key() == key)
    }

    pub fn tunnel_named(&self, name: &str) -> Option<&Tunnel> {
        self.tunnels.iter().find(|tunnel| tunnel.name() == name)
    }

    pub fn observe_status(&self, key: TunnelKey) -> StatusSubscription {
        StatusSubscription::register(&self.observers, key)
    }

    /// Number of live status subscriptions across all tunnels.
    pub fn observer_count(&self) -> usize {
        self.observers.borrow().len()
    }

    pub fn add(&mut self, name: &str, addresses: Vec<String>) -> Result<usize, MenuError> {
        if self.tunnel_named(name).is_some() {
            return Err(MenuError::DuplicateName(name.to_string()));
        }
        let index = self.sorted_index(name);
        let key = self.allocate_key();
        let tunnel = Tunnel::new(key, name.to_string(), addresses);
        self.tunnels.insert(index, tunnel.clone());
        log::info!("[tunnels] added {name:?} at {index}");
        self.publish(TunnelEvent::Added { index, tunnel });
        Ok(index)
    }

    /// Replaces a tunnel's name and addresses. A rename that changes the
    /// sort position publishes `Moved` before `Modified`.
    pub fn modify(
        &mut self,
        key: TunnelKey,
        name: &str,
        addresses: Vec<String>,
    ) -> Result<usize, MenuError> {
        let from = self.index_of(key).ok_or(MenuError::StaleTunnel(key))?;
        if self.tunnels[from].name() != name && self.tunnel_named(name).is_some() {
            return Err(MenuError::DuplicateName(name.to_string()));
        }

        let mut tunnel = self.tunnels.remove(from);
        tunnel.set_name(name.to_string());
        tunnel.set_addresses(addresses);
        let to = self.sorted_index(name);
        self.tunnels.insert(to, tunnel);

        if from != to {
            log::info!("[tunnels] {name:?} moved {from} -> {to}");
            self.publish(TunnelEvent::Moved { from, to, key });
        }
        self.publish(TunnelEvent::Modified { index: to, key });
        Ok(to)
    }

    pub fn remove(&mut self, key: TunnelKey) -> Result<Tunnel, MenuError> {
        let index = self.index_of(key).ok_or(MenuError::StaleTunnel(key))?;
        let tunnel = self.tunnels.remove(index);
        log::info!("[tunnels] removed {:?} from {index}", tunnel.name());
        self.publish(TunnelEvent::Removed { index, key });
        Ok(tunnel)
    }

    /// Records a status reported by the connection layer and notifies every
    /// live subscription of that tunnel. A tunnel reaching `inactive` starts
    /// the tunnel waiting on it, if any.
    pub fn set_status(&mut self, key: TunnelKey, status: TunnelStatus) -> Result<(), MenuError> {
        let index = self.index_of(key).ok_or(MenuError::StaleTunnel(key))?;
        self.apply_status(index, status);

        if status == TunnelStatus::Inactive && !self.has_operational_tunnel() {
            let waiting = self
                .tunnels
                .iter()
                .position(|tunnel| tunnel.status() == TunnelStatus::Waiting);
            if let Some(waiting) = waiting {
                log::info!(
                    "[tunnels] activating waiting tunnel {:?}",
                    self.tunnels[waiting].name()
                );
                self.apply_status(waiting, TunnelStatus::Activating);
            }
        }
        Ok(())
    }

    /// Requests activation. When another tunnel is operational this tunnel
    /// waits for it to go down, and that tunnel is asked to deactivate.
    pub fn start_activation(&mut self, key: TunnelKey) -> Result<(), ActivationError> {
        let index = self
            .index_of(key)
            .ok_or(ActivationError::StaleTunnel(key))?;
        let tunnel = &self.tunnels[index];
        if tunnel.status() != TunnelStatus::Inactive {
            return Err(ActivationError::NotInactive(tunnel.name().to_string()));
        }

        if let Some(waiting) = self
            .tunnels
            .iter()
            .position(|tunnel| tunnel.status() == TunnelStatus::Waiting)
        {
            self.apply_status(waiting, TunnelStatus::Inactive);
        }

        let operational = self
            .tunnels
            .iter()
            .position(|tunnel| tunnel.status().is_operational());
        match operational {
            Some(operational) => {
                log::info!(
                    "[tunnels] {:?} waiting for deactivation of {:?}",
                    self.tunnels[index].name(),
                    self.tunnels[operational].name()
                );
                self.apply_status(index, TunnelStatus::Waiting);
                if self.tunnels[operational].status() != TunnelStatus::Deactivating {
                    self.apply_status(operational, TunnelStatus::Deactivating);
                }
            }
            None => {
                log::info!("[tunnels] activating {:?}", self.tunnels[index].name());
                self.apply_status(index, TunnelStatus::Activating);
            }
        }
        Ok(())
    }

    pub fn start_deactivation(&mut self, key: TunnelKey) -> Result<(), ActivationError> {
        let index = self
            .index_of(key)
            .ok_or(ActivationError::StaleTunnel(key))?;
        match self.tunnels[index].status() {
            TunnelStatus::Inactive | TunnelStatus::Deactivating => {}
            TunnelStatus::Waiting => self.apply_status(index, TunnelStatus::Inactive),
            _ => {
                log::info!("[tunnels] deactivating {:?}", self.tunnels[index].name());
                self.apply_status(index, TunnelStatus::Deactivating);
            }
        }
        Ok(())
    }

    fn apply_status(&mut self, index: usize, status: TunnelStatus) {
        let tunnel = &mut self.tunnels[index];
        if tunnel.status() == status {
            return;
        }
        log::debug!(
            "[tunnels] {:?}: {} -> {status}",
            tunnel.name(),
            tunnel.status()
        );
        tunnel.set_status(status);

        let key = tunnel.key();
        let subscriptions = self.observers.borrow().observers_of(key);
        for subscription in subscriptions {
            self.publish(TunnelEvent::StatusChanged { subscription, key });
        }
    }

    fn has_operational_tunnel(&self) -> bool {
        self.tunnels
            .iter()
            .any(|tunnel| tunnel.status().is_operational())
    }

    fn sorted_index(&self, name: &str) -> usize {
        let lowercase = name.to_lowercase();
        self.tunnels
            .partition_point(|tunnel| tunnel.name().to_lowercase() <= lowercase)
    }

    fn allocate_key(&mut self) -> TunnelKey {
        self.next_key += 1;
        TunnelKey(self.next_key)
    }

    fn publish(&self, event: TunnelEvent) {
        if let Err(error) = self.events.unbounded_send(event) {
            log::debug!(
                "[tunnels] event feed closed, dropping {:?}",
                error.into_inner()
            );
        }
    }
}
