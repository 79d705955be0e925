use std::{
    cell::RefCell,
    collections::HashMap,
    rc::{Rc, Weak},
};

use crate::tunnel::TunnelKey;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

#[derive(Default)]
pub(crate) struct ObserverRegistry {
    next_id: u64,
    observers: HashMap<SubscriptionId, TunnelKey>,
}

impl ObserverRegistry {
    fn register(&mut self, key: TunnelKey) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.observers.insert(id, key);
        id
    }

    pub(crate) fn observers_of(&self, key: TunnelKey) -> Vec<SubscriptionId> {
        let mut ids: Vec<_> = self
            .observers
            .iter()
            .filter(|(_, observed)| **observed == key)
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        ids
    }

    pub(crate) fn contains(&self, id: SubscriptionId) -> bool {
        self.observers.contains_key(&id)
    }

    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }
}

/// Registration for status-change notifications of one tunnel.
///
/// Dropping the handle unregisters it; the tunnels manager stops pushing
/// notifications for it from that point on.
#[derive(Debug)]
pub struct StatusSubscription {
    id: SubscriptionId,
    key: TunnelKey,
    registry: Weak<RefCell<ObserverRegistry>>,
}

impl StatusSubscription {
    pub(crate) fn register(registry: &Rc<RefCell<ObserverRegistry>>, key: TunnelKey) -> Self {
        let id = registry.borrow_mut().register(key);
        log::trace!("[subscription] {id:?} registered for {key}");
        Self {
            id,
            key,
            registry: Rc::downgrade(registry),
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn key(&self) -> TunnelKey {
        self.key
    }

    pub fn is_registered(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.borrow().contains(self.id))
    }
}

impl Drop for StatusSubscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().observers.remove(&self.id);
            log::trace!("[subscription] {:?} released for {}", self.id, self.key);
        }
    }
}
