//! Selection service
//!
//! Owns a `ServiceTree` and tells subscribers about every batch of
//! checked-state changes. Subscribers do the rendering; the tree only
//! reports data.

use tracing::{debug, instrument};

use crate::application::ApplicationResult;
use crate::domain::{Aggregator, ChangeSet, NodeId, Price, ServiceTree};

/// Receives one batch per mutating call, after propagation has finished.
pub trait ChangeListener {
    fn state_changed(&mut self, tree: &ServiceTree, changes: &ChangeSet);
}

impl<F> ChangeListener for F
where
    F: FnMut(&ServiceTree, &ChangeSet),
{
    fn state_changed(&mut self, tree: &ServiceTree, changes: &ChangeSet) {
        self(tree, changes)
    }
}

/// Handle returned by `subscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// The presentation layer's entry point into the tree.
pub struct SelectionService {
    tree: ServiceTree,
    listeners: Vec<(SubscriptionId, Box<dyn ChangeListener>)>,
    next_subscription: u64,
}

impl SelectionService {
    pub fn new(tree: ServiceTree) -> Self {
        Self {
            tree,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn tree(&self) -> &ServiceTree {
        &self.tree
    }

    pub fn total(&self) -> Price {
        Aggregator::total(&self.tree)
    }

    pub fn subscribe(&mut self, listener: impl ChangeListener + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if the id was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    #[instrument(level = "debug", skip(self))]
    pub fn toggle(&mut self, id: NodeId) -> ApplicationResult<ChangeSet> {
        let changes = self.tree.toggle(id)?;
        self.notify(&changes);
        Ok(changes)
    }

    pub fn set_checked(&mut self, id: NodeId, checked: bool) -> ApplicationResult<ChangeSet> {
        let changes = self.tree.set_checked(id, checked)?;
        self.notify(&changes);
        Ok(changes)
    }

    pub fn clear(&mut self) -> ChangeSet {
        let changes = self.tree.clear();
        self.notify(&changes);
        changes
    }

    fn notify(&mut self, changes: &ChangeSet) {
        if changes.is_empty() {
            return;
        }
        debug!(
            "notifying {} listener(s) of {} change(s)",
            self.listeners.len(),
            changes.len()
        );
        for (_, listener) in self.listeners.iter_mut() {
            listener.state_changed(&self.tree, changes);
        }
    }
}
