//! The derived (filtered and sorted) task view.

use std::sync::{Arc, Mutex};

use taskdeck_core::Task;

use crate::observer::{SubscriptionId, Subscribers};
use crate::sync::guard;

/// Disposable projection of the authoritative collection.
///
/// Replaced wholesale on every recompute and never patched in place.
#[derive(Debug)]
pub struct DerivedView {
    current: Mutex<Arc<[Task]>>,
    subscribers: Subscribers<[Task]>,
}

impl Default for DerivedView {
    fn default() -> Self {
        Self {
            current: Mutex::new(Arc::from(Vec::new())),
            subscribers: Subscribers::default(),
        }
    }
}

impl DerivedView {
    /// Latest computed view.
    #[must_use]
    pub fn current(&self) -> Arc<[Task]> {
        Arc::clone(&guard(&self.current))
    }

    /// Number of visible tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        guard(&self.current).len()
    }

    /// Returns true when nothing is visible.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Register a callback invoked with every new view.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&[Task]) + Send + Sync + 'static,
    {
        self.subscribers.subscribe(callback)
    }

    /// Remove a view callback.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    pub(crate) fn replace(&self, tasks: Vec<Task>) {
        let next: Arc<[Task]> = Arc::from(tasks);
        *guard(&self.current) = Arc::clone(&next);
        self.subscribers.emit(&next);
    }
}
