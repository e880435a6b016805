//! Tracks task ids that currently have a remote mutation in flight.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use taskdeck_core::TaskId;

use crate::sync::guard;

/// Set of ids with an outstanding remote mutation.
///
/// Presentation disables per-task controls for members of this set; the task store
/// additionally refuses to start a second mutation on a member.
#[derive(Debug, Clone, Default)]
pub struct PendingOperations {
    ids: Arc<Mutex<BTreeSet<TaskId>>>,
}

impl PendingOperations {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `id` as busy. Returns `None` when it already is.
    ///
    /// The id stays in the set until the returned guard is dropped.
    #[must_use]
    pub fn begin(&self, id: TaskId) -> Option<PendingGuard> {
        let inserted = guard(&self.ids).insert(id);
        inserted.then(|| PendingGuard {
            ids: Arc::clone(&self.ids),
            id,
        })
    }

    /// Whether `id` has a mutation in flight.
    #[must_use]
    pub fn contains(&self, id: TaskId) -> bool {
        guard(&self.ids).contains(&id)
    }

    /// Whether controls for `id` must be disabled.
    #[must_use]
    pub fn is_busy(&self, id: TaskId) -> bool {
        self.contains(id)
    }

    /// Returns true when nothing is in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        guard(&self.ids).is_empty()
    }

    /// Sorted snapshot of the busy ids.
    #[must_use]
    pub fn ids(&self) -> Vec<TaskId> {
        guard(&self.ids).iter().copied().collect()
    }
}

/// Keeps an id in the pending set until dropped.
#[derive(Debug)]
pub struct PendingGuard {
    ids: Arc<Mutex<BTreeSet<TaskId>>>,
    id: TaskId,
}

impl PendingGuard {
    /// The id this guard keeps busy.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        guard(&self.ids).remove(&self.id);
    }
}
