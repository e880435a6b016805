//! Holder of the user's filter/sort selection.

use std::sync::Mutex;

use taskdeck_core::{DueDateRange, FilterCriteria, SortDirection, SortKey, TaskPriority, TaskStatus};

use crate::observer::{SubscriptionId, Subscribers};
use crate::sync::guard;

/// Keeps one [`FilterCriteria`] and republishes it after every committed edit.
///
/// Criteria live only in memory; nothing is persisted between sessions.
#[derive(Debug, Default)]
pub struct FilterCriteriaStore {
    criteria: Mutex<FilterCriteria>,
    listeners: Subscribers<FilterCriteria>,
}

impl FilterCriteriaStore {
    /// Store starting from the default criteria.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store starting from `criteria`.
    #[must_use]
    pub fn with_criteria(criteria: FilterCriteria) -> Self {
        Self {
            criteria: Mutex::new(criteria),
            listeners: Subscribers::default(),
        }
    }

    /// Clone of the current criteria.
    #[must_use]
    pub fn current(&self) -> FilterCriteria {
        guard(&self.criteria).clone()
    }

    /// Register a callback invoked with every published criteria value.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&FilterCriteria) + Send + Sync + 'static,
    {
        self.listeners.subscribe(callback)
    }

    /// Remove a criteria callback.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Mutate the criteria in place, then publish the result once.
    pub fn edit<R>(&self, change: impl FnOnce(&mut FilterCriteria) -> R) -> R {
        let (result, snapshot) = {
            let mut criteria = guard(&self.criteria);
            let result = change(&mut criteria);
            (result, criteria.clone())
        };
        self.listeners.emit(&snapshot);
        result
    }

    /// Republish the current criteria unchanged.
    pub fn apply(&self) {
        let snapshot = self.current();
        self.listeners.emit(&snapshot);
    }

    /// Reset to the defaults (no filters, due date descending) and publish.
    pub fn clear(&self) {
        self.edit(|criteria| *criteria = FilterCriteria::default());
    }

    /// Replace the search text.
    pub fn set_search(&self, search: impl Into<String>) {
        let search = search.into();
        self.edit(|criteria| criteria.search = search);
    }

    /// Add or remove `status` from the accepted set. Returns true when it is now accepted.
    pub fn toggle_status(&self, status: TaskStatus) -> bool {
        self.edit(|criteria| {
            if criteria.status.remove(&status) {
                false
            } else {
                criteria.status.insert(status)
            }
        })
    }

    /// Replace the accepted statuses.
    pub fn set_statuses(&self, statuses: impl IntoIterator<Item = TaskStatus>) {
        let statuses = statuses.into_iter().collect();
        self.edit(|criteria| criteria.status = statuses);
    }

    /// Add or remove `priority` from the accepted set. Returns true when it is now accepted.
    pub fn toggle_priority(&self, priority: TaskPriority) -> bool {
        self.edit(|criteria| {
            if criteria.priority.remove(&priority) {
                false
            } else {
                criteria.priority.insert(priority)
            }
        })
    }

    /// Replace the accepted priorities.
    pub fn set_priorities(&self, priorities: impl IntoIterator<Item = TaskPriority>) {
        let priorities = priorities.into_iter().collect();
        self.edit(|criteria| criteria.priority = priorities);
    }

    /// Replace the due-date window.
    pub fn set_due_range(&self, range: DueDateRange) {
        self.edit(|criteria| criteria.due_date_range = range);
    }

    /// Change the sort key.
    pub fn set_sort(&self, key: SortKey) {
        self.edit(|criteria| criteria.sort_by = key);
    }

    /// Change the sort direction.
    pub fn set_direction(&self, direction: SortDirection) {
        self.edit(|criteria| criteria.sort_direction = direction);
    }
}
