//! Outcome events emitted by the task store.
//!
//! The store never carries display text. Presentation maps each [`Outcome`] to
//! whatever message it wants to show.

use std::sync::Mutex;

use crate::sync::guard;

/// Which user-facing operation produced an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Loading the task list.
    Load,
    /// Creating a task.
    Create,
    /// Updating a task through the edit flow.
    Update,
    /// Deleting a task.
    Delete,
    /// Marking a task as completed.
    Complete,
    /// Moving a completed task back to `TODO`.
    Uncomplete,
}

/// Whether the remote call behind an operation succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeStatus {
    /// The remote store accepted the operation.
    Success,
    /// The remote call failed; local state was left untouched.
    Failure,
}

/// A discrete notification: operation kind x result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Outcome {
    /// Operation that settled.
    pub kind: OperationKind,
    /// How it settled.
    pub status: OutcomeStatus,
}

impl Outcome {
    /// Successful outcome for `kind`.
    #[must_use]
    pub const fn success(kind: OperationKind) -> Self {
        Self {
            kind,
            status: OutcomeStatus::Success,
        }
    }

    /// Failed outcome for `kind`.
    #[must_use]
    pub const fn failure(kind: OperationKind) -> Self {
        Self {
            kind,
            status: OutcomeStatus::Failure,
        }
    }

    /// Returns true for failures.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self.status, OutcomeStatus::Failure)
    }
}

/// Receiver of outcome notifications (toasts, console lines, ...).
pub trait Notifier: Send + Sync {
    /// Deliver one outcome.
    fn notify(&self, outcome: Outcome);
}

/// Notifier that drops every outcome.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn notify(&self, _outcome: Outcome) {}
}

/// Notifier that keeps every outcome in memory, in delivery order.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    outcomes: Mutex<Vec<Outcome>>,
}

impl RecordingNotifier {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Outcomes delivered so far.
    #[must_use]
    pub fn outcomes(&self) -> Vec<Outcome> {
        guard(&self.outcomes).clone()
    }

    /// Remove and return everything recorded so far.
    pub fn take(&self) -> Vec<Outcome> {
        std::mem::take(&mut *guard(&self.outcomes))
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, outcome: Outcome) {
        guard(&self.outcomes).push(outcome);
    }
}
