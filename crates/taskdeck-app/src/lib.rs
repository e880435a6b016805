//! Application layer for taskdeck.
//!
//! This crate owns the client-side state of the task list: the authoritative task
//! collection and its reconciliation with a remote store, the pending-operation
//! tracker, the filter criteria store and the derived view, plus configuration.

pub mod config;
pub mod criteria_store;
pub mod edit;
pub mod observer;
pub mod outcome;
pub mod pending;
pub mod remote;
pub mod session;
pub mod task_store;
pub mod view;

mod sync;

// Re-exports for convenience
pub use config::{AppConfig, ApiConfig, SessionConfig, ViewConfig, default_config_path};
pub use criteria_store::FilterCriteriaStore;
pub use edit::{CleanDraft, EditOutcome, TaskDraft};
pub use observer::{SubscriptionId, Subscribers};
pub use outcome::{Notifier, OperationKind, Outcome, OutcomeStatus, RecordingNotifier, SilentNotifier};
pub use pending::{PendingGuard, PendingOperations};
pub use remote::RemoteTaskStore;
pub use session::{Session, TokenSession};
pub use task_store::{PLACEHOLDER_DESCRIPTION, TaskStore, TaskStoreError};
pub use view::DerivedView;
