//! Domain types and the filter/sort engine for taskdeck.

/// Filter and sort selection.
pub mod criteria;
/// Due-date parsing and classification.
pub mod due;
/// The filter/sort engine.
pub mod engine;
/// Identifier types.
pub mod id;
/// Status and priority enumerations.
pub mod state;
/// Title search.
pub mod text_matcher;

pub use criteria::{DueDateRange, FilterCriteria, SortDirection, SortKey};
pub use due::DueState;
pub use engine::{apply, ViewEngine};
pub use id::TaskId;
pub use state::{ParseTokenError, TaskPriority, TaskStatus};

use serde::{Deserialize, Serialize};

/// A task as last confirmed by the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Server-assigned identifier.
    pub id: TaskId,
    /// Human-readable title.
    pub title: String,
    /// Optional free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Workflow status.
    pub status: TaskStatus,
    /// Urgency.
    pub priority: TaskPriority,
    /// Raw due date as received; see [`due::parse_due`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    /// Creation timestamp set by the remote store.
    #[serde(default)]
    pub created_at: String,
    /// Last update timestamp set by the remote store.
    #[serde(default)]
    pub updated_at: String,
}

impl Task {
    /// Status a completion toggle moves this task to.
    ///
    /// Completed tasks go back to `TODO`, not to whatever status they had before.
    #[must_use]
    pub fn toggled_status(&self) -> TaskStatus {
        if self.status == TaskStatus::Completed {
            TaskStatus::Todo
        } else {
            TaskStatus::Completed
        }
    }
}

/// Payload for creating a task. The remote store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    /// Non-empty title.
    pub title: String,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Initial status.
    pub status: TaskStatus,
    /// Initial priority.
    pub priority: TaskPriority,
    /// Due date in RFC 3339.
    pub due_date: String,
}

/// Partial update; absent fields are left unchanged by the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskPatch {
    /// New title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    /// New priority.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    /// New due date in RFC 3339.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

impl UpdateTaskPatch {
    /// Full patch carrying every editable field of `task`.
    ///
    /// A status or priority this client could not decode is left out, so the remote
    /// store keeps whatever value it holds.
    #[must_use]
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: Some(task.title.clone()),
            description: task.description.clone(),
            status: Some(task.status).filter(|status| status.is_known()),
            priority: Some(task.priority).filter(|priority| priority.is_known()),
            due_date: task.due_date.clone(),
        }
    }

    /// Replace the status carried by this patch.
    #[must_use]
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Returns true when the patch would not change anything.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
    }
}
