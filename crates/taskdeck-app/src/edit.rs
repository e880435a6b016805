//! Payloads exchanged with the edit surface.

use time::{OffsetDateTime, UtcOffset};

use taskdeck_core::due::{format_due, parse_due};
use taskdeck_core::{Task, TaskPriority, TaskStatus};

/// Editable fields of a task, as produced by an edit surface.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskDraft {
    /// Title; must not be blank once trimmed.
    pub title: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Status to store.
    pub status: TaskStatus,
    /// Priority to store.
    pub priority: TaskPriority,
    /// Due date, if any.
    pub due_date: Option<OffsetDateTime>,
}

impl TaskDraft {
    /// Draft with only a title set.
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Pre-fill a draft from an existing task for the edit flow.
    ///
    /// An unparsable due date is dropped; naive values are read in UTC.
    #[must_use]
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status,
            priority: task.priority,
            due_date: task
                .due_date
                .as_deref()
                .and_then(|raw| parse_due(raw, UtcOffset::UTC)),
        }
    }

    /// Trimmed copy of the draft ready to be sent to the remote store.
    #[must_use]
    pub fn clean(&self) -> CleanDraft {
        CleanDraft {
            title: self.title.trim().to_owned(),
            description: self
                .description
                .as_deref()
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .map(str::to_owned),
            status: self.status,
            priority: self.priority,
            due_date: self.due_date.and_then(format_due),
        }
    }
}

/// A draft after trimming, with the due date rendered as RFC 3339.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanDraft {
    /// Trimmed title.
    pub title: String,
    /// Trimmed description; `None` when it was blank.
    pub description: Option<String>,
    /// Status to store.
    pub status: TaskStatus,
    /// Priority to store.
    pub priority: TaskPriority,
    /// RFC 3339 due date.
    pub due_date: Option<String>,
}

/// What the edit surface returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// The user dismissed the surface.
    Cancelled,
    /// The user confirmed the draft.
    Submitted(TaskDraft),
}
