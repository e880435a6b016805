use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Workflow status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Not started yet.
    #[default]
    Todo,
    /// Actively being worked on.
    InProgress,
    /// Finished.
    Completed,
    /// Abandoned.
    Cancelled,
    /// Any status value this client does not know about.
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    /// Statuses a user can pick from.
    pub const ALL: [Self; 4] = [Self::Todo, Self::InProgress, Self::Completed, Self::Cancelled];

    /// Sort weight: `CANCELLED` > `COMPLETED` > `IN_PROGRESS` > `TODO`, unknown is 0.
    #[must_use]
    pub const fn weight(self) -> i32 {
        match self {
            Self::Cancelled => 4,
            Self::Completed => 3,
            Self::InProgress => 2,
            Self::Todo => 1,
            Self::Unknown => 0,
        }
    }

    /// False for a status this client could not decode.
    #[must_use]
    pub const fn is_known(self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "TODO",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
            Self::Unknown => "UNKNOWN",
        }
    }
}

/// Urgency of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
    /// Can wait.
    Low,
    /// Default priority.
    #[default]
    Medium,
    /// Should be handled soon.
    High,
    /// Drop everything.
    Urgent,
    /// Any priority value this client does not know about.
    #[serde(other)]
    Unknown,
}

impl TaskPriority {
    /// Priorities a user can pick from, most urgent first.
    pub const ALL: [Self; 4] = [Self::Urgent, Self::High, Self::Medium, Self::Low];

    /// Sort weight: `URGENT` > `HIGH` > `MEDIUM` > `LOW`, unknown is 0.
    #[must_use]
    pub const fn weight(self) -> i32 {
        match self {
            Self::Urgent => 4,
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
            Self::Unknown => 0,
        }
    }

    /// False for a priority this client could not decode.
    #[must_use]
    pub const fn is_known(self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Urgent => "URGENT",
            Self::Unknown => "UNKNOWN",
        }
    }
}

/// A user-supplied token could not be mapped onto a known value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind}: {token}")]
pub struct ParseTokenError {
    /// Which kind of value was being parsed.
    pub kind: &'static str,
    /// The offending input.
    pub token: String,
}

impl ParseTokenError {
    pub(crate) fn new(kind: &'static str, token: &str) -> Self {
        Self {
            kind,
            token: token.to_owned(),
        }
    }
}

pub(crate) fn normalize_token(token: &str) -> String {
    token.trim().to_ascii_lowercase().replace(['-', ' '], "_")
}

impl FromStr for TaskStatus {
    type Err = ParseTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "todo" | "to_do" => Ok(Self::Todo),
            "in_progress" | "inprogress" => Ok(Self::InProgress),
            "completed" | "complete" => Ok(Self::Completed),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            _ => Err(ParseTokenError::new("status", s)),
        }
    }
}

impl FromStr for TaskPriority {
    type Err = ParseTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "low" => Ok(Self::Low),
            "medium" | "med" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            _ => Err(ParseTokenError::new("priority", s)),
        }
    }
}
