use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::state::{normalize_token, ParseTokenError, TaskPriority, TaskStatus};

/// Field used to order the derived view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Order by due date; tasks without a usable due date always go last.
    #[default]
    DueDate,
    /// Order by priority weight.
    Priority,
    /// Order by status weight.
    Status,
    /// Order by title.
    Title,
}

/// Direction applied to the sort key comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    /// Smallest key first.
    Asc,
    /// Largest key first.
    #[default]
    Desc,
}

impl SortDirection {
    /// `+1` for ascending, `-1` for descending.
    #[must_use]
    pub const fn multiplier(self) -> i32 {
        match self {
            Self::Asc => 1,
            Self::Desc => -1,
        }
    }

    /// The opposite direction.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

impl FromStr for SortKey {
    type Err = ParseTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "due_date" | "duedate" | "due" => Ok(Self::DueDate),
            "priority" => Ok(Self::Priority),
            "status" => Ok(Self::Status),
            "title" => Ok(Self::Title),
            _ => Err(ParseTokenError::new("sort key", s)),
        }
    }
}

impl FromStr for SortDirection {
    type Err = ParseTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "asc" | "ascending" => Ok(Self::Asc),
            "desc" | "descending" => Ok(Self::Desc),
            _ => Err(ParseTokenError::new("sort direction", s)),
        }
    }
}

/// Inclusive due-date window; either bound may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DueDateRange {
    /// Earliest accepted due date (compared as-is).
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub start: Option<OffsetDateTime>,
    /// Latest accepted due date; widened to the end of its calendar day when applied.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub end: Option<OffsetDateTime>,
}

impl DueDateRange {
    /// Returns true when neither bound is set.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

/// The user's current filter and sort selection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    /// Case-insensitive title substring; blank means no search.
    #[serde(default)]
    pub search: String,
    /// Accepted statuses; empty accepts all.
    #[serde(default)]
    pub status: BTreeSet<TaskStatus>,
    /// Accepted priorities; empty accepts all.
    #[serde(default)]
    pub priority: BTreeSet<TaskPriority>,
    /// Due-date window.
    #[serde(default)]
    pub due_date_range: DueDateRange,
    /// Sort key.
    #[serde(default)]
    pub sort_by: SortKey,
    /// Sort direction.
    #[serde(default)]
    pub sort_direction: SortDirection,
}

impl FilterCriteria {
    /// Returns true when no filtering clause is active (sorting may still apply).
    #[must_use]
    pub fn is_unfiltered(&self) -> bool {
        self.search.trim().is_empty()
            && self.status.is_empty()
            && self.priority.is_empty()
            && self.due_date_range.is_open()
    }

    /// Builder-style sort selection.
    #[must_use]
    pub fn sorted_by(mut self, key: SortKey, direction: SortDirection) -> Self {
        self.sort_by = key;
        self.sort_direction = direction;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_sort_by_due_date_descending() {
        let criteria = FilterCriteria::default();
        assert!(criteria.is_unfiltered());
        assert_eq!(criteria.sort_by, SortKey::DueDate);
        assert_eq!(criteria.sort_direction, SortDirection::Desc);
        assert_eq!(criteria.sort_direction.multiplier(), -1);
        assert_eq!(criteria.sort_direction.flipped().multiplier(), 1);
    }

    #[test]
    fn blank_search_does_not_count_as_filter() {
        let criteria = FilterCriteria {
            search: "   ".into(),
            ..FilterCriteria::default()
        };
        assert!(criteria.is_unfiltered());

        let mut criteria = FilterCriteria::default();
        criteria.status.insert(TaskStatus::Todo);
        assert!(!criteria.is_unfiltered());
    }

    #[test]
    fn sort_tokens_parse() {
        let key: SortKey = "Due-Date".parse().unwrap_or_else(|err| panic!("parse: {err}"));
        assert_eq!(key, SortKey::DueDate);
        let dir: SortDirection = "ASC".parse().unwrap_or_else(|err| panic!("parse: {err}"));
        assert_eq!(dir, SortDirection::Asc);
        assert!("sideways".parse::<SortDirection>().is_err());
        assert!("color".parse::<SortKey>().is_err());
    }
}
