//! Due-date parsing and classification.
//!
//! Due dates travel as loosely formatted strings. Nothing here ever fails loudly:
//! a value that cannot be parsed is reported as `None` and callers treat it as absent.

use time::format_description::well_known::Rfc3339;
use time::macros::{format_description, time};
use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::state::TaskStatus;
use crate::Task;

/// Parse a raw due date.
///
/// Accepts RFC 3339 timestamps, naive date-times (`YYYY-MM-DDTHH:MM[:SS[.fff]]`) and
/// plain dates (`YYYY-MM-DD`). Naive date-times are interpreted in `offset`; plain dates
/// are midnight UTC.
#[must_use]
pub fn parse_due(raw: &str, offset: UtcOffset) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(parsed) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(parsed);
    }
    parse_naive(raw)
        .map(|naive| naive.assume_offset(offset))
        .or_else(|| parse_date(raw).map(|date| date.midnight().assume_utc()))
}

fn parse_naive(raw: &str) -> Option<PrimitiveDateTime> {
    PrimitiveDateTime::parse(
        raw,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
    )
    .or_else(|_| {
        PrimitiveDateTime::parse(raw, format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"))
    })
    .or_else(|_| PrimitiveDateTime::parse(raw, format_description!("[year]-[month]-[day]T[hour]:[minute]")))
    .ok()
}

/// Parse a plain calendar date (`YYYY-MM-DD`).
#[must_use]
pub fn parse_date(raw: &str) -> Option<Date> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]")).ok()
}

/// First instant of `date` in `offset`.
#[must_use]
pub const fn start_of_day(date: Date, offset: UtcOffset) -> OffsetDateTime {
    date.midnight().assume_offset(offset)
}

/// Last instant (23:59:59.999) of the calendar day containing `ts`, as seen from `offset`.
///
/// `None` when `ts` cannot be expressed in `offset` (edge of the supported date range).
#[must_use]
pub fn end_of_day(ts: OffsetDateTime, offset: UtcOffset) -> Option<OffsetDateTime> {
    ts.checked_to_offset(offset)
        .map(|local| local.replace_time(time!(23:59:59.999)))
}

/// Format a timestamp the way the remote store expects it.
#[must_use]
pub fn format_due(ts: OffsetDateTime) -> Option<String> {
    ts.format(&Rfc3339).ok()
}

/// Number of days ahead of "today" that still counts as due soon.
pub const DUE_SOON_DAYS: i64 = 3;

/// How a task's due date relates to the current moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueState {
    /// The task is completed; due dates no longer matter.
    Completed,
    /// No due date set.
    NoDueDate,
    /// The due date could not be parsed.
    Unparsable,
    /// The due day has fully passed.
    Overdue,
    /// Due today or within [`DUE_SOON_DAYS`] days.
    DueSoon,
    /// Due later than that.
    Scheduled,
}

impl DueState {
    /// Classify `task` relative to `now`, using `offset` for calendar-day boundaries.
    #[must_use]
    pub fn classify(task: &Task, now: OffsetDateTime, offset: UtcOffset) -> Self {
        if task.status == TaskStatus::Completed {
            return Self::Completed;
        }
        let Some(raw) = task.due_date.as_deref() else {
            return Self::NoDueDate;
        };
        let Some(due) = parse_due(raw, offset) else {
            return Self::Unparsable;
        };
        let (Some(end), Some(local_due), Some(local_now)) = (
            end_of_day(due, offset),
            due.checked_to_offset(offset),
            now.checked_to_offset(offset),
        ) else {
            return Self::Unparsable;
        };
        if now > end {
            return Self::Overdue;
        }
        let days = (local_due.date() - local_now.date()).whole_days();
        if (0..=DUE_SOON_DAYS).contains(&days) {
            Self::DueSoon
        } else {
            Self::Scheduled
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::TaskId;
    use crate::state::TaskPriority;
    use time::macros::{datetime, offset};

    fn task(status: TaskStatus, due: Option<&str>) -> Task {
        Task {
            id: TaskId(1),
            title: "t".into(),
            description: None,
            status,
            priority: TaskPriority::Medium,
            due_date: due.map(str::to_owned),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn parses_supported_shapes() {
        let utc = UtcOffset::UTC;
        assert_eq!(parse_due("2024-01-05T23:00:00Z", utc), Some(datetime!(2024-01-05 23:00 UTC)));
        assert_eq!(
            parse_due("2024-01-05T23:00:00.000+09:00", utc),
            Some(datetime!(2024-01-05 23:00 +9))
        );
        assert_eq!(parse_due("2024-01-05T23:00", offset!(+2)), Some(datetime!(2024-01-05 23:00 +2)));
        assert_eq!(parse_due("2024-01-05T23:00:30", utc), Some(datetime!(2024-01-05 23:00:30 UTC)));
        assert_eq!(parse_due("2024-01-05", utc), Some(datetime!(2024-01-05 00:00 UTC)));
    }

    #[test]
    fn plain_dates_are_utc_midnight_in_any_zone() {
        assert_eq!(parse_due("2024-01-05", offset!(+9)), Some(datetime!(2024-01-05 00:00 UTC)));
        assert_eq!(parse_due("2024-01-05", offset!(-5)), Some(datetime!(2024-01-05 00:00 UTC)));
        assert_eq!(
            parse_due("2024-01-05T00:00", offset!(+9)),
            Some(datetime!(2024-01-05 00:00 +9))
        );
    }

    #[test]
    fn garbage_is_absent() {
        assert_eq!(parse_due("", UtcOffset::UTC), None);
        assert_eq!(parse_due("next tuesday", UtcOffset::UTC), None);
        assert_eq!(parse_due("2024-13-45", UtcOffset::UTC), None);
    }

    #[test]
    fn end_of_day_uses_the_given_offset() {
        let end = end_of_day(datetime!(2024-01-05 22:00 UTC), offset!(+3));
        assert_eq!(end, Some(datetime!(2024-01-06 23:59:59.999 +3)));
    }

    #[test]
    fn far_future_due_date_does_not_overflow() {
        let due = parse_due("9999-12-31T23:00:00-05:00", UtcOffset::UTC)
            .unwrap_or_else(|| panic!("offset timestamp must parse"));
        assert_eq!(end_of_day(due, UtcOffset::UTC), None);
        let now = datetime!(2024-01-10 12:00 UTC);
        assert_eq!(
            DueState::classify(
                &task(TaskStatus::Todo, Some("9999-12-31T23:00:00-05:00")),
                now,
                UtcOffset::UTC
            ),
            DueState::Unparsable
        );
    }

    #[test]
    fn classification_covers_each_state() {
        let now = datetime!(2024-01-10 12:00 UTC);
        let utc = UtcOffset::UTC;
        assert_eq!(
            DueState::classify(&task(TaskStatus::Completed, Some("2020-01-01")), now, utc),
            DueState::Completed
        );
        assert_eq!(DueState::classify(&task(TaskStatus::Todo, None), now, utc), DueState::NoDueDate);
        assert_eq!(
            DueState::classify(&task(TaskStatus::Todo, Some("soon")), now, utc),
            DueState::Unparsable
        );
        assert_eq!(
            DueState::classify(&task(TaskStatus::Todo, Some("2024-01-09")), now, utc),
            DueState::Overdue
        );
        assert_eq!(
            DueState::classify(&task(TaskStatus::Todo, Some("2024-01-10T08:00:00Z")), now, utc),
            DueState::DueSoon
        );
        assert_eq!(
            DueState::classify(&task(TaskStatus::InProgress, Some("2024-01-13")), now, utc),
            DueState::DueSoon
        );
        assert_eq!(
            DueState::classify(&task(TaskStatus::Todo, Some("2024-01-14")), now, utc),
            DueState::Scheduled
        );
    }
}
