//! Display text for the console front end.

use std::fmt::Write as _;

use time::{OffsetDateTime, UtcOffset};

use taskdeck_app::{Notifier, OperationKind, Outcome, OutcomeStatus};
use taskdeck_core::due::parse_due;
use taskdeck_core::{DueState, Task, TaskPriority, TaskStatus};

pub const fn status_label(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Todo => "To Do",
        TaskStatus::InProgress => "In Progress",
        TaskStatus::Completed => "Completed",
        TaskStatus::Cancelled => "Cancelled",
        TaskStatus::Unknown => "",
    }
}

pub const fn priority_label(priority: TaskPriority) -> &'static str {
    match priority {
        TaskPriority::Low => "Low",
        TaskPriority::Medium => "Medium",
        TaskPriority::High => "High",
        TaskPriority::Urgent => "Urgent",
        TaskPriority::Unknown => "",
    }
}

pub const fn due_marker(state: DueState) -> &'static str {
    match state {
        DueState::Completed => "Task completed!",
        DueState::NoDueDate => "No due date set",
        DueState::Overdue => "Task is overdue!",
        DueState::DueSoon => "Due soon!",
        DueState::Scheduled | DueState::Unparsable => "",
    }
}

/// Fixed user-facing message for an outcome; `None` for silent ones.
pub const fn outcome_message(outcome: Outcome) -> Option<&'static str> {
    let message = match (outcome.kind, outcome.status) {
        (OperationKind::Load, OutcomeStatus::Success) => return None,
        (OperationKind::Load, OutcomeStatus::Failure) => "Error loading tasks",
        (OperationKind::Create, OutcomeStatus::Success) => "Task created successfully",
        (OperationKind::Create, OutcomeStatus::Failure) => "Error creating task",
        (OperationKind::Update, OutcomeStatus::Success) => "Task updated successfully",
        (OperationKind::Update, OutcomeStatus::Failure) => "Error updating task",
        (OperationKind::Delete, OutcomeStatus::Success) => "Task deleted successfully",
        (OperationKind::Delete, OutcomeStatus::Failure) => "Error deleting task",
        (OperationKind::Complete, OutcomeStatus::Success) => "Task marked as completed",
        (OperationKind::Uncomplete, OutcomeStatus::Success) => "Task unmarked as completed",
        (OperationKind::Complete | OperationKind::Uncomplete, OutcomeStatus::Failure) => {
            "Error updating task status"
        }
    };
    Some(message)
}

/// Prints outcome messages: successes to stdout, failures to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, outcome: Outcome) {
        let Some(message) = outcome_message(outcome) else {
            return;
        };
        if outcome.is_failure() {
            eprintln!("{message}");
        } else {
            println!("{message}");
        }
    }
}

/// One line per task: id, status, priority, title, due date and marker.
pub fn task_table(tasks: &[Task], now: OffsetDateTime, offset: UtcOffset) -> String {
    let title_width = tasks
        .iter()
        .map(|task| task.title.chars().count())
        .max()
        .unwrap_or(0);
    let mut out = String::new();
    for task in tasks {
        let due = task
            .due_date
            .as_deref()
            .map(|raw| {
                parse_due(raw, offset).map_or_else(
                    || raw.to_owned(),
                    |ts| ts.checked_to_offset(offset).unwrap_or(ts).date().to_string(),
                )
            })
            .unwrap_or_default();
        let marker = due_marker(DueState::classify(task, now, offset));
        let line = format!(
            "#{:<5} {:<11} {:<6} {:<title_width$}  {:<10} {}",
            task.id.get(),
            status_label(task.status),
            priority_label(task.priority),
            task.title,
            due,
            marker,
        );
        let _ = writeln!(out, "{}", line.trim_end());
    }
    out
}
