//! Command handlers.

use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use time::{OffsetDateTime, UtcOffset};
use tracing::debug;

use taskdeck_app::{
    AppConfig, EditOutcome, FilterCriteriaStore, TaskDraft, TaskStore, TaskStoreError, TokenSession,
};
use taskdeck_core::due::{parse_due, start_of_day};
use taskdeck_core::{DueDateRange, Task, TaskId, TaskPriority, TaskStatus, ViewEngine};
use taskdeck_store_http::{AuthClient, Credentials, HttpTaskStore, Registration};

use crate::Command;
use crate::render::{ConsoleNotifier, task_table};
use crate::token::TokenFile;

/// Field overrides given on the command line; the console's edit surface.
#[derive(Debug, Default)]
struct TaskChanges {
    title: Option<String>,
    description: Option<String>,
    status: Option<TaskStatus>,
    priority: Option<TaskPriority>,
    due: Option<String>,
}

impl TaskChanges {
    const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.due.is_none()
    }
}

pub async fn run(command: Command, config: &AppConfig, offset: UtcOffset) -> Result<()> {
    let tokens = config
        .token_path()
        .map(TokenFile::new)
        .context("could not determine where to keep the session token")?;
    debug!(base_url = config.base_url(), "Using task service");

    match command {
        Command::Login { username, password } => {
            let credentials = Credentials { username, password };
            let token = AuthClient::new(config.base_url()).login(&credentials).await?;
            tokens.save(&token)?;
            println!("Signed in as {}", credentials.username);
        }
        Command::Logout => {
            if tokens.clear()? {
                println!("Signed out");
            } else {
                println!("Not signed in");
            }
        }
        Command::Register {
            username,
            email,
            password,
        } => {
            let registration = Registration {
                username,
                email,
                password,
            };
            let user = AuthClient::new(config.base_url())
                .register(&registration)
                .await?;
            println!("Registered {}; run `taskdeck login` to sign in", user.username);
        }
        Command::List {
            search,
            statuses,
            priorities,
            from,
            to,
            sort,
            direction,
            json,
        } => {
            let store = Arc::new(open_store(config, &tokens, offset)?);
            let criteria = FilterCriteriaStore::with_criteria(store.criteria());
            store.follow(&criteria);
            if let Some(search) = search {
                criteria.set_search(search);
            }
            if !statuses.is_empty() {
                criteria.set_statuses(statuses);
            }
            if !priorities.is_empty() {
                criteria.set_priorities(priorities);
            }
            if from.is_some() || to.is_some() {
                criteria.set_due_range(DueDateRange {
                    start: from.map(|day| start_of_day(day, offset)),
                    end: to.map(|day| start_of_day(day, offset)),
                });
            }
            if let Some(sort) = sort {
                criteria.set_sort(sort);
            }
            if let Some(direction) = direction {
                criteria.set_direction(direction);
            }

            store.load().await.map_err(explain)?;
            let view = store.view().current();
            if json {
                println!("{}", serde_json::to_string_pretty(&*view)?);
            } else if view.is_empty() {
                if store.tasks().is_empty() {
                    println!("No tasks found");
                } else {
                    println!("No tasks matched the provided filters");
                }
            } else {
                print!("{}", task_table(&view, OffsetDateTime::now_utc(), offset));
            }
        }
        Command::Add {
            title,
            description,
            status,
            priority,
            due,
        } => {
            let store = open_store(config, &tokens, offset)?;
            let draft = TaskDraft {
                title,
                description,
                status: status.unwrap_or_default(),
                priority: priority.unwrap_or_default(),
                due_date: due.as_deref().map(|raw| parse_due_arg(raw, offset)).transpose()?,
            };
            if let Some(task) = store
                .submit_edit(None, EditOutcome::Submitted(draft))
                .await
                .map_err(explain)?
            {
                print!("{}", task_table(&[task], OffsetDateTime::now_utc(), offset));
            }
        }
        Command::Edit {
            id,
            title,
            description,
            status,
            priority,
            due,
        } => {
            let store = open_store(config, &tokens, offset)?;
            let existing = load_task(&store, id).await?;
            let changes = TaskChanges {
                title,
                description,
                status,
                priority,
                due,
            };
            let outcome = edit_surface(&existing, changes, offset)?;
            match store
                .submit_edit(Some(&existing), outcome)
                .await
                .map_err(explain)?
            {
                Some(task) => print!("{}", task_table(&[task], OffsetDateTime::now_utc(), offset)),
                None => println!("Nothing to change for task #{id}"),
            }
        }
        Command::Done { id } => {
            let store = open_store(config, &tokens, offset)?;
            let existing = load_task(&store, id).await?;
            store.toggle_completion(&existing).await.map_err(explain)?;
        }
        Command::Rm { id } => {
            let store = open_store(config, &tokens, offset)?;
            load_task(&store, id).await?;
            store.delete(id).await.map_err(explain)?;
        }
    }
    Ok(())
}

fn open_store(config: &AppConfig, tokens: &TokenFile, offset: UtcOffset) -> Result<TaskStore<HttpTaskStore>> {
    let token = tokens.load()?;
    let session = Arc::new(
        token
            .clone()
            .map_or_else(TokenSession::new, TokenSession::with_token),
    );
    let mut remote = HttpTaskStore::new(config.base_url());
    if let Some(token) = token {
        remote = remote.with_token(token);
    }
    Ok(TaskStore::new(remote)
        .with_notifier(Arc::new(ConsoleNotifier))
        .with_session(session)
        .with_engine(ViewEngine::new(offset))
        .with_criteria(config.initial_criteria()))
}

async fn load_task(store: &TaskStore<HttpTaskStore>, id: TaskId) -> Result<Task> {
    store.load().await.map_err(explain)?;
    store
        .tasks()
        .into_iter()
        .find(|task| task.id == id)
        .ok_or_else(|| anyhow!("task #{id} not found"))
}

/// Turn command-line overrides into what an interactive edit surface would return.
fn edit_surface(existing: &Task, changes: TaskChanges, offset: UtcOffset) -> Result<EditOutcome> {
    if changes.is_empty() {
        return Ok(EditOutcome::Cancelled);
    }
    let mut draft = TaskDraft::from_task(existing);
    if let Some(title) = changes.title {
        draft.title = title;
    }
    if let Some(description) = changes.description {
        draft.description = Some(description);
    }
    if let Some(status) = changes.status {
        draft.status = status;
    }
    if let Some(priority) = changes.priority {
        draft.priority = priority;
    }
    if let Some(due) = changes.due.as_deref() {
        draft.due_date = Some(parse_due_arg(due, offset)?);
    }
    Ok(EditOutcome::Submitted(draft))
}

fn parse_due_arg(raw: &str, offset: UtcOffset) -> Result<OffsetDateTime> {
    parse_due(raw, offset).ok_or_else(|| anyhow!("'{raw}' is not a valid due date"))
}

fn explain(err: TaskStoreError) -> anyhow::Error {
    match err {
        TaskStoreError::Unauthenticated => anyhow!("not signed in; run `taskdeck login` first"),
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{datetime, offset};

    fn existing() -> Task {
        Task {
            id: TaskId(4),
            title: "Plan".into(),
            description: Some("quarter".into()),
            status: TaskStatus::Todo,
            priority: TaskPriority::Low,
            due_date: Some("2024-01-10T09:00:00Z".into()),
            ..Task::default()
        }
    }

    #[test]
    fn no_overrides_cancel_the_edit() {
        let outcome = edit_surface(&existing(), TaskChanges::default(), UtcOffset::UTC)
            .unwrap_or_else(|err| panic!("edit surface: {err}"));
        assert_eq!(outcome, EditOutcome::Cancelled);
    }

    #[test]
    fn overrides_apply_on_top_of_existing_fields() {
        let changes = TaskChanges {
            priority: Some(TaskPriority::Urgent),
            due: Some("2024-02-01".into()),
            ..TaskChanges::default()
        };
        let outcome = edit_surface(&existing(), changes, offset!(+2))
            .unwrap_or_else(|err| panic!("edit surface: {err}"));
        let EditOutcome::Submitted(draft) = outcome else {
            panic!("expected a submitted draft");
        };
        assert_eq!(draft.title, "Plan");
        assert_eq!(draft.description.as_deref(), Some("quarter"));
        assert_eq!(draft.priority, TaskPriority::Urgent);
        assert_eq!(draft.due_date, Some(datetime!(2024-02-01 00:00 UTC)));
    }

    #[test]
    fn bad_due_date_is_reported() {
        let changes = TaskChanges {
            due: Some("next week".into()),
            ..TaskChanges::default()
        };
        let Err(err) = edit_surface(&existing(), changes, UtcOffset::UTC) else {
            panic!("garbage due date should fail");
        };
        assert!(err.to_string().contains("next week"));
    }

    #[test]
    fn unauthenticated_gets_a_hint() {
        let err = explain(TaskStoreError::Unauthenticated);
        assert!(err.to_string().contains("taskdeck login"));
        let err = explain(TaskStoreError::InFlight(TaskId(2)));
        assert!(err.to_string().contains("in flight"));
    }
}
