//! Integration tests for the criteria store -> task store -> derived view pipeline.
//!
//! These tests drive the public API only, the way a front end wires it together.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::{Arc, Mutex};

use anyhow::{Error, anyhow};
use taskdeck_app::{
    FilterCriteriaStore, OperationKind, Outcome, RecordingNotifier, RemoteTaskStore, TaskDraft,
    TaskStore, TaskStoreError, TokenSession,
};
use taskdeck_core::{
    CreateTaskRequest, DueDateRange, SortDirection, SortKey, Task, TaskId, TaskPriority, TaskStatus,
    UpdateTaskPatch,
};
use time::macros::datetime;

/// In-memory stand-in for the remote task service.
#[derive(Default)]
struct MemoryRemote {
    tasks: Mutex<Vec<Task>>,
    fail_updates: Mutex<bool>,
}

impl MemoryRemote {
    fn seeded(tasks: Vec<Task>) -> Arc<Self> {
        Arc::new(Self {
            tasks: Mutex::new(tasks),
            ..Self::default()
        })
    }
}

impl RemoteTaskStore for MemoryRemote {
    type Error = Error;

    async fn list_tasks(&self) -> Result<Vec<Task>, Self::Error> {
        Ok(self.tasks.lock().unwrap().clone())
    }

    async fn create_task(&self, request: &CreateTaskRequest) -> Result<Task, Self::Error> {
        let mut tasks = self.tasks.lock().unwrap();
        let id = TaskId(tasks.iter().map(|task| task.id.get()).max().unwrap_or(0) + 1);
        let task = Task {
            id,
            title: request.title.clone(),
            description: request.description.clone(),
            status: request.status,
            priority: request.priority,
            due_date: Some(request.due_date.clone()),
            ..Task::default()
        };
        tasks.push(task.clone());
        Ok(task)
    }

    async fn update_task(&self, id: TaskId, patch: &UpdateTaskPatch) -> Result<Task, Self::Error> {
        if *self.fail_updates.lock().unwrap() {
            return Err(anyhow!("503 service unavailable"));
        }
        let mut tasks = self.tasks.lock().unwrap();
        let task = tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or_else(|| anyhow!("task {id} not found"))?;
        if let Some(status) = patch.status {
            task.status = status;
        }
        if let Some(title) = &patch.title {
            task.title.clone_from(title);
        }
        Ok(task.clone())
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), Self::Error> {
        self.tasks.lock().unwrap().retain(|task| task.id != id);
        Ok(())
    }
}

fn task(id: i64, title: &str, status: TaskStatus, priority: TaskPriority, due: Option<&str>) -> Task {
    Task {
        id: TaskId(id),
        title: title.into(),
        status,
        priority,
        due_date: due.map(str::to_owned),
        ..Task::default()
    }
}

fn backlog() -> Vec<Task> {
    vec![
        task(1, "My Project Plan", TaskStatus::Todo, TaskPriority::Low, Some("2024-01-10")),
        task(2, "Home", TaskStatus::Completed, TaskPriority::Urgent, None),
        task(3, "Project review", TaskStatus::InProgress, TaskPriority::High, Some("2024-01-05T23:00:00Z")),
        task(4, "Taxes", TaskStatus::Todo, TaskPriority::Medium, Some("2024-01-06T00:01:00Z")),
    ]
}

fn ids(tasks: &[Task]) -> Vec<i64> {
    tasks.iter().map(|task| task.id.get()).collect()
}

type Wired = (
    Arc<TaskStore<Arc<MemoryRemote>>>,
    FilterCriteriaStore,
    Arc<MemoryRemote>,
    Arc<RecordingNotifier>,
);

async fn wired() -> Wired {
    let remote = MemoryRemote::seeded(backlog());
    let notifier = Arc::new(RecordingNotifier::new());
    let store = Arc::new(TaskStore::new(Arc::clone(&remote)).with_notifier(notifier.clone()));
    let criteria = FilterCriteriaStore::new();
    store.follow(&criteria);
    store.load().await.expect("load");
    (store, criteria, remote, notifier)
}

#[tokio::test]
async fn criteria_edits_flow_into_the_view() {
    let (store, criteria, _remote, _notifier) = wired().await;
    let renders = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&renders);
    store
        .view()
        .subscribe(move |tasks: &[Task]| sink.lock().unwrap().push(ids(tasks)));

    criteria.set_search("proj");
    assert_eq!(ids(&store.view().current()), vec![1, 3]);

    criteria.set_sort(SortKey::Priority);
    assert_eq!(ids(&store.view().current()), vec![3, 1]);

    criteria.clear();
    criteria.set_sort(SortKey::Priority);
    assert_eq!(ids(&store.view().current()), vec![2, 3, 4, 1]);

    criteria.set_direction(SortDirection::Asc);
    assert_eq!(ids(&store.view().current()), vec![1, 4, 3, 2]);

    assert_eq!(renders.lock().unwrap().len(), 5);
}

#[tokio::test]
async fn due_range_end_covers_the_whole_day() {
    let (store, criteria, _remote, _notifier) = wired().await;
    criteria.set_due_range(DueDateRange {
        start: Some(datetime!(2024-01-01 00:00 UTC)),
        end: Some(datetime!(2024-01-05 00:00 UTC)),
    });
    assert_eq!(ids(&store.view().current()), vec![3]);

    criteria.set_statuses([TaskStatus::Completed]);
    assert!(store.view().is_empty());
}

#[tokio::test]
async fn absent_due_dates_sort_last_both_ways() {
    let (store, criteria, _remote, _notifier) = wired().await;
    assert_eq!(ids(&store.view().current()).last(), Some(&2));
    criteria.set_direction(SortDirection::Asc);
    assert_eq!(ids(&store.view().current()).last(), Some(&2));
}

#[tokio::test]
async fn mutations_keep_the_view_in_step() {
    let (store, criteria, remote, notifier) = wired().await;
    criteria.set_statuses([TaskStatus::Todo]);
    assert_eq!(ids(&store.view().current()), vec![1, 4]);

    let created = store
        .create(TaskDraft {
            title: "Groceries".into(),
            due_date: Some(datetime!(2024-02-01 09:00 UTC)),
            ..TaskDraft::default()
        })
        .await
        .expect("create");
    assert_eq!(created.id, TaskId(5));
    assert_eq!(ids(&store.view().current()), vec![5, 1, 4]);

    let plan = store.tasks()[0].clone();
    store.toggle_completion(&plan).await.expect("toggle");
    assert_eq!(ids(&store.view().current()), vec![5, 4]);

    store.delete(TaskId(4)).await.expect("delete");
    assert_eq!(ids(&store.view().current()), vec![5]);

    *remote.fail_updates.lock().unwrap() = true;
    let groceries = store.tasks()[3].clone();
    let Err(TaskStoreError::Remote(_)) = store.toggle_completion(&groceries).await else {
        panic!("toggle should fail");
    };
    assert_eq!(ids(&store.view().current()), vec![5]);
    assert!(store.pending().is_empty());

    assert_eq!(
        notifier.take(),
        vec![
            Outcome::success(OperationKind::Create),
            Outcome::success(OperationKind::Complete),
            Outcome::success(OperationKind::Delete),
            Outcome::failure(OperationKind::Complete),
        ]
    );
}

#[tokio::test]
async fn session_gate_blocks_until_login() {
    let remote = MemoryRemote::seeded(backlog());
    let session = Arc::new(TokenSession::new());
    let store = TaskStore::new(Arc::clone(&remote)).with_session(session.clone());

    assert!(matches!(store.load().await, Err(TaskStoreError::Unauthenticated)));
    assert!(store.view().is_empty());

    session.login("bearer-token");
    store.load().await.expect("load after login");
    assert_eq!(store.view().len(), 4);

    session.logout();
    let plan = store.tasks()[0].clone();
    assert!(matches!(
        store.toggle_completion(&plan).await,
        Err(TaskStoreError::Unauthenticated)
    ));
}
