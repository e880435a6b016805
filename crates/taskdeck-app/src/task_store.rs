//! Authoritative task collection and its reconciliation with the remote store.

use std::sync::{Arc, Mutex};

use anyhow::Error;
use time::OffsetDateTime;
use tracing::{debug, warn};

use taskdeck_core::due::format_due;
use taskdeck_core::{
    CreateTaskRequest, FilterCriteria, Task, TaskId, TaskStatus, UpdateTaskPatch,
    ViewEngine,
};

use crate::criteria_store::FilterCriteriaStore;
use crate::edit::{EditOutcome, TaskDraft};
use crate::observer::SubscriptionId;
use crate::outcome::{Notifier, OperationKind, Outcome, SilentNotifier};
use crate::pending::{PendingGuard, PendingOperations};
use crate::remote::RemoteTaskStore;
use crate::session::Session;
use crate::sync::guard;
use crate::view::DerivedView;

/// Description stored when a new task is created without one.
pub const PLACEHOLDER_DESCRIPTION: &str = "you did not provide any description for this task!";

/// Errors surfaced by [`TaskStore`].
#[derive(thiserror::Error, Debug)]
pub enum TaskStoreError {
    /// The remote store failed; local state was left untouched.
    #[error("remote store error: {0}")]
    Remote(#[from] Error),
    /// Another mutation on the same task has not settled yet.
    #[error("task {0} already has an operation in flight")]
    InFlight(TaskId),
    /// No signed-in user.
    #[error("not authenticated")]
    Unauthenticated,
    /// The request was rejected before reaching the remote store.
    #[error("invalid task: {0}")]
    Invalid(String),
}

#[derive(Debug, Default)]
struct StoreState {
    tasks: Vec<Task>,
    version: u64,
    loads_in_flight: usize,
    criteria: FilterCriteria,
}

/// Owner of the authoritative task collection.
///
/// Every change to the collection or to the criteria recomputes the [`DerivedView`]
/// synchronously. Mutations carry the collection version they were issued against;
/// when a `load()` replaced the collection before a mutation settled, that mutation's
/// result is not merged back.
pub struct TaskStore<R> {
    remote: R,
    engine: ViewEngine,
    state: Mutex<StoreState>,
    pending: PendingOperations,
    view: Arc<DerivedView>,
    notifier: Arc<dyn Notifier>,
    session: Option<Arc<dyn Session>>,
}

impl<R> std::fmt::Debug for TaskStore<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = guard(&self.state);
        f.debug_struct("TaskStore")
            .field("tasks", &state.tasks.len())
            .field("version", &state.version)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

impl<R: RemoteTaskStore> TaskStore<R> {
    /// Store with no tasks, default criteria and a silent notifier.
    pub fn new(remote: R) -> Self {
        Self {
            remote,
            engine: ViewEngine::default(),
            state: Mutex::new(StoreState::default()),
            pending: PendingOperations::new(),
            view: Arc::new(DerivedView::default()),
            notifier: Arc::new(SilentNotifier),
            session: None,
        }
    }

    /// Deliver outcomes to `notifier`.
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Refuse every operation while `session` is signed out.
    #[must_use]
    pub fn with_session(mut self, session: Arc<dyn Session>) -> Self {
        self.session = Some(session);
        self
    }

    /// Evaluate due dates with `engine`.
    #[must_use]
    pub fn with_engine(mut self, engine: ViewEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Start from `criteria` instead of the defaults.
    #[must_use]
    pub fn with_criteria(self, criteria: FilterCriteria) -> Self {
        guard(&self.state).criteria = criteria;
        self
    }

    /// Underlying remote store.
    pub const fn remote(&self) -> &R {
        &self.remote
    }

    /// Derived view fed by this store.
    pub const fn view(&self) -> &Arc<DerivedView> {
        &self.view
    }

    /// Ids with a remote mutation in flight.
    pub const fn pending(&self) -> &PendingOperations {
        &self.pending
    }

    /// Whether a `load()` is in flight.
    pub fn is_loading(&self) -> bool {
        guard(&self.state).loads_in_flight > 0
    }

    /// Copy of the authoritative collection.
    pub fn tasks(&self) -> Vec<Task> {
        guard(&self.state).tasks.clone()
    }

    /// Number of successful loads so far.
    pub fn version(&self) -> u64 {
        guard(&self.state).version
    }

    /// Criteria the view is currently computed with.
    pub fn criteria(&self) -> FilterCriteria {
        guard(&self.state).criteria.clone()
    }

    /// Replace the criteria and recompute the view.
    pub fn set_criteria(&self, criteria: FilterCriteria) {
        guard(&self.state).criteria = criteria;
        self.recompute();
    }

    /// Replace the authoritative collection with the remote one.
    ///
    /// # Errors
    /// [`TaskStoreError::Unauthenticated`] without a session, [`TaskStoreError::Remote`]
    /// when listing fails (the collection is kept as it was).
    pub async fn load(&self) -> Result<(), TaskStoreError> {
        self.ensure_authenticated()?;
        let loading = LoadingGuard::enter(&self.state);
        let result: Result<_, Error> = self.remote.list_tasks().await.map_err(Into::into);
        drop(loading);
        match result {
            Ok(tasks) => {
                {
                    let mut state = guard(&self.state);
                    debug!(count = tasks.len(), version = state.version + 1, "Loaded tasks");
                    state.tasks = tasks;
                    state.version += 1;
                }
                self.recompute();
                Ok(())
            }
            Err(err) => Err(self.fail(OperationKind::Load, err)),
        }
    }

    /// Create a task from `draft` and append the stored result.
    ///
    /// Missing description, status, priority and due date are filled with defaults.
    ///
    /// # Errors
    /// [`TaskStoreError::Invalid`] for a blank title, [`TaskStoreError::Unauthenticated`]
    /// without a session, [`TaskStoreError::Remote`] when the remote call fails.
    pub async fn create(&self, draft: TaskDraft) -> Result<Task, TaskStoreError> {
        self.ensure_authenticated()?;
        let request = create_request(&draft, OffsetDateTime::now_utc())?;
        let issued = self.version();
        let result: Result<_, Error> = self.remote.create_task(&request).await.map_err(Into::into);
        match result {
            Ok(task) => {
                let stored = task.clone();
                self.reconcile(issued, OperationKind::Create, move |tasks| tasks.push(stored));
                self.notifier.notify(Outcome::success(OperationKind::Create));
                Ok(task)
            }
            Err(err) => Err(self.fail(OperationKind::Create, err)),
        }
    }

    /// Apply `patch` to the task `id` and replace it in place with the stored result.
    ///
    /// # Errors
    /// [`TaskStoreError::InFlight`] when `id` is already being mutated,
    /// [`TaskStoreError::Invalid`] for an empty patch, [`TaskStoreError::Unauthenticated`]
    /// without a session, [`TaskStoreError::Remote`] when the remote call fails.
    pub async fn update(&self, id: TaskId, patch: UpdateTaskPatch) -> Result<Task, TaskStoreError> {
        self.ensure_authenticated()?;
        if patch.is_empty() {
            return Err(TaskStoreError::Invalid(format!("nothing to update for task {id}")));
        }
        self.send_update(id, patch, OperationKind::Update).await
    }

    /// Flip `task` between `COMPLETED` and `TODO`, keeping every other field.
    ///
    /// # Errors
    /// Same as [`TaskStore::update`].
    pub async fn toggle_completion(&self, task: &Task) -> Result<Task, TaskStoreError> {
        self.ensure_authenticated()?;
        let status = task.toggled_status();
        let kind = if status == TaskStatus::Completed {
            OperationKind::Complete
        } else {
            OperationKind::Uncomplete
        };
        let patch = UpdateTaskPatch::from_task(task).with_status(status);
        self.send_update(task.id, patch, kind).await
    }

    /// Delete the task `id` and drop it from the collection.
    ///
    /// # Errors
    /// [`TaskStoreError::InFlight`] when `id` is already being mutated,
    /// [`TaskStoreError::Unauthenticated`] without a session, [`TaskStoreError::Remote`]
    /// when the remote call fails.
    pub async fn delete(&self, id: TaskId) -> Result<(), TaskStoreError> {
        self.ensure_authenticated()?;
        let pending = self.begin(id)?;
        let issued = self.version();
        let result: Result<_, Error> = self.remote.delete_task(id).await.map_err(Into::into);
        drop(pending);
        match result {
            Ok(()) => {
                self.reconcile(issued, OperationKind::Delete, |tasks| {
                    tasks.retain(|task| task.id != id);
                });
                self.notifier.notify(Outcome::success(OperationKind::Delete));
                Ok(())
            }
            Err(err) => Err(self.fail(OperationKind::Delete, err)),
        }
    }

    /// Act on what the edit surface returned.
    ///
    /// `existing` selects the edit flow (update) over the create flow. Returns the stored
    /// task, or `None` when the user cancelled.
    ///
    /// # Errors
    /// Whatever [`TaskStore::create`] or [`TaskStore::update`] reports.
    pub async fn submit_edit(
        &self,
        existing: Option<&Task>,
        outcome: EditOutcome,
    ) -> Result<Option<Task>, TaskStoreError> {
        let EditOutcome::Submitted(draft) = outcome else {
            return Ok(None);
        };
        let stored = match existing {
            None => self.create(draft).await?,
            Some(task) => {
                let clean = draft.clean();
                if clean.title.is_empty() {
                    return Err(TaskStoreError::Invalid("title must not be empty".into()));
                }
                let patch = UpdateTaskPatch {
                    title: Some(clean.title),
                    description: Some(clean.description.unwrap_or_default()),
                    status: Some(clean.status).filter(|status| status.is_known()),
                    priority: Some(clean.priority).filter(|priority| priority.is_known()),
                    due_date: clean.due_date,
                };
                self.update(task.id, patch).await?
            }
        };
        Ok(Some(stored))
    }

    async fn send_update(
        &self,
        id: TaskId,
        patch: UpdateTaskPatch,
        kind: OperationKind,
    ) -> Result<Task, TaskStoreError> {
        let pending = self.begin(id)?;
        let issued = self.version();
        let result: Result<_, Error> = self.remote.update_task(id, &patch).await.map_err(Into::into);
        drop(pending);
        match result {
            Ok(task) => {
                let stored = task.clone();
                self.reconcile(issued, kind, move |tasks| {
                    if let Some(slot) = tasks.iter_mut().find(|task| task.id == id) {
                        *slot = stored;
                    }
                });
                self.notifier.notify(Outcome::success(kind));
                Ok(task)
            }
            Err(err) => Err(self.fail(kind, err)),
        }
    }

    fn begin(&self, id: TaskId) -> Result<PendingGuard, TaskStoreError> {
        self.pending.begin(id).ok_or_else(|| {
            debug!(task = %id, "Rejected mutation while another one is in flight");
            TaskStoreError::InFlight(id)
        })
    }

    fn ensure_authenticated(&self) -> Result<(), TaskStoreError> {
        match &self.session {
            Some(session) if !session.is_authenticated() => Err(TaskStoreError::Unauthenticated),
            _ => Ok(()),
        }
    }

    fn reconcile(&self, issued: u64, kind: OperationKind, change: impl FnOnce(&mut Vec<Task>)) {
        {
            let mut state = guard(&self.state);
            if state.version != issued {
                debug!(
                    operation = ?kind,
                    issued,
                    current = state.version,
                    "Collection reloaded while the call was in flight; skipping reconciliation"
                );
                return;
            }
            change(&mut state.tasks);
        }
        self.recompute();
    }

    fn recompute(&self) {
        let next = {
            let state = guard(&self.state);
            self.engine.apply(&state.tasks, &state.criteria)
        };
        self.view.replace(next);
    }

    fn fail(&self, kind: OperationKind, err: Error) -> TaskStoreError {
        warn!(operation = ?kind, error = %err, "Remote call failed");
        self.notifier.notify(Outcome::failure(kind));
        TaskStoreError::Remote(err)
    }
}

impl<R> TaskStore<R>
where
    R: RemoteTaskStore + Send + Sync + 'static,
{
    /// Keep this store's criteria in step with `criteria`.
    ///
    /// Takes the current criteria immediately, then every republished value.
    /// The subscription holds only a weak reference to the store.
    pub fn follow(self: &Arc<Self>, criteria: &FilterCriteriaStore) -> SubscriptionId {
        self.set_criteria(criteria.current());
        let store = Arc::downgrade(self);
        criteria.subscribe(move |next: &FilterCriteria| {
            if let Some(store) = store.upgrade() {
                store.set_criteria(next.clone());
            }
        })
    }
}

struct LoadingGuard<'a> {
    state: &'a Mutex<StoreState>,
}

impl<'a> LoadingGuard<'a> {
    fn enter(state: &'a Mutex<StoreState>) -> Self {
        guard(state).loads_in_flight += 1;
        Self { state }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let mut state = guard(self.state);
        state.loads_in_flight = state.loads_in_flight.saturating_sub(1);
    }
}

fn create_request(draft: &TaskDraft, now: OffsetDateTime) -> Result<CreateTaskRequest, TaskStoreError> {
    let clean = draft.clean();
    if clean.title.is_empty() {
        return Err(TaskStoreError::Invalid("title must not be empty".into()));
    }
    let due_date = clean
        .due_date
        .or_else(|| format_due(now))
        .ok_or_else(|| TaskStoreError::Invalid("due date cannot be formatted".into()))?;
    Ok(CreateTaskRequest {
        title: clean.title,
        description: Some(
            clean
                .description
                .unwrap_or_else(|| PLACEHOLDER_DESCRIPTION.to_owned()),
        ),
        status: Some(clean.status)
            .filter(|status| status.is_known())
            .unwrap_or_default(),
        priority: Some(clean.priority)
            .filter(|priority| priority.is_known())
            .unwrap_or_default(),
        due_date,
    })
}
