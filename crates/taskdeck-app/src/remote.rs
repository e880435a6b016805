//! Remote task store abstraction consumed by [`crate::TaskStore`].

use anyhow::Error;
use taskdeck_core::{CreateTaskRequest, Task, TaskId, UpdateTaskPatch};

/// Networked CRUD endpoint holding the user's tasks.
///
/// Every method may fail with a transport or server error; the task store treats
/// all failures the same way.
#[allow(async_fn_in_trait)]
pub trait RemoteTaskStore {
    /// Error type bubbled up from the backing store.
    type Error: Into<Error>;

    /// Fetch the full task collection.
    ///
    /// # Errors
    /// Returns a store-specific error when the request fails.
    async fn list_tasks(&self) -> Result<Vec<Task>, Self::Error>;

    /// Create a task and return it with its assigned id and timestamps.
    ///
    /// # Errors
    /// Returns a store-specific error when the request fails.
    async fn create_task(&self, request: &CreateTaskRequest) -> Result<Task, Self::Error>;

    /// Apply `patch` to the task and return the stored result.
    ///
    /// # Errors
    /// Returns a store-specific error when the request fails.
    async fn update_task(&self, id: TaskId, patch: &UpdateTaskPatch) -> Result<Task, Self::Error>;

    /// Delete the task.
    ///
    /// # Errors
    /// Returns a store-specific error when the request fails.
    async fn delete_task(&self, id: TaskId) -> Result<(), Self::Error>;
}

impl<T: RemoteTaskStore> RemoteTaskStore for &T {
    type Error = T::Error;

    async fn list_tasks(&self) -> Result<Vec<Task>, Self::Error> {
        (**self).list_tasks().await
    }

    async fn create_task(&self, request: &CreateTaskRequest) -> Result<Task, Self::Error> {
        (**self).create_task(request).await
    }

    async fn update_task(&self, id: TaskId, patch: &UpdateTaskPatch) -> Result<Task, Self::Error> {
        (**self).update_task(id, patch).await
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), Self::Error> {
        (**self).delete_task(id).await
    }
}

impl<T: RemoteTaskStore> RemoteTaskStore for std::sync::Arc<T> {
    type Error = T::Error;

    async fn list_tasks(&self) -> Result<Vec<Task>, Self::Error> {
        (**self).list_tasks().await
    }

    async fn create_task(&self, request: &CreateTaskRequest) -> Result<Task, Self::Error> {
        (**self).create_task(request).await
    }

    async fn update_task(&self, id: TaskId, patch: &UpdateTaskPatch) -> Result<Task, Self::Error> {
        (**self).update_task(id, patch).await
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), Self::Error> {
        (**self).delete_task(id).await
    }
}
