//! Task CRUD against `{base}/api/tasks`.

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use time::OffsetDateTime;
use tracing::debug;

use taskdeck_app::RemoteTaskStore;
use taskdeck_core::due::format_due;
use taskdeck_core::{CreateTaskRequest, Task, TaskId, TaskPriority, TaskStatus, UpdateTaskPatch};

use crate::error::{check, HttpStoreError};

/// Remote task store backed by the task service's REST API.
#[derive(Debug, Clone)]
pub struct HttpTaskStore {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpTaskStore {
    /// Store talking to `base_url` (scheme, host and port; no trailing path).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Store reusing an existing HTTP client.
    #[must_use]
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self {
            client,
            base_url,
            token: None,
        }
    }

    /// Send `token` as a bearer credential on every request.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Server-side filtering through `GET /api/tasks/filter`.
    ///
    /// # Errors
    /// Returns [`HttpStoreError`] on transport failures or non-success responses.
    pub async fn filter_tasks(
        &self,
        status: Option<TaskStatus>,
        priority: Option<TaskPriority>,
        due_before: Option<OffsetDateTime>,
    ) -> Result<Vec<Task>, HttpStoreError> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(status) = status {
            query.push(("status", status.as_str().to_owned()));
        }
        if let Some(priority) = priority {
            query.push(("priority", priority.as_str().to_owned()));
        }
        if let Some(due) = due_before.and_then(format_due) {
            query.push(("dueDateBefore", due));
        }
        let request = self.client.get(self.url("/filter")).query(&query);
        self.fetch(request).await
    }

    fn url(&self, suffix: &str) -> String {
        format!("{}/api/tasks{suffix}", self.base_url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, HttpStoreError> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request.send().await?;
        debug!(url = %response.url(), status = %response.status(), "Task service responded");
        check(response).await
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, HttpStoreError> {
        Ok(self.send(request).await?.json().await?)
    }
}

impl RemoteTaskStore for HttpTaskStore {
    type Error = HttpStoreError;

    async fn list_tasks(&self) -> Result<Vec<Task>, Self::Error> {
        self.fetch(self.client.get(self.url(""))).await
    }

    async fn create_task(&self, request: &CreateTaskRequest) -> Result<Task, Self::Error> {
        self.fetch(self.client.post(self.url("")).json(request)).await
    }

    async fn update_task(&self, id: TaskId, patch: &UpdateTaskPatch) -> Result<Task, Self::Error> {
        self.fetch(self.client.put(self.url(&format!("/{id}"))).json(patch))
            .await
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), Self::Error> {
        self.send(self.client.delete(self.url(&format!("/{id}"))))
            .await
            .map(|_| ())
    }
}
