//! REST implementation of [`TodoApi`]

use super::{ApiFuture, NewTask, TaskStatusUpdate, TodoApi};
use crate::error::ApiError;
use crate::types::{Task, TaskId};
use futures::FutureExt;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Todo backend client
#[derive(Clone, Debug)]
pub struct HttpTodoApi {
    client: Client,
    api_url: String,
}

impl HttpTodoApi {
    /// Create a client for the API rooted at `api_url` (e.g. `https://host/api`)
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Network` if the HTTP client cannot be built
    /// (for example when no TLS backend is available).
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self::with_client(client, api_url))
    }

    /// Create a client reusing an existing `reqwest::Client`
    #[must_use]
    pub fn with_client(client: Client, api_url: impl Into<String>) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        Self { client, api_url }
    }

    /// Root URL of the API
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn collection_url(&self) -> String {
        format!("{}/todos", self.api_url)
    }

    fn task_url(&self, id: &TaskId) -> String {
        format!("{}/todos/{}", self.api_url, id)
    }

    /// Fetch every task
    ///
    /// # Errors
    ///
    /// Returns errors for network failures, non-success statuses, or bodies
    /// that are not a task array
    pub async fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        let url = self.collection_url();
        tracing::debug!(%url, "GET tasks");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(network_error)?;

        decode(response).await
    }

    /// Create a task
    ///
    /// # Errors
    ///
    /// Returns errors for network failures, non-success statuses, or bodies
    /// that are not a task
    pub async fn create_task(&self, request: NewTask) -> Result<Task, ApiError> {
        let url = self.collection_url();
        tracing::debug!(%url, title = %request.title, "POST task");

        let response = self
            .client
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(network_error)?;

        decode(response).await
    }

    /// Set a task's status flags
    ///
    /// # Errors
    ///
    /// Returns errors for network failures, non-success statuses, or bodies
    /// that are not a task
    pub async fn update_task(&self, id: &TaskId, update: TaskStatusUpdate) -> Result<Task, ApiError> {
        let url = self.task_url(id);
        tracing::debug!(%url, is_completed = update.is_completed, "PUT task");

        let response = self
            .client
            .put(url)
            .json(&update)
            .send()
            .await
            .map_err(network_error)?;

        decode(response).await
    }

    /// Delete a task
    ///
    /// The response body is ignored.
    ///
    /// # Errors
    ///
    /// Returns errors for network failures or non-success statuses
    pub async fn delete_task(&self, id: &TaskId) -> Result<(), ApiError> {
        let url = self.task_url(id);
        tracing::debug!(%url, "DELETE task");

        let response = self
            .client
            .delete(url)
            .send()
            .await
            .map_err(network_error)?;

        check_status(response).await.map(drop)
    }
}

impl TodoApi for HttpTodoApi {
    fn list(&self) -> ApiFuture<Vec<Task>> {
        let api = self.clone();
        async move { api.list_tasks().await }.boxed()
    }

    fn create(&self, request: NewTask) -> ApiFuture<Task> {
        let api = self.clone();
        async move { api.create_task(request).await }.boxed()
    }

    fn update(&self, id: &TaskId, update: TaskStatusUpdate) -> ApiFuture<Task> {
        let api = self.clone();
        let id = id.clone();
        async move { api.update_task(&id, update).await }.boxed()
    }

    fn delete(&self, id: &TaskId) -> ApiFuture<()> {
        let api = self.clone();
        let id = id.clone();
        async move { api.delete_task(&id).await }.boxed()
    }
}

fn network_error(error: reqwest::Error) -> ApiError {
    if error.is_timeout() {
        ApiError::Network(format!("request timed out: {error}"))
    } else {
        ApiError::Network(error.to_string())
    }
}

async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Server {
        status: status.as_u16(),
        body,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let response = check_status(response).await?;
    let bytes = response.bytes().await.map_err(network_error)?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::Parse(e.to_string()))
}
