//! Remote task API.
//!
//! [`TodoApi`] is the seam between the reducer's effects and the network.
//! [`HttpTodoApi`] talks to the REST backend; [`InMemoryTodoApi`] keeps the
//! collection in process for tests and offline use.

use crate::error::ApiError;
use crate::types::{Task, TaskId};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

mod http;
mod memory;

pub use http::HttpTodoApi;
pub use memory::{ApiCall, CallKind, InMemoryTodoApi};

/// Future returned by every [`TodoApi`] call
pub type ApiFuture<T> = BoxFuture<'static, Result<T, ApiError>>;

/// Body of `POST /todos`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    /// Title of the task
    pub title: String,
}

/// Body of `PUT /todos/{id}`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatusUpdate {
    /// New active flag
    pub is_active: bool,
    /// New completed flag
    pub is_completed: bool,
}

impl TaskStatusUpdate {
    /// Update that sets the completion status and its complement
    #[must_use]
    pub const fn completion(completed: bool) -> Self {
        Self {
            is_active: !completed,
            is_completed: completed,
        }
    }
}

/// Task collection on the server
///
/// Calls return `'static` futures so effects can own them after the reducer
/// returns.
pub trait TodoApi: Send + Sync {
    /// `GET /todos`: every task, unfiltered
    fn list(&self) -> ApiFuture<Vec<Task>>;

    /// `POST /todos`: the created task with its server-assigned id
    fn create(&self, request: NewTask) -> ApiFuture<Task>;

    /// `PUT /todos/{id}`: the updated task
    fn update(&self, id: &TaskId, update: TaskStatusUpdate) -> ApiFuture<Task>;

    /// `DELETE /todos/{id}`
    fn delete(&self, id: &TaskId) -> ApiFuture<()>;
}
