//! In-process task collection for tests and offline use.

use super::{ApiFuture, NewTask, TaskStatusUpdate, TodoApi};
use crate::error::ApiError;
use crate::types::{Task, TaskId};
use futures::FutureExt;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Kind of API call, used to target injected failures and delays
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallKind {
    /// `list`
    List,
    /// `create`
    Create,
    /// `update`
    Update,
    /// `delete`
    Delete,
}

/// A recorded API call
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiCall {
    /// `GET /todos`
    List,
    /// `POST /todos`
    Create {
        /// Requested title
        title: String,
    },
    /// `PUT /todos/{id}`
    Update {
        /// Target task
        id: TaskId,
        /// Requested flags
        update: TaskStatusUpdate,
    },
    /// `DELETE /todos/{id}`
    Delete {
        /// Target task
        id: TaskId,
    },
}

impl ApiCall {
    /// Kind of this call
    #[must_use]
    pub const fn kind(&self) -> CallKind {
        match self {
            Self::List => CallKind::List,
            Self::Create { .. } => CallKind::Create,
            Self::Update { .. } => CallKind::Update,
            Self::Delete { .. } => CallKind::Delete,
        }
    }
}

#[derive(Debug, Default)]
struct Backend {
    tasks: Vec<Task>,
    next_id: u64,
    calls: Vec<ApiCall>,
    failures: VecDeque<(CallKind, ApiError)>,
    delays: VecDeque<(CallKind, Duration)>,
}

impl Backend {
    fn take_failure(&mut self, kind: CallKind) -> Option<ApiError> {
        let index = self.failures.iter().position(|(k, _)| *k == kind)?;
        self.failures.remove(index).map(|(_, error)| error)
    }

    fn take_delay(&mut self, kind: CallKind) -> Option<Duration> {
        let index = self.delays.iter().position(|(k, _)| *k == kind)?;
        self.delays.remove(index).map(|(_, delay)| delay)
    }
}

/// Task collection kept in memory
///
/// Clones share the same collection. Every call is recorded at the moment it
/// is issued; the collection itself changes when the returned future runs.
///
/// # Example
///
/// ```
/// use todo_client::api::{CallKind, InMemoryTodoApi, TodoApi};
/// use todo_client::error::ApiError;
///
/// # async fn demo() {
/// let api = InMemoryTodoApi::new();
/// api.fail_next(CallKind::List, ApiError::Network("offline".into()));
///
/// assert!(api.list().await.is_err());
/// assert!(api.list().await.is_ok());
/// assert_eq!(api.calls().len(), 2);
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryTodoApi {
    backend: Arc<Mutex<Backend>>,
}

impl InMemoryTodoApi {
    /// Empty collection
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Collection seeded with `tasks`, keeping their ids
    #[must_use]
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let api = Self::new();
        api.lock().tasks = tasks;
        api
    }

    /// Creates an Arc-wrapped instance for sharing
    #[must_use]
    pub fn shared(self) -> Arc<dyn TodoApi> {
        Arc::new(self)
    }

    fn lock(&self) -> MutexGuard<'_, Backend> {
        self.backend.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fail the next call of `kind` with `error`
    ///
    /// Injected failures queue up and are consumed in order.
    pub fn fail_next(&self, kind: CallKind, error: ApiError) {
        self.lock().failures.push_back((kind, error));
    }

    /// Hold the response of the next call of `kind` for `delay`
    pub fn delay_next(&self, kind: CallKind, delay: Duration) {
        self.lock().delays.push_back((kind, delay));
    }

    /// Every call issued so far, in order
    #[must_use]
    pub fn calls(&self) -> Vec<ApiCall> {
        self.lock().calls.clone()
    }

    /// Number of calls of `kind` issued so far
    #[must_use]
    pub fn call_count(&self, kind: CallKind) -> usize {
        self.lock().calls.iter().filter(|c| c.kind() == kind).count()
    }

    /// Current server-side collection
    #[must_use]
    pub fn tasks(&self) -> Vec<Task> {
        self.lock().tasks.clone()
    }

    /// Records `call` and returns the failure and delay assigned to it
    fn issue(&self, call: ApiCall) -> (Option<ApiError>, Option<Duration>) {
        let kind = call.kind();
        let mut backend = self.lock();
        backend.calls.push(call);
        (backend.take_failure(kind), backend.take_delay(kind))
    }

    fn respond<T, F>(&self, call: ApiCall, apply: F) -> ApiFuture<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Backend) -> Result<T, ApiError> + Send + 'static,
    {
        let (failure, delay) = self.issue(call);
        let backend = Arc::clone(&self.backend);

        async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            if let Some(error) = failure {
                return Err(error);
            }
            let mut backend = backend.lock().unwrap_or_else(PoisonError::into_inner);
            apply(&mut backend)
        }
        .boxed()
    }
}

fn not_found(id: &TaskId) -> ApiError {
    ApiError::Server {
        status: 404,
        body: format!("task {id} not found"),
    }
}

impl TodoApi for InMemoryTodoApi {
    fn list(&self) -> ApiFuture<Vec<Task>> {
        self.respond(ApiCall::List, |backend| Ok(backend.tasks.clone()))
    }

    fn create(&self, request: NewTask) -> ApiFuture<Task> {
        let call = ApiCall::Create {
            title: request.title.clone(),
        };
        self.respond(call, move |backend| {
            backend.next_id += 1;
            let task = Task::new(TaskId::new(format!("task-{}", backend.next_id)), request.title);
            backend.tasks.push(task.clone());
            Ok(task)
        })
    }

    fn update(&self, id: &TaskId, update: TaskStatusUpdate) -> ApiFuture<Task> {
        let call = ApiCall::Update {
            id: id.clone(),
            update,
        };
        let id = id.clone();
        self.respond(call, move |backend| {
            let task = backend
                .tasks
                .iter_mut()
                .find(|task| task.id == id)
                .ok_or_else(|| not_found(&id))?;
            task.is_active = update.is_active;
            task.is_completed = update.is_completed;
            Ok(task.clone())
        })
    }

    fn delete(&self, id: &TaskId) -> ApiFuture<()> {
        let call = ApiCall::Delete { id: id.clone() };
        let id = id.clone();
        self.respond(call, move |backend| {
            let position = backend
                .tasks
                .iter()
                .position(|task| task.id == id)
                .ok_or_else(|| not_found(&id))?;
            backend.tasks.remove(position);
            Ok(())
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn seeded() -> InMemoryTodoApi {
        InMemoryTodoApi::with_tasks(vec![
            Task::new(TaskId::new("1"), "Buy milk"),
            Task::new(TaskId::new("2"), "Walk dog").with_completion(true),
        ])
    }

    #[tokio::test]
    async fn create_assigns_fresh_ids() {
        let api = seeded();
        let first = api
            .create(NewTask {
                title: "A".to_string(),
            })
            .await
            .unwrap();
        let second = api
            .create(NewTask {
                title: "B".to_string(),
            })
            .await
            .unwrap();

        assert_ne!(first.id, second.id);
        assert!(first.is_active && !first.is_completed);
        assert_eq!(api.tasks().len(), 4);
    }

    #[tokio::test]
    async fn update_and_delete_missing_task_is_not_found() {
        let api = seeded();
        let missing = TaskId::new("nope");

        let error = api
            .update(&missing, TaskStatusUpdate::completion(true))
            .await
            .unwrap_err();
        assert!(error.is_not_found());
        assert!(api.delete(&missing).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn update_sets_both_flags() {
        let api = seeded();
        let task = api
            .update(&TaskId::new("2"), TaskStatusUpdate::completion(false))
            .await
            .unwrap();
        assert!(task.is_active && !task.is_completed);
        assert_eq!(api.tasks()[1], task);
    }

    #[tokio::test]
    async fn injected_failure_leaves_collection_untouched() {
        let api = seeded();
        api.fail_next(
            CallKind::Delete,
            ApiError::Server {
                status: 500,
                body: String::new(),
            },
        );

        assert!(api.delete(&TaskId::new("1")).await.is_err());
        assert_eq!(api.tasks().len(), 2);
        assert!(api.delete(&TaskId::new("1")).await.is_ok());
        assert_eq!(api.tasks().len(), 1);
        assert_eq!(api.call_count(CallKind::Delete), 2);
    }

    #[tokio::test]
    async fn calls_are_recorded_when_issued() {
        let api = seeded();
        let pending = api.list();
        assert_eq!(api.calls(), vec![ApiCall::List]);
        assert_eq!(pending.await.unwrap().len(), 2);
    }
}
