//! High-level entry points for the presentation layer.

use crate::api::{HttpTodoApi, TodoApi};
use crate::config::ClientConfig;
use crate::environment::TodoEnvironment;
use crate::error::ApiError;
use crate::notification::NotificationId;
use crate::reducer::TodoReducer;
use crate::types::{Filter, TaskId, Theme, TodoAction, TodoState};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use todo_runtime::{Store, StoreConfig, StoreError};

/// Store specialised for the todo list
pub type TodoStore = Store<TodoState, TodoAction, TodoEnvironment, TodoReducer>;

/// Todo list state manager
///
/// Each method dispatches one action and returns once the remote call it
/// started (if any) has answered and the answer has been applied. Delayed
/// notification dismissals keep running in the background.
///
/// Clones share the same store.
///
/// # Example
///
/// ```
/// use todo_client::api::InMemoryTodoApi;
/// use todo_client::{Filter, Task, TaskId, TodoEnvironment, TodoManager, Theme};
///
/// # async fn demo() -> Result<(), todo_runtime::StoreError> {
/// let api = InMemoryTodoApi::with_tasks(vec![Task::new(TaskId::new("1"), "Buy milk")]);
/// let manager = TodoManager::new(TodoEnvironment::new(api.shared()), Theme::Light);
///
/// manager.load_tasks(Filter::All).await?;
/// manager.create_task("Walk dog").await?;
/// assert_eq!(manager.snapshot().await.tasks.len(), 2);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct TodoManager {
    store: TodoStore,
}

impl TodoManager {
    /// Manager with an empty list and default store settings
    #[must_use]
    pub fn new(environment: TodoEnvironment, theme: Theme) -> Self {
        Self::with_store_config(environment, TodoState::new(theme), StoreConfig::default())
    }

    /// Manager with explicit initial state and store settings
    #[must_use]
    pub fn with_store_config(
        environment: TodoEnvironment,
        initial_state: TodoState,
        config: StoreConfig,
    ) -> Self {
        Self {
            store: Store::with_config(initial_state, TodoReducer::new(), environment, config),
        }
    }

    /// Manager for the HTTP backend described by `config`
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        let api = HttpTodoApi::new(config.api_url.clone(), config.request_timeout)?;
        Ok(Self::with_api(config, Arc::new(api)))
    }

    /// Manager using `api`, with the remaining settings from `config`
    #[must_use]
    pub fn with_api(config: &ClientConfig, api: Arc<dyn TodoApi>) -> Self {
        let environment =
            TodoEnvironment::new(api).with_notification_ttl(config.notification_ttl);
        let store_config = StoreConfig::default().with_broadcast_capacity(config.broadcast_capacity);
        Self::with_store_config(environment, TodoState::new(config.theme), store_config)
    }

    /// Sends an action and waits for the effects it started
    async fn dispatch(&self, action: TodoAction) -> Result<(), StoreError> {
        let mut handle = self.store.send(action).await?;
        handle.wait().await;
        Ok(())
    }

    /// Switch to `filter` and reload the list
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`shutdown`](Self::shutdown).
    /// Remote failures surface as notifications, not errors.
    pub async fn load_tasks(&self, filter: Filter) -> Result<(), StoreError> {
        self.dispatch(TodoAction::LoadTasks { filter }).await
    }

    /// Create a task titled `title`
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after shutdown.
    pub async fn create_task(&self, title: impl Into<String>) -> Result<(), StoreError> {
        self.dispatch(TodoAction::CreateTask {
            title: title.into(),
        })
        .await
    }

    /// Replace the new-task input
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after shutdown.
    pub async fn set_input(&self, text: impl Into<String>) -> Result<(), StoreError> {
        self.dispatch(TodoAction::SetInput { text: text.into() })
            .await
    }

    /// Create a task from the new-task input
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after shutdown.
    pub async fn submit_input(&self) -> Result<(), StoreError> {
        self.dispatch(TodoAction::SubmitInput).await
    }

    /// Mark a task completed (`true`) or active (`false`)
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after shutdown.
    pub async fn set_completion(&self, id: &TaskId, completed: bool) -> Result<(), StoreError> {
        self.dispatch(TodoAction::SetCompletion {
            id: id.clone(),
            completed,
        })
        .await
    }

    /// Delete a task
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after shutdown.
    pub async fn delete_task(&self, id: &TaskId) -> Result<(), StoreError> {
        self.dispatch(TodoAction::DeleteTask { id: id.clone() })
            .await
    }

    /// Delete every completed task, waiting for all deletes
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after shutdown.
    pub async fn clear_completed(&self) -> Result<(), StoreError> {
        self.dispatch(TodoAction::ClearCompleted).await
    }

    /// Switch between light and dark
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after shutdown.
    pub async fn toggle_theme(&self) -> Result<(), StoreError> {
        self.dispatch(TodoAction::ToggleTheme).await
    }

    /// Remove a notification before its TTL expires
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after shutdown.
    pub async fn dismiss_notification(&self, id: NotificationId) -> Result<(), StoreError> {
        self.dispatch(TodoAction::DismissNotification { id }).await
    }

    /// Copy of the current view state
    pub async fn snapshot(&self) -> TodoState {
        self.store.state(Clone::clone).await
    }

    /// Read part of the view state without cloning all of it
    pub async fn read<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&TodoState) -> T,
    {
        self.store.state(f).await
    }

    /// Revision counter that changes after every state update
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.store.subscribe_state()
    }

    /// Every action fed back by effects (remote responses, dismissals)
    #[must_use]
    pub fn subscribe_actions(&self) -> broadcast::Receiver<TodoAction> {
        self.store.subscribe_actions()
    }

    /// Stop accepting actions and wait up to `timeout` for in-flight effects
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownTimeout`] if effects are still running
    /// when `timeout` elapses.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
        self.store.shutdown(timeout).await
    }

    /// Underlying store
    #[must_use]
    pub const fn store(&self) -> &TodoStore {
        &self.store
    }
}

impl std::fmt::Debug for TodoManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoManager")
            .field("environment", self.store.environment())
            .finish_non_exhaustive()
    }
}
