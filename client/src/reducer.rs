//! Reducer for the todo view state.
//!
//! User intents either update state directly or start a remote call as a
//! `Future` effect. The call's outcome comes back as a response action that
//! resolves the notification created for the request.
//!
//! Create and update change the list only once the server answers. Delete
//! and clear-completed change it immediately and are never rolled back.

use crate::api::{NewTask, TaskStatusUpdate};
use crate::environment::TodoEnvironment;
use crate::error::ApiError;
use crate::notification::{NotificationId, NotificationStatus, Operation};
use crate::types::{ClearProgress, Filter, Task, TaskId, TodoAction, TodoState};
use todo_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};

type Effects = SmallVec<[Effect<TodoAction>; 4]>;

const EMPTY_TITLE: &str = "Task title cannot be empty";

/// Reducer for the todo list
#[derive(Clone, Debug)]
pub struct TodoReducer;

impl TodoReducer {
    /// Creates a new `TodoReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Schedules the dismissal of a resolved notification
    fn dismiss_later(notification: NotificationId, env: &TodoEnvironment) -> Effect<TodoAction> {
        Effect::delay(
            env.notification_ttl,
            TodoAction::DismissNotification { id: notification },
        )
    }

    /// Resolves a notification and schedules its dismissal
    fn resolve(
        state: &mut TodoState,
        notification: NotificationId,
        status: NotificationStatus,
        detail: Option<String>,
        env: &TodoEnvironment,
    ) -> Effects {
        if state.resolve_notification(notification, status, detail, env.clock.now()) {
            smallvec![Self::dismiss_later(notification, env)]
        } else {
            smallvec![Effect::None]
        }
    }

    /// Surfaces a failed operation: sets `last_error` and resolves the
    /// notification as failed
    fn fail(
        state: &mut TodoState,
        notification: NotificationId,
        error: &ApiError,
        env: &TodoEnvironment,
    ) -> Effects {
        state.last_error = Some(error.to_string());
        Self::resolve(
            state,
            notification,
            NotificationStatus::Failure,
            Some(error.to_string()),
            env,
        )
    }

    fn load(state: &mut TodoState, filter: Filter, env: &TodoEnvironment) -> Effects {
        state.filter = filter;
        state.is_loading = true;
        state.load_generation += 1;
        let generation = state.load_generation;

        tracing::debug!(%filter, generation, "Loading tasks");

        let request = env.api.list();
        smallvec![Effect::future(async move {
            Some(match request.await {
                Ok(tasks) => TodoAction::TasksLoaded { generation, tasks },
                Err(error) => TodoAction::LoadFailed { generation, error },
            })
        })]
    }

    fn create(state: &mut TodoState, title: String, env: &TodoEnvironment) -> Effects {
        let notification =
            state.push_notification(Operation::Create, NotificationStatus::Pending, env.clock.now());

        if title.trim().is_empty() {
            tracing::debug!("Rejected task with empty title");
            state.last_error = Some(EMPTY_TITLE.to_string());
            return Self::resolve(
                state,
                notification,
                NotificationStatus::Failure,
                Some(EMPTY_TITLE.to_string()),
                env,
            );
        }

        tracing::debug!(%title, %notification, "Creating task");

        let request = env.api.create(NewTask { title });
        smallvec![Effect::future(async move {
            Some(match request.await {
                Ok(task) => TodoAction::TaskCreated { notification, task },
                Err(error) => TodoAction::CreateFailed {
                    notification,
                    error,
                },
            })
        })]
    }

    fn set_completion(
        state: &mut TodoState,
        id: TaskId,
        completed: bool,
        env: &TodoEnvironment,
    ) -> Effects {
        let notification = state.push_notification(
            Operation::for_completion(completed),
            NotificationStatus::Pending,
            env.clock.now(),
        );
        tracing::debug!(task_id = %id, completed, "Updating task");

        let request = env.api.update(&id, TaskStatusUpdate::completion(completed));
        smallvec![Effect::future(async move {
            Some(match request.await {
                Ok(task) => TodoAction::TaskUpdated { notification, task },
                Err(error) => TodoAction::UpdateFailed {
                    notification,
                    id,
                    error,
                },
            })
        })]
    }

    fn delete(state: &mut TodoState, id: TaskId, env: &TodoEnvironment) -> Effects {
        let removed = state.position(&id).map(|index| state.tasks.remove(index));

        // Unknown tasks count as active
        if removed.as_ref().is_none_or(|task| task.is_active) {
            state.active_count = state.active_count.saturating_sub(1);
        }

        let notification =
            state.push_notification(Operation::Delete, NotificationStatus::Pending, env.clock.now());
        tracing::debug!(task_id = %id, known = removed.is_some(), "Deleting task");

        let request = env.api.delete(&id);
        smallvec![Effect::future(async move {
            Some(match request.await {
                Ok(()) => TodoAction::TaskDeleted { notification, id },
                Err(error) => TodoAction::DeleteFailed {
                    notification,
                    id,
                    error,
                },
            })
        })]
    }

    fn clear_completed(state: &mut TodoState, env: &TodoEnvironment) -> Effects {
        let (completed, remaining): (Vec<Task>, Vec<Task>) =
            std::mem::take(&mut state.tasks)
                .into_iter()
                .partition(|task| task.is_completed);
        state.tasks = remaining;

        let batch = state.push_notification(
            Operation::ClearCompleted,
            NotificationStatus::Pending,
            env.clock.now(),
        );

        if completed.is_empty() {
            tracing::debug!("No completed tasks to clear");
            return Self::resolve(state, batch, NotificationStatus::Success, None, env);
        }

        tracing::debug!(count = completed.len(), %batch, "Clearing completed tasks");
        state.pending_clears.insert(
            batch,
            ClearProgress {
                total: completed.len(),
                remaining: completed.len(),
                failed: 0,
            },
        );

        let deletes = completed
            .into_iter()
            .map(|task| {
                let request = env.api.delete(&task.id);
                let id = task.id;
                Effect::future(async move {
                    Some(match request.await {
                        Ok(()) => TodoAction::ClearedTaskDeleted { batch, id },
                        Err(error) => TodoAction::ClearedTaskDeleteFailed { batch, id, error },
                    })
                })
            })
            .collect();

        smallvec![Effect::Parallel(deletes)]
    }

    /// Records one finished delete of a clear batch and resolves the batch
    /// notification once every delete has finished
    fn advance_clear(
        state: &mut TodoState,
        batch: NotificationId,
        failed: bool,
        env: &TodoEnvironment,
    ) -> Effects {
        let Some(progress) = state.pending_clears.get_mut(&batch) else {
            tracing::warn!(%batch, "Delete result for unknown clear batch");
            return smallvec![Effect::None];
        };

        progress.remaining = progress.remaining.saturating_sub(1);
        if failed {
            progress.failed += 1;
        }
        if progress.remaining > 0 {
            return smallvec![Effect::None];
        }

        let progress = *progress;
        state.pending_clears.remove(&batch);

        if progress.failed == 0 {
            tracing::debug!(%batch, cleared = progress.total, "Completed tasks cleared");
            return Self::resolve(state, batch, NotificationStatus::Success, None, env);
        }

        let detail = format!(
            "{} of {} deletes failed",
            progress.failed, progress.total
        );
        state.last_error = Some(detail.clone());
        Self::resolve(state, batch, NotificationStatus::Failure, Some(detail), env)
    }

    fn apply_loaded(state: &mut TodoState, tasks: Vec<Task>) {
        let tasks: Vec<Task> = tasks.into_iter().map(Task::normalized).collect();
        state.active_count = tasks.iter().filter(|task| task.is_active).count();
        state.tasks = state.filter.apply(tasks);
        state.is_loading = false;
        tracing::debug!(
            filter = %state.filter,
            shown = state.tasks.len(),
            active = state.active_count,
            "Tasks loaded"
        );
    }

    fn apply_created(state: &mut TodoState, task: Task) {
        let task = task.normalized();
        match state.position(&task.id) {
            Some(index) => Self::replace_at(state, index, task),
            None => {
                if task.is_active {
                    state.active_count += 1;
                }
                state.tasks.push(task);
            },
        }
        state.pending_input.clear();
        state.last_error = None;
    }

    fn apply_updated(state: &mut TodoState, task: Task) {
        let task = task.normalized();
        let Some(index) = state.position(&task.id) else {
            tracing::debug!(task_id = %task.id, "Updated task is no longer listed");
            return;
        };

        Self::replace_at(state, index, task);
        state.last_error = None;
    }

    /// Replaces a listed task, moving the active count with its status
    fn replace_at(state: &mut TodoState, index: usize, task: Task) {
        let was_active = state.tasks[index].is_active;
        if was_active && !task.is_active {
            state.active_count = state.active_count.saturating_sub(1);
        } else if !was_active && task.is_active {
            state.active_count += 1;
        }
        state.tasks[index] = task;
    }
}

impl Default for TodoReducer {
    fn default() -> Self {
        Self::new()
    }
}

impl Reducer for TodoReducer {
    type State = TodoState;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    #[allow(clippy::too_many_lines)] // One arm per action
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== User intents ==========
            TodoAction::LoadTasks { filter } => Self::load(state, filter, env),

            TodoAction::SetInput { text } => {
                state.pending_input = text;
                smallvec![Effect::None]
            }

            TodoAction::SubmitInput => {
                let title = state.pending_input.clone();
                Self::create(state, title, env)
            }

            TodoAction::CreateTask { title } => Self::create(state, title, env),

            TodoAction::SetCompletion { id, completed } => {
                Self::set_completion(state, id, completed, env)
            }

            TodoAction::DeleteTask { id } => Self::delete(state, id, env),

            TodoAction::ClearCompleted => Self::clear_completed(state, env),

            TodoAction::ToggleTheme => {
                state.theme = state.theme.toggled();
                smallvec![Effect::None]
            }

            TodoAction::DismissNotification { id } => {
                state.dismiss_notification(id);
                smallvec![Effect::None]
            }

            // ========== Remote responses ==========
            TodoAction::TasksLoaded { generation, tasks } => {
                if generation != state.load_generation {
                    tracing::debug!(
                        generation,
                        current = state.load_generation,
                        "Discarding stale task list"
                    );
                    return smallvec![Effect::None];
                }
                Self::apply_loaded(state, tasks);
                smallvec![Effect::None]
            }

            TodoAction::LoadFailed { generation, error } => {
                if generation != state.load_generation {
                    tracing::warn!(generation, %error, "Ignoring failure of superseded load");
                    return smallvec![Effect::None];
                }
                tracing::error!(%error, "Failed to load tasks");
                state.is_loading = false;
                let notification = state.push_notification(
                    Operation::Load,
                    NotificationStatus::Pending,
                    env.clock.now(),
                );
                Self::fail(state, notification, &error, env)
            }

            TodoAction::TaskCreated { notification, task } => {
                tracing::debug!(task_id = %task.id, "Task created");
                Self::apply_created(state, task);
                Self::resolve(state, notification, NotificationStatus::Success, None, env)
            }

            TodoAction::CreateFailed {
                notification,
                error,
            } => {
                tracing::error!(%error, "Failed to create task");
                Self::fail(state, notification, &error, env)
            }

            TodoAction::TaskUpdated { notification, task } => {
                tracing::debug!(task_id = %task.id, completed = task.is_completed, "Task updated");
                Self::apply_updated(state, task);
                Self::resolve(state, notification, NotificationStatus::Success, None, env)
            }

            TodoAction::UpdateFailed {
                notification,
                id,
                error,
            } => {
                tracing::error!(task_id = %id, %error, "Failed to update task");
                Self::fail(state, notification, &error, env)
            }

            TodoAction::TaskDeleted { notification, id } => {
                tracing::debug!(task_id = %id, "Task deleted");
                Self::resolve(state, notification, NotificationStatus::Success, None, env)
            }

            TodoAction::DeleteFailed {
                notification,
                id,
                error,
            } => {
                tracing::error!(task_id = %id, %error, "Failed to delete task");
                Self::fail(state, notification, &error, env)
            }

            TodoAction::ClearedTaskDeleted { batch, id } => {
                tracing::debug!(task_id = %id, %batch, "Completed task deleted");
                Self::advance_clear(state, batch, false, env)
            }

            TodoAction::ClearedTaskDeleteFailed { batch, id, error } => {
                tracing::error!(task_id = %id, %batch, %error, "Failed to delete completed task");
                Self::advance_clear(state, batch, true, env)
            }
        }
    }
}
