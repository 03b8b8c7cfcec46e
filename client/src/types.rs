//! Domain types for the todo client.
//!
//! The view state is a plain value owned by the store. Every change to it
//! goes through a [`TodoAction`] processed by the reducer.

use crate::error::ApiError;
use crate::notification::{Notification, NotificationId, NotificationStatus, Operation};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Server-assigned identifier of a task
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Wraps an identifier received from the server
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as sent on the wire
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single todo item
///
/// `is_active` and `is_completed` are mutually exclusive; the pair is kept
/// only because the remote API exposes both flags.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier
    #[serde(rename = "_id", alias = "id")]
    pub id: TaskId,
    /// Title of the todo
    pub title: String,
    /// Whether the task still needs doing
    #[serde(default)]
    pub is_active: bool,
    /// Whether the task is done
    #[serde(default)]
    pub is_completed: bool,
}

impl Task {
    /// Creates a new active task
    #[must_use]
    pub fn new(id: TaskId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            is_active: true,
            is_completed: false,
        }
    }

    /// Returns this task with the given completion status
    #[must_use]
    pub fn with_completion(mut self, completed: bool) -> Self {
        self.is_completed = completed;
        self.is_active = !completed;
        self
    }

    /// Checks `is_active == !is_completed`
    #[must_use]
    pub const fn is_consistent(&self) -> bool {
        self.is_active != self.is_completed
    }

    /// Restores the active/completed invariant, trusting `is_completed`
    #[must_use]
    pub fn normalized(self) -> Self {
        if self.is_consistent() {
            return self;
        }

        tracing::warn!(
            task_id = %self.id,
            is_active = self.is_active,
            is_completed = self.is_completed,
            "Server returned task with inconsistent status flags"
        );
        let completed = self.is_completed;
        self.with_completion(completed)
    }
}

/// Subset of tasks shown in the list
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Filter {
    /// Every task
    #[default]
    All,
    /// Tasks with `is_active`
    Active,
    /// Tasks with `is_completed`
    Completed,
}

impl Filter {
    /// Every filter in display order
    pub const ALL: [Self; 3] = [Self::All, Self::Active, Self::Completed];

    /// Whether `task` belongs in this view
    #[must_use]
    pub const fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Active => task.is_active,
            Self::Completed => task.is_completed,
        }
    }

    /// Keeps the tasks that belong in this view, preserving order
    #[must_use]
    pub fn apply(self, tasks: Vec<Task>) -> Vec<Task> {
        tasks.into_iter().filter(|task| self.matches(task)).collect()
    }

    /// Label shown in the filter bar
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Active => "Active",
            Self::Completed => "Completed",
        }
    }
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Filter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "completed" | "done" => Ok(Self::Completed),
            other => Err(format!("unknown filter '{other}' (expected all, active or completed)")),
        }
    }
}

/// Visual theme of the list
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Theme {
    /// Light background
    #[default]
    Light,
    /// Dark background
    Dark,
}

impl Theme {
    /// The other theme
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Light => f.write_str("light"),
            Self::Dark => f.write_str("dark"),
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(format!("unknown theme '{other}' (expected light or dark)")),
        }
    }
}

/// Progress of one bulk "clear completed" request batch
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClearProgress {
    /// Delete requests issued for the batch
    pub total: usize,
    /// Delete requests still in flight
    pub remaining: usize,
    /// Delete requests that failed so far
    pub failed: usize,
}

/// View state of the todo list
///
/// Rebuilt from the server on every filter change; everything else is local
/// to the session.
#[derive(Clone, Debug, Default)]
pub struct TodoState {
    /// Tasks currently shown, already filtered
    pub tasks: Vec<Task>,
    /// Active filter
    pub filter: Filter,
    /// Text typed into the new-task input
    pub pending_input: String,
    /// A load request is in flight
    pub is_loading: bool,
    /// Current theme
    pub theme: Theme,
    /// "Items left", computed from the unfiltered set on load
    pub active_count: usize,
    /// Token of the most recent load request
    pub load_generation: u64,
    /// Status notifications, oldest first
    pub notifications: Vec<Notification>,
    /// Next notification identifier
    pub next_notification_id: u64,
    /// In-flight bulk clears, keyed by their notification
    pub pending_clears: HashMap<NotificationId, ClearProgress>,
    /// Most recent surfaced error
    pub last_error: Option<String>,
}

impl TodoState {
    /// Creates an empty state with the given theme
    #[must_use]
    pub fn new(theme: Theme) -> Self {
        Self {
            theme,
            ..Self::default()
        }
    }

    /// Returns a task by ID
    #[must_use]
    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| &task.id == id)
    }

    /// Position of a task in the list
    #[must_use]
    pub fn position(&self, id: &TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| &task.id == id)
    }

    /// Number of completed tasks in the current list
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|task| task.is_completed).count()
    }

    /// Looks up a notification
    #[must_use]
    pub fn notification(&self, id: NotificationId) -> Option<&Notification> {
        self.notifications.iter().find(|n| n.id == id)
    }

    /// Adds a notification and returns its identifier
    pub fn push_notification(
        &mut self,
        operation: Operation,
        status: NotificationStatus,
        now: DateTime<Utc>,
    ) -> NotificationId {
        self.next_notification_id += 1;
        let id = NotificationId::new(self.next_notification_id);
        self.notifications
            .push(Notification::new(id, operation, status, now));
        id
    }

    /// Moves a notification to its final status
    ///
    /// Returns `false` if the notification was already dismissed.
    pub fn resolve_notification(
        &mut self,
        id: NotificationId,
        status: NotificationStatus,
        detail: Option<String>,
        now: DateTime<Utc>,
    ) -> bool {
        let Some(notification) = self.notifications.iter_mut().find(|n| n.id == id) else {
            return false;
        };
        notification.resolve(status, detail, now);
        true
    }

    /// Removes a notification
    pub fn dismiss_notification(&mut self, id: NotificationId) {
        self.notifications.retain(|n| n.id != id);
    }
}

/// Actions processed by the todo reducer
///
/// User intents come from the presentation layer; remote responses are fed
/// back by effects. Responses carry the notification they resolve.
#[derive(Clone, Debug, PartialEq)]
pub enum TodoAction {
    // ========== User intents ==========
    /// Switch filter and reload the list from the server
    LoadTasks {
        /// Filter to apply to the loaded set
        filter: Filter,
    },

    /// Update the new-task input
    SetInput {
        /// Current input text
        text: String,
    },

    /// Create a task from the pending input
    SubmitInput,

    /// Create a task
    CreateTask {
        /// Title of the new task
        title: String,
    },

    /// Mark a task completed or active again
    SetCompletion {
        /// Task to update
        id: TaskId,
        /// New completion status
        completed: bool,
    },

    /// Delete a task (applied locally before the server confirms)
    DeleteTask {
        /// Task to delete
        id: TaskId,
    },

    /// Delete every completed task in the list
    ClearCompleted,

    /// Switch between light and dark
    ToggleTheme,

    /// Remove a notification
    DismissNotification {
        /// Notification to remove
        id: NotificationId,
    },

    // ========== Remote responses ==========
    /// The list request succeeded
    TasksLoaded {
        /// Load token the request was issued with
        generation: u64,
        /// Unfiltered server task set
        tasks: Vec<Task>,
    },

    /// The list request failed
    LoadFailed {
        /// Load token the request was issued with
        generation: u64,
        /// What went wrong
        error: ApiError,
    },

    /// The server created a task
    TaskCreated {
        /// Pending notification for the request
        notification: NotificationId,
        /// Task as returned by the server
        task: Task,
    },

    /// The create request failed
    CreateFailed {
        /// Pending notification for the request
        notification: NotificationId,
        /// What went wrong
        error: ApiError,
    },

    /// The server updated a task
    TaskUpdated {
        /// Pending notification for the request
        notification: NotificationId,
        /// Task as returned by the server
        task: Task,
    },

    /// The update request failed
    UpdateFailed {
        /// Pending notification for the request
        notification: NotificationId,
        /// Task the update was for
        id: TaskId,
        /// What went wrong
        error: ApiError,
    },

    /// The server deleted a task
    TaskDeleted {
        /// Pending notification for the request
        notification: NotificationId,
        /// Deleted task
        id: TaskId,
    },

    /// The delete request failed (the local removal stays)
    DeleteFailed {
        /// Pending notification for the request
        notification: NotificationId,
        /// Task the delete was for
        id: TaskId,
        /// What went wrong
        error: ApiError,
    },

    /// One delete of a bulk clear succeeded
    ClearedTaskDeleted {
        /// Notification identifying the clear batch
        batch: NotificationId,
        /// Deleted task
        id: TaskId,
    },

    /// One delete of a bulk clear failed
    ClearedTaskDeleteFailed {
        /// Notification identifying the clear batch
        batch: NotificationId,
        /// Task the delete was for
        id: TaskId,
        /// What went wrong
        error: ApiError,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn task(id: &str, completed: bool) -> Task {
        Task::new(TaskId::new(id), format!("task {id}")).with_completion(completed)
    }

    #[test]
    fn task_deserializes_document_ids() {
        let json = r#"{"_id":"65a1f","title":"Buy milk","isActive":true,"isCompleted":false,"__v":0}"#;
        let task: Task = serde_json::from_str(json).unwrap();

        assert_eq!(task.id, TaskId::new("65a1f"));
        assert_eq!(task.title, "Buy milk");
        assert!(task.is_active);
        assert!(!task.is_completed);
    }

    #[test]
    fn task_accepts_plain_id_alias() {
        let json = r#"{"id":"1","title":"A","isActive":false,"isCompleted":true}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.id.as_str(), "1");
        assert!(task.is_completed);
    }

    #[test]
    fn task_serializes_camel_case() {
        let value = serde_json::to_value(task("9", true)).unwrap();
        assert_eq!(value["_id"], "9");
        assert_eq!(value["isActive"], false);
        assert_eq!(value["isCompleted"], true);
    }

    #[test]
    fn normalized_trusts_completed_flag() {
        let mut broken = task("1", false);
        broken.is_active = false;
        assert!(!broken.is_consistent());

        let fixed = broken.normalized();
        assert!(fixed.is_consistent());
        assert!(fixed.is_active);

        let mut both = task("2", true);
        both.is_active = true;
        let fixed = both.normalized();
        assert!(fixed.is_completed);
        assert!(!fixed.is_active);
    }

    #[test]
    fn filter_predicates() {
        let active = task("1", false);
        let done = task("2", true);

        assert!(Filter::All.matches(&active) && Filter::All.matches(&done));
        assert!(Filter::Active.matches(&active) && !Filter::Active.matches(&done));
        assert!(!Filter::Completed.matches(&active) && Filter::Completed.matches(&done));
    }

    #[test]
    fn filter_and_theme_parse() {
        assert_eq!("Active".parse::<Filter>().unwrap(), Filter::Active);
        assert_eq!(" completed ".parse::<Filter>().unwrap(), Filter::Completed);
        assert!("soon".parse::<Filter>().is_err());

        assert_eq!("DARK".parse::<Theme>().unwrap(), Theme::Dark);
        assert!("blue".parse::<Theme>().is_err());
        assert_eq!(Theme::Light.toggled().toggled(), Theme::Light);
    }

    #[test]
    fn notifications_push_resolve_dismiss() {
        let mut state = TodoState::new(Theme::Light);
        let now = Utc::now();

        let first = state.push_notification(Operation::Create, NotificationStatus::Pending, now);
        let second = state.push_notification(Operation::Delete, NotificationStatus::Pending, now);
        assert_ne!(first, second);

        assert!(state.resolve_notification(first, NotificationStatus::Success, None, now));
        assert_eq!(
            state.notification(first).unwrap().status,
            NotificationStatus::Success
        );

        state.dismiss_notification(first);
        assert!(state.notification(first).is_none());
        assert!(!state.resolve_notification(first, NotificationStatus::Failure, None, now));
        assert_eq!(state.notifications.len(), 1);
    }
}
