//! User-facing status notifications.
//!
//! Every remote operation shows a notification that starts as `Pending` and
//! moves to `Success` or `Failure` once the server answers. Loads are the
//! exception and only surface failures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a notification, unique within a session
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NotificationId(u64);

impl NotificationId {
    /// Wraps a raw identifier
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for NotificationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Remote operation a notification reports on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    /// Fetching the task list
    Load,
    /// Creating a task
    Create,
    /// Marking a task completed
    Complete,
    /// Marking a task active again
    Activate,
    /// Deleting one task
    Delete,
    /// Deleting every completed task
    ClearCompleted,
}

impl Operation {
    /// Completion operation for the requested status
    #[must_use]
    pub const fn for_completion(completed: bool) -> Self {
        if completed { Self::Complete } else { Self::Activate }
    }

    /// Message shown for this operation in the given status
    #[must_use]
    pub const fn message(self, status: NotificationStatus) -> &'static str {
        use NotificationStatus::{Failure, Pending, Success};

        match (self, status) {
            (Self::Load, Pending) => "Loading...",
            (Self::Load, Success) => "Tasks loaded",
            (Self::Load, Failure) => "Error loading tasks",
            (Self::Create, Pending) => "Creating...",
            (Self::Create, Success) => "Task added successfully",
            (Self::Create, Failure) => "Error adding task",
            (Self::Complete, Pending) => "Marking as completed...",
            (Self::Complete, Success) => "Task marked as completed",
            (Self::Complete, Failure) => "Error occurred while completing task",
            (Self::Activate, Pending) => "Marking as active...",
            (Self::Activate, Success) => "Task marked as active",
            (Self::Activate, Failure) => "Error occurred while updating task",
            (Self::Delete, Pending) => "Deleting...",
            (Self::Delete, Success) => "Task deleted successfully",
            (Self::Delete, Failure) => "Error deleting task",
            (Self::ClearCompleted, Pending) => "Clearing all completed tasks...",
            (Self::ClearCompleted, Success) => "All completed tasks are cleared",
            (Self::ClearCompleted, Failure) => "Error occurred while clearing tasks",
        }
    }
}

/// Lifecycle of a notification
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationStatus {
    /// The request is in flight
    Pending,
    /// The server confirmed the operation
    Success,
    /// The operation failed
    Failure,
}

impl NotificationStatus {
    /// Whether the notification has reached its final status
    #[must_use]
    pub const fn is_final(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// A status notification
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Identifier
    pub id: NotificationId,
    /// Operation reported on
    pub operation: Operation,
    /// Current status
    pub status: NotificationStatus,
    /// Text shown to the user
    pub message: String,
    /// Extra failure detail, if any
    pub detail: Option<String>,
    /// Last status change
    pub updated_at: DateTime<Utc>,
}

impl Notification {
    /// Creates a notification with the standard message for its status
    #[must_use]
    pub fn new(
        id: NotificationId,
        operation: Operation,
        status: NotificationStatus,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            operation,
            status,
            message: operation.message(status).to_string(),
            detail: None,
            updated_at: now,
        }
    }

    /// Moves to a new status, replacing the message
    pub fn resolve(&mut self, status: NotificationStatus, detail: Option<String>, now: DateTime<Utc>) {
        self.status = status;
        self.message = self.operation.message(status).to_string();
        self.detail = detail;
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_follow_status() {
        let now = Utc::now();
        let mut notification = Notification::new(
            NotificationId::new(1),
            Operation::Create,
            NotificationStatus::Pending,
            now,
        );
        assert_eq!(notification.message, "Creating...");
        assert!(!notification.status.is_final());

        notification.resolve(NotificationStatus::Success, None, now);
        assert_eq!(notification.message, "Task added successfully");
        assert!(notification.status.is_final());
    }

    #[test]
    fn completion_operations() {
        assert_eq!(Operation::for_completion(true), Operation::Complete);
        assert_eq!(Operation::for_completion(false), Operation::Activate);
        assert_eq!(
            Operation::Activate.message(NotificationStatus::Failure),
            "Error occurred while updating task"
        );
        assert_eq!(
            Operation::ClearCompleted.message(NotificationStatus::Success),
            "All completed tasks are cleared"
        );
    }
}
