//! Plain-text rendering of the view state.

use crate::notification::{Notification, NotificationStatus};
use crate::types::{Filter, TodoState};
use std::fmt::Write;

/// Renders the list, footer and notifications
///
/// Tasks are numbered from 1; the numbers are what the terminal commands
/// refer to.
#[must_use]
pub fn render(state: &TodoState) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "TODO  [{}]", state.theme);

    if state.pending_input.is_empty() {
        out.push_str("> Create a new todo...\n");
    } else {
        let _ = writeln!(out, "> {}", state.pending_input);
    }

    if state.is_loading && state.tasks.is_empty() {
        out.push_str("  Loading...\n");
    } else if state.tasks.is_empty() {
        out.push_str("  (No item available)\n");
    }

    for (index, task) in state.tasks.iter().enumerate() {
        let mark = if task.is_completed { 'x' } else { ' ' };
        let _ = writeln!(out, "{:>3}. [{mark}] {}", index + 1, task.title);
    }

    let _ = write!(out, "{} {} left  ", state.active_count, items(state.active_count));
    for filter in Filter::ALL {
        if filter == state.filter {
            let _ = write!(out, " *{filter}*");
        } else {
            let _ = write!(out, " {filter}");
        }
    }
    let _ = writeln!(out, "   Clear Completed ({})", state.completed_count());

    for notification in &state.notifications {
        out.push_str(&render_notification(notification));
        out.push('\n');
    }

    out
}

/// One-line rendering of a notification
#[must_use]
pub fn render_notification(notification: &Notification) -> String {
    let marker = match notification.status {
        NotificationStatus::Pending => "...",
        NotificationStatus::Success => "ok ",
        NotificationStatus::Failure => "err",
    };

    match &notification.detail {
        Some(detail) => format!("  [{marker}] {} ({detail})", notification.message),
        None => format!("  [{marker}] {}", notification.message),
    }
}

const fn items(count: usize) -> &'static str {
    if count == 1 { "item" } else { "items" }
}
