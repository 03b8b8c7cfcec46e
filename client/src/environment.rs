//! Injected dependencies of the todo reducer.

use crate::api::TodoApi;
use std::sync::Arc;
use std::time::Duration;
use todo_core::environment::{Clock, SystemClock};

/// How long a resolved notification stays visible by default
pub const DEFAULT_NOTIFICATION_TTL: Duration = Duration::from_millis(4000);

/// Environment for [`TodoReducer`](crate::reducer::TodoReducer)
#[derive(Clone)]
pub struct TodoEnvironment {
    /// Remote task collection
    pub api: Arc<dyn TodoApi>,
    /// Timestamps for notifications
    pub clock: Arc<dyn Clock>,
    /// Delay before a resolved notification is dismissed
    pub notification_ttl: Duration,
}

impl TodoEnvironment {
    /// Environment using the system clock and default notification TTL
    #[must_use]
    pub fn new(api: Arc<dyn TodoApi>) -> Self {
        Self {
            api,
            clock: Arc::new(SystemClock),
            notification_ttl: DEFAULT_NOTIFICATION_TTL,
        }
    }

    /// Replace the clock
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the notification TTL
    #[must_use]
    pub const fn with_notification_ttl(mut self, ttl: Duration) -> Self {
        self.notification_ttl = ttl;
        self
    }
}

impl std::fmt::Debug for TodoEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoEnvironment")
            .field("notification_ttl", &self.notification_ttl)
            .finish_non_exhaustive()
    }
}
