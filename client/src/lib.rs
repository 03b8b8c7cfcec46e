//! Client-side state manager for a todo list backed by a REST API.
//!
//! The view state (tasks, filter, input, theme, notifications) lives in a
//! [`Store`](todo_runtime::Store) driven by [`TodoReducer`]. Remote calls run
//! as effects through the [`TodoApi`](api::TodoApi) injected in the
//! environment:
//!
//! - loads fetch the whole collection and filter locally, guarded by a
//!   generation token so a superseded response never wins
//! - creates and updates apply once the server answers
//! - deletes and clear-completed apply immediately, without rollback
//! - every operation reports through a pending/success/failure notification
//!   that dismisses itself after a TTL
//!
//! # Quick Start
//!
//! ```no_run
//! use todo_client::{ClientConfig, Filter, TodoManager};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::from_env()?;
//! let manager = TodoManager::from_config(&config)?;
//!
//! manager.load_tasks(Filter::All).await?;
//! manager.create_task("Buy milk").await?;
//!
//! let state = manager.snapshot().await;
//! println!("{} items left", state.active_count);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod command;
pub mod config;
pub mod environment;
pub mod error;
pub mod manager;
pub mod notification;
pub mod reducer;
pub mod render;
pub mod types;

pub use config::ClientConfig;
pub use environment::TodoEnvironment;
pub use error::{ApiError, ConfigError};
pub use manager::{TodoManager, TodoStore};
pub use notification::{Notification, NotificationId, NotificationStatus, Operation};
pub use reducer::TodoReducer;
pub use types::{Filter, Task, TaskId, Theme, TodoAction, TodoState};
