//! Terminal front end for the todo client.
//!
//! Run with `--offline` to use an in-memory task list instead of the
//! configured backend.

use std::sync::Arc;
use std::time::Duration;
use todo_client::api::InMemoryTodoApi;
use todo_client::command::{Command, HELP};
use todo_client::render::render;
use todo_client::{ClientConfig, Filter, Task, TaskId, TodoManager};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = ClientConfig::from_env()?;
    let offline = std::env::args().skip(1).any(|arg| arg == "--offline");

    let manager = if offline {
        tracing::info!("Running offline with an in-memory task list");
        TodoManager::with_api(&config, Arc::new(demo_api()))
    } else {
        tracing::info!(api_url = %config.api_url, "Connecting to todo backend");
        TodoManager::from_config(&config)?
    };

    manager.load_tasks(Filter::All).await?;
    print!("{}", render(&manager.snapshot().await));
    println!("type 'help' for commands");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };

        match command {
            Command::Quit => break,
            Command::Help => {
                println!("{HELP}");
                continue;
            }
            command => {
                if let Err(message) = run(&manager, command).await? {
                    println!("{message}");
                    continue;
                }
            }
        }

        print!("{}", render(&manager.snapshot().await));
    }

    if let Err(error) = manager.shutdown(SHUTDOWN_TIMEOUT).await {
        tracing::warn!(%error, "Shutdown did not complete cleanly");
    }
    Ok(())
}

/// Runs a command against the manager
///
/// The inner `Err` is a message for the user (e.g. a task number out of
/// range); the outer one means the store is gone.
async fn run(
    manager: &TodoManager,
    command: Command,
) -> Result<Result<(), String>, todo_runtime::StoreError> {
    match command {
        Command::Add(title) => {
            manager.set_input(title).await?;
            manager.submit_input().await?;
        }
        Command::Done(n) => match task_at(manager, n).await {
            Ok(id) => manager.set_completion(&id, true).await?,
            Err(message) => return Ok(Err(message)),
        },
        Command::Undo(n) => match task_at(manager, n).await {
            Ok(id) => manager.set_completion(&id, false).await?,
            Err(message) => return Ok(Err(message)),
        },
        Command::Remove(n) => match task_at(manager, n).await {
            Ok(id) => manager.delete_task(&id).await?,
            Err(message) => return Ok(Err(message)),
        },
        Command::Clear => manager.clear_completed().await?,
        Command::Filter(filter) => manager.load_tasks(filter).await?,
        Command::Theme => manager.toggle_theme().await?,
        Command::List | Command::Help | Command::Quit => {}
    }
    Ok(Ok(()))
}

/// Id of the n-th listed task (1-based)
async fn task_at(manager: &TodoManager, n: usize) -> Result<TaskId, String> {
    manager
        .read(|state| {
            n.checked_sub(1)
                .and_then(|index| state.tasks.get(index))
                .map(|task| task.id.clone())
        })
        .await
        .ok_or_else(|| format!("no task number {n}"))
}

fn demo_api() -> InMemoryTodoApi {
    InMemoryTodoApi::with_tasks(vec![
        Task::new(TaskId::new("demo-1"), "Try the offline mode"),
        Task::new(TaskId::new("demo-2"), "Read the help").with_completion(true),
    ])
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todo=info,todo_client=info,todo_runtime=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
