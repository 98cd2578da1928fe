//! `todolist`: an interactive todo list in the terminal.
//!
//! Reads one command per line from stdin. State is saved under
//! `TODOLIST_DATA_DIR` after every change.

use anyhow::Context;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use todolist_client::shell::{self, Command, Flow};
use todolist_client::{ClientConfig, FileStorage, Persistence, SyncController, TextView, TodoEnvironment};
use todolist_core::environment::{SystemClock, TimestampIds};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Asks `y/N` questions on the terminal
struct TerminalConfirm;

impl todolist_client::Confirm for TerminalConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        print!("{prompt} [y/N] ");
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
            Err(_) => false,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so they never mix with the list
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "todolist_client=warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = ClientConfig::from_env();
    tracing::info!(data_dir = %config.data_dir.display(), "Starting todolist");

    let storage = FileStorage::open(&config.data_dir)
        .with_context(|| format!("cannot open data directory {}", config.data_dir.display()))?;
    let env = TodoEnvironment::new(
        Arc::new(SystemClock),
        Arc::new(TimestampIds::new()),
        Persistence::new(Arc::new(storage)),
    )
    .with_trash(config.trash_enabled);

    let mut controller = SyncController::load(env, TextView::new(io::stdout()))
        .await
        .context("cannot load saved todos")?;
    controller.notify("type 'help' for commands")?;

    let mut confirm = TerminalConfirm;
    let mut line = String::new();
    loop {
        print!("> ");
        io::stdout().flush()?;

        line.clear();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            break;
        }

        match line.parse::<Command>() {
            Ok(command) => {
                if shell::execute(&mut controller, command, &mut confirm).await? == Flow::Quit {
                    break;
                }
            },
            Err(shell::CommandError::Empty) => {},
            Err(error) => controller.warn(&error.to_string())?,
        }
    }

    controller
        .shutdown(config.shutdown_timeout)
        .await
        .context("pending saves did not finish")?;
    Ok(())
}
