//! Interactive to-do list.
//!
//! Run with:
//! ```bash
//! cargo run --bin todolist -- --data-dir /tmp/ToDolist
//! ```

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use todolist::config::Config;
use todolist::gateway::PersistenceGateway;
use todolist::reducer::{TodoEnvironment, TodoReducer};
use todolist::shell::{Shell, ShellCommand};
use todolist::types::TodoState;
use todolist::TodoStore;
use todolist_core::environment::SystemClock;
use todolist_storage::FsDocumentStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SHUTDOWN_GRACE: Duration = Duration::from_millis(200);

/// Manage a to-do list saved as numbered JSON files
#[derive(Parser, Debug)]
#[command(name = "todolist", version, about)]
struct Cli {
    /// Directory saved lists are written to (overrides TODOLIST_DATA_DIR)
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Load this file before the first prompt
    #[arg(long, value_name = "FILE")]
    load: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let mut config = Config::from_env().context("invalid configuration")?;
    if let Some(dir) = cli.data_dir {
        config = config.with_data_dir(dir);
    }

    // Logs go to stderr so they never mix with the shell output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!(data_dir = %config.data_dir.display(), "Starting todolist");

    let documents = FsDocumentStore::new(&config.data_dir).with_prefix(&config.file_prefix);
    let gateway = PersistenceGateway::new(Arc::new(documents));
    let env = TodoEnvironment::new(Arc::new(SystemClock), gateway.clone())
        .with_notification_ttl(config.notification_ttl);
    let store = TodoStore::new(TodoState::new(), TodoReducer::new(), env);

    let mut shell = Shell::new(store.clone(), gateway, &config.data_dir, tokio::io::stdout());

    if let Some(path) = cli.load {
        shell.execute(ShellCommand::Load(path)).await?;
    }

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    shell.run(stdin).await?;

    // Saves and loads finish before the shell returns; only notification
    // timers can still be pending here.
    if let Err(e) = store.shutdown(SHUTDOWN_GRACE).await {
        tracing::debug!(error = %e, "Dropping pending notification timers");
    }
    tracing::info!("Goodbye");
    Ok(())
}
