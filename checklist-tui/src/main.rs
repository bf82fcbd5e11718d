use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use checklist_core::Database;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Cli, Config};

mod app;
mod config;
mod ui;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(&cli)?;
    let database_path = config.database_path()?;

    init_tracing(&config.log_level, &config.log_file(&database_path))?;
    info!(database = %database_path.display(), "starting checklist");

    let db = Database::open(&database_path).await?;

    let res = ui::run_app(&db).await;

    db.close().await;

    res
}

/// The terminal belongs to the UI, so logs go to a file.
fn init_tracing(log_level: &str, log_file: &Path) -> anyhow::Result<()> {
    if let Some(parent) = log_file.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(log_file)?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_level(true)
                .with_target(false),
        )
        .init();

    Ok(())
}
