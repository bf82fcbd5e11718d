use std::path::{Path, PathBuf};

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tracing::info;

use crate::credentials::CredentialStore;
use crate::error::{Error, Result};
use crate::schema;
use crate::tasks::TaskStore;

/// `<state_dir>/checklist/data`, falling back to the config dir and then
/// `~/.local/state`.
fn data_dir() -> Result<PathBuf> {
    let state_dir = dirs::state_dir()
        .or_else(dirs::config_dir)
        .or_else(|| dirs::home_dir().map(|h| h.join(".local/state")))
        .ok_or(Error::NoDataDir)?;

    Ok(state_dir.join("checklist").join("data"))
}

pub fn default_database_path() -> Result<PathBuf> {
    Ok(data_dir()?.join("checklist.db"))
}

/// Owns the single connection to the local store. Screens get cheap store
/// handles from it but can never close it.
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens (creating if needed) the database file and ensures the schema.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(Error::Open)?;

        schema::initialize(&pool).await?;

        info!(path = %path.display(), "database initialized");

        Ok(Database { pool })
    }

    pub fn credentials(&self) -> CredentialStore {
        CredentialStore::new(self.pool.clone())
    }

    pub fn tasks(&self) -> TaskStore {
        TaskStore::new(self.pool.clone())
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}
