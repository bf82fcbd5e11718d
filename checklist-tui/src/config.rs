use std::path::{Path, PathBuf};

use clap::Parser;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

#[derive(Debug, Parser)]
#[command(name = "checklist", version, about = "Personal to-do lists in the terminal")]
pub struct Cli {
    /// SQLite file to use instead of the one in the state directory
    #[arg(long, value_name = "PATH")]
    pub database: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `checklist_core=trace`
    #[arg(long, value_name = "FILTER")]
    pub log_level: Option<String>,

    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// Defaults, then the TOML file, then `CHECKLIST_*` variables, then flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database_path: Option<PathBuf>,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: None,
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}

impl Config {
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let config_file = cli.config.clone().or_else(default_config_file);
        let mut config: Config = Self::figment(config_file.as_deref()).extract()?;
        config.apply_cli(cli);
        Ok(config)
    }

    pub fn figment(config_file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = config_file {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed("CHECKLIST_"))
    }

    fn apply_cli(&mut self, cli: &Cli) {
        if let Some(path) = &cli.database {
            self.database_path = Some(path.clone());
        }
        if let Some(level) = &cli.log_level {
            self.log_level = level.clone();
        }
        if let Some(path) = &cli.log_file {
            self.log_file = Some(path.clone());
        }
    }

    pub fn database_path(&self) -> checklist_core::Result<PathBuf> {
        match &self.database_path {
            Some(path) => Ok(path.clone()),
            None => checklist_core::default_database_path(),
        }
    }

    /// Next to the database unless configured.
    pub fn log_file(&self, database_path: &Path) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| database_path.with_file_name("checklist.log"))
    }
}

fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("checklist").join("config.toml"))
}
