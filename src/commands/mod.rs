//! CLI command definitions and dispatch.

pub mod config;
pub mod folder;
pub mod migrate;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use foldertree_core::config::AppConfig;
use foldertree_core::error::AppError;
use foldertree_core::types::OrgId;
use foldertree_database::{DatabasePool, FolderStore};

/// FolderTree: tenant-scoped folder hierarchies
#[derive(Debug, Parser)]
#[command(name = "foldertree", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Tenant the command operates on
    #[arg(short, long, default_value_t = 1, global = true)]
    pub org_id: i64,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Folder management
    Folder(folder::FolderArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, app_config: AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, &app_config).await,
            Commands::Folder(args) => {
                folder::execute(args, &app_config, OrgId(self.org_id), self.format).await
            }
            Commands::Config(args) => {
                config::execute(args, &self.config, &app_config, self.format)
            }
        }
    }
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(config_path)
}

/// Helper: connect, migrate and build a folder store
pub async fn open_store(config: &AppConfig) -> Result<FolderStore, AppError> {
    let db = DatabasePool::connect(&config.database).await?;
    foldertree_database::migration::run_migrations(db.pool()).await?;
    Ok(FolderStore::new(db.into_pool(), &config.folders))
}
