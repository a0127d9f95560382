//! Configuration management CLI commands.

use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat};
use foldertree_core::config::{AppConfig, ENV_VAR};
use foldertree_core::error::AppError;

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
}

/// Execute config commands
pub fn execute(
    args: &ConfigArgs,
    config_path: &str,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => match format {
            OutputFormat::Json => output::print_json(config),
            OutputFormat::Table => {
                println!("Configuration loaded from '{}'", config_path);
                if let Ok(env) = std::env::var(ENV_VAR) {
                    output::print_kv("overlay", &format!("config/{env}"));
                }
                output::print_kv("database.url", &config.database.url);
                output::print_kv(
                    "database.max_connections",
                    &config.database.max_connections.to_string(),
                );
                output::print_kv(
                    "database.busy_timeout",
                    &format!("{}s", config.database.busy_timeout_seconds),
                );
                output::print_kv("folders.max_depth", &config.folders.max_depth.to_string());
                output::print_kv("logging.level", &config.logging.level);
                output::print_kv("logging.format", &config.logging.format);
            }
        },
    }

    Ok(())
}
