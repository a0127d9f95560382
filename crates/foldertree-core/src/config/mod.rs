//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from
//! TOML files plus `FOLDERTREE__*` environment variables. Each sub-module
//! represents a logical configuration section.

pub mod database;
pub mod folder;
pub mod logging;

use serde::{Deserialize, Serialize};
use validator::Validate;

pub use self::database::DatabaseConfig;
pub use self::folder::FolderConfig;
pub use self::logging::LoggingConfig;

use crate::error::AppError;

/// Environment variable selecting the overlay file under `config/`.
pub const ENV_VAR: &str = "FOLDERTREE_ENV";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct AppConfig {
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Folder tree settings.
    #[serde(default)]
    #[validate(nested)]
    pub folders: FolderConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration.
    ///
    /// Merges `path` (optional), the `config/{FOLDERTREE_ENV}` overlay
    /// (optional) and environment variables prefixed with `FOLDERTREE__`,
    /// then validates the result.
    pub fn load(path: &str) -> Result<Self, AppError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name(path).required(false));

        if let Ok(env) = std::env::var(ENV_VAR) {
            builder = builder
                .add_source(config::File::with_name(&format!("config/{env}")).required(false));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("FOLDERTREE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let app: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        app.validate()
            .map_err(|e| AppError::configuration(format!("Invalid configuration: {e}")))?;
        Ok(app)
    }
}
