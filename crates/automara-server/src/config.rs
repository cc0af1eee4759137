//! Server configuration from environment variables.

use automara_db::DbConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    MissingVar(&'static str),
}

/// Runtime settings for the Automara server.
///
/// Database settings fall back to local-development defaults; engine
/// and vault settings are required.
pub struct ServerConfig {
    pub db: DbConfig,
    /// Base URL of the remote workflow engine.
    pub engine_url: String,
    /// API key sent with every engine request.
    pub engine_api_key: String,
    /// Master secret for credential envelope encryption.
    pub master_secret: String,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = DbConfig::default();
        let db = DbConfig {
            url: env_or("AUTOMARA_DB_URL", &defaults.url),
            namespace: env_or("AUTOMARA_DB_NAMESPACE", &defaults.namespace),
            database: env_or("AUTOMARA_DB_DATABASE", &defaults.database),
            username: env_or("AUTOMARA_DB_USERNAME", &defaults.username),
            password: env_or("AUTOMARA_DB_PASSWORD", &defaults.password),
        };

        Ok(Self {
            db,
            engine_url: required("AUTOMARA_ENGINE_URL")?,
            engine_api_key: required("AUTOMARA_ENGINE_API_KEY")?,
            master_secret: required("AUTOMARA_MASTER_SECRET")?,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    match std::env::var(key) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar(key)),
    }
}
