//! Server configuration read from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use crime_portal_database::DEFAULT_DB_PATH;
use thiserror::Error;

/// Errors produced while reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `PORT` is not a valid port number.
    #[error("Invalid PORT value {value:?}")]
    InvalidPort {
        /// The rejected value.
        value: String,
    },

    /// A boolean flag has an unrecognized value.
    #[error("Invalid value {value:?} for {key}: expected true/false")]
    InvalidFlag {
        /// Variable name.
        key: &'static str,
        /// The rejected value.
        value: String,
    },

    /// `AI_TIMEOUT_SECS` is not a positive integer.
    #[error("Invalid AI_TIMEOUT_SECS value {value:?}")]
    InvalidTimeout {
        /// The rejected value.
        value: String,
    },
}

/// Runtime settings for the API server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind (`BIND_ADDR`).
    pub bind_addr: String,
    /// Port to listen on (`PORT`).
    pub port: u16,
    /// `SQLite` database file (`DATABASE_PATH`).
    pub database_path: PathBuf,
    /// Fail `/api/predict` instead of falling back to the mock analysis
    /// (`FAIL_ON_LLM_ERROR`).
    pub fail_on_llm_error: bool,
    /// Timeout applied to LLM requests (`AI_TIMEOUT_SECS`). `None` means
    /// requests may wait indefinitely.
    pub ai_timeout: Option<Duration>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_string(),
            port: 8080,
            database_path: PathBuf::from(DEFAULT_DB_PATH),
            fail_on_llm_error: false,
            ai_timeout: None,
        }
    }
}

impl ServerConfig {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, falling back to defaults for
    /// unset variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort { value })?,
            None => defaults.port,
        };

        let fail_on_llm_error = match lookup("FAIL_ON_LLM_ERROR") {
            Some(value) => parse_flag("FAIL_ON_LLM_ERROR", value)?,
            None => defaults.fail_on_llm_error,
        };

        let ai_timeout = match lookup("AI_TIMEOUT_SECS") {
            Some(value) => match value.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
                _ => return Err(ConfigError::InvalidTimeout { value }),
            },
            None => defaults.ai_timeout,
        };

        Ok(Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port,
            database_path: lookup("DATABASE_PATH").map_or(defaults.database_path, PathBuf::from),
            fail_on_llm_error,
            ai_timeout,
        })
    }
}

fn parse_flag(key: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidFlag { key, value }),
    }
}
