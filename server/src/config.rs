//! Server configuration module.
//!
//! This module provides configuration loading for the chat server from
//! environment variables.
//!
//! # Environment Variables
//!
//! - `CHAT_SECRET_KEY`: Process-wide secret used to sign bearer tokens (required)
//! - `CHAT_DATA_DIRECTORY`: Directory where the credential store lives (default: `./data`)
//! - `CHAT_LISTEN_PORT`: Port to listen on (default: `3000`)
//!
//! # Invariants
//!
//! - `secret_key` is never empty
//! - `data_directory` is always a valid path (may not exist yet)
//! - `listen_port` is always a valid port number (1-65535)

use std::path::PathBuf;

/// Server configuration.
///
/// Contains all configuration parameters needed to run the chat server.
///
/// # Post-conditions
///
/// - `secret_key` is non-empty
/// - `listen_port` is always in the valid range (1-65535)
/// - `data_directory` is a valid path
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Secret key used to sign and verify bearer tokens.
    /// Never logged and never sent to clients.
    pub secret_key: String,
    /// Directory where the credential store keeps its files.
    pub data_directory: PathBuf,
    /// Port to listen on for HTTP and WebSocket connections.
    pub listen_port: u16,
}

/// Error returned when loading configuration fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable is missing.
    MissingEnvVar(String),
    /// An environment variable has an invalid value.
    InvalidValue { name: String, message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingEnvVar(name) => {
                write!(f, "missing required environment variable: {name}")
            }
            Self::InvalidValue { name, message } => {
                write!(f, "invalid value for {name}: {message}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl ServerConfig {
    /// Default port for the server.
    pub const DEFAULT_PORT: u16 = 3000;
    /// Default data directory.
    pub const DEFAULT_DATA_DIRECTORY: &'static str = "./data";

    /// Load configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `CHAT_SECRET_KEY`: Token signing secret (required)
    /// - `CHAT_DATA_DIRECTORY`: Data directory (default: `./data`)
    /// - `CHAT_LISTEN_PORT`: Listen port (default: `3000`)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `CHAT_SECRET_KEY` is not set or is empty
    /// - `CHAT_LISTEN_PORT` is set but not a valid port number
    pub fn from_env() -> Result<Self, ConfigError> {
        let secret_key = Self::load_secret_key()?;
        let data_directory = Self::load_data_directory();
        let listen_port = Self::load_listen_port()?;

        Ok(Self {
            secret_key,
            data_directory,
            listen_port,
        })
    }

    /// Load the token signing secret from environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the environment variable is not set or is empty.
    fn load_secret_key() -> Result<String, ConfigError> {
        let key = std::env::var("CHAT_SECRET_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("CHAT_SECRET_KEY".to_string()))?;

        if key.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "CHAT_SECRET_KEY".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        Ok(key)
    }

    /// Load the data directory from environment.
    ///
    /// Returns the default if not set.
    fn load_data_directory() -> PathBuf {
        std::env::var("CHAT_DATA_DIRECTORY")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(Self::DEFAULT_DATA_DIRECTORY))
    }

    /// Load the listen port from environment.
    ///
    /// Returns the default if not set.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is set but not a valid port number.
    fn load_listen_port() -> Result<u16, ConfigError> {
        match std::env::var("CHAT_LISTEN_PORT") {
            Ok(value) => value.parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                name: "CHAT_LISTEN_PORT".to_string(),
                message: format!("'{value}' is not a valid port number (must be 1-65535)"),
            }),
            Err(_) => Ok(Self::DEFAULT_PORT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        assert_eq!(ServerConfig::DEFAULT_PORT, 3000);
        assert_eq!(ServerConfig::DEFAULT_DATA_DIRECTORY, "./data");
    }

    #[test]
    fn test_config_error_display_missing() {
        let error = ConfigError::MissingEnvVar("TEST_VAR".to_string());
        assert_eq!(
            error.to_string(),
            "missing required environment variable: TEST_VAR"
        );
    }

    #[test]
    fn test_config_error_display_invalid() {
        let error = ConfigError::InvalidValue {
            name: "TEST_VAR".to_string(),
            message: "bad value".to_string(),
        };
        assert_eq!(error.to_string(), "invalid value for TEST_VAR: bad value");
    }
}
