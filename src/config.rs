//! Configuration loading and validation.
//!
//! A deserializable [`Config`] plus a standalone `validate` pass, collapsed
//! into one module since this crate's configuration surface is small: a
//! bind address, a server name for log lines, a log format, and a database
//! path.

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

/// Top-level configuration, loaded from a TOML file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address. Defaults to port 12345 on all interfaces.
    pub bind: SocketAddr,
    /// Name used only in log lines; the wire protocol carries no server identity.
    pub name: String,
    pub log_format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            name: "slircd-core".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

fn default_bind() -> SocketAddr {
    "0.0.0.0:12345".parse().expect("default bind address parses")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Relative path to the credential store.
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "db/password.db".to_string(),
        }
    }
}

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("server.name must not be empty")]
    MissingServerName,
    #[error("database.path parent directory does not exist: {0}")]
    DatabasePathInvalid(String),
}

impl Config {
    /// Load configuration from `path`. Falls back to built-in defaults if the
    /// file does not exist — the server must still bind to its fixed port
    /// with no config file present, matching the original's hardcoded setup.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Ok(toml::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path, "No config file found, using defaults");
                Ok(Config::default())
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.name.trim().is_empty() {
        errors.push(ValidationError::MissingServerName);
    }

    if let Some(parent) = Path::new(&config.database.path).parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        errors.push(ValidationError::DatabasePathInvalid(
            parent.display().to_string(),
        ));
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
