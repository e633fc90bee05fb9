//! Service configuration parsed from environment variables.
//!
//! Required:
//! - `DATABASE_URL`
//!
//! Optional:
//! - `PORT`: default 8000
//! - `STORAGE_DIR`: root of the project file tree, default `storage`
//! - `PUBLIC_BASE_URL`: prefix for mesh download URLs, default `http://localhost:8000`
//! - `DB_MAX_CONNECTIONS`: default 5

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_STORAGE_DIR: &str = "storage";
pub const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("invalid {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub storage_dir: PathBuf,
    /// No trailing slash.
    pub public_base_url: String,
    pub db_max_connections: u32,
}

impl Config {
    /// Build typed config from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `DATABASE_URL` is missing or `PORT` does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build typed config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// See [`Config::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url =
            lookup("DATABASE_URL").filter(|v| !v.trim().is_empty()).ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let port = match lookup("PORT") {
            None => DEFAULT_PORT,
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid { key: "PORT", value: raw })?,
        };

        let storage_dir = lookup("STORAGE_DIR")
            .filter(|v| !v.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR), PathBuf::from);

        let public_base_url = lookup("PUBLIC_BASE_URL")
            .unwrap_or_else(|| DEFAULT_PUBLIC_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let db_max_connections = match lookup("DB_MAX_CONNECTIONS") {
            None => DEFAULT_DB_MAX_CONNECTIONS,
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => return Err(ConfigError::Invalid { key: "DB_MAX_CONNECTIONS", value: raw }),
            },
        };

        Ok(Self { database_url, port, storage_dir, public_base_url, db_max_connections })
    }

    /// URL path segment the storage tree is served under, e.g. `storage`.
    #[must_use]
    pub fn storage_mount(&self) -> String {
        self.storage_dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .filter(|name| !name.is_empty() && name != "." && name != "..")
            .unwrap_or_else(|| DEFAULT_STORAGE_DIR.to_string())
    }
}
