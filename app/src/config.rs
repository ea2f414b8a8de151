//! Runtime configuration.
//!
//! Values come from, in increasing priority: built-in defaults, environment
//! variables (a `.env` file is loaded into the environment at startup), and
//! command-line flags applied by the binary.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Directory the task documents are written to
pub const ENV_DATA_DIR: &str = "TODOLIST_DATA_DIR";
/// File name prefix of saved documents
pub const ENV_FILE_PREFIX: &str = "TODOLIST_FILE_PREFIX";
/// Notification lifetime in milliseconds
pub const ENV_NOTIFICATION_MS: &str = "TODOLIST_NOTIFICATION_MS";
/// Log filter used when `RUST_LOG` is not set
pub const ENV_LOG: &str = "TODOLIST_LOG";

/// Sub-directory of the documents directory holding saved lists
pub const DATA_DIR_NAME: &str = "ToDolist";
/// Default log filter
pub const DEFAULT_LOG_FILTER: &str = "todolist=info,todolist_storage=info,todolist_runtime=warn";
const DEFAULT_NOTIFICATION_MS: u64 = 2000;

/// Configuration errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Neither a data directory nor a home directory is available
    #[error("cannot determine a documents directory; set TODOLIST_DATA_DIR or pass --data-dir")]
    NoDocumentsDir,

    /// Notification lifetime is not a number of milliseconds
    #[error("TODOLIST_NOTIFICATION_MS must be a whole number of milliseconds, got {0:?}")]
    InvalidNotificationTtl(String),

    /// File prefix is empty or contains a path separator
    #[error("TODOLIST_FILE_PREFIX must be a plain, non-empty file name prefix, got {0:?}")]
    InvalidFilePrefix(String),
}

/// Application configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Directory saved documents are written to
    pub data_dir: PathBuf,
    /// Prefix of saved document names (`<prefix><N>.json`)
    pub file_prefix: String,
    /// How long notifications stay visible
    pub notification_ttl: Duration,
    /// Log filter used when `RUST_LOG` is not set
    pub log_filter: String,
}

impl Config {
    /// Loads configuration from the process environment
    ///
    /// # Errors
    ///
    /// See [`Config::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary variable lookup
    ///
    /// # Errors
    ///
    /// Returns an error if a variable has an invalid value, or if no data
    /// directory is configured and no documents directory can be found.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let data_dir = match lookup(ENV_DATA_DIR).filter(|dir| !dir.trim().is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => default_data_dir()?,
        };

        let file_prefix = lookup(ENV_FILE_PREFIX).unwrap_or_else(|| "storage".to_string());
        if file_prefix.is_empty() || file_prefix.contains(['/', '\\']) {
            return Err(ConfigError::InvalidFilePrefix(file_prefix));
        }

        let notification_ttl = match lookup(ENV_NOTIFICATION_MS) {
            Some(raw) => raw
                .trim()
                .parse()
                .map(Duration::from_millis)
                .map_err(|_| ConfigError::InvalidNotificationTtl(raw))?,
            None => Duration::from_millis(DEFAULT_NOTIFICATION_MS),
        };

        let log_filter = lookup(ENV_LOG).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Ok(Self {
            data_dir,
            file_prefix,
            notification_ttl,
            log_filter,
        })
    }

    /// Overrides the data directory
    #[must_use]
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }
}

/// `<documents>/ToDolist`, falling back to `<home>/Documents/ToDolist`
///
/// # Errors
///
/// Returns [`ConfigError::NoDocumentsDir`] if neither directory is known.
pub fn default_data_dir() -> Result<PathBuf, ConfigError> {
    dirs::document_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Documents")))
        .map(|documents| documents.join(DATA_DIR_NAME))
        .ok_or(ConfigError::NoDocumentsDir)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)] // Test code can use unwrap

    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn explicit_values_are_used() {
        let config = Config::from_lookup(lookup(&[
            (ENV_DATA_DIR, "/srv/tasks"),
            (ENV_FILE_PREFIX, "tasks"),
            (ENV_NOTIFICATION_MS, "500"),
            (ENV_LOG, "debug"),
        ]));

        assert_eq!(
            config,
            Ok(Config {
                data_dir: PathBuf::from("/srv/tasks"),
                file_prefix: "tasks".to_string(),
                notification_ttl: Duration::from_millis(500),
                log_filter: "debug".to_string(),
            })
        );
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::from_lookup(lookup(&[(ENV_DATA_DIR, "/srv/tasks")])).unwrap();

        assert_eq!(config.file_prefix, "storage");
        assert_eq!(config.notification_ttl, Duration::from_secs(2));
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn invalid_notification_ttl_is_rejected() {
        let result = Config::from_lookup(lookup(&[
            (ENV_DATA_DIR, "/srv/tasks"),
            (ENV_NOTIFICATION_MS, "two seconds"),
        ]));

        assert_eq!(
            result,
            Err(ConfigError::InvalidNotificationTtl("two seconds".to_string()))
        );
    }

    #[test]
    fn prefix_with_separator_is_rejected() {
        let result = Config::from_lookup(lookup(&[
            (ENV_DATA_DIR, "/srv/tasks"),
            (ENV_FILE_PREFIX, "../storage"),
        ]));

        assert!(matches!(result, Err(ConfigError::InvalidFilePrefix(_))));
    }

    #[test]
    fn default_data_dir_ends_in_todolist() {
        if let Ok(dir) = default_data_dir() {
            assert!(dir.ends_with(DATA_DIR_NAME));
        }
    }

    #[test]
    fn cli_override_wins() {
        let config = Config::from_lookup(lookup(&[(ENV_DATA_DIR, "/srv/tasks")]))
            .map(|config| config.with_data_dir("/tmp/other"));

        assert_eq!(config.map(|c| c.data_dir), Ok(PathBuf::from("/tmp/other")));
    }
}
