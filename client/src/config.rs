//! Configuration of the todolist shell.
//!
//! Loads configuration from environment variables with sensible defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Directory holding `todos.json` and `trash.json`
    pub data_dir: PathBuf,
    /// Deleted todos go to the trash instead of disappearing
    pub trash_enabled: bool,
    /// How long to wait for pending saves on exit
    pub shutdown_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./.todolist"),
            trash_enabled: true,
            shutdown_timeout: Duration::from_secs(5),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables
    ///
    /// - `TODOLIST_DATA_DIR` (default `./.todolist`)
    /// - `TODOLIST_TRASH` (`true`/`false`, default `true`)
    /// - `TODOLIST_SHUTDOWN_TIMEOUT_SECS` (default `5`)
    ///
    /// Unparsable values fall back to the default.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    #[must_use]
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            data_dir: lookup("TODOLIST_DATA_DIR")
                .filter(|dir| !dir.trim().is_empty())
                .map_or(defaults.data_dir, PathBuf::from),
            trash_enabled: lookup("TODOLIST_TRASH")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(defaults.trash_enabled),
            shutdown_timeout: lookup("TODOLIST_SHUTDOWN_TIMEOUT_SECS")
                .and_then(|s| s.trim().parse().ok())
                .map_or(defaults.shutdown_timeout, Duration::from_secs),
        }
    }

    /// Set the data directory
    #[must_use]
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Enable or disable the trash
    #[must_use]
    pub const fn with_trash(mut self, enabled: bool) -> Self {
        self.trash_enabled = enabled;
        self
    }

    /// Set the shutdown timeout
    #[must_use]
    pub const fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }
}
