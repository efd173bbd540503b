//! Sync-related domain models and configuration.
//!
//! Contains the application configuration and the persisted state of the
//! remote sync routine.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Configuration for the periodic sync.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Interval between sync ticks in seconds.
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    /// Whether periodic sync is enabled.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
            enabled: default_enabled(),
        }
    }
}

impl SyncConfig {
    /// Interval as a `Duration`, never shorter than one second.
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

const fn default_interval() -> u64 {
    30
}

const fn default_enabled() -> bool {
    true
}

/// Configuration for the remote quote endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// JSON collection endpoint supporting GET and POST.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum number of remote items kept per fetch.
    #[serde(default = "default_fetch_limit")]
    pub fetch_limit: usize,

    /// Category given to remote items that carry none.
    #[serde(default = "default_category")]
    pub default_category: String,

    /// Send newly added quotes to the remote.
    #[serde(default)]
    pub push_on_add: bool,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout(),
            fetch_limit: default_fetch_limit(),
            default_category: default_category(),
            push_on_add: false,
        }
    }
}

fn default_endpoint() -> String {
    "https://jsonplaceholder.typicode.com/posts".to_string()
}

const fn default_timeout() -> u64 {
    10
}

const fn default_fetch_limit() -> usize {
    10
}

fn default_category() -> String {
    "Remote".to_string()
}

/// Path configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathConfig {
    /// Base data directory.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

/// Complete application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Periodic sync configuration.
    #[serde(default)]
    pub sync: SyncConfig,

    /// Remote endpoint configuration.
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Path configuration.
    #[serde(default)]
    pub paths: PathConfig,
}

impl AppConfig {
    /// Get the data directory, using default if not configured.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.paths
            .data_dir
            .clone()
            .unwrap_or_else(Self::default_data_dir)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".quote-generator")
    }

    /// Get the storage database path.
    #[must_use]
    pub fn storage_db_path(&self) -> PathBuf {
        self.data_dir().join("quotes.db")
    }
}

/// Persisted state of the sync routine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncState {
    /// Last completed tick.
    pub last_sync: Option<DateTime<Utc>>,

    /// Number of quotes received on the last tick.
    pub last_remote_count: usize,

    /// Size of the quote list after the last tick.
    pub quote_count: usize,

    /// Whether a tick is currently in progress.
    pub is_syncing: bool,

    /// Last error message if any.
    pub last_error: Option<String>,
}

impl SyncState {
    /// Stamp the state with the current time.
    #[must_use]
    pub fn with_sync_time(mut self) -> Self {
        self.last_sync = Some(Utc::now());
        self
    }

    /// Mark sync as in progress.
    #[must_use]
    pub const fn syncing(mut self) -> Self {
        self.is_syncing = true;
        self
    }

    /// Mark sync as completed.
    #[must_use]
    pub const fn completed(mut self) -> Self {
        self.is_syncing = false;
        self
    }

    /// Set error state.
    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.last_error = Some(error.into());
        self.is_syncing = false;
        self
    }

    /// Clear error state.
    #[must_use]
    pub fn clear_error(mut self) -> Self {
        self.last_error = None;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.sync.interval_secs, 30);
        assert!(config.sync.enabled);
        assert_eq!(config.remote.default_category, "Remote");
        assert!(!config.remote.push_on_add);
    }

    #[test]
    fn test_interval_never_zero() {
        let config = SyncConfig {
            interval_secs: 0,
            enabled: true,
        };
        assert_eq!(config.interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_sync_state_transitions() {
        let state = SyncState::default()
            .syncing()
            .with_sync_time()
            .completed();

        assert!(!state.is_syncing);
        assert!(state.last_sync.is_some());

        let failed = state.syncing().with_error("boom");
        assert!(!failed.is_syncing);
        assert_eq!(failed.last_error.as_deref(), Some("boom"));
        assert!(failed.clear_error().last_error.is_none());
    }

    #[test]
    fn test_paths_follow_data_dir() {
        let config = AppConfig {
            paths: PathConfig {
                data_dir: Some(PathBuf::from("/tmp/quotes")),
            },
            ..Default::default()
        };
        assert_eq!(config.storage_db_path(), PathBuf::from("/tmp/quotes/quotes.db"));
    }
}
