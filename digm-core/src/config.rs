//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/digm/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/digm/` (~/.config/digm/)
//! - Data: `$XDG_DATA_HOME/digm/` (~/.local/share/digm/)
//! - State/Logs: `$XDG_STATE_HOME/digm/` (~/.local/state/digm/)

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_DATA_HOME or ~/.local/share
fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Reward policy amounts
    #[serde(default)]
    pub rewards: RewardsConfig,

    /// Focus view limits
    #[serde(default)]
    pub focus: FocusConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Remote sync configuration (optional)
    #[serde(default)]
    pub sync: SyncConfig,
}

/// XP amounts granted by engine operations.
///
/// These are policy parameters, not structural invariants: changing them
/// affects how fast users level, never whether the engine's bookkeeping
/// stays consistent.
#[derive(Debug, Clone, Deserialize)]
pub struct RewardsConfig {
    /// XP for completing a standard task
    #[serde(default = "default_task_xp")]
    pub task_xp: i64,

    /// XP for completing a high-impact task
    #[serde(default = "default_high_impact_task_xp")]
    pub high_impact_task_xp: i64,

    /// Flat bonus when a goal's progress first reaches 100%
    #[serde(default = "default_goal_completion_bonus_xp")]
    pub goal_completion_bonus_xp: i64,

    /// XP for creating a journal entry
    #[serde(default = "default_journal_entry_xp")]
    pub journal_entry_xp: i64,

    /// XP for keeping the daily streak alive
    #[serde(default = "default_streak_bonus_xp")]
    pub streak_bonus_xp: i64,
}

impl Default for RewardsConfig {
    fn default() -> Self {
        Self {
            task_xp: default_task_xp(),
            high_impact_task_xp: default_high_impact_task_xp(),
            goal_completion_bonus_xp: default_goal_completion_bonus_xp(),
            journal_entry_xp: default_journal_entry_xp(),
            streak_bonus_xp: default_streak_bonus_xp(),
        }
    }
}

impl RewardsConfig {
    /// Default reward for a task, by impact flag.
    pub fn task_reward(&self, is_high_impact: bool) -> i64 {
        if is_high_impact {
            self.high_impact_task_xp
        } else {
            self.task_xp
        }
    }
}

fn default_task_xp() -> i64 {
    5
}

fn default_high_impact_task_xp() -> i64 {
    15
}

fn default_goal_completion_bonus_xp() -> i64 {
    100
}

fn default_journal_entry_xp() -> i64 {
    10
}

fn default_streak_bonus_xp() -> i64 {
    3
}

/// Limits for the focus/home view.
#[derive(Debug, Clone, Deserialize)]
pub struct FocusConfig {
    /// Maximum concurrently pinned goals (also the focus list size)
    #[serde(default = "default_pinned_goal_limit")]
    pub pinned_goal_limit: usize,

    /// Maximum high-impact tasks surfaced at once
    #[serde(default = "default_high_impact_limit")]
    pub high_impact_limit: usize,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            pinned_goal_limit: default_pinned_goal_limit(),
            high_impact_limit: default_high_impact_limit(),
        }
    }
}

fn default_pinned_goal_limit() -> usize {
    3
}

fn default_high_impact_limit() -> usize {
    5
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

/// Remote sync configuration
///
/// When enabled, digm pushes snapshots to a sync server in addition to
/// storing them locally in SQLite. Sync is best-effort: the local store
/// stays authoritative.
#[derive(Debug, Deserialize, Clone)]
pub struct SyncConfig {
    /// Enable/disable remote sync
    #[serde(default)]
    pub enabled: bool,

    /// Sync server URL (e.g., `https://sync.example.com`)
    pub server_url: Option<String>,

    /// Device ID (UUID from registration)
    pub device_id: Option<String>,

    /// API key (from registration)
    pub api_key: Option<String>,

    /// HTTP request timeout in seconds
    #[serde(default = "default_sync_timeout")]
    pub timeout_secs: u64,

    /// Max retry attempts for transient failures
    #[serde(default = "default_sync_max_retries")]
    pub max_retries: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            server_url: None,
            device_id: None,
            api_key: None,
            timeout_secs: default_sync_timeout(),
            max_retries: default_sync_max_retries(),
        }
    }
}

impl SyncConfig {
    /// Check if sync is properly configured and enabled
    pub fn is_ready(&self) -> bool {
        self.enabled
            && self.server_url.is_some()
            && self.device_id.is_some()
            && self.api_key.is_some()
    }

    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        if self.server_url.is_none() {
            return Err(Error::Config(
                "sync.server_url is required when sync is enabled".to_string(),
            ));
        }
        if self.device_id.is_none() {
            return Err(Error::Config(
                "sync.device_id is required when sync is enabled".to_string(),
            ));
        }
        if self.api_key.is_none() {
            return Err(Error::Config(
                "sync.api_key is required when sync is enabled".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_sync_timeout() -> u64 {
    30
}

fn default_sync_max_retries() -> usize {
    3
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/digm/config.toml` (~/.config/digm/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("digm").join("config.toml")
    }

    /// Returns the data directory path (for SQLite database)
    ///
    /// `$XDG_DATA_HOME/digm/` (~/.local/share/digm/)
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join("digm")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/digm/` (~/.local/state/digm/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("digm")
    }

    /// Returns the database file path
    ///
    /// `$XDG_DATA_HOME/digm/data.db` (~/.local/share/digm/data.db)
    pub fn database_path() -> PathBuf {
        Self::data_dir().join("data.db")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/digm/digm.log` (~/.local/state/digm/digm.log)
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("digm.log")
    }

    /// Ensure XDG base directory environment variables are set.
    ///
    /// This is mainly for CLI binaries that want explicit, stable path
    /// behavior before invoking other components that read these env vars.
    pub fn ensure_xdg_env() {
        let home = home_dir();

        if std::env::var("XDG_DATA_HOME").is_err() {
            std::env::set_var("XDG_DATA_HOME", home.join(".local/share"));
        }

        if std::env::var("XDG_STATE_HOME").is_err() {
            std::env::set_var("XDG_STATE_HOME", home.join(".local/state"));
        }

        if std::env::var("XDG_CONFIG_HOME").is_err() {
            std::env::set_var("XDG_CONFIG_HOME", home.join(".config"));
        }
    }
}
