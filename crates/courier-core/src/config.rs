use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::CourierError;
use crate::rewrite::DEFAULT_MIRROR_HOST;

/// Top-level Courier configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub courier: CourierConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub cursor: CursorConfig,
    #[serde(default)]
    pub rewrite: RewriteConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourierConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for CourierConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// Record store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

/// Polling behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Delay between full sweeps over all active bots.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Long-poll timeout. Kept short to bound cycle latency and narrow the
    /// conflict window with other pollers on the same token.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Maximum updates fetched per cycle.
    #[serde(default = "default_limit")]
    pub limit: i64,
    /// Relay only messages from private chats. Group-posted messages to the
    /// bot are ignored even from authorized senders.
    #[serde(default)]
    pub private_only: bool,
    /// Bot names excluded from the sweep (handled by a separate deployment).
    #[serde(default)]
    pub exclude_bots: Vec<String>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            timeout_secs: default_timeout_secs(),
            limit: default_limit(),
            private_only: false,
            exclude_bots: Vec::new(),
        }
    }
}

/// Where poll cursors live.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CursorBackend {
    /// In-memory only. A restart may reprocess the last batch.
    #[default]
    Memory,
    /// One plain-text integer file per bot, durable across restarts.
    File,
}

/// Cursor persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CursorConfig {
    #[serde(default)]
    pub backend: CursorBackend,
    /// Directory for file-backed cursors.
    #[serde(default = "default_cursor_dir")]
    pub dir: String,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            backend: CursorBackend::default(),
            dir: default_cursor_dir(),
        }
    }
}

/// Twitter/X link rewriting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewriteConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_mirror_host")]
    pub mirror_host: String,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            mirror_host: default_mirror_host(),
        }
    }
}

// --- Default value functions ---

fn default_name() -> String {
    "courier".to_string()
}
fn default_data_dir() -> String {
    "~/.courier".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_db_path() -> String {
    "~/.courier/courier.db".to_string()
}
fn default_interval_secs() -> u64 {
    10
}
fn default_timeout_secs() -> u64 {
    1
}
fn default_limit() -> i64 {
    100
}
fn default_cursor_dir() -> String {
    "~/.courier/cursors".to_string()
}
fn default_true() -> bool {
    true
}
fn default_mirror_host() -> String {
    DEFAULT_MIRROR_HOST.to_string()
}

/// Expand `~` to home directory.
pub fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file does not exist.
pub fn load(path: &str) -> Result<Config, CourierError> {
    let path = Path::new(path);
    if !path.exists() {
        tracing::info!("Config file not found at {}, using defaults", path.display());
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| CourierError::Config(format!("failed to read {}: {e}", path.display())))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| CourierError::Config(format!("failed to parse config: {e}")))?;

    Ok(config)
}
