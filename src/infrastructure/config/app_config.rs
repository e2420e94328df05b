//! Application configuration.

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use super::args::CliArgs;
use crate::application::HistoryLoaderConfig;
use crate::domain::entities::GroupId;

pub(super) const APP_NAME: &str = "teleview";
pub(super) const APP_QUALIFIER: &str = "com";
pub(super) const APP_ORGANIZATION: &str = "linuxmobile";

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Application configuration, read from `config.toml` and overridden by CLI.
#[derive(Debug, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration file path.
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[serde(skip)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Enable mouse support.
    #[serde(default = "default_true")]
    pub mouse: bool,

    /// Groups cycled with Tab, in order.
    #[serde(default)]
    pub groups: Vec<String>,

    /// Archive connection settings.
    #[serde(default)]
    pub archive: ArchiveConfig,

    /// History loader tuning.
    #[serde(default)]
    pub history: HistoryConfig,

    /// UI configuration.
    #[serde(default)]
    pub ui: UiConfig,
}

/// Archive connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Base URL of the archive API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token sent with every request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ArchiveConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// History loader tuning. Durations are in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct HistoryConfig {
    pub threshold: u32,
    pub debounce_delay_ms: u64,
    pub page_size: usize,
    pub max_pages: u32,
    pub debounce_zone_fraction: f64,
    pub debounce_zone_cap: u32,
    pub cooldown_ms: u64,
    pub ready_delay_ms: u64,
    pub auto_scroll_delay_ms: u64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self::from(&HistoryLoaderConfig::terminal_rows())
    }
}

#[allow(clippy::cast_possible_truncation)]
impl From<&HistoryLoaderConfig> for HistoryConfig {
    fn from(config: &HistoryLoaderConfig) -> Self {
        Self {
            threshold: config.threshold,
            debounce_delay_ms: config.debounce_delay.as_millis() as u64,
            page_size: config.page_size,
            max_pages: config.max_pages,
            debounce_zone_fraction: config.debounce_zone_fraction,
            debounce_zone_cap: config.debounce_zone_cap,
            cooldown_ms: config.cooldown.as_millis() as u64,
            ready_delay_ms: config.ready_delay.as_millis() as u64,
            auto_scroll_delay_ms: config.auto_scroll_delay.as_millis() as u64,
        }
    }
}

impl HistoryConfig {
    /// Builds the loader configuration. A zero page size or page cap falls
    /// back to the default.
    #[must_use]
    pub fn to_loader_config(&self) -> HistoryLoaderConfig {
        let defaults = HistoryLoaderConfig::default();
        HistoryLoaderConfig {
            threshold: self.threshold,
            debounce_delay: Duration::from_millis(self.debounce_delay_ms),
            page_size: if self.page_size == 0 {
                defaults.page_size
            } else {
                self.page_size
            },
            max_pages: if self.max_pages == 0 {
                defaults.max_pages
            } else {
                self.max_pages
            },
            debounce_zone_fraction: self.debounce_zone_fraction.clamp(0.0, 1.0),
            debounce_zone_cap: self.debounce_zone_cap,
            cooldown: Duration::from_millis(self.cooldown_ms),
            ready_delay: Duration::from_millis(self.ready_delay_ms),
            auto_scroll_delay: Duration::from_millis(self.auto_scroll_delay_ms),
        }
    }
}

/// UI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Timestamp format string (chrono format).
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            timestamp_format: default_timestamp_format(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}

fn default_timestamp_format() -> String {
    "%Y-%m-%d %H:%M".to_string()
}

const fn default_true() -> bool {
    true
}

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: CliArgs) {
        if let Some(config_path) = args.config {
            self.config = Some(config_path);
        }
        if let Some(log_path) = args.log_path {
            self.log_path = Some(log_path);
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(mouse) = args.mouse {
            self.mouse = mouse;
        }
        if let Some(api_url) = args.api_url {
            self.archive.base_url = api_url;
        }
        if let Some(api_token) = args.api_token {
            self.archive.token = Some(api_token);
        }
        if let Some(page_size) = args.page_size {
            self.history.page_size = page_size;
        }
        if !args.groups.is_empty() {
            self.groups = args.groups;
        }
    }

    /// Configured groups, skipping blank entries.
    #[must_use]
    pub fn group_ids(&self) -> Vec<GroupId> {
        self.groups
            .iter()
            .map(|id| GroupId::from(id.as_str()))
            .filter(|id| !id.is_empty())
            .collect()
    }

    /// Returns default config directory.
    #[must_use]
    pub fn default_config_dir() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Returns default config file path.
    #[must_use]
    pub fn default_config_path() -> Option<PathBuf> {
        Self::default_config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Returns default log file path.
    #[must_use]
    pub fn default_log_path() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.data_dir().join("teleview.log"))
    }

    /// Returns effective config path.
    #[must_use]
    pub fn effective_config_path(&self) -> Option<PathBuf> {
        self.config.clone().or_else(Self::default_config_path)
    }

    /// Returns effective log path.
    #[must_use]
    pub fn effective_log_path(&self) -> Option<PathBuf> {
        self.log_path.clone().or_else(Self::default_log_path)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config: None,
            log_path: None,
            log_level: LogLevel::Info,
            mouse: true,
            groups: Vec::new(),
            archive: ArchiveConfig::default(),
            history: HistoryConfig::default(),
            ui: UiConfig::default(),
        }
    }
}
