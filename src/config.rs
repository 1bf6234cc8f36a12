//! Configuration file parser for ~/.config/cyberhound/config.toml.
//!
//! Every key is optional. Unknown keys are logged and otherwise ignored;
//! they are usually typos.
use serde::Deserialize;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large (max {0} bytes)")]
    TooLarge(u64),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Backend endpoints and controller tuning.
///
/// The whole struct is handed to the feed controller at construction; nothing
/// here is read from global state afterwards.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend base URL, e.g. `https://intel.example.com`.
    pub api_base: String,

    /// Path of the read endpoint, appended to `api_base`.
    pub feed_path: String,

    /// Path of the scan endpoint, appended to `api_base`.
    pub scan_path: String,

    /// Target sent with a scan when none is given explicitly.
    pub default_target: String,

    /// Seconds between background polls. 0 = poll once at startup only.
    pub poll_interval_secs: u64,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Play the boot narration before the first poll.
    pub boot_sequence: bool,

    /// Delay between boot narration lines, in milliseconds.
    pub boot_step_ms: u64,

    /// Reshuffle fallback records on every offline poll, not only on refresh.
    pub shuffle_fallback: bool,

    /// Link opened for records that carry no `url`.
    pub promo_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:5000".to_string(),
            feed_path: "/latest_deals.json".to_string(),
            scan_path: "/api/scan".to_string(),
            default_target: "remote".to_string(),
            poll_interval_secs: 5,
            request_timeout_secs: 10,
            boot_sequence: true,
            boot_step_ms: 600,
            shuffle_fallback: false,
            promo_url: "https://cyberhound.io/pro".to_string(),
        }
    }
}

impl Config {
    /// 1 MB.
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 10] = [
        "api_base",
        "feed_path",
        "scan_path",
        "default_target",
        "poll_interval_secs",
        "request_timeout_secs",
        "boot_sequence",
        "boot_step_ms",
        "shuffle_fallback",
        "promo_url",
    ];

    /// Read `path`, falling back to defaults when the file does not exist.
    ///
    /// An empty file also yields defaults. Unknown keys are accepted with a
    /// warning; a wrongly typed value is a [`ConfigError::Parse`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        // One byte past the cap is enough to tell an oversized file apart
        let mut content = String::new();
        file.take(Self::MAX_FILE_SIZE + 1)
            .read_to_string(&mut content)?;
        if content.len() as u64 > Self::MAX_FILE_SIZE {
            return Err(ConfigError::TooLarge(Self::MAX_FILE_SIZE));
        }

        Self::parse(&content)
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        if let Ok(table) = content.parse::<toml::Table>() {
            table
                .keys()
                .filter(|key| !Self::KNOWN_KEYS.contains(&key.as_str()))
                .for_each(|key| tracing::warn!(key = %key, "Ignoring unknown config key"));
        }

        let config: Config = toml::from_str(content)?;
        tracing::info!(api_base = %config.api_base, "Loaded configuration");
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Background poll cadence, or `None` when periodic polling is off.
    pub fn poll_interval(&self) -> Option<Duration> {
        (self.poll_interval_secs > 0).then(|| Duration::from_secs(self.poll_interval_secs))
    }

    pub fn boot_step(&self) -> Duration {
        Duration::from_millis(self.boot_step_ms)
    }
}

// ============================================================================
// Tests
// ============================================================================
