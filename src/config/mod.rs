//! Configuration loading and management

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::core::error::{ConfigError, MarkResult};

pub const DEFAULT_LICENSE_SERVER: &str = "https://magicapi.fitlex.me";

/// License server and enforcement settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LicenseSettings {
    pub server_url: String,

    /// Per-request timeout for license server calls
    pub timeout_secs: u64,

    pub ping_interval_minutes: u64,

    /// How long a previously validated key keeps working while the server is unreachable
    pub grace_period_hours: i64,

    /// When false, the license layer only logs; bookmark routes stay open
    pub enforce: bool,
}

impl Default for LicenseSettings {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_LICENSE_SERVER.to_string(),
            timeout_secs: 5,
            ping_interval_minutes: 15,
            grace_period_hours: 24,
            enforce: false,
        }
    }
}

impl LicenseSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_interval_minutes * 60)
    }

    pub fn grace_period(&self) -> chrono::Duration {
        chrono::Duration::hours(self.grace_period_hours)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookmarkSettings {
    pub default_emoji: String,
    pub max_name_length: usize,
    pub max_emoji_length: usize,
}

impl Default for BookmarkSettings {
    fn default() -> Self {
        Self {
            default_emoji: "bookmark".to_string(),
            max_name_length: 100,
            max_emoji_length: 50,
        }
    }
}

/// Complete plugin configuration
///
/// Every field has a default, so an empty YAML document is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginConfig {
    /// Sent to the license server as `pluginName`
    pub plugin_name: String,

    /// Sent to the license server as `productName`
    pub product_name: String,

    pub license: LicenseSettings,

    pub bookmarks: BookmarkSettings,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            plugin_name: "magic-mark".to_string(),
            product_name: "MagicMark - Advanced Query Builder".to_string(),
            license: LicenseSettings::default(),
            bookmarks: BookmarkSettings::default(),
        }
    }
}

impl PluginConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> MarkResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => ConfigError::IoError {
                message: e.to_string(),
            },
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            file: Some(path.display().to_string()),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> MarkResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> MarkResult<()> {
        let invalid = |field: &str, value: String, message: &str| ConfigError::InvalidValue {
            field: field.to_string(),
            value,
            message: message.to_string(),
        };

        if self.license.server_url.trim().is_empty() {
            return Err(invalid("license.server_url", String::new(), "must not be empty").into());
        }
        if self.license.timeout_secs == 0 {
            return Err(invalid("license.timeout_secs", "0".into(), "must be positive").into());
        }
        if self.license.ping_interval_minutes == 0 {
            return Err(
                invalid("license.ping_interval_minutes", "0".into(), "must be positive").into(),
            );
        }
        if self.license.grace_period_hours < 0 {
            return Err(invalid(
                "license.grace_period_hours",
                self.license.grace_period_hours.to_string(),
                "must not be negative",
            )
            .into());
        }
        if self.bookmarks.max_name_length == 0 {
            return Err(
                invalid("bookmarks.max_name_length", "0".into(), "must be positive").into(),
            );
        }
        Ok(())
    }
}
