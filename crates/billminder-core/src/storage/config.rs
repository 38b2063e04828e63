//! TOML-based application configuration.
//!
//! Stores:
//! - Overdue sweeper cadence
//! - Notification permission behaviour
//! - Storage keys inside the key-value store
//! - Default step for CUSTOM recurrence
//!
//! Configuration is stored at `~/.config/billminder/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use super::reminder_store::DEFAULT_REMINDERS_KEY;
use crate::error::ConfigError;
use crate::notify::local::DEFAULT_NOTIFICATIONS_KEY;
use crate::reminder::{CustomInterval, IntervalUnit};

/// Overdue sweeper configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweeperConfig {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Sweep eagerly whenever the reminder list is reloaded.
    #[serde(default = "default_true")]
    pub sweep_on_refresh: bool,
}

/// Notification configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Ask the platform for permission when it has not been granted yet.
    #[serde(default = "default_true")]
    pub request_permission: bool,
    /// Answer given by the CLI's static permission provider.
    #[serde(default = "default_true")]
    pub permission_granted: bool,
}

/// Keys used inside the key-value store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_reminders_key")]
    pub reminders_key: String,
    #[serde(default = "default_notifications_key")]
    pub notifications_key: String,
}

/// Recurrence defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurrenceConfig {
    /// Step applied to CUSTOM reminders that carry no interval of their own.
    #[serde(default = "default_custom_unit")]
    pub custom_unit: IntervalUnit,
    #[serde(default = "default_custom_count")]
    pub custom_count: u32,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/billminder/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sweeper: SweeperConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub recurrence: RecurrenceConfig,
}

fn default_interval_secs() -> u64 {
    60
}
fn default_true() -> bool {
    true
}
fn default_reminders_key() -> String {
    DEFAULT_REMINDERS_KEY.into()
}
fn default_notifications_key() -> String {
    DEFAULT_NOTIFICATIONS_KEY.into()
}
fn default_custom_unit() -> IntervalUnit {
    IntervalUnit::Days
}
fn default_custom_count() -> u32 {
    1
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            sweep_on_refresh: true,
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            request_permission: true,
            permission_granted: true,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            reminders_key: default_reminders_key(),
            notifications_key: default_notifications_key(),
        }
    }
}

impl Default for RecurrenceConfig {
    fn default() -> Self {
        Self {
            custom_unit: default_custom_unit(),
            custom_count: default_custom_count(),
        }
    }
}

impl RecurrenceConfig {
    pub fn custom_interval(&self) -> CustomInterval {
        CustomInterval {
            unit: self.custom_unit,
            count: self.custom_count,
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }
        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;
                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => serde_json::Value::Number(
                        value
                            .parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?
                            .into(),
                    ),
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        return Err(invalid("only leaf keys can be set".into()));
                    }
                    _ => serde_json::Value::String(value.into()),
                };
                obj.insert(part.to_string(), new_value);
                return Ok(());
            }
            current = current.get_mut(part).ok_or_else(unknown)?;
        }
        Err(unknown())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("config.toml"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from the data directory, writing defaults if no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the data directory.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a value by dot-separated key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not parse
    /// into the field's type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    pub fn sweep_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.sweeper.interval_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.sweeper.interval_secs, 60);
        assert_eq!(cfg.storage.reminders_key, "reminders");
        assert_eq!(cfg.recurrence.custom_interval(), CustomInterval::days(1));
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg: Config = toml::from_str("[sweeper]\ninterval_secs = 5\n").unwrap();
        assert_eq!(cfg.sweeper.interval_secs, 5);
        assert!(cfg.sweeper.sweep_on_refresh);
        assert!(cfg.notifications.request_permission);
    }

    #[test]
    fn get_and_set_by_dotted_key() {
        let mut cfg = Config::default();
        assert_eq!(cfg.get("sweeper.interval_secs").as_deref(), Some("60"));
        cfg.set("sweeper.interval_secs", "15").unwrap();
        cfg.set("notifications.permission_granted", "false").unwrap();
        cfg.set("recurrence.custom_unit", "weeks").unwrap();
        assert_eq!(cfg.sweeper.interval_secs, 15);
        assert!(!cfg.notifications.permission_granted);
        assert_eq!(cfg.recurrence.custom_unit, IntervalUnit::Weeks);
    }

    #[test]
    fn set_rejects_unknown_and_bad_values() {
        let mut cfg = Config::default();
        assert!(matches!(cfg.set("nope.key", "1"), Err(ConfigError::UnknownKey(_))));
        assert!(matches!(
            cfg.set("sweeper.interval_secs", "soon"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            cfg.set("recurrence.custom_unit", "fortnights"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn load_from_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());

        let mut changed = cfg.clone();
        changed.sweeper.interval_secs = 30;
        changed.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), changed);
    }
}
