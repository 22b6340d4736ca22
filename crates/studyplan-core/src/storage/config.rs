//! TOML-based application configuration.
//!
//! Stores planning defaults:
//! - Daily study budget, break length and day start time
//! - Progress model used across the horizon
//! - Allocation granularity and session length limits
//! - Scoring weights
//!
//! Configuration is stored at `~/.config/studyplan/config.toml`.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::allocator::AllocatorConfig;
use crate::error::ConfigError;
use crate::planner::{PlannerConfig, ProgressModel};
use crate::scoring::ScoringWeights;

const DAY_START_FORMAT: &str = "%H:%M";

/// Planner-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerSection {
    #[serde(default = "default_daily_budget")]
    pub daily_budget_minutes: i64,
    #[serde(default = "default_break_minutes")]
    pub break_minutes: i64,
    /// First session of the day, HH:MM
    #[serde(default = "default_day_start")]
    pub day_start: String,
    #[serde(default)]
    pub progress_model: ProgressModel,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/studyplan/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub planner: PlannerSection,
    #[serde(default)]
    pub allocator: AllocatorConfig,
    #[serde(default)]
    pub scoring: ScoringWeights,
}

fn default_daily_budget() -> i64 {
    6 * 60
}
fn default_break_minutes() -> i64 {
    15
}
fn default_day_start() -> String {
    "09:00".into()
}

impl Default for PlannerSection {
    fn default() -> Self {
        Self {
            daily_budget_minutes: default_daily_budget(),
            break_minutes: default_break_minutes(),
            day_start: default_day_start(),
            progress_model: ProgressModel::default(),
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
        let unknown = || ConfigError::InvalidValue {
            key: key.to_string(),
            message: "unknown config key".into(),
        };
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<i64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| {
                                    invalid(format!("cannot parse '{value}' as number"))
                                })?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
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

    /// Default config location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be created.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from `path`, writing defaults there if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// default config cannot be written.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content)?;
                Ok(cfg)
            }
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

    /// Persist to `path`, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
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

    /// Set a config value by dot-separated key. Does not save.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit the
    /// field's type. The config is left unchanged on error.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.planner_config()?;
        *self = updated;
        Ok(())
    }

    /// Parsed day start time.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if `planner.day_start` is not HH:MM.
    pub fn day_start(&self) -> Result<NaiveTime, ConfigError> {
        NaiveTime::parse_from_str(&self.planner.day_start, DAY_START_FORMAT).map_err(|e| {
            ConfigError::InvalidValue {
                key: "planner.day_start".into(),
                message: format!("'{}' is not HH:MM ({e})", self.planner.day_start),
            }
        })
    }

    /// Build the engine configuration from this file.
    ///
    /// # Errors
    ///
    /// Returns an error if `planner.day_start` cannot be parsed.
    pub fn planner_config(&self) -> Result<PlannerConfig, ConfigError> {
        Ok(PlannerConfig {
            day_start: self.day_start()?,
            weights: self.scoring,
            allocator: self.allocator,
            progress_model: self.planner.progress_model,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.planner.daily_budget_minutes, 360);
        assert_eq!(parsed.planner.progress_model, ProgressModel::Provisional);
        assert_eq!(parsed.allocator, AllocatorConfig::default());
    }

    #[test]
    fn partial_file_takes_defaults() {
        let parsed: Config = toml::from_str("[planner]\nbreak_minutes = 5\n").unwrap();
        assert_eq!(parsed.planner.break_minutes, 5);
        assert_eq!(parsed.planner.daily_budget_minutes, 360);
        assert_eq!(parsed.planner.day_start, "09:00");
        assert_eq!(parsed.scoring, ScoringWeights::default());
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("planner.break_minutes").as_deref(), Some("15"));
        assert_eq!(cfg.get("planner.progress_model").as_deref(), Some("provisional"));
        assert_eq!(cfg.get("allocator.granularity_minutes").as_deref(), Some("5"));
        assert!(cfg.get("planner.missing_key").is_none());
    }

    #[test]
    fn set_json_value_by_path_updates_nested_number() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        Config::set_json_value_by_path(&mut json, "allocator.min_session_minutes", "30").unwrap();
        assert_eq!(
            Config::get_json_value_by_path(&json, "allocator.min_session_minutes").unwrap(),
            &serde_json::Value::Number(30.into())
        );
    }

    #[test]
    fn set_json_value_by_path_rejects_unknown_key() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        let result = Config::set_json_value_by_path(&mut json, "planner.nonexistent_key", "value");
        assert!(result.is_err());
    }

    #[test]
    fn set_updates_weights_and_model() {
        let mut cfg = Config::default();
        cfg.set("scoring.urgency", "2.5").unwrap();
        cfg.set("planner.progress_model", "fixed").unwrap();
        assert_eq!(cfg.scoring.urgency, 2.5);
        assert_eq!(cfg.planner.progress_model, ProgressModel::Fixed);
    }

    #[test]
    fn set_accepts_negative_integers() {
        // Rejected later by the planner, but storable.
        let mut cfg = Config::default();
        cfg.set("planner.break_minutes", "-5").unwrap();
        assert_eq!(cfg.planner.break_minutes, -5);
    }

    #[test]
    fn set_rejects_bad_values_without_changing_config() {
        let mut cfg = Config::default();
        assert!(cfg.set("planner.progress_model", "sometimes").is_err());
        assert!(cfg.set("planner.day_start", "9am").is_err());
        assert!(cfg.set("allocator.granularity_minutes", "lots").is_err());
        assert_eq!(cfg.planner.progress_model, ProgressModel::Provisional);
        assert_eq!(cfg.planner.day_start, "09:00");
    }

    #[test]
    fn planner_config_parses_day_start() {
        let mut cfg = Config::default();
        cfg.planner.day_start = "07:45".into();
        let planner = cfg.planner_config().unwrap();
        assert_eq!(planner.day_start, NaiveTime::from_hms_opt(7, 45, 0).unwrap());
        assert_eq!(planner.allocator, cfg.allocator);

        cfg.planner.day_start = "25:00".into();
        assert!(matches!(
            cfg.planner_config(),
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "planner.day_start"
        ));
    }
}
