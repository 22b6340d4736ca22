//! Core error types for studyplan-core.
//!
//! Planning errors are deterministic: the engine performs no I/O, so the
//! same inputs always fail the same way and nothing is worth retrying.
//! Configuration errors come from the TOML layer in [`crate::storage`].

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by `score`, `allocate` and `plan`.
///
/// All of them are detected before any allocation work starts, so a failed
/// call never yields a partial plan.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// Non-positive budget, negative break, or an unusable engine setting
    #[error("Invalid configuration for '{field}': {message}")]
    InvalidConfiguration { field: String, message: String },

    /// A plan was requested for an empty subject list
    #[error("No subjects to plan")]
    NoSubjects,

    /// A subject snapshot violates its field constraints
    #[error("Invalid subject '{id}': {message}")]
    InvalidSubject { id: String, message: String },
}

impl PlanError {
    pub(crate) fn config(field: &str, message: impl Into<String>) -> Self {
        PlanError::InvalidConfiguration {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn subject(id: &str, message: impl Into<String>) -> Self {
        PlanError::InvalidSubject {
            id: id.to_string(),
            message: message.into(),
        }
    }
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_error_messages_name_the_offender() {
        let err = PlanError::config("daily_budget_minutes", "must be positive, got 0");
        assert_eq!(
            err.to_string(),
            "Invalid configuration for 'daily_budget_minutes': must be positive, got 0"
        );

        let err = PlanError::subject("math", "completed_units (12) exceeds total_units (10)");
        assert!(err.to_string().contains("'math'"));
    }
}
