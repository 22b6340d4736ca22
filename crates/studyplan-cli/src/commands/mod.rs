pub mod allocate;
pub mod config;
pub mod plan;
pub mod progress;
pub mod score;

use std::path::{Path, PathBuf};

use studyplan_core::{Config, Subject};

/// Resolve the config path: explicit `--config` or the default location.
pub fn config_path(explicit: Option<&Path>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(Config::path()?),
    }
}

/// Load config, writing defaults if the file does not exist yet.
pub fn load_config(explicit: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    Ok(Config::load_from(&config_path(explicit)?)?)
}

/// Read a JSON array of subjects.
pub fn load_subjects(path: &Path) -> Result<Vec<Subject>, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read subjects from {}: {e}", path.display()))?;
    let subjects: Vec<Subject> = serde_json::from_str(&content)
        .map_err(|e| format!("invalid subjects file {}: {e}", path.display()))?;
    tracing::debug!(count = subjects.len(), path = %path.display(), "subjects loaded");
    Ok(subjects)
}
