//! Integration tests for the TOML configuration layer.

use chrono::NaiveDate;
use studyplan_core::{Config, ConfigError, HorizonPlanner, ProgressModel, Subject};

#[test]
fn test_missing_file_is_created_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let cfg = Config::load_from(&path).unwrap();
    assert!(path.exists());
    assert_eq!(cfg.planner.daily_budget_minutes, 360);

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("[planner]"));
    assert!(written.contains("[allocator]"));
    assert!(written.contains("[scoring]"));
}

#[test]
fn test_save_and_reload_preserves_changes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    let mut cfg = Config::default();
    cfg.set("planner.daily_budget_minutes", "240").unwrap();
    cfg.set("planner.progress_model", "fixed").unwrap();
    cfg.set("allocator.max_session_minutes", "120").unwrap();
    cfg.save_to(&path).unwrap();

    let reloaded = Config::load_from(&path).unwrap();
    assert_eq!(reloaded.planner.daily_budget_minutes, 240);
    assert_eq!(reloaded.planner.progress_model, ProgressModel::Fixed);
    assert_eq!(reloaded.allocator.max_session_minutes, 120);
}

#[test]
fn test_malformed_file_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[planner\nbroken = ").unwrap();

    assert!(matches!(Config::load_from(&path), Err(ConfigError::ParseFailed(_))));
}

#[test]
fn test_config_drives_planner() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let content = r#"
[planner]
day_start = "07:30"
progress_model = "fixed"

[allocator]
minutes_per_unit = 20
"#;
    std::fs::write(&path, content).unwrap();

    let cfg = Config::load_from(&path).unwrap();
    let planner = HorizonPlanner::with_config(cfg.planner_config().unwrap());
    let day = NaiveDate::from_ymd_opt(2026, 4, 6).unwrap();
    let sessions = planner
        .plan(
            &[Subject::new("s", "Statistics", 2, 3)],
            cfg.planner.daily_budget_minutes,
            day,
            cfg.planner.break_minutes,
        )
        .unwrap();

    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0].start, day.and_hms_opt(7, 30, 0).unwrap());
    assert_eq!(sessions[0].duration_minutes, 60);
}
