//! Horizon planner.
//!
//! Repeats the daily allocation for every day from the start date until the
//! furthest deadline and lays the results out as timestamped sessions:
//! - Scores are recomputed per day, so urgency rises toward each deadline
//! - Sessions start at a fixed time of day with a fixed break between them
//! - Input subjects are never modified; progress is the caller's business
//!
//! How scheduled time feeds into later days is governed by [`ProgressModel`].

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Days, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::allocator::{AllocatorConfig, DailyAllocator};
use crate::error::PlanError;
use crate::scoring::{score_all, ScoredSubject, ScoringWeights};
use crate::subject::Subject;

/// Study time between one day's start and the next.
const MINUTES_PER_DAY: i64 = 24 * 60;

fn past_supported_range() -> PlanError {
    PlanError::config("start_date", "plan runs past the supported date range")
}

/// How time scheduled on earlier days affects later days of the same plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressModel {
    /// Scheduled minutes count as provisional progress: later days only
    /// plan what earlier days left over. Planning ends once nothing is left.
    #[default]
    Provisional,
    /// Remaining workload stays as recorded for every day of the horizon.
    Fixed,
}

/// Planner configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerConfig {
    /// Time of day the first session starts
    pub day_start: NaiveTime,
    pub weights: ScoringWeights,
    pub allocator: AllocatorConfig,
    pub progress_model: ProgressModel,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            day_start: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
            weights: ScoringWeights::default(),
            allocator: AllocatorConfig::default(),
            progress_model: ProgressModel::default(),
        }
    }
}

/// One scheduled study interval for a single subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionBlock {
    pub subject_id: String,
    pub subject_name: String,
    /// Days after the start date
    pub day_index: u32,
    pub date: NaiveDate,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub duration_minutes: u32,
}

/// Planner that repeats [`DailyAllocator`] across the whole horizon.
#[derive(Debug, Clone, Default)]
pub struct HorizonPlanner {
    config: PlannerConfig,
}

impl HorizonPlanner {
    /// Create a planner with default config
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom config
    pub fn with_config(config: PlannerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Generate the full plan.
    ///
    /// # Arguments
    /// * `subjects` - Snapshot of the subjects to plan for
    /// * `daily_budget_minutes` - Study time available each day
    /// * `start_date` - Date of day 0
    /// * `break_minutes` - Gap between consecutive sessions on the same day
    ///
    /// # Returns
    /// Sessions ordered by day, then by start time. Empty when every subject
    /// is already complete.
    ///
    /// # Errors
    ///
    /// All input checks run before any allocation:
    /// - [`PlanError::InvalidConfiguration`] for a budget outside
    ///   `1..=1440`, a negative break, or invalid weights / allocator settings
    /// - [`PlanError::NoSubjects`] for an empty subject list
    /// - [`PlanError::InvalidSubject`] for a subject violating its constraints
    ///
    /// Layout can still fail with [`PlanError::InvalidConfiguration`] when a
    /// day's sessions and breaks would run into the next day's start, or when
    /// the horizon leaves chrono's date range.
    pub fn plan(
        &self,
        subjects: &[Subject],
        daily_budget_minutes: i64,
        start_date: NaiveDate,
        break_minutes: i64,
    ) -> Result<Vec<SessionBlock>, PlanError> {
        let (budget, gap) = self.validate(subjects, daily_budget_minutes, break_minutes)?;

        if subjects.iter().all(Subject::is_complete) {
            tracing::debug!(subjects = subjects.len(), "all subjects complete; nothing to plan");
            return Ok(Vec::new());
        }

        // Overdue work is planned on day 0 even when no deadline lies ahead.
        let horizon = subjects.iter().map(|s| s.days_left).max().unwrap_or(0).max(1);
        let minutes_per_unit = self.config.allocator.minutes_per_unit;
        let allocator = DailyAllocator::with_config(self.config.allocator);

        let index_by_id: HashMap<&str, usize> = subjects
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id.as_str(), i))
            .collect();
        let mut ledger: Vec<u32> = subjects
            .iter()
            .map(|s| s.remaining_units().saturating_mul(minutes_per_unit))
            .collect();

        let mut sessions = Vec::new();

        for day in 0..horizon {
            let scored = match self.config.progress_model {
                ProgressModel::Fixed => score_all(subjects, day, &self.config.weights),
                ProgressModel::Provisional => subjects
                    .iter()
                    .zip(&ledger)
                    .filter(|(_, minutes)| **minutes > 0)
                    .map(|(s, &minutes)| {
                        let weights = &self.config.weights;
                        ScoredSubject::provisional(s, day, minutes, minutes_per_unit, weights)
                    })
                    .collect::<Vec<_>>(),
            };

            if scored.is_empty() {
                tracing::debug!(day, "no remaining workload; plan ends early");
                break;
            }

            let allocations = allocator.allocate(&scored, budget)?;
            let date = start_date
                .checked_add_days(Days::new(u64::from(day)))
                .ok_or_else(past_supported_range)?;
            let next_day_start = date
                .checked_add_days(Days::new(1))
                .ok_or_else(past_supported_range)?
                .and_time(self.config.day_start);

            let mut cursor = date.and_time(self.config.day_start);
            for (position, allocation) in allocations.iter().enumerate() {
                let start = if position == 0 {
                    cursor
                } else {
                    cursor
                        .checked_add_signed(Duration::minutes(i64::from(gap)))
                        .ok_or_else(past_supported_range)?
                };
                let end = start
                    .checked_add_signed(Duration::minutes(i64::from(allocation.duration_minutes)))
                    .ok_or_else(past_supported_range)?;
                if end > next_day_start {
                    let message = format!("sessions on {date} run past {next_day_start}");
                    return Err(PlanError::config("break_minutes", message));
                }
                sessions.push(SessionBlock {
                    subject_id: allocation.subject.id.clone(),
                    subject_name: allocation.subject.name.clone(),
                    day_index: day,
                    date,
                    start,
                    end,
                    duration_minutes: allocation.duration_minutes,
                });
                cursor = end;

                if self.config.progress_model == ProgressModel::Provisional {
                    if let Some(&i) = index_by_id.get(allocation.subject.id.as_str()) {
                        ledger[i] = ledger[i].saturating_sub(allocation.duration_minutes);
                    }
                }
            }

            tracing::debug!(
                day,
                %date,
                sessions = allocations.len(),
                minutes = allocations.iter().map(|a| a.duration_minutes).sum::<u32>(),
                "day planned"
            );
        }

        tracing::info!(
            horizon,
            sessions = sessions.len(),
            progress_model = ?self.config.progress_model,
            "plan generated"
        );
        Ok(sessions)
    }

    fn validate(
        &self,
        subjects: &[Subject],
        daily_budget_minutes: i64,
        break_minutes: i64,
    ) -> Result<(u32, u32), PlanError> {
        if daily_budget_minutes <= 0 {
            return Err(PlanError::config(
                "daily_budget_minutes",
                format!("must be positive, got {daily_budget_minutes}"),
            ));
        }
        if break_minutes < 0 {
            return Err(PlanError::config(
                "break_minutes",
                format!("must not be negative, got {break_minutes}"),
            ));
        }
        if daily_budget_minutes > MINUTES_PER_DAY {
            let message = format!("must not exceed {MINUTES_PER_DAY}, got {daily_budget_minutes}");
            return Err(PlanError::config("daily_budget_minutes", message));
        }
        let budget = u32::try_from(daily_budget_minutes)
            .map_err(|_| PlanError::config("daily_budget_minutes", "value is too large"))?;
        let gap = u32::try_from(break_minutes)
            .map_err(|_| PlanError::config("break_minutes", "value is too large"))?;

        self.config.weights.validate()?;
        self.config.allocator.validate()?;

        if subjects.is_empty() {
            return Err(PlanError::NoSubjects);
        }

        let mut seen = HashSet::new();
        for subject in subjects {
            subject.validate()?;
            if !seen.insert(subject.id.as_str()) {
                return Err(PlanError::subject(&subject.id, "duplicate subject id"));
            }
        }

        Ok((budget, gap))
    }
}

/// Plan with the default [`PlannerConfig`].
///
/// # Errors
///
/// See [`HorizonPlanner::plan`].
pub fn plan(
    subjects: &[Subject],
    daily_budget_minutes: i64,
    start_date: NaiveDate,
    break_minutes: i64,
) -> Result<Vec<SessionBlock>, PlanError> {
    HorizonPlanner::new().plan(subjects, daily_budget_minutes, start_date, break_minutes)
}

/// Total planned minutes per subject id.
pub fn minutes_by_subject(sessions: &[SessionBlock]) -> BTreeMap<String, u32> {
    let mut totals = BTreeMap::new();
    for session in sessions {
        *totals.entry(session.subject_id.clone()).or_insert(0) += session.duration_minutes;
    }
    totals
}

/// Total planned minutes per date.
pub fn minutes_by_day(sessions: &[SessionBlock]) -> BTreeMap<NaiveDate, u32> {
    let mut totals = BTreeMap::new();
    for session in sessions {
        *totals.entry(session.date).or_insert(0) += session.duration_minutes;
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(day: NaiveDate, h: u32, m: u32) -> NaiveDateTime {
        day.and_hms_opt(h, m, 0).unwrap()
    }

    fn fixed_planner() -> HorizonPlanner {
        HorizonPlanner::with_config(PlannerConfig {
            progress_model: ProgressModel::Fixed,
            ..PlannerConfig::default()
        })
    }

    #[test]
    fn sessions_are_laid_out_with_breaks() {
        let subjects = vec![
            Subject::new("x", "X", 1, 2),
            Subject::new("y", "Y", 3, 1),
        ];
        let start = date(2026, 3, 2);
        let sessions = plan(&subjects, 360, start, 10).unwrap();

        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].subject_id, "x");
        assert_eq!(sessions[0].start, at(start, 9, 0));
        assert_eq!(sessions[0].end, at(start, 10, 0));
        assert_eq!(sessions[1].subject_id, "y");
        assert_eq!(sessions[1].start, at(start, 10, 10));
        assert_eq!(sessions[1].end, at(start, 10, 40));
        assert!(sessions.iter().all(|s| s.date == start && s.day_index == 0));
    }

    #[test]
    fn provisional_model_stops_once_work_is_planned() {
        let subjects = vec![Subject::new("x", "X", 5, 20)];
        // 600 minutes of work at 300 minutes per day.
        let sessions = plan(&subjects, 300, date(2026, 1, 5), 15).unwrap();
        let days: Vec<u32> = sessions.iter().map(|s| s.day_index).collect();
        assert_eq!(days, vec![0, 1]);
        assert_eq!(minutes_by_subject(&sessions)["x"], 600);
    }

    #[test]
    fn fixed_model_repeats_each_day() {
        let subjects = vec![
            Subject::new("x", "X", 1, 2),
            Subject::new("y", "Y", 3, 1),
        ];
        let sessions = fixed_planner().plan(&subjects, 360, date(2026, 3, 2), 10).unwrap();
        assert_eq!(sessions.len(), 6);
        let per_day = minutes_by_day(&sessions);
        assert_eq!(per_day.len(), 3);
        assert!(per_day.values().all(|&m| m == 90));
    }

    #[test]
    fn urgent_hard_subject_gets_most_of_day_zero() {
        let subjects = vec![
            Subject::new("A", "A", 1, 100).with_priority(1).with_complexity(5),
            Subject::new("B", "B", 30, 100).with_completed(90).with_priority(5).with_complexity(1),
        ];
        let sessions = plan(&subjects, 360, date(2026, 5, 1), 15).unwrap();
        let day0: Vec<_> = sessions.iter().filter(|s| s.day_index == 0).collect();
        let a: u32 = day0.iter().filter(|s| s.subject_id == "A").map(|s| s.duration_minutes).sum();
        let total: u32 = day0.iter().map(|s| s.duration_minutes).sum();
        assert!(total <= 360);
        assert!(a * 4 >= total * 3, "A got {a} of {total} minutes");
        assert_eq!(day0[0].subject_id, "A");
    }

    #[test]
    fn completed_subjects_yield_empty_plan() {
        let subjects = vec![Subject::new("done", "Done", 4, 10).with_completed(10)];
        assert_eq!(plan(&subjects, 360, date(2026, 1, 1), 15).unwrap(), Vec::new());
    }

    #[test]
    fn overdue_work_is_planned_on_day_zero() {
        let subjects = vec![Subject::new("late", "Late", 0, 3).with_completed(1)];
        let sessions = plan(&subjects, 360, date(2026, 1, 1), 15).unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].day_index, 0);
        assert_eq!(sessions[0].duration_minutes, 60);
    }

    #[test]
    fn rejects_bad_configuration_before_subjects() {
        let start = date(2026, 1, 1);
        assert!(matches!(
            plan(&[], 0, start, 15),
            Err(PlanError::InvalidConfiguration { ref field, .. })
                if field == "daily_budget_minutes"
        ));
        assert!(matches!(
            plan(&[Subject::new("a", "A", 1, 1)], 60, start, -5),
            Err(PlanError::InvalidConfiguration { ref field, .. }) if field == "break_minutes"
        ));
    }

    #[test]
    fn rejects_empty_subject_list() {
        assert_eq!(plan(&[], 60, date(2026, 1, 1), 0), Err(PlanError::NoSubjects));
    }

    #[test]
    fn rejects_invalid_and_duplicate_subjects() {
        let start = date(2026, 1, 1);
        let bad = vec![Subject::new("a", "A", 3, 5).with_completed(6)];
        assert!(matches!(plan(&bad, 60, start, 0), Err(PlanError::InvalidSubject { .. })));

        let dupes = vec![Subject::new("a", "A", 3, 5), Subject::new("a", "Again", 2, 5)];
        assert!(matches!(
            plan(&dupes, 60, start, 0),
            Err(PlanError::InvalidSubject { ref message, .. }) if message == "duplicate subject id"
        ));
    }

    #[test]
    fn planning_does_not_touch_progress() {
        let subjects = vec![Subject::new("a", "A", 3, 5).with_completed(2)];
        let before = subjects.clone();
        let _ = plan(&subjects, 120, date(2026, 1, 1), 5).unwrap();
        assert_eq!(subjects, before);
    }

    #[test]
    fn day_start_is_configurable() {
        let planner = HorizonPlanner::with_config(PlannerConfig {
            day_start: NaiveTime::from_hms_opt(18, 30, 0).unwrap(),
            ..PlannerConfig::default()
        });
        let start = date(2026, 2, 10);
        let sessions = planner.plan(&[Subject::new("a", "A", 2, 1)], 60, start, 0).unwrap();
        assert_eq!(sessions[0].start, at(start, 18, 30));
        assert_eq!(sessions[0].end, at(start, 19, 0));
    }

    #[test]
    fn rejects_budget_longer_than_a_day() {
        let planner = HorizonPlanner::with_config(PlannerConfig {
            allocator: AllocatorConfig {
                max_session_minutes: 2000,
                ..AllocatorConfig::default()
            },
            ..PlannerConfig::default()
        });
        let subjects = vec![Subject::new("a", "A", 3, 1000)];
        assert!(matches!(
            planner.plan(&subjects, 1500, date(2026, 1, 1), 0),
            Err(PlanError::InvalidConfiguration { ref field, .. })
                if field == "daily_budget_minutes"
        ));
    }

    #[test]
    fn consecutive_days_never_overlap() {
        let planner = HorizonPlanner::with_config(PlannerConfig {
            allocator: AllocatorConfig {
                max_session_minutes: 2000,
                ..AllocatorConfig::default()
            },
            ..PlannerConfig::default()
        });
        let start = date(2026, 1, 1);
        let subjects = vec![Subject::new("a", "A", 3, 1000)];
        let sessions = planner.plan(&subjects, 1440, start, 0).unwrap();

        assert_eq!(sessions.len(), 3);
        assert_eq!(sessions[0].end, at(date(2026, 1, 2), 9, 0));
        for pair in sessions.windows(2) {
            assert!(pair[0].end <= pair[1].start);
        }
    }

    #[test]
    fn breaks_running_into_the_next_day_are_rejected() {
        let subjects: Vec<Subject> = (0..40)
            .map(|i| Subject::new(format!("s{i:02}"), format!("S{i}"), 1, 1))
            .collect();
        let result = plan(&subjects, 1440, date(2026, 1, 1), i64::from(u32::MAX));
        assert!(matches!(
            result,
            Err(PlanError::InvalidConfiguration { ref field, .. }) if field == "break_minutes"
        ));
    }

    #[test]
    fn long_break_after_the_last_session_is_harmless() {
        let subjects = vec![Subject::new("a", "A", 1, 2)];
        let sessions = plan(&subjects, 360, date(2026, 1, 1), i64::from(u32::MAX)).unwrap();
        assert_eq!(sessions.len(), 1);
    }

    #[test]
    fn horizon_past_the_calendar_is_an_error() {
        let subjects = vec![Subject::new("a", "A", 3, 100)];
        assert!(matches!(
            plan(&subjects, 60, NaiveDate::MAX, 0),
            Err(PlanError::InvalidConfiguration { ref field, .. }) if field == "start_date"
        ));
    }
}
