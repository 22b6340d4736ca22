//! Subject snapshots supplied by the caller.
//!
//! A [`Subject`] is read-only input to the engine. Progress changes are a
//! user action taken outside planning; [`Subject::record_progress`] exists
//! for callers and is never used by the planner.

use serde::{Deserialize, Serialize};

use crate::error::PlanError;

/// Lowest (most urgent) priority value.
pub const PRIORITY_MIN: u8 = 1;
/// Highest (least urgent) priority value.
pub const PRIORITY_MAX: u8 = 5;
/// Easiest complexity rating.
pub const COMPLEXITY_MIN: u8 = 1;
/// Hardest complexity rating.
pub const COMPLEXITY_MAX: u8 = 5;

/// A unit of study material with workload, deadline, priority and difficulty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: String,
    pub name: String,
    /// Days until the deadline, 0 when due today or overdue
    #[serde(alias = "daysLeft")]
    pub days_left: u32,
    #[serde(alias = "totalUnits")]
    pub total_units: u32,
    #[serde(default, alias = "completedUnits")]
    pub completed_units: u32,
    /// 1 = highest urgency weight, 5 = lowest
    #[serde(default = "default_rating")]
    pub priority: u8,
    /// 1 = easiest, 5 = hardest
    #[serde(default = "default_rating")]
    pub complexity: u8,
}

fn default_rating() -> u8 {
    3
}

impl Subject {
    /// Create a subject with no progress and medium priority/complexity.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        days_left: u32,
        total_units: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            days_left,
            total_units,
            completed_units: 0,
            priority: default_rating(),
            complexity: default_rating(),
        }
    }

    pub fn with_completed(mut self, completed_units: u32) -> Self {
        self.completed_units = completed_units;
        self
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_complexity(mut self, complexity: u8) -> Self {
        self.complexity = complexity;
        self
    }

    /// Units still to study.
    pub fn remaining_units(&self) -> u32 {
        self.total_units.saturating_sub(self.completed_units)
    }

    /// Remaining workload as a fraction of the total, in `[0, 1]`.
    pub fn remaining_fraction(&self) -> f64 {
        if self.total_units == 0 {
            return 0.0;
        }
        self.remaining_units() as f64 / self.total_units as f64
    }

    pub fn is_complete(&self) -> bool {
        self.remaining_units() == 0
    }

    /// Completion percentage rounded to one decimal place.
    pub fn progress_percent(&self) -> f64 {
        if self.total_units == 0 {
            return 0.0;
        }
        let completed = self.completed_units.min(self.total_units) as f64;
        round1(completed / self.total_units as f64 * 100.0)
    }

    /// Copy of this subject with progress set to `units`, clamped to the total.
    pub fn record_progress(&self, units: u32) -> Self {
        Self {
            completed_units: units.min(self.total_units),
            ..self.clone()
        }
    }

    /// Check the field constraints of the data model.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::InvalidSubject`] naming the first violated constraint.
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.id.trim().is_empty() {
            return Err(PlanError::subject(&self.name, "id must not be empty"));
        }
        if self.total_units == 0 {
            return Err(PlanError::subject(&self.id, "total_units must be greater than 0"));
        }
        if self.completed_units > self.total_units {
            return Err(PlanError::subject(
                &self.id,
                format!(
                    "completed_units ({}) exceeds total_units ({})",
                    self.completed_units, self.total_units
                ),
            ));
        }
        if !(PRIORITY_MIN..=PRIORITY_MAX).contains(&self.priority) {
            return Err(PlanError::subject(
                &self.id,
                format!(
                    "priority must be in {PRIORITY_MIN}..={PRIORITY_MAX}, got {}",
                    self.priority
                ),
            ));
        }
        if !(COMPLEXITY_MIN..=COMPLEXITY_MAX).contains(&self.complexity) {
            return Err(PlanError::subject(
                &self.id,
                format!(
                    "complexity must be in {COMPLEXITY_MIN}..={COMPLEXITY_MAX}, got {}",
                    self.complexity
                ),
            ));
        }
        Ok(())
    }
}

/// Mean completion percentage across subjects, 0.0 for an empty list.
pub fn overall_progress(subjects: &[Subject]) -> f64 {
    if subjects.is_empty() {
        return 0.0;
    }
    let sum: f64 = subjects.iter().map(Subject::progress_percent).sum();
    round1(sum / subjects.len() as f64)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
