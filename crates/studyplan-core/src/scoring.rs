//! Subject scoring.
//!
//! A subject's score for a given day is the product of its remaining
//! workload fraction and three weighted multipliers:
//!
//! ```text
//! score = remaining × (1 + w_u·urgency) × (1 + w_p·priority) × (1 + w_c·complexity)
//! ```
//!
//! | Factor     | Raw value                        | Range       |
//! |------------|----------------------------------|-------------|
//! | urgency    | `1 / (1 + effective_days_left)`  | (0, 1]      |
//! | priority   | `(6 - priority) / 5`             | [0.2, 1]    |
//! | complexity | `complexity / 5`                 | [0.2, 1]    |
//!
//! `effective_days_left` is `days_left - day_index`, saturating at 0, so
//! urgency rises as the planner walks toward each deadline and an overdue
//! subject is maximally urgent. Every multiplier is at least 1, which makes
//! the score zero exactly when the remaining workload is zero.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::PlanError;
use crate::subject::Subject;

/// Weights applied to each score factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    #[serde(default = "default_urgency_weight")]
    pub urgency: f64,
    #[serde(default = "default_priority_weight")]
    pub priority: f64,
    #[serde(default = "default_complexity_weight")]
    pub complexity: f64,
}

fn default_urgency_weight() -> f64 {
    4.0
}
fn default_priority_weight() -> f64 {
    1.0
}
fn default_complexity_weight() -> f64 {
    1.0
}

impl ScoringWeights {
    /// Default weights: urgency dominates, priority and complexity even.
    pub fn balanced() -> Self {
        Self {
            urgency: default_urgency_weight(),
            priority: default_priority_weight(),
            complexity: default_complexity_weight(),
        }
    }

    /// Push nearly everything toward the nearest deadline.
    pub fn deadline_focused() -> Self {
        Self {
            urgency: 10.0,
            priority: 1.0,
            complexity: 0.5,
        }
    }

    /// Favour hard material over closeness of the deadline.
    pub fn difficulty_focused() -> Self {
        Self {
            urgency: 2.0,
            priority: 1.0,
            complexity: 4.0,
        }
    }

    /// Reject negative or non-finite weights.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::InvalidConfiguration`] naming the bad weight.
    pub fn validate(&self) -> Result<(), PlanError> {
        let weights = [
            ("scoring.urgency", self.urgency),
            ("scoring.priority", self.priority),
            ("scoring.complexity", self.complexity),
        ];

        for (name, weight) in weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(PlanError::config(
                    name,
                    format!("weight must be a finite, non-negative number, got {weight}"),
                ));
            }
        }
        Ok(())
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self::balanced()
    }
}

/// Days left once the planner has advanced `day_index` days.
pub fn effective_days_left(subject: &Subject, day_index: u32) -> u32 {
    subject.days_left.saturating_sub(day_index)
}

fn urgency_factor(effective_days_left: u32) -> f64 {
    1.0 / (1.0 + effective_days_left as f64)
}

fn priority_factor(priority: u8) -> f64 {
    let clamped = priority.clamp(1, 5);
    (6 - clamped) as f64 / 5.0
}

fn complexity_factor(complexity: u8) -> f64 {
    complexity.clamp(1, 5) as f64 / 5.0
}

fn compose(remaining: f64, subject: &Subject, day_index: u32, weights: &ScoringWeights) -> f64 {
    if remaining <= 0.0 {
        return 0.0;
    }
    let urgency = urgency_factor(effective_days_left(subject, day_index));
    remaining
        * (1.0 + weights.urgency * urgency)
        * (1.0 + weights.priority * priority_factor(subject.priority))
        * (1.0 + weights.complexity * complexity_factor(subject.complexity))
}

/// Composite priority score of `subject` on day `day_index`.
///
/// Pure and deterministic; zero iff the subject has no remaining workload.
pub fn score(subject: &Subject, day_index: u32, weights: &ScoringWeights) -> f64 {
    compose(subject.remaining_fraction(), subject, day_index, weights)
}

/// One factor of a [`ScoreBreakdown`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreFactor {
    pub name: String,
    /// Raw factor value before weighting
    pub raw: f64,
    /// Weight applied to the raw value (1.0 for the remaining fraction)
    pub weight: f64,
    /// What the factor multiplies the score by
    pub multiplier: f64,
}

impl ScoreFactor {
    fn weighted(name: &str, raw: f64, weight: f64) -> Self {
        Self {
            name: name.to_string(),
            raw,
            weight,
            multiplier: 1.0 + weight * raw,
        }
    }
}

/// Factor-by-factor explanation of a score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub subject_id: String,
    pub day_index: u32,
    pub effective_days_left: u32,
    pub factors: Vec<ScoreFactor>,
    pub total: f64,
}

impl ScoreBreakdown {
    /// Weighted factor with the largest multiplier.
    pub fn dominant_factor(&self) -> Option<&ScoreFactor> {
        self.factors
            .iter()
            .filter(|f| f.name != "remaining")
            .max_by(|a, b| a.multiplier.total_cmp(&b.multiplier))
    }
}

/// Explain how [`score`] arrives at its value.
pub fn explain(subject: &Subject, day_index: u32, weights: &ScoringWeights) -> ScoreBreakdown {
    let days = effective_days_left(subject, day_index);
    let remaining = subject.remaining_fraction();
    let factors = vec![
        ScoreFactor {
            name: "remaining".to_string(),
            raw: remaining,
            weight: 1.0,
            multiplier: remaining,
        },
        ScoreFactor::weighted("urgency", urgency_factor(days), weights.urgency),
        ScoreFactor::weighted("priority", priority_factor(subject.priority), weights.priority),
        ScoreFactor::weighted(
            "complexity",
            complexity_factor(subject.complexity),
            weights.complexity,
        ),
    ];

    ScoreBreakdown {
        subject_id: subject.id.clone(),
        day_index,
        effective_days_left: days,
        factors,
        total: score(subject, day_index, weights),
    }
}

/// A subject paired with its score for one day. Rebuilt every day, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredSubject<'a> {
    pub subject: &'a Subject,
    pub score: f64,
    pub effective_days_left: u32,
    remaining_minutes: Option<u32>,
}

impl<'a> ScoredSubject<'a> {
    /// Score a subject from its own recorded progress.
    pub fn new(subject: &'a Subject, day_index: u32, weights: &ScoringWeights) -> Self {
        Self {
            subject,
            score: score(subject, day_index, weights),
            effective_days_left: effective_days_left(subject, day_index),
            remaining_minutes: None,
        }
    }

    /// Score a subject whose remaining workload has been provisionally
    /// reduced to `remaining_minutes` by earlier days of a plan.
    pub fn provisional(
        subject: &'a Subject,
        day_index: u32,
        remaining_minutes: u32,
        minutes_per_unit: u32,
        weights: &ScoringWeights,
    ) -> Self {
        let total_minutes = subject.total_units as f64 * minutes_per_unit.max(1) as f64;
        let remaining = if total_minutes > 0.0 {
            (remaining_minutes as f64 / total_minutes).min(1.0)
        } else {
            0.0
        };
        Self {
            subject,
            score: compose(remaining, subject, day_index, weights),
            effective_days_left: effective_days_left(subject, day_index),
            remaining_minutes: Some(remaining_minutes),
        }
    }

    /// Minutes of study still needed to finish the subject.
    pub fn need_minutes(&self, minutes_per_unit: u32) -> u32 {
        self.remaining_minutes
            .unwrap_or_else(|| self.subject.remaining_units().saturating_mul(minutes_per_unit))
    }

    pub fn is_overdue(&self) -> bool {
        self.effective_days_left == 0
    }
}

/// Presentation and tie-break order: score descending, then days left
/// ascending, then id ascending.
pub fn rank_order(a: &ScoredSubject<'_>, b: &ScoredSubject<'_>) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.subject.days_left.cmp(&b.subject.days_left))
        .then_with(|| a.subject.id.cmp(&b.subject.id))
}

/// Score every subject with remaining workload on `day_index`, in rank order.
///
/// Completed subjects are excluded outright rather than carried with a zero score.
pub fn score_all<'a>(
    subjects: &'a [Subject],
    day_index: u32,
    weights: &ScoringWeights,
) -> Vec<ScoredSubject<'a>> {
    let mut scored: Vec<_> = subjects
        .iter()
        .filter(|s| !s.is_complete())
        .map(|s| ScoredSubject::new(s, day_index, weights))
        .collect();
    scored.sort_by(rank_order);
    scored
}
