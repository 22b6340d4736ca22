//! Daily time allocation.
//!
//! Splits one day's study budget between scored subjects. Time is cut into
//! fixed granularity blocks and each subject picks either zero blocks or a
//! count between its minimum session length and its daily demand. Picking
//! one option per subject to maximise `Σ score × blocks` within the budget
//! is a bounded multiple-choice knapsack, solved exactly by dynamic
//! programming over `(subject, blocks used)`.
//!
//! Overdue subjects are mandatory: while their minimum sessions fit in the
//! day they cannot be left out, even when the optimiser would prefer it.

use serde::{Deserialize, Serialize};

use crate::error::PlanError;
use crate::scoring::{rank_order, ScoredSubject};
use crate::subject::Subject;

/// Values closer than this are treated as equal so ties fall to rank order.
const VALUE_EPSILON: f64 = 1e-9;

/// Allocator configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocatorConfig {
    /// Smallest indivisible unit of study time (minutes)
    #[serde(default = "default_granularity")]
    pub granularity_minutes: u32,
    /// Shortest useful session (minutes)
    #[serde(default = "default_min_session")]
    pub min_session_minutes: u32,
    /// Longest session one subject may get in a day (minutes)
    #[serde(default = "default_max_session")]
    pub max_session_minutes: u32,
    /// Study time implied by one workload unit (minutes)
    #[serde(default = "default_minutes_per_unit")]
    pub minutes_per_unit: u32,
}

fn default_granularity() -> u32 {
    5
}
fn default_min_session() -> u32 {
    25
}
fn default_max_session() -> u32 {
    300
}
fn default_minutes_per_unit() -> u32 {
    30
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            granularity_minutes: default_granularity(),
            min_session_minutes: default_min_session(),
            max_session_minutes: default_max_session(),
            minutes_per_unit: default_minutes_per_unit(),
        }
    }
}

impl AllocatorConfig {
    /// # Errors
    ///
    /// Returns [`PlanError::InvalidConfiguration`] for a zero granularity or
    /// unit length, a minimum above the maximum, or a maximum shorter than
    /// one block.
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.granularity_minutes == 0 {
            return Err(PlanError::config(
                "allocator.granularity_minutes",
                "must be greater than 0",
            ));
        }
        if self.minutes_per_unit == 0 {
            return Err(PlanError::config("allocator.minutes_per_unit", "must be greater than 0"));
        }
        if self.min_session_minutes > self.max_session_minutes {
            return Err(PlanError::config(
                "allocator.min_session_minutes",
                format!(
                    "minimum session ({}) exceeds maximum session ({})",
                    self.min_session_minutes, self.max_session_minutes
                ),
            ));
        }
        if self.max_session_minutes < self.granularity_minutes {
            return Err(PlanError::config(
                "allocator.max_session_minutes",
                format!(
                    "maximum session ({}) is shorter than one block ({})",
                    self.max_session_minutes, self.granularity_minutes
                ),
            ));
        }
        Ok(())
    }

    fn blocks_for(&self, minutes: u32) -> usize {
        minutes.div_ceil(self.granularity_minutes) as usize
    }
}

/// Time granted to one subject for one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Allocation<'a> {
    pub subject: &'a Subject,
    pub score: f64,
    /// Granularity blocks chosen by the optimiser
    pub blocks: u32,
    pub duration_minutes: u32,
}

/// One subject's option range in the knapsack.
struct Item<'s, 'a> {
    scored: &'s ScoredSubject<'a>,
    /// Minutes the subject can use today (need capped by the max session)
    demand: u32,
    lo: usize,
    hi: usize,
    mandatory: bool,
}

/// Knapsack allocator for a single day.
#[derive(Debug, Clone, Default)]
pub struct DailyAllocator {
    config: AllocatorConfig,
}

impl DailyAllocator {
    /// Create an allocator with the default config
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom config
    pub fn with_config(config: AllocatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AllocatorConfig {
        &self.config
    }

    /// Allocate `budget_minutes` between `scored` subjects.
    ///
    /// The result is ordered by descending score (ties: fewer days left,
    /// then id), never by the optimiser's internal order. Subjects with no
    /// remaining workload are skipped; if none remain the result is empty.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::InvalidConfiguration`] if the allocator config is invalid.
    pub fn allocate<'a>(
        &self,
        scored: &[ScoredSubject<'a>],
        budget_minutes: u32,
    ) -> Result<Vec<Allocation<'a>>, PlanError> {
        self.config.validate()?;

        let mut ranked: Vec<&ScoredSubject<'a>> = scored
            .iter()
            .filter(|s| s.score > 0.0 && s.need_minutes(self.config.minutes_per_unit) > 0)
            .collect();
        ranked.sort_by(|a, b| rank_order(a, b));

        if ranked.is_empty() || budget_minutes == 0 {
            return Ok(Vec::new());
        }

        let items = self.build_items(&ranked);
        let total_demand: u64 = items.iter().map(|item| item.demand as u64).sum();

        // Everything fits: each subject gets exactly what it needs today.
        if total_demand <= budget_minutes as u64 {
            tracing::debug!(
                subjects = items.len(),
                total_demand,
                budget_minutes,
                "daily demand fits in budget"
            );
            return Ok(items
                .iter()
                .map(|item| Allocation {
                    subject: item.scored.subject,
                    score: item.scored.score,
                    blocks: item.hi as u32,
                    duration_minutes: item.demand,
                })
                .collect());
        }

        let capacity = (budget_minutes / self.config.granularity_minutes) as usize;
        let mandatory_blocks: usize = items.iter().filter(|i| i.mandatory).map(|i| i.lo).sum();
        let enforce = mandatory_blocks <= capacity;
        if !enforce {
            tracing::warn!(
                mandatory_blocks,
                capacity,
                "minimum sessions for overdue subjects exceed the day; allocating without them"
            );
        }

        let choices = match solve(&items, capacity, enforce) {
            Some(choices) => choices,
            None => solve(&items, capacity, false).unwrap_or_else(|| vec![0; items.len()]),
        };

        Ok(items
            .iter()
            .zip(choices)
            .filter(|(_, blocks)| *blocks > 0)
            .map(|(item, blocks)| {
                let granted = blocks as u32 * self.config.granularity_minutes;
                Allocation {
                    subject: item.scored.subject,
                    score: item.scored.score,
                    blocks: blocks as u32,
                    duration_minutes: granted.min(item.demand),
                }
            })
            .collect())
    }

    fn build_items<'s, 'a>(&self, ranked: &[&'s ScoredSubject<'a>]) -> Vec<Item<'s, 'a>> {
        let min_blocks = self.config.blocks_for(self.config.min_session_minutes).max(1);
        ranked
            .iter()
            .map(|&scored| {
                let need = scored.need_minutes(self.config.minutes_per_unit);
                let demand = need.min(self.config.max_session_minutes);
                let hi = self.config.blocks_for(demand);
                Item {
                    scored,
                    demand,
                    lo: min_blocks.min(hi),
                    hi,
                    mandatory: scored.is_overdue(),
                }
            })
            .collect()
    }
}

/// Solve the multiple-choice knapsack and return blocks per item, in item order.
///
/// Items are folded in from lowest rank to highest, larger block counts are
/// tried first, and only strictly better values replace the incumbent. On
/// equal value the higher-ranked subject therefore keeps the larger share.
/// Returns `None` when the mandatory items cannot all be placed.
fn solve(items: &[Item<'_, '_>], capacity: usize, enforce_mandatory: bool) -> Option<Vec<usize>> {
    // dp[c]: best value using at most c blocks over the items folded so far
    let mut dp = vec![0.0_f64; capacity + 1];
    let mut picks: Vec<Vec<usize>> = Vec::with_capacity(items.len());

    for item in items.iter().rev() {
        let mut next = vec![f64::NEG_INFINITY; capacity + 1];
        let mut pick = vec![0usize; capacity + 1];
        let allow_skip = !(enforce_mandatory && item.mandatory);

        for c in 0..=capacity {
            let mut best = f64::NEG_INFINITY;
            let mut best_k = 0;

            for k in (item.lo..=item.hi.min(c)).rev() {
                let base = dp[c - k];
                if base == f64::NEG_INFINITY {
                    continue;
                }
                let value = base + item.scored.score * k as f64;
                if value > best + VALUE_EPSILON {
                    best = value;
                    best_k = k;
                }
            }

            if allow_skip && dp[c] > best + VALUE_EPSILON {
                best = dp[c];
                best_k = 0;
            }

            next[c] = best;
            pick[c] = best_k;
        }

        dp = next;
        picks.push(pick);
    }

    if dp[capacity] == f64::NEG_INFINITY {
        return None;
    }

    // picks is in reverse item order; walk it back from the top-ranked item.
    let mut remaining = capacity;
    let mut choices = Vec::with_capacity(items.len());
    for pick in picks.iter().rev() {
        let k = pick[remaining];
        choices.push(k);
        remaining -= k;
    }
    Some(choices)
}

/// Allocate with the default [`AllocatorConfig`].
///
/// # Errors
///
/// Never fails with the default config; the `Result` mirrors [`DailyAllocator::allocate`].
pub fn allocate<'a>(
    scored: &[ScoredSubject<'a>],
    budget_minutes: u32,
) -> Result<Vec<Allocation<'a>>, PlanError> {
    DailyAllocator::new().allocate(scored, budget_minutes)
}
