//! # studyplan Core Library
//!
//! This library provides the planning engine behind the studyplan CLI: given
//! a set of subjects with remaining workload, deadlines, priority and
//! difficulty, and a fixed amount of study time per day, it decides which
//! subjects to study, for how long, and in what order, for every day until
//! the furthest deadline.
//!
//! ## Architecture
//!
//! - **Scorer**: composite per-day priority score of a subject
//! - **Daily Allocator**: bounded knapsack over discretized study time
//! - **Horizon Planner**: repeats the allocator day by day and produces
//!   timestamped session blocks
//! - **Storage**: TOML-based configuration of planning defaults
//!
//! The engine is pure: it reads no clock, touches no storage, and never
//! modifies the subjects it is given. Callers own persistence.
//!
//! ## Key Components
//!
//! - [`score`]: Subject score for a given day
//! - [`DailyAllocator`]: One day's allocation
//! - [`HorizonPlanner`]: Full plan across the horizon
//! - [`Config`]: Application configuration management

pub mod allocator;
pub mod error;
pub mod planner;
pub mod scoring;
pub mod storage;
pub mod subject;

pub use allocator::{allocate, Allocation, AllocatorConfig, DailyAllocator};
pub use error::{ConfigError, PlanError};
pub use planner::{plan, HorizonPlanner, PlannerConfig, ProgressModel, SessionBlock};
pub use scoring::{explain, score, score_all, ScoreBreakdown, ScoredSubject, ScoringWeights};
pub use storage::Config;
pub use subject::{overall_progress, Subject};
