use std::path::{Path, PathBuf};

use clap::Args;
use serde::Serialize;
use studyplan_core::{score_all, DailyAllocator, Subject};

use super::{load_config, load_subjects};

#[derive(Args)]
pub struct AllocateArgs {
    /// JSON file with an array of subjects
    #[arg(long)]
    subjects: PathBuf,
    /// Day index to allocate for (0 = today)
    #[arg(long, default_value_t = 0)]
    day: u32,
    /// Study minutes for the day (overrides config)
    #[arg(long)]
    budget: Option<u32>,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct AllocationRow<'a> {
    subject_id: &'a str,
    subject_name: &'a str,
    score: f64,
    duration_minutes: u32,
}

pub fn run(args: AllocateArgs, config: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config)?;
    config.scoring.validate()?;
    let subjects = load_subjects(&args.subjects)?;
    subjects.iter().try_for_each(Subject::validate)?;

    let budget = match args.budget {
        Some(minutes) => minutes,
        None => u32::try_from(config.planner.daily_budget_minutes)
            .map_err(|_| "planner.daily_budget_minutes must be a positive number of minutes")?,
    };

    let scored = score_all(&subjects, args.day, &config.scoring);
    let allocations = DailyAllocator::with_config(config.allocator).allocate(&scored, budget)?;
    let rows: Vec<AllocationRow<'_>> = allocations
        .iter()
        .map(|a| AllocationRow {
            subject_id: &a.subject.id,
            subject_name: &a.subject.name,
            score: a.score,
            duration_minutes: a.duration_minutes,
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    for row in &rows {
        println!(
            "{:<24} {:>4} min  (score {:.3})",
            row.subject_name, row.duration_minutes, row.score
        );
    }
    let used: u32 = rows.iter().map(|r| r.duration_minutes).sum();
    println!("{used} of {budget} minutes allocated");
    Ok(())
}
