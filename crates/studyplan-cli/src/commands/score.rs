use std::path::{Path, PathBuf};

use clap::Args;
use studyplan_core::scoring::rank_order;
use studyplan_core::{explain, ScoredSubject, Subject};

use super::{load_config, load_subjects};

#[derive(Args)]
pub struct ScoreArgs {
    /// JSON file with an array of subjects
    #[arg(long)]
    subjects: PathBuf,
    /// Day index to score for (0 = today)
    #[arg(long, default_value_t = 0)]
    day: u32,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: ScoreArgs, config: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config)?;
    config.scoring.validate()?;
    let subjects = load_subjects(&args.subjects)?;
    subjects.iter().try_for_each(Subject::validate)?;

    let mut ranked: Vec<_> = subjects
        .iter()
        .map(|s| ScoredSubject::new(s, args.day, &config.scoring))
        .collect();
    ranked.sort_by(rank_order);
    let breakdowns: Vec<_> = ranked
        .iter()
        .map(|r| explain(r.subject, args.day, &config.scoring))
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&breakdowns)?);
        return Ok(());
    }

    println!("{:<16} {:>8} {:>6}  {}", "SUBJECT", "SCORE", "DAYS", "DRIVER");
    for breakdown in &breakdowns {
        let driver = breakdown
            .dominant_factor()
            .map(|f| format!("{} x{:.2}", f.name, f.multiplier))
            .unwrap_or_default();
        println!(
            "{:<16} {:>8.3} {:>6}  {}",
            breakdown.subject_id, breakdown.total, breakdown.effective_days_left, driver
        );
    }
    Ok(())
}
