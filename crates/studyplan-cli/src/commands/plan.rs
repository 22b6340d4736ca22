use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::Args;
use studyplan_core::planner::minutes_by_subject;
use studyplan_core::{HorizonPlanner, SessionBlock};

use super::{load_config, load_subjects};

#[derive(Args)]
pub struct PlanArgs {
    /// JSON file with an array of subjects
    #[arg(long)]
    subjects: PathBuf,
    /// First day of the plan (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    start: Option<NaiveDate>,
    /// Study minutes per day (overrides config)
    #[arg(long, allow_negative_numbers = true)]
    budget: Option<i64>,
    /// Break between sessions in minutes (overrides config)
    #[arg(long, allow_negative_numbers = true)]
    break_minutes: Option<i64>,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: PlanArgs, config: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config)?;
    let subjects = load_subjects(&args.subjects)?;
    let start = args
        .start
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let budget = args.budget.unwrap_or(config.planner.daily_budget_minutes);
    let break_minutes = args.break_minutes.unwrap_or(config.planner.break_minutes);

    let planner = HorizonPlanner::with_config(config.planner_config()?);
    let sessions = planner.plan(&subjects, budget, start, break_minutes)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&sessions)?);
        return Ok(());
    }

    if sessions.is_empty() {
        println!("Nothing to plan: every subject is complete.");
        return Ok(());
    }
    print_timetable(&sessions);
    Ok(())
}

fn print_timetable(sessions: &[SessionBlock]) {
    let mut current_date = None;
    for session in sessions {
        if current_date != Some(session.date) {
            if current_date.is_some() {
                println!();
            }
            println!("{} (day {})", session.date.format("%a %Y-%m-%d"), session.day_index + 1);
            current_date = Some(session.date);
        }
        println!(
            "  {}-{}  {:<24} {:>4} min",
            session.start.format("%H:%M"),
            session.end.format("%H:%M"),
            session.subject_name,
            session.duration_minutes
        );
    }

    println!();
    println!("Totals:");
    for (id, minutes) in minutes_by_subject(sessions) {
        println!("  {id:<24} {:>5.1} h", minutes as f64 / 60.0);
    }
}
