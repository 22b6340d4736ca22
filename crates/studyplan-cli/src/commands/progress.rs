use std::path::PathBuf;

use clap::Args;
use serde_json::json;
use studyplan_core::{overall_progress, Subject};

use super::load_subjects;

#[derive(Args)]
pub struct ProgressArgs {
    /// JSON file with an array of subjects
    #[arg(long)]
    subjects: PathBuf,
    /// Record completed units and save the subjects file (repeatable)
    #[arg(long = "set", value_name = "ID=UNITS")]
    updates: Vec<String>,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: ProgressArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut subjects = load_subjects(&args.subjects)?;
    if !args.updates.is_empty() {
        for update in &args.updates {
            apply_update(&mut subjects, update)?;
        }
        std::fs::write(&args.subjects, serde_json::to_string_pretty(&subjects)?)?;
        tracing::info!(updates = args.updates.len(), "progress recorded");
    }
    let overall = overall_progress(&subjects);

    if args.json {
        let rows: Vec<_> = subjects
            .iter()
            .map(|s| {
                json!({
                    "id": s.id,
                    "name": s.name,
                    "completed_units": s.completed_units,
                    "total_units": s.total_units,
                    "progress_percent": s.progress_percent(),
                })
            })
            .collect();
        let report = json!({ "subjects": rows, "overall_progress": overall });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for subject in &subjects {
        println!(
            "{:<24} {:>4}/{:<4} {:>5.1}%",
            subject.name,
            subject.completed_units,
            subject.total_units,
            subject.progress_percent()
        );
    }
    println!("Overall: {overall:.1}%");
    Ok(())
}

/// Apply one `ID=UNITS` update. Units beyond the subject's total are clamped.
fn apply_update(subjects: &mut [Subject], update: &str) -> Result<(), Box<dyn std::error::Error>> {
    let (id, units) = update
        .split_once('=')
        .ok_or_else(|| format!("expected ID=UNITS, got '{update}'"))?;
    let units: u32 = units
        .trim()
        .parse()
        .map_err(|e| format!("invalid units in '{update}': {e}"))?;
    let subject = subjects
        .iter_mut()
        .find(|s| s.id == id.trim())
        .ok_or_else(|| format!("unknown subject: {id}"))?;
    *subject = subject.record_progress(units);
    Ok(())
}
