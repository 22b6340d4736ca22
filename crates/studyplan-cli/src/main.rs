use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "studyplan", version, about = "Study timetable planner")]
struct Cli {
    /// Path to the TOML config (defaults to ~/.config/studyplan/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log planning decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a timetable until the furthest deadline
    Plan(commands::plan::PlanArgs),
    /// Explain subject scores for a day
    Score(commands::score::ScoreArgs),
    /// Allocate a single day's study time
    Allocate(commands::allocate::AllocateArgs),
    /// Show per-subject and overall progress
    Progress(commands::progress::ProgressArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    let cli = Cli::parse();

    let fallback = if cli.verbose {
        "studyplan=debug,studyplan_core=debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Plan(args) => commands::plan::run(args, config),
        Commands::Score(args) => commands::score::run(args, config),
        Commands::Allocate(args) => commands::allocate::run(args, config),
        Commands::Progress(args) => commands::progress::run(args),
        Commands::Config { action } => commands::config::run(action, config),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
