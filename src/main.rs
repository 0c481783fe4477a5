use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, error, info};

use u_roster::config::PlannerConfig;
use u_roster::planner::Planner;
use u_roster::report;
use u_roster::roster::{ManualRoster, RosterSource, SampleRoster};
use u_roster::{logging, Result, RosterError};

/// Plan a shift roster over a multi-week horizon
#[derive(Parser)]
#[command(name = "u-roster", version)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file (TOML)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Write one CSV file per sheet into this directory
    #[arg(short, long, global = true)]
    out: Option<PathBuf>,

    /// Also write the full plan as JSON
    #[arg(long, global = true)]
    json: Option<PathBuf>,

    /// Seed for randomized choices
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan a randomly generated sample roster
    Sample,
    /// Plan a roster read from a file of [[employee]] entries
    Run {
        /// Roster file (TOML)
        #[arg(short, long)]
        roster: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            // Logs may be filtered out; the reason must still reach the user.
            eprintln!("{}", failure_message(&e));
            ExitCode::FAILURE
        }
    }
}

fn failure_message(e: &RosterError) -> String {
    format!("error: {e}")
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => PlannerConfig::load(path)?,
        None => PlannerConfig::default(),
    };
    debug!(?config, "configuration");

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let roster = match &cli.command {
        Commands::Sample => {
            info!(employees = config.sample.employees.len(), "using sample roster");
            SampleRoster::from_config(&config).produce(&config, &mut rng)
        }
        Commands::Run { roster } => {
            info!(path = %roster.display(), "reading roster");
            ManualRoster::load(roster)?.produce(&config, &mut rng)
        }
    };

    let plan = Planner::with_default_solver(config)?.plan(&roster)?;

    println!("{}", report::render_text(&plan));
    if let Some(dir) = &cli.out {
        report::write_csv_dir(&plan, dir)?;
    }
    if let Some(path) = &cli.json {
        report::write_json(&plan, path)?;
    }
    Ok(())
}
