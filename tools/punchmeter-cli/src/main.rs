//! PunchMeter CLI: measure how hard you punch.
//!
//! Usage:
//!   punchmeter punch [OPTIONS]      Run one sampling session
//!   punchmeter classify <PEAK>      Classify a peak without sampling
//!   punchmeter check                Check for a usable motion sensor

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use punchmeter_common::config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "punchmeter",
    about = "Measure the peak of a punch with your device's accelerometer",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Where samples come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// Detect the device accelerometer
    Auto,
    /// Generated punch, no hardware needed
    Synthetic,
    /// Replay a recorded JSONL trace (requires --trace)
    Replay,
    /// Pretend no sensor exists
    Unavailable,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one sampling session and print the result
    Punch {
        /// Motion source
        #[arg(long, value_enum, default_value = "auto")]
        source: SourceKind,

        /// Trace file for --source replay
        #[arg(long)]
        trace: Option<PathBuf>,

        /// Session length in milliseconds
        #[arg(long)]
        duration_ms: Option<u64>,

        /// Reference speed treated as 100%
        #[arg(long)]
        reference: Option<f64>,

        /// Debounce threshold for sensor noise
        #[arg(long)]
        epsilon: Option<f64>,

        /// Requested sensor interval in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Print notifications as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Classify a peak magnitude without running a session
    Classify {
        /// Peak magnitude in m/s²
        peak: f64,

        /// Reference speed treated as 100%
        #[arg(long)]
        reference: Option<f64>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check which motion source would be used
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::load();

    // Initialize logging
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    punchmeter_common::logging::init_logging(&config.logging);

    match cli.command {
        Commands::Punch {
            source,
            trace,
            duration_ms,
            reference,
            epsilon,
            interval_ms,
            json,
        } => {
            commands::punch::run(
                &config,
                commands::punch::PunchArgs {
                    source,
                    trace,
                    duration_ms,
                    reference,
                    epsilon,
                    interval_ms,
                    json,
                },
            )
            .await
        }
        Commands::Classify {
            peak,
            reference,
            json,
        } => commands::classify::run(&config, peak, reference, json),
        Commands::Check => commands::check::run(&config),
    }
}
