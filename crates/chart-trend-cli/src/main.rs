//! chart-trend CLI - grade chart images against a reference by color trend

use std::path::PathBuf;

use chart_trend::DEFAULT_PASS_THRESHOLD;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

mod commands;

/// Chart trend extraction and similarity grading tool.
#[derive(Parser)]
#[command(name = "chart-trend")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade every case of a dataset and write reports
    Run {
        /// Dataset root, one sub-directory per case
        #[arg(short, long, default_value = "./dataset")]
        dataset: PathBuf,

        /// Directory that receives the timestamped run directory
        #[arg(short, long, default_value = "outputs")]
        output: PathBuf,

        /// Score a candidate must exceed to pass
        #[arg(short, long, default_value_t = DEFAULT_PASS_THRESHOLD)]
        threshold: f64,

        /// Configuration JSON file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Skip writing SVG charts
        #[arg(long)]
        no_charts: bool,
    },

    /// List the cases found in a dataset
    Scan {
        /// Dataset root
        path: PathBuf,
    },

    /// Print the trend signal of one image as JSON
    Extract {
        /// Image file
        image: PathBuf,

        /// Print the raw signal, before smoothing and standardization
        #[arg(long)]
        raw: bool,

        /// Configuration JSON file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Score one candidate image against a reference image
    Compare {
        /// Reference image
        reference: PathBuf,

        /// Candidate image
        candidate: PathBuf,

        /// Score a candidate must exceed to pass
        #[arg(short, long, default_value_t = DEFAULT_PASS_THRESHOLD)]
        threshold: f64,

        /// Configuration JSON file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print or save the default configuration
    Config {
        /// Output file (prints to stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run { dataset, output, threshold, config, no_charts } => {
            commands::run::run(&dataset, &output, threshold, config.as_deref(), !no_charts)
        }
        Commands::Scan { path } => commands::scan::run(&path, cli.verbose),
        Commands::Extract { image, raw, config } => {
            commands::extract::run(&image, raw, config.as_deref())
        }
        Commands::Compare { reference, candidate, threshold, config } => {
            commands::compare::run(&reference, &candidate, threshold, config.as_deref())
        }
        Commands::Config { output } => commands::config::run(output.as_deref()),
    }
}
