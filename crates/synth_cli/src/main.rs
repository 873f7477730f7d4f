//! Synthetic market data generator
//!
//! # Commands
//!
//! - `synth generate` - Simulate a scenario and write the JSON report
//! - `synth check` - Validate a scenario and print a summary
//!
//! Settings are layered as file, then `SYNTH_*` environment variables, then
//! command-line flags.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use synth_cli::config::{build_config, CliArgs as ConfigCliArgs};
use synth_cli::report::ReportOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

/// Correlated factor and Heston path generator
#[derive(Parser, Debug)]
#[command(name = "synth")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file path (TOML format)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Master seed
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Number of simulated assets
    #[arg(long, global = true)]
    num_assets: Option<usize>,

    /// Number of trading days
    #[arg(long, global = true)]
    trading_days: Option<u32>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Update assets in parallel within each step
    #[arg(long, global = true)]
    parallel: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Simulate a scenario and write the JSON report
    Generate {
        /// Output file; stdout when omitted
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Keep every k-th row of the report
        #[arg(long, default_value_t = 1)]
        sample_every: usize,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Validate a scenario and print a summary
    Check,
}

impl From<&Cli> for ConfigCliArgs {
    fn from(cli: &Cli) -> Self {
        ConfigCliArgs {
            config_file: cli.config.clone(),
            seed: cli.seed,
            num_assets: cli.num_assets,
            trading_days: cli.trading_days,
            log_level: cli.log_level.clone(),
            parallel: cli.parallel,
        }
    }
}

fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = build_config(&ConfigCliArgs::from(&cli))?;

    init_tracing(config.log_level.as_filter_str());

    tracing::info!("synth v{}", synth_cli::VERSION);
    tracing::debug!(
        seed = config.seed,
        num_assets = config.num_assets,
        trading_days = config.calendar.trading_days,
        log_level = %config.log_level,
        "Scenario configuration loaded"
    );

    match cli.command {
        Commands::Generate {
            output,
            sample_every,
            pretty,
        } => {
            let options = ReportOptions {
                sample_every,
                pretty,
            };
            commands::generate::run(&config, &options, output.as_deref())?;
        }
        Commands::Check => commands::check::run(&config)?,
    }

    Ok(())
}
