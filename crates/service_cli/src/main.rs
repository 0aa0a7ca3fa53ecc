//! heston-mcs - Heston Monte Carlo pricing from the command line
//!
//! # Commands
//!
//! - `heston-mcs price` - Price the configured European call and compare it
//!   with the semi-analytical benchmark
//! - `heston-mcs compare` - Sweep discretisation schemes and variance
//!   reduction flags over several seeds
//! - `heston-mcs benchmark` - Print the semi-analytical benchmark only
//!
//! Settings come from `heston-mcs.toml` (or `--config <file>`), overridden by
//! command-line flags.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use pricer_heston::mc::{AssetScheme, VarianceScheme};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod error;

pub use error::{CliError, Result};

use config::{RunConfig, SimulationOverrides};

/// Heston Monte Carlo pricer CLI
#[derive(Parser)]
#[command(name = "heston-mcs")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Output format of the pricing commands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Args, Debug)]
struct SimulationArgs {
    /// Number of Monte Carlo paths
    #[arg(short = 'n', long)]
    paths: Option<usize>,

    /// Number of time steps
    #[arg(short = 'm', long)]
    steps: Option<usize>,

    /// Random seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Variance scheme (full_truncation, partial_truncation, truncation,
    /// reflection, higham_mao, simple_reflection, absorption)
    #[arg(long)]
    variance_scheme: Option<VarianceScheme>,

    /// Asset scheme (log, naive)
    #[arg(long)]
    asset_scheme: Option<AssetScheme>,

    /// Antithetic pairing (true/false)
    #[arg(long)]
    antithetic: Option<bool>,

    /// Moment matching and drift-bias correction (true/false)
    #[arg(long)]
    moment_matching: Option<bool>,
}

impl SimulationArgs {
    fn overrides(&self) -> SimulationOverrides {
        SimulationOverrides {
            paths: self.paths,
            steps: self.steps,
            seed: self.seed,
            variance_scheme: self.variance_scheme,
            asset_scheme: self.asset_scheme,
            antithetic: self.antithetic,
            moment_matching: self.moment_matching,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Price the European call by Monte Carlo
    Price {
        #[command(flatten)]
        simulation: SimulationArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Compare discretisation schemes and variance reduction
    Compare {
        #[command(flatten)]
        simulation: SimulationArgs,

        /// Seeded runs per combination
        #[arg(short, long)]
        runs: Option<usize>,

        /// Absolute error tolerance
        #[arg(long)]
        abs_tol: Option<f64>,

        /// Relative error tolerance
        #[arg(long)]
        rel_tol: Option<f64>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Print the semi-analytical benchmark price
    Benchmark {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
}

fn init_tracing(filter: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut run_config = RunConfig::load(cli.config.as_deref())?;
    let level = if cli.verbose {
        "debug"
    } else {
        run_config.log_level.as_filter_str()
    };
    init_tracing(level);
    if cli.verbose {
        debug!("Verbose mode enabled");
    }

    let output = match cli.command {
        Commands::Price { simulation, format } => {
            run_config.merge_with_cli(&simulation.overrides());
            commands::price::run(&run_config, format)?
        }
        Commands::Compare {
            simulation,
            runs,
            abs_tol,
            rel_tol,
            format,
        } => {
            run_config.merge_with_cli(&simulation.overrides());
            if let Some(runs) = runs {
                run_config.compare.runs = runs;
            }
            if let Some(abs_tol) = abs_tol {
                run_config.compare.abs_tol = abs_tol;
            }
            if let Some(rel_tol) = rel_tol {
                run_config.compare.rel_tol = rel_tol;
            }
            run_config.validate()?;
            commands::compare::run(&run_config, format)?
        }
        Commands::Benchmark { format } => commands::benchmark::run(&run_config, format)?,
    };

    println!("{}", output);
    info!("Done");
    Ok(())
}
