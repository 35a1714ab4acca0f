//! # pricing
//!
//! Operator CLI for the marketplace pricing engine.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           pricing CLI                                   │
//! │                                                                         │
//! │  args (clap) ──► PolicyConfig::load ──► read JSON (file | stdin)        │
//! │                                               │                         │
//! │                                               ▼                         │
//! │                        commands::{tax, margin, analyze, evaluate,       │
//! │                                   suggest, mode, config}                │
//! │                                               │                         │
//! │                     stdout: JSON result  ◄────┴────►  stderr: logs      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Examples
//! ```text
//! pricing evaluate candidate.json
//! echo '{"line_items":[{"unit_price":10000,"quantity":1}]}' | pricing tax
//! pricing mode --ltv 30000 --cac 10000
//! RUST_LOG=debug pricing --config ./policy.toml suggest request.json
//! ```

mod commands;
mod config;
mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::PolicyConfig;
use crate::error::CliError;

#[derive(Parser)]
#[command(name = "pricing")]
#[command(about = "Pricing, margin and VAT decisions for marketplace listings", long_about = None)]
#[command(version)]
struct Cli {
    /// Policy file (defaults to policy.toml in the platform config directory)
    #[arg(short, long, global = true, env = "PRICING_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute invoice subtotal, VAT and total
    Tax(InputArgs),
    /// Compute a cost-plus retail price
    Margin(InputArgs),
    /// Break down profit at a given VAT-inclusive price
    Analyze(InputArgs),
    /// Decide whether a product candidate may be published
    Evaluate(InputArgs),
    /// Suggest a market-adjusted price from unit economics
    Suggest(InputArgs),
    /// Print the pricing mode for an LTV/CAC pair
    Mode {
        /// Customer lifetime value, in minor units
        #[arg(long)]
        ltv: i64,
        /// Customer acquisition cost, in minor units
        #[arg(long)]
        cac: i64,
    },
    /// Print the effective policy as TOML
    Config,
}

#[derive(Args)]
struct InputArgs {
    /// JSON input file; reads stdin when omitted or "-"
    input: Option<PathBuf>,
}

fn main() -> ExitCode {
    init_tracing();

    match run(Cli::parse()) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            let code = err.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
            ExitCode::from(code)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<String> {
    let policy = PolicyConfig::load(cli.config.as_deref())
        .map_err(CliError::from)
        .context("Failed to load policy")?;

    let output = match cli.command {
        Commands::Tax(args) => commands::tax(&read(&args)?, &policy)?,
        Commands::Margin(args) => commands::margin(&read(&args)?)?,
        Commands::Analyze(args) => commands::analyze(&read(&args)?)?,
        Commands::Evaluate(args) => commands::evaluate(&read(&args)?, &policy)?,
        Commands::Suggest(args) => commands::suggest(&read(&args)?, &policy)?,
        Commands::Mode { ltv, cac } => commands::mode(ltv, cac)?,
        Commands::Config => commands::config(&policy)?,
    };

    Ok(output)
}

fn read(args: &InputArgs) -> Result<String, CliError> {
    commands::read_input(args.input.as_deref())
}

/// Initializes the tracing subscriber.
///
/// ## Log Levels
/// Set via `RUST_LOG` environment variable:
/// - `RUST_LOG=debug` - Show all debug logs
/// - `RUST_LOG=pricing_core=trace` - Trace level for the engine only
/// - Default: info for everything, debug for `pricing` and `pricing_core`
///
/// Logs go to stderr so stdout stays valid JSON.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,pricing=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}
