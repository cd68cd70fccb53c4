//! GapLab CLI: size fixed-risk positions for a daily gap list.
//!
//! Commands:
//! - `size`: load a gap list CSV, filter by gap size, size each survivor
//! - `config`: print the effective run configuration as TOML

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use gaplab_core::{AccountConfig, GapFilter};
use gaplab_runner::{run_from_path, save_artifacts, LoadPolicy, RunConfig, RunReport};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "gaplab",
    about = "GapLab CLI: fixed-risk position sizing for opening gaps"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Size positions for every candidate in a gap list CSV.
    Size {
        /// Input CSV with header `ticker,gap,openingPrice`.
        input: PathBuf,

        #[command(flatten)]
        overrides: ConfigArgs,

        /// Print the full report as JSON instead of a table.
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Save report.json, selections.csv, and rejections.csv (when any
        /// candidate was rejected) under this directory.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Print the effective configuration as TOML.
    Config {
        #[command(flatten)]
        overrides: ConfigArgs,
    },
}

/// Run configuration: a TOML file plus per-field overrides.
#[derive(Args)]
struct ConfigArgs {
    /// Path to a TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Account balance in dollars.
    #[arg(long)]
    balance: Option<f64>,

    /// Fraction of balance risked per trade (e.g. 0.02).
    #[arg(long)]
    risk_fraction: Option<f64>,

    /// Fraction of the gap to capture; sets stop/target distance (e.g. 0.8).
    #[arg(long)]
    profit_capture: Option<f64>,

    /// Drop candidates whose |gap| exceeds this fraction (e.g. 0.10).
    #[arg(long, allow_negative_numbers = true)]
    max_gap: Option<f64>,

    /// Skip malformed rows instead of aborting the load.
    #[arg(long, default_value_t = false)]
    skip_malformed: bool,
}

impl ConfigArgs {
    /// Load the config file (or defaults) and apply CLI overrides.
    fn resolve(&self) -> Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::from_file(path)?,
            None => RunConfig::default(),
        };

        let mut params = config.account.params();
        if let Some(balance) = self.balance {
            params.balance = balance;
        }
        if let Some(risk) = self.risk_fraction {
            params.risk_fraction = risk;
        }
        if let Some(capture) = self.profit_capture {
            params.profit_capture_fraction = capture;
        }
        config.account = AccountConfig::try_from(params).context("invalid account parameters")?;

        if let Some(max_gap) = self.max_gap {
            config.filter = GapFilter::new(max_gap).context("invalid --max-gap")?;
        }
        if self.skip_malformed {
            config.load.policy = LoadPolicy::SkipMalformed;
        }

        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Size {
            input,
            overrides,
            json,
            output_dir,
        } => run_size(&input, &overrides, json, output_dir.as_deref()),
        Commands::Config { overrides } => {
            let config = overrides.resolve()?;
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_size(
    input: &Path,
    overrides: &ConfigArgs,
    json: bool,
    output_dir: Option<&Path>,
) -> Result<()> {
    let config = overrides.resolve()?;
    tracing::info!(run_id = %config.run_id(), "resolved configuration");

    let report = run_from_path(input, &config)
        .with_context(|| format!("failed to load candidates from {}", input.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }

    if let Some(dir) = output_dir {
        let run_dir = save_artifacts(&report, input, dir)?;
        eprintln!("Artifacts saved to: {}", run_dir.display());
    }

    Ok(())
}

fn print_summary(report: &RunReport) {
    let account = &report.config.account;

    println!();
    println!("=== Gap Positions ===");
    println!("Balance:        ${:.2}", account.balance());
    println!(
        "Risk/trade:     {:.2}% (${:.2})",
        account.risk_fraction() * 100.0,
        account.max_loss_per_trade()
    );
    println!(
        "Capture:        {:.0}% of gap",
        account.profit_capture_fraction() * 100.0
    );
    println!(
        "Max |gap|:      {:.2}%",
        report.config.filter.max_abs_gap * 100.0
    );
    println!(
        "Candidates:     {} loaded, {} filtered, {} rejected",
        report.candidate_count,
        report.filtered_out.len(),
        report.rejections.len()
    );
    println!();

    if report.selections.is_empty() {
        println!("No positions.");
    } else {
        println!(
            "{:<8} {:>10} {:>10} {:>10} {:>8} {:>10}",
            "Ticker", "Entry", "Stop", "Target", "Shares", "Profit"
        );
        println!("{}", "-".repeat(61));
        for s in &report.selections {
            let p = &s.position;
            println!(
                "{:<8} {:>10.2} {:>10.2} {:>10.2} {:>8} {:>10.2}",
                s.ticker, p.entry_price, p.stop_loss_price, p.take_profit_price, p.shares, p.profit
            );
        }
        println!("{}", "-".repeat(61));
        println!(
            "{:<8} {:>10} {:>10} {:>10} {:>8} {:>10.2}",
            "Total",
            "",
            "",
            "",
            report.selections.iter().map(|s| s.position.shares).sum::<u64>(),
            report.total_profit()
        );
    }

    if !report.filtered_out.is_empty() {
        println!();
        println!("--- Filtered (|gap| too large) ---");
        for f in &report.filtered_out {
            println!("{:<8} gap {:>+8.2}%", f.ticker, f.gap_percent * 100.0);
        }
    }

    if !report.rejections.is_empty() {
        println!();
        println!("--- Rejected ---");
        for r in &report.rejections {
            println!("{:<8} line {:<5} {}", r.ticker, r.line, r.error);
        }
    }

    for diag in &report.load_diagnostics {
        println!("WARNING: skipped {diag}");
    }
    println!();
}
