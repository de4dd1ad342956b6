//! Riskline CLI binary.
//!
//! Builds a single-asset risk report from CSV price tables.

use clap::{Parser, ValueEnum};
use riskline::data::{BenchmarkSource, CsvSource};
use riskline::output::ExportFormat;
use riskline::{RiskConfig, RiskPipeline};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "riskline")]
#[command(
    about = "Single-asset risk report: CAPM, risk decomposition, target-volatility allocation",
    long_about = None
)]
#[command(version)]
struct Cli {
    /// Asset price CSV (must have a Date column)
    #[arg(long)]
    asset: PathBuf,

    /// Benchmark price CSV; synthesized from the asset when absent or missing
    #[arg(long)]
    benchmark: Option<PathBuf>,

    /// Annual risk-free rate (0.06 = 6%)
    #[arg(long, allow_negative_numbers = true)]
    annual_rf: f64,

    /// Return periods per year (252 for daily data)
    #[arg(long)]
    periods_per_year: u32,

    /// Target annual volatility of the allocation
    #[arg(long)]
    target_vol: f64,

    /// Rolling window length in periods
    #[arg(long)]
    window: usize,

    /// Preferred asset price column; the last column is used if it is absent
    #[arg(long)]
    price_column: String,

    /// Asset label used in the report
    #[arg(long)]
    asset_name: String,

    /// Report output path
    #[arg(long)]
    output: PathBuf,

    /// Report format
    #[arg(long, value_enum, default_value_t = Format::Csv)]
    format: Format,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    Json,
    PrettyJson,
}

impl From<Format> for ExportFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Csv => Self::Csv,
            Format::Json => Self::Json,
            Format::PrettyJson => Self::PrettyJson,
        }
    }
}

fn main() {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Warning: a global tracing subscriber was already installed");
    }

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = RiskConfig {
        asset_name: cli.asset_name,
        price_column: cli.price_column,
        annual_risk_free_rate: cli.annual_rf,
        periods_per_year: cli.periods_per_year,
        target_volatility: cli.target_vol,
        rolling_window: cli.window,
    };
    let pipeline = RiskPipeline::new(config)?;

    let benchmark = BenchmarkSource::from_optional_path(cli.benchmark.as_deref());
    let report = pipeline.run(&CsvSource::new(&cli.asset), &benchmark)?;
    pipeline.emit(&report, &cli.output, cli.format.into())?;

    println!("{}", report);
    println!("Report written to {}", cli.output.display());
    Ok(())
}
