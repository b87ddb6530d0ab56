//! Command-line front end
//!
//! Reads a close-price CSV, runs one simulation and prints the result as
//! JSON.
//!
//! Run with: cargo run --release -- prices.csv --model heston --days 30

use std::error::Error;
use std::fs::File;
use std::path::{Path, PathBuf};

use clap::Parser;
use csv::ReaderBuilder;
use price_forecast::{
    simulate, HistoricalSeries, ModelSelection, PricePoint, SimulationConfig, UnknownModelPolicy,
};
use tracing::{info, Level};

#[derive(Debug, Parser)]
#[command(name = "price-forecast", about = "Monte Carlo price-distribution forecasts")]
struct Cli {
    /// CSV file with `timestamp,close` columns or a single `close` column
    input: PathBuf,

    /// Process model (gbm, brownian, jump_diffusion, heston, garch,
    /// stable_levy, regime_switching, bootstrap)
    #[arg(long, default_value = "gbm")]
    model: String,

    /// Holding period in trading days
    #[arg(long, default_value_t = 30)]
    days: usize,

    /// Number of simulated trials
    #[arg(long, default_value_t = 10_000)]
    simulations: usize,

    #[arg(long)]
    seed: Option<u64>,

    /// Override the last close as the starting price
    #[arg(long)]
    start_price: Option<f64>,

    /// Calibrate on the most recent N closes only
    #[arg(long)]
    lookback: Option<usize>,

    /// Fail on an unrecognized model instead of simulating flat paths
    #[arg(long)]
    strict: bool,

    /// Run batches on a single thread
    #[arg(long)]
    sequential: bool,

    /// Omit final prices and sample paths from the output
    #[arg(long)]
    summary_only: bool,

    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn to_config(&self) -> SimulationConfig {
        let mut config = SimulationConfig::new(
            ModelSelection::parse(&self.model),
            self.days,
            self.simulations,
        )
        .with_parallel(!self.sequential);

        config.seed = self.seed;
        config.start_price = self.start_price;
        config.lookback = self.lookback;
        if self.strict {
            config.unknown_model = UnknownModelPolicy::Reject;
        }
        config
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    let series = load_series(&cli.input)?;
    info!("Loaded {} closes from {}", series.len(), cli.input.display());

    let mut result = simulate(&series, &cli.to_config())?;
    if cli.summary_only {
        result.final_prices.clear();
        result.sample_paths.clear();
    }

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn load_series<P: AsRef<Path>>(path: P) -> Result<HistoricalSeries, Box<dyn Error>> {
    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
    let close_idx = column("close").ok_or("missing `close` column")?;
    let timestamp_idx = column("timestamp");

    let mut points = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result?;
        let timestamp = match timestamp_idx {
            Some(i) => record.get(i).ok_or("missing timestamp")?.parse::<i64>()?,
            None => row as i64,
        };
        // Blank or unparseable closes are kept as missing observations
        let close = record
            .get(close_idx)
            .and_then(|c| c.parse::<f64>().ok())
            .unwrap_or(f64::NAN);
        points.push(PricePoint::new(timestamp, close));
    }

    Ok(HistoricalSeries::new(points)?)
}
