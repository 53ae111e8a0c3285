//! Benchmark driver: runs a diarization engine over a dataset, scores
//! it against RTTM ground truth and persists per-file and aggregate
//! results.

mod config;
mod runner;

use clap::Parser;
use config::BenchConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "diabench", about = "Speaker-diarization benchmark runner")]
struct Args {
    /// Dataset name as declared in the datasets config file.
    #[arg(long, default_value = "ami")]
    dataset: String,

    /// Path to the datasets config file.
    #[arg(long, default_value = "config/datasets.yaml")]
    config: PathBuf,

    /// Diarization model to benchmark (only "mock" is built in).
    #[arg(long, default_value = "mock")]
    model: String,

    /// DER collar in seconds, excluded around reference turn boundaries.
    #[arg(long, default_value_t = 0.25)]
    collar: f64,

    /// Exclude overlapping reference speech from DER scoring.
    #[arg(long)]
    skip_overlap: bool,

    /// SQLite database the run and its results are written to.
    #[arg(long, default_value = "results/benchmark.db")]
    db: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = BenchConfig::load(
        &args.config,
        &args.dataset,
        &args.model,
        args.collar,
        args.skip_overlap,
        args.db,
    )?;
    runner::run(&config)
}
