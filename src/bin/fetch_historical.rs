use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use platsbanken_harvester::api::HttpSearchApi;
use platsbanken_harvester::driver::{day_count, harvest_to_file};
use platsbanken_harvester::pacing::ThreadSleeper;
use platsbanken_harvester::utils::{format_duration, init_tracing};
use platsbanken_harvester::HarvestConfig;

#[derive(Parser)]
#[command(
    name = "fetch_historical",
    about = "Harvest historical Platsbanken ads into a JSONL corpus"
)]
struct Cli {
    /// First day to fetch (YYYY-MM-DD)
    #[arg(long)]
    start: Option<NaiveDate>,
    /// Last day to fetch, inclusive (YYYY-MM-DD)
    #[arg(long)]
    end: Option<NaiveDate>,
    /// Directory the corpus file is written to
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
    /// Settings file, without extension (default: ./harvest)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Disable the progress bar
    #[arg(long)]
    no_progress: bool,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut cfg = match &cli.config {
        Some(stem) => HarvestConfig::load_from(stem),
        None => HarvestConfig::load(),
    }
    .context("Failed to load settings")?;
    if let Some(start) = cli.start {
        cfg.start_date = start;
    }
    if let Some(end) = cli.end {
        cfg.end_date = end;
    }
    if let Some(dir) = cli.output_dir {
        cfg.output_dir = dir;
    }
    info!(settings_loaded = ?cfg, msg = "Starting historical harvest");

    println!("Platsbanken Historical Harvest");
    println!("==============================\n");
    println!("Range: {} -> {}", cfg.start_date, cfg.end_date);
    println!("Output: {}\n", cfg.corpus_path().display());

    let api = HttpSearchApi::new(&cfg).context("Failed to build HTTP client")?;

    let pb = if cli.no_progress {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(day_count(&cfg))
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} days ({msg}, eta {eta})")?
            .progress_chars("=> "),
    );

    let t0 = Instant::now();
    let (path, summary) = harvest_to_file(&cfg, &api, &ThreadSleeper, &pb)
        .with_context(|| format!("Harvest aborted writing {}", cfg.corpus_path().display()))?;
    pb.finish_and_clear();

    println!("\nDone.");
    println!(
        "Total ads from {} to {}: {}",
        cfg.start_date, cfg.end_date, summary.total_ads
    );
    println!("  with tracked SSYK4: {}", summary.total_in_target);
    println!(
        "  days: {} ({} truncated at max offset, {} abandoned)",
        summary.days, summary.truncated_days, summary.abandoned_days
    );
    println!("File created: {}", path.display());
    println!("Elapsed: {}", format_duration(t0.elapsed()));
    Ok(())
}
