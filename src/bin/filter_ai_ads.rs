use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use platsbanken_harvester::filter::{
    filter_file, KeywordMatcher, DEFAULT_OUTPUT_FILE, DEFAULT_PROGRESS_EVERY,
};
use platsbanken_harvester::utils::{format_duration, init_tracing};
use platsbanken_harvester::HarvestConfig;

#[derive(Parser)]
#[command(
    name = "filter_ai_ads",
    about = "Extract ads mentioning AI/ML terms from a harvested corpus"
)]
struct Cli {
    /// Corpus to scan (default: the corpus file for the configured date range)
    #[arg(short, long)]
    input: Option<PathBuf>,
    /// Where matching ads are written
    #[arg(short, long, default_value = DEFAULT_OUTPUT_FILE)]
    output: PathBuf,
    /// Log progress every N lines
    #[arg(long, default_value_t = DEFAULT_PROGRESS_EVERY)]
    progress_every: usize,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let input = match cli.input {
        Some(p) => p,
        None => HarvestConfig::load()
            .context("Failed to load settings")?
            .corpus_path(),
    };

    println!("AI/ML keyword filter");
    println!("====================\n");
    println!("Reading: {}", input.display());

    let matcher = KeywordMatcher::ai().context("Keyword pattern failed to compile")?;
    let t0 = Instant::now();
    let summary = filter_file(&input, &cli.output, &matcher, cli.progress_every)
        .with_context(|| format!("Filtering {} failed", input.display()))?;

    let Some(summary) = summary else {
        println!("\nERROR: input file not found: {}", input.display());
        return Ok(());
    };

    println!("\nDone.");
    println!("Lines processed: {}", summary.lines);
    println!("Matching ads:    {}", summary.matches);
    println!("Written to:      {}", cli.output.display());
    println!("Elapsed:         {}", format_duration(t0.elapsed()));
    Ok(())
}
