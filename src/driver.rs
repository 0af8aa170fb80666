use std::path::PathBuf;

use chrono::NaiveDate;
use indicatif::ProgressBar;
use tracing::info;

use crate::api::SearchApi;
use crate::config::HarvestConfig;
use crate::error::SinkError;
use crate::fetcher::{fetch_day, DayOutcome};
use crate::pacing::Sleeper;
use crate::sink::{JsonlSink, RecordSink};

/// Grand totals for a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub days: usize,
    pub total_ads: usize,
    pub total_in_target: usize,
    pub truncated_days: usize,
    pub abandoned_days: usize,
}

/// Inclusive day sequence; empty when `start > end`.
pub fn days_in_range(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d <= end)
}

pub fn day_count(cfg: &HarvestConfig) -> u64 {
    let span = (cfg.end_date - cfg.start_date).num_days() + 1;
    span.max(0) as u64
}

/// Walk the configured range one day at a time, flushing `sink` after each day.
pub fn harvest_range<A, S>(
    cfg: &HarvestConfig,
    api: &A,
    sink: &mut S,
    sleeper: &dyn Sleeper,
    progress: &ProgressBar,
) -> Result<RunSummary, SinkError>
where
    A: SearchApi + ?Sized,
    S: RecordSink + ?Sized,
{
    let mut summary = RunSummary::default();

    for day in days_in_range(cfg.start_date, cfg.end_date) {
        progress.set_message(day.to_string());
        let report = fetch_day(day, cfg, api, sink, sleeper)?;

        summary.days += 1;
        summary.total_ads += report.total_ads;
        summary.total_in_target += report.total_in_target;
        match report.outcome {
            DayOutcome::Truncated => summary.truncated_days += 1,
            DayOutcome::Abandoned => summary.abandoned_days += 1,
            DayOutcome::Complete => {}
        }

        // Completed days must survive a crash later in the run.
        sink.flush()?;
        progress.inc(1);

        if day < cfg.end_date {
            sleeper.sleep(cfg.day_delay());
        }
    }

    info!(
        days = summary.days,
        ads = summary.total_ads,
        in_target = summary.total_in_target,
        truncated = summary.truncated_days,
        abandoned = summary.abandoned_days,
        "harvest finished"
    );
    Ok(summary)
}

/// Run the harvest into the configured corpus file, truncating any previous run.
pub fn harvest_to_file<A>(
    cfg: &HarvestConfig,
    api: &A,
    sleeper: &dyn Sleeper,
    progress: &ProgressBar,
) -> Result<(PathBuf, RunSummary), SinkError>
where
    A: SearchApi + ?Sized,
{
    let path = cfg.corpus_path();
    info!(path = %path.display(), "writing corpus");
    let mut sink = JsonlSink::create(&path)?;
    let summary = harvest_range(cfg, api, &mut sink, sleeper, progress)?;
    sink.finish()?;
    Ok((path, summary))
}
