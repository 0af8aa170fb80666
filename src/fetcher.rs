//! Paginated retrieval of one calendar day.

use chrono::NaiveDate;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::api::{extract_hits, PageQuery, SearchApi};
use crate::config::HarvestConfig;
use crate::error::{FetchError, SinkError};
use crate::normalize::normalize;
use crate::pacing::Sleeper;
use crate::sink::RecordSink;

/// How pagination for a day ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayOutcome {
    /// Short or empty page reached.
    Complete,
    /// Offset ceiling hit; later ads for the day were not requested.
    Truncated,
    /// A page could not be fetched; pages already written are kept.
    Abandoned,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayReport {
    pub day: NaiveDate,
    pub total_ads: usize,
    /// Ads whose SSYK4 is in the tracked set. Informational only.
    pub total_in_target: usize,
    pub requests: usize,
    pub outcome: DayOutcome,
}

/// Fetch every ad published on `day`, writing each one to `sink` as it arrives.
///
/// Network and response problems end the day early and are only logged. The only
/// error returned is a failed write, which the caller must treat as fatal.
pub fn fetch_day<A, S>(
    day: NaiveDate,
    cfg: &HarvestConfig,
    api: &A,
    sink: &mut S,
    sleeper: &dyn Sleeper,
) -> Result<DayReport, SinkError>
where
    A: SearchApi + ?Sized,
    S: RecordSink + ?Sized,
{
    let mut report = DayReport {
        day,
        total_ads: 0,
        total_in_target: 0,
        requests: 0,
        outcome: DayOutcome::Complete,
    };
    let mut offset = 0usize;

    loop {
        if offset > cfg.max_offset {
            warn!(
                %day,
                max_offset = cfg.max_offset,
                "Reached max offset; ads past this point are missed"
            );
            report.outcome = DayOutcome::Truncated;
            break;
        }

        let query = PageQuery::for_day(day, cfg.page_size, offset);
        let (body, attempts) = fetch_with_retry(api, &query, cfg, sleeper);
        report.requests += attempts;
        let body = match body {
            Ok(body) => body,
            Err(e) => {
                error!(
                    %day,
                    offset,
                    attempts,
                    kind = e.kind(),
                    "Giving up on the rest of the day: {}",
                    e
                );
                report.outcome = DayOutcome::Abandoned;
                break;
            }
        };

        let hits = extract_hits(&body);
        if hits.is_empty() {
            break;
        }

        let mut batch_in_target = 0usize;
        for ad in hits {
            let record = normalize(ad);
            sink.append(&record)?;
            report.total_ads += 1;
            if cfg.is_tracked(record.ssyk4.as_deref()) {
                batch_in_target += 1;
            }
        }
        report.total_in_target += batch_in_target;

        info!(
            offset,
            hits = hits.len(),
            in_target = batch_in_target,
            total = report.total_ads,
            "page done"
        );

        if hits.len() < cfg.page_size {
            break;
        }

        offset += cfg.page_size;
        sleeper.sleep(cfg.page_delay());
    }

    info!(
        %day,
        ads = report.total_ads,
        in_target = report.total_in_target,
        outcome = ?report.outcome,
        "day finished"
    );
    Ok(report)
}

/// Request one page, retrying transient failures with a fixed backoff.
/// Every transient failure is followed by a backoff, the last one included.
/// Returns the result and the number of attempts made.
fn fetch_with_retry<A>(
    api: &A,
    query: &PageQuery,
    cfg: &HarvestConfig,
    sleeper: &dyn Sleeper,
) -> (Result<Value, FetchError>, usize)
where
    A: SearchApi + ?Sized,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match api.search(query) {
            Ok(body) => return (Ok(body), attempt as usize),
            Err(e) if e.is_transient() => {
                warn!(
                    offset = query.offset,
                    attempt,
                    max_retries = cfg.max_retries,
                    backoff_ms = cfg.retry_backoff_ms,
                    "{}; backing off",
                    e
                );
                sleeper.sleep(cfg.retry_backoff());
                if attempt >= cfg.max_retries {
                    return (Err(e), attempt as usize);
                }
            }
            Err(e) => return (Err(e), attempt as usize),
        }
    }
}
