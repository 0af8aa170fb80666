#![allow(dead_code)]

use std::cell::RefCell;
use std::time::Duration;

use chrono::NaiveDate;
use platsbanken_harvester::api::{PageQuery, SearchApi};
use platsbanken_harvester::error::FetchError;
use platsbanken_harvester::pacing::Sleeper;
use platsbanken_harvester::HarvestConfig;
use serde_json::{json, Value};

/// Search API backed by a closure; remembers every query it saw.
pub struct FnApi<F> {
    handler: F,
    pub queries: RefCell<Vec<PageQuery>>,
}

impl<F> FnApi<F>
where
    F: Fn(&PageQuery, usize) -> Result<Value, FetchError>,
{
    pub fn new(handler: F) -> Self {
        FnApi {
            handler,
            queries: RefCell::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.queries.borrow().len()
    }
}

impl<F> SearchApi for FnApi<F>
where
    F: Fn(&PageQuery, usize) -> Result<Value, FetchError>,
{
    fn search(&self, query: &PageQuery) -> Result<Value, FetchError> {
        let call = self.queries.borrow().len();
        self.queries.borrow_mut().push(query.clone());
        (self.handler)(query, call)
    }
}

#[derive(Default)]
pub struct RecordingSleeper {
    pub sleeps: RefCell<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn count(&self, d: Duration) -> usize {
        self.sleeps.borrow().iter().filter(|s| **s == d).count()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.sleeps.borrow_mut().push(duration);
    }
}

/// Distinct delays so tests can tell the sleeps apart.
pub fn small_config() -> HarvestConfig {
    HarvestConfig {
        page_size: 2,
        max_offset: 100,
        max_retries: 3,
        retry_backoff_ms: 7,
        page_delay_ms: 3,
        day_delay_ms: 5,
        ..HarvestConfig::default()
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// `count` ads for the page, ids `<day>-<n>`.
pub fn page(query: &PageQuery, count: usize) -> Value {
    let day = &query.published_after[..10];
    let hits: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "id": format!("{}-{}", day, query.offset + i),
                "headline": "Systemutvecklare",
                "employer": {"name": "Länsförsäkringar"},
                "occupation": {"legacy_ams_taxonomy_id": "251201"},
                "description": {"text": "Vi söker dig", "text_formatted": "<p>Vi söker dig</p>"}
            })
        })
        .collect();
    json!({ "hits": hits })
}

/// Pages for a day holding `total` ads.
pub fn paged(query: &PageQuery, total: usize) -> Value {
    let remaining = total.saturating_sub(query.offset);
    page(query, remaining.min(query.limit))
}

pub fn transient() -> FetchError {
    FetchError::Transient("operation timed out".to_string())
}
