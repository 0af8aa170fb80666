//! Client side of the historical job-ad search API.

use chrono::NaiveDate;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use serde_json::Value;
use tracing::debug;

use crate::config::HarvestConfig;
use crate::error::FetchError;

/// Envelope keys the batch may live under, newest first.
const HIT_KEYS: [&str; 2] = ["hits", "results"];

/// One day-bounded page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    pub published_after: String,
    pub published_before: String,
    pub limit: usize,
    pub offset: usize,
}

impl PageQuery {
    /// Query covering the whole of `day`, second granularity.
    pub fn for_day(day: NaiveDate, limit: usize, offset: usize) -> Self {
        PageQuery {
            published_after: day.format("%Y-%m-%dT00:00:00").to_string(),
            published_before: day.format("%Y-%m-%dT23:59:59").to_string(),
            limit,
            offset,
        }
    }

    pub fn params(&self) -> [(&'static str, String); 4] {
        [
            ("published-after", self.published_after.clone()),
            ("published-before", self.published_before.clone()),
            ("limit", self.limit.to_string()),
            ("offset", self.offset.to_string()),
        ]
    }
}

/// Anything that can answer a page query with a JSON body.
pub trait SearchApi {
    fn search(&self, query: &PageQuery) -> Result<Value, FetchError>;
}

/// Blocking HTTP implementation against the JobTech historical endpoint.
pub struct HttpSearchApi {
    client: Client,
    base_url: String,
}

impl HttpSearchApi {
    pub fn new(cfg: &HarvestConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let agent = HeaderValue::from_str(&cfg.user_agent)
            .map_err(|e| FetchError::Request(format!("invalid user agent: {}", e)))?;
        headers.insert(USER_AGENT, agent);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(cfg.request_timeout())
            .build()?;
        Ok(HttpSearchApi {
            client,
            base_url: cfg.base_url.clone(),
        })
    }
}

impl SearchApi for HttpSearchApi {
    fn search(&self, query: &PageQuery) -> Result<Value, FetchError> {
        debug!(url = %self.base_url, offset = query.offset, "GET search page");
        let response = self
            .client
            .get(&self.base_url)
            .query(&query.params())
            .send()?
            .error_for_status()?;
        let body = response.json::<Value>()?;
        Ok(body)
    }
}

/// Pull the batch of hits out of a response body.
///
/// A missing, null or empty `hits` falls through to `results`; if neither holds
/// a non-empty list the batch is empty.
pub fn extract_hits(body: &Value) -> &[Value] {
    HIT_KEYS
        .iter()
        .filter_map(|key| body.get(*key).and_then(Value::as_array))
        .find(|hits| !hits.is_empty())
        .map(Vec::as_slice)
        .unwrap_or(&[])
}
