use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://historical.api.jobtechdev.se/search";
pub const DEFAULT_USER_AGENT: &str = "ai-platsbanken-harvester/1.0";

/// SSYK4 codes counted (never filtered) while harvesting.
const TRACKED_SSYK4: [&str; 10] = [
    "2431", "2433", "2511", "2512", "2513", "2519", "2521", "2522", "2523", "2621",
];

/// Immutable settings for one harvesting run.
///
/// Built from defaults, an optional `harvest.toml`, then `HARVEST_*` environment
/// variables. Tests construct it directly with tiny limits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    pub base_url: String,
    pub user_agent: String,
    pub start_date: NaiveDate,
    /// Inclusive.
    pub end_date: NaiveDate,
    pub page_size: usize,
    /// Pagination stops once the offset exceeds this value.
    pub max_offset: usize,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    pub request_timeout_secs: u64,
    pub page_delay_ms: u64,
    pub day_delay_ms: u64,
    pub output_dir: PathBuf,
    pub tracked_ssyk4: BTreeSet<String>,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        HarvestConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            // ChatGPT launch through the day before daily harvesting took over.
            start_date: NaiveDate::from_ymd_opt(2022, 11, 30).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2025, 11, 6).unwrap_or_default(),
            page_size: 100,
            max_offset: 2000,
            max_retries: 3,
            retry_backoff_ms: 10_000,
            request_timeout_secs: 120,
            page_delay_ms: 200,
            day_delay_ms: 500,
            output_dir: PathBuf::from("."),
            tracked_ssyk4: TRACKED_SSYK4.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl HarvestConfig {
    /// Load settings, looking for `harvest.toml` in the working directory.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new("harvest"))
    }

    /// Load settings from `file_stem` (any format `config` understands, optional)
    /// layered under `HARVEST_*` environment variables.
    pub fn load_from(file_stem: &Path) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(file_stem).required(false))
            .add_source(Environment::with_prefix("HARVEST").try_parsing(true))
            .build()?;
        let cfg: HarvestConfig = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::Invalid("page_size must be at least 1".into()));
        }
        if self.max_retries == 0 {
            return Err(ConfigError::Invalid("max_retries must be at least 1".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    pub fn day_delay(&self) -> Duration {
        Duration::from_millis(self.day_delay_ms)
    }

    pub fn is_tracked(&self, ssyk4: Option<&str>) -> bool {
        ssyk4.is_some_and(|code| self.tracked_ssyk4.contains(code))
    }

    /// `historical_ads_detailed_<start>_to_<end>.jsonl`
    pub fn corpus_file_name(&self) -> String {
        corpus_file_name(self.start_date, self.end_date)
    }

    pub fn corpus_path(&self) -> PathBuf {
        self.output_dir.join(self.corpus_file_name())
    }
}

pub fn corpus_file_name(start: NaiveDate, end: NaiveDate) -> String {
    format!(
        "historical_ads_detailed_{}_to_{}.jsonl",
        start.format("%Y-%m-%d"),
        end.format("%Y-%m-%d")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_historical_range() {
        let cfg = HarvestConfig::default();
        assert_eq!(cfg.start_date.to_string(), "2022-11-30");
        assert_eq!(cfg.end_date.to_string(), "2025-11-06");
        assert_eq!(cfg.page_size, 100);
        assert_eq!(cfg.max_offset, 2000);
        assert_eq!(cfg.max_retries, 3);
        assert_eq!(cfg.retry_backoff(), Duration::from_secs(10));
        assert_eq!(cfg.tracked_ssyk4.len(), 10);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn file_name_embeds_range() {
        let cfg = HarvestConfig::default();
        assert_eq!(
            cfg.corpus_file_name(),
            "historical_ads_detailed_2022-11-30_to_2025-11-06.jsonl"
        );
    }

    #[test]
    fn tracked_lookup() {
        let cfg = HarvestConfig::default();
        assert!(cfg.is_tracked(Some("2512")));
        assert!(!cfg.is_tracked(Some("9999")));
        assert!(!cfg.is_tracked(None));
    }

    #[test]
    fn zero_page_size_rejected() {
        let cfg = HarvestConfig {
            page_size: 0,
            ..HarvestConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn load_reads_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let stem = dir.path().join("harvest");
        std::fs::write(
            dir.path().join("harvest.toml"),
            "page_size = 25\nstart_date = \"2023-01-02\"\nend_date = \"2023-01-03\"\n",
        )
        .unwrap();
        let cfg = HarvestConfig::load_from(&stem).unwrap();
        assert_eq!(cfg.page_size, 25);
        assert_eq!(cfg.start_date.to_string(), "2023-01-02");
        assert_eq!(cfg.max_offset, 2000);
    }
}
