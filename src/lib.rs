//! Harvests historical job ads from the JobTech search API into a JSONL corpus,
//! and filters that corpus down to ads mentioning AI/ML terms.

pub mod api;
pub mod classify;
pub mod config;
pub mod driver;
pub mod error;
pub mod fetcher;
pub mod filter;
pub mod normalize;
pub mod pacing;
pub mod sink;
pub mod utils;

pub use config::HarvestConfig;
pub use error::{ConfigError, FetchError, SinkError};
pub use normalize::{normalize, NormalizedAdRecord};
