//! Shared types for the trendwatch workspace.
//!
//! Kept small on purpose: every other crate depends on it.
//!
//! - [`observability`]: `tracing` initialisation shared by the binary and tests
//! - [`TrendError`] and [`Result`]: error type used at crate seams
//! - [`LogFormat`]: log encoding, shared between config and observability
//!
//! ```rust
//! use trendwatch_common::{LogFormat, TrendError};
//!
//! let err = TrendError::Config("missing api key".into());
//! assert_eq!(err.to_string(), "Configuration error: missing api key");
//! assert!(matches!("json".parse::<LogFormat>(), Ok(LogFormat::Json)));
//! ```
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub mod observability;

/// Output encoding for structured logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = TrendError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(TrendError::Config(format!("unknown log format: {other}"))),
        }
    }
}

/// Error types used across the trendwatch crates.
#[derive(thiserror::Error, Debug)]
pub enum TrendError {
    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The browser driver could not be started or reached.
    #[error("Driver error: {0}")]
    Driver(#[from] anyhow::Error),

    /// A trends API call failed.
    #[error("API error: {0}")]
    Api(String),

    /// The scrape could not proceed (page load, link discovery).
    #[error("Scrape error: {0}")]
    Scrape(String),
}

/// Convenient alias for results that use [`TrendError`].
pub type Result<T> = std::result::Result<T, TrendError>;
