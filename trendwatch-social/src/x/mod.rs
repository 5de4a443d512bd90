//! X (Twitter) trends API.
pub mod client;
pub mod types;

pub use client::{Credentials, XApi, exchange_bearer_token, find_woeid, resolve_bearer};
pub use types::{ApiTrend, PlaceTrend, PlaceTrends, TrendLocation};

/// WOEID of the worldwide trend list.
pub const WORLDWIDE: u64 = 1;
/// WOEID of the United States.
pub const UNITED_STATES: u64 = 23424977;
