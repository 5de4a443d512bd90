//! Trend scraping for trends24-style aggregator pages.
//!
//! - [`extract`]: splitting raw link labels into trend text and volume, and
//!   reading the detail dialog's stat blocks
//! - [`scrape`]: the per-page pipeline behind the [`scrape::TrendSession`]
//!   and [`scrape::Translator`] seams, plus the WebDriver-backed session

pub mod extract;
pub mod scrape;

pub use extract::{SuffixPolicy, TrendRecord, separate_trend_and_volume};
pub use scrape::{ScrapeOptions, ScrapedTrend, StepStatus, scrape_trends};
