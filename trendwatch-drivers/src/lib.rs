//! Driver layer for browser automation.
//!
//! - [`browser::driver::TrendDriver`]: WebDriver client wrapper (one session per driver)
//! - [`browser::page::TrendPage`]: DOM helpers over the active window
//! - [`browser::pacing::Pacing`]: fixed delays between UI steps
pub mod browser;
