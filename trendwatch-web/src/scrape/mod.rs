//! Per-page scrape pipeline.
//!
//! [`scrape_trends`] drives a [`TrendSession`] through one page: load, clear
//! the overlay, read the top link labels, then for each label open its detail
//! dialog, close it and optionally translate the trend text. Items are handled
//! strictly one after another. Only loading the page and reading the labels
//! can fail the whole run; every other step records a [`StepStatus`] on the
//! item and moves on.

use async_trait::async_trait;
use std::fmt;
use tracing::{debug, info, warn};
use trendwatch_common::{Result, TrendError};
use trendwatch_drivers::browser::pacing::{Pacing, pause};

use crate::extract::{DetailStats, SuffixPolicy, TrendRecord, detail_stats, separate_with_policy};

pub mod webdriver;

pub use webdriver::WebDriverSession;

pub const DEFAULT_TOP_N: usize = 12;

/// The browser side of a scrape. Indices passed to [`TrendSession::open_detail`]
/// refer to the order returned by [`TrendSession::trend_labels`].
#[async_trait]
pub trait TrendSession: Send {
    async fn load(&mut self, url: &str) -> anyhow::Result<()>;

    /// Remove the sticky element covering the trend list. `Ok(false)` when
    /// there was none.
    async fn remove_overlay(&mut self) -> anyhow::Result<bool>;

    /// Raw text of the first `limit` trend links, in page order.
    async fn trend_labels(&mut self, limit: usize) -> anyhow::Result<Vec<String>>;

    /// Open the detail dialog for link `index` and return its `(label, value)`
    /// stat pairs. `Ok(None)` when the dialog never opened.
    async fn open_detail(&mut self, index: usize) -> anyhow::Result<Option<Vec<(String, String)>>>;

    async fn close_detail(&mut self) -> anyhow::Result<()>;

    /// Release the browser. Called exactly once per [`scrape_trends`] run.
    async fn shutdown(&mut self) -> anyhow::Result<()>;
}

/// Translates trend text into a target language.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target_lang: &str) -> anyhow::Result<String>;
}

/// Returns the text unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

#[async_trait]
impl Translator for PassThrough {
    async fn translate(&self, text: &str, _target_lang: &str) -> anyhow::Result<String> {
        Ok(text.to_string())
    }
}

/// Outcome of one per-item step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus {
    Success,
    /// Not requested, or nothing to do.
    Skipped,
    /// Ran, but produced nothing usable.
    Degraded(String),
    Failed(String),
}

impl StepStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, StepStatus::Success)
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepStatus::Success => f.write_str("success"),
            StepStatus::Skipped => f.write_str("skipped"),
            StepStatus::Degraded(why) => write!(f, "degraded: {why}"),
            StepStatus::Failed(why) => write!(f, "failed: {why}"),
        }
    }
}

/// A [`TrendRecord`] plus how each step went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapedTrend {
    pub record: TrendRecord,
    /// Label as read from the page, trimmed.
    pub raw_text: String,
    /// Volume split off `raw_text`, before any dialog override.
    pub parsed_volume: String,
    pub detail: StepStatus,
    pub close: StepStatus,
    pub translation: StepStatus,
}

#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    pub url: String,
    pub top_n: usize,
    pub translate: bool,
    pub target_lang: String,
    pub policy: SuffixPolicy,
    pub pacing: Pacing,
}

impl ScrapeOptions {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            url: "https://trends24.in/".to_string(),
            top_n: DEFAULT_TOP_N,
            translate: true,
            target_lang: "en".to_string(),
            policy: SuffixPolicy::Compatible,
            pacing: Pacing::default(),
        }
    }
}

/// Scrape one page. `session` is shut down before this returns, whatever the
/// outcome.
pub async fn scrape_trends<S>(
    mut session: S,
    translator: &dyn Translator,
    opts: &ScrapeOptions,
) -> Result<Vec<ScrapedTrend>>
where
    S: TrendSession,
{
    let outcome = run(&mut session, translator, opts).await;
    if let Err(e) = session.shutdown().await {
        warn!(target: "scrape", error = %format!("{e:#}"), "session shutdown failed");
    }
    outcome
}

async fn run<S: TrendSession>(
    session: &mut S,
    translator: &dyn Translator,
    opts: &ScrapeOptions,
) -> Result<Vec<ScrapedTrend>> {
    info!(target: "scrape", url = %opts.url, top_n = opts.top_n, "scraping trends");

    session
        .load(&opts.url)
        .await
        .map_err(|e| TrendError::Scrape(format!("failed to load {}: {e:#}", opts.url)))?;
    pause(opts.pacing.page_load).await;

    match session.remove_overlay().await {
        Ok(true) => {
            debug!(target: "scrape", "overlay removed");
            pause(opts.pacing.after_overlay).await;
        }
        Ok(false) => debug!(target: "scrape", "no overlay present"),
        Err(e) => warn!(target: "scrape", error = %format!("{e:#}"), "overlay removal failed"),
    }

    let mut labels = session
        .trend_labels(opts.top_n)
        .await
        .map_err(|e| TrendError::Scrape(format!("failed to read trend links: {e:#}")))?;
    labels.truncate(opts.top_n);
    info!(target: "scrape", count = labels.len(), "trend links found");

    let mut out = Vec::with_capacity(labels.len());
    for (index, label) in labels.iter().enumerate() {
        let item = scrape_one(session, translator, opts, index, label).await;
        debug!(
            target: "scrape",
            index,
            trend = %item.record.trend_text,
            volume = %item.record.volume,
            detail = %item.detail,
            close = %item.close,
            translation = %item.translation,
            "item done"
        );
        out.push(item);
        pause(opts.pacing.between_items).await;
    }
    Ok(out)
}

async fn scrape_one<S: TrendSession>(
    session: &mut S,
    translator: &dyn Translator,
    opts: &ScrapeOptions,
    index: usize,
    label: &str,
) -> ScrapedTrend {
    let raw_text = label.trim().to_string();
    let (trend_text, parsed_volume) = separate_with_policy(&raw_text, opts.policy);

    let (stats, detail) = match session.open_detail(index).await {
        Ok(Some(pairs)) => {
            let stats = detail_stats(pairs);
            if stats.is_empty() {
                (stats, StepStatus::Degraded("dialog had no known stats".into()))
            } else {
                (stats, StepStatus::Success)
            }
        }
        Ok(None) => (
            DetailStats::default(),
            StepStatus::Degraded("dialog did not open".into()),
        ),
        Err(e) => {
            warn!(target: "scrape", index, error = %format!("{e:#}"), "detail lookup failed");
            (DetailStats::default(), StepStatus::Failed(format!("{e:#}")))
        }
    };

    let close = match session.close_detail().await {
        Ok(()) => {
            pause(opts.pacing.after_close).await;
            StepStatus::Success
        }
        Err(e) => {
            debug!(target: "scrape", index, error = %format!("{e:#}"), "closing dialog failed");
            StepStatus::Failed(format!("{e:#}"))
        }
    };

    let mut record = TrendRecord::from_parts(trend_text, parsed_volume.clone(), &stats);

    let translation = if !opts.translate || record.trend_text.is_empty() {
        StepStatus::Skipped
    } else {
        pause(opts.pacing.before_translate).await;
        match translator.translate(&record.trend_text, &opts.target_lang).await {
            Ok(text) if text.trim().is_empty() => {
                StepStatus::Degraded("translator returned empty text".into())
            }
            Ok(text) => {
                record.trend_text = text;
                StepStatus::Success
            }
            Err(e) => {
                warn!(
                    target: "scrape",
                    trend = %record.trend_text,
                    error = %format!("{e:#}"),
                    "translation failed"
                );
                StepStatus::Failed(format!("{e:#}"))
            }
        }
    };

    ScrapedTrend {
        record,
        raw_text,
        parsed_volume,
        detail,
        close,
        translation,
    }
}
