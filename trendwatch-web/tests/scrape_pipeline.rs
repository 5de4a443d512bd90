//! Scrape pipeline against a scripted in-memory session.

mod common;

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use trendwatch_common::TrendError;
use trendwatch_drivers::browser::pacing::Pacing;
use trendwatch_web::SuffixPolicy;
use trendwatch_web::scrape::{
    PassThrough, ScrapeOptions, StepStatus, TrendSession, Translator, scrape_trends,
};

#[derive(Clone)]
enum Detail {
    Stats(Vec<(&'static str, &'static str)>),
    NotOpened,
    Error(&'static str),
}

#[derive(Clone, Default)]
struct Script {
    load_error: Option<&'static str>,
    overlay_error: bool,
    overlay_absent: bool,
    labels_error: Option<&'static str>,
    labels: Vec<&'static str>,
    details: HashMap<usize, Detail>,
    close_errors: HashSet<usize>,
    shutdown_error: bool,
}

type Log = Arc<Mutex<Vec<String>>>;

struct FakeSession {
    script: Script,
    log: Log,
    open: Option<usize>,
}

impl FakeSession {
    fn new(script: Script) -> (Self, Log) {
        let log = Log::default();
        (
            Self {
                script,
                log: log.clone(),
                open: None,
            },
            log,
        )
    }

    fn record(&self, event: impl Into<String>) {
        self.log.lock().unwrap().push(event.into());
    }
}

#[async_trait]
impl TrendSession for FakeSession {
    async fn load(&mut self, url: &str) -> anyhow::Result<()> {
        self.record(format!("load {url}"));
        match self.script.load_error {
            Some(msg) => Err(anyhow::anyhow!(msg)),
            None => Ok(()),
        }
    }

    async fn remove_overlay(&mut self) -> anyhow::Result<bool> {
        self.record("overlay");
        if self.script.overlay_error {
            anyhow::bail!("stale element");
        }
        Ok(!self.script.overlay_absent)
    }

    async fn trend_labels(&mut self, limit: usize) -> anyhow::Result<Vec<String>> {
        self.record(format!("labels {limit}"));
        if let Some(msg) = self.script.labels_error {
            anyhow::bail!(msg);
        }
        // Ignores `limit` so the caller's truncation is exercised.
        Ok(self.script.labels.iter().map(|s| s.to_string()).collect())
    }

    async fn open_detail(
        &mut self,
        index: usize,
    ) -> anyhow::Result<Option<Vec<(String, String)>>> {
        self.record(format!("open {index}"));
        match self.script.details.get(&index).cloned() {
            None => Ok(Some(Vec::new())),
            Some(Detail::Stats(pairs)) => {
                self.open = Some(index);
                Ok(Some(
                    pairs
                        .into_iter()
                        .map(|(l, v)| (l.to_string(), v.to_string()))
                        .collect(),
                ))
            }
            Some(Detail::NotOpened) => Ok(None),
            Some(Detail::Error(msg)) => Err(anyhow::anyhow!(msg)),
        }
    }

    async fn close_detail(&mut self) -> anyhow::Result<()> {
        let index = self.open.take();
        self.record(format!("close {index:?}"));
        match index {
            Some(i) if self.script.close_errors.contains(&i) => {
                anyhow::bail!("close button not found")
            }
            _ => Ok(()),
        }
    }

    async fn shutdown(&mut self) -> anyhow::Result<()> {
        self.record("shutdown");
        if self.script.shutdown_error {
            anyhow::bail!("browser already gone");
        }
        Ok(())
    }
}

struct Upper;

#[async_trait]
impl Translator for Upper {
    async fn translate(&self, text: &str, target_lang: &str) -> anyhow::Result<String> {
        assert_eq!(target_lang, "en");
        Ok(text.to_uppercase())
    }
}

struct FailsOn(&'static str);

#[async_trait]
impl Translator for FailsOn {
    async fn translate(&self, text: &str, _target_lang: &str) -> anyhow::Result<String> {
        if text == self.0 {
            anyhow::bail!("quota exceeded");
        }
        Ok(format!("[{text}]"))
    }
}

fn opts() -> ScrapeOptions {
    ScrapeOptions {
        pacing: Pacing::none(),
        ..ScrapeOptions::new("https://trends24.in/")
    }
}

fn shutdowns(log: &Log) -> usize {
    log.lock().unwrap().iter().filter(|e| *e == "shutdown").count()
}

#[tokio::test]
async fn dialog_stats_override_parsed_volume() {
    common::init_test_tracing();
    let (session, log) = FakeSession::new(Script {
        labels: vec!["Liverpool255K", "Trudeau"],
        details: HashMap::from([(
            0,
            Detail::Stats(vec![("Trending for", "5 hrs"), ("Total Tweets", "300K")]),
        )]),
        ..Default::default()
    });

    let items = scrape_trends(session, &PassThrough, &opts()).await.unwrap();

    assert_eq!(items.len(), 2);
    let first = &items[0];
    assert_eq!(first.raw_text, "Liverpool255K");
    assert_eq!(first.parsed_volume, "255K");
    assert_eq!(first.record.trend_text, "Liverpool");
    assert_eq!(first.record.volume, "300K");
    assert_eq!(first.record.trending_for, "5 hrs");
    assert_eq!(first.detail, StepStatus::Success);
    assert_eq!(first.close, StepStatus::Success);
    assert_eq!(first.translation, StepStatus::Success);

    let second = &items[1];
    assert_eq!(second.record.volume, "");
    assert!(matches!(second.detail, StepStatus::Degraded(_)));
    assert_eq!(shutdowns(&log), 1);
}

#[tokio::test]
async fn items_are_processed_in_page_order() {
    let (session, log) = FakeSession::new(Script {
        labels: vec!["A1K", "B2K", "C3K"],
        ..Default::default()
    });

    let items = scrape_trends(session, &PassThrough, &opts()).await.unwrap();

    let names: Vec<_> = items.iter().map(|i| i.record.trend_text.as_str()).collect();
    assert_eq!(names, ["A", "B", "C"]);
    let events = log.lock().unwrap().clone();
    let opens: Vec<_> = events.iter().filter(|e| e.starts_with("open")).cloned().collect();
    assert_eq!(opens, ["open 0", "open 1", "open 2"]);
    assert_eq!(events.first().map(String::as_str), Some("load https://trends24.in/"));
    assert_eq!(events.last().map(String::as_str), Some("shutdown"));
}

#[tokio::test]
async fn top_n_is_honoured_even_if_the_session_returns_more() {
    let (session, log) = FakeSession::new(Script {
        labels: vec!["A", "B", "C", "D", "E"],
        ..Default::default()
    });
    let opts = ScrapeOptions { top_n: 3, ..opts() };

    let items = scrape_trends(session, &PassThrough, &opts).await.unwrap();

    assert_eq!(items.len(), 3);
    assert!(log.lock().unwrap().contains(&"labels 3".to_string()));
}

#[tokio::test]
async fn missing_dialog_and_detail_errors_are_recorded_per_item() {
    let (session, _log) = FakeSession::new(Script {
        labels: vec!["One1K", "Two2K"],
        details: HashMap::from([(0, Detail::NotOpened), (1, Detail::Error("click intercepted"))]),
        ..Default::default()
    });

    let items = scrape_trends(session, &PassThrough, &opts()).await.unwrap();

    assert_eq!(items[0].detail, StepStatus::Degraded("dialog did not open".into()));
    assert_eq!(items[0].record.volume, "1K");
    assert_eq!(items[0].record.trending_for, "");
    match &items[1].detail {
        StepStatus::Failed(why) => assert!(why.contains("click intercepted")),
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(items[1].record.volume, "2K");
}

#[tokio::test]
async fn close_failure_does_not_stop_the_run() {
    let (session, _log) = FakeSession::new(Script {
        labels: vec!["A", "B"],
        details: HashMap::from([
            (0, Detail::Stats(vec![("Trending for", "1 hr")])),
            (1, Detail::Stats(vec![("Trending for", "2 hrs")])),
        ]),
        close_errors: HashSet::from([0]),
        ..Default::default()
    });

    let items = scrape_trends(session, &PassThrough, &opts()).await.unwrap();

    assert!(matches!(items[0].close, StepStatus::Failed(_)));
    assert_eq!(items[0].record.trending_for, "1 hr");
    assert_eq!(items[1].close, StepStatus::Success);
    assert_eq!(items[1].record.trending_for, "2 hrs");
}

#[tokio::test]
async fn translation_failure_keeps_the_original_text() {
    let (session, _log) = FakeSession::new(Script {
        labels: vec!["Hola10K", "Adiós20K"],
        ..Default::default()
    });

    let items = scrape_trends(session, &FailsOn("Hola"), &opts()).await.unwrap();

    assert_eq!(items[0].record.trend_text, "Hola");
    assert!(matches!(items[0].translation, StepStatus::Failed(_)));
    assert_eq!(items[1].record.trend_text, "[Adiós]");
    assert_eq!(items[1].translation, StepStatus::Success);
}

#[tokio::test]
async fn translation_is_skipped_when_disabled_or_empty() {
    let (session, _log) = FakeSession::new(Script {
        labels: vec!["dólar5K", "12.5K"],
        ..Default::default()
    });
    let (session2, _log2) = FakeSession::new(Script {
        labels: vec!["dólar5K"],
        ..Default::default()
    });

    let items = scrape_trends(session, &Upper, &opts()).await.unwrap();
    assert_eq!(items[0].record.trend_text, "DÓLAR");
    assert_eq!(items[1].record.trend_text, "");
    assert_eq!(items[1].translation, StepStatus::Skipped);

    let off = ScrapeOptions {
        translate: false,
        ..opts()
    };
    let items = scrape_trends(session2, &Upper, &off).await.unwrap();
    assert_eq!(items[0].record.trend_text, "dólar");
    assert_eq!(items[0].translation, StepStatus::Skipped);
}

#[tokio::test]
async fn strict_policy_keeps_trailing_numbers() {
    let (session, _log) = FakeSession::new(Script {
        labels: vec!["Area 51", "Liverpool 299 K"],
        ..Default::default()
    });
    let strict = ScrapeOptions {
        policy: SuffixPolicy::UnitRequired,
        translate: false,
        ..opts()
    };

    let items = scrape_trends(session, &PassThrough, &strict).await.unwrap();

    assert_eq!(items[0].record.trend_text, "Area 51");
    assert_eq!(items[0].parsed_volume, "");
    assert_eq!(items[1].record.volume, "299 K");
}

#[tokio::test]
async fn overlay_failure_is_not_fatal() {
    let (session, log) = FakeSession::new(Script {
        overlay_error: true,
        labels: vec!["A"],
        ..Default::default()
    });

    let items = scrape_trends(session, &PassThrough, &opts()).await.unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(shutdowns(&log), 1);
}

#[tokio::test]
async fn page_without_overlay_is_scraped_normally() {
    let (session, log) = FakeSession::new(Script {
        overlay_absent: true,
        labels: vec!["Rust12K", "Cargo"],
        details: HashMap::from([(0, Detail::Stats(vec![("Total Tweets", "15K")]))]),
        ..Default::default()
    });

    let items = scrape_trends(session, &PassThrough, &opts()).await.unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].record.trend_text, "Rust");
    assert_eq!(items[0].detail, StepStatus::Success);
    let log = log.lock().unwrap();
    let overlay = log.iter().position(|e| e == "overlay").unwrap();
    let labels = log.iter().position(|e| e.starts_with("labels")).unwrap();
    assert!(overlay < labels);
    assert_eq!(log.iter().filter(|e| *e == "shutdown").count(), 1);
}

#[tokio::test]
async fn load_failure_is_fatal_and_still_shuts_down() {
    let (session, log) = FakeSession::new(Script {
        load_error: Some("net::ERR_NAME_NOT_RESOLVED"),
        labels: vec!["A"],
        ..Default::default()
    });

    let err = scrape_trends(session, &PassThrough, &opts()).await.unwrap_err();

    assert!(matches!(err, TrendError::Scrape(_)));
    assert!(err.to_string().contains("ERR_NAME_NOT_RESOLVED"));
    assert_eq!(shutdowns(&log), 1);
    assert!(!log.lock().unwrap().iter().any(|e| e.starts_with("labels")));
}

#[tokio::test]
async fn link_discovery_failure_is_fatal_and_still_shuts_down() {
    let (session, log) = FakeSession::new(Script {
        labels_error: Some("no such window"),
        ..Default::default()
    });

    let err = scrape_trends(session, &PassThrough, &opts()).await.unwrap_err();

    assert!(matches!(err, TrendError::Scrape(_)));
    assert_eq!(shutdowns(&log), 1);
}

#[tokio::test]
async fn shutdown_error_does_not_hide_results() {
    let (session, log) = FakeSession::new(Script {
        labels: vec!["A"],
        shutdown_error: true,
        ..Default::default()
    });

    let items = scrape_trends(session, &PassThrough, &opts()).await.unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(shutdowns(&log), 1);
}

#[tokio::test]
async fn empty_page_yields_no_items() {
    let (session, log) = FakeSession::new(Script::default());

    let items = scrape_trends(session, &PassThrough, &opts()).await.unwrap();

    assert!(items.is_empty());
    assert_eq!(shutdowns(&log), 1);
}
