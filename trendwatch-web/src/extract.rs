//! Splitting trend link labels and reading detail-dialog stats.
//!
//! Link labels on the aggregator glue the tweet volume onto the trend name
//! ("Liverpool255K", "#PartGlove1.4M"). [`separate_trend_and_volume`] pulls a
//! trailing numeric run, with an optional `k`/`m` unit, off the end.
//!
//! A trailing number that is part of the name is indistinguishable from a
//! volume: "Area 51" splits into `("Area", "51")`, and re-parsing the trend
//! text of an already split label can strip further digits. Callers that
//! would rather keep such names intact can opt into
//! [`SuffixPolicy::UnitRequired`].

use regex::Regex;
use std::sync::LazyLock;

// A trailing `\n` is tolerated before the end anchor.
static VOLUME_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9,.\s]+[kKmM]?)\n?\z").expect("volume suffix pattern is valid")
});

static UNIT_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9,.\s]*[0-9][0-9,.\s]*[kKmM])\n?\z").expect("unit suffix pattern is valid")
});

/// Which trailing runs count as a volume.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SuffixPolicy {
    /// Any trailing run of digits, commas, dots and whitespace, with an
    /// optional unit letter.
    #[default]
    Compatible,
    /// Only runs that contain a digit and end in `k`, `K`, `m` or `M`.
    UnitRequired,
}

impl SuffixPolicy {
    fn pattern(self) -> &'static Regex {
        match self {
            SuffixPolicy::Compatible => &VOLUME_SUFFIX,
            SuffixPolicy::UnitRequired => &UNIT_SUFFIX,
        }
    }
}

/// Split `raw_text` into `(trend_text, volume)` under [`SuffixPolicy::Compatible`].
///
/// ```
/// use trendwatch_web::extract::separate_trend_and_volume;
///
/// assert_eq!(
///     separate_trend_and_volume("Liverpool255K"),
///     ("Liverpool".to_string(), "255K".to_string())
/// );
/// assert_eq!(
///     separate_trend_and_volume("Trudeau"),
///     ("Trudeau".to_string(), String::new())
/// );
/// ```
pub fn separate_trend_and_volume(raw_text: &str) -> (String, String) {
    separate_with_policy(raw_text, SuffixPolicy::Compatible)
}

/// Split `raw_text` into `(trend_text, volume)`. Both parts are trimmed; the
/// volume is empty when no suffix matches.
pub fn separate_with_policy(raw_text: &str, policy: SuffixPolicy) -> (String, String) {
    match policy.pattern().captures(raw_text).and_then(|c| c.get(1)) {
        Some(m) => (
            raw_text[..m.start()].trim().to_string(),
            m.as_str().trim().to_string(),
        ),
        None => (raw_text.trim().to_string(), String::new()),
    }
}

pub const TRENDING_FOR_LABEL: &str = "Trending for";
pub const TOTAL_TWEETS_LABEL: &str = "Total Tweets";

/// Stats read from the detail dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailStats {
    pub trending_for: Option<String>,
    pub total_tweets: Option<String>,
}

impl DetailStats {
    pub fn is_empty(&self) -> bool {
        self.trending_for.is_none() && self.total_tweets.is_none()
    }
}

/// Collect the known stats from `(label, value)` pairs. Labels must match
/// exactly after trimming; a repeated label overwrites the earlier value.
pub fn detail_stats<I, L, V>(pairs: I) -> DetailStats
where
    I: IntoIterator<Item = (L, V)>,
    L: AsRef<str>,
    V: AsRef<str>,
{
    let mut stats = DetailStats::default();
    for (label, value) in pairs {
        let value = value.as_ref().trim().to_string();
        match label.as_ref().trim() {
            TRENDING_FOR_LABEL => stats.trending_for = Some(value),
            TOTAL_TWEETS_LABEL => stats.total_tweets = Some(value),
            _ => {}
        }
    }
    stats
}

/// One row of trend output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrendRecord {
    pub trend_text: String,
    /// Display string such as "1.4M" or "255K"; may be empty.
    pub volume: String,
    /// Duration from the detail dialog; may be empty.
    pub trending_for: String,
}

impl TrendRecord {
    /// Build a record from a parsed label and whatever the dialog yielded.
    /// "Total Tweets" replaces the parsed volume.
    pub fn from_parts(trend_text: String, parsed_volume: String, stats: &DetailStats) -> Self {
        Self {
            trend_text,
            volume: stats.total_tweets.clone().unwrap_or(parsed_volume),
            trending_for: stats.trending_for.clone().unwrap_or_default(),
        }
    }
}
