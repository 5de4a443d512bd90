//! Loader for trendwatch configuration: optional YAML file + environment overlays.
//!
//! Precedence, lowest to highest: built-in defaults, YAML file(s) / inline
//! snippets, then `TRENDWATCH__SECTION__FIELD` environment variables. After the
//! sources are merged, `${VAR}` placeholders in string values are expanded
//! (recursively, up to [`MAXIMUM_ENV_EXPANSION_DEPTH`] hops). Credential fields
//! whose placeholder could not be resolved are treated as absent.
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::path::{Path, PathBuf};
use trendwatch_common::LogFormat;

pub const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";
pub const DEFAULT_API_BASE: &str = "https://api.x.com/";
pub const DEFAULT_TOP_N: usize = 12;
pub const UNITED_STATES_WOEID: u64 = 23424977;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TrendwatchConfig {
    pub version: Option<String>,
    pub scrape: ScrapeConfig,
    pub api: ApiConfig,
    pub logging: LoggingConfig,
}

/// Browser scrape settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    pub webdriver_url: String,
    pub headless: bool,
    pub translate: bool,
    pub target_lang: String,
    /// Only accept volume suffixes that end in a k/m unit.
    pub strict_volume: bool,
    pub targets: Vec<TargetSpec>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            webdriver_url: DEFAULT_WEBDRIVER_URL.into(),
            headless: false,
            translate: true,
            target_lang: "en".into(),
            strict_volume: false,
            targets: default_targets(),
        }
    }
}

/// One page to scrape and the title to print above its table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TargetSpec {
    pub title: String,
    pub url: String,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

fn default_targets() -> Vec<TargetSpec> {
    vec![
        TargetSpec {
            title: "Top 12 Global Trends (EN)".into(),
            url: "https://trends24.in/".into(),
            top_n: DEFAULT_TOP_N,
        },
        TargetSpec {
            title: "Top 12 US Trends (EN)".into(),
            url: "https://trends24.in/united-states/".into(),
            top_n: DEFAULT_TOP_N,
        },
    ]
}

/// X API settings. Secrets are optional; see [`ApiConfig::clear_unresolved`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(deserialize_with = "lenient_string")]
    pub api_key: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub api_secret_key: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub bearer_token: Option<String>,
    pub woeid: u64,
    /// Place name resolved through the v1.1 locations list.
    pub location: String,
    pub top_n: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.into(),
            api_key: None,
            api_secret_key: None,
            bearer_token: None,
            woeid: UNITED_STATES_WOEID,
            location: "warsaw".into(),
            top_n: 10,
        }
    }
}

impl ApiConfig {
    /// Drop credentials that are blank or still hold an unexpanded `$VAR`.
    pub fn clear_unresolved(&mut self) {
        for slot in [
            &mut self.api_key,
            &mut self.api_secret_key,
            &mut self.bearer_token,
        ] {
            if slot.as_deref().is_some_and(is_unresolved) {
                *slot = None;
            }
        }
    }
}

fn is_unresolved(s: &str) -> bool {
    let s = s.trim();
    s.is_empty() || s.starts_with('$') || s.contains("${")
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub stderr: bool,
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            stderr: true,
            dir: None,
        }
    }
}

/// Environment overrides parse numbers eagerly, so an all-digit key would
/// otherwise fail to land in a `String` field.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder over the `config` crate wiring (YAML + env overrides).
pub struct TrendwatchConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for TrendwatchConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl TrendwatchConfigLoader {
    /// Start with no files; `TRENDWATCH__` env overrides are always applied last.
    ///
    /// ```
    /// use trendwatch_config::TrendwatchConfigLoader;
    ///
    /// let config = TrendwatchConfigLoader::new()
    ///     .with_yaml_str("version: '1'\nscrape:\n  headless: true")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.version.as_deref(), Some("1"));
    /// assert!(config.scrape.headless);
    /// assert_eq!(config.scrape.targets.len(), 2);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a file that must exist; the format is inferred from the suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is skipped when missing.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet (tests, embedded defaults).
    ///
    /// ```
    /// use trendwatch_config::TrendwatchConfigLoader;
    ///
    /// let cfg = TrendwatchConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// scrape:
    ///   targets:
    ///     - title: "Japan"
    ///       url: "https://trends24.in/japan/"
    ///       top_n: 5
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.scrape.targets.len(), 1);
    /// assert_eq!(cfg.scrape.targets[0].top_n, 5);
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Merge all sources, expand `${VAR}` placeholders and deserialize.
    ///
    /// ```
    /// use trendwatch_config::TrendwatchConfigLoader;
    ///
    /// unsafe { std::env::set_var("DOCTEST_BEARER", "injected-from-env"); }
    ///
    /// let config = TrendwatchConfigLoader::new()
    ///     .with_yaml_str(r#"
    /// api:
    ///   bearer_token: "${DOCTEST_BEARER}"
    ///   api_key: "${DOCTEST_NOT_SET}"
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.api.bearer_token.as_deref(), Some("injected-from-env"));
    /// assert_eq!(config.api.api_key, None);
    ///
    /// unsafe { std::env::remove_var("DOCTEST_BEARER"); }
    /// ```
    pub fn load(self) -> Result<TrendwatchConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix("TRENDWATCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let mut typed: TrendwatchConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;
        typed.api.clear_unresolved();

        Ok(typed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expands_simple_string() {
        temp_env::with_var("TW_FOO", Some("bar"), || {
            let mut v = json!("prefix-${TW_FOO}-suffix");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("prefix-bar-suffix"));
        });
    }

    #[test]
    fn expands_in_array_and_object() {
        temp_env::with_vars(
            [("TW_CITY", Some("Warsaw")), ("TW_COUNTRY", Some("PL"))],
            || {
                let mut v = json!([
                    "hello-$TW_CITY",
                    { "loc": "${TW_CITY}-${TW_COUNTRY}" },
                    42,
                    true,
                    null
                ]);
                expand_env_in_value(&mut v);
                assert_eq!(
                    v,
                    json!(["hello-Warsaw", { "loc": "Warsaw-PL" }, 42, true, null])
                );
            },
        );
    }

    #[test]
    fn expands_recursively_across_env_values() {
        temp_env::with_vars(
            [
                ("TW_BAZ", Some("qux")),
                ("TW_BAR", Some("mid-${TW_BAZ}")),
                ("TW_FOO", Some("start-${TW_BAR}-end")),
            ],
            || {
                let mut v = json!("X=${TW_FOO}");
                expand_env_in_value(&mut v);
                assert_eq!(v, json!("X=start-mid-qux-end"));
            },
        );
    }

    #[test]
    fn stops_on_cycles() {
        temp_env::with_vars([("TW_A", Some("${TW_B}")), ("TW_B", Some("${TW_A}"))], || {
            let mut v = json!("x=${TW_A}-y");
            expand_env_in_value(&mut v);
            let s = v.as_str().unwrap();
            assert!(s.starts_with("x=") && s.ends_with("-y"));
            assert!(s.contains("${"));
        });
    }

    #[test]
    fn unknown_vars_are_left_as_is() {
        let mut v = json!("hi-${TW_DOES_NOT_EXIST}");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("hi-${TW_DOES_NOT_EXIST}"));
    }

    #[test]
    fn unresolved_credentials_are_cleared() {
        let mut api = ApiConfig {
            api_key: Some("${API_KEY}".into()),
            api_secret_key: Some("$API_SECRET_KEY".into()),
            bearer_token: Some("AAAA".into()),
            ..ApiConfig::default()
        };
        api.clear_unresolved();
        assert_eq!(api.api_key, None);
        assert_eq!(api.api_secret_key, None);
        assert_eq!(api.bearer_token.as_deref(), Some("AAAA"));

        let mut blank = ApiConfig {
            bearer_token: Some("   ".into()),
            ..ApiConfig::default()
        };
        blank.clear_unresolved();
        assert_eq!(blank.bearer_token, None);
    }

    #[test]
    fn defaults_match_the_two_trends24_pages() {
        let cfg = TrendwatchConfig::default();
        let urls: Vec<_> = cfg.scrape.targets.iter().map(|t| t.url.as_str()).collect();
        assert_eq!(
            urls,
            ["https://trends24.in/", "https://trends24.in/united-states/"]
        );
        assert!(cfg.scrape.translate);
        assert_eq!(cfg.api.woeid, UNITED_STATES_WOEID);
        assert_eq!(cfg.api.top_n, 10);
    }
}
