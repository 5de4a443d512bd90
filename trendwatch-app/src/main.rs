use anyhow::{Context, Result, anyhow};
use clap::Parser;
use std::path::Path;
use tracing::{info, warn};
use trendwatch_common::observability::{LogConfig, init_logging};
use trendwatch_config::{TargetSpec, TrendwatchConfig, TrendwatchConfigLoader};
use trendwatch_drivers::browser::driver::DriverOptions;
use trendwatch_drivers::browser::pacing::Pacing;
use trendwatch_http::{HttpClient, HttpError};
use trendwatch_social::x::{self, Credentials, XApi};
use trendwatch_web::SuffixPolicy;
use trendwatch_web::extract::separate_with_policy;
use trendwatch_web::scrape::{PassThrough, ScrapeOptions, WebDriverSession, scrape_trends};

mod cli;
mod table;

use cli::{ApiArgs, Cli, Command, LocationsArgs, ParseArgs, ScrapeArgs};

const DEFAULT_CONFIG_FILE: &str = "trendwatch.yaml";

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let cfg = load_config(cli.config.as_deref())?;
    init_logging(LogConfig {
        log_dir: cfg.logging.dir.clone(),
        emit_stderr: cfg.logging.stderr,
        format: cfg.logging.format,
        ..LogConfig::default()
    })?;

    match cli.command {
        Command::Scrape(args) => run_scrape(&cfg, args).await,
        Command::Api(args) => run_api(&cfg, args).await,
        Command::Locations(args) => run_locations(&cfg, args).await,
        Command::Parse(args) => {
            run_parse(args);
            Ok(())
        }
    }
}

/// An explicit `--config` must exist; the default file is optional.
fn load_config(path: Option<&Path>) -> Result<TrendwatchConfig> {
    let loader = TrendwatchConfigLoader::new();
    let loader = match path {
        Some(p) => loader.with_file(p),
        None => loader.with_optional_file(DEFAULT_CONFIG_FILE),
    };
    loader.load().context("failed to load configuration")
}

fn policy(strict: bool) -> SuffixPolicy {
    if strict {
        SuffixPolicy::UnitRequired
    } else {
        SuffixPolicy::Compatible
    }
}

async fn run_scrape(cfg: &TrendwatchConfig, args: ScrapeArgs) -> Result<()> {
    let scrape = &cfg.scrape;
    let targets: Vec<TargetSpec> = if args.urls.is_empty() {
        scrape.targets.clone()
    } else {
        args.urls
            .iter()
            .map(|url| {
                let top_n = args.top.unwrap_or(trendwatch_config::DEFAULT_TOP_N);
                TargetSpec {
                    title: format!("Top {top_n} Trends ({url})"),
                    url: url.clone(),
                    top_n,
                }
            })
            .collect()
    };
    if targets.is_empty() {
        return Err(anyhow!("no scrape targets configured"));
    }

    let driver_opts = DriverOptions {
        webdriver_url: args
            .webdriver
            .clone()
            .unwrap_or_else(|| scrape.webdriver_url.clone()),
        headless: args.headless || scrape.headless,
        ..DriverOptions::default()
    };

    for (i, target) in targets.iter().enumerate() {
        if i > 0 {
            println!("\n{}\n", table::section_rule());
        }
        let opts = ScrapeOptions {
            url: target.url.clone(),
            top_n: args.top.unwrap_or(target.top_n),
            translate: scrape.translate && !args.no_translate,
            target_lang: scrape.target_lang.clone(),
            policy: policy(args.strict_volume || scrape.strict_volume),
            pacing: Pacing::default(),
        };
        println!("Scraping the top {} trends from {} ...", opts.top_n, opts.url);

        let session = WebDriverSession::connect(&driver_opts, opts.pacing)
            .await
            .with_context(|| {
                format!("could not start a browser via {}", driver_opts.webdriver_url)
            })?;
        let items = scrape_trends(session, &PassThrough, &opts).await?;

        let degraded = items.iter().filter(|i| !i.detail.is_success()).count();
        if degraded > 0 {
            warn!(
                target: "app.scrape",
                url = %opts.url,
                degraded,
                "some trends have no detail stats"
            );
        }
        let records: Vec<_> = items.into_iter().map(|i| i.record).collect();
        println!("\n{}", table::render_table(&target.title, &records));
    }
    Ok(())
}

fn credentials(cfg: &TrendwatchConfig) -> Credentials {
    // Plain `API_KEY`-style variables (often from `.env`) fill the gaps.
    fn pick(configured: &Option<String>, var: &str) -> Option<String> {
        configured.clone().or_else(|| {
            std::env::var(var)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        })
    }
    let api = &cfg.api;
    Credentials {
        api_key: pick(&api.api_key, "API_KEY"),
        api_secret_key: pick(&api.api_secret_key, "API_SECRET_KEY"),
        bearer_token: pick(&api.bearer_token, "BEARER_TOKEN"),
    }
}

async fn connect_api(cfg: &TrendwatchConfig) -> Result<XApi> {
    let http = HttpClient::new(&cfg.api.base_url)?;
    let bearer = x::resolve_bearer(&http, &credentials(cfg)).await?;
    Ok(XApi::with_client(http, bearer))
}

fn fetch_failure(e: HttpError) -> anyhow::Error {
    match e {
        HttpError::Api {
            status, message, ..
        } => anyhow!("Failed to fetch trends: {} - {}", status.as_u16(), message),
        other => anyhow!("Failed to fetch trends: {other}"),
    }
}

async fn run_api(cfg: &TrendwatchConfig, args: ApiArgs) -> Result<()> {
    let api = connect_api(cfg).await?;
    let woeid = args.woeid.unwrap_or(cfg.api.woeid);
    info!(target: "app.api", woeid, "fetching v2 trends");

    let trends = api.trends_by_woeid(woeid).await.map_err(fetch_failure)?;
    println!("Trends:");
    for trend in trends {
        let count = trend
            .tweet_count
            .map_or_else(|| "N/A".to_string(), |n| n.to_string());
        println!("Trend: {}, Tweet Count: {}", trend.trend_name, count);
    }
    Ok(())
}

async fn print_place_trends(api: &XApi, woeid: u64, top: usize) -> Result<()> {
    match api.place_trends(woeid).await.map_err(fetch_failure)? {
        Some(place) => {
            for trend in place.trends.iter().take(top) {
                println!("{}", trend.name);
            }
        }
        None => warn!(target: "app.locations", woeid, "no trends returned"),
    }
    Ok(())
}

async fn run_locations(cfg: &TrendwatchConfig, args: LocationsArgs) -> Result<()> {
    let api = connect_api(cfg).await?;
    let top = args.top.unwrap_or(cfg.api.top_n);
    let name = args.name.unwrap_or_else(|| cfg.api.location.clone());

    print_place_trends(&api, x::WORLDWIDE, top).await?;

    let locations = api.available_locations().await.map_err(fetch_failure)?;
    match x::find_woeid(&locations, &name) {
        Some(woeid) => print_place_trends(&api, woeid, top).await,
        None => {
            println!("WOEID for {name} not found.");
            Ok(())
        }
    }
}

fn run_parse(args: ParseArgs) {
    let suffix = policy(args.strict_volume);
    for raw in &args.text {
        let (trend, volume) = separate_with_policy(raw, suffix);
        println!("{trend} | {volume}");
    }
}
