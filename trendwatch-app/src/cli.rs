//! Command-line interface. Flags override the configuration file.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "trendwatch",
    author,
    version,
    about = "Print trending topics from trends24 and the X API"
)]
pub struct Cli {
    /// YAML configuration file. When omitted, `trendwatch.yaml` is used if present.
    #[arg(long, global = true, env = "TRENDWATCH_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scrape trend lists from the aggregator in a browser.
    Scrape(ScrapeArgs),
    /// Fetch v2 trends for a WOEID.
    Api(ApiArgs),
    /// Worldwide trends, then the trends of a named place (v1.1).
    Locations(LocationsArgs),
    /// Split labels into trend text and volume.
    Parse(ParseArgs),
}

#[derive(Args, Debug)]
pub struct ScrapeArgs {
    /// Page to scrape; repeatable. Defaults to the configured targets.
    #[arg(long = "url")]
    pub urls: Vec<String>,

    /// How many trends to take from each page.
    #[arg(long)]
    pub top: Option<usize>,

    #[arg(long)]
    pub no_translate: bool,

    /// Only treat suffixes ending in k/M as volumes.
    #[arg(long)]
    pub strict_volume: bool,

    #[arg(long)]
    pub headless: bool,

    /// WebDriver endpoint.
    #[arg(long, env = "TRENDWATCH_WEBDRIVER_URL")]
    pub webdriver: Option<String>,
}

#[derive(Args, Debug)]
pub struct ApiArgs {
    /// Where On Earth ID; defaults to the configured one (United States).
    #[arg(long)]
    pub woeid: Option<u64>,
}

#[derive(Args, Debug)]
pub struct LocationsArgs {
    /// Place name, matched case-insensitively.
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub top: Option<usize>,
}

#[derive(Args, Debug)]
pub struct ParseArgs {
    #[arg(required = true)]
    pub text: Vec<String>,

    #[arg(long)]
    pub strict_volume: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrape_accepts_repeated_urls_and_flags() {
        let cli = Cli::parse_from([
            "trendwatch",
            "scrape",
            "--url",
            "https://trends24.in/",
            "--url",
            "https://trends24.in/japan/",
            "--top",
            "5",
            "--no-translate",
            "--strict-volume",
            "--headless",
            "--webdriver",
            "http://127.0.0.1:4444",
        ]);
        let Command::Scrape(args) = cli.command else {
            panic!("expected scrape");
        };
        assert_eq!(args.urls.len(), 2);
        assert_eq!(args.top, Some(5));
        assert!(args.no_translate && args.strict_volume && args.headless);
        assert_eq!(args.webdriver.as_deref(), Some("http://127.0.0.1:4444"));
    }

    #[test]
    fn scrape_defaults_leave_config_in_charge() {
        let cli = Cli::parse_from(["trendwatch", "scrape"]);
        let Command::Scrape(args) = cli.command else {
            panic!("expected scrape");
        };
        assert!(args.urls.is_empty());
        assert_eq!(args.top, None);
        assert!(!args.no_translate);
    }

    #[test]
    fn global_config_flag_after_subcommand() {
        let cli = Cli::parse_from(["trendwatch", "api", "--woeid", "1", "--config", "alt.yaml"]);
        assert_eq!(cli.config, Some(PathBuf::from("alt.yaml")));
        let Command::Api(args) = cli.command else {
            panic!("expected api");
        };
        assert_eq!(args.woeid, Some(1));
    }

    #[test]
    fn locations_takes_name_and_top() {
        let cli = Cli::parse_from(["trendwatch", "locations", "--name", "Tokyo", "--top", "3"]);
        let Command::Locations(args) = cli.command else {
            panic!("expected locations");
        };
        assert_eq!(args.name.as_deref(), Some("Tokyo"));
        assert_eq!(args.top, Some(3));
    }

    #[test]
    fn parse_requires_text() {
        assert!(Cli::try_parse_from(["trendwatch", "parse"]).is_err());
        let cli = Cli::parse_from(["trendwatch", "parse", "Liverpool255K", "Area 51"]);
        let Command::Parse(args) = cli.command else {
            panic!("expected parse");
        };
        assert_eq!(args.text, ["Liverpool255K", "Area 51"]);
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
