use crate::browser::page::TrendPage;
use anyhow::{Context, Result};
use fantoccini::{Client, ClientBuilder};
use serde_json::json;
use tracing::{debug, info};
use webdriver::capabilities::Capabilities;

pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";

/// How to reach and launch the browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverOptions {
    /// WebDriver endpoint (Chromedriver by default).
    pub webdriver_url: String,
    pub headless: bool,
    pub window_size: Option<(u32, u32)>,
    /// Appended verbatim after the generated arguments.
    pub extra_args: Vec<String>,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            webdriver_url: DEFAULT_WEBDRIVER_URL.to_string(),
            headless: false,
            window_size: None,
            extra_args: Vec::new(),
        }
    }
}

/// Chrome command-line arguments for `opts`.
pub fn build_chrome_args(opts: &DriverOptions) -> Vec<String> {
    let mut args = vec![
        "--disable-dev-shm-usage".to_string(),
        "--disable-infobars".to_string(),
    ];
    if let Some((w, h)) = opts.window_size {
        args.push(format!("--window-size={w},{h}"));
    }
    if opts.headless {
        args.push("--headless".to_string());
        args.push("--disable-gpu".to_string());
    }
    args.extend(opts.extra_args.iter().cloned());
    args
}

fn chrome_capabilities(opts: &DriverOptions) -> Capabilities {
    let mut caps = Capabilities::new();
    caps.insert(
        "goog:chromeOptions".to_string(),
        json!({ "args": build_chrome_args(opts) }),
    );
    caps
}

/// One WebDriver session. Dropping it without [`TrendDriver::close`] leaves
/// the browser window open until the driver service reaps it.
pub struct TrendDriver {
    client: Client,
}

impl TrendDriver {
    /// Start a new session against a running WebDriver service.
    pub async fn connect(opts: &DriverOptions) -> Result<Self> {
        debug!(
            target: "browser.driver",
            url = %opts.webdriver_url,
            headless = opts.headless,
            "connecting"
        );
        let client = ClientBuilder::native()
            .capabilities(chrome_capabilities(opts))
            .connect(&opts.webdriver_url)
            .await
            .with_context(|| format!("failed to start a session at {}", opts.webdriver_url))?;
        info!(target: "browser.driver", url = %opts.webdriver_url, "session started");
        Ok(Self { client })
    }

    /// Page helpers bound to this session's active window.
    pub fn page(&self) -> TrendPage {
        TrendPage::new(self.client.clone())
    }

    /// End the session and close the browser.
    pub async fn close(self) -> Result<()> {
        self.client
            .close()
            .await
            .context("failed to close the browser session")?;
        info!(target: "browser.driver", "session closed");
        Ok(())
    }
}
