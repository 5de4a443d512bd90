use anyhow::{Context, anyhow};
use async_trait::async_trait;
use tracing::{debug, info};
use trendwatch_common::TrendError;
use trendwatch_drivers::browser::driver::{DriverOptions, TrendDriver};
use trendwatch_drivers::browser::pacing::{Pacing, pause};
use trendwatch_drivers::browser::page::{TrendElement, TrendPage};

use super::TrendSession;

pub const OVERLAY: &str = "div.view-all-button.left-0.flex.justify-center.w-full.sticky.bottom-2";
pub const TREND_LINKS: &str = "ol.trend-card__list li a";
pub const OPEN_DIALOG: &str = "#trendcheck-dialog[open]";
pub const STAT_BLOCKS: &str = "#trendcheck-dialog .tc-stat-block";
pub const STAT_LABEL: &str = "dt.tc-stat-label";
pub const STAT_VALUE: &str = "dd.tc-stat-value";
pub const CLOSE_BUTTON: &str = "#trendcheck-dialog .close-modal";

/// [`TrendSession`] over a live WebDriver browser.
pub struct WebDriverSession {
    driver: Option<TrendDriver>,
    page: TrendPage,
    pacing: Pacing,
}

impl WebDriverSession {
    /// Start a browser session. This is the only browser failure that is
    /// reported before a scrape begins.
    pub async fn connect(
        opts: &DriverOptions,
        pacing: Pacing,
    ) -> trendwatch_common::Result<Self> {
        let driver = TrendDriver::connect(opts)
            .await
            .map_err(TrendError::Driver)?;
        let page = driver.page();
        Ok(Self {
            driver: Some(driver),
            page,
            pacing,
        })
    }

    async fn link(&self, index: usize) -> anyhow::Result<TrendElement> {
        self.page
            .find_all(TREND_LINKS)
            .await?
            .into_iter()
            .nth(index)
            .ok_or_else(|| anyhow!("trend link {index} is no longer on the page"))
    }
}

async fn stat_pair(block: &TrendElement) -> anyhow::Result<Option<(String, String)>> {
    let label = block.find(STAT_LABEL).await?;
    let value = block.find(STAT_VALUE).await?;
    let (Some(label), Some(value)) = (label, value) else {
        return Ok(None);
    };
    Ok(Some((
        label.text().await?.trim().to_string(),
        value.text().await?.trim().to_string(),
    )))
}

#[async_trait]
impl TrendSession for WebDriverSession {
    async fn load(&mut self, url: &str) -> anyhow::Result<()> {
        self.page.goto(url).await
    }

    async fn remove_overlay(&mut self) -> anyhow::Result<bool> {
        self.page.remove_element(OVERLAY).await
    }

    async fn trend_labels(&mut self, limit: usize) -> anyhow::Result<Vec<String>> {
        let links = self.page.find_all(TREND_LINKS).await?;
        let mut labels = Vec::with_capacity(limit.min(links.len()));
        for link in links.iter().take(limit) {
            labels.push(link.text().await?.trim().to_string());
        }
        Ok(labels)
    }

    async fn open_detail(
        &mut self,
        index: usize,
    ) -> anyhow::Result<Option<Vec<(String, String)>>> {
        let link = self.link(index).await?;
        self.page.scroll_into_view(&link).await?;
        pause(self.pacing.after_scroll).await;
        self.page.click_or_js(&link).await?;

        if self
            .page
            .wait_for(OPEN_DIALOG, self.pacing.dialog_timeout)
            .await?
            .is_none()
        {
            debug!(target: "scrape.webdriver", index, "detail dialog did not open");
            return Ok(None);
        }

        let mut pairs = Vec::new();
        for block in self.page.find_all(STAT_BLOCKS).await? {
            if let Some(pair) = stat_pair(&block).await? {
                pairs.push(pair);
            }
        }
        Ok(Some(pairs))
    }

    async fn close_detail(&mut self) -> anyhow::Result<()> {
        let button = self
            .page
            .find_all(CLOSE_BUTTON)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("dialog close button not found"))?;
        button.click().await.context("clicking the dialog close button")
    }

    async fn shutdown(&mut self) -> anyhow::Result<()> {
        match self.driver.take() {
            Some(driver) => {
                driver.close().await?;
                info!(target: "scrape.webdriver", "browser closed");
                Ok(())
            }
            None => Ok(()),
        }
    }
}
