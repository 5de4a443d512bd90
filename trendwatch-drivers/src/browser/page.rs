use anyhow::{Context, Result};
use fantoccini::{elements::Element, error::CmdError, Client, Locator};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

const REMOVE_SCRIPT: &str = "arguments[0].remove();";
const SCROLL_SCRIPT: &str = "arguments[0].scrollIntoView(true);";
const CLICK_SCRIPT: &str = "arguments[0].click();";

/// DOM helpers over the session's active window.
#[derive(Clone)]
pub struct TrendPage {
    client: Client,
}

impl TrendPage {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn goto(&self, url: &str) -> Result<()> {
        debug!(target: "browser.page", %url, "navigating");
        self.client
            .goto(url)
            .await
            .with_context(|| format!("failed to load {url}"))
    }

    /// All elements matching `selector`; empty when nothing matches.
    pub async fn find_all(&self, selector: &str) -> Result<Vec<TrendElement>> {
        let elements = self
            .client
            .find_all(Locator::Css(selector))
            .await
            .with_context(|| format!("lookup failed for {selector}"))?;
        Ok(elements.into_iter().map(TrendElement::new).collect())
    }

    /// Wait up to `timeout` for `selector` to appear. `Ok(None)` on timeout.
    pub async fn wait_for(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Option<TrendElement>> {
        match self
            .client
            .wait()
            .at_most(timeout)
            .for_element(Locator::Css(selector))
            .await
        {
            Ok(element) => Ok(Some(TrendElement::new(element))),
            Err(CmdError::WaitTimeout) => Ok(None),
            Err(e) => Err(e).with_context(|| format!("waiting for {selector} failed")),
        }
    }

    /// Run `script` with the given arguments and return its result.
    pub async fn execute(&self, script: &str, args: Vec<Value>) -> Result<Value> {
        self.client
            .execute(script, args)
            .await
            .context("script execution failed")
    }

    /// Remove the first element matching `selector` from the DOM.
    /// Returns `false` when there was nothing to remove.
    pub async fn remove_element(&self, selector: &str) -> Result<bool> {
        let element = match self.client.find(Locator::Css(selector)).await {
            Ok(element) => element,
            Err(e) if e.is_no_such_element() => return Ok(false),
            Err(e) => return Err(e).with_context(|| format!("lookup failed for {selector}")),
        };
        self.execute(REMOVE_SCRIPT, vec![serde_json::to_value(&element)?])
            .await?;
        Ok(true)
    }

    pub async fn scroll_into_view(&self, element: &TrendElement) -> Result<()> {
        self.execute(SCROLL_SCRIPT, vec![element.as_arg()?]).await?;
        Ok(())
    }

    /// Native click, falling back to a script click when the element is
    /// covered or otherwise not interactable.
    pub async fn click_or_js(&self, element: &TrendElement) -> Result<()> {
        if let Err(e) = element.element.click().await {
            warn!(target: "browser.page", error = %e, "native click failed; using script click");
            self.execute(CLICK_SCRIPT, vec![element.as_arg()?]).await?;
        }
        Ok(())
    }
}

/// A located DOM element.
#[derive(Clone)]
pub struct TrendElement {
    element: Element,
}

impl TrendElement {
    fn new(element: Element) -> Self {
        Self { element }
    }

    fn as_arg(&self) -> Result<Value> {
        Ok(serde_json::to_value(&self.element)?)
    }

    /// Rendered text of the element.
    pub async fn text(&self) -> Result<String> {
        self.element.text().await.map_err(anyhow::Error::from)
    }

    /// First descendant matching `selector`, or `None`.
    pub async fn find(&self, selector: &str) -> Result<Option<TrendElement>> {
        match self.element.find(Locator::Css(selector)).await {
            Ok(element) => Ok(Some(TrendElement::new(element))),
            Err(e) if e.is_no_such_element() => Ok(None),
            Err(e) => Err(e).with_context(|| format!("lookup failed for {selector}")),
        }
    }

    pub async fn click(&self) -> Result<()> {
        self.element.click().await.map_err(anyhow::Error::from)
    }
}
