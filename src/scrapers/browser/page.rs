//! [`SearchPage`] implementation over a live CDP page.

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::{Element, Page};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::scrapers::extract::locators;
use crate::scrapers::page::SearchPage;
use crate::scrapers::ScrapeError;

/// Render and lookup pauses for a live page.
///
/// The map UI renders listings and the detail panel lazily, so interactions
/// are followed by fixed pauses rather than load events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageTiming {
    /// Pause after submitting the search for the results feed to render (ms).
    #[serde(default = "default_search_pause_ms")]
    pub search_pause_ms: u64,

    /// Pause after focusing a listing for the detail panel to render (ms).
    #[serde(default = "default_focus_pause_ms")]
    pub focus_pause_ms: u64,

    /// Bound on any single element lookup (ms).
    #[serde(default = "default_lookup_timeout_ms")]
    pub lookup_timeout_ms: u64,
}

fn default_search_pause_ms() -> u64 {
    5_000
}

fn default_focus_pause_ms() -> u64 {
    3_000
}

fn default_lookup_timeout_ms() -> u64 {
    5_000
}

impl Default for PageTiming {
    fn default() -> Self {
        Self {
            search_pause_ms: default_search_pause_ms(),
            focus_pause_ms: default_focus_pause_ms(),
            lookup_timeout_ms: default_lookup_timeout_ms(),
        }
    }
}

/// A live map-search page driven over CDP.
pub struct ChromePage {
    page: Page,
    timing: PageTiming,
}

impl ChromePage {
    pub(crate) fn new(page: Page, timing: PageTiming) -> Self {
        Self { page, timing }
    }

    fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.timing.lookup_timeout_ms)
    }

    async fn listing_links(&self) -> Result<Vec<Element>, ScrapeError> {
        tokio::time::timeout(
            self.lookup_timeout(),
            self.page.find_elements(locators::LISTING_LINKS),
        )
        .await
        .map_err(|_| ScrapeError::Browser("timed out enumerating listings".to_string()))?
        .map_err(|error| ScrapeError::Browser(error.to_string()))
    }
}

#[async_trait]
impl SearchPage for ChromePage {
    async fn submit_search(&self, term: &str) -> Result<(), ScrapeError> {
        let input = self
            .page
            .find_element(locators::SEARCH_INPUT)
            .await
            .map_err(|_| ScrapeError::SearchBoxMissing)?;

        input
            .click()
            .await
            .map_err(|error| ScrapeError::Browser(error.to_string()))?;
        input
            .type_str(term)
            .await
            .map_err(|error| ScrapeError::Browser(error.to_string()))?;
        input
            .press_key("Enter")
            .await
            .map_err(|error| ScrapeError::Browser(error.to_string()))?;

        tokio::time::sleep(Duration::from_millis(self.timing.search_pause_ms)).await;
        Ok(())
    }

    async fn scroll_results(&self, delta: i64) -> Result<(), ScrapeError> {
        // The surrounding document does not move; the feed scrolls on its own.
        let script = format!(
            "(() => {{ const feed = document.querySelector(\"{feed}\"); \
             if (feed) {{ feed.scrollBy(0, {delta}); }} \
             else {{ window.scrollBy(0, {delta}); }} }})()",
            feed = locators::RESULTS_FEED,
            delta = delta,
        );

        self.page
            .evaluate(script)
            .await
            .map(|_| ())
            .map_err(|error| ScrapeError::Browser(error.to_string()))
    }

    async fn listing_count(&self) -> Result<usize, ScrapeError> {
        Ok(self.listing_links().await?.len())
    }

    async fn focus_listing(&self, index: usize) -> Result<(), ScrapeError> {
        let links = self.listing_links().await?;
        let link = links
            .into_iter()
            .nth(index)
            .ok_or_else(|| ScrapeError::ListingFocus {
                index,
                reason: "listing disappeared from feed".to_string(),
            })?;

        link.click().await.map_err(|error| ScrapeError::ListingFocus {
            index,
            reason: error.to_string(),
        })?;

        tokio::time::sleep(Duration::from_millis(self.timing.focus_pause_ms)).await;
        Ok(())
    }

    async fn extract(&self, locator: &str, attribute: Option<&str>) -> Option<String> {
        let found =
            tokio::time::timeout(self.lookup_timeout(), self.page.find_element(locator)).await;
        let element = match found {
            Ok(Ok(element)) => element,
            Ok(Err(error)) => {
                debug!(locator, %error, "field not present");
                return None;
            }
            Err(_) => {
                debug!(locator, "field lookup timed out");
                return None;
            }
        };

        let value = match attribute {
            Some(name) => element.attribute(name).await.ok().flatten(),
            None => element.inner_text().await.ok().flatten(),
        };

        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}
