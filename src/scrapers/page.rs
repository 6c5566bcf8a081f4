//! Page abstraction over the map search UI.
//!
//! The collector and assembler are written against this trait so the
//! convergence loop and extraction pipeline can be exercised without a live
//! browser. The production implementation is
//! [`ChromePage`](super::browser::ChromePage).

use async_trait::async_trait;

use super::ScrapeError;

/// One open map-search page with a results feed and a detail panel.
///
/// Every method is a bounded wait. Extraction degrades to `None` instead of
/// erroring: a single missing field must not abort its listing.
#[async_trait]
pub trait SearchPage: Send + Sync {
    /// Type the term into the search input and trigger the search.
    async fn submit_search(&self, term: &str) -> Result<(), ScrapeError>;

    /// Scroll the results feed down by `delta` pixels.
    async fn scroll_results(&self, delta: i64) -> Result<(), ScrapeError>;

    /// Number of listing links currently rendered in the results feed.
    async fn listing_count(&self) -> Result<usize, ScrapeError>;

    /// Focus the listing at `index` (click-equivalent) and wait for its
    /// detail panel to render.
    async fn focus_listing(&self, index: usize) -> Result<(), ScrapeError>;

    /// Extract one field from the focused listing's detail panel.
    ///
    /// Returns the first match's trimmed inner text, or the value of
    /// `attribute` when given. Zero matches, lookup timeouts, and
    /// empty/whitespace-only values all map to `None`.
    async fn extract(&self, locator: &str, attribute: Option<&str>) -> Option<String>;
}
