//! Listing discovery: search submission, scroll convergence, iteration.
//!
//! The scroll loop keeps loading the lazy results feed until either enough
//! listings are visible or the feed stops growing between two consecutive
//! polls. Both an iteration cap and a wall-clock budget bound the loop: a
//! feed that keeps rendering content indefinitely becomes a defined error
//! instead of a hang.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::extract::assemble;
use super::page::SearchPage;
use super::ScrapeError;
use crate::models::{BusinessRecord, CollectionRequest};

/// Tuning for the scroll/convergence loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Pixels per scroll step.
    #[serde(default = "default_scroll_step")]
    pub scroll_step: i64,

    /// Pause after each scroll for lazy-loaded listings to render (ms).
    #[serde(default = "default_scroll_pause_ms")]
    pub scroll_pause_ms: u64,

    /// Hard cap on scroll iterations.
    #[serde(default = "default_max_scroll_iterations")]
    pub max_scroll_iterations: usize,

    /// Hard cap on total time spent scrolling (seconds).
    #[serde(default = "default_max_scroll_secs")]
    pub max_scroll_secs: u64,
}

fn default_scroll_step() -> i64 {
    10_000
}

fn default_scroll_pause_ms() -> u64 {
    2_000
}

fn default_max_scroll_iterations() -> usize {
    60
}

fn default_max_scroll_secs() -> u64 {
    180
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            scroll_step: default_scroll_step(),
            scroll_pause_ms: default_scroll_pause_ms(),
            max_scroll_iterations: default_max_scroll_iterations(),
            max_scroll_secs: default_max_scroll_secs(),
        }
    }
}

impl CollectorConfig {
    fn scroll_pause(&self) -> Duration {
        Duration::from_millis(self.scroll_pause_ms)
    }

    fn scroll_budget(&self) -> Duration {
        Duration::from_secs(self.max_scroll_secs)
    }
}

/// Collect up to `request.requested()` records for `request.term()`.
///
/// Submits the search, scrolls until enough listings are discovered or the
/// feed converges, then focuses each listing in discovery order and
/// assembles a record for it. A listing that cannot be focused is logged
/// and skipped; the returned sequence preserves discovery order and may be
/// shorter than requested.
pub async fn collect(
    page: &dyn SearchPage,
    request: &CollectionRequest,
    config: &CollectorConfig,
) -> Result<Vec<BusinessRecord>, ScrapeError> {
    info!(
        term = request.term(),
        requested = request.requested(),
        "submitting search"
    );
    page.submit_search(request.term()).await?;

    let discovered = discover_listings(page, request.requested(), config).await?;
    debug!(discovered, "listing discovery finished");

    let mut records = Vec::with_capacity(discovered);
    for index in 0..discovered {
        if let Err(error) = page.focus_listing(index).await {
            warn!(index, %error, "skipping listing that could not be focused");
            continue;
        }
        records.push(assemble(page).await);
    }

    info!(
        collected = records.len(),
        discovered, "collection pass complete"
    );
    Ok(records)
}

/// Scroll the results feed until `target` listings are visible or the count
/// stops growing, returning how many listings to take.
async fn discover_listings(
    page: &dyn SearchPage,
    target: usize,
    config: &CollectorConfig,
) -> Result<usize, ScrapeError> {
    let started = Instant::now();
    let mut previous: Option<usize> = None;

    for iteration in 0..config.max_scroll_iterations {
        if started.elapsed() >= config.scroll_budget() {
            return Err(ScrapeError::ScrollBudgetExhausted {
                iterations: iteration,
            });
        }

        page.scroll_results(config.scroll_step).await?;
        if !config.scroll_pause().is_zero() {
            tokio::time::sleep(config.scroll_pause()).await;
        }

        let count = page.listing_count().await?;
        debug!(iteration, count, target, "scroll poll");

        if count >= target {
            return Ok(target);
        }
        if previous == Some(count) {
            info!(
                count,
                target, "result feed stopped growing; taking what is available"
            );
            return Ok(count);
        }
        previous = Some(count);
    }

    Err(ScrapeError::ScrollBudgetExhausted {
        iterations: config.max_scroll_iterations,
    })
}

#[cfg(test)]
mod tests {
    use super::super::extract::locators;
    use super::super::testing::FakePage;
    use super::*;

    fn fast_config() -> CollectorConfig {
        CollectorConfig {
            scroll_pause_ms: 0,
            ..Default::default()
        }
    }

    fn request(requested: usize) -> CollectionRequest {
        CollectionRequest::new("coffee berlin", requested).unwrap()
    }

    #[tokio::test]
    async fn stops_when_feed_stops_growing() {
        // Feed renders 5, 12, 20, then stalls at 20 against a request of 50.
        let page = FakePage::with_counts(&[5, 12, 20, 20]);

        let records = collect(&page, &request(50), &fast_config()).await.unwrap();
        assert_eq!(records.len(), 20);
    }

    #[tokio::test]
    async fn takes_exactly_the_requested_count() {
        let page = FakePage::with_counts(&[30]);

        let records = collect(&page, &request(10), &fast_config()).await.unwrap();
        assert_eq!(records.len(), 10);
    }

    #[tokio::test]
    async fn empty_feed_yields_no_records() {
        let page = FakePage::with_counts(&[0, 0]);

        let records = collect(&page, &request(10), &fast_config()).await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn failed_focus_skips_listing_and_preserves_order() {
        let page = FakePage::with_counts(&[3, 3])
            .with_field(0, locators::NAME, "Alpha")
            .with_field(1, locators::NAME, "Beta")
            .with_field(2, locators::NAME, "Gamma")
            .failing_focus(1);

        let records = collect(&page, &request(5), &fast_config()).await.unwrap();

        let names: Vec<_> = records.iter().map(|r| r.name.as_deref()).collect();
        assert_eq!(names, vec![Some("Alpha"), Some("Gamma")]);
    }

    #[tokio::test]
    async fn iteration_cap_is_an_error() {
        // Strictly growing counts never converge; the cap has to fire.
        let page = FakePage::with_counts(&[1, 2, 3, 4, 5, 6, 7, 8]);
        let config = CollectorConfig {
            max_scroll_iterations: 4,
            ..fast_config()
        };

        let result = collect(&page, &request(100), &config).await;
        assert!(matches!(
            result,
            Err(ScrapeError::ScrollBudgetExhausted { iterations: 4 })
        ));
    }

    #[tokio::test]
    async fn wall_clock_budget_is_an_error() {
        let page = FakePage::with_counts(&[5, 10]);
        let config = CollectorConfig {
            max_scroll_secs: 0,
            ..fast_config()
        };

        let result = collect(&page, &request(100), &config).await;
        assert!(matches!(
            result,
            Err(ScrapeError::ScrollBudgetExhausted { iterations: 0 })
        ));
    }
}
