//! Listing discovery and extraction engine.
//!
//! The engine is layered leaf-first: [`page::SearchPage`] abstracts one open
//! map-search page, [`extract`] pulls fields out of a focused listing's
//! detail panel, [`collect`] drives the scroll/convergence loop, and
//! [`session`] owns the browser lifecycle around a whole run. The
//! chromiumoxide-backed implementations live in [`browser`].

pub mod browser;
pub mod collect;
pub mod extract;
pub mod page;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use browser::{BrowserEngineConfig, ChromePage, ChromeSession, PageTiming};
pub use collect::{collect, CollectorConfig};
pub use page::SearchPage;
pub use session::{run_collection, Session};

use thiserror::Error;

/// Errors that can occur while driving a collection session.
///
/// Field-level absence is not an error (see [`SearchPage::extract`]) and
/// per-listing focus failures are contained inside the collector; anything
/// that reaches the session orchestrator is fatal for the run and maps to
/// an empty result there.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Search input not found on page")]
    SearchBoxMissing,

    #[error("Could not focus listing {index}: {reason}")]
    ListingFocus { index: usize, reason: String },

    #[error("Scroll budget exhausted after {iterations} iterations")]
    ScrollBudgetExhausted { iterations: usize },
}
