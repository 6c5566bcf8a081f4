//! Scripted fakes for the page and session seams.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::page::SearchPage;
use super::session::Session;
use super::ScrapeError;

/// Fake page with scripted listing counts, per-index focus failures, and
/// per-index field values keyed by locator.
///
/// Successive `listing_count` calls walk the scripted sequence; the last
/// value repeats once the script runs out.
#[derive(Default)]
pub(crate) struct FakePage {
    counts: Vec<usize>,
    polls: AtomicUsize,
    failing: HashSet<usize>,
    fields: HashMap<usize, HashMap<&'static str, &'static str>>,
    focused: Mutex<Option<usize>>,
}

impl FakePage {
    pub fn with_counts(counts: &[usize]) -> Self {
        Self {
            counts: counts.to_vec(),
            ..Default::default()
        }
    }

    pub fn failing_focus(mut self, index: usize) -> Self {
        self.failing.insert(index);
        self
    }

    pub fn with_field(mut self, index: usize, locator: &'static str, value: &'static str) -> Self {
        self.fields.entry(index).or_default().insert(locator, value);
        self
    }
}

#[async_trait]
impl SearchPage for FakePage {
    async fn submit_search(&self, _term: &str) -> Result<(), ScrapeError> {
        Ok(())
    }

    async fn scroll_results(&self, _delta: i64) -> Result<(), ScrapeError> {
        Ok(())
    }

    async fn listing_count(&self) -> Result<usize, ScrapeError> {
        let poll = self.polls.fetch_add(1, Ordering::Relaxed);
        Ok(self
            .counts
            .get(poll)
            .or_else(|| self.counts.last())
            .copied()
            .unwrap_or(0))
    }

    async fn focus_listing(&self, index: usize) -> Result<(), ScrapeError> {
        if self.failing.contains(&index) {
            return Err(ScrapeError::ListingFocus {
                index,
                reason: "scripted failure".to_string(),
            });
        }
        *self.focused.lock().unwrap() = Some(index);
        Ok(())
    }

    async fn extract(&self, locator: &str, _attribute: Option<&str>) -> Option<String> {
        let focused = (*self.focused.lock().unwrap())?;
        self.fields
            .get(&focused)?
            .get(locator)
            .map(|value| (*value).to_string())
    }
}

/// Fake session that optionally fails on open and counts close calls.
pub(crate) struct FakeSession {
    page: Option<FakePage>,
    fail_open: bool,
    pub close_calls: usize,
}

impl FakeSession {
    pub fn succeeding(page: FakePage) -> Self {
        Self {
            page: Some(page),
            fail_open: false,
            close_calls: 0,
        }
    }

    pub fn failing_navigation() -> Self {
        Self {
            page: None,
            fail_open: true,
            close_calls: 0,
        }
    }
}

#[async_trait]
impl Session for FakeSession {
    type Page = FakePage;

    async fn open(&mut self) -> Result<FakePage, ScrapeError> {
        if self.fail_open {
            return Err(ScrapeError::Navigation {
                url: "https://maps.invalid".to_string(),
                reason: "scripted failure".to_string(),
            });
        }
        Ok(self.page.take().expect("open called twice"))
    }

    async fn close(&mut self) {
        self.close_calls += 1;
    }
}
