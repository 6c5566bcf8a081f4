//! Session lifecycle: browser acquisition, navigation, guaranteed teardown.
//!
//! A session runs `Idle -> Launching -> Navigating -> Collecting -> Closing`
//! and always passes through the closing step, whichever earlier step
//! failed. The orchestrator never propagates an error to the caller: a
//! fatal failure is logged and becomes an empty result.

use async_trait::async_trait;
use tracing::{error, info};

use super::collect::{collect, CollectorConfig};
use super::page::SearchPage;
use super::ScrapeError;
use crate::models::{BusinessRecord, CollectionRequest, CollectionResult};

/// One end-to-end browser lifecycle for a single collection request.
///
/// `open` covers launch plus navigation to the search UI; `close` must be
/// safe to call exactly once on every exit path, including after a failed
/// `open`. A session is exclusively owned by one in-flight request.
#[async_trait]
pub trait Session: Send {
    type Page: SearchPage;

    /// Launch the browser and navigate to the search UI, returning the
    /// ready page. Bounded by the implementation's navigation timeout.
    async fn open(&mut self) -> Result<Self::Page, ScrapeError>;

    /// Release the browser. Infallible by contract; implementations log
    /// and swallow their own teardown errors.
    async fn close(&mut self);
}

/// Run one collection inside `session`, releasing the browser on every
/// exit path.
///
/// Never fails: a session-fatal error is logged and mapped to an empty
/// result, so the caller always receives a well-formed (possibly empty)
/// sequence in discovery order.
pub async fn run_collection<S: Session>(
    session: &mut S,
    request: &CollectionRequest,
    config: &CollectorConfig,
) -> CollectionResult {
    let outcome = open_and_collect(session, request, config).await;
    session.close().await;

    match outcome {
        Ok(records) => {
            info!(
                query_id = %request.query_id(),
                records = records.len(),
                "collection finished"
            );
            CollectionResult::new(request.query_id(), records)
        }
        Err(error) => {
            error!(
                query_id = %request.query_id(),
                %error,
                "collection failed; returning empty result"
            );
            CollectionResult::empty(request.query_id())
        }
    }
}

async fn open_and_collect<S: Session>(
    session: &mut S,
    request: &CollectionRequest,
    config: &CollectorConfig,
) -> Result<Vec<BusinessRecord>, ScrapeError> {
    let page = session.open().await?;
    collect(&page, request, config).await
}

#[cfg(test)]
mod tests {
    use super::super::testing::{FakePage, FakeSession};
    use super::*;

    fn fast_config() -> CollectorConfig {
        CollectorConfig {
            scroll_pause_ms: 0,
            ..Default::default()
        }
    }

    fn request() -> CollectionRequest {
        CollectionRequest::new("coffee berlin", 5).unwrap()
    }

    #[tokio::test]
    async fn navigation_failure_yields_empty_result_and_closes_once() {
        let mut session = FakeSession::failing_navigation();

        let result = run_collection(&mut session, &request(), &fast_config()).await;

        assert!(result.is_empty());
        assert_eq!(session.close_calls, 1);
    }

    #[tokio::test]
    async fn successful_run_closes_exactly_once() {
        let mut session = FakeSession::succeeding(FakePage::with_counts(&[5, 5]));

        let result = run_collection(&mut session, &request(), &fast_config()).await;

        assert_eq!(result.len(), 5);
        assert_eq!(session.close_calls, 1);
    }

    #[tokio::test]
    async fn collector_failure_yields_empty_result_and_closes_once() {
        // A zero wall-clock budget makes the scroll loop fail immediately.
        let mut session = FakeSession::succeeding(FakePage::with_counts(&[5, 10]));
        let config = CollectorConfig {
            max_scroll_secs: 0,
            ..fast_config()
        };

        let result = run_collection(&mut session, &request(), &config).await;

        assert!(result.is_empty());
        assert_eq!(session.close_calls, 1);
    }

    #[tokio::test]
    async fn result_carries_the_request_query_id() {
        let request = request();
        let mut session = FakeSession::succeeding(FakePage::with_counts(&[2, 2]));

        let result = run_collection(&mut session, &request, &fast_config()).await;

        assert_eq!(result.query_id, request.query_id());
    }
}
