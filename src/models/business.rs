//! Business records and the request/result types around one collection run.
//!
//! A record's fields are all independently optional: listings on the map UI
//! frequently omit a website or phone number, and a single missing field
//! must not invalidate the rest of the listing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Practical upper bound on the requested result count, keeping the scroll
/// loop from chasing an effectively endless result feed.
pub const MAX_REQUESTED_RESULTS: usize = 120;

/// One extracted business listing.
///
/// Immutable after assembly; owned by the caller once returned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BusinessRecord {
    pub name: Option<String>,
    pub address: Option<String>,
    pub website: Option<String>,
    pub phone_number: Option<String>,
    pub reviews_count: Option<u32>,
    pub reviews_average: Option<f64>,
}

impl BusinessRecord {
    /// True when every field is absent.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.address.is_none()
            && self.website.is_none()
            && self.phone_number.is_none()
            && self.reviews_count.is_none()
            && self.reviews_average.is_none()
    }
}

/// Errors from request validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("Search term must not be empty")]
    EmptyTerm,

    #[error("Requested result count must be positive")]
    ZeroCount,
}

/// Validated input for one collection run.
///
/// The query identifier is opaque to the collection engine; it exists so
/// the caller can link returned records back to a stored search query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionRequest {
    term: String,
    requested: usize,
    query_id: Uuid,
}

impl CollectionRequest {
    /// Validate a search term and requested count.
    ///
    /// The term is trimmed and must be non-empty; the count must be
    /// positive and is clamped to [`MAX_REQUESTED_RESULTS`].
    pub fn new(term: impl Into<String>, requested: usize) -> Result<Self, RequestError> {
        let term = term.into().trim().to_string();
        if term.is_empty() {
            return Err(RequestError::EmptyTerm);
        }
        if requested == 0 {
            return Err(RequestError::ZeroCount);
        }

        Ok(Self {
            term,
            requested: requested.min(MAX_REQUESTED_RESULTS),
            query_id: Uuid::new_v4(),
        })
    }

    /// Replace the generated query identifier with one assigned by the
    /// caller's persistence layer.
    pub fn with_query_id(mut self, query_id: Uuid) -> Self {
        self.query_id = query_id;
        self
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn requested(&self) -> usize {
        self.requested
    }

    pub fn query_id(&self) -> Uuid {
        self.query_id
    }
}

/// Ordered outcome of one collection run.
///
/// Records appear in discovery order and the sequence may be shorter than
/// requested: the feed can converge early, and a failed session yields an
/// empty (but well-formed) result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionResult {
    /// Identifier of the originating search query.
    pub query_id: Uuid,
    /// Extracted records, insertion order = discovery order.
    pub records: Vec<BusinessRecord>,
    /// When the run finished.
    pub collected_at: DateTime<Utc>,
}

impl CollectionResult {
    pub fn new(query_id: Uuid, records: Vec<BusinessRecord>) -> Self {
        Self {
            query_id,
            records,
            collected_at: Utc::now(),
        }
    }

    pub fn empty(query_id: Uuid) -> Self {
        Self::new(query_id, Vec::new())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_rejects_empty_term() {
        assert_eq!(
            CollectionRequest::new("   ", 10).unwrap_err(),
            RequestError::EmptyTerm
        );
    }

    #[test]
    fn request_rejects_zero_count() {
        assert_eq!(
            CollectionRequest::new("coffee", 0).unwrap_err(),
            RequestError::ZeroCount
        );
    }

    #[test]
    fn request_trims_term() {
        let request = CollectionRequest::new("  coffee berlin  ", 10).unwrap();
        assert_eq!(request.term(), "coffee berlin");
        assert_eq!(request.requested(), 10);
    }

    #[test]
    fn request_clamps_oversized_count() {
        let request = CollectionRequest::new("coffee", 10_000).unwrap();
        assert_eq!(request.requested(), MAX_REQUESTED_RESULTS);
    }

    #[test]
    fn record_with_no_fields_is_empty() {
        assert!(BusinessRecord::default().is_empty());

        let named = BusinessRecord {
            name: Some("Cafe Neun".to_string()),
            ..Default::default()
        };
        assert!(!named.is_empty());
    }
}
