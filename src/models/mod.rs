//! Data models for business listing collection.

mod business;

pub use business::{
    BusinessRecord, CollectionRequest, CollectionResult, RequestError, MAX_REQUESTED_RESULTS,
};
