//! mapscout - business listing acquisition from map search results.
//!
//! Drives a headless Chromium session against a map search UI, scrolls the
//! result feed until enough listings have been discovered, and assembles one
//! typed [`models::BusinessRecord`] per listing. Extraction is tolerant at
//! every level: a missing field is absent rather than an error, a listing
//! that cannot be focused is skipped, and a failed session yields an empty
//! result instead of propagating.

pub mod cli;
pub mod config;
pub mod models;
pub mod scrapers;
