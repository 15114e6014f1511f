//! Service layer for the tracker.
//!
//! This module contains the business logic for:
//! - Conditional document fetching (`StatusPageFetcher`)
//! - New-update detection (`ChangeDetector`)

mod detector;
mod fetcher;

pub use detector::ChangeDetector;
pub use fetcher::{DocumentSource, FetchOutcome, StatusPageFetcher, Validators};
