//! Service layer for the crawler application.
//!
//! This module contains the business logic for:
//! - Hierarchy traversal (`BoundaryCrawler`)
//! - Resilient document fetching (`GeoFetcher`)
//! - Run accounting (`CrawlLedger`)

mod crawler;
mod fetcher;
mod ledger;

pub use crawler::BoundaryCrawler;
pub use fetcher::{BoundaryFetch, FetchError, GeoFetcher};
pub use ledger::CrawlLedger;
