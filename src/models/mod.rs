// src/models/mod.rs

//! Domain models for the crawler application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod province;
mod report;

// Re-export all public types
pub use config::{ApiConfig, Config, CrawlerConfig, PathsConfig};
pub use province::{City, Province};
pub use report::{CrawlSummary, ErrorRecord, LevelStats, NodeKind, SummaryStats};
