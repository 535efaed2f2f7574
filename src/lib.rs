// src/lib.rs

//! geocrawler Library
//!
//! Crawls province and city boundary documents from the DataV GeoAtlas
//! API into a code-keyed directory tree, with bounded retries, manual
//! redirect handling, and a persisted run summary.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
