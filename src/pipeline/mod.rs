//! Pipeline entry points for crawler operations.
//!
//! - `run`: Load the hierarchy and crawl every boundary into local storage
//! - `run_crawler`: Walk the hierarchy and fetch boundary documents
//! - `run_validate`: Check configuration and the hierarchy dataset

pub mod crawl;
pub mod validate;

pub use crawl::{run, run_crawler};
pub use validate::run_validate;
