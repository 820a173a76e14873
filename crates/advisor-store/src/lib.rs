// ABOUTME: Persistence layer for the course advisor.
// ABOUTME: Loads the read-only course catalog and writes run reports and score files.

pub mod catalog;
pub mod output;

pub use catalog::{CatalogStore, StoreError};
pub use output::{write_report, write_scores};
