//! Pipeline entry points for crawler operations.
//!
//! - `run_crawler`: fetch the latest release and store its counts
//! - `crawl`: the same without storing, for dry runs

pub mod crawl;

pub use crawl::{CrawlResult, CrawlSummary, crawl, run_crawler};
