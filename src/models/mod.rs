// src/models/mod.rs

//! Domain models for the case-count crawler.

mod config;
mod counts;
mod detail;
mod link;

// Re-export all public types
pub use config::{Config, CrawlerConfig, LoggingConfig, SiteConfig};
pub use counts::{CategoryCount, Total};
pub use detail::{DETAIL_COLUMNS, Detail};
pub use link::{Link, date_number, link_key};
