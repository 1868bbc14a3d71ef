//! Service layer for the case-count crawler.
//!
//! This module contains the scraping and aggregation logic:
//! - Release discovery (`LinkLister`, `pick_latest`)
//! - Case table extraction (`DetailParser`)
//! - Category grouping (`group_by_category`)

mod aggregate;
mod details;
mod links;

pub use aggregate::{CategoryGroups, group_by_category};
pub use details::{CASE_TABLE_INDEX, DetailParser};
pub use links::{LinkLister, REIWA_OFFSET, pick_latest};

#[cfg(test)]
pub(crate) use details::tests::release_html;
