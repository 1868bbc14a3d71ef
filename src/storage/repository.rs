//! Case-count persistence gateway.
//!
//! Maps links, per-category counts and totals onto a [`DocumentStore`].
//! A link is stored under the hash of its publication date, which makes
//! [`CaseRepository::store`] a no-op for dates that are already present.
//!
//! The three insert phases (link, category counts, total) are not
//! transactional. If a run fails after the link was inserted, later runs see
//! the link and skip the date, leaving its counts incomplete.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::{CategoryCount, Link, Total, link_key};
use crate::services::CategoryGroups;
use crate::storage::{Document, DocumentStore, Fields, Query};

/// Kind holding one document per publication date.
pub const LINKS: &str = "links";
/// Kind holding case counts per category.
pub const PREFECTURES: &str = "prefectures";
/// Kind holding case totals.
pub const TOTALS: &str = "totals";

/// Result of [`CaseRepository::store`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOutcome {
    /// The link and its counts were written.
    Stored {
        key: String,
        categories: usize,
        total: u64,
    },
    /// A link for the same date already exists; nothing was written.
    AlreadyStored { key: String },
}

/// Persistence gateway for case counts.
pub struct CaseRepository {
    store: Box<dyn DocumentStore>,
}

impl CaseRepository {
    pub fn new(store: impl DocumentStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    /// Persist a link with its category counts and total, once per date.
    pub async fn store(&self, link: &Link, groups: &CategoryGroups) -> Result<StoreOutcome> {
        let key = link_key(link.date);

        if self.store.get(LINKS, &key).await?.is_some() {
            log::info!("Release of {} already stored, skipping", link.date);
            return Ok(StoreOutcome::AlreadyStored { key });
        }

        match self.store.insert_keyed(LINKS, &key, to_fields(link)?).await {
            Ok(()) => {}
            Err(AppError::Conflict { .. }) => {
                log::info!("Release of {} stored concurrently, skipping", link.date);
                return Ok(StoreOutcome::AlreadyStored { key });
            }
            Err(e) => return Err(e),
        }

        for (category, count) in groups.counts() {
            let record = CategoryCount {
                link: key.clone(),
                category: category.to_string(),
                count,
            };
            self.store.insert(PREFECTURES, to_fields(&record)?).await?;
        }

        let total = groups.total_rows();
        let record = Total {
            link: key.clone(),
            count: total,
        };
        self.store.insert(TOTALS, to_fields(&record)?).await?;

        log::info!(
            "Stored release of {}: {} categories, {} cases",
            link.date,
            groups.len(),
            total
        );

        Ok(StoreOutcome::Stored {
            key,
            categories: groups.len(),
            total,
        })
    }

    /// The stored link with the latest publication date.
    pub async fn fetch_latest_link(&self) -> Result<Option<Link>> {
        let query = Query::new().order_desc("date").limit(1);
        let Some(doc) = self.store.query(LINKS, &query).await?.into_iter().next() else {
            return Ok(None);
        };

        let key = doc.key.clone();
        let mut link: Link = from_document(doc)?;
        link.id = Some(key);
        Ok(Some(link))
    }

    /// Total case count stored for `link`.
    pub async fn fetch_total(&self, link: &Link) -> Result<Option<u64>> {
        let query = Query::new().filter("link", link.storage_key()).limit(1);
        self.store
            .query(TOTALS, &query)
            .await?
            .into_iter()
            .next()
            .map(|doc| from_document::<Total>(doc).map(|total| total.count))
            .transpose()
    }

    /// Case count stored for `category` under `link`, by exact match.
    pub async fn fetch_category_count(&self, link: &Link, category: &str) -> Result<Option<u64>> {
        let query = Query::new()
            .filter("prefecture", category)
            .filter("link", link.storage_key())
            .limit(1);
        self.store
            .query(PREFECTURES, &query)
            .await?
            .into_iter()
            .next()
            .map(|doc| from_document::<CategoryCount>(doc).map(|record| record.count))
            .transpose()
    }

    /// All category counts stored for `link`, in insertion order.
    pub async fn fetch_category_counts(&self, link: &Link) -> Result<Vec<CategoryCount>> {
        let query = Query::new().filter("link", link.storage_key());
        self.store
            .query(PREFECTURES, &query)
            .await?
            .into_iter()
            .map(from_document::<CategoryCount>)
            .collect()
    }
}

fn to_fields<T: Serialize>(value: &T) -> Result<Fields> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(AppError::validation(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

fn from_document<T: DeserializeOwned>(doc: Document) -> Result<T> {
    Ok(serde_json::from_value(Value::Object(doc.fields))?)
}
