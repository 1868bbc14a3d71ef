//! Storage abstractions for case-count persistence.
//!
//! Two layers:
//! - [`ObjectStorage`]: raw bytes by key (local filesystem or S3)
//! - [`DocumentStore`]: kinds of JSON documents with keyed and auto-keyed
//!   inserts and simple queries, built on top of an object storage
//!
//! [`CaseRepository`] maps the domain records onto the document store.
//!
//! ## Layout
//!
//! ```text
//! {root}/
//! ├── links.json        # one document per publication date
//! ├── prefectures.json  # case count per prefecture and link
//! └── totals.json       # case count per link
//! ```

pub mod documents;
pub mod local;
pub mod repository;
#[cfg(feature = "s3")]
pub mod s3;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;

// Re-export for convenience
pub use documents::JsonDocumentStore;
pub use local::LocalStorage;
pub use repository::{CaseRepository, StoreOutcome};

/// Field map of a stored document.
pub type Fields = Map<String, Value>;

/// Byte storage addressed by relative keys.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Read an object, `None` if it does not exist.
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Create or replace an object.
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()>;

    /// Human-readable location of an object, for logs.
    fn location(&self, key: &str) -> String;
}

/// A stored document and its key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub key: String,
    pub fields: Fields,
}

/// Equality filters, optional descending order and limit.
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub filters: Vec<(String, Value)>,
    pub order_desc: Option<String>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep documents whose `field` equals `value`.
    pub fn filter(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    /// Sort by `field`, largest first.
    pub fn order_desc(mut self, field: impl Into<String>) -> Self {
        self.order_desc = Some(field.into());
        self
    }

    /// Return at most `limit` documents.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Document store with kinds, keys and simple queries.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document by key.
    async fn get(&self, kind: &str, key: &str) -> Result<Option<Document>>;

    /// Insert a document under `key`.
    ///
    /// Fails with [`crate::error::AppError::Conflict`] if the key is taken.
    async fn insert_keyed(&self, kind: &str, key: &str, fields: Fields) -> Result<()>;

    /// Insert a document under a store-assigned key and return that key.
    async fn insert(&self, kind: &str, fields: Fields) -> Result<String>;

    /// Run a query against one kind.
    async fn query(&self, kind: &str, query: &Query) -> Result<Vec<Document>>;
}
