//! JSON document store over an object storage.
//!
//! Each kind is one JSON object `{kind}.json` holding its documents in
//! insertion order. Writes are read-modify-write of the whole collection and
//! are serialized within the process; separate processes are not coordinated.

use std::cmp::Ordering;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::error::{AppError, Result};
use crate::storage::{Document, DocumentStore, Fields, ObjectStorage, Query};

/// On-disk shape of one kind.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Collection {
    /// Last store-assigned numeric key
    #[serde(default)]
    next_id: u64,
    #[serde(default)]
    documents: Vec<Document>,
}

impl Collection {
    fn contains(&self, key: &str) -> bool {
        self.documents.iter().any(|doc| doc.key == key)
    }

    fn allocate_key(&mut self) -> String {
        loop {
            self.next_id += 1;
            let key = self.next_id.to_string();
            if !self.contains(&key) {
                return key;
            }
        }
    }
}

/// Document store persisting each kind as a JSON collection object.
pub struct JsonDocumentStore<S> {
    storage: S,
    write_lock: Mutex<()>,
}

impl<S: ObjectStorage> JsonDocumentStore<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
        }
    }

    fn collection_key(kind: &str) -> String {
        format!("{}.json", kind)
    }

    async fn load(&self, kind: &str) -> Result<Collection> {
        match self.storage.read_bytes(&Self::collection_key(kind)).await? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(Collection::default()),
        }
    }

    async fn save(&self, kind: &str, collection: &Collection) -> Result<()> {
        let key = Self::collection_key(kind);
        let bytes = serde_json::to_vec_pretty(collection)?;
        self.storage.write_bytes(&key, &bytes).await?;
        log::debug!(
            "Saved {} document(s) to {}",
            collection.documents.len(),
            self.storage.location(&key)
        );
        Ok(())
    }
}

#[async_trait]
impl<S: ObjectStorage> DocumentStore for JsonDocumentStore<S> {
    async fn get(&self, kind: &str, key: &str) -> Result<Option<Document>> {
        let collection = self.load(kind).await?;
        Ok(collection.documents.into_iter().find(|doc| doc.key == key))
    }

    async fn insert_keyed(&self, kind: &str, key: &str, fields: Fields) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut collection = self.load(kind).await?;
        if collection.contains(key) {
            return Err(AppError::Conflict {
                kind: kind.to_string(),
                key: key.to_string(),
            });
        }
        collection.documents.push(Document {
            key: key.to_string(),
            fields,
        });
        self.save(kind, &collection).await
    }

    async fn insert(&self, kind: &str, fields: Fields) -> Result<String> {
        let _guard = self.write_lock.lock().await;
        let mut collection = self.load(kind).await?;
        let key = collection.allocate_key();
        collection.documents.push(Document {
            key: key.clone(),
            fields,
        });
        self.save(kind, &collection).await?;
        Ok(key)
    }

    async fn query(&self, kind: &str, query: &Query) -> Result<Vec<Document>> {
        let collection = self.load(kind).await?;
        Ok(apply_query(collection.documents, query))
    }
}

/// Filter, sort and truncate documents according to `query`.
///
/// The sort is stable, so equal keys keep insertion order.
pub fn apply_query(documents: Vec<Document>, query: &Query) -> Vec<Document> {
    let mut matched: Vec<Document> = documents
        .into_iter()
        .filter(|doc| {
            query
                .filters
                .iter()
                .all(|(field, value)| doc.fields.get(field) == Some(value))
        })
        .collect();

    if let Some(field) = &query.order_desc {
        matched.sort_by(|a, b| compare_values(b.fields.get(field), a.fields.get(field)));
    }

    if let Some(limit) = query.limit {
        matched.truncate(limit);
    }

    matched
}

/// Order numbers numerically and strings lexically; missing values first.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}
