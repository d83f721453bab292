//! Path-addressed document store.
//!
//! Collections are addressed by slash-separated paths (`users`,
//! `users/{uid}/reviews`) and hold JSON documents keyed by id. Queries
//! return documents in insertion order.

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgDocumentStore;

/// One stored document.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: String,
    pub data: Map<String, Value>,
}

/// Exact-match filter on a top-level document field.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub value: Value,
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Strict equality: no case folding, no substring match.
    pub fn matches(&self, data: &Map<String, Value>) -> bool {
        data.get(&self.field) == Some(&self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("document store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All documents in the collection at `path` matching every filter.
    async fn query(&self, path: &str, filters: &[Filter]) -> Result<Vec<Record>, StoreError>;

    /// All documents in the `child` collection nested under the document at
    /// `parent_path`.
    async fn query_nested(
        &self,
        parent_path: &str,
        child: &str,
    ) -> Result<Vec<Record>, StoreError> {
        self.query(&nested_path(parent_path, child), &[]).await
    }
}

pub fn nested_path(parent_path: &str, child: &str) -> String {
    format!(
        "{}/{}",
        parent_path.trim_end_matches('/'),
        child.trim_matches('/')
    )
}

/// Normalised collection path, without leading or trailing slashes.
pub(crate) fn collection_key(path: &str) -> &str {
    path.trim_matches('/')
}
