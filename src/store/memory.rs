use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use anyhow::Context;
use async_trait::async_trait;
use serde_json::Value;

use super::{collection_key, DocumentStore, Filter, Record, StoreError};

/// In-process store used for local runs and tests.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Record>>>,
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the document at `{collection}/{id}`. A replaced
    /// document keeps its original position.
    pub fn insert(&self, collection: &str, id: &str, data: Value) -> anyhow::Result<()> {
        let Value::Object(data) = data else {
            anyhow::bail!("document {collection}/{id} is not a JSON object");
        };
        let mut guard = self
            .collections
            .write()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?;
        let docs = guard.entry(collection_key(collection).to_string()).or_default();
        match docs.iter_mut().find(|r| r.id == id) {
            Some(existing) => existing.data = data,
            None => docs.push(Record {
                id: id.to_string(),
                data,
            }),
        }
        Ok(())
    }

    /// Load documents from a JSON object of `"collection/id": {...}` pairs.
    pub fn load_json(&self, seed: &Value) -> anyhow::Result<usize> {
        let entries = seed
            .as_object()
            .context("seed must be a JSON object keyed by document path")?;
        for (path, doc) in entries {
            let (collection, id) = collection_key(path)
                .rsplit_once('/')
                .with_context(|| format!("seed key {path} is not a document path"))?;
            self.insert(collection, id, doc.clone())?;
        }
        Ok(entries.len())
    }

    /// Simulate an outage: every query fails until switched back.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn query(&self, path: &str, filters: &[Filter]) -> Result<Vec<Record>, StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store offline".into()));
        }
        let guard = self
            .collections
            .read()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))?;
        let rows = guard
            .get(collection_key(path))
            .map(|docs| {
                docs.iter()
                    .filter(|r| filters.iter().all(|f| f.matches(&r.data)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(rows)
    }
}
