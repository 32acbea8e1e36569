//! In-memory document store
//!
//! Maps collection -> document id -> document, with an insertion sequence
//! per document so collection reads come back in creation order.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::model::{EntityKind, ID_FIELD};
use crate::observability::MetricsRegistry;

use super::errors::{StoreError, StoreResult};
use super::filter::Filter;
use super::DocumentStore;

#[derive(Debug)]
struct StoredDocument {
    seq: u64,
    body: Value,
}

#[derive(Debug, Default)]
struct Collection {
    next_seq: u64,
    documents: HashMap<String, StoredDocument>,
}

impl Collection {
    fn sorted<'a>(&'a self, docs: impl Iterator<Item = &'a StoredDocument>) -> Vec<Value> {
        let mut docs: Vec<&StoredDocument> = docs.collect();
        docs.sort_by_key(|d| d.seq);
        docs.into_iter().map(|d| d.body.clone()).collect()
    }
}

/// In-memory store backend
///
/// Every read round trip is counted in the shared [`MetricsRegistry`].
#[derive(Debug)]
pub struct InMemoryStore {
    data: RwLock<HashMap<EntityKind, Collection>>,
    metrics: Arc<MetricsRegistry>,
    available: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::with_metrics(Arc::new(MetricsRegistry::new()))
    }

    /// Create a store that records lookups into `metrics`
    pub fn with_metrics(metrics: Arc<MetricsRegistry>) -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
            metrics,
            available: AtomicBool::new(true),
        }
    }

    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    /// Toggle availability. While unavailable every call fails with
    /// [`StoreError::Unavailable`].
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> StoreResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::unavailable("in-memory store is offline"))
        }
    }

    fn read_lookup(&self, kind: EntityKind) -> StoreResult<()> {
        self.ensure_available()?;
        self.metrics.increment_lookups(kind);
        Ok(())
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::unavailable("Lock poisoned")
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn find_by_id(&self, kind: EntityKind, id: &str) -> StoreResult<Option<Value>> {
        self.read_lookup(kind)?;
        let data = self.data.read().map_err(poisoned)?;

        Ok(data
            .get(&kind)
            .and_then(|c| c.documents.get(id))
            .map(|d| d.body.clone()))
    }

    async fn find_many(&self, kind: EntityKind, ids: &[String]) -> StoreResult<Vec<Value>> {
        self.read_lookup(kind)?;
        let data = self.data.read().map_err(poisoned)?;

        let Some(collection) = data.get(&kind) else {
            return Ok(Vec::new());
        };

        let mut seen = std::collections::HashSet::new();
        let found = ids
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .filter_map(|id| collection.documents.get(id));

        Ok(collection.sorted(found))
    }

    async fn find(&self, kind: EntityKind, filter: &Filter) -> StoreResult<Vec<Value>> {
        self.read_lookup(kind)?;
        let data = self.data.read().map_err(poisoned)?;

        Ok(data
            .get(&kind)
            .map(|c| c.sorted(c.documents.values().filter(|d| filter.matches(&d.body))))
            .unwrap_or_default())
    }

    async fn insert(&self, kind: EntityKind, mut document: Value) -> StoreResult<Value> {
        self.ensure_available()?;

        let obj = document
            .as_object_mut()
            .ok_or_else(|| StoreError::malformed(kind.collection(), "document is not an object"))?;

        let id = Uuid::new_v4().to_string();
        obj.insert(ID_FIELD.to_string(), Value::String(id.clone()));

        let mut data = self.data.write().map_err(poisoned)?;
        let collection = data.entry(kind).or_default();
        let seq = collection.next_seq;
        collection.next_seq += 1;
        collection.documents.insert(
            id,
            StoredDocument {
                seq,
                body: document.clone(),
            },
        );

        Ok(document)
    }

    async fn update(&self, kind: EntityKind, id: &str, patch: Value) -> StoreResult<Option<Value>> {
        self.ensure_available()?;
        let mut data = self.data.write().map_err(poisoned)?;

        let Some(stored) = data
            .get_mut(&kind)
            .and_then(|c| c.documents.get_mut(id))
        else {
            return Ok(None);
        };

        if let (Some(doc_obj), Some(patch_obj)) = (stored.body.as_object_mut(), patch.as_object()) {
            for (k, v) in patch_obj {
                if k != ID_FIELD {
                    doc_obj.insert(k.clone(), v.clone());
                }
            }
        }

        Ok(Some(stored.body.clone()))
    }

    async fn delete(&self, kind: EntityKind, id: &str) -> StoreResult<bool> {
        self.ensure_available()?;
        let mut data = self.data.write().map_err(poisoned)?;

        Ok(data
            .get_mut(&kind)
            .map(|c| c.documents.remove(id).is_some())
            .unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_assigns_identity() {
        let store = InMemoryStore::new();

        let doc = store
            .insert(EntityKind::User, json!({"id": "client-chosen", "username": "alice"}))
            .await
            .unwrap();

        let id = doc["id"].as_str().unwrap();
        assert_ne!(id, "client-chosen");
        assert!(Uuid::parse_str(id).is_ok());

        let read = store.find_by_id(EntityKind::User, id).await.unwrap();
        assert_eq!(read.unwrap()["username"], "alice");
    }

    #[tokio::test]
    async fn test_find_preserves_insertion_order() {
        let store = InMemoryStore::new();
        for i in 0..10 {
            store
                .insert(EntityKind::Product, json!({"name": format!("p{}", i)}))
                .await
                .unwrap();
        }

        let docs = store.find(EntityKind::Product, &Filter::all()).await.unwrap();
        let names: Vec<&str> = docs.iter().map(|d| d["name"].as_str().unwrap()).collect();
        let expected: Vec<String> = (0..10).map(|i| format!("p{}", i)).collect();
        assert_eq!(names, expected);
    }

    #[tokio::test]
    async fn test_update_merges_and_keeps_identity() {
        let store = InMemoryStore::new();
        let doc = store
            .insert(EntityKind::Product, json!({"name": "Mouse", "price": 10}))
            .await
            .unwrap();
        let id = doc["id"].as_str().unwrap().to_string();

        let updated = store
            .update(EntityKind::Product, &id, json!({"price": 12, "id": "hijack"}))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated["id"], id.as_str());
        assert_eq!(updated["name"], "Mouse");
        assert_eq!(updated["price"], 12);
    }

    #[tokio::test]
    async fn test_update_missing_returns_none() {
        let store = InMemoryStore::new();
        let result = store
            .update(EntityKind::Order, "nope", json!({"total": 1}))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = InMemoryStore::new();
        let doc = store.insert(EntityKind::User, json!({"username": "bob"})).await.unwrap();
        let id = doc["id"].as_str().unwrap();

        assert!(store.delete(EntityKind::User, id).await.unwrap());
        assert!(!store.delete(EntityKind::User, id).await.unwrap());
    }

    #[tokio::test]
    async fn test_find_many_skips_missing_and_duplicates() {
        let store = InMemoryStore::new();
        let a = store.insert(EntityKind::User, json!({"username": "a"})).await.unwrap();
        let a_id = a["id"].as_str().unwrap().to_string();

        let ids = vec![a_id.clone(), "ghost".to_string(), a_id];
        let docs = store.find_many(EntityKind::User, &ids).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(store.metrics().lookups(EntityKind::User), 1);
    }

    #[tokio::test]
    async fn test_unavailable_store_fails() {
        let store = InMemoryStore::new();
        store.set_available(false);

        let err = store.find(EntityKind::Product, &Filter::all()).await.unwrap_err();
        assert_eq!(err.code(), "STORE_UNAVAILABLE");

        store.set_available(true);
        assert!(store.find(EntityKind::Product, &Filter::all()).await.is_ok());
    }
}
