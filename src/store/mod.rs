//! # Document Store Adapter
//!
//! The seam between the core and whatever persists the three collections.
//! The core only ever talks to a `dyn DocumentStore`; [`InMemoryStore`] is
//! the implementation shipped for the CLI and for tests.
//!
//! Documents are JSON objects carrying an `id` field assigned by the store.

mod errors;
mod filter;
mod memory;

pub use errors::{StoreError, StoreResult};
pub use filter::{FieldFilter, Filter, FilterOperator};
pub use memory::InMemoryStore;

use async_trait::async_trait;
use serde_json::Value;

use crate::model::{Entity, EntityKind};

/// Persistence operations the core relies on
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read a document by identity
    async fn find_by_id(&self, kind: EntityKind, id: &str) -> StoreResult<Option<Value>>;

    /// Read every document whose identity is in `ids`, in one round trip.
    ///
    /// Identities that do not exist are skipped. Result order is unspecified.
    async fn find_many(&self, kind: EntityKind, ids: &[String]) -> StoreResult<Vec<Value>> {
        self.find(kind, &Filter::id_in(ids)).await
    }

    /// Read every document matching `filter`, in insertion order
    async fn find(&self, kind: EntityKind, filter: &Filter) -> StoreResult<Vec<Value>>;

    /// Insert a document and return it with its assigned identity
    async fn insert(&self, kind: EntityKind, document: Value) -> StoreResult<Value>;

    /// Merge the top-level fields of `patch` into a document.
    ///
    /// Returns `None` if the identity does not exist. The identity field is
    /// never overwritten.
    async fn update(&self, kind: EntityKind, id: &str, patch: Value) -> StoreResult<Option<Value>>;

    /// Remove a document. Returns `false` if it was already absent.
    async fn delete(&self, kind: EntityKind, id: &str) -> StoreResult<bool>;
}

/// Decode a stored document into its entity type
pub fn decode<E: Entity>(document: Value) -> StoreResult<E> {
    serde_json::from_value(document)
        .map_err(|e| StoreError::malformed(E::KIND.collection(), e.to_string()))
}

/// Decode a batch of stored documents
pub fn decode_all<E: Entity>(documents: Vec<Value>) -> StoreResult<Vec<E>> {
    documents.into_iter().map(decode::<E>).collect()
}
