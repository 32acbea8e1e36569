//! # Reference Resolver
//!
//! Turns a set of foreign-key values into entities with one batched store
//! lookup per referenced type.
//!
//! Callers collect the union of identities needed across a whole result set,
//! resolve them once, then map the results back onto each parent record via
//! [`ResolvedMap::reference`]. Identities that do not resolve become
//! [`Reference::Unresolved`]; a dangling reference never fails the query.

mod reference;

pub use reference::Reference;

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::model::Entity;
use crate::store::{decode, DocumentStore, StoreResult};

/// Entities resolved in one pass, keyed by identity
#[derive(Debug, Clone)]
pub struct ResolvedMap<E> {
    entries: HashMap<String, E>,
}

impl<E: Entity> ResolvedMap<E> {
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&E> {
        self.entries.get(id)
    }

    /// Reference for `id`: the entity if it resolved, an unresolved marker
    /// otherwise
    pub fn reference(&self, id: &str) -> Reference<E> {
        match self.entries.get(id) {
            Some(entity) => Reference::Resolved(entity.clone()),
            None => Reference::Unresolved { id: id.to_string() },
        }
    }

    /// References for a sequence of identities, preserving positions
    pub fn references<S: AsRef<str>>(&self, ids: &[S]) -> Vec<Reference<E>> {
        ids.iter().map(|id| self.reference(id.as_ref())).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Batched by-type resolver over a document store
#[derive(Clone)]
pub struct ReferenceResolver {
    store: Arc<dyn DocumentStore>,
}

impl ReferenceResolver {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Resolve every identity in `ids` to an entity of type `E`.
    ///
    /// Duplicates are collapsed before the lookup. Issues exactly one store
    /// lookup, or none when `ids` is empty.
    pub async fn resolve<E, I, S>(&self, ids: I) -> StoreResult<ResolvedMap<E>>
    where
        E: Entity,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let unique: BTreeSet<String> = ids.into_iter().map(|s| s.as_ref().to_string()).collect();
        if unique.is_empty() {
            return Ok(ResolvedMap::empty());
        }

        let wanted: Vec<String> = unique.into_iter().collect();
        let documents = self.store.find_many(E::KIND, &wanted).await?;

        let mut entries = HashMap::with_capacity(documents.len());
        for document in documents {
            let entity: E = decode(document)?;
            entries.insert(entity.id().to_string(), entity);
        }

        tracing::debug!(
            kind = %E::KIND,
            requested = wanted.len(),
            resolved = entries.len(),
            "REFERENCES_RESOLVED"
        );

        Ok(ResolvedMap { entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntityKind, User};
    use crate::store::InMemoryStore;
    use serde_json::json;

    async fn seed_users(store: &InMemoryStore, names: &[&str]) -> Vec<String> {
        let mut ids = Vec::new();
        for name in names {
            let doc = store
                .insert(
                    EntityKind::User,
                    json!({"username": name, "email": format!("{}@example.com", name), "role": "CUSTOMER"}),
                )
                .await
                .unwrap();
            ids.push(doc["id"].as_str().unwrap().to_string());
        }
        ids
    }

    #[tokio::test]
    async fn test_resolve_issues_one_lookup() {
        let store = Arc::new(InMemoryStore::new());
        let ids = seed_users(&store, &["a", "b", "c"]).await;
        let resolver = ReferenceResolver::new(store.clone());

        let requested = vec![ids[0].clone(), ids[1].clone(), ids[0].clone(), ids[2].clone()];
        let resolved = resolver.resolve::<User, _, _>(&requested).await.unwrap();

        assert_eq!(resolved.len(), 3);
        assert_eq!(resolved.get(&ids[1]).unwrap().username, "b");
        assert_eq!(store.metrics().lookups(EntityKind::User), 1);
    }

    #[tokio::test]
    async fn test_empty_ids_skip_lookup() {
        let store = Arc::new(InMemoryStore::new());
        let resolver = ReferenceResolver::new(store.clone());

        let resolved = resolver
            .resolve::<User, _, _>(Vec::<String>::new())
            .await
            .unwrap();

        assert!(resolved.is_empty());
        assert_eq!(store.metrics().lookups(EntityKind::User), 0);
    }

    #[tokio::test]
    async fn test_missing_identity_is_unresolved() {
        let store = Arc::new(InMemoryStore::new());
        let ids = seed_users(&store, &["a"]).await;
        let resolver = ReferenceResolver::new(store.clone());

        let resolved = resolver
            .resolve::<User, _, _>([ids[0].as_str(), "ghost"])
            .await
            .unwrap();

        assert!(resolved.reference(&ids[0]).is_resolved());
        assert_eq!(
            resolved.reference("ghost"),
            Reference::Unresolved {
                id: "ghost".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_references_keep_positions() {
        let store = Arc::new(InMemoryStore::new());
        let ids = seed_users(&store, &["a", "b"]).await;
        let resolver = ReferenceResolver::new(store.clone());

        let wanted = vec![ids[1].clone(), "ghost".to_string(), ids[0].clone()];
        let resolved = resolver.resolve::<User, _, _>(&wanted).await.unwrap();
        let refs = resolved.references(&wanted);

        assert_eq!(refs[0].as_resolved().unwrap().username, "b");
        assert!(!refs[1].is_resolved());
        assert_eq!(refs[2].as_resolved().unwrap().username, "a");
    }
}
