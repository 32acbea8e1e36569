//! Reference Resolution Tests
//!
//! - One store lookup per referenced type per read, regardless of result size
//! - Zero lookups when nothing needs resolving
//! - Missing references resolve to an explicit unresolved marker

use std::sync::Arc;

use serde_json::{json, Value};

use shopgraph::model::{EntityKind, User};
use shopgraph::observability::MetricsRegistry;
use shopgraph::resolver::{Reference, ReferenceResolver};
use shopgraph::selection::{OrderFields, Query, SelectionExecutor, SelectionSet};
use shopgraph::store::{DocumentStore, InMemoryStore};

// =============================================================================
// Helper Functions
// =============================================================================

struct Shop {
    store: Arc<InMemoryStore>,
    metrics: Arc<MetricsRegistry>,
    executor: SelectionExecutor,
}

fn shop() -> Shop {
    let metrics = Arc::new(MetricsRegistry::new());
    let store = Arc::new(InMemoryStore::with_metrics(Arc::clone(&metrics)));
    let executor = SelectionExecutor::new(store.clone(), Arc::clone(&metrics));
    Shop {
        store,
        metrics,
        executor,
    }
}

async fn insert(store: &InMemoryStore, kind: EntityKind, doc: Value) -> String {
    store.insert(kind, doc).await.unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string()
}

/// Seed `users` users, `products` products and `orders` orders spread over them
async fn seed(shop: &Shop, users: usize, products: usize, orders: usize) {
    let mut user_ids = Vec::new();
    for i in 0..users {
        user_ids.push(
            insert(
                &shop.store,
                EntityKind::User,
                json!({"username": format!("user_{}", i), "email": format!("u{}@x.io", i), "role": "CUSTOMER"}),
            )
            .await,
        );
    }
    let mut product_ids = Vec::new();
    for i in 0..products {
        product_ids.push(
            insert(
                &shop.store,
                EntityKind::Product,
                json!({"name": format!("P{}", i), "price": i, "status": "ACTIVE"}),
            )
            .await,
        );
    }
    for i in 0..orders {
        let picked: Vec<&String> = product_ids.iter().skip(i % products).take(3).collect();
        insert(
            &shop.store,
            EntityKind::Order,
            json!({"products": picked, "user": user_ids[i % users], "total": i, "status": "PENDING"}),
        )
        .await;
    }
}

// =============================================================================
// Batching Tests
// =============================================================================

/// One lookup per type no matter how many orders are listed.
#[tokio::test]
async fn test_lookup_count_independent_of_result_size() {
    for orders in [1, 10, 100] {
        let shop = shop();
        seed(&shop, 5, 8, orders).await;

        let before = shop.metrics.snapshot();
        let listed = shop.executor.list_orders(None, OrderFields::ALL).await.unwrap();
        let after = shop.metrics.snapshot();

        assert_eq!(listed.len(), orders);
        assert_eq!(after.order_lookups - before.order_lookups, 1);
        assert_eq!(after.user_lookups - before.user_lookups, 1);
        assert_eq!(after.product_lookups - before.product_lookups, 1);
    }
}

/// A selection without relationships touches only the orders collection.
#[tokio::test]
async fn test_scalar_selection_skips_resolution() {
    let shop = shop();
    seed(&shop, 2, 2, 10).await;

    let before = shop.metrics.snapshot();
    shop.executor
        .execute(&Query::Orders { user_id: None }, &SelectionSet::of(["id", "total"]))
        .await
        .unwrap();
    let after = shop.metrics.snapshot();

    assert_eq!(after.user_lookups, before.user_lookups);
    assert_eq!(after.product_lookups, before.product_lookups);
}

/// Empty result set: no relationship lookups at all.
#[tokio::test]
async fn test_empty_result_issues_no_reference_lookup() {
    let shop = shop();

    let listed = shop.executor.list_orders(None, OrderFields::ALL).await.unwrap();

    assert!(listed.is_empty());
    assert_eq!(shop.metrics.lookups(EntityKind::User), 0);
    assert_eq!(shop.metrics.lookups(EntityKind::Product), 0);
}

// =============================================================================
// Resolver Tests
// =============================================================================

/// Duplicate and missing identities in one pass.
#[tokio::test]
async fn test_resolver_duplicates_and_missing() {
    let shop = shop();
    let id = insert(
        &shop.store,
        EntityKind::User,
        json!({"username": "user_1", "email": "u@x.io", "role": "ADMIN"}),
    )
    .await;

    let resolver = ReferenceResolver::new(shop.store.clone());
    let wanted = [id.as_str(), "ghost", id.as_str(), id.as_str()];
    let resolved = resolver.resolve::<User, _, _>(wanted).await.unwrap();

    assert_eq!(resolved.len(), 1);
    assert_eq!(shop.metrics.lookups(EntityKind::User), 1);

    let refs = resolved.references(&wanted);
    assert!(refs[0].is_resolved());
    assert_eq!(refs[1], Reference::Unresolved { id: "ghost".into() });
    assert_eq!(refs[2], refs[0]);
}

/// Unresolved references render as null in selections.
#[tokio::test]
async fn test_unresolved_renders_null() {
    let shop = shop();
    let id = insert(
        &shop.store,
        EntityKind::Order,
        json!({"products": ["gone"], "user": "gone", "total": 1, "status": "CANCELLED"}),
    )
    .await;

    let selection: SelectionSet = serde_json::from_value(json!(["status", "user", "products"])).unwrap();
    let result = shop
        .executor
        .execute(&Query::Order { id }, &selection)
        .await
        .unwrap();

    assert_eq!(result, json!({"status": "CANCELLED", "user": null, "products": [null]}));
}
