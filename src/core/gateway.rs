//! Gateway
//!
//! Single entry point that dispatches an [`Operation`] to the selection
//! executor or the mutation pipeline and renders the result as JSON.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use serde_json::Value;

use crate::config::ShopConfig;
use crate::model::EntityKind;
use crate::mutation::MutationPipeline;
use crate::observability::MetricsRegistry;
use crate::realtime::{ChangeNotifier, NotifierResult, Subscription, Topic, Verb};
use crate::selection::{OrderFields, SelectionExecutor};
use crate::store::{DocumentStore, InMemoryStore};

use super::error::CoreResult;
use super::operation::Operation;

fn to_json<T: Serialize>(value: &T) -> CoreResult<Value> {
    Ok(serde_json::to_value(value)?)
}

/// Wires the store, the executor, the pipeline and the notifier together
#[derive(Clone)]
pub struct Gateway {
    executor: SelectionExecutor,
    mutations: MutationPipeline,
    notifier: Arc<ChangeNotifier>,
    metrics: Arc<MetricsRegistry>,
}

impl Gateway {
    /// Build a gateway over an existing store.
    ///
    /// `metrics` should be the registry the store reports lookups to.
    pub fn new(store: Arc<dyn DocumentStore>, metrics: Arc<MetricsRegistry>, config: &ShopConfig) -> Self {
        let notifier = Arc::new(ChangeNotifier::new(
            config.notifier_config(),
            Arc::clone(&metrics),
        ));
        let mutations = MutationPipeline::new(
            Arc::clone(&store),
            Arc::clone(&notifier),
            Arc::clone(&metrics),
        )
        .with_policy(config.reference_policy);

        Self {
            executor: SelectionExecutor::new(store, Arc::clone(&metrics)),
            mutations,
            notifier,
            metrics,
        }
    }

    /// Build a gateway over a fresh in-memory store
    pub fn in_memory(config: &ShopConfig) -> Self {
        let metrics = Arc::new(MetricsRegistry::new());
        let store = Arc::new(InMemoryStore::with_metrics(Arc::clone(&metrics)));
        Self::new(store, metrics, config)
    }

    pub fn executor(&self) -> &SelectionExecutor {
        &self.executor
    }

    pub fn mutations(&self) -> &MutationPipeline {
        &self.mutations
    }

    pub fn notifier(&self) -> &Arc<ChangeNotifier> {
        &self.notifier
    }

    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    /// Register for change events of one entity type and verb
    pub fn subscribe(&self, entity: EntityKind, verb: Verb) -> NotifierResult<Subscription> {
        self.notifier.subscribe(Topic::new(entity, verb))
    }

    /// Execute one operation
    pub async fn execute(&self, operation: Operation) -> CoreResult<Value> {
        let started = Instant::now();
        let name = operation.name();
        let mutation = operation.is_mutation();

        let result = self.dispatch(operation).await;

        match &result {
            Ok(_) => tracing::debug!(
                op = name,
                mutation,
                duration_ms = started.elapsed().as_millis() as u64,
                "OPERATION_OK"
            ),
            Err(e) => tracing::debug!(op = name, mutation, code = e.code(), "OPERATION_FAILED"),
        }

        result
    }

    async fn dispatch(&self, operation: Operation) -> CoreResult<Value> {
        let executor = &self.executor;
        let mutations = &self.mutations;

        match operation {
            Operation::GetProduct { id } => to_json(&executor.get_product(&id).await?),
            Operation::ListProducts { active_only } => {
                to_json(&executor.list_products(active_only).await?)
            }
            Operation::GetUser { id } => to_json(&executor.get_user(&id).await?),
            Operation::ListUsers => to_json(&executor.list_users().await?),
            Operation::GetOrder { id } => match executor.get_order(&id, OrderFields::ALL).await? {
                Some(order) => order.to_value(),
                None => Ok(Value::Null),
            },
            Operation::ListOrders { user_id } => executor
                .list_orders(user_id.as_deref(), OrderFields::ALL)
                .await?
                .iter()
                .map(|order| order.to_value())
                .collect::<CoreResult<Vec<_>>>()
                .map(Value::Array),
            Operation::Select { query, selection } => executor.execute(&query, &selection).await,

            Operation::CreateProduct { input } => to_json(&mutations.create_product(input).await?),
            Operation::UpdateProduct { id, patch } => {
                to_json(&mutations.update_product(&id, patch).await?)
            }
            Operation::DeleteProduct { id } => Ok(Value::Bool(mutations.delete_product(&id).await?)),
            Operation::CreateUser { input } => to_json(&mutations.create_user(input).await?),
            Operation::UpdateUser { id, patch } => to_json(&mutations.update_user(&id, patch).await?),
            Operation::DeleteUser { id } => Ok(Value::Bool(mutations.delete_user(&id).await?)),
            Operation::CreateOrder { input } => to_json(&mutations.create_order(input).await?),
            Operation::UpdateOrder { id, patch } => {
                to_json(&mutations.update_order(&id, patch).await?)
            }
            Operation::DeleteOrder { id } => Ok(Value::Bool(mutations.delete_order(&id).await?)),

            Operation::Metrics => to_json(&self.metrics.snapshot()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn op(value: Value) -> Operation {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_create_then_get_product() {
        let gateway = Gateway::in_memory(&ShopConfig::default());

        let created = gateway
            .execute(op(json!({"op": "create_product", "input": {"name": "KeyBoard", "price": 99}})))
            .await
            .unwrap();
        let id = created["id"].as_str().unwrap().to_string();

        let fetched = gateway.execute(op(json!({"op": "get_product", "id": id}))).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched["status"], "ACTIVE");
    }

    #[tokio::test]
    async fn test_absent_lookup_is_null() {
        let gateway = Gateway::in_memory(&ShopConfig::default());

        let product = gateway.execute(op(json!({"op": "get_product", "id": "nope"}))).await.unwrap();
        assert!(product.is_null());

        let order = gateway.execute(op(json!({"op": "get_order", "id": "nope"}))).await.unwrap();
        assert!(order.is_null());
    }

    #[tokio::test]
    async fn test_delete_returns_bool() {
        let gateway = Gateway::in_memory(&ShopConfig::default());
        let result = gateway.execute(op(json!({"op": "delete_user", "id": "nope"}))).await.unwrap();
        assert_eq!(result, json!(false));
    }

    #[tokio::test]
    async fn test_update_missing_surfaces_not_found() {
        let gateway = Gateway::in_memory(&ShopConfig::default());
        let err = gateway
            .execute(op(json!({"op": "update_order", "id": "nope", "patch": {"total": 5}})))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_subscribe_receives_mutation_events() {
        let gateway = Gateway::in_memory(&ShopConfig::default());
        let mut added = gateway.subscribe(EntityKind::User, Verb::Added).unwrap();

        gateway
            .execute(op(json!({"op": "create_user", "input": {"username": "user_1", "email": "u1@example.com"}})))
            .await
            .unwrap();

        let event = added.try_recv().unwrap();
        assert_eq!(event.topic, Topic::new(EntityKind::User, Verb::Added));
        assert_eq!(event.sequence, 1);
    }

    #[tokio::test]
    async fn test_metrics_operation() {
        let gateway = Gateway::in_memory(&ShopConfig::default());
        gateway.execute(op(json!({"op": "list_users"}))).await.unwrap();

        let metrics = gateway.execute(op(json!({"op": "metrics"}))).await.unwrap();
        assert_eq!(metrics["queries_executed"], 1);
        assert_eq!(metrics["user_lookups"], 1);
    }
}
