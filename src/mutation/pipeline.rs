//! Mutation Pipeline
//!
//! Validates and applies create/update/delete for each entity type, then
//! hands the committed result to the change notifier.
//!
//! Order of work for every mutation:
//! 1. validate the input
//! 2. check references (strict policy, orders only)
//! 3. write through the store
//! 4. publish the change event
//!
//! A failure in steps 1-3 returns an error and publishes nothing. Step 4
//! never fails the mutation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::error::{CoreError, CoreResult};
use crate::model::{Entity, EntityId, EntityKind, Order, Product, User};
use crate::observability::MetricsRegistry;
use crate::realtime::{ChangeNotifier, EventPayload, Topic, Verb};
use crate::resolver::ReferenceResolver;
use crate::store::{decode, DocumentStore};

use super::inputs::{NewOrder, NewProduct, NewUser, OrderPatch, ProductPatch, UserPatch};
use super::validate::Validate;

/// How order references are checked on write
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferencePolicy {
    /// References are stored as given
    #[default]
    Permissive,
    /// Every referenced product and user must exist at write time
    Strict,
}

fn event_name(kind: EntityKind, verb: Verb) -> &'static str {
    match (kind, verb) {
        (EntityKind::Product, Verb::Added) => "PRODUCT_CREATED",
        (EntityKind::Product, Verb::Updated) => "PRODUCT_UPDATED",
        (EntityKind::Product, Verb::Deleted) => "PRODUCT_DELETED",
        (EntityKind::User, Verb::Added) => "USER_CREATED",
        (EntityKind::User, Verb::Updated) => "USER_UPDATED",
        (EntityKind::User, Verb::Deleted) => "USER_DELETED",
        (EntityKind::Order, Verb::Added) => "ORDER_CREATED",
        (EntityKind::Order, Verb::Updated) => "ORDER_UPDATED",
        (EntityKind::Order, Verb::Deleted) => "ORDER_DELETED",
    }
}

/// Write path for products, users and orders
#[derive(Clone)]
pub struct MutationPipeline {
    store: Arc<dyn DocumentStore>,
    notifier: Arc<ChangeNotifier>,
    resolver: ReferenceResolver,
    policy: ReferencePolicy,
    metrics: Arc<MetricsRegistry>,
}

impl MutationPipeline {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        notifier: Arc<ChangeNotifier>,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        Self {
            resolver: ReferenceResolver::new(Arc::clone(&store)),
            store,
            notifier,
            policy: ReferencePolicy::default(),
            metrics,
        }
    }

    pub fn with_policy(mut self, policy: ReferencePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn notifier(&self) -> &Arc<ChangeNotifier> {
        &self.notifier
    }

    // Products

    pub async fn create_product(&self, input: NewProduct) -> CoreResult<Product> {
        let result: CoreResult<Product> = async {
            input.validate()?;
            self.insert::<Product, _>(&input).await
        }
        .await;
        self.commit(Verb::Added, result).await
    }

    pub async fn update_product(&self, id: &str, patch: ProductPatch) -> CoreResult<Product> {
        let result: CoreResult<Product> = async {
            patch.validate()?;
            self.patch::<Product, _>(id, &patch).await
        }
        .await;
        self.commit(Verb::Updated, result).await
    }

    pub async fn delete_product(&self, id: &str) -> CoreResult<bool> {
        self.delete::<Product>(id).await
    }

    // Users

    pub async fn create_user(&self, input: NewUser) -> CoreResult<User> {
        let result: CoreResult<User> = async {
            input.validate()?;
            self.insert::<User, _>(&input).await
        }
        .await;
        self.commit(Verb::Added, result).await
    }

    pub async fn update_user(&self, id: &str, patch: UserPatch) -> CoreResult<User> {
        let result: CoreResult<User> = async {
            patch.validate()?;
            self.patch::<User, _>(id, &patch).await
        }
        .await;
        self.commit(Verb::Updated, result).await
    }

    /// Orders referencing the user keep the dangling identity
    pub async fn delete_user(&self, id: &str) -> CoreResult<bool> {
        self.delete::<User>(id).await
    }

    // Orders

    pub async fn create_order(&self, input: NewOrder) -> CoreResult<Order> {
        let result: CoreResult<Order> = async {
            input.validate()?;
            self.check_references(Some(&input.user), Some(input.products.as_slice()))
                .await?;
            self.insert::<Order, _>(&input).await
        }
        .await;
        self.commit(Verb::Added, result).await
    }

    pub async fn update_order(&self, id: &str, patch: OrderPatch) -> CoreResult<Order> {
        let result: CoreResult<Order> = async {
            patch.validate()?;
            if patch.touches_references() {
                self.check_references(patch.user.as_ref(), patch.products.as_deref())
                    .await?;
            }
            self.patch::<Order, _>(id, &patch).await
        }
        .await;
        self.commit(Verb::Updated, result).await
    }

    pub async fn delete_order(&self, id: &str) -> CoreResult<bool> {
        self.delete::<Order>(id).await
    }

    // Shared write path

    async fn insert<E: Entity, I: Serialize + Sync>(&self, input: &I) -> CoreResult<E> {
        let document = serde_json::to_value(input)?;
        let stored = self.store.insert(E::KIND, document).await?;
        Ok(decode(stored)?)
    }

    async fn patch<E: Entity, P: Serialize + Sync>(&self, id: &str, patch: &P) -> CoreResult<E> {
        let document = serde_json::to_value(patch)?;
        match self.store.update(E::KIND, id, document).await? {
            Some(updated) => Ok(decode(updated)?),
            None => Err(CoreError::not_found(E::KIND, id)),
        }
    }

    async fn delete<E: Entity>(&self, id: &str) -> CoreResult<bool> {
        let result = self.store.delete(E::KIND, id).await.map_err(CoreError::from);
        let removed = self.settle(E::KIND, Verb::Deleted, result)?;

        if removed {
            tracing::info!(id = %id, "{}", event_name(E::KIND, Verb::Deleted));
            self.notify(Topic::new(E::KIND, Verb::Deleted), EventPayload::id(id))
                .await;
        } else {
            tracing::debug!(kind = %E::KIND, id = %id, "DELETE_NOOP");
        }

        Ok(removed)
    }

    /// Fail with a dangling reference if strict and any identity is missing.
    ///
    /// Users and products are looked up concurrently, one batch each.
    async fn check_references(
        &self,
        user: Option<&EntityId>,
        products: Option<&[EntityId]>,
    ) -> CoreResult<()> {
        if self.policy == ReferencePolicy::Permissive {
            return Ok(());
        }

        let (users, found) = tokio::try_join!(
            self.resolver.resolve::<User, _, _>(user),
            self.resolver.resolve::<Product, _, _>(products.into_iter().flatten()),
        )?;

        if let Some(id) = user {
            if users.get(id).is_none() {
                return Err(CoreError::dangling(EntityKind::User, id.as_str()));
            }
        }
        for id in products.into_iter().flatten() {
            if found.get(id).is_none() {
                return Err(CoreError::dangling(EntityKind::Product, id.as_str()));
            }
        }

        Ok(())
    }

    /// Record the outcome of a write attempt
    fn settle<T>(&self, kind: EntityKind, verb: Verb, result: CoreResult<T>) -> CoreResult<T> {
        match &result {
            Ok(_) => self.metrics.increment_mutations_applied(),
            Err(e) => {
                self.metrics.increment_mutations_rejected();
                tracing::warn!(
                    kind = %kind,
                    verb = %verb,
                    code = e.code(),
                    error = %e,
                    "MUTATION_REJECTED"
                );
            }
        }
        result
    }

    /// Settle a create or update and publish the resulting entity
    async fn commit<E: Entity>(&self, verb: Verb, result: CoreResult<E>) -> CoreResult<E> {
        let entity = self.settle(E::KIND, verb, result)?;
        tracing::info!(id = %entity.id(), "{}", event_name(E::KIND, verb));

        match EventPayload::entity(&entity) {
            Ok(payload) => self.notify(Topic::new(E::KIND, verb), payload).await,
            Err(e) => tracing::error!(id = %entity.id(), error = %e, "EVENT_ENCODE_FAILED"),
        }

        Ok(entity)
    }

    async fn notify(&self, topic: Topic, payload: EventPayload) {
        if let Err(e) = self.notifier.publish(topic, payload).await {
            tracing::warn!(topic = %topic, code = e.code(), error = %e, "EVENT_PUBLISH_FAILED");
        }
    }
}
