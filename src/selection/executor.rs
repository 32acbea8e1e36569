//! Selection Executor
//!
//! Runs the base lookup or collection query, resolves requested
//! relationship fields once per field across the entire result set, and
//! merges the resolved entities back onto each parent record.

use std::sync::Arc;

use serde_json::Value;

use crate::core::error::CoreResult;
use crate::model::{Entity, Order, Product, ProductStatus, User};
use crate::observability::MetricsRegistry;
use crate::resolver::{Reference, ReferenceResolver};
use crate::store::{decode, decode_all, DocumentStore, Filter};

use super::projection::{project, render_order, validate_selection};
use super::query::Query;
use super::selection_set::SelectionSet;

/// Which relationship fields of an order to resolve
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderFields {
    pub user: bool,
    pub products: bool,
}

impl OrderFields {
    /// Resolve every relationship
    pub const ALL: OrderFields = OrderFields {
        user: true,
        products: true,
    };

    /// Resolve nothing, return raw identities only
    pub const NONE: OrderFields = OrderFields {
        user: false,
        products: false,
    };

    /// Relationships named in a selection
    pub fn from_selection(selection: &SelectionSet) -> Self {
        Self {
            user: selection.contains("user"),
            products: selection.contains("products"),
        }
    }
}

/// An order with its requested relationships resolved.
///
/// `None` means the relationship was not requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOrder {
    pub order: Order,
    pub user: Option<Reference<User>>,
    pub products: Option<Vec<Reference<Product>>>,
}

impl ResolvedOrder {
    /// Full JSON form: the stored order with every resolved relationship
    /// substituted for its raw identities
    pub fn to_value(&self) -> CoreResult<Value> {
        let mut document = serde_json::to_value(&self.order)?;

        if let Some(obj) = document.as_object_mut() {
            if let Some(user) = &self.user {
                obj.insert("user".to_string(), serde_json::to_value(user)?);
            }
            if let Some(products) = &self.products {
                obj.insert("products".to_string(), serde_json::to_value(products)?);
            }
        }

        Ok(document)
    }
}

/// Executes reads against the store with batched reference resolution
#[derive(Clone)]
pub struct SelectionExecutor {
    store: Arc<dyn DocumentStore>,
    resolver: ReferenceResolver,
    metrics: Arc<MetricsRegistry>,
}

impl SelectionExecutor {
    pub fn new(store: Arc<dyn DocumentStore>, metrics: Arc<MetricsRegistry>) -> Self {
        Self {
            resolver: ReferenceResolver::new(Arc::clone(&store)),
            store,
            metrics,
        }
    }

    async fn fetch_one<E: Entity>(&self, id: &str) -> CoreResult<Option<E>> {
        self.metrics.increment_queries_executed();
        match self.store.find_by_id(E::KIND, id).await? {
            Some(document) => Ok(Some(decode(document)?)),
            None => Ok(None),
        }
    }

    async fn fetch_all<E: Entity>(&self, filter: &Filter) -> CoreResult<Vec<E>> {
        self.metrics.increment_queries_executed();
        let documents = self.store.find(E::KIND, filter).await?;
        Ok(decode_all(documents)?)
    }

    pub async fn get_product(&self, id: &str) -> CoreResult<Option<Product>> {
        self.fetch_one(id).await
    }

    /// Products in insertion order; `active_only` filters in the store
    pub async fn list_products(&self, active_only: bool) -> CoreResult<Vec<Product>> {
        let filter = if active_only {
            Filter::eq("status", ProductStatus::Active.as_str())
        } else {
            Filter::all()
        };
        self.fetch_all(&filter).await
    }

    pub async fn get_user(&self, id: &str) -> CoreResult<Option<User>> {
        self.fetch_one(id).await
    }

    pub async fn list_users(&self) -> CoreResult<Vec<User>> {
        self.fetch_all(&Filter::all()).await
    }

    pub async fn get_order(&self, id: &str, fields: OrderFields) -> CoreResult<Option<ResolvedOrder>> {
        let Some(order) = self.fetch_one::<Order>(id).await? else {
            return Ok(None);
        };
        let mut resolved = self.resolve_orders(vec![order], fields).await?;
        Ok(resolved.pop())
    }

    /// Orders in insertion order; `user_id` filters in the store
    pub async fn list_orders(
        &self,
        user_id: Option<&str>,
        fields: OrderFields,
    ) -> CoreResult<Vec<ResolvedOrder>> {
        let filter = match user_id {
            Some(user_id) => Filter::eq("user", user_id),
            None => Filter::all(),
        };
        let orders = self.fetch_all::<Order>(&filter).await?;
        self.resolve_orders(orders, fields).await
    }

    /// Resolve relationships for a whole result set.
    ///
    /// Issues at most one user lookup and one product lookup regardless of
    /// how many orders are passed; both run concurrently.
    pub async fn resolve_orders(
        &self,
        orders: Vec<Order>,
        fields: OrderFields,
    ) -> CoreResult<Vec<ResolvedOrder>> {
        let user_ids: Vec<&str> = if fields.user {
            orders.iter().map(|o| o.user.as_str()).collect()
        } else {
            Vec::new()
        };
        let product_ids: Vec<&str> = if fields.products {
            orders
                .iter()
                .flat_map(|o| o.products.iter().map(String::as_str))
                .collect()
        } else {
            Vec::new()
        };

        let (users, products) = tokio::try_join!(
            self.resolver.resolve::<User, _, _>(user_ids),
            self.resolver.resolve::<Product, _, _>(product_ids),
        )?;

        Ok(orders
            .into_iter()
            .map(|order| ResolvedOrder {
                user: fields.user.then(|| users.reference(&order.user)),
                products: fields.products.then(|| products.references(&order.products)),
                order,
            })
            .collect())
    }

    /// Run a graph-shaped read: base query plus field selection.
    ///
    /// Single-entity queries that find nothing yield `null`; collection
    /// queries yield an array.
    pub async fn execute(&self, query: &Query, selection: &SelectionSet) -> CoreResult<Value> {
        validate_selection(query.kind(), selection)?;

        let result = match query {
            Query::Product { id } => render_one(self.get_product(id).await?, |p| project(p, selection)),
            Query::Products { active_only } => {
                render_many(self.list_products(*active_only).await?, |p| project(p, selection))
            }
            Query::User { id } => render_one(self.get_user(id).await?, |u| project(u, selection)),
            Query::Users => render_many(self.list_users().await?, |u| project(u, selection)),
            Query::Order { id } => {
                let fields = OrderFields::from_selection(selection);
                render_one(self.get_order(id, fields).await?, |o| render_order(o, selection))
            }
            Query::Orders { user_id } => {
                let fields = OrderFields::from_selection(selection);
                render_many(self.list_orders(user_id.as_deref(), fields).await?, |o| {
                    render_order(o, selection)
                })
            }
        }?;

        tracing::debug!(kind = %query.kind(), single = query.is_single(), "SELECTION_EXECUTED");
        Ok(result)
    }
}

fn render_one<T>(item: Option<T>, render: impl Fn(&T) -> CoreResult<Value>) -> CoreResult<Value> {
    match item {
        Some(item) => render(&item),
        None => Ok(Value::Null),
    }
}

fn render_many<T>(items: Vec<T>, render: impl Fn(&T) -> CoreResult<Value>) -> CoreResult<Value> {
    items
        .iter()
        .map(render)
        .collect::<CoreResult<Vec<_>>>()
        .map(Value::Array)
}
