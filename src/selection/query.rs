//! Base queries understood by the selection executor

use serde::{Deserialize, Serialize};

use crate::model::{EntityId, EntityKind};

/// Entry point of a graph-shaped read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "query", rename_all = "snake_case")]
pub enum Query {
    /// One product by identity
    Product { id: EntityId },
    /// All products, optionally only ACTIVE ones
    Products {
        #[serde(default)]
        active_only: bool,
    },
    /// One user by identity
    User { id: EntityId },
    /// All users
    Users,
    /// One order by identity
    Order { id: EntityId },
    /// All orders, optionally only those owned by one user
    Orders {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        user_id: Option<EntityId>,
    },
}

impl Query {
    /// Entity kind at the root of the result
    pub fn kind(&self) -> EntityKind {
        match self {
            Query::Product { .. } | Query::Products { .. } => EntityKind::Product,
            Query::User { .. } | Query::Users => EntityKind::User,
            Query::Order { .. } | Query::Orders { .. } => EntityKind::Order,
        }
    }

    /// Whether the result is a single (possibly absent) entity
    pub fn is_single(&self) -> bool {
        matches!(
            self,
            Query::Product { .. } | Query::User { .. } | Query::Order { .. }
        )
    }
}
