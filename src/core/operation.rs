//! Unified Operation Model
//!
//! Every read and write the gateway accepts is one variant of [`Operation`].
//! On the wire an operation is a JSON object tagged by `op`:
//!
//! ```json
//! {"op": "create_product", "input": {"name": "KeyBoard", "price": 99}}
//! {"op": "get_order", "id": "..."}
//! {"op": "select", "query": {"query": "orders"}, "selection": ["id", {"user": ["username"]}]}
//! ```

use serde::{Deserialize, Serialize};

use crate::model::EntityId;
use crate::mutation::{NewOrder, NewProduct, NewUser, OrderPatch, ProductPatch, UserPatch};
use crate::selection::{Query, SelectionSet};

/// All operations routed through the gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    // Reads
    GetProduct {
        id: EntityId,
    },
    ListProducts {
        #[serde(default)]
        active_only: bool,
    },
    GetUser {
        id: EntityId,
    },
    ListUsers,
    GetOrder {
        id: EntityId,
    },
    ListOrders {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        user_id: Option<EntityId>,
    },

    /// Graph-shaped read with an explicit field selection
    Select {
        query: Query,
        #[serde(default)]
        selection: SelectionSet,
    },

    // Writes
    CreateProduct {
        input: NewProduct,
    },
    UpdateProduct {
        id: EntityId,
        patch: ProductPatch,
    },
    DeleteProduct {
        id: EntityId,
    },
    CreateUser {
        input: NewUser,
    },
    UpdateUser {
        id: EntityId,
        patch: UserPatch,
    },
    DeleteUser {
        id: EntityId,
    },
    CreateOrder {
        input: NewOrder,
    },
    UpdateOrder {
        id: EntityId,
        patch: OrderPatch,
    },
    DeleteOrder {
        id: EntityId,
    },

    /// Current counter values
    Metrics,
}

impl Operation {
    /// Get operation name for metrics/logging
    pub fn name(&self) -> &'static str {
        match self {
            Self::GetProduct { .. } => "get_product",
            Self::ListProducts { .. } => "list_products",
            Self::GetUser { .. } => "get_user",
            Self::ListUsers => "list_users",
            Self::GetOrder { .. } => "get_order",
            Self::ListOrders { .. } => "list_orders",
            Self::Select { .. } => "select",
            Self::CreateProduct { .. } => "create_product",
            Self::UpdateProduct { .. } => "update_product",
            Self::DeleteProduct { .. } => "delete_product",
            Self::CreateUser { .. } => "create_user",
            Self::UpdateUser { .. } => "update_user",
            Self::DeleteUser { .. } => "delete_user",
            Self::CreateOrder { .. } => "create_order",
            Self::UpdateOrder { .. } => "update_order",
            Self::DeleteOrder { .. } => "delete_order",
            Self::Metrics => "metrics",
        }
    }

    /// Whether this operation writes to the store
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::CreateProduct { .. }
                | Self::UpdateProduct { .. }
                | Self::DeleteProduct { .. }
                | Self::CreateUser { .. }
                | Self::UpdateUser { .. }
                | Self::DeleteUser { .. }
                | Self::CreateOrder { .. }
                | Self::UpdateOrder { .. }
                | Self::DeleteOrder { .. }
        )
    }
}
