use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Entity, EntityId, EntityKind};

/// Order lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An order as stored: references are raw identities.
///
/// Use the selection executor to obtain the referenced products and user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: EntityId,
    /// Referenced products, in order
    pub products: Vec<EntityId>,
    /// Owning user
    pub user: EntityId,
    pub total: i64,
    pub status: OrderStatus,
}

impl Order {
    /// Names of the relationship fields on an order
    pub const RELATIONSHIPS: &'static [&'static str] = &["user", "products"];
}

impl Entity for Order {
    const KIND: EntityKind = EntityKind::Order;
    const SCALAR_FIELDS: &'static [&'static str] = &["id", "total", "status"];

    fn id(&self) -> &str {
        &self.id
    }
}
