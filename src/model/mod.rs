//! # Domain Model
//!
//! The three entity collections served by shopgraph.
//!
//! Every entity is stored as a JSON document whose `id` field is assigned by
//! the store on insert and never changes afterwards.

mod order;
mod product;
mod user;

pub use order::{Order, OrderStatus};
pub use product::{Product, ProductStatus};
pub use user::{User, UserRole};

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Name of the identity field in every stored document
pub const ID_FIELD: &str = "id";

/// Store-assigned entity identity
pub type EntityId = String;

/// The kind of entity a document, topic or reference points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Product,
    User,
    Order,
}

impl EntityKind {
    /// All entity kinds, in declaration order
    pub const ALL: [EntityKind; 3] = [EntityKind::Product, EntityKind::User, EntityKind::Order];

    /// Singular lowercase name ("product")
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Product => "product",
            EntityKind::User => "user",
            EntityKind::Order => "order",
        }
    }

    /// Collection name in the document store ("products")
    pub fn collection(&self) -> &'static str {
        match self {
            EntityKind::Product => "products",
            EntityKind::User => "users",
            EntityKind::Order => "orders",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A typed view over one stored document kind
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Which collection this entity lives in
    const KIND: EntityKind;

    /// Scalar (non-relationship) field names, in output order
    const SCALAR_FIELDS: &'static [&'static str];

    /// Store-assigned identity
    fn id(&self) -> &str;
}
