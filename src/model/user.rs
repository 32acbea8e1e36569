use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Entity, EntityId, EntityKind};

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    Admin,
    #[default]
    Customer,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "ADMIN",
            UserRole::Customer => "CUSTOMER",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A registered user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: EntityId,
    pub username: String,
    pub email: String,
    pub role: UserRole,
}

impl Entity for User {
    const KIND: EntityKind = EntityKind::User;
    const SCALAR_FIELDS: &'static [&'static str] = &["id", "username", "email", "role"];

    fn id(&self) -> &str {
        &self.id
    }
}
