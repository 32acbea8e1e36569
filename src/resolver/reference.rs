use serde::{Serialize, Serializer};

use crate::model::Entity;

/// Outcome of resolving one reference field value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference<E> {
    /// The referenced entity exists
    Resolved(E),
    /// The identity did not resolve (deleted or never existed)
    Unresolved { id: String },
}

impl<E: Entity> Reference<E> {
    /// Identity this reference points at, resolved or not
    pub fn id(&self) -> &str {
        match self {
            Reference::Resolved(entity) => entity.id(),
            Reference::Unresolved { id } => id,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Reference::Resolved(_))
    }

    pub fn as_resolved(&self) -> Option<&E> {
        match self {
            Reference::Resolved(entity) => Some(entity),
            Reference::Unresolved { .. } => None,
        }
    }
}

/// Resolved references serialize as the entity, unresolved ones as `null`
impl<E: Serialize> Serialize for Reference<E> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Reference::Resolved(entity) => entity.serialize(serializer),
            Reference::Unresolved { .. } => serializer.serialize_none(),
        }
    }
}
