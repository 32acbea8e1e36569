//! # Change Events
//!
//! Topics and the events published on them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{Entity, EntityId, EntityKind, ID_FIELD};

/// What happened to the entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verb {
    Added,
    Updated,
    Deleted,
}

impl Verb {
    pub const ALL: [Verb; 3] = [Verb::Added, Verb::Updated, Verb::Deleted];

    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Added => "added",
            Verb::Updated => "updated",
            Verb::Deleted => "deleted",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Key under which change events are published
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Topic {
    pub entity: EntityKind,
    pub verb: Verb,
}

impl Topic {
    pub fn new(entity: EntityKind, verb: Verb) -> Self {
        Self { entity, verb }
    }

    /// Every (entity, verb) pair
    pub fn all() -> impl Iterator<Item = Topic> {
        EntityKind::ALL
            .into_iter()
            .flat_map(|entity| Verb::ALL.into_iter().map(move |verb| Topic::new(entity, verb)))
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.entity, self.verb)
    }
}

/// Event body: the entity after the change, or the identity that was removed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventPayload {
    Entity(Value),
    Id(EntityId),
}

impl EventPayload {
    /// Payload carrying a full entity
    pub fn entity<E: Entity>(entity: &E) -> Result<Self, serde_json::Error> {
        serde_json::to_value(entity).map(EventPayload::Entity)
    }

    /// Payload carrying only an identity
    pub fn id(id: impl Into<EntityId>) -> Self {
        EventPayload::Id(id.into())
    }

    /// Identity of the affected entity
    pub fn entity_id(&self) -> Option<&str> {
        match self {
            EventPayload::Entity(value) => value.get(ID_FIELD).and_then(Value::as_str),
            EventPayload::Id(id) => Some(id.as_str()),
        }
    }
}

/// A change event as delivered to subscribers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Monotonically increasing per topic, starting at 1
    pub sequence: u64,

    pub topic: Topic,

    pub payload: EventPayload,

    /// Time the event was published
    pub timestamp: DateTime<Utc>,
}

impl ChangeEvent {
    pub fn new(sequence: u64, topic: Topic, payload: EventPayload) -> Self {
        Self {
            sequence,
            topic,
            payload,
            timestamp: Utc::now(),
        }
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.payload.entity_id()
    }

    /// Flat form handed to transport collaborators
    pub fn to_wire_format(&self) -> Value {
        let (entity, id) = match &self.payload {
            EventPayload::Entity(value) => (Some(value.clone()), self.entity_id()),
            EventPayload::Id(id) => (None, Some(id.as_str())),
        };

        serde_json::json!({
            "type": "change",
            "entityType": self.topic.entity,
            "verb": self.topic.verb,
            "sequence": self.sequence,
            "id": id,
            "entity": entity,
            "commit_timestamp": self.timestamp.to_rfc3339(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_topic_display() {
        let topic = Topic::new(EntityKind::Product, Verb::Added);
        assert_eq!(topic.to_string(), "product.added");
    }

    #[test]
    fn test_all_topics() {
        let topics: Vec<Topic> = Topic::all().collect();
        assert_eq!(topics.len(), 9);
        assert!(topics.contains(&Topic::new(EntityKind::Order, Verb::Deleted)));
    }

    #[test]
    fn test_payload_entity_id() {
        let added = EventPayload::Entity(json!({"id": "p1", "name": "KeyBoard"}));
        assert_eq!(added.entity_id(), Some("p1"));

        let deleted = EventPayload::id("p1");
        assert_eq!(deleted.entity_id(), Some("p1"));
    }

    #[test]
    fn test_wire_format() {
        let event = ChangeEvent::new(
            3,
            Topic::new(EntityKind::User, Verb::Deleted),
            EventPayload::id("u1"),
        );

        let wire = event.to_wire_format();
        assert_eq!(wire["type"], "change");
        assert_eq!(wire["entityType"], "user");
        assert_eq!(wire["verb"], "deleted");
        assert_eq!(wire["sequence"], 3);
        assert_eq!(wire["id"], "u1");
        assert!(wire["entity"].is_null());
    }

    #[test]
    fn test_payload_serde() {
        let json = serde_json::to_value(EventPayload::id("o1")).unwrap();
        assert_eq!(json, json!({"id": "o1"}));
    }
}
