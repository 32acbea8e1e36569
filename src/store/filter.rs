//! Store-level document filters
//!
//! Filters are evaluated inside the store so collection queries never fetch
//! documents the caller is going to discard.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::ID_FIELD;

/// Comparison applied to one document field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    /// Field equals the value
    Eq,
    /// Field equals one of the values in an array
    In,
}

/// A single field predicate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldFilter {
    pub field: String,
    pub operator: FilterOperator,
    pub value: Value,
}

impl FieldFilter {
    /// Check if a document satisfies this predicate
    pub fn matches(&self, doc: &Value) -> bool {
        let Some(field_value) = doc.get(&self.field) else {
            return false;
        };

        match self.operator {
            FilterOperator::Eq => field_value == &self.value,
            FilterOperator::In => self
                .value
                .as_array()
                .map(|candidates| candidates.contains(field_value))
                .unwrap_or(false),
        }
    }
}

/// Conjunction of field predicates. An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub conditions: Vec<FieldFilter>,
}

impl Filter {
    /// Match every document
    pub fn all() -> Self {
        Self::default()
    }

    /// Match documents whose `field` equals `value`
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::all().and_eq(field, value)
    }

    /// Add an equality predicate
    pub fn and_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(FieldFilter {
            field: field.into(),
            operator: FilterOperator::Eq,
            value: value.into(),
        });
        self
    }

    /// Match documents whose identity is one of `ids`
    pub fn id_in<S: AsRef<str>>(ids: &[S]) -> Self {
        let values = ids
            .iter()
            .map(|id| Value::String(id.as_ref().to_string()))
            .collect();

        Self {
            conditions: vec![FieldFilter {
                field: ID_FIELD.to_string(),
                operator: FilterOperator::In,
                value: Value::Array(values),
            }],
        }
    }

    /// Check if a document satisfies every predicate
    pub fn matches(&self, doc: &Value) -> bool {
        self.conditions.iter().all(|c| c.matches(doc))
    }
}
