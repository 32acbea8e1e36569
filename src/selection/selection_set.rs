//! Field-selection trees
//!
//! A selection is written as a JSON array whose items are either a field
//! name or a single-key object naming a relationship and its own selection:
//!
//! ```json
//! ["id", "total", {"user": ["username"]}, {"products": ["name", "price"]}]
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One requested field and, for relationships, its nested selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    /// Nested selection. Empty for scalars, and for relationships means
    /// "every scalar field of the referenced entity".
    pub selection: SelectionSet,
}

/// Ordered set of requested fields. Empty selects every scalar field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<RawField>", into = "Vec<RawField>")]
pub struct SelectionSet {
    fields: Vec<Field>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selection of plain field names
    pub fn of<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names.into_iter().fold(Self::new(), |set, name| set.field(name))
    }

    /// Add a leaf field
    pub fn field(self, name: impl Into<String>) -> Self {
        self.nested(name, SelectionSet::new())
    }

    /// Add a relationship field with its nested selection
    pub fn nested(mut self, name: impl Into<String>, selection: SelectionSet) -> Self {
        self.fields.push(Field {
            name: name.into(),
            selection,
        });
        self
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawField {
    Name(String),
    Nested(BTreeMap<String, Vec<RawField>>),
}

impl From<Vec<RawField>> for SelectionSet {
    fn from(raw: Vec<RawField>) -> Self {
        let mut fields = Vec::with_capacity(raw.len());
        for item in raw {
            match item {
                RawField::Name(name) => fields.push(Field {
                    name,
                    selection: SelectionSet::new(),
                }),
                RawField::Nested(map) => {
                    for (name, children) in map {
                        fields.push(Field {
                            name,
                            selection: SelectionSet::from(children),
                        });
                    }
                }
            }
        }
        Self { fields }
    }
}

impl From<SelectionSet> for Vec<RawField> {
    fn from(set: SelectionSet) -> Self {
        set.fields
            .into_iter()
            .map(|field| {
                if field.selection.is_empty() {
                    RawField::Name(field.name)
                } else {
                    let mut map = BTreeMap::new();
                    map.insert(field.name, Vec::<RawField>::from(field.selection));
                    RawField::Nested(map)
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_nested_selection() {
        let selection: SelectionSet = serde_json::from_value(json!([
            "id",
            {"user": ["username"]},
            {"products": ["name", "price"]}
        ]))
        .unwrap();

        assert_eq!(selection.fields().len(), 3);
        assert!(selection.get("id").unwrap().selection.is_empty());
        assert!(selection.get("user").unwrap().selection.contains("username"));
        assert_eq!(selection.get("products").unwrap().selection.fields().len(), 2);
    }

    #[test]
    fn test_builder_matches_parsed() {
        let built = SelectionSet::of(["id", "total"])
            .nested("user", SelectionSet::of(["username"]));
        let parsed: SelectionSet =
            serde_json::from_value(json!(["id", "total", {"user": ["username"]}])).unwrap();

        assert_eq!(built, parsed);
    }

    #[test]
    fn test_serializes_back_to_compact_form() {
        let selection = SelectionSet::of(["id"]).nested("user", SelectionSet::of(["email"]));
        let json = serde_json::to_value(&selection).unwrap();

        assert_eq!(json, json!(["id", {"user": ["email"]}]));
    }

    #[test]
    fn test_rejects_non_array() {
        assert!(serde_json::from_value::<SelectionSet>(json!({"id": true})).is_err());
    }
}
