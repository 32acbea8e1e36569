//! Selection validation and result projection

use serde_json::{Map, Value};

use crate::core::error::{CoreError, CoreResult};
use crate::model::{Entity, EntityKind, Order, Product, User};
use crate::resolver::Reference;

use super::executor::ResolvedOrder;
use super::selection_set::SelectionSet;

/// Check a selection against the fields an entity kind exposes
pub fn validate_selection(kind: EntityKind, selection: &SelectionSet) -> CoreResult<()> {
    match kind {
        EntityKind::Product => validate_scalars::<Product>(selection),
        EntityKind::User => validate_scalars::<User>(selection),
        EntityKind::Order => {
            for field in selection.fields() {
                match field.name.as_str() {
                    "user" => validate_scalars::<User>(&field.selection)?,
                    "products" => validate_scalars::<Product>(&field.selection)?,
                    name if Order::SCALAR_FIELDS.contains(&name) => {
                        ensure_leaf(EntityKind::Order, &field.name, &field.selection)?
                    }
                    name => return Err(unknown_field(EntityKind::Order, name)),
                }
            }
            Ok(())
        }
    }
}

fn validate_scalars<E: Entity>(selection: &SelectionSet) -> CoreResult<()> {
    for field in selection.fields() {
        if !E::SCALAR_FIELDS.contains(&field.name.as_str()) {
            return Err(unknown_field(E::KIND, &field.name));
        }
        ensure_leaf(E::KIND, &field.name, &field.selection)?;
    }
    Ok(())
}

fn ensure_leaf(kind: EntityKind, name: &str, selection: &SelectionSet) -> CoreResult<()> {
    if selection.is_empty() {
        Ok(())
    } else {
        Err(CoreError::validation(format!(
            "Field `{}` on {} has no subfields",
            name, kind
        )))
    }
}

fn unknown_field(kind: EntityKind, name: &str) -> CoreError {
    CoreError::validation(format!("Unknown field `{}` on {}", name, kind))
}

fn selected_names<'a>(
    selection: &'a SelectionSet,
    defaults: &'static [&'static str],
) -> Vec<&'a str> {
    if selection.is_empty() {
        defaults.to_vec()
    } else {
        selection.fields().iter().map(|f| f.name.as_str()).collect()
    }
}

/// Project the selected scalar fields of an entity.
///
/// Absent optional fields project as `null`.
pub fn project<E: Entity>(entity: &E, selection: &SelectionSet) -> CoreResult<Value> {
    let document = serde_json::to_value(entity)?;

    let mut out = Map::new();
    for name in selected_names(selection, E::SCALAR_FIELDS) {
        let value = document.get(name).cloned().unwrap_or(Value::Null);
        out.insert(name.to_string(), value);
    }

    Ok(Value::Object(out))
}

fn render_reference<E: Entity>(
    reference: &Reference<E>,
    selection: &SelectionSet,
) -> CoreResult<Value> {
    match reference.as_resolved() {
        Some(entity) => project(entity, selection),
        None => Ok(Value::Null),
    }
}

/// Render an order with its requested relationships merged in.
///
/// A relationship that was selected but not resolved by the executor renders
/// as `null`; dangling references render as `null` in their position.
pub fn render_order(order: &ResolvedOrder, selection: &SelectionSet) -> CoreResult<Value> {
    let document = serde_json::to_value(&order.order)?;
    let empty = SelectionSet::new();

    let mut out = Map::new();
    for name in selected_names(selection, Order::SCALAR_FIELDS) {
        let nested = selection.get(name).map(|f| &f.selection).unwrap_or(&empty);

        let value = match name {
            "user" => match &order.user {
                Some(reference) => render_reference(reference, nested)?,
                None => Value::Null,
            },
            "products" => match &order.products {
                Some(references) => Value::Array(
                    references
                        .iter()
                        .map(|r| render_reference(r, nested))
                        .collect::<CoreResult<Vec<_>>>()?,
                ),
                None => Value::Null,
            },
            scalar => document.get(scalar).cloned().unwrap_or(Value::Null),
        };

        out.insert(name.to_string(), value);
    }

    Ok(Value::Object(out))
}
