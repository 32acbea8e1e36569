//! Field-level validation applied before any write reaches the store.
//!
//! Enum membership and required-field presence are enforced by decoding.
//! The rules here reject required strings that are present but blank.

use crate::core::error::{CoreError, CoreResult};

use super::inputs::{NewOrder, NewProduct, NewUser, OrderPatch, ProductPatch, UserPatch};

/// Input that can be checked before it is written
pub trait Validate {
    fn validate(&self) -> CoreResult<()>;
}

fn non_blank(field: &str, value: &str) -> CoreResult<()> {
    if value.trim().is_empty() {
        return Err(CoreError::validation(format!("`{}` must not be blank", field)));
    }
    Ok(())
}

fn product_refs(products: &[String]) -> CoreResult<()> {
    for id in products {
        non_blank("products", id)?;
    }
    Ok(())
}

impl Validate for NewProduct {
    fn validate(&self) -> CoreResult<()> {
        non_blank("name", &self.name)
    }
}

impl Validate for ProductPatch {
    fn validate(&self) -> CoreResult<()> {
        if let Some(name) = &self.name {
            non_blank("name", name)?;
        }
        Ok(())
    }
}

impl Validate for NewUser {
    fn validate(&self) -> CoreResult<()> {
        non_blank("username", &self.username)?;
        non_blank("email", &self.email)
    }
}

impl Validate for UserPatch {
    fn validate(&self) -> CoreResult<()> {
        if let Some(username) = &self.username {
            non_blank("username", username)?;
        }
        if let Some(email) = &self.email {
            non_blank("email", email)?;
        }
        Ok(())
    }
}

impl Validate for NewOrder {
    fn validate(&self) -> CoreResult<()> {
        product_refs(&self.products)?;
        non_blank("user", &self.user)
    }
}

impl Validate for OrderPatch {
    fn validate(&self) -> CoreResult<()> {
        if let Some(products) = &self.products {
            product_refs(products)?;
        }
        if let Some(user) = &self.user {
            non_blank("user", user)?;
        }
        Ok(())
    }
}
