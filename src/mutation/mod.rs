//! # Mutation Module
//!
//! Create, update and delete for products, users and orders.
//!
//! - Inputs are explicit structs, one per operation
//! - Validation runs before the store is touched
//! - Every committed write publishes exactly one change event

mod inputs;
mod pipeline;
mod validate;

pub use inputs::{NewOrder, NewProduct, NewUser, OrderPatch, ProductPatch, UserPatch};
pub use pipeline::{MutationPipeline, ReferencePolicy};
pub use validate::Validate;
