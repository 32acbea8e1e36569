//! # Selection Executor
//!
//! Graph-shaped reads over the three collections.
//!
//! Two surfaces share one implementation:
//!
//! - typed: [`SelectionExecutor::get_order`] and friends return entities and
//!   [`ResolvedOrder`]s
//! - graph-shaped: [`SelectionExecutor::execute`] takes a [`Query`] and a
//!   [`SelectionSet`] and returns a projected JSON tree
//!
//! Relationship fields are resolved through the batched reference resolver,
//! once per field for the entire result set.

mod executor;
mod projection;
mod query;
mod selection_set;

pub use executor::{OrderFields, ResolvedOrder, SelectionExecutor};
pub use projection::{project, render_order, validate_selection};
pub use query::Query;
pub use selection_set::{Field, SelectionSet};
