//! # shopgraph
//!
//! Graph-shaped reads and writes over three related document collections
//! (products, users and orders), with change events on every committed
//! write.
//!
//! - [`store`]: the document store seam and an in-memory implementation
//! - [`resolver`]: batched by-type reference resolution
//! - [`selection`]: field selections and the query executor
//! - [`mutation`]: validated create/update/delete
//! - [`realtime`]: the change notifier
//! - [`core`]: the operation enum and the gateway that dispatches it

pub mod cli;
pub mod config;
pub mod core;
pub mod model;
pub mod mutation;
pub mod observability;
pub mod realtime;
pub mod resolver;
pub mod selection;
pub mod store;
