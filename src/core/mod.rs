//! # Core Module
//!
//! The unified operation model, the gateway that dispatches it, and the
//! error taxonomy shared by reads and writes.
//!
//! ## Design Principles
//!
//! - Single operation enum for every request
//! - Reads go to the selection executor, writes to the mutation pipeline
//! - Stable error codes for every failure surfaced to callers

pub mod error;
pub mod gateway;
pub mod operation;

pub use error::{CoreError, CoreResult};
pub use gateway::Gateway;
pub use operation::Operation;
