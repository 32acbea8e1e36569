//! # Real-Time Module
//!
//! Change notification for committed mutations.
//!
//! ## Architecture
//!
//! - **Events**: topic = (entity kind, verb), payload = entity or identity
//! - **Notifier**: topic registry with per-topic FIFO fan-out
//! - **Subscriptions**: bounded receiving channels handed to listeners
//!
//! Delivering events over a live connection is left to the transport layer;
//! it consumes [`Subscription`]s.

pub mod errors;
pub mod event;
pub mod notifier;
pub mod subscription;

pub use errors::{NotifierError, NotifierResult};
pub use event::{ChangeEvent, EventPayload, Topic, Verb};
pub use notifier::{ChangeNotifier, NotifierConfig, PublishReport};
pub use subscription::Subscription;
