//! # Subscriptions
//!
//! Receiving end of a topic registration.

use tokio::sync::mpsc;

use super::event::ChangeEvent;

/// A live registration on one topic.
///
/// Dropping the subscription closes its channel; the notifier prunes it on
/// the next publish to that topic.
#[derive(Debug)]
pub struct Subscription {
    id: String,
    receiver: mpsc::Receiver<ChangeEvent>,
}

impl Subscription {
    pub(crate) fn new(id: String, receiver: mpsc::Receiver<ChangeEvent>) -> Self {
        Self { id, receiver }
    }

    /// Subscription ID, used to unsubscribe
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Wait for the next event. Returns `None` once unsubscribed and drained.
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        self.receiver.recv().await
    }

    /// Take the next event if one is already queued
    pub fn try_recv(&mut self) -> Option<ChangeEvent> {
        self.receiver.try_recv().ok()
    }

    /// Drain every queued event without waiting
    pub fn drain(&mut self) -> Vec<ChangeEvent> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}
