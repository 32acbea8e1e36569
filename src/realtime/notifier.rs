//! # Change Notifier
//!
//! Topic registry and ordered fan-out of change events.
//!
//! Each topic owns an async publish gate holding its sequence counter.
//! A publisher keeps the gate for the whole fan-out, so events on one topic
//! reach every subscriber in publish order. There is no ordering across
//! topics.
//!
//! Overflow policy: a full subscriber channel blocks the publisher for at
//! most `publish_timeout`; after that the event is dropped for that
//! subscriber only and counted in `events_dropped`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use tokio::sync::{mpsc, Mutex as AsyncMutex};
use uuid::Uuid;

use crate::observability::MetricsRegistry;

use super::errors::{NotifierError, NotifierResult};
use super::event::{ChangeEvent, EventPayload, Topic};
use super::subscription::Subscription;

/// Default per-subscriber channel capacity
pub const DEFAULT_CAPACITY: usize = 64;

/// Default time a publisher waits on one full subscriber
pub const DEFAULT_PUBLISH_TIMEOUT: Duration = Duration::from_secs(5);

/// Notifier tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotifierConfig {
    /// Events buffered per subscriber before the publisher waits
    pub capacity: usize,
    /// Longest wait on a single full subscriber
    pub publish_timeout: Duration,
}

impl NotifierConfig {
    /// Capacity is clamped to at least 1
    pub fn new(capacity: usize, publish_timeout: Duration) -> Self {
        Self {
            capacity: capacity.max(1),
            publish_timeout,
        }
    }
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_PUBLISH_TIMEOUT)
    }
}

/// Outcome of one publish call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Sequence assigned to the event; `None` when nobody was subscribed
    pub sequence: Option<u64>,
    /// Subscribers that received the event
    pub delivered: usize,
    /// Subscribers that stayed full past the publish timeout
    pub dropped: usize,
    /// Subscribers that went away during the fan-out
    pub closed: usize,
}

#[derive(Debug, Clone)]
struct Subscriber {
    id: String,
    sender: mpsc::Sender<ChangeEvent>,
}

#[derive(Debug, Default)]
struct TopicChannel {
    /// Last sequence number issued on this topic
    gate: AsyncMutex<u64>,
    subscribers: Mutex<Vec<Subscriber>>,
}

fn poisoned<T>(_: T) -> NotifierError {
    NotifierError::Internal("Lock poisoned".into())
}

/// Process-scoped change notifier.
///
/// Construct one per process (or per test) and share it by `Arc`.
#[derive(Debug)]
pub struct ChangeNotifier {
    topics: RwLock<HashMap<Topic, Arc<TopicChannel>>>,
    config: NotifierConfig,
    metrics: Arc<MetricsRegistry>,
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new(NotifierConfig::default(), Arc::new(MetricsRegistry::new()))
    }
}

impl ChangeNotifier {
    pub fn new(config: NotifierConfig, metrics: Arc<MetricsRegistry>) -> Self {
        Self {
            topics: RwLock::new(HashMap::new()),
            config,
            metrics,
        }
    }

    fn channel(&self, topic: &Topic) -> NotifierResult<Option<Arc<TopicChannel>>> {
        let topics = self.topics.read().map_err(poisoned)?;
        Ok(topics.get(topic).cloned())
    }

    fn channel_or_insert(&self, topic: Topic) -> NotifierResult<Arc<TopicChannel>> {
        if let Some(channel) = self.channel(&topic)? {
            return Ok(channel);
        }
        let mut topics = self.topics.write().map_err(poisoned)?;
        Ok(Arc::clone(topics.entry(topic).or_default()))
    }

    /// Register a new bounded subscriber on `topic`
    pub fn subscribe(&self, topic: Topic) -> NotifierResult<Subscription> {
        let (sender, receiver) = mpsc::channel(self.config.capacity);
        let id = Uuid::new_v4().to_string();

        let channel = self.channel_or_insert(topic)?;
        channel
            .subscribers
            .lock()
            .map_err(poisoned)?
            .push(Subscriber {
                id: id.clone(),
                sender,
            });

        tracing::debug!(topic = %topic, subscription = %id, "SUBSCRIBED");
        Ok(Subscription::new(id, receiver))
    }

    /// Remove a subscription by ID. Events already queued stay readable.
    pub fn unsubscribe(&self, subscription_id: &str) -> NotifierResult<()> {
        let topics = self.topics.read().map_err(poisoned)?;

        for (topic, channel) in topics.iter() {
            let mut subscribers = channel.subscribers.lock().map_err(poisoned)?;
            if let Some(pos) = subscribers.iter().position(|s| s.id == subscription_id) {
                subscribers.remove(pos);
                tracing::debug!(topic = %topic, subscription = %subscription_id, "UNSUBSCRIBED");
                return Ok(());
            }
        }

        Err(NotifierError::SubscriptionNotFound(subscription_id.to_string()))
    }

    /// Live subscribers on `topic`
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        let Ok(Some(channel)) = self.channel(&topic) else {
            return 0;
        };
        channel
            .subscribers
            .lock()
            .map(|subs| subs.iter().filter(|s| !s.sender.is_closed()).count())
            .unwrap_or(0)
    }

    /// Publish an event to every subscriber registered on `topic` right now.
    ///
    /// With no subscribers this returns immediately: no sequence number is
    /// consumed and nothing is buffered.
    pub async fn publish(&self, topic: Topic, payload: EventPayload) -> NotifierResult<PublishReport> {
        let Some(channel) = self.channel(&topic)? else {
            return Ok(PublishReport::default());
        };

        let mut sequence = channel.gate.lock().await;

        let targets: Vec<Subscriber> = {
            let mut subscribers = channel.subscribers.lock().map_err(poisoned)?;
            subscribers.retain(|s| !s.sender.is_closed());
            subscribers.clone()
        };

        if targets.is_empty() {
            return Ok(PublishReport::default());
        }

        *sequence += 1;
        let event = ChangeEvent::new(*sequence, topic, payload);
        let mut report = PublishReport {
            sequence: Some(event.sequence),
            ..PublishReport::default()
        };

        for subscriber in targets {
            let send = subscriber.sender.send(event.clone());
            match tokio::time::timeout(self.config.publish_timeout, send).await {
                Ok(Ok(())) => report.delivered += 1,
                Ok(Err(_)) => report.closed += 1,
                Err(_) => {
                    report.dropped += 1;
                    tracing::warn!(
                        topic = %topic,
                        subscription = %subscriber.id,
                        sequence = event.sequence,
                        "EVENT_DROPPED"
                    );
                }
            }
        }

        self.metrics.increment_events_published();
        self.metrics.add_events_delivered(report.delivered as u64);
        self.metrics.add_events_dropped(report.dropped as u64);

        tracing::debug!(
            topic = %topic,
            sequence = event.sequence,
            delivered = report.delivered,
            "EVENT_PUBLISHED"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntityKind;
    use crate::realtime::event::Verb;

    fn product_added() -> Topic {
        Topic::new(EntityKind::Product, Verb::Added)
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_noop() {
        let notifier = ChangeNotifier::default();

        let report = notifier
            .publish(product_added(), EventPayload::id("p1"))
            .await
            .unwrap();

        assert_eq!(report, PublishReport::default());
        assert_eq!(notifier.subscriber_count(product_added()), 0);
    }

    #[tokio::test]
    async fn test_fifo_single_subscriber() {
        let notifier = ChangeNotifier::default();
        let mut sub = notifier.subscribe(product_added()).unwrap();

        for i in 0..10 {
            notifier
                .publish(product_added(), EventPayload::id(format!("p{}", i)))
                .await
                .unwrap();
        }

        for i in 0..10 {
            let event = sub.recv().await.unwrap();
            assert_eq!(event.sequence, i + 1);
            assert_eq!(event.entity_id(), Some(format!("p{}", i).as_str()));
        }
    }

    #[tokio::test]
    async fn test_topics_are_isolated() {
        let notifier = ChangeNotifier::default();
        let mut added = notifier.subscribe(product_added()).unwrap();
        let mut deleted = notifier
            .subscribe(Topic::new(EntityKind::Product, Verb::Deleted))
            .unwrap();

        notifier
            .publish(product_added(), EventPayload::id("p1"))
            .await
            .unwrap();

        assert!(added.try_recv().is_some());
        assert!(deleted.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_unsubscribe() {
        let notifier = ChangeNotifier::default();
        let sub = notifier.subscribe(product_added()).unwrap();
        assert_eq!(notifier.subscriber_count(product_added()), 1);

        notifier.unsubscribe(sub.id()).unwrap();
        assert_eq!(notifier.subscriber_count(product_added()), 0);

        let err = notifier.unsubscribe(sub.id()).unwrap_err();
        assert_eq!(err.code(), "SUBSCRIPTION_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_dropped_subscription_is_pruned() {
        let notifier = ChangeNotifier::default();
        let sub = notifier.subscribe(product_added()).unwrap();
        drop(sub);

        let report = notifier
            .publish(product_added(), EventPayload::id("p1"))
            .await
            .unwrap();

        assert_eq!(report.sequence, None);
        assert_eq!(notifier.subscriber_count(product_added()), 0);
    }

    #[tokio::test]
    async fn test_full_subscriber_times_out_without_blocking_others() {
        let metrics = Arc::new(MetricsRegistry::new());
        let notifier = ChangeNotifier::new(
            NotifierConfig::new(1, Duration::from_millis(20)),
            Arc::clone(&metrics),
        );
        let mut slow = notifier.subscribe(product_added()).unwrap();
        let mut fast = notifier.subscribe(product_added()).unwrap();

        let first = notifier
            .publish(product_added(), EventPayload::id("p1"))
            .await
            .unwrap();
        assert_eq!(first.delivered, 2);

        // Drain only the fast subscriber; the slow one is still full.
        assert!(fast.try_recv().is_some());

        let second = notifier
            .publish(product_added(), EventPayload::id("p2"))
            .await
            .unwrap();
        assert_eq!(second.delivered, 1);
        assert_eq!(second.dropped, 1);
        assert_eq!(metrics.snapshot().events_dropped, 1);

        assert_eq!(fast.try_recv().unwrap().sequence, 2);
        assert_eq!(slow.try_recv().unwrap().sequence, 1);
        assert!(slow.try_recv().is_none());
    }

    #[test]
    fn test_capacity_clamped() {
        assert_eq!(NotifierConfig::new(0, DEFAULT_PUBLISH_TIMEOUT).capacity, 1);
    }
}
