//! Metrics registry for shopgraph
//!
//! - Counters only
//! - Monotonic increase
//! - Reset only on process start
//! - Thread-safe but lock-minimal

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::model::EntityKind;

/// Metrics registry containing all operational counters
///
/// # Thread Safety
///
/// All counters use atomic operations with Relaxed ordering.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Store lookups against the products collection
    product_lookups: AtomicU64,
    /// Store lookups against the users collection
    user_lookups: AtomicU64,
    /// Store lookups against the orders collection
    order_lookups: AtomicU64,
    /// Queries answered by the selection executor
    queries_executed: AtomicU64,
    /// Mutations committed to the store
    mutations_applied: AtomicU64,
    /// Mutations rejected before or during the write
    mutations_rejected: AtomicU64,
    /// Events handed to at least one subscriber
    events_published: AtomicU64,
    /// Per-subscriber successful deliveries
    events_delivered: AtomicU64,
    /// Per-subscriber deliveries abandoned after the publish timeout
    events_dropped: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    fn lookup_counter(&self, kind: EntityKind) -> &AtomicU64 {
        match kind {
            EntityKind::Product => &self.product_lookups,
            EntityKind::User => &self.user_lookups,
            EntityKind::Order => &self.order_lookups,
        }
    }

    // Store metrics

    /// Record one round trip to the store for `kind`
    pub fn increment_lookups(&self, kind: EntityKind) {
        self.lookup_counter(kind).fetch_add(1, Ordering::Relaxed);
    }

    /// Store round trips issued so far for `kind`
    pub fn lookups(&self, kind: EntityKind) -> u64 {
        self.lookup_counter(kind).load(Ordering::Relaxed)
    }

    // Query metrics

    pub fn increment_queries_executed(&self) {
        self.queries_executed.fetch_add(1, Ordering::Relaxed);
    }

    // Mutation metrics

    pub fn increment_mutations_applied(&self) {
        self.mutations_applied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_mutations_rejected(&self) {
        self.mutations_rejected.fetch_add(1, Ordering::Relaxed);
    }

    // Notification metrics

    pub fn increment_events_published(&self) {
        self.events_published.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_events_delivered(&self, count: u64) {
        self.events_delivered.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_events_dropped(&self, count: u64) {
        self.events_dropped.fetch_add(count, Ordering::Relaxed);
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            product_lookups: self.product_lookups.load(Ordering::Relaxed),
            user_lookups: self.user_lookups.load(Ordering::Relaxed),
            order_lookups: self.order_lookups.load(Ordering::Relaxed),
            queries_executed: self.queries_executed.load(Ordering::Relaxed),
            mutations_applied: self.mutations_applied.load(Ordering::Relaxed),
            mutations_rejected: self.mutations_rejected.load(Ordering::Relaxed),
            events_published: self.events_published.load(Ordering::Relaxed),
            events_delivered: self.events_delivered.load(Ordering::Relaxed),
            events_dropped: self.events_dropped.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub product_lookups: u64,
    pub user_lookups: u64,
    pub order_lookups: u64,
    pub queries_executed: u64,
    pub mutations_applied: u64,
    pub mutations_rejected: u64,
    pub events_published: u64,
    pub events_delivered: u64,
    pub events_dropped: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registry_has_zero_values() {
        let registry = MetricsRegistry::new();
        let snapshot = registry.snapshot();

        assert_eq!(snapshot.product_lookups, 0);
        assert_eq!(snapshot.queries_executed, 0);
        assert_eq!(snapshot.events_dropped, 0);
    }

    #[test]
    fn test_lookups_are_per_kind() {
        let registry = MetricsRegistry::new();

        registry.increment_lookups(EntityKind::User);
        registry.increment_lookups(EntityKind::User);
        registry.increment_lookups(EntityKind::Order);

        assert_eq!(registry.lookups(EntityKind::User), 2);
        assert_eq!(registry.lookups(EntityKind::Order), 1);
        assert_eq!(registry.lookups(EntityKind::Product), 0);
    }

    #[test]
    fn test_snapshot_serializes() {
        let registry = MetricsRegistry::new();
        registry.increment_mutations_applied();
        registry.add_events_delivered(3);

        let json = serde_json::to_value(registry.snapshot()).unwrap();
        assert_eq!(json["mutations_applied"], 1);
        assert_eq!(json["events_delivered"], 3);
    }

    #[test]
    fn test_thread_safety() {
        use std::sync::Arc;
        use std::thread;

        let registry = Arc::new(MetricsRegistry::new());
        let mut handles = vec![];

        for _ in 0..10 {
            let reg = Arc::clone(&registry);
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    reg.increment_lookups(EntityKind::Product);
                    reg.increment_queries_executed();
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.product_lookups, 1000);
        assert_eq!(snapshot.queries_executed, 1000);
    }
}
