//! # Event Hub
//!
//! Single-process fan-out over a bounded event log.
//!
//! Sequence assignment, history append, and fan-out all happen under one
//! lock, so every subscriber observes published events in the same total
//! order. Delivery into per-subscriber queues is non-blocking: a
//! subscriber whose queue is full is evicted rather than allowed to slow
//! the publisher.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use super::event::Event;
use super::event_log::EventLog;
use super::subscriber::{
    StreamMessage, SubscriberId, SubscriberSlot, SubscriberState, Subscription,
};

/// Configuration for the event hub
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubConfig {
    /// Maximum number of events retained for replay
    #[serde(default = "default_retained_events")]
    pub retained_events: usize,

    /// Capacity of each subscriber's delivery queue
    #[serde(default = "default_subscriber_queue")]
    pub subscriber_queue: usize,
}

fn default_retained_events() -> usize {
    10_000
}

fn default_subscriber_queue() -> usize {
    256
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            retained_events: default_retained_events(),
            subscriber_queue: default_subscriber_queue(),
        }
    }
}

/// Point-in-time view of hub activity
#[derive(Debug, Clone, Serialize)]
pub struct HubStats {
    /// Events published since startup
    pub published: u64,
    /// Subscribers evicted for falling behind
    pub evicted: u64,
    /// Subscribers that detached
    pub detached: u64,
    /// Subscribers currently attached for live delivery
    pub subscribers: usize,
    /// Most recent sequence number, 0 before the first publish
    pub latest_sequence: u64,
    /// Events currently retained for replay
    pub retained: usize,
    /// Maximum retained events
    pub capacity: usize,
}

#[derive(Debug, Default)]
struct HubCounters {
    published: AtomicU64,
    evicted: AtomicU64,
    detached: AtomicU64,
}

#[derive(Debug)]
struct HubInner {
    log: EventLog,
    subscribers: HashMap<SubscriberId, SubscriberSlot>,
    shut_down: bool,
}

/// Fan-out hub over a bounded event log
#[derive(Debug)]
pub struct EventHub {
    config: HubConfig,
    inner: Mutex<HubInner>,
    counters: HubCounters,
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new(HubConfig::default())
    }
}

impl EventHub {
    /// Create a hub with the given configuration
    pub fn new(config: HubConfig) -> Self {
        let log = EventLog::new(config.retained_events);
        Self {
            config,
            inner: Mutex::new(HubInner {
                log,
                subscribers: HashMap::new(),
                shut_down: false,
            }),
            counters: HubCounters::default(),
        }
    }

    /// Hub configuration
    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    /// Publish an event, returning its assigned sequence number.
    ///
    /// Never fails and never blocks on slow subscribers. Delivery uses
    /// `try_send`; a subscriber whose queue is full is moved to Draining
    /// and detached from live delivery.
    pub fn publish(&self, name: impl Into<String>, payload: Value) -> u64 {
        let mut inner = self.lock_inner();

        let event = inner.log.record(name.into(), payload);
        let sequence = event.sequence;

        for (id, slot) in inner.subscribers.iter_mut() {
            if slot.state != SubscriberState::Streaming {
                continue;
            }
            let Some(sender) = slot.sender.as_ref() else {
                continue;
            };
            match sender.try_send(StreamMessage::Event(Arc::clone(&event))) {
                Ok(()) => {
                    slot.last_delivered = sequence;
                }
                Err(TrySendError::Full(_)) => {
                    slot.state = SubscriberState::Draining;
                    slot.sender = None;
                    self.counters.evicted.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(
                        subscriber = %id,
                        last_delivered = slot.last_delivered,
                        "subscriber queue full, evicting"
                    );
                }
                Err(TrySendError::Closed(_)) => {
                    slot.state = SubscriberState::Draining;
                    slot.sender = None;
                    tracing::debug!(subscriber = %id, "subscriber receiver gone");
                }
            }
        }

        drop(inner);
        self.counters.published.fetch_add(1, Ordering::Relaxed);
        sequence
    }

    /// Attach a subscriber.
    ///
    /// With `resume_from`, retained events after the cursor are queued for
    /// replay ahead of any live event. Replay capture and live attachment
    /// happen under the same lock, so no event is missed or duplicated
    /// across the boundary. When the cursor points at evicted history the
    /// first queued message is [`StreamMessage::ResyncRequired`].
    pub fn subscribe(self: Arc<Self>, resume_from: Option<u64>) -> Subscription {
        let id = SubscriberId::new();
        let (sender, receiver) = mpsc::channel(self.config.subscriber_queue.max(1));
        let mut pending = VecDeque::new();

        let mut inner = self.lock_inner();

        if inner.shut_down {
            // No slot and no live sender: the stream ends immediately.
            drop(sender);
            drop(inner);
            tracing::debug!(subscriber = %id, "subscribe refused, hub is shut down");
            return Subscription::new(id, pending, receiver, self);
        }

        let mut slot = SubscriberSlot {
            state: SubscriberState::Connecting,
            sender: Some(sender),
            last_delivered: 0,
        };

        if let Some(cursor) = resume_from {
            let replay = inner.log.since(cursor);
            if replay.truncated {
                pending.push_back(StreamMessage::ResyncRequired {
                    requested: cursor,
                    oldest_retained: inner.log.oldest_retained().unwrap_or(0),
                });
            }
            slot.last_delivered = match replay.events.last() {
                Some(last) => last.sequence,
                None => inner.log.latest_sequence(),
            };
            pending.extend(replay.events.into_iter().map(StreamMessage::Event));
        } else {
            slot.last_delivered = inner.log.latest_sequence();
        }

        slot.state = SubscriberState::Streaming;
        inner.subscribers.insert(id, slot);
        drop(inner);

        tracing::debug!(
            subscriber = %id,
            resume_from = ?resume_from,
            replayed = pending.len(),
            "subscriber attached"
        );
        Subscription::new(id, pending, receiver, self)
    }

    /// Detach a subscriber. Idempotent.
    pub fn unsubscribe(&self, id: SubscriberId) {
        let mut inner = self.lock_inner();
        if let Some(slot) = inner.subscribers.remove(&id) {
            drop(inner);
            self.counters.detached.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(
                subscriber = %id,
                last_delivered = slot.last_delivered,
                "subscriber detached"
            );
        }
    }

    /// Terminate all subscriber streams and refuse new attachments.
    ///
    /// Messages already queued to a subscriber still drain before its
    /// stream ends.
    pub fn shutdown(&self) {
        let mut inner = self.lock_inner();
        if inner.shut_down {
            return;
        }
        inner.shut_down = true;

        let mut draining = 0usize;
        for slot in inner.subscribers.values_mut() {
            slot.sender = None;
            if slot.state.may_become(SubscriberState::Draining) {
                slot.state = SubscriberState::Draining;
                draining += 1;
            }
        }
        drop(inner);

        tracing::info!(subscribers = draining, "event hub shut down");
    }

    /// Subscribers currently attached for live delivery
    pub fn subscriber_count(&self) -> usize {
        self.lock_inner()
            .subscribers
            .values()
            .filter(|s| s.state == SubscriberState::Streaming)
            .count()
    }

    /// Sequence number of the most recent event, 0 before the first publish
    pub fn latest_sequence(&self) -> u64 {
        self.lock_inner().log.latest_sequence()
    }

    /// Most recent retained events, newest first, up to `limit`
    pub fn recent(&self, limit: usize) -> Vec<Arc<Event>> {
        self.lock_inner().log.recent(limit)
    }

    /// Snapshot of hub activity
    pub fn stats(&self) -> HubStats {
        let inner = self.lock_inner();
        HubStats {
            published: self.counters.published.load(Ordering::Relaxed),
            evicted: self.counters.evicted.load(Ordering::Relaxed),
            detached: self.counters.detached.load(Ordering::Relaxed),
            subscribers: inner
                .subscribers
                .values()
                .filter(|s| s.state == SubscriberState::Streaming)
                .count(),
            latest_sequence: inner.log.latest_sequence(),
            retained: inner.log.len(),
            capacity: inner.log.capacity(),
        }
    }

    fn lock_inner(&self) -> MutexGuard<'_, HubInner> {
        // A poisoning panic cannot leave the log in a torn state; recover
        // the guard and keep serving.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hub_with(retained: usize, queue: usize) -> Arc<EventHub> {
        Arc::new(EventHub::new(HubConfig {
            retained_events: retained,
            subscriber_queue: queue,
        }))
    }

    fn expect_event(message: Option<StreamMessage>) -> Arc<Event> {
        match message {
            Some(StreamMessage::Event(event)) => event,
            other => panic!("expected event, got {:?}", other),
        }
    }

    #[test]
    fn test_publish_assigns_increasing_sequences() {
        let hub = hub_with(100, 16);

        assert_eq!(hub.publish("a", json!({})), 1);
        assert_eq!(hub.publish("b", json!({})), 2);
        assert_eq!(hub.publish("c", json!({})), 3);
        assert_eq!(hub.latest_sequence(), 3);
    }

    #[tokio::test]
    async fn test_subscriber_receives_live_events() {
        let hub = hub_with(100, 16);
        let mut sub = Arc::clone(&hub).subscribe(None);

        hub.publish("first", json!({"n": 1}));
        hub.publish("second", json!({"n": 2}));

        let e1 = expect_event(sub.next_message().await);
        let e2 = expect_event(sub.next_message().await);
        assert_eq!(e1.name, "first");
        assert_eq!(e2.sequence, 2);
    }

    #[tokio::test]
    async fn test_subscribers_observe_identical_order() {
        let hub = hub_with(100, 64);
        let mut sub_a = Arc::clone(&hub).subscribe(None);
        let mut sub_b = Arc::clone(&hub).subscribe(None);

        for i in 0..10 {
            hub.publish(format!("event-{}", i), json!({}));
        }

        for expected in 1..=10u64 {
            assert_eq!(expect_event(sub_a.next_message().await).sequence, expected);
            assert_eq!(expect_event(sub_b.next_message().await).sequence, expected);
        }
    }

    #[tokio::test]
    async fn test_resume_replays_before_live_events() {
        let hub = hub_with(100, 16);
        for i in 0..3 {
            hub.publish(format!("event-{}", i), json!({}));
        }

        let mut sub = Arc::clone(&hub).subscribe(Some(1));
        hub.publish("live", json!({}));

        let sequences: Vec<u64> = vec![
            expect_event(sub.next_message().await).sequence,
            expect_event(sub.next_message().await).sequence,
            expect_event(sub.next_message().await).sequence,
        ];
        assert_eq!(sequences, vec![2, 3, 4]);
    }

    #[tokio::test]
    async fn test_resume_from_zero_replays_everything_retained() {
        let hub = hub_with(100, 16);
        hub.publish("a", json!({}));
        hub.publish("b", json!({}));

        let mut sub = Arc::clone(&hub).subscribe(Some(0));
        assert_eq!(expect_event(sub.next_message().await).sequence, 1);
        assert_eq!(expect_event(sub.next_message().await).sequence, 2);
    }

    #[tokio::test]
    async fn test_truncated_resume_yields_resync_marker_first() {
        let hub = hub_with(3, 16);
        for i in 0..10 {
            hub.publish(format!("event-{}", i), json!({}));
        }

        // Retained window is 8..=10; cursor 1 lost events 2..=7
        let mut sub = Arc::clone(&hub).subscribe(Some(1));

        match sub.next_message().await {
            Some(StreamMessage::ResyncRequired {
                requested,
                oldest_retained,
            }) => {
                assert_eq!(requested, 1);
                assert_eq!(oldest_retained, 8);
            }
            other => panic!("expected resync marker, got {:?}", other),
        }

        assert_eq!(expect_event(sub.next_message().await).sequence, 8);
        assert_eq!(expect_event(sub.next_message().await).sequence, 9);
        assert_eq!(expect_event(sub.next_message().await).sequence, 10);
    }

    #[tokio::test]
    async fn test_slow_subscriber_is_evicted_and_drains() {
        let hub = hub_with(100, 2);
        let mut slow = Arc::clone(&hub).subscribe(None);

        // Queue capacity is 2: the third publish evicts the subscriber
        for i in 0..4 {
            hub.publish(format!("event-{}", i), json!({}));
        }

        assert_eq!(hub.stats().evicted, 1);
        assert_eq!(hub.subscriber_count(), 0);

        // Already-queued events drain, then the stream ends
        assert_eq!(expect_event(slow.next_message().await).sequence, 1);
        assert_eq!(expect_event(slow.next_message().await).sequence, 2);
        assert!(slow.next_message().await.is_none());
    }

    #[tokio::test]
    async fn test_eviction_does_not_disturb_other_subscribers() {
        let hub = hub_with(100, 2);
        let slow = Arc::clone(&hub).subscribe(None);
        let mut healthy = Arc::clone(&hub).subscribe(None);

        hub.publish("a", json!({}));
        hub.publish("b", json!({}));

        // Drain the healthy subscriber so its queue never fills
        assert_eq!(expect_event(healthy.next_message().await).sequence, 1);
        assert_eq!(expect_event(healthy.next_message().await).sequence, 2);

        hub.publish("c", json!({}));
        hub.publish("d", json!({}));

        assert_eq!(hub.stats().evicted, 1);
        assert_eq!(expect_event(healthy.next_message().await).sequence, 3);
        assert_eq!(expect_event(healthy.next_message().await).sequence, 4);

        drop(slow);
        assert_eq!(hub.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn test_drop_detaches_subscriber() {
        let hub = hub_with(100, 16);
        let sub = Arc::clone(&hub).subscribe(None);

        assert_eq!(hub.subscriber_count(), 1);
        drop(sub);
        assert_eq!(hub.subscriber_count(), 0);
        assert_eq!(hub.stats().detached, 1);
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let hub = hub_with(100, 16);
        let sub = Arc::clone(&hub).subscribe(None);
        let id = sub.id();

        hub.unsubscribe(id);
        hub.unsubscribe(id);

        assert_eq!(hub.subscriber_count(), 0);
        // Drop of `sub` unsubscribes again; still a single detach
        drop(sub);
        assert_eq!(hub.stats().detached, 1);
    }

    #[tokio::test]
    async fn test_shutdown_ends_streams_after_drain() {
        let hub = hub_with(100, 16);
        let mut sub = Arc::clone(&hub).subscribe(None);

        hub.publish("before", json!({}));
        hub.shutdown();

        // The queued event drains first
        assert_eq!(expect_event(sub.next_message().await).name, "before");
        assert!(sub.next_message().await.is_none());
    }

    #[tokio::test]
    async fn test_subscribe_after_shutdown_ends_immediately() {
        let hub = hub_with(100, 16);
        hub.shutdown();

        let mut sub = Arc::clone(&hub).subscribe(None);
        assert!(sub.next_message().await.is_none());
    }

    #[test]
    fn test_stats_snapshot() {
        let hub = hub_with(5, 16);
        for i in 0..8 {
            hub.publish(format!("event-{}", i), json!({}));
        }
        let _sub = Arc::clone(&hub).subscribe(None);

        let stats = hub.stats();
        assert_eq!(stats.published, 8);
        assert_eq!(stats.latest_sequence, 8);
        assert_eq!(stats.retained, 5);
        assert_eq!(stats.capacity, 5);
        assert_eq!(stats.subscribers, 1);
    }
}
