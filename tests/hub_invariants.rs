//! Event Hub Invariant Tests
//!
//! Covers the broadcast hub's core guarantees:
//! - Sequences are contiguous and every subscriber sees the same order
//! - Retention never exceeds capacity; resuming past evicted history
//!   yields a resync marker
//! - Replay and live delivery meet without a gap or a duplicate
//! - Slow subscribers are evicted without disturbing anyone else
//! - Shutdown drains queued events, then ends every stream

use std::sync::Arc;

use serde_json::json;

use ocppwatch::hub::{EventHub, HubConfig, StreamMessage, Subscription};

fn hub(retained_events: usize, subscriber_queue: usize) -> Arc<EventHub> {
    Arc::new(EventHub::new(HubConfig {
        retained_events,
        subscriber_queue,
    }))
}

/// Read `count` events and return their sequence numbers, panicking on
/// markers or early stream end.
async fn drain_events(sub: &mut Subscription, count: usize) -> Vec<u64> {
    let mut sequences = Vec::with_capacity(count);
    for _ in 0..count {
        match sub.next_message().await {
            Some(StreamMessage::Event(event)) => sequences.push(event.sequence),
            other => panic!("expected event, got {:?}", other),
        }
    }
    sequences
}

// =============================================================================
// Ordering
// =============================================================================

/// Sequence numbers start at 1 and increase by one per publish.
#[test]
fn test_sequences_are_contiguous_from_one() {
    let hub = hub(100, 16);

    for i in 0..5u64 {
        let sequence = hub.publish(format!("event-{}", i), json!({}));
        assert_eq!(sequence, i + 1);
    }
    assert_eq!(hub.latest_sequence(), 5);
}

/// Two subscribers observe the same events in the same total order.
#[tokio::test]
async fn test_subscribers_see_identical_order() {
    let hub = hub(100, 64);
    let mut first = Arc::clone(&hub).subscribe(None);
    let mut second = Arc::clone(&hub).subscribe(None);

    for i in 0..20 {
        hub.publish(format!("event-{}", i), json!({ "i": i }));
    }

    let a = drain_events(&mut first, 20).await;
    let b = drain_events(&mut second, 20).await;
    assert_eq!(a, b);
    assert!(a.windows(2).all(|w| w[0] < w[1]));
}

/// Concurrent publishers produce no gaps, no duplicates, and no
/// disagreement between subscribers.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_publishers_keep_total_order() {
    const TASKS: usize = 4;
    const PER_TASK: usize = 50;

    let hub = hub(1000, 1000);
    let mut first = Arc::clone(&hub).subscribe(None);
    let mut second = Arc::clone(&hub).subscribe(None);

    let mut handles = Vec::new();
    for task in 0..TASKS {
        let hub = Arc::clone(&hub);
        handles.push(tokio::spawn(async move {
            for i in 0..PER_TASK {
                hub.publish(format!("task-{}-{}", task, i), json!({ "task": task }));
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let total = TASKS * PER_TASK;
    let expected: Vec<u64> = (1..=total as u64).collect();
    assert_eq!(drain_events(&mut first, total).await, expected);
    assert_eq!(drain_events(&mut second, total).await, expected);
}

// =============================================================================
// Retention
// =============================================================================

/// The log never retains more than its capacity; the window slides forward.
#[test]
fn test_retention_is_bounded() {
    let hub = hub(10, 16);
    for i in 0..35 {
        hub.publish(format!("event-{}", i), json!({}));
    }

    let stats = hub.stats();
    assert_eq!(stats.retained, 10);
    assert_eq!(stats.capacity, 10);
    assert_eq!(stats.latest_sequence, 35);

    // Newest-first recent listing covers exactly the retained window
    let recent = hub.recent(100);
    assert_eq!(recent.len(), 10);
    assert_eq!(recent.first().map(|e| e.sequence), Some(35));
    assert_eq!(recent.last().map(|e| e.sequence), Some(26));
}

// =============================================================================
// Replay
// =============================================================================

/// A fresh subscriber sees only events published after it attached.
#[tokio::test]
async fn test_fresh_subscriber_sees_only_later_events() {
    let hub = hub(100, 16);
    hub.publish("a", json!({}));
    hub.publish("b", json!({}));

    let mut sub = Arc::clone(&hub).subscribe(None);
    hub.publish("c", json!({}));

    assert_eq!(drain_events(&mut sub, 1).await, vec![3]);
}

/// Resuming from 0 replays everything retained, then switches to live.
#[tokio::test]
async fn test_resume_from_zero_replays_everything() {
    let hub = hub(100, 16);
    hub.publish("a", json!({}));
    hub.publish("b", json!({}));

    let mut sub = Arc::clone(&hub).subscribe(Some(0));
    hub.publish("c", json!({}));

    assert_eq!(drain_events(&mut sub, 3).await, vec![1, 2, 3]);
}

/// Replay and live delivery meet without a gap or duplicate.
#[tokio::test]
async fn test_replay_joins_live_without_gap() {
    let hub = hub(100, 16);
    for i in 0..5 {
        hub.publish(format!("event-{}", i), json!({}));
    }

    let mut sub = Arc::clone(&hub).subscribe(Some(2));
    for i in 5..8 {
        hub.publish(format!("event-{}", i), json!({}));
    }

    assert_eq!(drain_events(&mut sub, 6).await, vec![3, 4, 5, 6, 7, 8]);
}

/// The largest possible cursor replays nothing and triggers no resync;
/// clients control the cursor, so any u64 must be safe.
#[tokio::test]
async fn test_resume_from_max_cursor_attaches_live() {
    let hub = hub(3, 16);
    for i in 0..10 {
        hub.publish(format!("event-{}", i), json!({}));
    }

    let mut sub = Arc::clone(&hub).subscribe(Some(u64::MAX));
    hub.publish("live", json!({}));

    // Straight to live delivery, no marker
    assert_eq!(drain_events(&mut sub, 1).await, vec![11]);
}

/// Resuming past evicted history yields a resync marker, then the oldest
/// retained events.
#[tokio::test]
async fn test_resume_into_evicted_history_requires_resync() {
    let hub = hub(3, 16);
    for i in 0..10 {
        hub.publish(format!("event-{}", i), json!({}));
    }

    let mut sub = Arc::clone(&hub).subscribe(Some(2));
    match sub.next_message().await {
        Some(StreamMessage::ResyncRequired {
            requested,
            oldest_retained,
        }) => {
            assert_eq!(requested, 2);
            assert_eq!(oldest_retained, 8);
        }
        other => panic!("expected resync marker, got {:?}", other),
    }
    assert_eq!(drain_events(&mut sub, 3).await, vec![8, 9, 10]);
}

/// A cursor at or past the newest event replays nothing and stays live.
#[tokio::test]
async fn test_resume_at_head_is_equivalent_to_live() {
    let hub = hub(100, 16);
    for i in 0..4 {
        hub.publish(format!("event-{}", i), json!({}));
    }

    let mut at_head = Arc::clone(&hub).subscribe(Some(4));
    hub.publish("next", json!({}));
    assert_eq!(drain_events(&mut at_head, 1).await, vec![5]);

    let mut past_head = Arc::clone(&hub).subscribe(Some(100));
    hub.publish("later", json!({}));
    assert_eq!(drain_events(&mut past_head, 1).await, vec![6]);
}

// =============================================================================
// Eviction
// =============================================================================

/// A subscriber that stops reading is evicted; the publisher never blocks
/// and other subscribers are untouched.
#[tokio::test]
async fn test_slow_subscriber_evicted_others_unaffected() {
    let hub = hub(100, 4);
    let mut slow = Arc::clone(&hub).subscribe(None);
    let mut healthy = Arc::clone(&hub).subscribe(None);

    for i in 0..20u64 {
        hub.publish(format!("event-{}", i), json!({}));
        // Healthy keeps up; slow never reads
        assert_eq!(drain_events(&mut healthy, 1).await, vec![i + 1]);
    }

    assert_eq!(hub.stats().evicted, 1);

    // The evicted subscriber still drains what was queued, then ends
    assert_eq!(drain_events(&mut slow, 4).await, vec![1, 2, 3, 4]);
    assert!(slow.next_message().await.is_none());
}

/// Dropping a subscription detaches it from the hub.
#[tokio::test]
async fn test_dropped_subscription_detaches() {
    let hub = hub(100, 16);
    let sub = Arc::clone(&hub).subscribe(None);
    assert_eq!(hub.subscriber_count(), 1);

    drop(sub);
    assert_eq!(hub.subscriber_count(), 0);
    assert_eq!(hub.stats().detached, 1);
}

// =============================================================================
// Shutdown
// =============================================================================

/// Shutdown lets queued events drain, then ends every stream, and refuses
/// new subscribers.
#[tokio::test]
async fn test_shutdown_drains_then_ends_streams() {
    let hub = hub(100, 16);
    let mut sub = Arc::clone(&hub).subscribe(None);

    hub.publish("queued", json!({}));
    hub.shutdown();

    assert_eq!(drain_events(&mut sub, 1).await, vec![1]);
    assert!(sub.next_message().await.is_none());

    let mut late = Arc::clone(&hub).subscribe(None);
    assert!(late.next_message().await.is_none());
}

/// Publishing after shutdown still records history but delivers nowhere.
#[tokio::test]
async fn test_publish_after_shutdown_records_only() {
    let hub = hub(100, 16);
    let mut sub = Arc::clone(&hub).subscribe(None);
    hub.shutdown();

    let sequence = hub.publish("after", json!({}));
    assert_eq!(sequence, 1);
    assert!(sub.next_message().await.is_none());
    assert_eq!(hub.recent(10).len(), 1);
}
