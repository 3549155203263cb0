//! # Subscribers
//!
//! Subscriber identity, lifecycle state, and the stream handle the HTTP
//! layer consumes.

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::mpsc;
use uuid::Uuid;

use super::event::Event;
use super::hub::EventHub;

/// Unique identifier for a subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(Uuid);

impl SubscriberId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a subscriber.
///
/// Transitions only move forward: Connecting → Streaming → Draining →
/// Closed. A subscriber never returns to an earlier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SubscriberState {
    /// Replay is being seeded, live delivery not yet attached
    Connecting,
    /// Attached for live delivery
    Streaming,
    /// Detached from live delivery; already-queued messages still drain
    Draining,
    /// Fully disconnected
    Closed,
}

impl SubscriberState {
    /// True when `next` is reachable from this state
    pub fn may_become(self, next: SubscriberState) -> bool {
        self < next
    }
}

/// A message delivered to a subscriber's stream
#[derive(Debug, Clone)]
pub enum StreamMessage {
    /// A published event
    Event(Arc<Event>),

    /// The requested resume cursor points at evicted history. The client's
    /// local view is incomplete; delivery continues from the oldest
    /// retained event.
    ResyncRequired {
        /// Cursor the client asked to resume from
        requested: u64,
        /// Oldest sequence number still retained
        oldest_retained: u64,
    },
}

/// Hub-side bookkeeping for one subscriber
#[derive(Debug)]
pub(crate) struct SubscriberSlot {
    pub state: SubscriberState,

    /// Live delivery channel; dropped on eviction so the receiver drains
    /// and then ends
    pub sender: Option<mpsc::Sender<StreamMessage>>,

    /// Highest sequence number handed to this subscriber
    pub last_delivered: u64,
}

/// Consumer half of a subscription.
///
/// Yields replayed history first, then live events. Dropping the
/// subscription detaches the subscriber from the hub.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
    pending: VecDeque<StreamMessage>,
    receiver: mpsc::Receiver<StreamMessage>,
    hub: Arc<EventHub>,
}

impl Subscription {
    pub(crate) fn new(
        id: SubscriberId,
        pending: VecDeque<StreamMessage>,
        receiver: mpsc::Receiver<StreamMessage>,
        hub: Arc<EventHub>,
    ) -> Self {
        Self {
            id,
            pending,
            receiver,
            hub,
        }
    }

    /// Identifier of this subscriber
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Next message, or `None` once the stream has ended.
    ///
    /// Replayed history is yielded before any live event. After eviction
    /// or hub shutdown, messages already queued still drain before the
    /// stream ends.
    pub async fn next_message(&mut self) -> Option<StreamMessage> {
        if let Some(message) = self.pending.pop_front() {
            return Some(message);
        }
        self.receiver.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.hub.unsubscribe(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscriber_ids_are_unique() {
        let a = SubscriberId::new();
        let b = SubscriberId::new();
        assert_ne!(a, b);
        assert_ne!(a.to_string(), b.to_string());
    }

    #[test]
    fn test_state_transitions_only_move_forward() {
        use SubscriberState::*;

        assert!(Connecting.may_become(Streaming));
        assert!(Connecting.may_become(Closed));
        assert!(Streaming.may_become(Draining));
        assert!(Draining.may_become(Closed));

        assert!(!Streaming.may_become(Connecting));
        assert!(!Draining.may_become(Streaming));
        assert!(!Closed.may_become(Draining));
        assert!(!Closed.may_become(Closed));
    }
}
