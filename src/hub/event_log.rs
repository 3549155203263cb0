//! # Event Log
//!
//! Bounded in-memory history of published events.
//!
//! The log retains the most recent events up to a fixed capacity and
//! assigns each one a monotonically increasing sequence number. Retained
//! sequence numbers are always contiguous: eviction only ever removes the
//! oldest entry.

use std::collections::VecDeque;
use std::sync::Arc;

use serde_json::Value;

use super::event::Event;

/// Result of a replay request against the log
#[derive(Debug, Clone)]
pub struct Replay {
    /// Retained events with sequence numbers above the requested cursor
    pub events: Vec<Arc<Event>>,

    /// True when history between the cursor and the oldest retained event
    /// has already been evicted
    pub truncated: bool,
}

/// Ring buffer of events with monotonic sequence numbers.
///
/// Not internally synchronized. The hub owns the log behind its lock so
/// that sequence assignment and fan-out happen atomically.
#[derive(Debug)]
pub struct EventLog {
    capacity: usize,
    next_sequence: u64,
    events: VecDeque<Arc<Event>>,
}

impl EventLog {
    /// Create a log retaining at most `capacity` events
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            next_sequence: 1,
            events: VecDeque::with_capacity(capacity),
        }
    }

    /// Append an event, assigning it the next sequence number
    pub fn record(&mut self, name: String, payload: Value) -> Arc<Event> {
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        let event = Arc::new(Event::new(sequence, name, payload));
        self.events.push_back(Arc::clone(&event));

        // Trim if over capacity
        while self.events.len() > self.capacity {
            self.events.pop_front();
        }

        event
    }

    /// Retained events with sequence numbers greater than `cursor`.
    ///
    /// `cursor` is the last sequence number the caller has already seen;
    /// 0 replays everything retained. The replay is marked truncated when
    /// at least one event between the cursor and the retained window has
    /// been evicted.
    pub fn since(&self, cursor: u64) -> Replay {
        // saturating_add keeps a cursor of u64::MAX from overflowing
        let truncated = match self.oldest_retained() {
            Some(oldest) => cursor.saturating_add(1) < oldest,
            None => false,
        };

        let events = self
            .events
            .iter()
            .filter(|e| e.sequence > cursor)
            .cloned()
            .collect();

        Replay { events, truncated }
    }

    /// The most recent events, newest first, up to `limit`
    pub fn recent(&self, limit: usize) -> Vec<Arc<Event>> {
        self.events.iter().rev().take(limit).cloned().collect()
    }

    /// Sequence number of the oldest retained event
    pub fn oldest_retained(&self) -> Option<u64> {
        self.events.front().map(|e| e.sequence)
    }

    /// Sequence number of the most recent event, 0 before the first publish
    pub fn latest_sequence(&self) -> u64 {
        self.next_sequence - 1
    }

    /// Number of retained events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True when nothing is retained
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Maximum number of retained events
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
