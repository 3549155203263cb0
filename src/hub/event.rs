//! # Monitoring Events
//!
//! The immutable record type published through the event hub.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single monitoring event.
///
/// Events are immutable once published. The hub hands them out behind an
/// `Arc`, so the same allocation backs the retained history and every
/// in-flight delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Monotonically increasing sequence number (starts at 1)
    pub sequence: u64,

    /// Event name, e.g. "BootNotificationRequest"
    pub name: String,

    /// Time the event was recorded
    pub timestamp: DateTime<Utc>,

    /// Structured payload
    pub payload: Value,
}

impl Event {
    /// Create an event stamped with the current time
    pub fn new(sequence: u64, name: String, payload: Value) -> Self {
        Self {
            sequence,
            name,
            timestamp: Utc::now(),
            payload,
        }
    }
}
