//! # Event Hub Module
//!
//! In-memory publish/subscribe core of the monitor.
//!
//! ## Architecture
//!
//! - **Event Log**: bounded ring buffer with monotonic sequence numbers
//! - **Event Hub**: serialized publish with fan-out to subscriber queues
//! - **Subscribers**: lifecycle state and the stream handle consumed by
//!   the HTTP layer
//!
//! Every subscriber observes events in exactly the order they were
//! published. Publishing never blocks: subscribers that cannot keep up
//! are evicted and their streams drain what was already queued.

pub mod event;
pub mod event_log;
pub mod hub;
pub mod subscriber;

pub use event::Event;
pub use event_log::{EventLog, Replay};
pub use hub::{EventHub, HubConfig, HubStats};
pub use subscriber::{StreamMessage, SubscriberId, SubscriberState, Subscription};
