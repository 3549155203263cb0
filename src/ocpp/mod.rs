//! # OCPP Monitoring Module
//!
//! What the monitor knows about OCPP 1.6: the declarative operation table
//! and the recorder that turns engine notifications into hub events. No
//! protocol semantics live here; payloads pass through opaque.

pub mod operation;
pub mod recorder;

pub use operation::{Initiator, Operation, OPERATIONS};
pub use recorder::{EventRecorder, RequestToken};
