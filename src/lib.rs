//! ocppwatch - Read-only monitoring facade for an OCPP 1.6 central system
//!
//! Records every request/response exchange the central system handles as a
//! sequenced event, retains a bounded window of them for replay, and
//! republishes the feed over Server-Sent Events alongside read-only
//! station queries.

pub mod cli;
pub mod demo;
pub mod http_server;
pub mod hub;
pub mod ocpp;
pub mod station;
