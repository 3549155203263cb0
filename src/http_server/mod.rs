//! # HTTP Server Module
//!
//! The monitor's read-only dashboard surface, combining all endpoint
//! routers into a unified Axum server.
//!
//! # Endpoints
//!
//! - `/health` - Health check (always at the root)
//! - `<prefix>/events` - Live event stream (SSE)
//! - `<prefix>/events/recent` - Newest retained events as JSON
//! - `<prefix>/chargeBoxIds` - Known station identifiers
//! - `<prefix>/chargeBoxes` - Station snapshots
//! - `<prefix>/chargeBoxes/{id}` - One station snapshot
//! - `<prefix>/stats` - Hub statistics

pub mod config;
pub mod error;
pub mod events_routes;
pub mod server;
pub mod station_routes;
pub mod status_routes;

pub use config::HttpServerConfig;
pub use error::{ApiError, ApiResult, ErrorBody};
pub use server::HttpServer;
