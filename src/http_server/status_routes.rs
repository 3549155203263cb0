//! Status Routes
//!
//! Health check and hub statistics.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::hub::{EventHub, HubStats};
use crate::station::StationDirectory;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Statistics response
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub hub: HubStats,
    pub stations: usize,
}

/// Status state shared across handlers
#[derive(Clone)]
pub struct StatusState {
    pub hub: Arc<EventHub>,
    pub directory: Arc<dyn StationDirectory>,
}

/// Health check route, mounted at the root
pub fn health_routes() -> Router {
    Router::new().route("/health", get(health_handler))
}

/// Statistics route, mounted under the API prefix
pub fn stats_routes(state: StatusState) -> Router {
    Router::new()
        .route("/stats", get(stats_handler))
        .with_state(state)
}

/// Health check handler
async fn health_handler() -> impl IntoResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    (StatusCode::OK, Json(response))
}

/// Statistics handler
async fn stats_handler(State(state): State<StatusState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        hub: state.hub.stats(),
        stations: state.directory.charge_box_ids().len(),
    })
}
