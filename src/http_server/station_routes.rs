//! Station Routes
//!
//! Read-only endpoints over the station directory: id listing, snapshot
//! listing, and single-station lookup.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use super::error::{ApiError, ApiResult};
use crate::station::{is_valid_charge_box_id, StationDirectory, StationSnapshot};

// ==================
// Shared State
// ==================

/// Station state shared across handlers
#[derive(Clone)]
pub struct StationState {
    pub directory: Arc<dyn StationDirectory>,
}

impl StationState {
    pub fn new(directory: Arc<dyn StationDirectory>) -> Self {
        Self { directory }
    }
}

// ==================
// Station Routes
// ==================

/// Create station routes
pub fn station_routes(state: StationState) -> Router {
    Router::new()
        .route("/chargeBoxIds", get(list_charge_box_ids_handler))
        .route("/chargeBoxes", get(list_charge_boxes_handler))
        .route("/chargeBoxes/{id}", get(get_charge_box_handler))
        .with_state(state)
}

// ==================
// Handlers
// ==================

/// GET /chargeBoxIds - identifiers of every known station
async fn list_charge_box_ids_handler(State(state): State<StationState>) -> Json<Vec<String>> {
    Json(state.directory.charge_box_ids())
}

/// GET /chargeBoxes - snapshot of every known station
async fn list_charge_boxes_handler(
    State(state): State<StationState>,
) -> Json<Vec<StationSnapshot>> {
    Json(state.directory.snapshots())
}

/// GET /chargeBoxes/{id} - snapshot of one station
async fn get_charge_box_handler(
    State(state): State<StationState>,
    Path(id): Path<String>,
) -> ApiResult<Json<StationSnapshot>> {
    if !is_valid_charge_box_id(&id) {
        return Err(ApiError::MalformedIdentifier);
    }
    match state.directory.snapshot(&id) {
        Some(snapshot) => Ok(Json(snapshot)),
        None => Err(ApiError::UnknownStation),
    }
}
