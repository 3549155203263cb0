//! API Errors
//!
//! The user-surfaced failures of the station query endpoints, rendered the
//! way the original dashboard clients expect them: a JSON body with a
//! single `description` field, and the connection closed afterwards.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// User-surfaced API errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The charge box id in the path is not a well-formed identifier
    #[error("Invalid charge box identification!")]
    MalformedIdentifier,

    /// The charge box id is well-formed but no such station is known
    #[error("Unknown charge box identification!")]
    UnknownStation,
}

impl ApiError {
    /// HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MalformedIdentifier => StatusCode::BAD_REQUEST,
            ApiError::UnknownStation => StatusCode::NOT_FOUND,
        }
    }
}

/// JSON body of an error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub description: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            description: self.to_string(),
        });
        let mut response = (self.status_code(), body).into_response();
        response
            .headers_mut()
            .insert(header::CONNECTION, HeaderValue::from_static("close"));
        response
    }
}
