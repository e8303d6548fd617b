//! Error-to-response mapping.
//!
//! Validation errors carry their message to the client as a 400; every
//! other failure becomes a generic 500; collaborator detail goes to the
//! log, and reaches the response body only in development mode.

use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use tracing::error;

use abhilekh_search::SearchError;

/// Error half of every handler's return type.
pub type ApiError = (StatusCode, Json<Value>);

/// Map a search-path failure to an HTTP response.
pub fn error_response(err: SearchError, expose_errors: bool) -> ApiError {
    if err.is_validation() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": err.to_string() })),
        );
    }

    error!("Search failed: {err}");
    let body = if expose_errors {
        json!({ "error": "Search failed", "detail": err.to_string() })
    } else {
        json!({ "error": "Search failed" })
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body))
}
