//! # HTTP Handlers
//!
//! One module per route group. Handlers stay thin: extract, call a
//! repository, map the error.
//!
//! Extractor rejections are taken as `Result` and converted to
//! [`ApiError`](crate::error::ApiError) so malformed input gets the same
//! JSON error body as a failed validation.

pub mod admin;
pub mod cart;
pub mod orders;
pub mod products;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use crate::AppState;

/// Liveness probe that also pings the database.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let database = state.db.health_check().await;
    let status = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if database { "ok" } else { "degraded" },
            "database": database,
        })),
    )
}
