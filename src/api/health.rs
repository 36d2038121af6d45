//! Health check endpoint

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::AppResult;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub ok: bool,
    /// Database state, `up` when the round trip succeeded
    pub db: String,
    /// Database round trip in milliseconds
    pub latency_ms: f64,
}

/// Health check endpoint (checks database connectivity)
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service and database are up", body = HealthResponse),
        (status = 500, description = "Database unreachable", body = crate::error::ErrorResponse)
    )
)]
pub async fn health_check(State(state): State<crate::AppState>) -> AppResult<Json<HealthResponse>> {
    let elapsed = state.services.ping_database().await?;
    Ok(Json(HealthResponse {
        ok: true,
        db: "up".to_string(),
        latency_ms: elapsed.as_secs_f64() * 1000.0,
    }))
}
