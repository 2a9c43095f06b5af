use crate::api::schemas::health::HealthResponse;
use axum::{Json, response::IntoResponse};

/// Liveness probe: 200 as long as the process serves requests.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}
