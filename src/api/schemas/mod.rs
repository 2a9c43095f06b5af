use crate::error::{AppError, Result};
use axum::Json;
use axum::extract::rejection::JsonRejection;
use serde::Serialize;

pub mod admin;
pub mod auth;
pub mod health;

/// Success body shared by every endpoint. Failures are rendered by `AppError`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> Envelope<T> {
    pub const fn ok(data: T) -> Json<Self> {
        Json(Self { success: true, data })
    }
}

/// Unwraps a JSON body, turning any decoding failure into a 400.
///
/// # Errors
/// Returns `AppError::BadRequest` when the body is missing or malformed.
pub fn body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected request body");
        AppError::BadRequest("invalid payload".to_string())
    })
}
