use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("User inactive")]
    InactiveUser,
    #[error("Email already exists")]
    EmailExists,
    #[error("User not found")]
    UserNotFound,
    #[error("Invalid refresh token")]
    RefreshInvalid,
    #[error("Refresh token revoked")]
    RefreshRevoked,
    #[error("Refresh token expired")]
    RefreshExpired,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Internal server error")]
    Internal,
}

impl AppError {
    /// Transport status for each error kind. Every authentication failure maps to the
    /// same 401 so a remote caller cannot tell which check rejected it.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidCredentials
            | Self::InactiveUser
            | Self::RefreshInvalid
            | Self::RefreshRevoked
            | Self::RefreshExpired
            | Self::InvalidToken => StatusCode::UNAUTHORIZED,
            Self::EmailExists => StatusCode::CONFLICT,
            Self::UserNotFound => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Database(_) | Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::Database(e) => {
                tracing::error!(error = %e, "Database error");
                "internal server error".to_string()
            }
            Self::Internal => {
                tracing::error!("Internal server error occurred");
                "internal server error".to_string()
            }
            Self::EmailExists => "email already exists".to_string(),
            Self::UserNotFound => "user not found".to_string(),
            Self::BadRequest(msg) => {
                tracing::debug!(message = %msg, "Bad request");
                msg
            }
            e => {
                tracing::debug!(reason = %e, "Authentication failed");
                "unauthorized".to_string()
            }
        };

        let body = Json(json!({
            "success": false,
            "error": message
        }));

        (status, body).into_response()
    }
}
