use crate::domain::auth::Password;
use crate::error::{AppError, Result};

/// Runs Argon2 off the async executor; a single hash takes tens of milliseconds.
#[derive(Clone, Copy, Debug, Default)]
pub struct PasswordService;

impl PasswordService {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// # Errors
    /// Returns `AppError::Internal` if hashing fails or the blocking task panics.
    #[tracing::instrument(err, skip(self, password), level = "debug")]
    #[allow(clippy::unused_self)]
    pub async fn hash(&self, password: &str) -> Result<String> {
        let password = password.to_string();
        tokio::task::spawn_blocking(move || Password::hash(&password)).await.map_err(|_| AppError::Internal)?
    }

    /// # Errors
    /// Returns `AppError::Internal` if the stored hash is malformed or the blocking task panics.
    #[tracing::instrument(err, skip(self, password, password_hash), level = "debug")]
    #[allow(clippy::unused_self)]
    pub async fn verify(&self, password: &str, password_hash: &str) -> Result<bool> {
        let password = password.to_string();
        let password_hash = password_hash.to_string();
        tokio::task::spawn_blocking(move || Password::verify(&password, &password_hash))
            .await
            .map_err(|_| AppError::Internal)?
    }
}
