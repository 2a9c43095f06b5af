use crate::adapters::AdminStore;
use crate::config::AuthConfig;
use crate::domain::auth::{ADMIN_ISSUER, Claims, DUMMY_PASSWORD_HASH, expiry_after};
use crate::error::{AppError, Result};
use crate::services::password_service::PasswordService;
use opentelemetry::{global, metrics::Counter};
use std::sync::Arc;
use time::OffsetDateTime;

#[derive(Clone, Debug)]
struct Metrics {
    login_total: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("sangehassan-auth");
        Self {
            login_total: meter
                .u64_counter("admin_login_total")
                .with_description("Total number of successful admin logins")
                .build(),
        }
    }
}

/// Admin sessions: one signed bearer token per login, no refresh.
#[derive(Clone, Debug)]
pub struct AdminAuthService {
    config: AuthConfig,
    admins: Arc<dyn AdminStore>,
    passwords: PasswordService,
    metrics: Metrics,
}

impl AdminAuthService {
    #[must_use]
    pub fn new(config: AuthConfig, admins: Arc<dyn AdminStore>, passwords: PasswordService) -> Self {
        Self { config, admins, passwords, metrics: Metrics::new() }
    }

    /// Authenticates an admin and returns a signed session token.
    ///
    /// # Errors
    /// Returns `AppError::InvalidCredentials` for an unknown username or a wrong password.
    #[tracing::instrument(skip(self, password), err(level = "warn"))]
    pub async fn login(&self, username: String, password: String) -> Result<String> {
        let admin = self.admins.find_by_username(&username).await?;

        // Unknown usernames still pay for a full verification.
        let password_hash = admin.as_ref().map_or(DUMMY_PASSWORD_HASH, |a| a.password_hash.as_str());
        let is_valid = self.passwords.verify(&password, password_hash).await?;

        let Some(admin) = admin.filter(|_| is_valid) else {
            tracing::warn!("Admin login failed: invalid credentials");
            return Err(AppError::InvalidCredentials);
        };

        let expires_at = expiry_after(OffsetDateTime::now_utc(), self.config.admin_token_ttl())?;
        let token = Claims::new(ADMIN_ISSUER, admin.username, vec![], expires_at)
            .encode(self.config.jwt_secret.as_bytes())?;

        tracing::info!("Admin logged in");
        self.metrics.login_total.add(1, &[]);

        Ok(token)
    }

    /// Verifies an admin token and returns the username (subject).
    ///
    /// # Errors
    /// Returns `AppError::InvalidToken` on a bad signature, an expired token or a foreign issuer.
    pub fn parse_token(&self, token: &str) -> Result<String> {
        let claims = Claims::decode(token, self.config.jwt_secret.as_bytes(), ADMIN_ISSUER)?;
        Ok(claims.sub)
    }
}
