use crate::adapters::{CustomerStore, RefreshTokenStore};
use crate::config::AuthConfig;
use crate::domain::auth::{CUSTOMER_ISSUER, Claims, NewRefreshToken, OpaqueToken, TokenPair, expiry_after};
use crate::domain::customer::CustomerAccount;
use crate::error::{AppError, Result};
use opentelemetry::{global, metrics::Counter};
use std::sync::Arc;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Clone, Debug)]
struct Metrics {
    refresh_total: Counter<u64>,
    refresh_rejected_total: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("sangehassan-auth");
        Self {
            refresh_total: meter
                .u64_counter("auth_refresh_total")
                .with_description("Total number of successful token rotations")
                .build(),
            refresh_rejected_total: meter
                .u64_counter("auth_refresh_rejected_total")
                .with_description("Total number of refresh attempts rejected")
                .build(),
        }
    }
}

/// Issues customer token pairs and rotates refresh tokens.
#[derive(Clone, Debug)]
pub struct AuthService {
    config: AuthConfig,
    customers: Arc<dyn CustomerStore>,
    refresh_tokens: Arc<dyn RefreshTokenStore>,
    metrics: Metrics,
}

impl AuthService {
    #[must_use]
    pub fn new(
        config: AuthConfig,
        customers: Arc<dyn CustomerStore>,
        refresh_tokens: Arc<dyn RefreshTokenStore>,
    ) -> Self {
        Self { config, customers, refresh_tokens, metrics: Metrics::new() }
    }

    /// Signs a fresh access token and persists the digest of a new refresh token.
    /// The raw refresh token only leaves this function inside the returned pair.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the refresh record cannot be stored, or
    /// `AppError::Internal` if an expiry is out of range.
    #[tracing::instrument(err, skip(self), fields(user_id = %user_id))]
    pub async fn issue_token_pair(&self, user_id: Uuid, role: &str) -> Result<TokenPair> {
        let now = OffsetDateTime::now_utc();
        let access_expires_at = expiry_after(now, self.config.access_token_ttl())?;
        let refresh_expires_at = expiry_after(now, self.config.refresh_token_ttl())?;

        let claims = Claims::new(CUSTOMER_ISSUER, user_id.to_string(), vec![role.to_string()], access_expires_at);
        let access_token = claims.encode(self.config.jwt_secret.as_bytes())?;

        let refresh_token = OpaqueToken::generate();
        self.refresh_tokens
            .create(NewRefreshToken {
                user_id,
                token_hash: OpaqueToken::hash(&refresh_token),
                expires_at: refresh_expires_at,
            })
            .await?;

        Ok(TokenPair { access_token, access_expires_at, refresh_token, refresh_expires_at })
    }

    /// Exchanges a raw refresh token for a new pair. The presented token is consumed:
    /// once its checks pass it is revoked, and a second use fails.
    ///
    /// # Errors
    /// `RefreshInvalid` for unknown or concurrently consumed tokens, `RefreshRevoked`,
    /// `RefreshExpired`, `InactiveUser`, or `Database` from the stores.
    #[tracing::instrument(err(level = "warn"), skip(self, refresh_token), fields(user_id = tracing::field::Empty))]
    pub async fn refresh_session(&self, refresh_token: &str) -> Result<(CustomerAccount, TokenPair)> {
        let result = self.rotate(refresh_token).await;
        match &result {
            Ok(_) => {
                tracing::info!("Tokens rotated successfully");
                self.metrics.refresh_total.add(1, &[]);
            }
            Err(AppError::Database(_) | AppError::Internal) => {}
            Err(_) => self.metrics.refresh_rejected_total.add(1, &[]),
        }
        result
    }

    async fn rotate(&self, refresh_token: &str) -> Result<(CustomerAccount, TokenPair)> {
        let token_hash = OpaqueToken::hash(refresh_token);
        let record = self.refresh_tokens.find_by_hash(&token_hash).await?.ok_or(AppError::RefreshInvalid)?;

        tracing::Span::current().record("user_id", tracing::field::display(record.user_id));

        if record.is_revoked() {
            return Err(AppError::RefreshRevoked);
        }
        if record.is_expired() {
            return Err(AppError::RefreshExpired);
        }

        let user = self.customers.find_by_id(record.user_id).await?.ok_or(AppError::RefreshInvalid)?;
        if !user.is_active {
            return Err(AppError::InactiveUser);
        }

        if !self.refresh_tokens.revoke(record.id).await? {
            tracing::warn!("Refresh token consumed by a concurrent request");
            return Err(AppError::RefreshInvalid);
        }

        let pair = self.issue_token_pair(user.id, &user.role).await?;
        Ok((user, pair))
    }

    /// Deletes every refresh token of the user.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the deletion fails.
    #[tracing::instrument(err, skip(self), fields(user_id = %user_id))]
    pub async fn revoke_all(&self, user_id: Uuid) -> Result<u64> {
        let deleted = self.refresh_tokens.delete_all_for_user(user_id).await?;
        tracing::debug!(deleted, "Refresh tokens deleted");
        Ok(deleted)
    }

    /// Deletes refresh tokens that can never be used again: expired or revoked.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the deletion fails.
    #[tracing::instrument(err, skip(self), fields(deleted = tracing::field::Empty))]
    pub async fn purge_stale(&self) -> Result<u64> {
        let deleted = self.refresh_tokens.delete_stale(OffsetDateTime::now_utc()).await?;
        tracing::Span::current().record("deleted", deleted);
        Ok(deleted)
    }

    /// Verifies a customer access token and returns the user ID (subject).
    /// Tokens from another issuer are rejected even when signed with the same secret.
    ///
    /// # Errors
    /// Returns `AppError::InvalidToken` on any signature, issuer, expiry or subject failure.
    pub fn verify_access(&self, token: &str) -> Result<Uuid> {
        let claims = Claims::decode(token, self.config.jwt_secret.as_bytes(), CUSTOMER_ISSUER)?;
        Uuid::parse_str(&claims.sub).map_err(|_| AppError::InvalidToken)
    }
}
