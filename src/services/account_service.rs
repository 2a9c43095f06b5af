use crate::adapters::CustomerStore;
use crate::domain::auth::{DUMMY_PASSWORD_HASH, TokenPair};
use crate::domain::customer::{DEFAULT_ROLE, NewCustomer, ProfileUpdate, PublicProfile};
use crate::error::{AppError, Result};
use crate::services::auth_service::AuthService;
use crate::services::password_service::PasswordService;
use opentelemetry::{global, metrics::Counter};
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::Instrument;
use uuid::Uuid;

#[derive(Clone, Debug)]
struct AccountMetrics {
    signup_total: Counter<u64>,
    login_total: Counter<u64>,
    logout_total: Counter<u64>,
}

impl AccountMetrics {
    fn new() -> Self {
        let meter = global::meter("sangehassan-auth");
        Self {
            signup_total: meter
                .u64_counter("auth_signup_total")
                .with_description("Total number of successful customer signups")
                .build(),
            login_total: meter
                .u64_counter("auth_login_total")
                .with_description("Total number of successful customer logins")
                .build(),
            logout_total: meter
                .u64_counter("auth_logout_total")
                .with_description("Total number of customer logouts")
                .build(),
        }
    }
}

/// Customer account lifecycle: signup, login, refresh, logout and profile.
#[derive(Clone, Debug)]
pub struct AccountService {
    customers: Arc<dyn CustomerStore>,
    auth_service: AuthService,
    passwords: PasswordService,
    metrics: AccountMetrics,
}

impl AccountService {
    #[must_use]
    pub fn new(customers: Arc<dyn CustomerStore>, auth_service: AuthService, passwords: PasswordService) -> Self {
        Self { customers, auth_service, passwords, metrics: AccountMetrics::new() }
    }

    /// # Errors
    /// Returns `AppError::EmailExists` if the email is taken; nothing is created and no
    /// tokens are issued in that case.
    #[tracing::instrument(
        skip(self, email, password, full_name, phone),
        fields(user_id = tracing::field::Empty),
        err(level = "warn")
    )]
    pub async fn sign_up(
        &self,
        email: String,
        password: String,
        full_name: Option<String>,
        phone: Option<String>,
    ) -> Result<(PublicProfile, TokenPair)> {
        if self.customers.find_by_email(&email).await?.is_some() {
            return Err(AppError::EmailExists);
        }

        let password_hash = self.passwords.hash(&password).await?;

        let user = self
            .customers
            .create(NewCustomer {
                email,
                password_hash,
                full_name,
                phone,
                role: DEFAULT_ROLE.to_string(),
                is_active: true,
            })
            .await?;

        tracing::Span::current().record("user_id", tracing::field::display(user.id));

        let pair = self.auth_service.issue_token_pair(user.id, &user.role).await?;

        tracing::info!("Customer signed up");
        self.metrics.signup_total.add(1, &[]);

        Ok((user.public_profile(), pair))
    }

    /// Unknown email and wrong password are indistinguishable; an inactive account is
    /// reported as such only once it is known to exist.
    ///
    /// # Errors
    /// Returns `AppError::InvalidCredentials` or `AppError::InactiveUser`.
    #[tracing::instrument(
        skip(self, email, password),
        fields(user_id = tracing::field::Empty),
        err(level = "warn")
    )]
    pub async fn login(&self, email: String, password: String) -> Result<(PublicProfile, TokenPair)> {
        let account = self.customers.find_by_email(&email).await?;

        if let Some(user) = &account {
            tracing::Span::current().record("user_id", tracing::field::display(user.id));
            if !user.is_active {
                return Err(AppError::InactiveUser);
            }
        }

        let password_hash = account.as_ref().map_or(DUMMY_PASSWORD_HASH, |u| u.password_hash.as_str());
        let is_valid = self.passwords.verify(&password, password_hash).await?;

        let Some(user) = account.filter(|_| is_valid) else {
            tracing::warn!("Login failed: invalid credentials");
            return Err(AppError::InvalidCredentials);
        };

        let pair = self.auth_service.issue_token_pair(user.id, &user.role).await?;

        self.record_last_login(user.id);

        tracing::info!("Customer logged in");
        self.metrics.login_total.add(1, &[]);

        Ok((user.public_profile(), pair))
    }

    /// Fire-and-forget update of `last_login_at`. Failures are logged and never reach the caller.
    fn record_last_login(&self, user_id: Uuid) {
        let customers = Arc::clone(&self.customers);
        tokio::spawn(
            async move {
                if let Err(e) = customers.touch_last_login(user_id, OffsetDateTime::now_utc()).await {
                    tracing::warn!(error = %e, "Failed to record last login");
                }
            }
            .in_current_span(),
        );
    }

    /// # Errors
    /// See [`AuthService::refresh_session`].
    pub async fn refresh(&self, refresh_token: &str) -> Result<(PublicProfile, TokenPair)> {
        let (user, pair) = self.auth_service.refresh_session(refresh_token).await?;
        Ok((user.public_profile(), pair))
    }

    /// Ends every session of the user, on all devices.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the deletion fails.
    #[tracing::instrument(err, skip(self), fields(user_id = %user_id))]
    pub async fn logout(&self, user_id: Uuid) -> Result<()> {
        self.auth_service.revoke_all(user_id).await?;
        tracing::info!("Customer logged out");
        self.metrics.logout_total.add(1, &[]);
        Ok(())
    }

    /// # Errors
    /// Returns `AppError::UserNotFound` if the account does not exist.
    #[tracing::instrument(err(level = "debug"), skip(self), fields(user_id = %user_id))]
    pub async fn get_me(&self, user_id: Uuid) -> Result<PublicProfile> {
        let user = self.customers.find_by_id(user_id).await?.ok_or(AppError::UserNotFound)?;
        Ok(user.public_profile())
    }

    /// Updates name and phone only; credentials, role and the active flag are untouched.
    ///
    /// # Errors
    /// Returns `AppError::UserNotFound` if the account does not exist.
    #[tracing::instrument(err, skip(self, update), fields(user_id = %user_id))]
    pub async fn update_me(&self, user_id: Uuid, update: ProfileUpdate) -> Result<PublicProfile> {
        let user = self.customers.update_profile(user_id, update).await?.ok_or(AppError::UserNotFound)?;
        Ok(user.public_profile())
    }

    /// # Errors
    /// Returns `AppError::InvalidToken` if the access token is not a valid customer token.
    pub fn verify_access(&self, token: &str) -> Result<Uuid> {
        self.auth_service.verify_access(token)
    }
}
