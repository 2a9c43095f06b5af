use crate::domain::admin::AdminPrincipal;
use crate::domain::auth::{NewRefreshToken, RefreshTokenRecord};
use crate::domain::customer::{CustomerAccount, NewCustomer, ProfileUpdate};
use crate::error::Result;
use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

pub mod database;
pub mod memory;

/// Read access to provisioned admin credentials.
#[async_trait]
pub trait AdminStore: Send + Sync + std::fmt::Debug {
    async fn find_by_username(&self, username: &str) -> Result<Option<AdminPrincipal>>;
}

/// Customer account persistence. Lookups return `None` when no row matches.
#[async_trait]
pub trait CustomerStore: Send + Sync + std::fmt::Debug {
    async fn find_by_email(&self, email: &str) -> Result<Option<CustomerAccount>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<CustomerAccount>>;

    /// # Errors
    /// Returns `AppError::EmailExists` if the email is already taken.
    async fn create(&self, customer: NewCustomer) -> Result<CustomerAccount>;

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> Result<Option<CustomerAccount>>;

    async fn touch_last_login(&self, id: Uuid, at: OffsetDateTime) -> Result<()>;
}

/// Refresh token persistence, keyed by the token digest.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync + std::fmt::Debug {
    async fn create(&self, token: NewRefreshToken) -> Result<RefreshTokenRecord>;

    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<RefreshTokenRecord>>;

    /// Marks the record revoked only if it is not revoked yet.
    /// Returns `false` when another caller got there first.
    async fn revoke(&self, id: Uuid) -> Result<bool>;

    async fn delete_all_for_user(&self, user_id: Uuid) -> Result<u64>;

    /// Deletes records that expired before `now` or were revoked.
    async fn delete_stale(&self, now: OffsetDateTime) -> Result<u64>;
}
