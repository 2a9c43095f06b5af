use crate::adapters::AdminStore;
use crate::adapters::database::DbPool;
use crate::adapters::database::records::AdminRecord;
use crate::domain::admin::AdminPrincipal;
use crate::error::Result;
use async_trait::async_trait;

#[derive(Clone, Debug)]
pub struct AdminRepository {
    pool: DbPool,
}

impl AdminRepository {
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AdminStore for AdminRepository {
    /// Looks up an admin by username.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self), err)]
    async fn find_by_username(&self, username: &str) -> Result<Option<AdminPrincipal>> {
        let record = sqlx::query_as::<_, AdminRecord>(
            "SELECT id, username, password_hash FROM admin_users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.map(Into::into))
    }
}
