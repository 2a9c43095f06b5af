use crate::adapters::CustomerStore;
use crate::adapters::database::DbPool;
use crate::adapters::database::records::CustomerRecord;
use crate::domain::customer::{CustomerAccount, NewCustomer, ProfileUpdate};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

const CUSTOMER_COLUMNS: &str =
    "id, email, password_hash, full_name, phone, role, is_active, created_at, updated_at, last_login_at";

#[derive(Clone, Debug)]
pub struct CustomerRepository {
    pool: DbPool,
}

impl CustomerRepository {
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustomerStore for CustomerRepository {
    #[tracing::instrument(level = "debug", skip(self, email), err)]
    async fn find_by_email(&self, email: &str) -> Result<Option<CustomerAccount>> {
        let record = sqlx::query_as::<_, CustomerRecord>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.map(Into::into))
    }

    #[tracing::instrument(level = "debug", skip(self), err)]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<CustomerAccount>> {
        let record =
            sqlx::query_as::<_, CustomerRecord>(&format!("SELECT {CUSTOMER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(record.map(Into::into))
    }

    /// Inserts a new account. The unique index on `email` backs up the
    /// service-level existence check when two signups race.
    ///
    /// # Errors
    /// Returns `AppError::EmailExists` on a unique violation, `AppError::Database` otherwise.
    #[tracing::instrument(level = "debug", skip(self, customer), err)]
    async fn create(&self, customer: NewCustomer) -> Result<CustomerAccount> {
        let result = sqlx::query_as::<_, CustomerRecord>(&format!(
            r#"
            INSERT INTO users (email, password_hash, full_name, phone, role, is_active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {CUSTOMER_COLUMNS}
            "#
        ))
        .bind(&customer.email)
        .bind(&customer.password_hash)
        .bind(&customer.full_name)
        .bind(&customer.phone)
        .bind(&customer.role)
        .bind(customer.is_active)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(record) => Ok(record.into()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(AppError::EmailExists),
            Err(e) => Err(AppError::Database(e)),
        }
    }

    #[tracing::instrument(level = "debug", skip(self, update), err)]
    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> Result<Option<CustomerAccount>> {
        let record = sqlx::query_as::<_, CustomerRecord>(&format!(
            r#"
            UPDATE users
            SET full_name = COALESCE($2, full_name),
                phone = COALESCE($3, phone),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {CUSTOMER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(update.full_name)
        .bind(update.phone)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.map(Into::into))
    }

    #[tracing::instrument(level = "debug", skip(self), err)]
    async fn touch_last_login(&self, id: Uuid, at: OffsetDateTime) -> Result<()> {
        sqlx::query("UPDATE users SET last_login_at = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
