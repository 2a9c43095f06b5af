use crate::domain::customer::CustomerAccount;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, FromRow)]
pub struct CustomerRecord {
    pub(crate) id: Uuid,
    pub(crate) email: String,
    pub(crate) password_hash: String,
    pub(crate) full_name: Option<String>,
    pub(crate) phone: Option<String>,
    pub(crate) role: String,
    pub(crate) is_active: bool,
    pub(crate) created_at: OffsetDateTime,
    pub(crate) updated_at: OffsetDateTime,
    pub(crate) last_login_at: Option<OffsetDateTime>,
}

impl From<CustomerRecord> for CustomerAccount {
    fn from(record: CustomerRecord) -> Self {
        Self {
            id: record.id,
            email: record.email,
            password_hash: record.password_hash,
            full_name: record.full_name,
            phone: record.phone,
            role: record.role,
            is_active: record.is_active,
            created_at: record.created_at,
            updated_at: record.updated_at,
            last_login_at: record.last_login_at,
        }
    }
}
