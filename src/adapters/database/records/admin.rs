use crate::domain::admin::AdminPrincipal;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, FromRow)]
pub struct AdminRecord {
    pub(crate) id: Uuid,
    pub(crate) username: String,
    pub(crate) password_hash: String,
}

impl From<AdminRecord> for AdminPrincipal {
    fn from(record: AdminRecord) -> Self {
        Self { id: record.id, username: record.username, password_hash: record.password_hash }
    }
}
