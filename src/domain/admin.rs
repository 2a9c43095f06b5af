use uuid::Uuid;

/// The single administrative role. Provisioned out-of-band, read-only here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminPrincipal {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
}
