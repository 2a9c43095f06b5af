use crate::adapters::{AdminStore, CustomerStore, RefreshTokenStore};
use crate::domain::admin::AdminPrincipal;
use crate::domain::auth::{NewRefreshToken, RefreshTokenRecord};
use crate::domain::customer::{CustomerAccount, NewCustomer, ProfileUpdate};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use time::OffsetDateTime;
use uuid::Uuid;

/// In-memory implementation of every store, for tests and local runs without Postgres.
/// Clones share the same maps.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    admins: Arc<DashMap<String, AdminPrincipal>>,
    customers: Arc<DashMap<Uuid, CustomerAccount>>,
    // email -> customer id; the entry lock doubles as the uniqueness constraint
    emails: Arc<DashMap<String, Uuid>>,
    refresh_tokens: Arc<DashMap<Uuid, RefreshTokenRecord>>,
    // token_hash -> record id
    token_index: Arc<DashMap<String, Uuid>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Provisions an admin account (the seed step that happens out-of-band in production).
    pub fn insert_admin(&self, username: &str, password_hash: &str) -> AdminPrincipal {
        let admin =
            AdminPrincipal { id: Uuid::new_v4(), username: username.to_string(), password_hash: password_hash.to_string() };
        self.admins.insert(admin.username.clone(), admin.clone());
        admin
    }

    /// Flips the active flag of an account. Returns `false` if the account does not exist.
    pub fn set_active(&self, id: Uuid, is_active: bool) -> bool {
        self.customers.get_mut(&id).is_some_and(|mut account| {
            account.is_active = is_active;
            account.updated_at = OffsetDateTime::now_utc();
            true
        })
    }

    /// Stores a refresh token record as given, including past expiry or revocation times.
    pub fn insert_refresh_token(&self, record: RefreshTokenRecord) {
        self.token_index.insert(record.token_hash.clone(), record.id);
        self.refresh_tokens.insert(record.id, record);
    }

    #[must_use]
    pub fn refresh_tokens_for(&self, user_id: Uuid) -> Vec<RefreshTokenRecord> {
        self.refresh_tokens.iter().filter(|r| r.user_id == user_id).map(|r| r.value().clone()).collect()
    }

    #[must_use]
    pub fn customer_count(&self) -> usize {
        self.customers.len()
    }
}

#[async_trait]
impl AdminStore for MemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<AdminPrincipal>> {
        Ok(self.admins.get(username).map(|a| a.value().clone()))
    }
}

#[async_trait]
impl CustomerStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<CustomerAccount>> {
        let Some(id) = self.emails.get(email).map(|id| *id) else {
            return Ok(None);
        };
        Ok(self.customers.get(&id).map(|c| c.value().clone()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<CustomerAccount>> {
        Ok(self.customers.get(&id).map(|c| c.value().clone()))
    }

    async fn create(&self, customer: NewCustomer) -> Result<CustomerAccount> {
        match self.emails.entry(customer.email.clone()) {
            Entry::Occupied(_) => Err(AppError::EmailExists),
            Entry::Vacant(slot) => {
                let now = OffsetDateTime::now_utc();
                let account = CustomerAccount {
                    id: Uuid::new_v4(),
                    email: customer.email,
                    password_hash: customer.password_hash,
                    full_name: customer.full_name,
                    phone: customer.phone,
                    role: customer.role,
                    is_active: customer.is_active,
                    created_at: now,
                    updated_at: now,
                    last_login_at: None,
                };
                self.customers.insert(account.id, account.clone());
                slot.insert(account.id);
                Ok(account)
            }
        }
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> Result<Option<CustomerAccount>> {
        Ok(self.customers.get_mut(&id).map(|mut account| {
            if let Some(full_name) = update.full_name {
                account.full_name = Some(full_name);
            }
            if let Some(phone) = update.phone {
                account.phone = Some(phone);
            }
            account.updated_at = OffsetDateTime::now_utc();
            account.value().clone()
        }))
    }

    async fn touch_last_login(&self, id: Uuid, at: OffsetDateTime) -> Result<()> {
        if let Some(mut account) = self.customers.get_mut(&id) {
            account.last_login_at = Some(at);
            account.updated_at = OffsetDateTime::now_utc();
        }
        Ok(())
    }
}

#[async_trait]
impl RefreshTokenStore for MemoryStore {
    async fn create(&self, token: NewRefreshToken) -> Result<RefreshTokenRecord> {
        let record = RefreshTokenRecord {
            id: Uuid::new_v4(),
            user_id: token.user_id,
            token_hash: token.token_hash,
            expires_at: token.expires_at,
            revoked_at: None,
            created_at: OffsetDateTime::now_utc(),
        };
        self.insert_refresh_token(record.clone());
        Ok(record)
    }

    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<RefreshTokenRecord>> {
        let Some(id) = self.token_index.get(token_hash).map(|id| *id) else {
            return Ok(None);
        };
        Ok(self.refresh_tokens.get(&id).map(|r| r.value().clone()))
    }

    async fn revoke(&self, id: Uuid) -> Result<bool> {
        // get_mut holds the shard write lock, so check-and-set is atomic
        let Some(mut record) = self.refresh_tokens.get_mut(&id) else {
            return Ok(false);
        };
        if record.revoked_at.is_some() {
            return Ok(false);
        }
        record.revoked_at = Some(OffsetDateTime::now_utc());
        Ok(true)
    }

    async fn delete_all_for_user(&self, user_id: Uuid) -> Result<u64> {
        let mut removed = 0;
        self.refresh_tokens.retain(|_, record| {
            if record.user_id == user_id {
                self.token_index.remove(&record.token_hash);
                removed += 1;
                false
            } else {
                true
            }
        });
        Ok(removed)
    }

    async fn delete_stale(&self, now: OffsetDateTime) -> Result<u64> {
        let mut removed = 0;
        self.refresh_tokens.retain(|_, record| {
            if record.is_revoked() || record.expires_at < now {
                self.token_index.remove(&record.token_hash);
                removed += 1;
                false
            } else {
                true
            }
        });
        Ok(removed)
    }
}
