use crate::error::{AppError, Result};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use base64::Engine;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::{RngCore, rngs::OsRng};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use time::OffsetDateTime;
use uuid::Uuid;

/// Issuer of admin session tokens.
pub const ADMIN_ISSUER: &str = "sangehassan-admin";
/// Issuer of customer access tokens.
pub const CUSTOMER_ISSUER: &str = "sangehassan-user";

/// Stored refresh credential. Only the SHA-256 digest of the raw token is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTokenRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: OffsetDateTime,
    pub revoked_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}

impl RefreshTokenRecord {
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at <= OffsetDateTime::now_utc()
    }

    #[must_use]
    pub const fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    #[must_use]
    pub fn is_usable(&self) -> bool {
        !self.is_revoked() && !self.is_expired()
    }
}

#[derive(Debug, Clone)]
pub struct NewRefreshToken {
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: OffsetDateTime,
}

/// Access/refresh pair handed to the client. The raw refresh token exists only here.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub access_expires_at: OffsetDateTime,
    pub refresh_token: String,
    pub refresh_expires_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub iss: String,
    pub sub: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aud: Vec<String>,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    #[must_use]
    pub fn new(issuer: &str, subject: String, audience: Vec<String>, expires_at: OffsetDateTime) -> Self {
        Self {
            iss: issuer.to_string(),
            sub: subject,
            aud: audience,
            iat: OffsetDateTime::now_utc().unix_timestamp(),
            exp: expires_at.unix_timestamp(),
        }
    }

    /// Signs the claims with HS256.
    ///
    /// # Errors
    /// Returns `AppError::Internal` if signing fails.
    pub fn encode(&self, secret: &[u8]) -> Result<String> {
        encode(&Header::new(Algorithm::HS256), self, &EncodingKey::from_secret(secret))
            .map_err(|_| AppError::Internal)
    }

    /// Verifies signature, expiry and issuer.
    ///
    /// # Errors
    /// Returns `AppError::InvalidToken` if any check fails.
    pub fn decode(token: &str, secret: &[u8], issuer: &str) -> Result<Self> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.validate_aud = false;
        validation.leeway = 0;

        let token_data = decode::<Self>(token, &DecodingKey::from_secret(secret), &validation).map_err(|e| {
            tracing::debug!(error = %e, "Token rejected");
            AppError::InvalidToken
        })?;

        Ok(token_data.claims)
    }
}

/// `now + ttl`, failing instead of panicking when the result is out of range.
///
/// # Errors
/// Returns `AppError::Internal` if the expiry cannot be represented.
pub fn expiry_after(now: OffsetDateTime, ttl: time::Duration) -> Result<OffsetDateTime> {
    now.checked_add(ttl).ok_or_else(|| {
        tracing::error!(ttl_secs = ttl.whole_seconds(), "Token expiry out of range");
        AppError::Internal
    })
}

/// Argon2id PHC string with the default cost parameters and a digest no password produces.
/// Verified against when an account does not exist so both login branches cost the same.
pub(crate) const DUMMY_PASSWORD_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

#[derive(Debug)]
pub struct Password;

impl Password {
    /// # Errors
    /// Returns `AppError::Internal` if hashing fails.
    pub fn hash(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let password_hash =
            argon2.hash_password(password.as_bytes(), &salt).map_err(|_| AppError::Internal)?.to_string();
        Ok(password_hash)
    }

    /// Constant-time comparison of `password` against a stored PHC hash.
    ///
    /// # Errors
    /// Returns `AppError::Internal` if the stored hash is malformed.
    pub fn verify(password: &str, hash: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(hash).map_err(|_| AppError::Internal)?;
        Ok(Argon2::default().verify_password(password.as_bytes(), &parsed_hash).is_ok())
    }
}

#[derive(Debug)]
pub struct OpaqueToken;

impl OpaqueToken {
    /// Generates a cryptographically secure random string (32 bytes -> Base64).
    #[must_use]
    pub fn generate() -> String {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Hashes a token using SHA-256 for storage.
    #[must_use]
    pub fn hash(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn in_one_hour() -> OffsetDateTime {
        OffsetDateTime::now_utc() + time::Duration::hours(1)
    }

    #[test]
    fn test_claims_roundtrip() {
        let claims = Claims::new(CUSTOMER_ISSUER, Uuid::new_v4().to_string(), vec!["user".to_string()], in_one_hour());

        let token = claims.encode(b"test_secret").unwrap();
        let decoded = Claims::decode(&token, b"test_secret", CUSTOMER_ISSUER).unwrap();

        assert_eq!(claims, decoded);
    }

    #[test]
    fn test_claims_invalid_secret() {
        let claims = Claims::new(ADMIN_ISSUER, "admin".to_string(), vec![], in_one_hour());
        let token = claims.encode(b"secret1").unwrap();

        let result = Claims::decode(&token, b"secret2", ADMIN_ISSUER);
        assert!(matches!(result, Err(AppError::InvalidToken)));
    }

    #[test]
    fn test_claims_wrong_issuer() {
        let claims = Claims::new(ADMIN_ISSUER, "admin".to_string(), vec![], in_one_hour());
        let token = claims.encode(b"shared").unwrap();

        let result = Claims::decode(&token, b"shared", CUSTOMER_ISSUER);
        assert!(matches!(result, Err(AppError::InvalidToken)));
    }

    #[test]
    fn test_claims_expired() {
        let past = OffsetDateTime::now_utc() - time::Duration::hours(2);
        let claims = Claims::new(ADMIN_ISSUER, "admin".to_string(), vec![], past);
        let token = claims.encode(b"shared").unwrap();

        let result = Claims::decode(&token, b"shared", ADMIN_ISSUER);
        assert!(matches!(result, Err(AppError::InvalidToken)));
    }

    #[test]
    fn test_claims_expired_has_no_grace_window() {
        let just_now = OffsetDateTime::now_utc() - time::Duration::seconds(5);
        let token = Claims::new(CUSTOMER_ISSUER, "user".to_string(), vec![], just_now).encode(b"shared").unwrap();

        assert!(matches!(Claims::decode(&token, b"shared", CUSTOMER_ISSUER), Err(AppError::InvalidToken)));
    }

    #[test]
    fn test_expiry_after_is_checked() {
        let now = OffsetDateTime::now_utc();
        assert_eq!(expiry_after(now, time::Duration::minutes(15)).unwrap(), now + time::Duration::minutes(15));
        assert!(matches!(expiry_after(now, time::Duration::seconds(i64::MAX)), Err(AppError::Internal)));
    }

    #[test]
    fn test_password_hashing() {
        let password = "password12345";
        let hash = Password::hash(password).unwrap();

        assert!(Password::verify(password, &hash).unwrap());
        assert!(!Password::verify("wrong_password", &hash).unwrap());
    }

    #[test]
    fn test_dummy_hash_never_matches() {
        assert!(!Password::verify("", DUMMY_PASSWORD_HASH).unwrap());
        assert!(!Password::verify("password12345", DUMMY_PASSWORD_HASH).unwrap());
    }

    #[test]
    fn test_opaque_token_generation() {
        let token1 = OpaqueToken::generate();
        let token2 = OpaqueToken::generate();

        assert_ne!(token1, token2);
        assert_eq!(token1.len(), 43); // 32 bytes Base64 no pad
    }

    #[test]
    fn test_opaque_token_hashing() {
        let hash1 = OpaqueToken::hash("my_token");
        let hash2 = OpaqueToken::hash("my_token");

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
        assert_ne!(OpaqueToken::hash("other_token"), hash1);
    }

    #[test]
    fn test_record_usability() {
        let now = OffsetDateTime::now_utc();
        let mut record = RefreshTokenRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            token_hash: OpaqueToken::hash("raw"),
            expires_at: now + time::Duration::days(1),
            revoked_at: None,
            created_at: now,
        };
        assert!(record.is_usable());

        record.revoked_at = Some(now);
        assert!(!record.is_usable());

        record.revoked_at = None;
        record.expires_at = now - time::Duration::seconds(1);
        assert!(record.is_expired());
        assert!(!record.is_usable());
    }
}
