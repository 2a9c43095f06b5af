use clap::{Args, Parser, ValueEnum};

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Config {
    #[command(flatten)]
    pub server: ServerConfig,

    #[command(flatten)]
    pub database: DatabaseConfig,

    #[command(flatten)]
    pub auth: AuthConfig,

    #[command(flatten)]
    pub telemetry: TelemetryConfig,
}

#[derive(Clone, Debug, Args)]
pub struct ServerConfig {
    /// Host to listen on
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Seconds to wait for in-flight requests during shutdown
    #[arg(long, env = "SHUTDOWN_TIMEOUT_SECS", default_value_t = 5)]
    pub shutdown_timeout_secs: u64,
}

#[derive(Clone, Debug, Args)]
pub struct DatabaseConfig {
    /// Database connection URL
    #[arg(long = "database-url", env = "DATABASE_URL")]
    pub url: String,

    /// Maximum number of pooled connections
    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value_t = 20)]
    pub max_connections: u32,

    /// Minimum number of idle connections kept open
    #[arg(long, env = "DB_MIN_CONNECTIONS", default_value_t = 2)]
    pub min_connections: u32,

    /// Seconds to wait for a free connection before failing
    #[arg(long, env = "DB_ACQUIRE_TIMEOUT_SECS", default_value_t = 5)]
    pub acquire_timeout_secs: u64,
}

/// Upper bounds keep every expiry computation far from `OffsetDateTime`'s range.
const MAX_ADMIN_TOKEN_TTL_HOURS: i64 = 24 * 366;
const MAX_ACCESS_TOKEN_TTL_MINUTES: i64 = 60 * 24 * 7;
const MAX_REFRESH_TOKEN_TTL_DAYS: i64 = 3660;

#[derive(Clone, Args)]
pub struct AuthConfig {
    /// Secret key shared by admin and customer token signing
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// Admin token time-to-live in hours
    #[arg(long = "jwt-ttl-hours", env = "JWT_TTL_HOURS", default_value_t = 24)]
    pub admin_token_ttl_hours: i64,

    /// Customer access token time-to-live in minutes
    #[arg(long, env = "ACCESS_TOKEN_TTL_MINUTES", default_value_t = 15)]
    pub access_token_ttl_minutes: i64,

    /// Customer refresh token time-to-live in days
    #[arg(long, env = "REFRESH_TOKEN_TTL_DAYS", default_value_t = 30)]
    pub refresh_token_ttl_days: i64,

    /// Mark session cookies as Secure (HTTPS only)
    #[arg(long, env = "COOKIE_SECURE", default_value_t = false)]
    pub cookie_secure: bool,

    /// Seconds between purges of expired and revoked refresh tokens (0 disables)
    #[arg(long, env = "REFRESH_TOKEN_CLEANUP_INTERVAL_SECS", default_value_t = 3600)]
    pub refresh_cleanup_interval_secs: u64,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("admin_token_ttl_hours", &self.admin_token_ttl_hours)
            .field("access_token_ttl_minutes", &self.access_token_ttl_minutes)
            .field("refresh_token_ttl_days", &self.refresh_token_ttl_days)
            .field("cookie_secure", &self.cookie_secure)
            .field("refresh_cleanup_interval_secs", &self.refresh_cleanup_interval_secs)
            .finish()
    }
}

impl AuthConfig {
    // Saturating so an unvalidated value cannot panic here; expiry arithmetic is checked.
    #[must_use]
    pub const fn admin_token_ttl(&self) -> time::Duration {
        time::Duration::seconds(self.admin_token_ttl_hours.saturating_mul(3600))
    }

    #[must_use]
    pub const fn access_token_ttl(&self) -> time::Duration {
        time::Duration::seconds(self.access_token_ttl_minutes.saturating_mul(60))
    }

    #[must_use]
    pub const fn refresh_token_ttl(&self) -> time::Duration {
        time::Duration::seconds(self.refresh_token_ttl_days.saturating_mul(86_400))
    }

    /// Checks that the secret is set and the token lifetimes are usable.
    ///
    /// # Errors
    /// Returns a description of the first invalid setting.
    pub fn validate(&self) -> Result<(), String> {
        if self.jwt_secret.trim().is_empty() {
            return Err("JWT_SECRET is required".to_string());
        }
        if self.admin_token_ttl_hours <= 0 {
            return Err("JWT_TTL_HOURS must be positive".to_string());
        }
        if self.access_token_ttl_minutes <= 0 || self.refresh_token_ttl_days <= 0 {
            return Err("token TTLs must be positive".to_string());
        }
        if self.admin_token_ttl_hours > MAX_ADMIN_TOKEN_TTL_HOURS {
            return Err(format!("JWT_TTL_HOURS must not exceed {MAX_ADMIN_TOKEN_TTL_HOURS}"));
        }
        if self.access_token_ttl_minutes > MAX_ACCESS_TOKEN_TTL_MINUTES {
            return Err(format!("ACCESS_TOKEN_TTL_MINUTES must not exceed {MAX_ACCESS_TOKEN_TTL_MINUTES}"));
        }
        if self.refresh_token_ttl_days > MAX_REFRESH_TOKEN_TTL_DAYS {
            return Err(format!("REFRESH_TOKEN_TTL_DAYS must not exceed {MAX_REFRESH_TOKEN_TTL_DAYS}"));
        }
        if self.refresh_token_ttl() <= self.access_token_ttl() {
            return Err("REFRESH_TOKEN_TTL_DAYS must exceed ACCESS_TOKEN_TTL_MINUTES".to_string());
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Debug, Args)]
pub struct TelemetryConfig {
    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// OTLP collector base URL; traces and metrics are only exported when set
    #[arg(long, env = "OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,
}

impl Config {
    #[must_use]
    pub fn load() -> Self {
        Self::parse()
    }
}
