#![allow(
    clippy::unwrap_used,
    clippy::panic,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    missing_debug_implementations,
    unreachable_pub,
    dead_code
)]
use sangehassan_auth::adapters::memory::MemoryStore;
use sangehassan_auth::config::{AuthConfig, Config, DatabaseConfig, LogFormat, ServerConfig, TelemetryConfig};
use sangehassan_auth::domain::auth::Password;
use sangehassan_auth::{AppBuilder, api};
use std::sync::{Arc, Once};

static INIT: Once = Once::new();

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin-password";

pub fn setup_tracing() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "warn".into())
            .add_directive("sangehassan_auth=debug".parse().unwrap())
            .add_directive("tower=warn".parse().unwrap())
            .add_directive("hyper=warn".parse().unwrap())
            .add_directive("reqwest=warn".parse().unwrap());

        tracing_subscriber::fmt().with_env_filter(filter).init();
    });
}

pub fn get_test_config() -> Config {
    Config {
        server: ServerConfig { host: "127.0.0.1".to_string(), port: 0, shutdown_timeout_secs: 1 },
        database: DatabaseConfig {
            url: "postgres://unused".to_string(),
            max_connections: 1,
            min_connections: 0,
            acquire_timeout_secs: 1,
        },
        auth: AuthConfig {
            jwt_secret: "test_secret".to_string(),
            admin_token_ttl_hours: 24,
            access_token_ttl_minutes: 15,
            refresh_token_ttl_days: 30,
            cookie_secure: false,
            refresh_cleanup_interval_secs: 0,
        },
        telemetry: TelemetryConfig { log_format: LogFormat::Text, otlp_endpoint: None },
    }
}

pub struct TestApp {
    pub server_url: String,
    /// Shares a cookie store across requests, like a browser.
    pub client: reqwest::Client,
    pub store: MemoryStore,
    pub config: Config,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_config(get_test_config()).await
    }

    pub async fn spawn_with_config(config: Config) -> Self {
        setup_tracing();

        let store = MemoryStore::new();
        store.insert_admin(ADMIN_USERNAME, &Password::hash(ADMIN_PASSWORD).unwrap());

        let services = AppBuilder::new(config.clone())
            .with_stores(Arc::new(store.clone()), Arc::new(store.clone()), Arc::new(store.clone()))
            .build()
            .unwrap();
        let app = api::app_router(config.clone(), services);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            server_url: format!("http://{addr}"),
            client: Self::browser(),
            store,
            config,
        }
    }

    /// A fresh client with its own empty cookie jar.
    pub fn browser() -> reqwest::Client {
        reqwest::Client::builder().cookie_store(true).build().unwrap()
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.server_url)
    }

    pub async fn signup(&self, client: &reqwest::Client, email: &str, password: &str) -> serde_json::Value {
        let resp = client
            .post(self.url("/api/v1/auth/signup"))
            .json(&serde_json::json!({ "email": email, "password": password, "full_name": "Test User" }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        resp.json().await.unwrap()
    }
}

/// Value of a `Set-Cookie` header for the named cookie, if the response set one.
pub fn set_cookie<'a>(resp: &'a reqwest::Response, name: &str) -> Option<&'a str> {
    resp.headers()
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(&format!("{name}=")))
}

/// Raw value of a cookie from a `Set-Cookie` header line.
pub fn cookie_value(header: &str) -> &str {
    header.split(';').next().and_then(|pair| pair.split_once('=')).map_or("", |(_, value)| value)
}
