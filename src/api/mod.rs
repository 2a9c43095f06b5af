use crate::config::Config;
use crate::services::account_service::AccountService;
use crate::services::admin_service::AdminAuthService;
use crate::services::auth_service::AuthService;
use axum::body::Body;
use axum::http::{HeaderName, Request};
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

pub mod admin;
pub mod auth;
pub mod cookies;
pub mod health;
pub mod me;
pub mod middleware;
pub mod schemas;

const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Config,
    pub account_service: AccountService,
    pub admin_service: AdminAuthService,
}

#[derive(Debug)]
pub struct ServiceContainer {
    pub account_service: AccountService,
    pub admin_service: AdminAuthService,
    /// Shared with background workers; handlers reach it through `account_service`.
    pub auth_service: AuthService,
}

/// Configures and returns the application router.
pub fn app_router(config: Config, services: ServiceContainer) -> Router {
    let state = AppState {
        config,
        account_service: services.account_service,
        admin_service: services.admin_service,
    };

    let admin_routes = Router::new()
        .route("/login", post(admin::login))
        .route("/logout", post(admin::logout))
        .route("/session", get(admin::session));

    let customer_routes = Router::new()
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .route("/me", get(me::get_me).put(me::update_me));

    Router::new()
        .route("/health", get(health::health))
        .nest("/api/admin", admin_routes)
        .nest("/api/v1", customer_routes)
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(REQUEST_ID_HEADER)))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .extensions()
                        .get::<tower_http::request_id::RequestId>()
                        .and_then(|id| id.header_value().to_str().ok())
                        .unwrap_or_default()
                        .to_string();

                    tracing::info_span!(
                        "request",
                        "request_id" = %request_id,
                        "http.request.method" = %request.method(),
                        "url.path" = %request.uri().path(),
                        "http.response.status_code" = tracing::field::Empty,
                        "otel.kind" = "server",
                        "user_id" = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: std::time::Duration, span: &tracing::Span| {
                        let status = response.status();
                        span.record("http.response.status_code", status.as_u16());

                        tracing::info!(
                            latency_ms = %latency.as_millis(),
                            status = %status.as_u16(),
                            "request completed"
                        );
                    },
                )
                .on_failure(|error, _latency, _span: &tracing::Span| {
                    tracing::error!(error = %error, "request failed");
                }),
        )
        .layer(SetRequestIdLayer::new(HeaderName::from_static(REQUEST_ID_HEADER), MakeRequestUuid))
        .with_state(state)
}
