use crate::api::AppState;
use crate::api::cookies;
use crate::api::middleware::AdminUser;
use crate::api::schemas::admin::{AdminLogin, AdminSession};
use crate::api::schemas::{self, Envelope};
use crate::error::Result;
use axum::{Json, extract::State, extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse};
use axum_extra::extract::CookieJar;

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: std::result::Result<Json<AdminLogin>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let payload = schemas::body(payload)?;
    let username = payload.username.clone();

    let token = state.admin_service.login(payload.username, payload.password).await?;

    let auth = &state.config.auth;
    let jar = cookies::with_admin_session(jar, token, auth.admin_token_ttl(), auth.cookie_secure);
    Ok((jar, Envelope::ok(AdminSession { username })))
}

/// Clears the cookie only; admin tokens stay valid until they expire.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    (cookies::without_admin_session(jar, state.config.auth.cookie_secure), StatusCode::NO_CONTENT)
}

pub async fn session(admin: AdminUser) -> impl IntoResponse {
    Envelope::ok(AdminSession { username: admin.username })
}
