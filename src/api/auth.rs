use crate::api::AppState;
use crate::api::cookies::{self, REFRESH_COOKIE};
use crate::api::middleware::CustomerUser;
use crate::api::schemas::auth::{Login, Signup};
use crate::api::schemas::{self, Envelope};
use crate::error::{AppError, Result};
use axum::{Json, extract::State, extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse};
use axum_extra::extract::CookieJar;

fn require_credentials(email: &str, password: &str) -> Result<()> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(AppError::BadRequest("invalid payload".to_string()));
    }
    Ok(())
}

pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: std::result::Result<Json<Signup>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let payload = schemas::body(payload)?;
    require_credentials(&payload.email, &payload.password)?;

    let (profile, pair) = state
        .account_service
        .sign_up(payload.email, payload.password, payload.full_name, payload.phone)
        .await?;

    let jar = cookies::with_token_pair(jar, pair, state.config.auth.cookie_secure);
    Ok((jar, Envelope::ok(profile)))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: std::result::Result<Json<Login>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let payload = schemas::body(payload)?;
    require_credentials(&payload.email, &payload.password)?;

    let (profile, pair) = state.account_service.login(payload.email, payload.password).await?;

    let jar = cookies::with_token_pair(jar, pair, state.config.auth.cookie_secure);
    Ok((jar, Envelope::ok(profile)))
}

pub async fn refresh(State(state): State<AppState>, jar: CookieJar) -> Result<impl IntoResponse> {
    let refresh_token = cookies::read(&jar, REFRESH_COOKIE).ok_or(AppError::RefreshInvalid)?;

    let (profile, pair) = state.account_service.refresh(&refresh_token).await?;

    let jar = cookies::with_token_pair(jar, pair, state.config.auth.cookie_secure);
    Ok((jar, Envelope::ok(profile)))
}

pub async fn logout(user: CustomerUser, State(state): State<AppState>, jar: CookieJar) -> Result<impl IntoResponse> {
    state.account_service.logout(user.user_id).await?;

    let jar = cookies::without_token_pair(jar, state.config.auth.cookie_secure);
    Ok((jar, StatusCode::NO_CONTENT))
}
