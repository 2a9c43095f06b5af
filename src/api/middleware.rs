use crate::api::AppState;
use crate::api::cookies::{self, ACCESS_COOKIE, ADMIN_COOKIE};
use crate::error::AppError;
use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::CookieJar;
use uuid::Uuid;

/// An authenticated admin, read from the `sh_admin` cookie.
#[derive(Debug)]
pub struct AdminUser {
    pub username: String,
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = cookies::read(&jar, ADMIN_COOKIE).ok_or(AppError::InvalidToken)?;

        let username = state.admin_service.parse_token(&token)?;

        Ok(Self { username })
    }
}

/// An authenticated customer, read from the `access_token` cookie.
#[derive(Debug)]
pub struct CustomerUser {
    pub user_id: Uuid,
}

impl FromRequestParts<AppState> for CustomerUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = cookies::read(&jar, ACCESS_COOKIE).ok_or(AppError::InvalidToken)?;

        let user_id = state.account_service.verify_access(&token)?;
        tracing::Span::current().record("user_id", tracing::field::display(user_id));

        Ok(Self { user_id })
    }
}
