use crate::domain::auth::TokenPair;
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use time::{Duration, OffsetDateTime};

pub const ADMIN_COOKIE: &str = "sh_admin";
pub const ACCESS_COOKIE: &str = "access_token";
pub const REFRESH_COOKIE: &str = "refresh_token";

fn session_cookie(name: &'static str, value: String, max_age: Duration, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(max_age)
        .build()
}

fn removal_cookie(name: &'static str, secure: bool) -> Cookie<'static> {
    session_cookie(name, String::new(), Duration::ZERO, secure)
}

/// Seconds left until `expires_at`, never negative.
fn until(expires_at: OffsetDateTime) -> Duration {
    (expires_at - OffsetDateTime::now_utc()).max(Duration::ZERO)
}

pub fn with_admin_session(jar: CookieJar, token: String, ttl: Duration, secure: bool) -> CookieJar {
    jar.add(session_cookie(ADMIN_COOKIE, token, ttl, secure))
}

pub fn without_admin_session(jar: CookieJar, secure: bool) -> CookieJar {
    jar.add(removal_cookie(ADMIN_COOKIE, secure))
}

pub fn with_token_pair(jar: CookieJar, pair: TokenPair, secure: bool) -> CookieJar {
    jar.add(session_cookie(ACCESS_COOKIE, pair.access_token, until(pair.access_expires_at), secure))
        .add(session_cookie(REFRESH_COOKIE, pair.refresh_token, until(pair.refresh_expires_at), secure))
}

pub fn without_token_pair(jar: CookieJar, secure: bool) -> CookieJar {
    jar.add(removal_cookie(ACCESS_COOKIE, secure)).add(removal_cookie(REFRESH_COOKIE, secure))
}

/// Non-empty value of the named cookie, if present.
pub fn read(jar: &CookieJar, name: &str) -> Option<String> {
    jar.get(name).map(|c| c.value().to_string()).filter(|v| !v.is_empty())
}
