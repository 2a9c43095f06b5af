#![allow(clippy::unwrap_used, clippy::panic, clippy::todo, clippy::missing_panics_doc, clippy::must_use_candidate, missing_debug_implementations, unreachable_pub, clippy::similar_names)]
use reqwest::StatusCode;
use reqwest::header::COOKIE;
use serde_json::json;
use uuid::Uuid;

mod common;

fn unique_email() -> String {
    format!("user_{}@example.com", &Uuid::new_v4().to_string()[..8])
}

#[tokio::test]
async fn test_signup_sets_cookies_and_returns_profile() {
    let app = common::TestApp::spawn().await;
    let email = unique_email();

    let resp = app
        .client
        .post(app.url("/api/v1/auth/signup"))
        .json(&json!({ "email": email, "password": "password123", "full_name": "Sara", "phone": "0912" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);

    let access = common::set_cookie(&resp, "access_token").expect("missing access_token cookie").to_string();
    let refresh = common::set_cookie(&resp, "refresh_token").expect("missing refresh_token cookie").to_string();
    for header in [&access, &refresh] {
        assert!(header.contains("HttpOnly"), "{header}");
        assert!(header.contains("SameSite=Lax"), "{header}");
        assert!(header.contains("Path=/"), "{header}");
        assert!(!header.contains("Secure"), "{header}");
    }

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["email"], email.as_str());
    assert_eq!(body["data"]["full_name"], "Sara");
    assert_eq!(body["data"]["role"], "user");
    assert!(body["data"].get("password_hash").is_none());

    // Only the digest of the refresh token is persisted.
    let user_id: Uuid = body["data"]["id"].as_str().unwrap().parse().unwrap();
    let records = app.store.refresh_tokens_for(user_id);
    assert_eq!(records.len(), 1);
    assert_ne!(records[0].token_hash, common::cookie_value(&refresh));
    assert_eq!(records[0].token_hash.len(), 64);
}

#[tokio::test]
async fn test_duplicate_signup_conflicts() {
    let app = common::TestApp::spawn().await;
    let email = unique_email();
    app.signup(&app.client, &email, "password123").await;

    let resp = app
        .client
        .post(app.url("/api/v1/auth/signup"))
        .json(&json!({ "email": email, "password": "other" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "email already exists");
    assert_eq!(app.store.customer_count(), 1);
}

#[tokio::test]
async fn test_signup_rejects_bad_payloads() {
    let app = common::TestApp::spawn().await;

    let missing_password = app
        .client
        .post(app.url("/api/v1/auth/signup"))
        .json(&json!({ "email": "a@example.com", "password": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(missing_password.status(), StatusCode::BAD_REQUEST);

    let not_json = app
        .client
        .post(app.url("/api/v1/auth/signup"))
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(not_json.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = not_json.json().await.unwrap();
    assert_eq!(body["error"], "invalid payload");

    assert_eq!(app.store.customer_count(), 0);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = common::TestApp::spawn().await;
    let email = unique_email();
    app.signup(&common::TestApp::browser(), &email, "password123").await;

    let unknown = app
        .client
        .post(app.url("/api/v1/auth/login"))
        .json(&json!({ "email": unique_email(), "password": "password123" }))
        .send()
        .await
        .unwrap();
    let wrong = app
        .client
        .post(app.url("/api/v1/auth/login"))
        .json(&json!({ "email": email, "password": "wrong" }))
        .send()
        .await
        .unwrap();

    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    assert!(common::set_cookie(&wrong, "access_token").is_none());

    let unknown: serde_json::Value = unknown.json().await.unwrap();
    let wrong: serde_json::Value = wrong.json().await.unwrap();
    assert_eq!(unknown, wrong);
}

#[tokio::test]
async fn test_inactive_user_cannot_login_or_refresh() {
    let app = common::TestApp::spawn().await;
    let email = unique_email();
    let body = app.signup(&app.client, &email, "password123").await;
    let user_id: Uuid = body["data"]["id"].as_str().unwrap().parse().unwrap();

    assert!(app.store.set_active(user_id, false));

    let login = common::TestApp::browser()
        .post(app.url("/api/v1/auth/login"))
        .json(&json!({ "email": email, "password": "password123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(login.status(), StatusCode::UNAUTHORIZED);

    let refresh = app.client.post(app.url("/api/v1/auth/refresh")).send().await.unwrap();
    assert_eq!(refresh.status(), StatusCode::UNAUTHORIZED);

    // The rejected refresh did not consume the record.
    let records = app.store.refresh_tokens_for(user_id);
    assert_eq!(records.len(), 1);
    assert!(records[0].revoked_at.is_none());
}

#[tokio::test]
async fn test_refresh_rotates_and_old_token_is_rejected() {
    let app = common::TestApp::spawn().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(app.url("/api/v1/auth/signup"))
        .json(&json!({ "email": unique_email(), "password": "password123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let refresh_1 = common::cookie_value(common::set_cookie(&resp, "refresh_token").unwrap()).to_string();

    let rotated = client
        .post(app.url("/api/v1/auth/refresh"))
        .header(COOKIE, format!("refresh_token={refresh_1}"))
        .send()
        .await
        .unwrap();
    assert_eq!(rotated.status(), StatusCode::OK);
    let refresh_2 = common::cookie_value(common::set_cookie(&rotated, "refresh_token").unwrap()).to_string();
    assert!(common::set_cookie(&rotated, "access_token").is_some());
    assert_ne!(refresh_1, refresh_2, "refresh token should rotate");

    let body: serde_json::Value = rotated.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert!(body["data"]["email"].is_string());

    let replay = client
        .post(app.url("/api/v1/auth/refresh"))
        .header(COOKIE, format!("refresh_token={refresh_1}"))
        .send()
        .await
        .unwrap();
    assert_eq!(replay.status(), StatusCode::UNAUTHORIZED, "old refresh token should be rejected");

    let next = client
        .post(app.url("/api/v1/auth/refresh"))
        .header(COOKIE, format!("refresh_token={refresh_2}"))
        .send()
        .await
        .unwrap();
    assert_eq!(next.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_without_cookie_is_unauthorized() {
    let app = common::TestApp::spawn().await;

    let resp = app.client.post(app.url("/api/v1/auth/refresh")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let garbage = reqwest::Client::new()
        .post(app.url("/api/v1/auth/refresh"))
        .header(COOKIE, "refresh_token=not-a-token")
        .send()
        .await
        .unwrap();
    assert_eq!(garbage.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = garbage.json().await.unwrap();
    assert_eq!(body, json!({ "success": false, "error": "unauthorized" }));
}

#[tokio::test]
async fn test_concurrent_refresh_has_single_winner() {
    let app = common::TestApp::spawn().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(app.url("/api/v1/auth/signup"))
        .json(&json!({ "email": unique_email(), "password": "password123" }))
        .send()
        .await
        .unwrap();
    let refresh = common::cookie_value(common::set_cookie(&resp, "refresh_token").unwrap()).to_string();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let client = client.clone();
        let url = app.url("/api/v1/auth/refresh");
        let cookie = format!("refresh_token={refresh}");
        handles.push(tokio::spawn(async move { client.post(url).header(COOKIE, cookie).send().await.unwrap().status() }));
    }

    let mut successes = 0;
    for handle in handles {
        let status = handle.await.unwrap();
        if status == StatusCode::OK {
            successes += 1;
        } else {
            assert_eq!(status, StatusCode::UNAUTHORIZED);
        }
    }
    assert_eq!(successes, 1);
}

#[tokio::test]
async fn test_me_and_update_me() {
    let app = common::TestApp::spawn().await;
    let email = unique_email();
    app.signup(&app.client, &email, "password123").await;

    let me = app.client.get(app.url("/api/v1/me")).send().await.unwrap();
    assert_eq!(me.status(), StatusCode::OK);
    let body: serde_json::Value = me.json().await.unwrap();
    assert_eq!(body["data"]["email"], email.as_str());
    assert_eq!(body["data"]["full_name"], "Test User");

    let updated = app.client.put(app.url("/api/v1/me")).json(&json!({ "phone": "0935" })).send().await.unwrap();
    assert_eq!(updated.status(), StatusCode::OK);
    let body: serde_json::Value = updated.json().await.unwrap();
    assert_eq!(body["data"]["phone"], "0935");
    assert_eq!(body["data"]["full_name"], "Test User", "absent fields are left unchanged");

    let renamed = app.client.put(app.url("/api/v1/me")).json(&json!({ "full_name": "Sara" })).send().await.unwrap();
    let body: serde_json::Value = renamed.json().await.unwrap();
    assert_eq!(body["data"]["full_name"], "Sara");
    assert_eq!(body["data"]["phone"], "0935");
}

#[tokio::test]
async fn test_protected_routes_require_customer_token() {
    let app = common::TestApp::spawn().await;
    let client = reqwest::Client::new();

    let anonymous = client.get(app.url("/api/v1/me")).send().await.unwrap();
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let forged = client.get(app.url("/api/v1/me")).header(COOKIE, "access_token=abc.def.ghi").send().await.unwrap();
    assert_eq!(forged.status(), StatusCode::UNAUTHORIZED);

    let logout = client.post(app.url("/api/v1/auth/logout")).send().await.unwrap();
    assert_eq!(logout.status(), StatusCode::UNAUTHORIZED);

    // An admin session is not a customer session.
    let admin_login = client
        .post(app.url("/api/admin/login"))
        .json(&json!({ "username": common::ADMIN_USERNAME, "password": common::ADMIN_PASSWORD }))
        .send()
        .await
        .unwrap();
    let admin_token = common::cookie_value(common::set_cookie(&admin_login, "sh_admin").unwrap()).to_string();

    let crossed = client
        .get(app.url("/api/v1/me"))
        .header(COOKIE, format!("access_token={admin_token}"))
        .send()
        .await
        .unwrap();
    assert_eq!(crossed.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_ends_every_session() {
    let app = common::TestApp::spawn().await;
    let email = unique_email();
    let body = app.signup(&app.client, &email, "password123").await;
    let user_id: Uuid = body["data"]["id"].as_str().unwrap().parse().unwrap();

    // A second device.
    let other_device = common::TestApp::browser();
    let login = other_device
        .post(app.url("/api/v1/auth/login"))
        .json(&json!({ "email": email, "password": "password123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(login.status(), StatusCode::OK);
    assert_eq!(app.store.refresh_tokens_for(user_id).len(), 2);

    let logout = app.client.post(app.url("/api/v1/auth/logout")).send().await.unwrap();
    assert_eq!(logout.status(), StatusCode::NO_CONTENT);
    let cleared = common::set_cookie(&logout, "refresh_token").unwrap();
    assert!(cleared.contains("Max-Age=0"), "{cleared}");

    assert!(app.store.refresh_tokens_for(user_id).is_empty());

    let refresh = other_device.post(app.url("/api/v1/auth/refresh")).send().await.unwrap();
    assert_eq!(refresh.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_records_last_login() {
    let app = common::TestApp::spawn().await;
    let email = unique_email();
    app.signup(&common::TestApp::browser(), &email, "password123").await;

    let resp = app
        .client
        .post(app.url("/api/v1/auth/login"))
        .json(&json!({ "email": email, "password": "password123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let mut recorded = false;
    for _ in 0..50 {
        let account = sangehassan_auth::adapters::CustomerStore::find_by_email(&app.store, &email).await.unwrap().unwrap();
        if account.last_login_at.is_some() {
            recorded = true;
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert!(recorded, "last_login_at should be set shortly after login");
}
