mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use common::{TestApp, ADMIN_PASSWORD};
use serde_json::json;
use tower::ServiceExt;

async fn login_attempt(app: &TestApp, username: &str, password: &str) -> StatusCode {
    let payload = json!({"username": username, "password": password});
    let response = app.router.clone().oneshot(
        Request::builder()
            .method("POST")
            .uri("/api/v1/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap()
    ).await.unwrap();
    response.status()
}

#[tokio::test]
async fn test_login_round_trip() {
    let app = TestApp::new().await;
    let auth = app.login("admin", ADMIN_PASSWORD).await;

    assert!(!auth.access_token.is_empty());
    assert!(!auth.csrf_token.is_empty());
}

#[tokio::test]
async fn test_wrong_password_is_unauthorized() {
    let app = TestApp::new().await;
    assert_eq!(login_attempt(&app, "admin", "wrong").await, StatusCode::UNAUTHORIZED);
    assert_eq!(login_attempt(&app, "no-such-user", "wrong").await, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_repeated_failures_are_throttled() {
    let app = TestApp::new().await;
    let admin = app.login("admin", ADMIN_PASSWORD).await;
    app.create_user(&admin, "locked", "right-password", "CLIENT").await;

    for _ in 0..4 {
        assert_eq!(login_attempt(&app, "locked", "wrong").await, StatusCode::UNAUTHORIZED);
    }

    // Fifth failure in the window trips the throttle.
    assert_eq!(login_attempt(&app, "locked", "wrong").await, StatusCode::TOO_MANY_REQUESTS);

    // A successful login clears the counter.
    assert_eq!(login_attempt(&app, "locked", "right-password").await, StatusCode::OK);
    assert_eq!(login_attempt(&app, "locked", "wrong").await, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_mutating_requests_need_the_csrf_header() {
    let app = TestApp::new().await;
    let auth = app.login("admin", ADMIN_PASSWORD).await;

    let payload = json!({"username": "u1", "password": "pw", "role": "CLIENT"});
    let response = app.router.clone().oneshot(
        Request::builder()
            .method("POST")
            .uri("/api/v1/users")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::COOKIE, format!("access_token={}", auth.access_token))
            .body(Body::from(payload.to_string()))
            .unwrap()
    ).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_only_user_management() {
    let app = TestApp::new().await;
    let admin = app.login("admin", ADMIN_PASSWORD).await;
    app.create_user(&admin, "plain", "pw-plain-1", "CLIENT").await;
    let plain = app.login("plain", "pw-plain-1").await;

    let payload = json!({"username": "u2", "password": "pw", "role": "CLIENT"});
    let res = app.request(Method::POST, "/api/v1/users", Some(&plain), Some(payload)).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = app.request(Method::GET, "/api/v1/users", Some(&plain), None).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = app.request(Method::GET, "/api/v1/users", Some(&admin), None).await;
    assert_eq!(res.status(), StatusCode::OK);
}
