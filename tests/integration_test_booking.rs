mod common;

use axum::http::{Method, StatusCode};
use chrono::{Datelike, Duration, Utc};
use common::{AuthHeaders, TestApp, ADMIN_PASSWORD};
use serde_json::{json, Value};

async fn parse_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn next_monday() -> String {
    let mut d = Utc::now().date_naive() + Duration::days(7);
    while d.weekday().num_days_from_monday() != 0 {
        d += Duration::days(1);
    }
    d.format("%Y-%m-%d").to_string()
}

async fn setup(app: &TestApp, suffix: &str) -> (String, String, AuthHeaders, AuthHeaders) {
    let admin = app.login("admin", ADMIN_PASSWORD).await;
    let coach_id = app.create_user(&admin, &format!("coach-{}", suffix), "pw-coach", "COACH").await;
    let client_id = app.create_user(&admin, &format!("client-{}", suffix), "pw-client", "CLIENT").await;
    let coach = app.login(&format!("coach-{}", suffix), "pw-coach").await;

    let payload = json!({
        "timezone": "UTC",
        "slots": [{"day_of_week": 0, "start": "09:00", "end": "12:00"}]
    });
    let res = app.request(Method::POST, &format!("/api/v1/coaches/{}/availability", coach_id), Some(&coach), Some(payload)).await;
    assert_eq!(res.status(), StatusCode::OK);

    let client = app.login(&format!("client-{}", suffix), "pw-client").await;
    (coach_id, client_id, coach, client)
}

#[tokio::test]
async fn test_client_books_an_open_slot() {
    let app = TestApp::new().await;
    let (coach_id, client_id, _, client) = setup(&app, "b1").await;
    let date = next_monday();

    let payload = json!({"coach_id": coach_id, "date": date, "time": "10:00"});
    let res = app.request(Method::POST, "/api/v1/sessions", Some(&client), Some(payload)).await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let body = parse_body(res).await;
    assert_eq!(body["coach_id"].as_str().unwrap(), coach_id);
    assert_eq!(body["client_id"].as_str().unwrap(), client_id);
    assert_eq!(body["status"].as_str().unwrap(), "SCHEDULED");
    assert_eq!(body["duration_minutes"].as_i64().unwrap(), 60);
    assert_eq!(body["rate_cents"].as_i64().unwrap(), 10000);
}

#[tokio::test]
async fn test_double_booking_conflicts() {
    let app = TestApp::new().await;
    let (coach_id, _, _, client) = setup(&app, "b2").await;
    let date = next_monday();

    let payload = json!({"coach_id": coach_id, "date": date, "time": "10:00"});
    let res = app.request(Method::POST, "/api/v1/sessions", Some(&client), Some(payload.clone())).await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = app.request(Method::POST, "/api/v1/sessions", Some(&client), Some(payload)).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // An overlapping start on the grid is gone too.
    let overlapping = json!({"coach_id": coach_id, "date": date, "time": "10:30"});
    let res = app.request(Method::POST, "/api/v1/sessions", Some(&client), Some(overlapping)).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_booking_outside_open_slots_conflicts() {
    let app = TestApp::new().await;
    let (coach_id, _, _, client) = setup(&app, "b3").await;
    let date = next_monday();

    // 13:00 is outside the 09:00-12:00 window.
    let payload = json!({"coach_id": coach_id, "date": date, "time": "13:00"});
    let res = app.request(Method::POST, "/api/v1/sessions", Some(&client), Some(payload)).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // 11:30 starts inside the window but a 60 min session would run past its end.
    let payload = json!({"coach_id": coach_id, "date": date, "time": "11:30"});
    let res = app.request(Method::POST, "/api/v1/sessions", Some(&client), Some(payload)).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_booking_in_the_past_rejected() {
    let app = TestApp::new().await;
    let (coach_id, _, _, client) = setup(&app, "b4").await;

    let last_monday = {
        let mut d = Utc::now().date_naive() - Duration::days(8);
        while d.weekday().num_days_from_monday() != 0 {
            d -= Duration::days(1);
        }
        d.format("%Y-%m-%d").to_string()
    };

    let payload = json!({"coach_id": coach_id, "date": last_monday, "time": "10:00"});
    let res = app.request(Method::POST, "/api/v1/sessions", Some(&client), Some(payload)).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = parse_body(res).await;
    assert_eq!(body["error"].as_str().unwrap(), "Cannot book in the past");
}

#[tokio::test]
async fn test_booking_validation_errors() {
    let app = TestApp::new().await;
    let (coach_id, _, _, client) = setup(&app, "b5").await;
    let date = next_monday();

    let res = app.request(Method::POST, "/api/v1/sessions", Some(&client), Some(json!({
        "coach_id": "missing", "date": date, "time": "10:00"
    }))).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = app.request(Method::POST, "/api/v1/sessions", Some(&client), Some(json!({
        "coach_id": coach_id, "date": "not-a-date", "time": "10:00"
    }))).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app.request(Method::POST, "/api/v1/sessions", Some(&client), Some(json!({
        "coach_id": coach_id, "date": date, "time": "10:00", "duration_minutes": 600
    }))).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = parse_body(res).await;
    assert_eq!(body["error"].as_str().unwrap(), "Duration must be between 15 and 480 minutes");
}

#[tokio::test]
async fn test_coach_books_on_behalf_of_a_client() {
    let app = TestApp::new().await;
    let (coach_id, client_id, coach, _) = setup(&app, "b6").await;
    let date = next_monday();

    // Coach without client_id has no one to book for.
    let res = app.request(Method::POST, "/api/v1/sessions", Some(&coach), Some(json!({
        "coach_id": coach_id, "date": date, "time": "09:00"
    }))).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app.request(Method::POST, "/api/v1/sessions", Some(&coach), Some(json!({
        "coach_id": coach_id, "date": date, "time": "09:00", "client_id": client_id, "rate_cents": 7500
    }))).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = parse_body(res).await;
    assert_eq!(body["client_id"].as_str().unwrap(), client_id);
    assert_eq!(body["rate_cents"].as_i64().unwrap(), 7500);
}

#[tokio::test]
async fn test_session_status_transitions() {
    let app = TestApp::new().await;
    let (coach_id, _, coach, client) = setup(&app, "b7").await;
    let date = next_monday();

    let res = app.request(Method::POST, "/api/v1/sessions", Some(&client), Some(json!({
        "coach_id": coach_id, "date": date, "time": "10:00"
    }))).await;
    let session_id = parse_body(res).await["id"].as_str().unwrap().to_string();

    // Client cannot drive the session lifecycle.
    let res = app.request(Method::PUT, &format!("/api/v1/sessions/{}", session_id), Some(&client), Some(json!({"status": "IN_PROGRESS"}))).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = app.request(Method::PUT, &format!("/api/v1/sessions/{}", session_id), Some(&coach), Some(json!({"status": "COMPLETED"}))).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(parse_body(res).await["status"].as_str().unwrap(), "COMPLETED");

    // COMPLETED is terminal.
    let res = app.request(Method::PUT, &format!("/api/v1/sessions/{}", session_id), Some(&coach), Some(json!({"status": "IN_PROGRESS"}))).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = parse_body(res).await;
    assert!(body["error"].as_str().unwrap().contains("COMPLETED"));

    // CANCELLED is not a plain status write either.
    let res = app.request(Method::PUT, &format!("/api/v1/sessions/{}", session_id), Some(&coach), Some(json!({"status": "CANCELLED"}))).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_session_visibility() {
    let app = TestApp::new().await;
    let admin = app.login("admin", ADMIN_PASSWORD).await;
    let (coach_id, _, _, client) = setup(&app, "b8").await;
    app.create_user(&admin, "stranger-b8", "pw-stranger", "CLIENT").await;
    let stranger = app.login("stranger-b8", "pw-stranger").await;
    let date = next_monday();

    let res = app.request(Method::POST, "/api/v1/sessions", Some(&client), Some(json!({
        "coach_id": coach_id, "date": date, "time": "10:00"
    }))).await;
    let session_id = parse_body(res).await["id"].as_str().unwrap().to_string();

    let res = app.request(Method::GET, &format!("/api/v1/sessions/{}", session_id), Some(&stranger), None).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = app.request(Method::GET, &format!("/api/v1/sessions/{}", session_id), Some(&client), None).await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = app.request(Method::GET, "/api/v1/sessions", Some(&client), None).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(parse_body(res).await.as_array().unwrap().len(), 1);
}
