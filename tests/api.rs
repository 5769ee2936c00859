use std::{io::Cursor, sync::Arc};

use asistenti::{app::build_app, nutrition::kcal_split, social::challenges, state::AppState};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use image::{DynamicImage, ImageBuffer, ImageOutputFormat, Rgb};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

async fn send(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Vec<u8>) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    let req = match body {
        Some(v) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec())
}

async fn send_json(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let (status, bytes) = send(app, method, uri, token, body).await;
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn register(app: &Router, username: &str) -> String {
    let (status, body) = send_json(
        app,
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({
            "email": format!("{username}@shembull.al"),
            "username": username,
            "password": "fjalekalim123",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["access_token"].as_str().unwrap().to_string()
}

async fn upload(app: &Router, token: &str, content_type: &str, data: &[u8]) -> (StatusCode, Value) {
    let boundary = "kufiri-i-formes";
    let mut body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"darka.png\"\r\nContent-Type: {content_type}\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/recognition")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
        .body(Body::from(body))
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn green_png() -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(ImageBuffer::from_pixel(16, 16, Rgb([40, 160, 40])))
        .write_to(&mut out, ImageOutputFormat::Png)
        .unwrap();
    out.into_inner()
}

#[tokio::test]
async fn health_is_public() {
    let app = build_app(AppState::fake().await);
    let (status, body) = send(&app, Method::GET, "/api/v1/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");
}

#[tokio::test]
async fn register_login_and_me() {
    let app = build_app(AppState::fake().await);
    register(&app, "arben").await;

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({"email": "ARBEN@shembull.al", "password": "fjalekalim123"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["access_token"].as_str().unwrap().to_string();

    let (status, me) = send_json(&app, Method::GET, "/api/v1/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], "arben");
    assert_eq!(me["profile"]["goal"], "weight-loss");

    let (status, _) = send_json(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({"email": "arben@shembull.al", "password": "gabim12345"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_email_conflicts() {
    let app = build_app(AppState::fake().await);
    register(&app, "drita").await;
    let (status, _) = send_json(
        &app,
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({
            "email": "drita@shembull.al",
            "username": "drita2",
            "password": "fjalekalim123",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn protected_routes_need_a_token() {
    let app = build_app(AppState::fake().await);
    for uri in ["/api/v1/me", "/api/v1/plans", "/api/v1/analytics", "/api/v1/achievements"] {
        let (status, _) = send(&app, Method::GET, uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
    }
    let (status, _) = send(&app, Method::GET, "/api/v1/me", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn generates_and_exports_a_plan() {
    let app = build_app(AppState::fake().await);
    let token = register(&app, "blerina").await;

    let (status, plan) = send_json(
        &app,
        Method::POST,
        "/api/v1/plans",
        Some(&token),
        Some(json!({"total_kcal": 2000, "seed": 7, "use_supplements": true})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(plan["plan"]["days"].as_array().unwrap().len(), 7);
    assert_eq!(plan["objective"]["kcal"], 2000);
    assert!(plan["supplement_nutrition"].is_object());
    assert!(!plan["shopping_list"].as_array().unwrap().is_empty());
    assert_eq!(plan["new_achievements"], json!(["first_week"]));
    let id = plan["id"].as_str().unwrap().to_string();

    let (status, list) = send_json(&app, Method::GET, "/api/v1/plans", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, csv) = send(
        &app,
        Method::GET,
        &format!("/api/v1/plans/{id}/export.csv"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let csv = String::from_utf8(csv).unwrap();
    assert!(csv.starts_with("Dita,Vakti,Receta,kcal,Proteina,Karbo,Yndyrna"));
    assert!(csv.contains("E Hënë"));
}

#[tokio::test]
async fn plan_rejects_out_of_range_kcal() {
    let app = build_app(AppState::fake().await);
    let token = register(&app, "genti").await;
    let (status, _) = send_json(
        &app,
        Method::POST,
        "/api/v1/plans",
        Some(&token),
        Some(json!({"total_kcal": 800})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn plans_are_private() {
    let app = build_app(AppState::fake().await);
    let owner = register(&app, "ilir").await;
    let other = register(&app, "jeta").await;

    let (_, plan) = send_json(&app, Method::POST, "/api/v1/plans", Some(&owner), Some(json!({"seed": 1}))).await;
    let id = plan["id"].as_str().unwrap();

    let (status, _) = send(&app, Method::GET, &format!("/api/v1/plans/{id}"), Some(&other), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn report_needs_a_plan_first() {
    let app = build_app(AppState::fake().await);
    let token = register(&app, "klodi").await;

    let (status, _) = send(&app, Method::POST, "/api/v1/reports", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    send_json(&app, Method::POST, "/api/v1/plans", Some(&token), Some(json!({"seed": 3}))).await;
    let (status, report) = send_json(&app, Method::POST, "/api/v1/reports", Some(&token), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(report["goals_met"]["calories"].is_object());
}

#[tokio::test]
async fn supplement_catalog_is_public() {
    let app = build_app(AppState::fake().await);
    let (status, body) = send_json(&app, Method::GET, "/api/v1/supplements", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body.as_array().unwrap().is_empty());

    let (status, _) = send_json(
        &app,
        Method::GET,
        "/api/v1/supplements/recommendations?goal=muscle-gain&slot=breakfast&target_kcal=600",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn account_deletion_needs_confirmation() {
    let app = build_app(AppState::fake().await);
    let token = register(&app, "mira").await;

    let (status, _) = send(
        &app,
        Method::DELETE,
        "/api/v1/me",
        Some(&token),
        Some(json!({"password": "fjalekalim123", "confirmation": "po"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::DELETE,
        "/api/v1/me",
        Some(&token),
        Some(json!({"password": "fjalekalim123", "confirmation": "FSHI"})),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::GET, "/api/v1/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn deleting_an_account_removes_every_trace() {
    let state = AppState::fake().await;
    let db = state.db.clone();
    let challenge = challenges::ensure_weekly_challenge(&db).await.unwrap().unwrap();
    let app = build_app(state);

    let token = register(&app, "nora").await;
    register(&app, "zana").await;
    let (_, me) = send_json(&app, Method::GET, "/api/v1/me", Some(&token), None).await;
    let user_id: Uuid = me["id"].as_str().unwrap().parse().unwrap();

    let seeded = [
        (Method::POST, "/api/v1/plans".to_string(), Some(json!({"seed": 5}))),
        (Method::POST, "/api/v1/reports".to_string(), None),
        (
            Method::POST,
            "/api/v1/ratings".to_string(),
            Some(json!({"food_item": "byrek", "rating": 5})),
        ),
        (Method::POST, "/api/v1/friends".to_string(), Some(json!({"username": "zana"}))),
        (Method::POST, format!("/api/v1/challenges/{}/join", challenge.id), None),
    ];
    for (method, uri, body) in seeded {
        let (status, _) = send(&app, method, &uri, Some(&token), body).await;
        assert_eq!(status, StatusCode::CREATED, "{uri}");
    }
    let (status, photo) = upload(&app, &token, "image/png", &green_png()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(photo["success"], true);

    let tables = [
        "meal_plans",
        "nutrition_reports",
        "food_ratings",
        "user_achievements",
        "user_challenges",
        "food_recognition_logs",
        "analytics_events",
    ];
    let count = |sql: String| {
        let db = db.clone();
        async move {
            sqlx::query_scalar::<_, i64>(&sql)
                .bind(user_id)
                .fetch_one(&db)
                .await
                .unwrap()
        }
    };
    let rows = |table: &str| format!("SELECT COUNT(*) FROM {table} WHERE user_id = ?1");
    let friendships = || "SELECT COUNT(*) FROM friendships WHERE user_id = ?1 OR friend_id = ?1".to_string();

    for table in tables {
        assert!(count(rows(table)).await > 0, "{table} was not seeded");
    }
    assert!(count(friendships()).await > 0);

    let (status, _) = send(
        &app,
        Method::DELETE,
        "/api/v1/me",
        Some(&token),
        Some(json!({"password": "fjalekalim123", "confirmation": "FSHI"})),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    for table in tables {
        assert_eq!(count(rows(table)).await, 0, "{table} kept rows");
    }
    assert_eq!(count(friendships()).await, 0);
    assert_eq!(
        count("SELECT COUNT(*) FROM users WHERE id = ?1".to_string()).await,
        0
    );
}

#[tokio::test]
async fn upload_limit_follows_configured_image_size() {
    let mut state = AppState::fake().await;
    let mut config = (*state.config).clone();
    config.limits.max_image_size_mb = 30;
    state.config = Arc::new(config);
    let app = build_app(state);
    let token = register(&app, "petrit").await;

    // Past the old fixed 25 MB body cap; not a decodable image, so nothing is logged.
    let big = vec![0u8; 26 * 1024 * 1024];
    let (status, body) = upload(&app, &token, "image/png", &big).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn image_over_configured_limit_is_rejected() {
    let app = build_app(AppState::fake().await);
    let token = register(&app, "rea").await;
    let (status, _) = upload(&app, &token, "image/png", &vec![0u8; 1536 * 1024]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn guest_session_is_short_and_cannot_refresh() {
    let app = build_app(AppState::fake().await);
    let (status, body) = send_json(&app, Method::POST, "/api/v1/auth/guest", None, None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body.get("refresh_token").is_none());
    // Test tokens live five minutes, below the guest cap.
    assert_eq!(body["expires_in"], 300);
    assert!(body["user"]["username"].as_str().unwrap().starts_with("mysafir-"));
    let token = body["access_token"].as_str().unwrap().to_string();

    let (status, me) = send_json(&app, Method::GET, "/api/v1/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["profile"]["age"], 30);

    let (status, _) = send_json(
        &app,
        Method::POST,
        "/api/v1/auth/refresh",
        None,
        Some(json!({"refresh_token": token})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, other) = send_json(&app, Method::POST, "/api/v1/auth/guest", None, None).await;
    assert_ne!(other["user"]["id"], me["id"]);
}

#[tokio::test]
async fn oversized_meal_pattern_uses_default_split() {
    let app = build_app(AppState::fake().await);
    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/v1/nutrition/targets",
        None,
        Some(json!({"profile": {}, "pattern": "4294967295/1/1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let kcal = body["kcal"].as_u64().unwrap() as u32;
    let expected = kcal_split(kcal, "30/40/30");
    assert_eq!(body["split"]["breakfast"], expected.breakfast);
    assert_eq!(body["split"]["lunch"], expected.lunch);
    assert_eq!(body["split"]["dinner"], expected.dinner);
}
