use std::time::Duration;

use bookshelf::domain::ids::UserId;
use bookshelf::infrastructure::tokens::TokenClaims;
use bookshelf::infrastructure::tokens::TokenService;
use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use reqwest::StatusCode;
use serde_json::{Value, json};

use crate::helpers::{TEST_PASSWORD, TEST_SECRET, TestOptions, spawn_app, spawn_app_with, token_for};

async fn get_books(app: &crate::helpers::TestApp, authorization: Option<&str>) -> (StatusCode, Value) {
    let mut request = app.client.get(app.api_url("/books/user"));
    if let Some(value) = authorization {
        request = request.header("Authorization", value);
    }
    let response = request.send().await.expect("Failed to send request");
    let status = response.status();
    (status, response.json().await.expect("json body"))
}

#[tokio::test]
async fn missing_token_is_rejected() {
    let app = spawn_app().await;

    let (status, body) = get_books(&app, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "No access token, access denied");
    assert_eq!(body["code"], "unauthenticated");

    let (status, body) = get_books(&app, Some("Bearer ")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "No access token, access denied");
}

#[tokio::test]
async fn invalid_token_is_rejected() {
    let app = spawn_app().await;

    let (status, body) = get_books(&app, Some("Bearer not-a-token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Unauthorized");
}

#[tokio::test]
async fn bare_token_without_scheme_is_accepted() {
    let app = spawn_app().await;
    let token = token_for(&app, "reader").await;

    let (status, body) = get_books(&app, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["books"], json!([]));
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let app = spawn_app().await;
    token_for(&app, "reader").await;

    let now = Utc::now().timestamp();
    let claims = TokenClaims {
        id: "1".to_string(),
        iat: now - 7_200,
        exp: now - 3_600,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap();

    let (status, body) = get_books(&app, Some(&format!("Bearer {token}"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Unauthorized");
}

#[tokio::test]
async fn token_for_unknown_user_is_rejected() {
    let app = spawn_app().await;
    let token = TokenService::new(TEST_SECRET, Duration::from_secs(60))
        .sign(UserId::new(4_242))
        .unwrap();

    let (status, body) = get_books(&app, Some(&format!("Bearer {token}"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Unauthorized");
}

#[tokio::test]
async fn auth_routes_are_rate_limited() {
    let app = spawn_app_with(TestOptions {
        auth_requests_per_minute: 2,
        ..TestOptions::default()
    })
    .await;

    let attempt = || {
        app.client
            .post(app.api_url("/auth/login"))
            .json(&json!({"email": "nobody@example.com", "password": TEST_PASSWORD}))
            .send()
    };

    assert_eq!(attempt().await.unwrap().status(), StatusCode::UNAUTHORIZED);
    assert_eq!(attempt().await.unwrap().status(), StatusCode::UNAUTHORIZED);

    let limited = attempt().await.unwrap();
    assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(limited.headers().contains_key("retry-after"));
    let body: Value = limited.json().await.unwrap();
    assert_eq!(body["message"], "Too many requests");
    assert_eq!(body["code"], "rate_limited");
}

#[tokio::test]
async fn responses_carry_nosniff_header() {
    let app = spawn_app().await;

    let response = app.client.get(app.api_url("/books")).send().await.unwrap();
    assert_eq!(
        response.headers()["x-content-type-options"],
        "nosniff"
    );
}

#[tokio::test]
async fn unknown_route_is_json_not_found() {
    let app = spawn_app().await;

    let response = app.client.get(app.api_url("/nope")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn oversized_book_body_is_json_payload_too_large() {
    let app = spawn_app().await;
    let token = token_for(&app, "reader").await;
    let image = format!("data:image/png;base64,{}", "A".repeat(11 * 1024 * 1024));

    let response = app
        .client
        .post(app.api_url("/books"))
        .bearer_auth(&token)
        .json(&json!({
            "title": "Dune",
            "caption": "Spice",
            "rating": 5,
            "image": image,
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response.headers()["content-type"], "application/json");
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Payload too large");
    assert_eq!(body["code"], "payload_too_large");
}

#[tokio::test]
async fn wrong_method_is_json_method_not_allowed() {
    let app = spawn_app().await;
    let token = token_for(&app, "reader").await;

    let response = app
        .client
        .put(app.api_url("/books/1"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert!(response.headers().contains_key("allow"));
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Method not allowed");
    assert_eq!(body["code"], "method_not_allowed");
}
