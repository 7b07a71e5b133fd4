use bookshelf::domain::books::NewBook;
use bookshelf::domain::ids::UserId;
use bookshelf::domain::repositories::BookRepository;
use chrono::{Duration, Utc};
use reqwest::StatusCode;
use serde_json::Value;

use crate::helpers::{TestApp, register, spawn_app};

/// Registers a user and inserts `count` books, oldest first, one minute apart.
async fn seed_books(app: &TestApp, count: i64) -> String {
    let registered = register(app, "reader").await;
    let owner = UserId::new(registered["user"]["id"].as_i64().unwrap());
    let start = Utc::now() - Duration::hours(1);

    for n in 0..count {
        app.book_repo
            .insert(NewBook {
                title: format!("Book {n:02}"),
                caption: "caption".to_string(),
                rating: 1 + n % 5,
                image: format!("https://images.example.com/{n}.png"),
                user: owner,
                created_at: Some(start + Duration::minutes(n)),
            })
            .await
            .unwrap();
    }

    registered["token"].as_str().unwrap().to_string()
}

async fn list(app: &TestApp, token: &str, query: &str) -> Value {
    let response = app
        .client
        .get(format!("{}{query}", app.api_url("/books")))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    response.json().await.expect("json body")
}

fn titles(body: &Value) -> Vec<String> {
    body["books"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["title"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn twelve_books_split_into_three_pages_of_five() {
    let app = spawn_app().await;
    let token = seed_books(&app, 12).await;

    let first = list(&app, &token, "?page=1&limit=5").await;
    assert_eq!(first["currentPage"], 1);
    assert_eq!(first["totalBooks"], 12);
    assert_eq!(first["totalPages"], 3);
    assert_eq!(
        titles(&first),
        vec!["Book 11", "Book 10", "Book 09", "Book 08", "Book 07"]
    );

    let last = list(&app, &token, "?page=3&limit=5").await;
    assert_eq!(last["currentPage"], 3);
    assert_eq!(titles(&last), vec!["Book 01", "Book 00"]);
}

#[tokio::test]
async fn page_past_the_end_is_empty() {
    let app = spawn_app().await;
    let token = seed_books(&app, 3).await;

    let body = list(&app, &token, "?page=7&limit=5").await;
    assert!(titles(&body).is_empty());
    assert_eq!(body["currentPage"], 7);
    assert_eq!(body["totalBooks"], 3);
    assert_eq!(body["totalPages"], 1);
}

#[tokio::test]
async fn defaults_apply_to_missing_or_invalid_parameters() {
    let app = spawn_app().await;
    let token = seed_books(&app, 7).await;

    let body = list(&app, &token, "").await;
    assert_eq!(body["currentPage"], 1);
    assert_eq!(titles(&body).len(), 5);
    assert_eq!(body["totalPages"], 2);

    let body = list(&app, &token, "?page=abc&limit=-2").await;
    assert_eq!(body["currentPage"], 1);
    assert_eq!(titles(&body).len(), 5);

    let body = list(&app, &token, "?page=0&limit=0").await;
    assert_eq!(body["currentPage"], 1);
    assert_eq!(titles(&body).len(), 5);
}

#[tokio::test]
async fn limit_is_capped() {
    let app = spawn_app().await;
    let token = seed_books(&app, 7).await;

    let body = list(&app, &token, "?limit=10000").await;
    assert_eq!(titles(&body).len(), 7);
    assert_eq!(body["totalPages"], 1);
}

#[tokio::test]
async fn empty_shelf_has_zero_pages() {
    let app = spawn_app().await;
    let token = seed_books(&app, 0).await;

    let body = list(&app, &token, "").await;
    assert_eq!(body["totalBooks"], 0);
    assert_eq!(body["totalPages"], 0);
    assert!(titles(&body).is_empty());
}
