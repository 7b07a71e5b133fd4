use std::sync::Arc;
use std::time::Duration;

use bookshelf::application::routes::app_router;
use bookshelf::application::state::{AppState, AppStateConfig};
use bookshelf::domain::repositories::{BookRepository, UserRepository};
use bookshelf::infrastructure::database::Database;
use bookshelf::infrastructure::media::{CloudinaryConfig, CloudinaryMediaStore};
use bookshelf::infrastructure::tokens::TokenService;
use reqwest::Client;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::AbortHandle;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_SECRET: &str = "integration-test-secret";
pub const TEST_PASSWORD: &str = "password123";
pub const CLOUD_NAME: &str = "demo";
pub const HOSTED_IMAGE_URL: &str =
    "https://res.cloudinary.com/demo/image/upload/v1712/books/cover123.png";
pub const TINY_PNG: &str = "data:image/png;base64,iVBORw0KGgo=";

pub struct TestApp {
    pub address: String,
    pub user_repo: Arc<dyn UserRepository>,
    pub book_repo: Arc<dyn BookRepository>,
    pub cloudinary: MockServer,
    pub client: Client,
    server_handle: AbortHandle,
}

impl TestApp {
    pub fn api_url(&self, path: &str) -> String {
        format!("{}/api{}", self.address, path)
    }

    pub fn upload_path() -> String {
        format!("/{CLOUD_NAME}/image/upload")
    }

    pub fn destroy_path() -> String {
        format!("/{CLOUD_NAME}/image/destroy")
    }

    /// Answers every upload with [`HOSTED_IMAGE_URL`].
    pub async fn mount_upload(&self) {
        Mock::given(method("POST"))
            .and(path(Self::upload_path()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "secure_url": HOSTED_IMAGE_URL,
                "public_id": "books/cover123",
            })))
            .mount(&self.cloudinary)
            .await;
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.server_handle.abort();
    }
}

pub struct TestOptions {
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub auth_requests_per_minute: u32,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            jwt_secret: TEST_SECRET.to_string(),
            token_ttl: Duration::from_secs(3_600),
            auth_requests_per_minute: 1_000,
        }
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(TestOptions::default()).await
}

pub async fn spawn_app_with(options: TestOptions) -> TestApp {
    let database = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");
    let cloudinary = MockServer::start().await;

    let media = CloudinaryMediaStore::new(
        CloudinaryConfig {
            cloud_name: CLOUD_NAME.to_string(),
            api_key: "test-key".to_string(),
            api_secret: "test-secret".to_string(),
            api_url: cloudinary.uri(),
        },
        Client::new(),
    );

    let state = AppState::from_database(
        &database,
        AppStateConfig {
            media: Arc::new(media),
            tokens: TokenService::new(options.jwt_secret, options.token_ttl),
            auth_requests_per_minute: options.auth_requests_per_minute,
        },
    );

    let user_repo = state.user_repo.clone();
    let book_repo = state.book_repo.clone();

    let app = app_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let local_addr = listener.local_addr().expect("Failed to get local address");
    let address = format!("http://{local_addr}");

    let server_handle = tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
        )
        .await
        .expect("Server failed to start");
    })
    .abort_handle();

    TestApp {
        address,
        user_repo,
        book_repo,
        cloudinary,
        client: Client::new(),
        server_handle,
    }
}

/// Registers `username` (email `<username>@example.com`) and returns the response body.
pub async fn register(app: &TestApp, username: &str) -> Value {
    let response = app
        .client
        .post(app.api_url("/auth/register"))
        .json(&json!({
            "email": format!("{username}@example.com"),
            "username": username,
            "password": TEST_PASSWORD,
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201, "registration should succeed");
    response.json().await.expect("register body")
}

/// Registers `username` and returns its bearer token.
pub async fn token_for(app: &TestApp, username: &str) -> String {
    register(app, username).await["token"]
        .as_str()
        .expect("token in response")
        .to_string()
}

pub async fn create_book(app: &TestApp, token: &str, title: &str) -> Value {
    let response = app
        .client
        .post(app.api_url("/books"))
        .bearer_auth(token)
        .json(&json!({
            "title": title,
            "caption": format!("Why {title} matters"),
            "rating": 4,
            "image": TINY_PNG,
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201, "book creation should succeed");
    response.json::<Value>().await.expect("create body")["book"].clone()
}
