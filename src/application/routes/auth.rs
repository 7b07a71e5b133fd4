use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{info, warn};

use crate::application::errors::{ApiError, AppError};
use crate::application::rate_limit::RateLimitLayer;
use crate::application::responses::AuthResponse;
use crate::application::routes::support::{json_body, non_blank};
use crate::application::state::AppState;
use crate::domain::users::{
    EMAIL_TAKEN, MIN_PASSWORD_LENGTH, MIN_USERNAME_LENGTH, NewUser, PlainPassword, USERNAME_TAKEN,
    User,
};

const INTERNAL_ERROR: &str = "Internal server error";
const FIELDS_REQUIRED: &str = "All fields are required";
const INVALID_CREDENTIALS: &str = "Invalid email or password";
const TOKEN_FAILED: &str = "Error generating token";

pub fn router(requests_per_minute: u32) -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .layer(RateLimitLayer::per_minute(requests_per_minute))
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

#[tracing::instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    register_user(&state, payload)
        .await
        .map(|body| (StatusCode::CREATED, Json(body)))
        .map_err(|err| err.into_api_error(INTERNAL_ERROR))
}

#[tracing::instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    login_user(&state, payload)
        .await
        .map(Json)
        .map_err(|err| err.into_api_error(INTERNAL_ERROR))
}

async fn register_user(
    state: &AppState,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<AuthResponse, AppError> {
    let request = json_body(payload, FIELDS_REQUIRED)?;
    let (Some(email), Some(username), Some(password)) = (
        non_blank(request.email),
        non_blank(request.username),
        request.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::validation(FIELDS_REQUIRED));
    };

    let password = PlainPassword::new(password);
    if password.char_count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
        )));
    }
    if username.chars().count() < MIN_USERNAME_LENGTH {
        return Err(AppError::validation(format!(
            "Username must be at least {MIN_USERNAME_LENGTH} characters long"
        )));
    }

    if state.user_repo.find_by_email(&email).await?.is_some() {
        return Err(AppError::validation(EMAIL_TAKEN));
    }
    if state.user_repo.find_by_username(&username).await?.is_some() {
        return Err(AppError::validation(USERNAME_TAKEN));
    }

    let user = state
        .user_repo
        .insert(NewUser::new(email, username, password))
        .await?;
    info!(user_id = %user.id, username = %user.username, "user registered");

    issue_token(state, &user)
}

async fn login_user(
    state: &AppState,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<AuthResponse, AppError> {
    let request = json_body(payload, FIELDS_REQUIRED)?;
    let (Some(email), Some(password)) = (
        non_blank(request.email),
        request.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::validation(FIELDS_REQUIRED));
    };

    let Some(user) = state
        .user_repo
        .verify_credentials(&email, &PlainPassword::new(password))
        .await?
    else {
        warn!("login with invalid credentials");
        return Err(AppError::unauthenticated(INVALID_CREDENTIALS));
    };

    info!(user_id = %user.id, "user logged in");
    issue_token(state, &user)
}

fn issue_token(state: &AppState, user: &User) -> Result<AuthResponse, AppError> {
    let token = state
        .tokens
        .sign(user.id)
        .map_err(|err| AppError::upstream(TOKEN_FAILED, err))?;

    Ok(AuthResponse {
        token,
        user: user.summary(),
    })
}
