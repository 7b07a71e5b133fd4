use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get};
use axum::{Json, Router, middleware};
use serde::Deserialize;
use tower_http::limit::RequestBodyLimitLayer;

use crate::application::auth::{AuthenticatedUser, require_auth};
use crate::application::errors::{ApiError, AppError};
use crate::application::responses::{
    BookListResponse, CreateBookResponse, MessageResponse, UserBooksResponse,
};
use crate::application::routes::support::{PageQuery, json_body, non_blank, number_or_string};
use crate::application::services::{BOOK_NOT_FOUND, CreateBook};
use crate::application::state::AppState;
use crate::domain::books::{MAX_RATING, MIN_RATING, rating_in_range};
use crate::domain::ids::BookId;

const INTERNAL_ERROR: &str = "Server error";
const FIELDS_REQUIRED: &str = "Please provide all fields";

/// Book payloads carry base64 images, so they get a larger body allowance.
pub const BOOK_BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/user", get(list_mine))
        .route("/{id}", delete(remove))
        .route_layer(middleware::from_fn_with_state(state, require_auth))
        .layer(DefaultBodyLimit::max(BOOK_BODY_LIMIT_BYTES))
        .layer(RequestBodyLimitLayer::new(BOOK_BODY_LIMIT_BYTES))
}

#[derive(Deserialize)]
pub struct CreateBookRequest {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    caption: Option<String>,
    #[serde(default, deserialize_with = "number_or_string")]
    rating: Option<i64>,
    #[serde(default)]
    image: Option<String>,
}

impl CreateBookRequest {
    fn validate(self) -> Result<CreateBook, AppError> {
        let (Some(title), Some(caption), Some(rating), Some(image)) = (
            non_blank(self.title),
            non_blank(self.caption),
            self.rating.filter(|r| *r != 0),
            non_blank(self.image),
        ) else {
            return Err(AppError::validation(FIELDS_REQUIRED));
        };

        if !rating_in_range(rating) {
            return Err(AppError::validation(format!(
                "Rating must be between {MIN_RATING} and {MAX_RATING}"
            )));
        }

        Ok(CreateBook {
            title,
            caption,
            rating,
            image,
        })
    }
}

#[tracing::instrument(skip_all, fields(user.id = %auth.user().id))]
pub async fn create(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    payload: Result<Json<CreateBookRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateBookResponse>), ApiError> {
    let result = async {
        let input = json_body(payload, FIELDS_REQUIRED)?.validate()?;
        state.book_service.create(input, auth.user().id).await
    }
    .await;

    result
        .map(|book| {
            (
                StatusCode::CREATED,
                Json(CreateBookResponse {
                    message: "Book created successfully".to_string(),
                    book,
                }),
            )
        })
        .map_err(|err| err.into_api_error(INTERNAL_ERROR))
}

#[tracing::instrument(skip_all, fields(user.id = %auth.user().id))]
pub async fn list(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<BookListResponse>, ApiError> {
    let page = state
        .book_repo
        .list(query.into_request())
        .await
        .map_err(|err| AppError::from(err).into_api_error(INTERNAL_ERROR))?;

    Ok(Json(BookListResponse::from_page(
        "Books fetched successfully",
        page,
    )))
}

#[tracing::instrument(skip_all, fields(user.id = %auth.user().id))]
pub async fn list_mine(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<UserBooksResponse>, ApiError> {
    let books = state
        .book_repo
        .list_by_owner(auth.user().id)
        .await
        .map_err(|err| AppError::from(err).into_api_error(INTERNAL_ERROR))?;

    Ok(Json(UserBooksResponse {
        message: "Recommended books fetched successfully".to_string(),
        books,
    }))
}

#[tracing::instrument(skip_all, fields(user.id = %auth.user().id, book.id = %id))]
pub async fn remove(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let result = match id.parse::<BookId>() {
        Ok(book_id) => state.book_service.delete(book_id, auth.user().id).await,
        Err(_) => Err(AppError::not_found(BOOK_NOT_FOUND)),
    };

    result
        .map(|()| Json(MessageResponse::new("Book deleted successfully")))
        .map_err(|err| err.into_api_error(INTERNAL_ERROR))
}
