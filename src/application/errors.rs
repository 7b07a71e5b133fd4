use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use crate::domain::RepositoryError;

/// Machine-readable error kinds carried in every error body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Validation,
    Unauthenticated,
    NotFound,
    UpstreamFailure,
    Internal,
    RateLimited,
    MethodNotAllowed,
    PayloadTooLarge,
}

impl ErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation_error",
            Self::Unauthenticated => "unauthenticated",
            Self::NotFound => "not_found",
            Self::UpstreamFailure => "upstream_failure",
            Self::Internal => "internal_error",
            Self::RateLimited => "rate_limited",
            Self::MethodNotAllowed => "method_not_allowed",
            Self::PayloadTooLarge => "payload_too_large",
        }
    }

    pub const fn status(self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::UpstreamFailure | Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }
}

/// Failures raised by handlers and services before they are rendered.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unauthenticated(String),
    #[error("{0}")]
    NotFound(String),
    /// A collaborator failed; `message` is shown to the client, `detail` is only logged.
    #[error("{message}: {detail}")]
    Upstream {
        message: &'static str,
        detail: String,
    },
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn upstream(message: &'static str, detail: impl ToString) -> Self {
        Self::Upstream {
            message,
            detail: detail.to_string(),
        }
    }

    pub fn internal(detail: impl ToString) -> Self {
        Self::Internal(detail.to_string())
    }

    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) => ErrorCode::Validation,
            Self::Unauthenticated(_) => ErrorCode::Unauthenticated,
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::Upstream { .. } => ErrorCode::UpstreamFailure,
            Self::Internal(_) => ErrorCode::Internal,
        }
    }

    /// Renders the error for clients. Internal errors are logged and answered with
    /// `internal_message` so their detail never leaves the process.
    pub fn into_api_error(self, internal_message: &str) -> ApiError {
        let code = self.code();
        match self {
            Self::Validation(message) | Self::Unauthenticated(message) | Self::NotFound(message) => {
                ApiError::new(code, message)
            }
            Self::Upstream { message, detail } => {
                error!(error = %detail, "{message}");
                ApiError::new(code, message)
            }
            Self::Internal(detail) => {
                error!(error = %detail, "request failed");
                ApiError::new(code, internal_message)
            }
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::not_found("Not found"),
            RepositoryError::Conflict(message) => Self::Validation(message),
            RepositoryError::Unexpected(detail) => Self::Internal(detail),
        }
    }
}

/// A rendered error: status, code and public message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    code: ErrorCode,
    message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn rate_limited() -> Self {
        Self::new(ErrorCode::RateLimited, "Too many requests")
    }

    pub const fn status(&self) -> StatusCode {
        self.code.status()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            message: self.message,
            code: Some(self.code.as_str().to_string()),
        };
        (self.code.status(), Json(body)).into_response()
    }
}

/// Wire shape of every error body. `code` is optional so older servers still parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}
