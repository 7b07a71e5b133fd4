use axum::extract::{FromRequestParts, Request, State};
use axum::http::{HeaderMap, header, request::Parts};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::{Span, warn};

use crate::application::errors::{ApiError, ErrorCode};
use crate::application::state::AppState;
use crate::domain::users::User;

pub const MISSING_TOKEN: &str = "No access token, access denied";
pub const INVALID_TOKEN: &str = "Unauthorized";

/// The caller resolved from a verified bearer token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl AuthenticatedUser {
    pub fn user(&self) -> &User {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Set by `require_auth` on protected routers.
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>() {
            return Ok(user.clone());
        }

        authenticate(state, &parts.headers).await
    }
}

/// Middleware for protected routers: rejects the request or attaches the caller.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(&state, request.headers()).await {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(rejection) => rejection.into_response(),
    }
}

async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<AuthenticatedUser, ApiError> {
    let token = bearer_token(headers).ok_or_else(|| {
        warn!("request without access token");
        ApiError::new(ErrorCode::Unauthenticated, MISSING_TOKEN)
    })?;

    let unauthorized = || ApiError::new(ErrorCode::Unauthenticated, INVALID_TOKEN);

    let claims = state.tokens.verify(token).map_err(|err| {
        warn!(error = %err, "bearer token rejected");
        unauthorized()
    })?;
    let user_id = claims.user_id().map_err(|err| {
        warn!(error = %err, "bearer token carries malformed user id");
        unauthorized()
    })?;

    let user = state.user_repo.get(user_id).await.map_err(|err| {
        warn!(error = %err, %user_id, "user lookup failed for valid token");
        unauthorized()
    })?;

    Span::current().record("user.id", tracing::field::display(&user.id));
    Ok(AuthenticatedUser(user))
}

/// Extracts the token from `Authorization`. The `Bearer ` prefix is optional; an
/// empty token counts as absent.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim();
    let token = match value.strip_prefix("Bearer") {
        Some(rest) if rest.is_empty() || rest.starts_with(' ') => rest.trim(),
        _ => value,
    };
    (!token.is_empty()).then_some(token)
}
