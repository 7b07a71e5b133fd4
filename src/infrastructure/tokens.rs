use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::ids::UserId;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token signing secret is not configured")]
    MissingSecret,
    #[error("token lifetime is out of range")]
    InvalidLifetime,
    #[error("failed to sign token: {0}")]
    Signing(String),
    #[error("invalid token")]
    InvalidToken,
}

/// JWT claims. `id` is the user id rendered as a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub id: String,
    pub iat: i64,
    pub exp: i64,
}

impl TokenClaims {
    pub fn user_id(&self) -> Result<UserId, TokenError> {
        self.id.parse().map_err(|_| TokenError::InvalidToken)
    }
}

/// Issues and checks HS256 bearer tokens.
pub struct TokenService {
    secret: Vec<u8>,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: impl Into<Vec<u8>>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
        }
    }

    pub fn sign(&self, user_id: UserId) -> Result<String, TokenError> {
        self.sign_at(user_id, Utc::now())
    }

    pub fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        if self.secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        decode::<TokenClaims>(token, &DecodingKey::from_secret(&self.secret), &validation)
            .map(|data| data.claims)
            .map_err(|_| TokenError::InvalidToken)
    }

    fn sign_at(&self, user_id: UserId, issued_at: DateTime<Utc>) -> Result<String, TokenError> {
        if self.secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }

        let ttl = chrono::Duration::from_std(self.ttl).map_err(|_| TokenError::InvalidLifetime)?;
        let expires_at = issued_at
            .checked_add_signed(ttl)
            .ok_or(TokenError::InvalidLifetime)?;

        let claims = TokenClaims {
            id: user_id.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.secret),
        )
        .map_err(|err| TokenError::Signing(err.to_string()))
    }
}
