use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ids::UserId;

pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MIN_PASSWORD_LENGTH: usize = 6;

pub const EMAIL_TAKEN: &str = "Email already exists";
pub const USERNAME_TAKEN: &str = "Username already exists";

const AVATAR_BASE_URL: &str = "https://api.dicebear.com/9.x/personas/svg";

/// A registered user. The password hash never leaves the repository layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub username: String,
    pub profile_image: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            email: self.email.clone(),
            username: self.username.clone(),
            profile_image: self.profile_image.clone(),
        }
    }
}

/// The user shape returned alongside a freshly issued token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: UserId,
    pub email: String,
    pub username: String,
    pub profile_image: String,
}

/// Public owner details embedded in book listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerSummary {
    pub username: String,
    pub profile_image: String,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password: PlainPassword,
    pub profile_image: String,
}

impl NewUser {
    /// Builds a user with the generated avatar for `username`.
    pub fn new(email: String, username: String, password: PlainPassword) -> Self {
        let profile_image = avatar_url(&username);
        Self {
            email,
            username,
            password,
            profile_image,
        }
    }
}

/// A clear text password on its way to being hashed. `Debug` is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct PlainPassword(String);

impl PlainPassword {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }
}

impl fmt::Debug for PlainPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PlainPassword([REDACTED])")
    }
}

/// Deterministic avatar URL seeded by the username.
pub fn avatar_url(username: &str) -> String {
    match url::Url::parse_with_params(AVATAR_BASE_URL, &[("seed", username)]) {
        Ok(url) => url.to_string(),
        Err(_) => format!("{AVATAR_BASE_URL}?seed={username}"),
    }
}
