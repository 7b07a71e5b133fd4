use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ids::{BookId, UserId};
use crate::domain::users::OwnerSummary;

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub caption: String,
    pub rating: i64,
    pub image: String,
    /// Owner of the recommendation.
    pub user: UserId,
    pub created_at: DateTime<Utc>,
}

/// A book as shown in the shared feed, with its owner resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookWithOwner {
    pub id: BookId,
    pub title: String,
    pub caption: String,
    pub rating: i64,
    pub image: String,
    pub user: OwnerSummary,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewBook {
    pub title: String,
    pub caption: String,
    pub rating: i64,
    pub image: String,
    pub user: UserId,
    pub created_at: Option<DateTime<Utc>>,
}

impl Book {
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user == user_id
    }
}

pub const fn rating_in_range(rating: i64) -> bool {
    rating >= MIN_RATING && rating <= MAX_RATING
}
