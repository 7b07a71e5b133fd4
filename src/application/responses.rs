use serde::{Deserialize, Serialize};

use crate::domain::books::{Book, BookWithOwner};
use crate::domain::listing::Page;
use crate::domain::users::UserSummary;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookResponse {
    pub message: String,
    pub book: Book,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookListResponse {
    pub message: String,
    pub books: Vec<BookWithOwner>,
    pub current_page: u32,
    pub total_books: u64,
    pub total_pages: u64,
}

impl BookListResponse {
    pub fn from_page(message: impl Into<String>, page: Page<BookWithOwner>) -> Self {
        let total_pages = page.total_pages();
        Self {
            message: message.into(),
            current_page: page.page,
            total_books: page.total,
            total_pages,
            books: page.items,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserBooksResponse {
    pub message: String,
    pub books: Vec<Book>,
}
