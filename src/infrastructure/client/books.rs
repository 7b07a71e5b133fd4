use anyhow::Result;
use serde::Serialize;

use super::BookshelfClient;
use crate::application::responses::{
    BookListResponse, CreateBookResponse, MessageResponse, UserBooksResponse,
};
use crate::domain::ids::BookId;

#[derive(Debug, Clone, Serialize)]
pub struct NewBookPayload {
    pub title: String,
    pub caption: String,
    pub rating: i64,
    /// Remote URL or `data:` URI.
    pub image: String,
}

pub struct BooksClient<'a> {
    client: &'a BookshelfClient,
}

impl<'a> BooksClient<'a> {
    pub fn new(client: &'a BookshelfClient) -> Self {
        Self { client }
    }

    pub async fn create(&self, payload: &NewBookPayload) -> Result<CreateBookResponse> {
        let url = self.client.endpoint("api/books")?;
        let response = self
            .client
            .request(reqwest::Method::POST, url)
            .json(payload)
            .send()
            .await?;
        self.client.handle_response(response).await
    }

    pub async fn list(&self, page: Option<u32>, limit: Option<u32>) -> Result<BookListResponse> {
        let mut url = self.client.endpoint("api/books")?;
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(page) = page {
                pairs.append_pair("page", &page.to_string());
            }
            if let Some(limit) = limit {
                pairs.append_pair("limit", &limit.to_string());
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }
        let response = self
            .client
            .request(reqwest::Method::GET, url)
            .send()
            .await?;
        self.client.handle_response(response).await
    }

    pub async fn mine(&self) -> Result<UserBooksResponse> {
        let url = self.client.endpoint("api/books/user")?;
        let response = self
            .client
            .request(reqwest::Method::GET, url)
            .send()
            .await?;
        self.client.handle_response(response).await
    }

    pub async fn delete(&self, id: BookId) -> Result<MessageResponse> {
        let url = self.client.endpoint(&format!("api/books/{id}"))?;
        let response = self
            .client
            .request(reqwest::Method::DELETE, url)
            .send()
            .await?;
        self.client.handle_response(response).await
    }
}
