use anyhow::Result;
use serde::Serialize;

use super::BookshelfClient;
use crate::application::responses::AuthResponse;

#[derive(Debug, Clone, Serialize)]
pub struct RegisterPayload {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

pub struct AuthClient<'a> {
    client: &'a BookshelfClient,
}

impl<'a> AuthClient<'a> {
    pub fn new(client: &'a BookshelfClient) -> Self {
        Self { client }
    }

    pub async fn register(&self, payload: &RegisterPayload) -> Result<AuthResponse> {
        self.post("api/auth/register", payload).await
    }

    pub async fn login(&self, payload: &LoginPayload) -> Result<AuthResponse> {
        self.post("api/auth/login", payload).await
    }

    async fn post<P: Serialize>(&self, path: &str, payload: &P) -> Result<AuthResponse> {
        let url = self.client.endpoint(path)?;
        let response = self
            .client
            .request(reqwest::Method::POST, url)
            .json(payload)
            .send()
            .await?;
        self.client.handle_response(response).await
    }
}
