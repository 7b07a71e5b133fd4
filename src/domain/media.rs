use async_trait::async_trait;
use thiserror::Error;

/// Folder that book cover uploads are stored under.
pub const BOOK_IMAGE_FOLDER: &str = "books";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub url: String,
    pub public_id: String,
}

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("media request failed: {0}")]
    Request(String),
    #[error("media service rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("unexpected media service response: {0}")]
    InvalidResponse(String),
}

/// An external image host.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Upload a data URI or remote URL into `folder`.
    async fn upload(&self, payload: &str, folder: &str) -> Result<UploadedImage, MediaError>;
    async fn destroy(&self, public_id: &str) -> Result<(), MediaError>;
    /// Whether `url` points at an asset this store hosts.
    fn is_hosted(&self, url: &str) -> bool;
}

/// Derives the public id of a hosted asset from its delivery URL: the last path
/// segment without its extension, prefixed by `folder`.
pub fn public_id_from_url(image_url: &str, folder: &str) -> Option<String> {
    let path = match url::Url::parse(image_url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => image_url.split(['?', '#']).next().unwrap_or_default().to_string(),
    };

    let segment = path.rsplit('/').find(|s| !s.is_empty())?;
    let name = segment.split('.').next().unwrap_or(segment);
    if name.is_empty() {
        return None;
    }

    if folder.is_empty() {
        Some(name.to_string())
    } else {
        Some(format!("{folder}/{name}"))
    }
}
