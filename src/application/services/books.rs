use std::sync::Arc;

use tracing::{info, warn};

use crate::application::errors::AppError;
use crate::domain::RepositoryError;
use crate::domain::books::{Book, NewBook};
use crate::domain::ids::{BookId, UserId};
use crate::domain::media::{BOOK_IMAGE_FOLDER, MediaStore, public_id_from_url};
use crate::domain::repositories::BookRepository;

pub const BOOK_NOT_FOUND: &str = "Book not found";
pub const NOT_OWNER: &str = "Unauthorized";
pub const IMAGE_DELETE_FAILED: &str = "Error deleting image from Cloudinary";

/// A validated book submission; `image` is still the client payload.
#[derive(Debug, Clone)]
pub struct CreateBook {
    pub title: String,
    pub caption: String,
    pub rating: i64,
    pub image: String,
}

#[derive(Clone)]
pub struct BookService {
    books: Arc<dyn BookRepository>,
    media: Arc<dyn MediaStore>,
}

impl BookService {
    pub fn new(books: Arc<dyn BookRepository>, media: Arc<dyn MediaStore>) -> Self {
        Self { books, media }
    }

    /// Uploads the image, then persists the book with the hosted URL.
    pub async fn create(&self, input: CreateBook, owner: UserId) -> Result<Book, AppError> {
        let uploaded = self
            .media
            .upload(&input.image, BOOK_IMAGE_FOLDER)
            .await
            .map_err(AppError::internal)?;

        let new_book = NewBook {
            title: input.title,
            caption: input.caption,
            rating: input.rating,
            image: uploaded.url,
            user: owner,
            created_at: None,
        };

        match self.books.insert(new_book).await {
            Ok(book) => {
                info!(book_id = %book.id, user_id = %owner, "book created");
                Ok(book)
            }
            Err(err) => {
                if let Err(cleanup) = self.media.destroy(&uploaded.public_id).await {
                    warn!(
                        error = %cleanup,
                        public_id = %uploaded.public_id,
                        "failed to remove orphaned upload"
                    );
                }
                Err(AppError::internal(err))
            }
        }
    }

    /// Deletes a book owned by `caller`. A hosted image is destroyed first and
    /// the record is kept when that fails.
    pub async fn delete(&self, id: BookId, caller: UserId) -> Result<(), AppError> {
        let book = self.books.get(id).await.map_err(not_found_as_book)?;

        if !book.is_owned_by(caller) {
            warn!(book_id = %id, user_id = %caller, "delete attempted by non-owner");
            return Err(AppError::unauthenticated(NOT_OWNER));
        }

        if self.media.is_hosted(&book.image) {
            let public_id = public_id_from_url(&book.image, BOOK_IMAGE_FOLDER).ok_or_else(|| {
                AppError::upstream(IMAGE_DELETE_FAILED, format!("no public id in {}", book.image))
            })?;
            self.media
                .destroy(&public_id)
                .await
                .map_err(|err| AppError::upstream(IMAGE_DELETE_FAILED, err))?;
        }

        self.books.delete(id).await.map_err(not_found_as_book)?;
        info!(book_id = %id, user_id = %caller, "book deleted");
        Ok(())
    }
}

fn not_found_as_book(err: RepositoryError) -> AppError {
    match err {
        RepositoryError::NotFound => AppError::not_found(BOOK_NOT_FOUND),
        other => other.into(),
    }
}
