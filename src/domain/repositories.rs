use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::books::{Book, BookWithOwner, NewBook};
use crate::domain::ids::{BookId, UserId};
use crate::domain::listing::{Page, PageRequest};
use crate::domain::users::{NewUser, PlainPassword, User};

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persists a new user, hashing the password on the way in.
    ///
    /// Uniqueness violations surface as [`RepositoryError::Conflict`] carrying the
    /// client-facing message ("Email already exists" / "Username already exists").
    async fn insert(&self, user: NewUser) -> Result<User, RepositoryError>;
    async fn get(&self, id: UserId) -> Result<User, RepositoryError>;
    async fn get_by_email(&self, email: &str) -> Result<User, RepositoryError>;
    async fn get_by_username(&self, username: &str) -> Result<User, RepositoryError>;
    /// The user registered under `email` if `candidate` matches their password.
    /// Unknown emails cost one hash verification too, so both failures look alike.
    async fn verify_credentials(
        &self,
        email: &str,
        candidate: &PlainPassword,
    ) -> Result<Option<User>, RepositoryError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        match self.get_by_email(email).await {
            Ok(user) => Ok(Some(user)),
            Err(RepositoryError::NotFound) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        match self.get_by_username(username).await {
            Ok(user) => Ok(Some(user)),
            Err(RepositoryError::NotFound) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Fails with [`RepositoryError::NotFound`] when the owner does not exist.
    async fn insert(&self, book: NewBook) -> Result<Book, RepositoryError>;
    async fn get(&self, id: BookId) -> Result<Book, RepositoryError>;
    /// Newest first, with owners resolved.
    async fn list(&self, request: PageRequest) -> Result<Page<BookWithOwner>, RepositoryError>;
    /// Every book owned by `user_id`, newest first.
    async fn list_by_owner(&self, user_id: UserId) -> Result<Vec<Book>, RepositoryError>;
    async fn delete(&self, id: BookId) -> Result<(), RepositoryError>;
}
