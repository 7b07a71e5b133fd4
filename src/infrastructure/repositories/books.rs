use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{query, query_as, query_scalar};

use super::unexpected;
use crate::domain::RepositoryError;
use crate::domain::books::{Book, BookWithOwner, NewBook};
use crate::domain::ids::{BookId, UserId};
use crate::domain::listing::{Page, PageRequest};
use crate::domain::repositories::BookRepository;
use crate::domain::users::OwnerSummary;
use crate::infrastructure::database::DatabasePool;

#[derive(Clone)]
pub struct SqlBookRepository {
    pool: DatabasePool,
}

impl SqlBookRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookRecord {
    id: i64,
    title: String,
    caption: String,
    rating: i64,
    image: String,
    user_id: i64,
    created_at: DateTime<Utc>,
}

impl From<BookRecord> for Book {
    fn from(record: BookRecord) -> Self {
        Self {
            id: BookId::from(record.id),
            title: record.title,
            caption: record.caption,
            rating: record.rating,
            image: record.image,
            user: UserId::from(record.user_id),
            created_at: record.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct BookWithOwnerRecord {
    id: i64,
    title: String,
    caption: String,
    rating: i64,
    image: String,
    created_at: DateTime<Utc>,
    owner_username: String,
    owner_profile_image: String,
}

impl From<BookWithOwnerRecord> for BookWithOwner {
    fn from(record: BookWithOwnerRecord) -> Self {
        Self {
            id: BookId::from(record.id),
            title: record.title,
            caption: record.caption,
            rating: record.rating,
            image: record.image,
            user: OwnerSummary {
                username: record.owner_username,
                profile_image: record.owner_profile_image,
            },
            created_at: record.created_at,
        }
    }
}

#[async_trait]
impl BookRepository for SqlBookRepository {
    async fn insert(&self, new_book: NewBook) -> Result<Book, RepositoryError> {
        let created_at = new_book.created_at.unwrap_or_else(Utc::now);

        let record = query_as::<_, BookRecord>(
            r"INSERT INTO books (title, caption, rating, image, user_id, created_at)
              VALUES (?, ?, ?, ?, ?, ?)
              RETURNING id, title, caption, rating, image, user_id, created_at",
        )
        .bind(&new_book.title)
        .bind(&new_book.caption)
        .bind(new_book.rating)
        .bind(&new_book.image)
        .bind(i64::from(new_book.user))
        .bind(created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if let sqlx::Error::Database(db_err) = &err
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::NotFound;
            }
            unexpected(err)
        })?;

        Ok(record.into())
    }

    async fn get(&self, id: BookId) -> Result<Book, RepositoryError> {
        let record = query_as::<_, BookRecord>(
            r"SELECT id, title, caption, rating, image, user_id, created_at
              FROM books WHERE id = ?",
        )
        .bind(i64::from(id))
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or(RepositoryError::NotFound)?;

        Ok(record.into())
    }

    async fn list(&self, request: PageRequest) -> Result<Page<BookWithOwner>, RepositoryError> {
        let total: i64 = query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;

        let records = query_as::<_, BookWithOwnerRecord>(
            r"SELECT b.id, b.title, b.caption, b.rating, b.image, b.created_at,
                     u.username AS owner_username, u.profile_image AS owner_profile_image
              FROM books b
              JOIN users u ON u.id = b.user_id
              ORDER BY b.created_at DESC, b.id DESC
              LIMIT ? OFFSET ?",
        )
        .bind(i64::from(request.limit()))
        .bind(i64::try_from(request.offset()).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(Page::new(
            records.into_iter().map(Into::into).collect(),
            request,
            u64::try_from(total).unwrap_or_default(),
        ))
    }

    async fn list_by_owner(&self, user_id: UserId) -> Result<Vec<Book>, RepositoryError> {
        let records = query_as::<_, BookRecord>(
            r"SELECT id, title, caption, rating, image, user_id, created_at
              FROM books
              WHERE user_id = ?
              ORDER BY created_at DESC, id DESC",
        )
        .bind(i64::from(user_id))
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(Into::into).collect())
    }

    async fn delete(&self, id: BookId) -> Result<(), RepositoryError> {
        let result = query("DELETE FROM books WHERE id = ?")
            .bind(i64::from(id))
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
