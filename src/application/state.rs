use std::sync::Arc;

use crate::application::services::BookService;
use crate::domain::media::MediaStore;
use crate::domain::repositories::{BookRepository, UserRepository};
use crate::infrastructure::database::Database;
use crate::infrastructure::repositories::{SqlBookRepository, SqlUserRepository};
use crate::infrastructure::tokens::TokenService;

/// Maximum auth requests per IP per minute.
pub const AUTH_RATE_LIMIT_PER_MINUTE: u32 = 20;

/// Everything that varies between production and test environments. Repositories
/// and services are created from the database pool.
pub struct AppStateConfig {
    pub media: Arc<dyn MediaStore>,
    pub tokens: TokenService,
    pub auth_requests_per_minute: u32,
}

#[derive(Clone)]
pub struct AppState {
    pub user_repo: Arc<dyn UserRepository>,
    pub book_repo: Arc<dyn BookRepository>,
    pub tokens: Arc<TokenService>,
    pub book_service: BookService,
    pub auth_requests_per_minute: u32,
}

impl AppState {
    pub fn from_database(database: &Database, config: AppStateConfig) -> Self {
        let pool = database.clone_pool();

        let user_repo: Arc<dyn UserRepository> = Arc::new(SqlUserRepository::new(pool.clone()));
        let book_repo: Arc<dyn BookRepository> = Arc::new(SqlBookRepository::new(pool));

        let book_service = BookService::new(Arc::clone(&book_repo), config.media);

        Self {
            user_repo,
            book_repo,
            tokens: Arc::new(config.tokens),
            book_service,
            auth_requests_per_minute: config.auth_requests_per_minute,
        }
    }
}
