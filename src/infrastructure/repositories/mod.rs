pub mod books;
pub mod users;

pub use books::SqlBookRepository;
pub use users::SqlUserRepository;

fn unexpected(err: sqlx::Error) -> crate::domain::RepositoryError {
    crate::domain::RepositoryError::unexpected(err.to_string())
}
