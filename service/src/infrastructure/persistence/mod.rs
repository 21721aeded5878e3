use crate::domain::repository::RepositoryError;

pub mod query;
pub mod repository;
mod result;
pub mod schema;

pub use repository::PostgresRepository;

impl From<sqlx::Error> for RepositoryError {
    fn from(error: sqlx::Error) -> Self {
        match &error {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepositoryError::UniqueViolation(db.message().to_owned())
            }
            _ => RepositoryError::DatabaseError(error.to_string()),
        }
    }
}
