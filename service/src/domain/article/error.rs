use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::repository::RepositoryError;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("{entity} {key} not found")]
    NotFound { entity: &'static str, key: String },

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("locked by {held_by} since {since}")]
    Conflict {
        held_by: String,
        since: DateTime<Utc>,
    },

    #[error("failed to allocate {counter} after {attempts} attempts")]
    AllocationFailed { counter: String, attempts: u32 },

    #[error(transparent)]
    Upstream(#[from] RepositoryError),
}

impl ContentError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}
