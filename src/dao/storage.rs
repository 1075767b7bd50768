use std::error::Error;
use thiserror::Error;

use crate::dao::models::EntityId;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of the underlying database.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not complete the operation.
    #[error("storage unavailable: {message}")]
    Unavailable {
        message: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// An operation referenced a record that does not exist.
    #[error("{entity} `{id}` not found")]
    NotFound { entity: &'static str, id: EntityId },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }

    /// Construct a not-found error for the given entity kind.
    pub fn not_found(entity: &'static str, id: EntityId) -> Self {
        StorageError::NotFound { entity, id }
    }
}
