//! Storage error types

use kindred_core::{PersonId, RelationshipId, TreeId};
use thiserror::Error;

/// Result type alias for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Storage-specific error types
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Family tree not found: {0}")]
    TreeNotFound(TreeId),

    #[error("Member not found: {0}")]
    PersonNotFound(PersonId),

    #[error("Relationship not found: {0}")]
    RelationshipNotFound(RelationshipId),

    #[error("Relationship already exists")]
    DuplicateRelationship,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Migration error: {0}")]
    Migration(String),

    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] ::rusqlite::Error),
}

impl StorageError {
    /// Whether the error means a requested record does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::TreeNotFound(_) | Self::PersonNotFound(_) | Self::RelationshipNotFound(_)
        )
    }
}
