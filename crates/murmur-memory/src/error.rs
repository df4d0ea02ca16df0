//! Error types for the conversation memory layer.

use thiserror::Error;

/// Errors that can occur while reading or appending conversation turns.
#[derive(Debug, Error)]
pub enum MemoryError {
    /// A SQL statement failed.
    #[error("memory database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A pooled connection could not be checked out.
    #[error("memory connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// The schema could not be brought up to date.
    #[error(transparent)]
    Migration(#[from] crate::migrations::MigrationError),

    /// A stored row carried a role name this build does not know.
    #[error("unknown role '{0}' in stored turn")]
    UnknownRole(String),
}
