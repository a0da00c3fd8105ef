//! Failure kinds surfaced by the circulation layer.

use thiserror::Error;

use crate::models::BookId;

/// Outcome of a declined or failed library operation. The first three kinds
/// are expected operator mistakes; `Storage` wraps anything the database
/// layer reported.
#[derive(Debug, Error)]
pub enum LibraryError {
    /// Carries the identifier as the operator typed it.
    #[error("Book {0} not found.")]
    BookNotFound(String),

    #[error("User {0} not found.")]
    UserNotFound(String),

    #[error("Book {0} is not currently issued.")]
    NotIssued(BookId),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl LibraryError {
    /// True for recoverable input errors that should be shown as a declined
    /// operation rather than a failure.
    pub fn is_declined(&self) -> bool {
        !matches!(self, LibraryError::Storage(_))
    }
}

pub type LibraryResult<T> = std::result::Result<T, LibraryError>;
