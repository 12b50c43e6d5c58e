//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::SessionError;
use storage::repository::StorageError;

/// Errors emitted while running a quiz attempt.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AttemptError {
    #[error("attempt is not finished yet")]
    NotCompleted,
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `QuizLibraryService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LibraryError {
    #[error(transparent)]
    Invalid(#[from] quiz_core::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `DashboardService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DashboardError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `NotesService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum NotesServiceError {
    #[error(transparent)]
    Invalid(#[from] quiz_core::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
