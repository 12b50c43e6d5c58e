use thiserror::Error;

use crate::generation::GenerationError;
use crate::model::{NotesError, QuestionError, QuizError, SessionError, SettingsError};

/// Any validation failure raised by the core model.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Notes(#[from] NotesError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
}
