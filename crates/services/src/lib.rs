#![forbid(unsafe_code)]

pub mod dashboard;
pub mod error;
pub mod library;
pub mod notes;
pub mod sessions;

pub use quiz_core::Clock;

pub use dashboard::DashboardService;
pub use error::{AttemptError, DashboardError, LibraryError, NotesServiceError};
pub use library::{QuizDetails, QuizLibraryService};
pub use notes::NotesService;
pub use sessions::{AdvanceOutcome, AdvanceResult, QuizAttemptService, QuizNavigator, QuizProgress};
