mod ids;
mod notes;
mod question;
mod quiz;
mod session;
mod settings;

pub use ids::{NotesId, ParseIdError, QuestionId, QuizId, SessionId, UserId};

pub use notes::{DEFAULT_NOTES_SUBJECT, DEFAULT_NOTES_TITLE, LectureNotes, NotesDraft, NotesError};
pub use question::{Difficulty, OPTION_COUNT, Question, QuestionDraft, QuestionError};
pub use quiz::{Quiz, QuizDraft, QuizError};
pub use session::{QuizSession, SessionError, UserAnswer};
pub use settings::{DashboardSettings, SettingsError};
