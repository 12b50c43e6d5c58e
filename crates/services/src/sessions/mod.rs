mod navigator;
mod progress;
mod workflow;

// Public API of the attempt subsystem.
pub use crate::error::AttemptError;
pub use navigator::{AdvanceOutcome, QuizNavigator};
pub use progress::QuizProgress;
pub use workflow::{AdvanceResult, QuizAttemptService};
