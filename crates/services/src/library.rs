use std::sync::Arc;

use quiz_core::generation::{GenerationRequest, parse_generated_questions};
use quiz_core::model::{Quiz, QuizDraft, QuizId, UserId};
use storage::repository::QuizRepository;

use crate::Clock;
use crate::error::LibraryError;

/// Title and limits chosen by the creator alongside a generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizDetails {
    pub title: String,
    pub description: String,
    pub time_limit_minutes: Option<u32>,
}

/// Orchestrates quiz creation and lookup.
#[derive(Clone)]
pub struct QuizLibraryService {
    clock: Clock,
    quizzes: Arc<dyn QuizRepository>,
}

impl QuizLibraryService {
    #[must_use]
    pub fn new(clock: Clock, quizzes: Arc<dyn QuizRepository>) -> Self {
        Self { clock, quizzes }
    }

    /// Validate a draft, assign it an id and creation time, and persist it.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::Invalid` for validation failures.
    /// Returns `LibraryError::Storage` if persistence fails.
    pub async fn create_quiz(&self, draft: QuizDraft) -> Result<Quiz, LibraryError> {
        let quiz = draft
            .validate(QuizId::generate(), self.clock.now())
            .map_err(quiz_core::Error::from)?;
        self.quizzes.save_quiz(&quiz).await?;
        tracing::info!(
            quiz_id = %quiz.id(),
            user_id = %quiz.created_by(),
            questions = quiz.question_count(),
            "quiz created"
        );
        Ok(quiz)
    }

    /// Build and persist a quiz from the generator's response to `request`.
    ///
    /// Subject and difficulty come from the request.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::Invalid` if the response or the quiz is invalid.
    /// Returns `LibraryError::Storage` if persistence fails.
    pub async fn create_generated_quiz(
        &self,
        request: &GenerationRequest,
        response_json: &str,
        details: QuizDetails,
        created_by: UserId,
    ) -> Result<Quiz, LibraryError> {
        let questions = parse_generated_questions(response_json, request.difficulty())
            .map_err(quiz_core::Error::from)?;
        if questions.len() != usize::from(request.number_of_questions()) {
            tracing::debug!(
                requested = request.number_of_questions(),
                received = questions.len(),
                "generator returned a different question count"
            );
        }

        self.create_quiz(QuizDraft {
            title: details.title,
            description: details.description,
            subject: request.subject().to_owned(),
            difficulty: request.difficulty(),
            questions,
            time_limit_minutes: details.time_limit_minutes,
            created_by,
        })
        .await
    }

    /// Fetch a quiz by ID.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::Storage` if the quiz is missing or storage fails.
    pub async fn get_quiz(&self, id: QuizId) -> Result<Quiz, LibraryError> {
        Ok(self.quizzes.get_quiz(id).await?)
    }

    /// Quizzes created by `user`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::Storage` if repository access fails.
    pub async fn list_user_quizzes(&self, user: &UserId) -> Result<Vec<Quiz>, LibraryError> {
        Ok(self.quizzes.list_quizzes_by_owner(user).await?)
    }
}
