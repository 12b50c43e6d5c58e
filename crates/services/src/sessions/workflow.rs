use std::sync::Arc;

use quiz_core::model::{QuizId, SessionId, UserId};
use storage::repository::{QuizRepository, QuizSessionRepository};

use super::navigator::{AdvanceOutcome, QuizNavigator};
use crate::Clock;
use crate::error::AttemptError;

/// Result of advancing an attempt through the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvanceResult {
    pub outcome: AdvanceOutcome,
    pub is_complete: bool,
    pub session_id: Option<SessionId>,
}

/// Orchestrates attempt start and persistence of the finished session.
#[derive(Clone)]
pub struct QuizAttemptService {
    clock: Clock,
    quizzes: Arc<dyn QuizRepository>,
    sessions: Arc<dyn QuizSessionRepository>,
}

impl QuizAttemptService {
    #[must_use]
    pub fn new(
        clock: Clock,
        quizzes: Arc<dyn QuizRepository>,
        sessions: Arc<dyn QuizSessionRepository>,
    ) -> Self {
        Self {
            clock,
            quizzes,
            sessions,
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Load a quiz and start an attempt at the current time.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::Storage` if the quiz cannot be loaded.
    pub async fn start_attempt(
        &self,
        quiz_id: QuizId,
        user_id: UserId,
    ) -> Result<QuizNavigator, AttemptError> {
        let quiz = self.quizzes.get_quiz(quiz_id).await?;
        tracing::info!(%quiz_id, %user_id, questions = quiz.question_count(), "starting attempt");
        Ok(QuizNavigator::new(quiz, user_id, self.clock.now()))
    }

    pub fn select(&self, navigator: &mut QuizNavigator, option: u8) -> bool {
        navigator.select(option)
    }

    pub fn go_back(&self, navigator: &mut QuizNavigator) -> bool {
        navigator.go_back(self.clock.now())
    }

    pub fn tick(&self, navigator: &mut QuizNavigator) {
        navigator.tick();
    }

    /// Catch the elapsed counter up with the clock, for hosts without a ticker.
    pub fn sync_elapsed(&self, navigator: &mut QuizNavigator) {
        navigator.sync_elapsed(self.clock.now());
    }

    /// Advance the attempt and persist the session when it finishes.
    ///
    /// If persistence fails the attempt stays complete; call
    /// [`finalize_session`](Self::finalize_session) to retry.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError` for session construction or persistence failures.
    pub async fn advance(&self, navigator: &mut QuizNavigator) -> Result<AdvanceResult, AttemptError> {
        let now = self.clock.now();
        let outcome = navigator.advance(now)?;

        if outcome == AdvanceOutcome::Finished {
            self.finalize_session(navigator).await?;
        }

        Ok(AdvanceResult {
            outcome,
            is_complete: navigator.is_complete(),
            session_id: navigator.session_id(),
        })
    }

    /// Persist the finished session, or return the id it already has.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::NotCompleted` if the attempt is still running.
    /// Returns `AttemptError::Storage` if persistence fails.
    pub async fn finalize_session(
        &self,
        navigator: &mut QuizNavigator,
    ) -> Result<SessionId, AttemptError> {
        if let Some(id) = navigator.session_id() {
            return Ok(id);
        }
        let session = navigator.session().ok_or(AttemptError::NotCompleted)?;

        let id = match self.sessions.append_session(session).await {
            Ok(id) => id,
            Err(err) => {
                tracing::warn!(quiz_id = %session.quiz_id(), error = %err, "failed to persist session");
                return Err(err.into());
            }
        };
        tracing::info!(
            session_id = %id,
            quiz_id = %session.quiz_id(),
            user_id = %session.user_id(),
            score = session.score(),
            "session completed"
        );
        navigator.set_session_id(id);
        Ok(id)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Duration;
    use quiz_core::model::{
        Difficulty, QuestionDraft, QuestionId, Quiz, QuizDraft, QuizSession,
    };
    use quiz_core::time::fixed_now;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use storage::repository::{InMemoryRepository, QuizSessionRow, StorageError};

    fn build_quiz(correct: &[i64]) -> Quiz {
        let questions = correct
            .iter()
            .map(|c| {
                QuestionDraft {
                    prompt: "Which?".into(),
                    options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
                    correct_answer: *c,
                    explanation: None,
                    difficulty: Difficulty::Easy,
                }
                .validate(QuestionId::generate())
                .unwrap()
            })
            .collect();
        QuizDraft {
            title: "Workflow".into(),
            description: String::new(),
            subject: "Chem".into(),
            difficulty: Difficulty::Easy,
            questions,
            time_limit_minutes: None,
            created_by: UserId::new("author"),
        }
        .validate(QuizId::generate(), fixed_now())
        .unwrap()
    }

    /// Fails the first `failures` appends, then delegates.
    struct FlakySessions {
        inner: InMemoryRepository,
        failures: AtomicUsize,
    }

    #[async_trait]
    impl QuizSessionRepository for FlakySessions {
        async fn append_session(&self, session: &QuizSession) -> Result<SessionId, StorageError> {
            let left = self.failures.load(Ordering::SeqCst);
            if left > 0 {
                self.failures.store(left - 1, Ordering::SeqCst);
                return Err(StorageError::Connection("offline".into()));
            }
            self.inner.append_session(session).await
        }

        async fn get_session(&self, id: SessionId) -> Result<QuizSessionRow, StorageError> {
            self.inner.get_session(id).await
        }

        async fn list_sessions_by_user(
            &self,
            user: &UserId,
            limit: usize,
        ) -> Result<Vec<QuizSessionRow>, StorageError> {
            self.inner.list_sessions_by_user(user, limit).await
        }
    }

    #[tokio::test]
    async fn finished_attempt_is_persisted_once() {
        let repo = InMemoryRepository::new();
        let quiz = build_quiz(&[1, 2]);
        repo.save_quiz(&quiz).await.unwrap();

        let service = QuizAttemptService::new(
            Clock::fixed(fixed_now()),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
        );
        let mut nav = service.start_attempt(quiz.id(), UserId::new("u1")).await.unwrap();

        let first = service.advance(&mut nav).await.unwrap();
        assert_eq!(first.outcome, AdvanceOutcome::Ignored);

        assert!(service.select(&mut nav, 1));
        let service = service.with_clock(Clock::fixed(fixed_now() + Duration::seconds(12)));
        let moved = service.advance(&mut nav).await.unwrap();
        assert_eq!(moved.outcome, AdvanceOutcome::Moved { index: 1 });
        assert_eq!(moved.session_id, None);

        assert!(service.select(&mut nav, 0));
        let service = service.with_clock(Clock::fixed(fixed_now() + Duration::seconds(20)));
        let done = service.advance(&mut nav).await.unwrap();
        assert_eq!(done.outcome, AdvanceOutcome::Finished);
        assert!(done.is_complete);

        let id = done.session_id.unwrap();
        let stored = repo.get_session(id).await.unwrap();
        assert_eq!(stored.session.score(), 50);
        assert_eq!(stored.session.time_spent(), 20);
        assert_eq!(stored.session.answers()[0].time_spent, 12);
        assert_eq!(stored.session.answers()[1].time_spent, 8);

        assert_eq!(service.finalize_session(&mut nav).await.unwrap(), id);
        let rows = repo
            .list_sessions_by_user(&UserId::new("u1"), 20)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn persistence_failure_can_be_retried() {
        let repo = InMemoryRepository::new();
        let quiz = build_quiz(&[0]);
        repo.save_quiz(&quiz).await.unwrap();
        let sessions = Arc::new(FlakySessions {
            inner: repo.clone(),
            failures: AtomicUsize::new(1),
        });

        let service =
            QuizAttemptService::new(Clock::fixed(fixed_now()), Arc::new(repo.clone()), sessions);
        let mut nav = service.start_attempt(quiz.id(), UserId::new("u1")).await.unwrap();
        service.select(&mut nav, 0);

        let err = service.advance(&mut nav).await.unwrap_err();
        assert!(matches!(err, AttemptError::Storage(StorageError::Connection(_))));
        assert!(nav.is_complete());
        assert_eq!(nav.session_id(), None);

        let id = service.finalize_session(&mut nav).await.unwrap();
        assert_eq!(nav.session_id(), Some(id));
        assert_eq!(repo.get_session(id).await.unwrap().session.score(), 100);
    }

    #[tokio::test]
    async fn finalize_before_completion_is_rejected() {
        let repo = InMemoryRepository::new();
        let quiz = build_quiz(&[0, 0]);
        repo.save_quiz(&quiz).await.unwrap();
        let service = QuizAttemptService::new(
            Clock::fixed(fixed_now()),
            Arc::new(repo.clone()),
            Arc::new(repo),
        );

        let mut nav = service.start_attempt(quiz.id(), UserId::new("u1")).await.unwrap();
        let err = service.finalize_session(&mut nav).await.unwrap_err();
        assert!(matches!(err, AttemptError::NotCompleted));
        assert!(!service.go_back(&mut nav));
    }

    #[tokio::test]
    async fn unknown_quiz_cannot_be_started() {
        let repo = InMemoryRepository::new();
        let service = QuizAttemptService::new(
            Clock::fixed(fixed_now()),
            Arc::new(repo.clone()),
            Arc::new(repo),
        );
        let err = service
            .start_attempt(QuizId::generate(), UserId::new("u1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AttemptError::Storage(StorageError::NotFound)));
    }
}
