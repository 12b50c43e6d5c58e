use async_trait::async_trait;
use quiz_core::model::{LectureNotes, NotesId, Quiz, QuizId, QuizSession, SessionId, UserId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// A persisted session paired with the id the store assigned to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSessionRow {
    pub id: SessionId,
    pub session: QuizSession,
}

impl QuizSessionRow {
    #[must_use]
    pub fn new(id: SessionId, session: QuizSession) -> Self {
        Self { id, session }
    }
}

/// Repository contract for generated quizzes.
#[async_trait]
pub trait QuizRepository: Send + Sync {
    /// Persist or replace a quiz.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the quiz cannot be stored.
    async fn save_quiz(&self, quiz: &Quiz) -> Result<(), StorageError>;

    /// Fetch a quiz by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_quiz(&self, id: QuizId) -> Result<Quiz, StorageError>;

    /// All quizzes created by `owner`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_quizzes_by_owner(&self, owner: &UserId) -> Result<Vec<Quiz>, StorageError>;
}

/// Append-only store of completed sessions.
#[async_trait]
pub trait QuizSessionRepository: Send + Sync {
    /// Persist a completed session and return its new ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the session cannot be stored.
    async fn append_session(&self, session: &QuizSession) -> Result<SessionId, StorageError>;

    /// Fetch a session by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_session(&self, id: SessionId) -> Result<QuizSessionRow, StorageError>;

    /// Up to `limit` sessions of `user`, newest completion first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_sessions_by_user(
        &self,
        user: &UserId,
        limit: usize,
    ) -> Result<Vec<QuizSessionRow>, StorageError>;
}

/// Uploaded lecture notes, kept per user.
#[async_trait]
pub trait LectureNotesRepository: Send + Sync {
    /// Persist or replace notes.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the notes cannot be stored.
    async fn save_notes(&self, notes: &LectureNotes) -> Result<(), StorageError>;

    /// Fetch notes by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_notes(&self, id: NotesId) -> Result<LectureNotes, StorageError>;

    /// All notes uploaded by `user`, newest upload first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_notes_by_user(&self, user: &UserId) -> Result<Vec<LectureNotes>, StorageError>;

    /// Remove notes by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn delete_notes(&self, id: NotesId) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    quizzes: Arc<Mutex<HashMap<QuizId, Quiz>>>,
    sessions: Arc<Mutex<Vec<QuizSessionRow>>>,
    notes: Arc<Mutex<HashMap<NotesId, LectureNotes>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StorageError> {
    mutex
        .lock()
        .map_err(|e| StorageError::Connection(e.to_string()))
}

#[async_trait]
impl QuizRepository for InMemoryRepository {
    async fn save_quiz(&self, quiz: &Quiz) -> Result<(), StorageError> {
        let mut guard = lock(&self.quizzes)?;
        guard.insert(quiz.id(), quiz.clone());
        tracing::debug!(quiz_id = %quiz.id(), "stored quiz");
        Ok(())
    }

    async fn get_quiz(&self, id: QuizId) -> Result<Quiz, StorageError> {
        let guard = lock(&self.quizzes)?;
        guard.get(&id).cloned().ok_or(StorageError::NotFound)
    }

    async fn list_quizzes_by_owner(&self, owner: &UserId) -> Result<Vec<Quiz>, StorageError> {
        let guard = lock(&self.quizzes)?;
        let mut quizzes: Vec<Quiz> = guard
            .values()
            .filter(|quiz| quiz.created_by() == owner)
            .cloned()
            .collect();
        quizzes.sort_by(|a, b| b.created_at().cmp(&a.created_at()).then(a.id().cmp(&b.id())));
        Ok(quizzes)
    }
}

#[async_trait]
impl QuizSessionRepository for InMemoryRepository {
    async fn append_session(&self, session: &QuizSession) -> Result<SessionId, StorageError> {
        let mut guard = lock(&self.sessions)?;
        let id = SessionId::generate();
        if guard.iter().any(|row| row.id == id) {
            return Err(StorageError::Conflict);
        }
        guard.push(QuizSessionRow::new(id, session.clone()));
        tracing::debug!(session_id = %id, user_id = %session.user_id(), "stored session");
        Ok(id)
    }

    async fn get_session(&self, id: SessionId) -> Result<QuizSessionRow, StorageError> {
        let guard = lock(&self.sessions)?;
        guard
            .iter()
            .find(|row| row.id == id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn list_sessions_by_user(
        &self,
        user: &UserId,
        limit: usize,
    ) -> Result<Vec<QuizSessionRow>, StorageError> {
        let guard = lock(&self.sessions)?;
        // Later appends win ties on completion time.
        let mut rows: Vec<QuizSessionRow> = guard
            .iter()
            .rev()
            .filter(|row| row.session.user_id() == user)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.session.completed_at().cmp(&a.session.completed_at()));
        rows.truncate(limit);
        Ok(rows)
    }
}

#[async_trait]
impl LectureNotesRepository for InMemoryRepository {
    async fn save_notes(&self, notes: &LectureNotes) -> Result<(), StorageError> {
        let mut guard = lock(&self.notes)?;
        guard.insert(notes.id(), notes.clone());
        tracing::debug!(notes_id = %notes.id(), user_id = %notes.user_id(), "stored notes");
        Ok(())
    }

    async fn get_notes(&self, id: NotesId) -> Result<LectureNotes, StorageError> {
        let guard = lock(&self.notes)?;
        guard.get(&id).cloned().ok_or(StorageError::NotFound)
    }

    async fn list_notes_by_user(&self, user: &UserId) -> Result<Vec<LectureNotes>, StorageError> {
        let guard = lock(&self.notes)?;
        let mut notes: Vec<LectureNotes> = guard
            .values()
            .filter(|notes| notes.user_id() == user)
            .cloned()
            .collect();
        notes.sort_by(|a, b| b.uploaded_at().cmp(&a.uploaded_at()).then(a.id().cmp(&b.id())));
        Ok(notes)
    }

    async fn delete_notes(&self, id: NotesId) -> Result<(), StorageError> {
        let mut guard = lock(&self.notes)?;
        guard.remove(&id).map(|_| ()).ok_or(StorageError::NotFound)
    }
}

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub quizzes: Arc<dyn QuizRepository>,
    pub sessions: Arc<dyn QuizSessionRepository>,
    pub notes: Arc<dyn LectureNotesRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let quizzes: Arc<dyn QuizRepository> = Arc::new(repo.clone());
        let sessions: Arc<dyn QuizSessionRepository> = Arc::new(repo.clone());
        let notes: Arc<dyn LectureNotesRepository> = Arc::new(repo);
        Self {
            quizzes,
            sessions,
            notes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use quiz_core::model::{Difficulty, NotesDraft, QuestionDraft, QuestionId, QuizDraft};
    use quiz_core::time::fixed_now;

    fn build_quiz(owner: &str, age_mins: i64) -> Quiz {
        let question = QuestionDraft {
            prompt: "Q".into(),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_answer: 2,
            explanation: None,
            difficulty: Difficulty::Medium,
        }
        .validate(QuestionId::generate())
        .unwrap();
        QuizDraft {
            title: "Cells".into(),
            description: String::new(),
            subject: "Bio".into(),
            difficulty: Difficulty::Medium,
            questions: vec![question],
            time_limit_minutes: Some(5),
            created_by: UserId::new(owner),
        }
        .validate(QuizId::generate(), fixed_now() - Duration::minutes(age_mins))
        .unwrap()
    }

    fn build_session(user: &str, score: u8, age_mins: i64) -> QuizSession {
        QuizSession::from_persisted(
            QuizId::generate(),
            UserId::new(user),
            None,
            Vec::new(),
            score,
            1,
            10,
            fixed_now() - Duration::minutes(age_mins),
        )
    }

    #[tokio::test]
    async fn stores_and_lists_quizzes_newest_first() {
        let repo = InMemoryRepository::new();
        let old = build_quiz("u1", 30);
        let new = build_quiz("u1", 1);
        let other = build_quiz("u2", 0);
        for quiz in [&old, &new, &other] {
            repo.save_quiz(quiz).await.unwrap();
        }

        assert_eq!(repo.get_quiz(old.id()).await.unwrap(), old);
        let listed = repo.list_quizzes_by_owner(&UserId::new("u1")).await.unwrap();
        let ids: Vec<QuizId> = listed.iter().map(Quiz::id).collect();
        assert_eq!(ids, vec![new.id(), old.id()]);
    }

    #[tokio::test]
    async fn missing_quiz_is_not_found() {
        let repo = InMemoryRepository::new();
        let err = repo.get_quiz(QuizId::generate()).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
    }

    #[tokio::test]
    async fn append_assigns_ids_and_lists_newest_first() {
        let repo = InMemoryRepository::new();
        let first = repo.append_session(&build_session("u1", 40, 20)).await.unwrap();
        let second = repo.append_session(&build_session("u1", 90, 5)).await.unwrap();
        repo.append_session(&build_session("u2", 70, 0)).await.unwrap();
        assert_ne!(first, second);

        let rows = repo
            .list_sessions_by_user(&UserId::new("u1"), 10)
            .await
            .unwrap();
        let scores: Vec<u8> = rows.iter().map(|r| r.session.score()).collect();
        assert_eq!(scores, vec![90, 40]);

        let capped = repo
            .list_sessions_by_user(&UserId::new("u1"), 1)
            .await
            .unwrap();
        assert_eq!(capped[0].id, second);

        let fetched = repo.get_session(first).await.unwrap();
        assert_eq!(fetched.session.score(), 40);
    }

    #[tokio::test]
    async fn storage_bundle_shares_one_backend() {
        let storage = Storage::in_memory();
        let quiz = build_quiz("u1", 0);
        storage.quizzes.save_quiz(&quiz).await.unwrap();
        let id = storage
            .sessions
            .append_session(&build_session("u1", 100, 0))
            .await
            .unwrap();

        assert_eq!(storage.quizzes.get_quiz(quiz.id()).await.unwrap().id(), quiz.id());
        assert_eq!(storage.sessions.get_session(id).await.unwrap().id, id);
    }

    fn build_notes(user: &str, title: &str, age_mins: i64) -> LectureNotes {
        NotesDraft {
            title: Some(title.into()),
            subject: Some("History".into()),
            content: "The treaty was signed in 1648.".into(),
        }
        .validate(
            NotesId::generate(),
            UserId::new(user),
            fixed_now() - Duration::minutes(age_mins),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn notes_are_listed_per_user_newest_first_and_deletable() {
        let storage = Storage::in_memory();
        let old = build_notes("u1", "Week 1", 90);
        let new = build_notes("u1", "Week 2", 10);
        storage.notes.save_notes(&old).await.unwrap();
        storage.notes.save_notes(&new).await.unwrap();
        storage.notes.save_notes(&build_notes("u2", "Other", 0)).await.unwrap();

        let listed = storage.notes.list_notes_by_user(&UserId::new("u1")).await.unwrap();
        let titles: Vec<&str> = listed.iter().map(LectureNotes::title).collect();
        assert_eq!(titles, vec!["Week 2", "Week 1"]);

        storage.notes.delete_notes(old.id()).await.unwrap();
        assert!(matches!(
            storage.notes.get_notes(old.id()).await,
            Err(StorageError::NotFound)
        ));
        assert!(matches!(
            storage.notes.delete_notes(old.id()).await,
            Err(StorageError::NotFound)
        ));
        assert_eq!(storage.notes.get_notes(new.id()).await.unwrap(), new);
    }
}
