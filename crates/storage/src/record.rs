//! Document shapes of the external store.
//!
//! Quizzes are read strictly: a stored quiz that no longer validates is an error.
//! Sessions are read leniently: numeric fields that are missing or malformed are
//! coerced to 0 here, once, so nothing downstream has to guard against them.
//! Stored scores are rounded to whole percents on the way in, so dashboard
//! means are taken over the rounded values.

use chrono::{DateTime, Utc};
use quiz_core::model::{
    Difficulty, OPTION_COUNT, Question, QuestionDraft, QuestionId, Quiz, QuizDraft, QuizId,
    QuizSession, SessionId, UserAnswer, UserId,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::repository::{QuizSessionRow, StorageError};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

//
// ─── QUIZ ──────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRecord {
    pub id: QuestionId,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
}

impl QuestionRecord {
    #[must_use]
    pub fn from_question(question: &Question) -> Self {
        Self {
            id: question.id(),
            question: question.prompt().to_owned(),
            options: question.options().to_vec(),
            correct_answer: i64::from(question.correct_answer()),
            explanation: question.explanation().map(str::to_owned),
            difficulty: question.difficulty(),
        }
    }

    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the stored question is invalid.
    pub fn into_question(self) -> Result<Question, StorageError> {
        QuestionDraft {
            prompt: self.question,
            options: self.options,
            correct_answer: self.correct_answer,
            explanation: self.explanation,
            difficulty: self.difficulty,
        }
        .validate(self.id)
        .map_err(ser)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizRecord {
    pub id: QuizId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub questions: Vec<QuestionRecord>,
    pub created_at: DateTime<Utc>,
    pub created_by: UserId,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<u32>,
}

impl QuizRecord {
    #[must_use]
    pub fn from_quiz(quiz: &Quiz) -> Self {
        Self {
            id: quiz.id(),
            title: quiz.title().to_owned(),
            description: quiz.description().to_owned(),
            questions: quiz.questions().iter().map(QuestionRecord::from_question).collect(),
            created_at: quiz.created_at(),
            created_by: quiz.created_by().clone(),
            difficulty: quiz.difficulty(),
            subject: quiz.subject().to_owned(),
            time_limit: quiz.time_limit_minutes(),
        }
    }

    /// Convert the record back into a domain `Quiz`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if any question or the quiz itself
    /// fails validation.
    pub fn into_quiz(self) -> Result<Quiz, StorageError> {
        let questions = self
            .questions
            .into_iter()
            .map(QuestionRecord::into_question)
            .collect::<Result<Vec<_>, _>>()?;

        QuizDraft {
            title: self.title,
            description: self.description,
            subject: self.subject,
            difficulty: self.difficulty,
            questions,
            time_limit_minutes: self.time_limit,
            created_by: self.created_by,
        }
        .validate(self.id, self.created_at)
        .map_err(ser)
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAnswerRecord {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub question_id: Option<QuestionId>,
    #[serde(default)]
    pub selected_answer: Value,
    #[serde(default)]
    pub is_correct: bool,
    #[serde(default)]
    pub time_spent: Value,
}

impl UserAnswerRecord {
    #[must_use]
    pub fn from_answer(answer: &UserAnswer) -> Self {
        Self {
            question_id: Some(answer.question_id),
            selected_answer: Value::from(answer.selected_answer),
            is_correct: answer.is_correct,
            time_spent: Value::from(answer.time_spent),
        }
    }

    /// Lenient conversion; an unusable selection becomes option 0.
    ///
    /// Returns `None` when the answer does not name a question.
    #[must_use]
    pub fn sanitize(self) -> Option<UserAnswer> {
        let question_id = self.question_id?;
        let selected = u8::try_from(coerce_count(&self.selected_answer))
            .ok()
            .filter(|idx| usize::from(*idx) < OPTION_COUNT)
            .unwrap_or(0);
        Some(UserAnswer::new(
            question_id,
            selected,
            self.is_correct,
            coerce_count(&self.time_spent),
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSessionRecord {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub id: Option<SessionId>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub quiz_id: Option<QuizId>,
    pub user_id: UserId,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub answers: Vec<UserAnswerRecord>,
    #[serde(default)]
    pub score: Value,
    #[serde(default)]
    pub total_questions: Value,
    #[serde(default, deserialize_with = "lenient")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub time_spent: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz: Option<Value>,
}

impl QuizSessionRecord {
    /// Export a session. A session that only kept the subject of its quiz
    /// exports that subject as a partial quiz object.
    #[must_use]
    pub fn from_session(id: Option<SessionId>, session: &QuizSession) -> Self {
        let quiz = match session.quiz() {
            Some(quiz) => serde_json::to_value(QuizRecord::from_quiz(quiz)).ok(),
            None => session.subject().map(|subject| json!({ "subject": subject })),
        };
        Self {
            id,
            quiz_id: Some(session.quiz_id()),
            user_id: session.user_id().clone(),
            answers: session.answers().iter().map(UserAnswerRecord::from_answer).collect(),
            score: Value::from(session.score()),
            total_questions: Value::from(session.total_questions()),
            completed_at: Some(session.completed_at()),
            time_spent: Value::from(session.time_spent()),
            quiz,
        }
    }

    #[must_use]
    pub fn from_row(row: &QuizSessionRow) -> Self {
        Self::from_session(Some(row.id), &row.session)
    }

    /// Coerce the record into a typed session. Never fails.
    ///
    /// Numbers are rounded; the score is clamped to `0..=100` and times to `>= 0`.
    /// Anything that is not a finite JSON number counts as 0. A missing completion
    /// time falls back to `fallback_completed_at`. An embedded quiz that does not
    /// validate is dropped but its subject is kept. A missing or unreadable quiz
    /// reference falls back to the embedded quiz's id, then to the nil id.
    /// Answers that name no question are dropped.
    #[must_use]
    pub fn sanitize(self, fallback_completed_at: DateTime<Utc>) -> QuizSession {
        let (quiz, stray_subject) = match self.quiz.filter(|value| !value.is_null()) {
            None => (None, None),
            Some(value) => embedded_quiz(value),
        };

        let quiz_id = self
            .quiz_id
            .or_else(|| quiz.as_ref().map(Quiz::id))
            .unwrap_or_else(|| QuizId::new(Uuid::nil()));
        let score = u8::try_from(coerce_count(&self.score).min(100)).unwrap_or(100);
        let total_questions = usize::try_from(coerce_count(&self.total_questions)).unwrap_or(0);

        QuizSession::from_persisted(
            quiz_id,
            self.user_id,
            quiz,
            self.answers.into_iter().filter_map(UserAnswerRecord::sanitize).collect(),
            score,
            total_questions,
            coerce_count(&self.time_spent),
            self.completed_at.unwrap_or(fallback_completed_at),
        )
        .with_embedded_subject(stray_subject)
    }

    /// Sanitize into a storage row, assigning a fresh id when the record has none.
    #[must_use]
    pub fn into_row(self, fallback_completed_at: DateTime<Utc>) -> QuizSessionRow {
        let id = self.id.unwrap_or_else(SessionId::generate);
        QuizSessionRow::new(id, self.sanitize(fallback_completed_at))
    }
}

/// Sanitize an exported batch one element at a time.
///
/// Elements that are not session objects with a user id are logged and
/// skipped; every other element is coerced with [`QuizSessionRecord::sanitize`].
#[must_use]
pub fn sanitize_sessions(
    values: Vec<Value>,
    fallback_completed_at: DateTime<Utc>,
) -> Vec<QuizSession> {
    values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| {
            match serde_json::from_value::<QuizSessionRecord>(value) {
                Ok(record) => Some(record.sanitize(fallback_completed_at)),
                Err(err) => {
                    tracing::warn!(index, error = %err, "skipping unreadable session record");
                    None
                }
            }
        })
        .collect()
}

fn embedded_quiz(value: Value) -> (Option<Quiz>, Option<String>) {
    let subject = value
        .get("subject")
        .and_then(Value::as_str)
        .map(str::to_owned);
    match serde_json::from_value::<QuizRecord>(value)
        .map_err(ser)
        .and_then(QuizRecord::into_quiz)
    {
        Ok(quiz) => (Some(quiz), None),
        Err(err) => {
            tracing::warn!(subject = ?subject, error = %err, "dropping malformed embedded quiz");
            (None, subject)
        }
    }
}

/// Deserialize a field, treating any value of the wrong shape as absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

fn lenient_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(lenient(deserializer)?.unwrap_or_default())
}

/// Round a JSON number to a non-negative integer; everything else is 0.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn coerce_count(value: &Value) -> u64 {
    match value.as_f64() {
        Some(n) if n.is_finite() && n > 0.0 => n.round() as u64,
        _ => 0,
    }
}
