use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::{QuestionId, QuizId, UserId};
use crate::model::quiz::Quiz;
use crate::scoring::score_percent;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("expected {expected} answers, got {actual}")]
    AnswerCountMismatch { expected: usize, actual: usize },

    #[error("answer {index} does not belong to question {expected}")]
    QuestionMismatch { index: usize, expected: QuestionId },

    #[error("answer {index} selects invalid option {selected}")]
    InvalidSelection { index: usize, selected: u8 },
}

/// The answer recorded for one question of an attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAnswer {
    pub question_id: QuestionId,
    pub selected_answer: u8,
    pub is_correct: bool,
    /// Whole seconds spent on the question during its latest visit.
    pub time_spent: u64,
}

impl UserAnswer {
    #[must_use]
    pub fn new(question_id: QuestionId, selected_answer: u8, is_correct: bool, time_spent: u64) -> Self {
        Self {
            question_id,
            selected_answer,
            is_correct,
            time_spent,
        }
    }
}

/// One completed attempt at a quiz. Never mutated after creation.
///
/// The embedded `quiz` is a copy taken at completion time so that history keeps
/// rendering after the source quiz changes or disappears. Historic records may
/// lack it, or carry one too damaged to rehydrate; in that case only its
/// subject survives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSession {
    quiz_id: QuizId,
    user_id: UserId,
    quiz: Option<Quiz>,
    embedded_subject: Option<String>,
    answers: Vec<UserAnswer>,
    score: u8,
    total_questions: usize,
    time_spent: u64,
    completed_at: DateTime<Utc>,
}

impl QuizSession {
    /// Build a session from a finished traversal.
    ///
    /// Correctness is re-derived from the quiz; the incoming `is_correct` flags are ignored.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the answers do not line up one-to-one with the
    /// quiz questions or select an option that does not exist.
    pub fn from_completed(
        quiz: Quiz,
        user_id: UserId,
        answers: Vec<UserAnswer>,
        time_spent: u64,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        let expected = quiz.question_count();
        if answers.len() != expected {
            return Err(SessionError::AnswerCountMismatch {
                expected,
                actual: answers.len(),
            });
        }

        let mut checked = Vec::with_capacity(answers.len());
        for (index, (question, answer)) in quiz.questions().iter().zip(answers).enumerate() {
            if answer.question_id != question.id() {
                return Err(SessionError::QuestionMismatch {
                    index,
                    expected: question.id(),
                });
            }
            if !question.is_valid_option(answer.selected_answer) {
                return Err(SessionError::InvalidSelection {
                    index,
                    selected: answer.selected_answer,
                });
            }
            checked.push(UserAnswer {
                is_correct: question.is_correct(answer.selected_answer),
                ..answer
            });
        }

        let correct = checked.iter().filter(|a| a.is_correct).count();

        Ok(Self {
            quiz_id: quiz.id(),
            user_id,
            score: score_percent(correct, expected),
            total_questions: expected,
            answers: checked,
            quiz: Some(quiz),
            embedded_subject: None,
            time_spent,
            completed_at,
        })
    }

    /// Rehydrate a session from persisted storage.
    ///
    /// Values are taken as stored; the score is capped at 100.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn from_persisted(
        quiz_id: QuizId,
        user_id: UserId,
        quiz: Option<Quiz>,
        answers: Vec<UserAnswer>,
        score: u8,
        total_questions: usize,
        time_spent: u64,
        completed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            quiz_id,
            user_id,
            quiz,
            embedded_subject: None,
            answers,
            score: score.min(100),
            total_questions,
            time_spent,
            completed_at,
        }
    }

    /// Keep the subject of an embedded quiz that could not be rehydrated.
    ///
    /// Ignored when the session has its quiz.
    #[must_use]
    pub fn with_embedded_subject(mut self, subject: Option<String>) -> Self {
        if self.quiz.is_none() {
            self.embedded_subject = subject;
        }
        self
    }

    #[must_use]
    pub fn quiz_id(&self) -> QuizId {
        self.quiz_id
    }

    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    #[must_use]
    pub fn quiz(&self) -> Option<&Quiz> {
        self.quiz.as_ref()
    }

    /// Subject of the embedded quiz, if there is one.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.quiz
            .as_ref()
            .map(Quiz::subject)
            .or(self.embedded_subject.as_deref())
            .filter(|subject| !subject.trim().is_empty())
    }

    #[must_use]
    pub fn answers(&self) -> &[UserAnswer] {
        &self.answers
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_correct).count()
    }

    #[must_use]
    pub fn score(&self) -> u8 {
        self.score
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.total_questions
    }

    #[must_use]
    pub fn time_spent(&self) -> u64 {
        self.time_spent
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }
}
