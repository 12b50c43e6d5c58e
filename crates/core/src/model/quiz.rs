use chrono::{DateTime, Utc};
use std::collections::HashSet;
use thiserror::Error;

use crate::model::ids::{QuestionId, QuizId, UserId};
use crate::model::question::{Difficulty, Question};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("quiz title cannot be empty")]
    EmptyTitle,

    #[error("quiz subject cannot be empty")]
    EmptySubject,

    #[error("quiz must contain at least one question")]
    NoQuestions,

    #[error("time limit must be > 0 minutes")]
    InvalidTimeLimit,

    #[error("duplicate question id: {0}")]
    DuplicateQuestion(QuestionId),
}

//
// ─── QUIZ ──────────────────────────────────────────────────────────────────────
//

/// Unvalidated quiz input assembled by the creator flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizDraft {
    pub title: String,
    pub description: String,
    pub subject: String,
    pub difficulty: Difficulty,
    pub questions: Vec<Question>,
    pub time_limit_minutes: Option<u32>,
    pub created_by: UserId,
}

impl QuizDraft {
    /// Validate the draft into an immutable quiz.
    ///
    /// # Errors
    ///
    /// Returns `QuizError` if title or subject are blank, there are no questions,
    /// question ids repeat, or the time limit is zero.
    pub fn validate(self, id: QuizId, created_at: DateTime<Utc>) -> Result<Quiz, QuizError> {
        let title = self.title.trim().to_owned();
        if title.is_empty() {
            return Err(QuizError::EmptyTitle);
        }
        let subject = self.subject.trim().to_owned();
        if subject.is_empty() {
            return Err(QuizError::EmptySubject);
        }
        if self.questions.is_empty() {
            return Err(QuizError::NoQuestions);
        }
        if self.time_limit_minutes == Some(0) {
            return Err(QuizError::InvalidTimeLimit);
        }

        let mut seen = HashSet::with_capacity(self.questions.len());
        for question in &self.questions {
            if !seen.insert(question.id()) {
                return Err(QuizError::DuplicateQuestion(question.id()));
            }
        }

        Ok(Quiz {
            id,
            title,
            description: self.description.trim().to_owned(),
            subject,
            difficulty: self.difficulty,
            questions: self.questions,
            time_limit_minutes: self.time_limit_minutes,
            created_at,
            created_by: self.created_by,
        })
    }
}

/// A generated quiz. Question order is the presentation order and never changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quiz {
    id: QuizId,
    title: String,
    description: String,
    subject: String,
    difficulty: Difficulty,
    questions: Vec<Question>,
    time_limit_minutes: Option<u32>,
    created_at: DateTime<Utc>,
    created_by: UserId,
}

impl Quiz {
    #[must_use]
    pub fn id(&self) -> QuizId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    /// Position of a question in presentation order.
    #[must_use]
    pub fn position_of(&self, id: QuestionId) -> Option<usize> {
        self.questions.iter().position(|q| q.id() == id)
    }

    #[must_use]
    pub fn time_limit_minutes(&self) -> Option<u32> {
        self.time_limit_minutes
    }

    #[must_use]
    pub fn time_limit_secs(&self) -> Option<u64> {
        self.time_limit_minutes.map(|m| u64::from(m) * 60)
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn created_by(&self) -> &UserId {
        &self.created_by
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::question::QuestionDraft;
    use crate::time::fixed_now;

    fn question(prompt: &str) -> Question {
        QuestionDraft {
            prompt: prompt.into(),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_answer: 0,
            explanation: None,
            difficulty: Difficulty::Medium,
        }
        .validate(QuestionId::generate())
        .unwrap()
    }

    fn draft() -> QuizDraft {
        QuizDraft {
            title: " Cell Biology ".into(),
            description: "Week 3".into(),
            subject: "Bio".into(),
            difficulty: Difficulty::Medium,
            questions: vec![question("Q1"), question("Q2")],
            time_limit_minutes: Some(10),
            created_by: UserId::new("u1"),
        }
    }

    #[test]
    fn validate_keeps_question_order() {
        let quiz = draft().validate(QuizId::generate(), fixed_now()).unwrap();
        assert_eq!(quiz.title(), "Cell Biology");
        assert_eq!(quiz.question_count(), 2);
        assert_eq!(quiz.questions()[0].prompt(), "Q1");
        assert_eq!(quiz.position_of(quiz.questions()[1].id()), Some(1));
        assert_eq!(quiz.time_limit_secs(), Some(600));
    }

    #[test]
    fn validate_rejects_empty_quiz() {
        let mut d = draft();
        d.questions.clear();
        let err = d.validate(QuizId::generate(), fixed_now()).unwrap_err();
        assert_eq!(err, QuizError::NoQuestions);
    }

    #[test]
    fn validate_rejects_duplicate_question_ids() {
        let mut d = draft();
        let dup = d.questions[0].clone();
        d.questions.push(dup.clone());
        let err = d.validate(QuizId::generate(), fixed_now()).unwrap_err();
        assert_eq!(err, QuizError::DuplicateQuestion(dup.id()));
    }

    #[test]
    fn validate_rejects_zero_time_limit_and_blank_subject() {
        let mut d = draft();
        d.time_limit_minutes = Some(0);
        assert_eq!(
            d.validate(QuizId::generate(), fixed_now()).unwrap_err(),
            QuizError::InvalidTimeLimit
        );

        let mut d = draft();
        d.subject = "  ".into();
        assert_eq!(
            d.validate(QuizId::generate(), fixed_now()).unwrap_err(),
            QuizError::EmptySubject
        );
    }
}
