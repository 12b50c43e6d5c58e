use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::QuestionId;

/// Every generated question carries exactly this many answer options.
pub const OPTION_COUNT: usize = 4;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("question must have exactly 4 options, got {len}")]
    WrongOptionCount { len: usize },

    #[error("option {index} cannot be empty")]
    EmptyOption { index: usize },

    #[error("correct answer index {0} is out of range")]
    CorrectAnswerOutOfRange(i64),

    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),
}

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

/// Difficulty tag shared by quizzes and their questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = QuestionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(QuestionError::UnknownDifficulty(other.to_owned())),
        }
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// Unvalidated question input, e.g. straight from the generator response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_answer: i64,
    pub explanation: Option<String>,
    pub difficulty: Difficulty,
}

impl QuestionDraft {
    /// Validate the draft and assign it an identifier.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` when the prompt is blank, the option list is not
    /// exactly [`OPTION_COUNT`] non-blank strings, or the correct index is out of range.
    pub fn validate(self, id: QuestionId) -> Result<Question, QuestionError> {
        let prompt = self.prompt.trim().to_owned();
        if prompt.is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }

        let len = self.options.len();
        let options: [String; OPTION_COUNT] = self
            .options
            .into_iter()
            .map(|opt| opt.trim().to_owned())
            .collect::<Vec<_>>()
            .try_into()
            .map_err(|_| QuestionError::WrongOptionCount { len })?;

        if let Some(index) = options.iter().position(String::is_empty) {
            return Err(QuestionError::EmptyOption { index });
        }

        let correct_answer = u8::try_from(self.correct_answer)
            .ok()
            .filter(|idx| usize::from(*idx) < OPTION_COUNT)
            .ok_or(QuestionError::CorrectAnswerOutOfRange(self.correct_answer))?;

        let explanation = self
            .explanation
            .map(|text| text.trim().to_owned())
            .filter(|text| !text.is_empty());

        Ok(Question {
            id,
            prompt,
            options,
            correct_answer,
            explanation,
            difficulty: self.difficulty,
        })
    }
}

/// A single multiple-choice question. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    prompt: String,
    options: [String; OPTION_COUNT],
    correct_answer: u8,
    explanation: Option<String>,
    difficulty: Difficulty,
}

impl Question {
    /// Rehydrate a question from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the stored values violate question invariants.
    pub fn from_persisted(
        id: QuestionId,
        prompt: impl Into<String>,
        options: Vec<String>,
        correct_answer: i64,
        explanation: Option<String>,
        difficulty: Difficulty,
    ) -> Result<Self, QuestionError> {
        QuestionDraft {
            prompt: prompt.into(),
            options,
            correct_answer,
            explanation,
            difficulty,
        }
        .validate(id)
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Text of the option at `index`, if it exists.
    #[must_use]
    pub fn option(&self, index: u8) -> Option<&str> {
        self.options.get(usize::from(index)).map(String::as_str)
    }

    #[must_use]
    pub fn correct_answer(&self) -> u8 {
        self.correct_answer
    }

    #[must_use]
    pub fn correct_option(&self) -> &str {
        &self.options[usize::from(self.correct_answer)]
    }

    #[must_use]
    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn is_correct(&self, selected: u8) -> bool {
        selected == self.correct_answer
    }

    #[must_use]
    pub fn is_valid_option(&self, index: u8) -> bool {
        usize::from(index) < OPTION_COUNT
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
