//! The request/response boundary with the question generator.
//!
//! Only the shapes and their validation live here; the network call belongs to
//! whichever host talks to the generator.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Difficulty, LectureNotes, Question, QuestionDraft, QuestionError, QuestionId};

/// Question counts the generator accepts.
pub const MAX_GENERATED_QUESTIONS: u8 = 20;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GenerationError {
    #[error("source content cannot be empty")]
    EmptyContent,

    #[error("subject cannot be empty")]
    EmptySubject,

    #[error("number of questions must be between 1 and 20, got {0}")]
    InvalidQuestionCount(u8),

    #[error("generator response is not valid JSON: {0}")]
    MalformedResponse(String),

    #[error("generator returned no questions")]
    NoQuestions,

    #[error("generated question {index} is invalid: {source}")]
    InvalidQuestion {
        index: usize,
        #[source]
        source: QuestionError,
    },
}

//
// ─── REQUEST ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequestDraft {
    pub content: String,
    pub subject: String,
    pub difficulty: Difficulty,
    pub number_of_questions: u8,
}

impl GenerationRequestDraft {
    /// # Errors
    ///
    /// Returns `GenerationError` for blank content or subject, or a question
    /// count outside `1..=MAX_GENERATED_QUESTIONS`.
    pub fn validate(self) -> Result<GenerationRequest, GenerationError> {
        let content = self.content.trim().to_owned();
        if content.is_empty() {
            return Err(GenerationError::EmptyContent);
        }
        let subject = self.subject.trim().to_owned();
        if subject.is_empty() {
            return Err(GenerationError::EmptySubject);
        }
        if !(1..=MAX_GENERATED_QUESTIONS).contains(&self.number_of_questions) {
            return Err(GenerationError::InvalidQuestionCount(self.number_of_questions));
        }

        Ok(GenerationRequest {
            content,
            subject,
            difficulty: self.difficulty,
            number_of_questions: self.number_of_questions,
        })
    }
}

/// Validated payload sent to the generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    content: String,
    subject: String,
    difficulty: Difficulty,
    number_of_questions: u8,
}

impl GenerationRequest {
    /// Build a request from uploaded notes.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::InvalidQuestionCount` for an out-of-range count.
    pub fn from_notes(
        notes: &LectureNotes,
        difficulty: Difficulty,
        number_of_questions: u8,
    ) -> Result<Self, GenerationError> {
        GenerationRequestDraft {
            content: notes.content().to_owned(),
            subject: notes.subject().to_owned(),
            difficulty,
            number_of_questions,
        }
        .validate()
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
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
    pub fn number_of_questions(&self) -> u8 {
        self.number_of_questions
    }
}

//
// ─── RESPONSE ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
struct GeneratedQuiz {
    questions: Vec<GeneratedQuestion>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeneratedQuestion {
    question: String,
    options: Vec<String>,
    correct_answer: i64,
    #[serde(default)]
    explanation: Option<String>,
    #[serde(default)]
    difficulty: Option<String>,
}

/// Parse and validate a generator response.
///
/// Each question gets a fresh id. Questions without a difficulty inherit
/// `fallback_difficulty`.
///
/// # Errors
///
/// Returns `GenerationError` if the JSON does not have the expected shape, the
/// list is empty, or any question fails validation (with its position).
pub fn parse_generated_questions(
    json: &str,
    fallback_difficulty: Difficulty,
) -> Result<Vec<Question>, GenerationError> {
    let response: GeneratedQuiz = serde_json::from_str(json)
        .map_err(|err| GenerationError::MalformedResponse(err.to_string()))?;

    if response.questions.is_empty() {
        return Err(GenerationError::NoQuestions);
    }

    response
        .questions
        .into_iter()
        .enumerate()
        .map(|(index, raw)| {
            to_question(raw, fallback_difficulty)
                .map_err(|source| GenerationError::InvalidQuestion { index, source })
        })
        .collect()
}

fn to_question(raw: GeneratedQuestion, fallback: Difficulty) -> Result<Question, QuestionError> {
    let difficulty = match raw.difficulty.as_deref() {
        Some(tag) => tag.parse()?,
        None => fallback,
    };

    QuestionDraft {
        prompt: raw.question,
        options: raw.options,
        correct_answer: raw.correct_answer,
        explanation: raw.explanation,
        difficulty,
    }
    .validate(QuestionId::generate())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NotesDraft, NotesId, UserId};
    use crate::time::fixed_now;

    const RESPONSE: &str = r#"{
        "questions": [
            {
                "question": "What does ATP stand for?",
                "options": ["Adenosine triphosphate", "Amino tri-peptide", "Acid transfer protein", "None"],
                "correctAnswer": 0,
                "explanation": "ATP is the energy currency of the cell.",
                "difficulty": "Hard"
            },
            {
                "question": "Where is ATP produced?",
                "options": ["Nucleus", "Mitochondria", "Ribosome", "Golgi"],
                "correctAnswer": 1
            }
        ]
    }"#;

    #[test]
    fn parses_questions_and_fills_difficulty() {
        let questions = parse_generated_questions(RESPONSE, Difficulty::Easy).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].difficulty(), Difficulty::Hard);
        assert_eq!(questions[1].difficulty(), Difficulty::Easy);
        assert_eq!(questions[1].correct_option(), "Mitochondria");
        assert_eq!(questions[1].explanation(), None);
        assert_ne!(questions[0].id(), questions[1].id());
    }

    #[test]
    fn reports_position_of_invalid_question() {
        let json = r#"{"questions": [
            {"question": "ok", "options": ["a","b","c","d"], "correctAnswer": 3},
            {"question": "bad", "options": ["a","b","c"], "correctAnswer": 0}
        ]}"#;
        let err = parse_generated_questions(json, Difficulty::Medium).unwrap_err();
        assert_eq!(
            err,
            GenerationError::InvalidQuestion {
                index: 1,
                source: QuestionError::WrongOptionCount { len: 3 },
            }
        );
    }

    #[test]
    fn rejects_out_of_range_answer_and_unknown_difficulty() {
        let json = r#"{"questions": [
            {"question": "q", "options": ["a","b","c","d"], "correctAnswer": 4}
        ]}"#;
        assert!(matches!(
            parse_generated_questions(json, Difficulty::Medium),
            Err(GenerationError::InvalidQuestion { index: 0, .. })
        ));

        let json = r#"{"questions": [
            {"question": "q", "options": ["a","b","c","d"], "correctAnswer": 0, "difficulty": "brutal"}
        ]}"#;
        assert!(matches!(
            parse_generated_questions(json, Difficulty::Medium),
            Err(GenerationError::InvalidQuestion {
                source: QuestionError::UnknownDifficulty(_),
                ..
            })
        ));
    }

    #[test]
    fn rejects_empty_and_malformed_responses() {
        assert_eq!(
            parse_generated_questions(r#"{"questions": []}"#, Difficulty::Medium).unwrap_err(),
            GenerationError::NoQuestions
        );
        assert!(matches!(
            parse_generated_questions("not json", Difficulty::Medium),
            Err(GenerationError::MalformedResponse(_))
        ));
    }

    #[test]
    fn request_validation() {
        let draft = GenerationRequestDraft {
            content: " notes ".into(),
            subject: "Bio".into(),
            difficulty: Difficulty::Medium,
            number_of_questions: 10,
        };
        let request = draft.clone().validate().unwrap();
        assert_eq!(request.content(), "notes");

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["numberOfQuestions"], 10);
        assert_eq!(json["difficulty"], "medium");

        for bad in [0, 21] {
            let err = GenerationRequestDraft {
                number_of_questions: bad,
                ..draft.clone()
            }
            .validate()
            .unwrap_err();
            assert_eq!(err, GenerationError::InvalidQuestionCount(bad));
        }
        let err = GenerationRequestDraft {
            subject: " ".into(),
            ..draft
        }
        .validate()
        .unwrap_err();
        assert_eq!(err, GenerationError::EmptySubject);
    }

    #[test]
    fn request_from_notes_uses_normalized_subject() {
        let notes = NotesDraft {
            content: "Photosynthesis converts light.".into(),
            ..NotesDraft::default()
        }
        .validate(NotesId::generate(), UserId::new("u1"), fixed_now())
        .unwrap();
        let request = GenerationRequest::from_notes(&notes, Difficulty::Easy, 5).unwrap();
        assert_eq!(request.subject(), "General");
        assert_eq!(request.number_of_questions(), 5);
    }
}
