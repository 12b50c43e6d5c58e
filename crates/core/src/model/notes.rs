use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::{NotesId, UserId};

pub const DEFAULT_NOTES_TITLE: &str = "Untitled Notes";
pub const DEFAULT_NOTES_SUBJECT: &str = "General";

const PREVIEW_LINES: usize = 3;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NotesError {
    #[error("lecture notes content cannot be empty")]
    EmptyContent,
}

/// Uploaded lecture notes before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotesDraft {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub content: String,
}

impl NotesDraft {
    /// Normalize the draft, filling in default title and subject.
    ///
    /// # Errors
    ///
    /// Returns `NotesError::EmptyContent` if the content is blank.
    pub fn validate(
        self,
        id: NotesId,
        user_id: UserId,
        uploaded_at: DateTime<Utc>,
    ) -> Result<LectureNotes, NotesError> {
        let content = self.content.trim().to_owned();
        if content.is_empty() {
            return Err(NotesError::EmptyContent);
        }

        Ok(LectureNotes {
            id,
            title: normalize_or(self.title, DEFAULT_NOTES_TITLE),
            subject: normalize_or(self.subject, DEFAULT_NOTES_SUBJECT),
            content,
            uploaded_at,
            user_id,
        })
    }
}

/// Lecture notes a quiz can be generated from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LectureNotes {
    id: NotesId,
    title: String,
    subject: String,
    content: String,
    uploaded_at: DateTime<Utc>,
    user_id: UserId,
}

impl LectureNotes {
    #[must_use]
    pub fn id(&self) -> NotesId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn uploaded_at(&self) -> DateTime<Utc> {
        self.uploaded_at
    }

    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    #[must_use]
    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }

    #[must_use]
    pub fn character_count(&self) -> usize {
        self.content.chars().count()
    }

    /// First few non-blank lines, with `...` appended when more follow.
    #[must_use]
    pub fn preview(&self) -> String {
        let lines: Vec<&str> = self
            .content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .collect();
        let preview = lines
            .iter()
            .take(PREVIEW_LINES)
            .copied()
            .collect::<Vec<_>>()
            .join("\n");
        if lines.len() > PREVIEW_LINES {
            format!("{preview}...")
        } else {
            preview
        }
    }
}

fn normalize_or(value: Option<String>, fallback: &str) -> String {
    value
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
        .unwrap_or_else(|| fallback.to_owned())
}
