use std::sync::Arc;

use quiz_core::model::{LectureNotes, NotesDraft, NotesId, UserId};
use storage::repository::LectureNotesRepository;

use crate::Clock;
use crate::error::NotesServiceError;

/// Upload, lookup and removal of lecture notes.
#[derive(Clone)]
pub struct NotesService {
    clock: Clock,
    notes: Arc<dyn LectureNotesRepository>,
}

impl NotesService {
    #[must_use]
    pub fn new(clock: Clock, notes: Arc<dyn LectureNotesRepository>) -> Self {
        Self { clock, notes }
    }

    /// Normalize an upload, stamp it with the current time, and persist it.
    ///
    /// # Errors
    ///
    /// Returns `NotesServiceError::Invalid` if the content is blank.
    /// Returns `NotesServiceError::Storage` if persistence fails.
    pub async fn save_notes(
        &self,
        draft: NotesDraft,
        user_id: UserId,
    ) -> Result<LectureNotes, NotesServiceError> {
        let notes = draft
            .validate(NotesId::generate(), user_id, self.clock.now())
            .map_err(quiz_core::Error::from)?;
        self.notes.save_notes(&notes).await?;
        tracing::info!(
            notes_id = %notes.id(),
            user_id = %notes.user_id(),
            words = notes.word_count(),
            "notes uploaded"
        );
        Ok(notes)
    }

    /// # Errors
    ///
    /// Returns `NotesServiceError::Storage` if the notes are missing or storage fails.
    pub async fn get_notes(&self, id: NotesId) -> Result<LectureNotes, NotesServiceError> {
        Ok(self.notes.get_notes(id).await?)
    }

    /// Notes uploaded by `user`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `NotesServiceError::Storage` if repository access fails.
    pub async fn list_user_notes(
        &self,
        user: &UserId,
    ) -> Result<Vec<LectureNotes>, NotesServiceError> {
        Ok(self.notes.list_notes_by_user(user).await?)
    }

    /// # Errors
    ///
    /// Returns `NotesServiceError::Storage` if the notes are missing or storage fails.
    pub async fn delete_notes(&self, id: NotesId) -> Result<(), NotesServiceError> {
        self.notes.delete_notes(id).await?;
        tracing::info!(notes_id = %id, "notes deleted");
        Ok(())
    }
}
