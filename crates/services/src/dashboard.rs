use std::sync::Arc;

use quiz_core::dashboard::{QuizStats, SubjectAverage, aggregate, subject_averages};
use quiz_core::model::{DashboardSettings, QuizSession, UserId};
use storage::repository::{QuizSessionRepository, QuizSessionRow};

use crate::error::DashboardError;

/// Reads a user's history and turns it into dashboard statistics.
#[derive(Clone)]
pub struct DashboardService {
    sessions: Arc<dyn QuizSessionRepository>,
    settings: DashboardSettings,
}

impl DashboardService {
    #[must_use]
    pub fn new(sessions: Arc<dyn QuizSessionRepository>, settings: DashboardSettings) -> Self {
        Self { sessions, settings }
    }

    #[must_use]
    pub fn settings(&self) -> &DashboardSettings {
        &self.settings
    }

    /// Statistics over the user's newest sessions, up to the history limit.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::Storage` if sessions cannot be loaded.
    pub async fn stats(&self, user: &UserId) -> Result<QuizStats, DashboardError> {
        let sessions = self.history(user).await?;
        let stats = aggregate(&sessions, &self.settings);
        tracing::debug!(
            user_id = %user,
            sessions = stats.total_quizzes,
            average = stats.average_score,
            "dashboard stats computed"
        );
        Ok(stats)
    }

    /// Per-subject means over the same history as [`stats`](Self::stats).
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::Storage` if sessions cannot be loaded.
    pub async fn subject_breakdown(
        &self,
        user: &UserId,
    ) -> Result<Vec<SubjectAverage>, DashboardError> {
        let sessions = self.history(user).await?;
        Ok(subject_averages(&sessions, &self.settings))
    }

    /// The newest `limit` sessions, for the history list.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::Storage` if sessions cannot be loaded.
    pub async fn recent_sessions(
        &self,
        user: &UserId,
        limit: usize,
    ) -> Result<Vec<QuizSessionRow>, DashboardError> {
        Ok(self.sessions.list_sessions_by_user(user, limit).await?)
    }

    async fn history(&self, user: &UserId) -> Result<Vec<QuizSession>, DashboardError> {
        let rows = self
            .sessions
            .list_sessions_by_user(user, self.settings.history_limit())
            .await?;
        Ok(rows.into_iter().map(|row| row.session).collect())
    }
}
