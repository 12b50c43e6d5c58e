use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("recent performance window must be > 0")]
    InvalidRecentWindow,

    #[error("subject ranking size must be > 0")]
    InvalidSubjectRanking,

    #[error("history limit must be > 0")]
    InvalidHistoryLimit,

    #[error("unknown subject label cannot be empty")]
    EmptyUnknownLabel,
}

/// Knobs for the dashboard statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSettings {
    recent_window: usize,
    subject_ranking: usize,
    history_limit: usize,
    unknown_subject: String,
    include_unknown_subject: bool,
}

impl DashboardSettings {
    /// Creates custom dashboard settings.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if any size is zero or the unknown label is blank.
    pub fn new(
        recent_window: usize,
        subject_ranking: usize,
        history_limit: usize,
        unknown_subject: impl Into<String>,
        include_unknown_subject: bool,
    ) -> Result<Self, SettingsError> {
        if recent_window == 0 {
            return Err(SettingsError::InvalidRecentWindow);
        }
        if subject_ranking == 0 {
            return Err(SettingsError::InvalidSubjectRanking);
        }
        if history_limit == 0 {
            return Err(SettingsError::InvalidHistoryLimit);
        }
        let unknown_subject = unknown_subject.into().trim().to_owned();
        if unknown_subject.is_empty() {
            return Err(SettingsError::EmptyUnknownLabel);
        }

        Ok(Self {
            recent_window,
            subject_ranking,
            history_limit,
            unknown_subject,
            include_unknown_subject,
        })
    }

    #[must_use]
    pub fn with_include_unknown_subject(mut self, include: bool) -> Self {
        self.include_unknown_subject = include;
        self
    }

    /// How many of the newest scores feed `recent_performance`.
    #[must_use]
    pub fn recent_window(&self) -> usize {
        self.recent_window
    }

    /// How many subjects are listed as strongest / weakest.
    #[must_use]
    pub fn subject_ranking(&self) -> usize {
        self.subject_ranking
    }

    /// Maximum number of sessions fetched for the dashboard.
    #[must_use]
    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    #[must_use]
    pub fn unknown_subject(&self) -> &str {
        &self.unknown_subject
    }

    #[must_use]
    pub fn include_unknown_subject(&self) -> bool {
        self.include_unknown_subject
    }
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            recent_window: 10,
            subject_ranking: 3,
            history_limit: 20,
            unknown_subject: "Unknown".to_owned(),
            include_unknown_subject: true,
        }
    }
}
