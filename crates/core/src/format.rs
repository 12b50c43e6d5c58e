//! Presentation-agnostic formatting helpers shared by hosts.

use chrono::{DateTime, Utc};

/// Outcome band used to pick the result badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultTier {
    Excellent,
    Passed,
    NeedsWork,
}

impl ResultTier {
    #[must_use]
    pub fn from_score(score: u8) -> Self {
        match score {
            80.. => ResultTier::Excellent,
            60..=79 => ResultTier::Passed,
            _ => ResultTier::NeedsWork,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ResultTier::Excellent => "excellent",
            ResultTier::Passed => "passed",
            ResultTier::NeedsWork => "needs_work",
        }
    }
}

/// `m:ss` timer text.
#[must_use]
pub fn format_clock(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Total study time: `0m`, `42m`, or `3h 5m`.
#[must_use]
pub fn format_study_time(seconds: u64) -> String {
    let minutes = seconds / 60;
    let hours = minutes / 60;
    if hours > 0 {
        format!("{hours}h {}m", minutes % 60)
    } else {
        format!("{minutes}m")
    }
}

/// Percentage of the quiz reached when showing the question at `index`.
#[must_use]
pub fn progress_percent(index: usize, total: usize) -> u8 {
    crate::scoring::score_percent(index.saturating_add(1).min(total), total)
}

#[must_use]
pub fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339()
}
