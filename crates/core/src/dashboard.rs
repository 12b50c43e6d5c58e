//! Summary statistics over a user's completed sessions.
//!
//! Everything here is recomputed from scratch on each call. Sessions arrive
//! already sanitized, so the aggregation never has to guard against bad numbers.

use serde::Serialize;

use crate::model::{DashboardSettings, QuizSession};

/// Dashboard card values. Serializes with the camelCase keys hosts expect.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizStats {
    pub total_quizzes: usize,
    pub average_score: f64,
    pub total_time_spent: u64,
    pub recent_performance: Vec<u8>,
    pub strongest_subjects: Vec<String>,
    pub weakest_subjects: Vec<String>,
}

/// Mean score of every session sharing a subject.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectAverage {
    pub subject: String,
    pub average_score: f64,
    pub sessions: usize,
}

/// Per-subject means, best first.
///
/// Subjects are grouped in order of first appearance and then stable-sorted, so
/// equal means keep that order. Sessions without a subject fall under the
/// configured unknown label unless the settings exclude them.
#[must_use]
pub fn subject_averages(
    sessions: &[QuizSession],
    settings: &DashboardSettings,
) -> Vec<SubjectAverage> {
    let mut groups: Vec<(String, u64, usize)> = Vec::new();

    for session in sessions {
        let subject = match session.subject() {
            Some(subject) => subject,
            None if settings.include_unknown_subject() => settings.unknown_subject(),
            None => continue,
        };

        match groups.iter_mut().find(|(name, _, _)| name == subject) {
            Some((_, sum, count)) => {
                *sum += u64::from(session.score());
                *count += 1;
            }
            None => groups.push((subject.to_owned(), u64::from(session.score()), 1)),
        }
    }

    let mut averages: Vec<SubjectAverage> = groups
        .into_iter()
        .map(|(subject, sum, count)| SubjectAverage {
            subject,
            average_score: mean(sum, count),
            sessions: count,
        })
        .collect();

    averages.sort_by(|a, b| b.average_score.total_cmp(&a.average_score));
    averages
}

/// Aggregate sessions into dashboard statistics.
///
/// `sessions` is expected newest first; only `recent_performance` depends on
/// that order, as a plain prefix of the input.
#[must_use]
pub fn aggregate(sessions: &[QuizSession], settings: &DashboardSettings) -> QuizStats {
    if sessions.is_empty() {
        return QuizStats::default();
    }

    let score_sum: u64 = sessions.iter().map(|s| u64::from(s.score())).sum();
    let ranked = subject_averages(sessions, settings);
    let take = settings.subject_ranking();

    QuizStats {
        total_quizzes: sessions.len(),
        average_score: mean(score_sum, sessions.len()),
        total_time_spent: sessions.iter().map(QuizSession::time_spent).sum(),
        recent_performance: sessions
            .iter()
            .take(settings.recent_window())
            .map(QuizSession::score)
            .collect(),
        strongest_subjects: ranked.iter().take(take).map(|s| s.subject.clone()).collect(),
        weakest_subjects: ranked
            .iter()
            .rev()
            .take(take)
            .map(|s| s.subject.clone())
            .collect(),
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean(sum: u64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}
