use chrono::{DateTime, Utc};
use std::fmt;

use quiz_core::format::progress_percent;
use quiz_core::model::{Question, Quiz, QuizSession, SessionError, SessionId, UserAnswer, UserId};
use quiz_core::scoring::{ScoreReport, score_session};
use quiz_core::time::whole_seconds_between;

use super::progress::QuizProgress;

//
// ─── OUTCOMES ──────────────────────────────────────────────────────────────────
//

/// What an `advance` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Nothing selected, or the attempt is already over.
    Ignored,
    /// Answer recorded; now showing the question at `index`.
    Moved { index: usize },
    /// Last answer recorded; the attempt is complete.
    Finished,
}

#[derive(Debug, Clone)]
struct Completed {
    session: QuizSession,
    report: ScoreReport,
}

//
// ─── NAVIGATOR ─────────────────────────────────────────────────────────────────
//

/// In-memory traversal of one quiz attempt.
///
/// Questions are answered in order; earlier answers can be revisited with
/// `go_back` and overwritten by re-advancing. Invalid transitions are no-ops
/// reported through return values. The elapsed-time counter is driven by the
/// caller (`tick`, `tick_by`, `sync_elapsed`); every transition that needs the
/// current time takes it as an argument.
pub struct QuizNavigator {
    quiz: Quiz,
    user_id: UserId,
    started_at: DateTime<Utc>,
    current: usize,
    answers: Vec<Option<UserAnswer>>,
    selected: Option<u8>,
    shown_at: DateTime<Utc>,
    elapsed_secs: u64,
    completed: Option<Completed>,
    session_id: Option<SessionId>,
}

impl QuizNavigator {
    /// Begin an attempt with the first question displayed at `started_at`.
    #[must_use]
    pub fn new(quiz: Quiz, user_id: UserId, started_at: DateTime<Utc>) -> Self {
        let answers = vec![None; quiz.question_count()];
        Self {
            quiz,
            user_id,
            started_at,
            current: 0,
            answers,
            selected: None,
            shown_at: started_at,
            elapsed_secs: 0,
            completed: None,
            session_id: None,
        }
    }

    #[must_use]
    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The displayed question; `None` once the attempt is complete.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        if self.is_complete() {
            None
        } else {
            self.quiz.question(self.current)
        }
    }

    /// The in-progress pick for the displayed question.
    #[must_use]
    pub fn selected(&self) -> Option<u8> {
        self.selected
    }

    /// Recorded answer at a question position.
    #[must_use]
    pub fn answer_at(&self, index: usize) -> Option<&UserAnswer> {
        self.answers.get(index).and_then(Option::as_ref)
    }

    /// Recorded answers in question order, skipping positions not answered yet.
    pub fn recorded_answers(&self) -> impl Iterator<Item = &UserAnswer> {
        self.answers.iter().flatten()
    }

    #[must_use]
    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed.is_some()
    }

    /// The finished session, once complete.
    #[must_use]
    pub fn session(&self) -> Option<&QuizSession> {
        self.completed.as_ref().map(|c| &c.session)
    }

    /// Score and per-question review, once complete.
    #[must_use]
    pub fn report(&self) -> Option<&ScoreReport> {
        self.completed.as_ref().map(|c| &c.report)
    }

    #[must_use]
    pub fn session_id(&self) -> Option<SessionId> {
        self.session_id
    }

    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        let total = self.quiz.question_count();
        let answered = self.answers.iter().filter(|a| a.is_some()).count();
        QuizProgress {
            total,
            answered,
            remaining: total.saturating_sub(answered),
            current: (self.current + 1).min(total),
            percent: progress_percent(self.current, total),
            is_complete: self.is_complete(),
        }
    }

    /// Seconds left under the quiz time limit, if it has one.
    ///
    /// The limit is advisory; running out never ends the attempt.
    #[must_use]
    pub fn remaining_seconds(&self) -> Option<u64> {
        self.quiz
            .time_limit_secs()
            .map(|limit| limit.saturating_sub(self.elapsed_secs))
    }

    #[must_use]
    pub fn is_over_time(&self) -> bool {
        self.quiz
            .time_limit_secs()
            .is_some_and(|limit| self.elapsed_secs >= limit)
    }

    //
    // ─── TIMER ─────────────────────────────────────────────────────────────
    //

    pub fn tick(&mut self) {
        self.tick_by(1);
    }

    pub fn tick_by(&mut self, secs: u64) {
        if !self.is_complete() {
            self.elapsed_secs = self.elapsed_secs.saturating_add(secs);
        }
    }

    /// Raise the elapsed counter to the wall-clock time since the start. Never lowers it.
    pub fn sync_elapsed(&mut self, now: DateTime<Utc>) {
        if !self.is_complete() {
            self.elapsed_secs = self
                .elapsed_secs
                .max(whole_seconds_between(self.started_at, now));
        }
    }

    //
    // ─── TRANSITIONS ───────────────────────────────────────────────────────
    //

    /// Pick an option for the displayed question. Can be called repeatedly.
    ///
    /// Returns `false` if the attempt is complete or the option does not exist.
    pub fn select(&mut self, option: u8) -> bool {
        let valid = self
            .current_question()
            .is_some_and(|question| question.is_valid_option(option));
        if valid {
            self.selected = Some(option);
        }
        valid
    }

    /// Return to the previous question, restoring its recorded pick.
    ///
    /// Returns `false` on the first question or after completion.
    pub fn go_back(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_complete() || self.current == 0 {
            return false;
        }
        self.current -= 1;
        self.selected = self.answer_at(self.current).map(|a| a.selected_answer);
        self.shown_at = now;
        true
    }

    /// Record the current pick and move on, finishing after the last question.
    ///
    /// The next question always starts without a pick, even if it was answered
    /// before a `go_back`. The recorded time is the whole seconds since the
    /// question was last shown, replacing any earlier answer at that position.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the recorded answers cannot form a session.
    /// Traversal rules keep the answers aligned with the quiz, so this only
    /// surfaces broken invariants.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Result<AdvanceOutcome, SessionError> {
        if self.is_complete() {
            return Ok(AdvanceOutcome::Ignored);
        }
        let Some(selected) = self.selected else {
            return Ok(AdvanceOutcome::Ignored);
        };
        let Some(question) = self.quiz.question(self.current) else {
            return Ok(AdvanceOutcome::Ignored);
        };

        let answer = UserAnswer::new(
            question.id(),
            selected,
            question.is_correct(selected),
            whole_seconds_between(self.shown_at, now),
        );
        self.answers[self.current] = Some(answer);

        let next = self.current + 1;
        if next < self.quiz.question_count() {
            self.current = next;
            self.selected = None;
            self.shown_at = now;
            return Ok(AdvanceOutcome::Moved { index: next });
        }

        self.finish(now)?;
        Ok(AdvanceOutcome::Finished)
    }

    fn finish(&mut self, now: DateTime<Utc>) -> Result<(), SessionError> {
        self.sync_elapsed(now);
        let answers: Vec<UserAnswer> = self.recorded_answers().cloned().collect();
        let report = score_session(&self.quiz, &answers);
        let session = QuizSession::from_completed(
            self.quiz.clone(),
            self.user_id.clone(),
            answers,
            self.elapsed_secs,
            now,
        )?;
        self.selected = None;
        self.completed = Some(Completed { session, report });
        Ok(())
    }

    /// Attach the id the store assigned. Only the first id sticks.
    pub(crate) fn set_session_id(&mut self, id: SessionId) -> bool {
        if self.session_id.is_some() || !self.is_complete() {
            return false;
        }
        self.session_id = Some(id);
        true
    }
}

impl fmt::Debug for QuizNavigator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizNavigator")
            .field("quiz_id", &self.quiz.id())
            .field("user_id", &self.user_id)
            .field("current", &self.current)
            .field("selected", &self.selected)
            .field("elapsed_secs", &self.elapsed_secs)
            .field("is_complete", &self.is_complete())
            .field("session_id", &self.session_id)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
