//! Turns a finished answer list into a score and per-question review.

use crate::format::ResultTier;
use crate::model::{QuestionId, Quiz, UserAnswer};

/// `round(100 * correct / total)` with halves rounded up; 0 when `total` is 0.
#[must_use]
pub fn score_percent(correct: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let correct = correct.min(total) as u128;
    let total = total as u128;
    let rounded = (200 * correct + total) / (2 * total);
    u8::try_from(rounded.min(100)).unwrap_or(100)
}

/// Side-by-side comparison of what was picked and what was right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionReview {
    pub question_id: QuestionId,
    pub prompt: String,
    pub selected_index: Option<u8>,
    pub selected_text: Option<String>,
    pub correct_index: u8,
    pub correct_text: String,
    pub is_correct: bool,
    pub explanation: Option<String>,
    pub time_spent: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreReport {
    pub score: u8,
    pub correct_count: usize,
    pub total_questions: usize,
    /// Sum of the per-question times.
    pub total_time_spent: u64,
    pub reviews: Vec<QuestionReview>,
}

impl ScoreReport {
    #[must_use]
    pub fn tier(&self) -> ResultTier {
        ResultTier::from_score(self.score)
    }

    #[must_use]
    pub fn incorrect_count(&self) -> usize {
        self.total_questions.saturating_sub(self.correct_count)
    }
}

/// Score an answer list against its quiz.
///
/// Answers are matched to questions by position. Correctness is derived from the
/// question, never from the answer's own flag. A position without an answer is
/// reviewed with no selection and counts as incorrect.
#[must_use]
pub fn score_session(quiz: &Quiz, answers: &[UserAnswer]) -> ScoreReport {
    let reviews: Vec<QuestionReview> = quiz
        .questions()
        .iter()
        .enumerate()
        .map(|(index, question)| {
            let answer = answers.get(index);
            let selected_index = answer.map(|a| a.selected_answer);
            let selected_text = selected_index
                .and_then(|i| question.option(i))
                .map(str::to_owned);
            let is_correct = selected_text.is_some()
                && selected_index.is_some_and(|i| question.is_correct(i));

            QuestionReview {
                question_id: question.id(),
                prompt: question.prompt().to_owned(),
                selected_index,
                selected_text,
                correct_index: question.correct_answer(),
                correct_text: question.correct_option().to_owned(),
                is_correct,
                explanation: question.explanation().map(str::to_owned),
                time_spent: answer.map_or(0, |a| a.time_spent),
            }
        })
        .collect();

    let correct_count = reviews.iter().filter(|r| r.is_correct).count();
    let total_questions = quiz.question_count();

    ScoreReport {
        score: score_percent(correct_count, total_questions),
        correct_count,
        total_questions,
        total_time_spent: reviews.iter().map(|r| r.time_spent).sum(),
        reviews,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Difficulty, QuestionDraft, QuizDraft, QuizId, UserId};
    use crate::time::fixed_now;

    fn quiz(correct: &[i64]) -> Quiz {
        let questions = correct
            .iter()
            .enumerate()
            .map(|(i, c)| {
                QuestionDraft {
                    prompt: format!("Q{i}"),
                    options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
                    correct_answer: *c,
                    explanation: (i == 0).then(|| "because".to_owned()),
                    difficulty: Difficulty::Medium,
                }
                .validate(QuestionId::generate())
                .unwrap()
            })
            .collect();
        QuizDraft {
            title: "Scoring".into(),
            description: String::new(),
            subject: "Math".into(),
            difficulty: Difficulty::Medium,
            questions,
            time_limit_minutes: None,
            created_by: UserId::new("u1"),
        }
        .validate(QuizId::generate(), fixed_now())
        .unwrap()
    }

    fn answers(quiz: &Quiz, picks: &[u8]) -> Vec<UserAnswer> {
        quiz.questions()
            .iter()
            .zip(picks)
            .map(|(q, pick)| UserAnswer::new(q.id(), *pick, q.is_correct(*pick), 5))
            .collect()
    }

    #[test]
    fn score_percent_rounds_half_up() {
        assert_eq!(score_percent(2, 3), 67);
        assert_eq!(score_percent(1, 3), 33);
        assert_eq!(score_percent(1, 8), 13); // 12.5
        assert_eq!(score_percent(3, 8), 38); // 37.5
        assert_eq!(score_percent(0, 5), 0);
        assert_eq!(score_percent(5, 5), 100);
    }

    #[test]
    fn score_percent_handles_degenerate_input() {
        assert_eq!(score_percent(0, 0), 0);
        assert_eq!(score_percent(7, 3), 100);
    }

    #[test]
    fn three_question_example() {
        let quiz = quiz(&[0, 1, 2]);
        let report = score_session(&quiz, &answers(&quiz, &[0, 1, 1]));

        assert_eq!(report.score, 67);
        assert_eq!(report.correct_count, 2);
        assert_eq!(report.incorrect_count(), 1);
        assert_eq!(report.total_time_spent, 15);

        let last = &report.reviews[2];
        assert!(!last.is_correct);
        assert_eq!(last.selected_text.as_deref(), Some("B"));
        assert_eq!(last.correct_text, "C");
        assert_eq!(report.reviews[0].explanation.as_deref(), Some("because"));
        assert_eq!(report.reviews[1].explanation, None);
    }

    #[test]
    fn missing_answers_count_as_incorrect() {
        let quiz = quiz(&[0, 0]);
        let report = score_session(&quiz, &answers(&quiz, &[0]));

        assert_eq!(report.score, 50);
        assert_eq!(report.reviews[1].selected_index, None);
        assert!(!report.reviews[1].is_correct);
    }

    #[test]
    fn scoring_is_idempotent() {
        let quiz = quiz(&[3, 2, 1, 0]);
        let picks = answers(&quiz, &[3, 0, 1, 2]);
        assert_eq!(score_session(&quiz, &picks), score_session(&quiz, &picks));
    }
}
