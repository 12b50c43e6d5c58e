/// Aggregated view of attempt progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizProgress {
    pub total: usize,
    pub answered: usize,
    pub remaining: usize,
    /// 1-based position of the displayed question.
    pub current: usize,
    pub percent: u8,
    pub is_complete: bool,
}
