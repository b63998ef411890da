//! Presentation-agnostic view-models emitted by `ProgressEngine`.
//!
//! The rendering layer decides how marks, labels and percentages look; these
//! types only carry what changed.

use quiz_core::model::{OptionLabel, QuestionRecord, Score, Serial, UnitId};
use quiz_core::traversal::Traversal;

/// How an option should be highlighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionMark {
    Neutral,
    Correct,
    Incorrect,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionView {
    pub label: OptionLabel,
    pub text: String,
    pub selected: bool,
    pub mark: OptionMark,
    /// Set once the question is locked.
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerFeedback {
    pub is_correct: bool,
    pub correct_label: OptionLabel,
    pub correct_text: String,
    /// A wrong answer may still be replaced.
    pub can_retry: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuestionView {
    pub unit: UnitId,
    pub title: String,
    /// 1-based.
    pub position: usize,
    pub total: usize,
    /// Fraction of the unit reached, in `0.0..=1.0`.
    pub progress: f32,
    pub serial: Serial,
    pub prompt: String,
    pub options: Vec<OptionView>,
    pub answered: usize,
    pub is_first: bool,
    pub is_last: bool,
    pub next_label: &'static str,
    pub feedback: Option<AnswerFeedback>,
}

impl QuestionView {
    #[must_use]
    pub fn build(unit: UnitId, traversal: &Traversal) -> Self {
        let question = traversal.current_question();
        let selected = traversal.answer_for(question.serial());
        let locked = traversal.is_locked(question);
        let position = traversal.current_index() + 1;
        let total = traversal.len();

        let options = OptionLabel::ALL
            .iter()
            .map(|&label| {
                let is_selected = selected == Some(label);
                let mark = match (is_selected, question.is_correct(label)) {
                    (false, _) => OptionMark::Neutral,
                    (true, true) => OptionMark::Correct,
                    (true, false) => OptionMark::Incorrect,
                };
                OptionView {
                    label,
                    text: question.option_text(label).to_owned(),
                    selected: is_selected,
                    mark,
                    disabled: locked,
                }
            })
            .collect();

        Self {
            unit,
            title: unit.title(),
            position,
            total,
            progress: fraction(position, total),
            serial: question.serial(),
            prompt: question.prompt().to_owned(),
            options,
            answered: traversal.answers().len(),
            is_first: traversal.is_first(),
            is_last: traversal.is_last(),
            next_label: if traversal.is_last() { "Finish" } else { "Next" },
            feedback: selected.map(|label| feedback_for(question, label)),
        }
    }
}

fn feedback_for(question: &QuestionRecord, label: OptionLabel) -> AnswerFeedback {
    let is_correct = question.is_correct(label);
    AnswerFeedback {
        is_correct,
        correct_label: question.correct(),
        correct_text: question.correct_text().to_owned(),
        can_retry: !is_correct,
    }
}

#[allow(clippy::cast_precision_loss)]
fn fraction(part: usize, whole: usize) -> f32 {
    if whole == 0 {
        return 0.0;
    }
    part as f32 / whole as f32
}

/// One row of the results review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewItem {
    pub position: usize,
    pub serial: Serial,
    pub prompt: String,
    pub user_answer: Option<OptionLabel>,
    pub user_answer_text: Option<String>,
    pub correct_answer: OptionLabel,
    pub correct_answer_text: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionView {
    pub unit: UnitId,
    pub title: String,
    pub score: Score,
    pub percentage: u32,
    pub review: Vec<ReviewItem>,
}

impl CompletionView {
    /// Uses the stored score when present, otherwise tallies the answers.
    #[must_use]
    pub fn build(unit: UnitId, traversal: &Traversal) -> Self {
        let score = traversal
            .score()
            .unwrap_or_else(|| traversal.compute_score());
        let review = traversal
            .questions()
            .iter()
            .enumerate()
            .map(|(index, question)| {
                let user_answer = traversal.answer_for(question.serial());
                ReviewItem {
                    position: index + 1,
                    serial: question.serial(),
                    prompt: question.prompt().to_owned(),
                    user_answer,
                    user_answer_text: user_answer
                        .map(|label| question.option_text(label).to_owned()),
                    correct_answer: question.correct(),
                    correct_answer_text: question.correct_text().to_owned(),
                    is_correct: user_answer.is_some_and(|label| question.is_correct(label)),
                }
            })
            .collect();

        Self {
            unit,
            title: unit.title(),
            score,
            percentage: score.percentage(),
            review,
        }
    }
}

/// What the rendering layer should show for an engine.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineView {
    Question(QuestionView),
    Completed(CompletionView),
}

impl EngineView {
    #[must_use]
    pub fn build(unit: UnitId, traversal: &Traversal) -> Self {
        if traversal.is_complete() {
            Self::Completed(CompletionView::build(unit, traversal))
        } else {
            Self::Question(QuestionView::build(unit, traversal))
        }
    }
}
