//! In-memory progress state machine for one set or test.
//!
//! `NotStarted -> InProgress -> Completed`; `Completed` only leaves through
//! [`Traversal::reset`]. Answering follows the strict policy: a wrong choice
//! may be replaced, a correct choice locks the question. Moving back never
//! discards answers.

use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

use crate::model::{
    AnswerRecord, OptionLabel, ProgressSnapshot, ProgressStatus, QuestionRecord, Score, Serial,
};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TraversalError {
    #[error("no questions to traverse")]
    EmptySubset,

    #[error("unit already completed")]
    Completed,

    #[error("question {serial} is already answered correctly")]
    AnswerLocked { serial: Serial },
}

//
// ─── OUTCOMES ──────────────────────────────────────────────────────────────────
//

/// Immediate feedback for one answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub serial: Serial,
    pub selected: OptionLabel,
    pub correct: OptionLabel,
    pub is_correct: bool,
}

/// Result of a forward step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOutcome {
    pub finished: bool,
    pub index: usize,
}

//
// ─── TRAVERSAL ─────────────────────────────────────────────────────────────────
//

#[derive(Clone)]
pub struct Traversal {
    questions: Vec<QuestionRecord>,
    current: usize,
    answers: AnswerRecord,
    status: ProgressStatus,
    score: Option<Score>,
}

#[allow(clippy::len_without_is_empty)]
impl Traversal {
    /// Start a fresh traversal.
    ///
    /// # Errors
    ///
    /// Returns `TraversalError::EmptySubset` if `questions` is empty.
    pub fn new(questions: Vec<QuestionRecord>) -> Result<Self, TraversalError> {
        if questions.is_empty() {
            return Err(TraversalError::EmptySubset);
        }
        Ok(Self {
            questions,
            current: 0,
            answers: AnswerRecord::new(),
            status: ProgressStatus::NotStarted,
            score: None,
        })
    }

    /// Rebuild a traversal from a persisted snapshot.
    ///
    /// Answers for serials outside `questions` are dropped and the index is
    /// clamped into range, so a stale snapshot can never point past the subset.
    ///
    /// # Errors
    ///
    /// Returns `TraversalError::EmptySubset` if `questions` is empty.
    pub fn restore(
        questions: Vec<QuestionRecord>,
        snapshot: Option<&ProgressSnapshot>,
    ) -> Result<Self, TraversalError> {
        let mut traversal = Self::new(questions)?;
        let Some(snapshot) = snapshot else {
            return Ok(traversal);
        };

        traversal.answers = snapshot
            .answers()
            .iter()
            .filter(|(serial, _)| traversal.position_of(**serial).is_some())
            .map(|(serial, label)| (*serial, *label))
            .collect();
        traversal.current = snapshot.current_index().min(traversal.last_index());
        traversal.status = snapshot.status();
        traversal.score = snapshot.score();
        Ok(traversal)
    }

    #[must_use]
    pub fn questions(&self) -> &[QuestionRecord] {
        &self.questions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> &QuestionRecord {
        &self.questions[self.current]
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerRecord {
        &self.answers
    }

    #[must_use]
    pub fn answer_for(&self, serial: Serial) -> Option<OptionLabel> {
        self.answers.get(&serial).copied()
    }

    #[must_use]
    pub fn status(&self) -> ProgressStatus {
        self.status
    }

    #[must_use]
    pub fn score(&self) -> Option<Score> {
        self.score
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.status == ProgressStatus::Completed
    }

    #[must_use]
    pub fn is_first(&self) -> bool {
        self.current == 0
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.current == self.last_index()
    }

    /// True once `question` holds its correct answer.
    #[must_use]
    pub fn is_locked(&self, question: &QuestionRecord) -> bool {
        self.answer_for(question.serial()) == Some(question.correct())
    }

    /// Record `label` for the current question.
    ///
    /// # Errors
    ///
    /// Returns `TraversalError::Completed` after completion and
    /// `TraversalError::AnswerLocked` once the question was answered correctly.
    pub fn answer(&mut self, label: OptionLabel) -> Result<AnswerOutcome, TraversalError> {
        self.ensure_open()?;
        let question = &self.questions[self.current];
        let serial = question.serial();
        if self.is_locked(question) {
            return Err(TraversalError::AnswerLocked { serial });
        }

        let outcome = AnswerOutcome {
            serial,
            selected: label,
            correct: question.correct(),
            is_correct: question.is_correct(label),
        };
        self.answers.insert(serial, label);
        self.status = ProgressStatus::InProgress;
        Ok(outcome)
    }

    /// Advance one question, or finish and score on the last one.
    ///
    /// An answer is not required before advancing.
    ///
    /// # Errors
    ///
    /// Returns `TraversalError::Completed` after completion.
    pub fn next(&mut self) -> Result<StepOutcome, TraversalError> {
        self.ensure_open()?;
        if self.is_last() {
            self.score = Some(self.compute_score());
            self.status = ProgressStatus::Completed;
            return Ok(StepOutcome {
                finished: true,
                index: self.current,
            });
        }
        self.current += 1;
        self.status = ProgressStatus::InProgress;
        Ok(StepOutcome {
            finished: false,
            index: self.current,
        })
    }

    /// Step back one question. Returns `false` (and changes nothing) on the
    /// first question.
    ///
    /// # Errors
    ///
    /// Returns `TraversalError::Completed` after completion.
    pub fn previous(&mut self) -> Result<bool, TraversalError> {
        self.ensure_open()?;
        if self.current == 0 {
            return Ok(false);
        }
        self.current -= 1;
        self.status = ProgressStatus::InProgress;
        Ok(true)
    }

    /// Tally the current answers against the subset.
    #[must_use]
    pub fn compute_score(&self) -> Score {
        let mut correct = 0_u32;
        let mut incorrect = 0_u32;
        for question in &self.questions {
            match self.answer_for(question.serial()) {
                Some(label) if question.is_correct(label) => correct += 1,
                Some(_) => incorrect += 1,
                None => {}
            }
        }
        let total = u32::try_from(self.questions.len()).unwrap_or(u32::MAX);
        Score::tallied(correct, incorrect, total)
    }

    /// Back to `NotStarted` with no answers.
    pub fn reset(&mut self) {
        self.current = 0;
        self.answers.clear();
        self.status = ProgressStatus::NotStarted;
        self.score = None;
    }

    /// Snapshot of the current state stamped with `now`.
    #[must_use]
    pub fn snapshot(&self, now: DateTime<Utc>) -> ProgressSnapshot {
        ProgressSnapshot::from_parts(
            self.status,
            self.current,
            self.answers.clone(),
            now,
            self.score,
        )
    }

    fn ensure_open(&self) -> Result<(), TraversalError> {
        if self.is_complete() {
            return Err(TraversalError::Completed);
        }
        Ok(())
    }

    fn last_index(&self) -> usize {
        self.questions.len().saturating_sub(1)
    }

    fn position_of(&self, serial: Serial) -> Option<usize> {
        self.questions.iter().position(|q| q.serial() == serial)
    }
}

impl fmt::Debug for Traversal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Traversal")
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("answers_len", &self.answers.len())
            .field("status", &self.status)
            .field("score", &self.score)
            .finish()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    // Correct answers cycle A, B, C, D by serial.
    fn question(serial: u32) -> QuestionRecord {
        let correct = OptionLabel::from_index(((serial - 1) % 4) as usize).unwrap();
        QuestionRecord::new(
            Serial::new(serial),
            format!("Q{serial}"),
            ["a".into(), "b".into(), "c".into(), "d".into()],
            correct,
        )
        .unwrap()
    }

    fn traversal(n: u32) -> Traversal {
        Traversal::new((1..=n).map(question).collect()).unwrap()
    }

    fn wrong(label: OptionLabel) -> OptionLabel {
        OptionLabel::from_index((label.index() + 1) % 4).unwrap()
    }

    #[test]
    fn empty_subset_is_rejected() {
        assert_eq!(
            Traversal::new(Vec::new()).unwrap_err(),
            TraversalError::EmptySubset
        );
    }

    #[test]
    fn first_answer_moves_to_in_progress() {
        let mut t = traversal(3);
        assert_eq!(t.status(), ProgressStatus::NotStarted);
        let outcome = t.answer(OptionLabel::A).unwrap();
        assert!(outcome.is_correct);
        assert!(t.is_locked(t.current_question()));
        assert_eq!(t.status(), ProgressStatus::InProgress);
    }

    #[test]
    fn wrong_answer_can_be_replaced_until_correct() {
        let mut t = traversal(2);
        let first = t.answer(OptionLabel::C).unwrap();
        assert!(!first.is_correct);
        assert_eq!(first.correct, OptionLabel::A);

        let second = t.answer(OptionLabel::A).unwrap();
        assert!(second.is_correct);

        let err = t.answer(OptionLabel::B).unwrap_err();
        assert_eq!(err, TraversalError::AnswerLocked { serial: Serial::new(1) });
        assert_eq!(t.answer_for(Serial::new(1)), Some(OptionLabel::A));
    }

    #[test]
    fn going_back_keeps_answers() {
        let mut t = traversal(3);
        t.next().unwrap();
        t.answer(OptionLabel::D).unwrap();
        assert!(t.previous().unwrap());
        assert_eq!(t.current_index(), 0);
        assert_eq!(t.answer_for(Serial::new(2)), Some(OptionLabel::D));
    }

    #[test]
    fn previous_on_first_question_is_noop() {
        let mut t = traversal(3);
        assert!(!t.previous().unwrap());
        assert_eq!(t.status(), ProgressStatus::NotStarted);
    }

    #[test]
    fn finishing_computes_score_and_locks_state() {
        let mut t = traversal(4);
        // Q1 correct, Q2 wrong, Q3 unanswered, Q4 correct.
        t.answer(OptionLabel::A).unwrap();
        t.next().unwrap();
        t.answer(wrong(OptionLabel::B)).unwrap();
        t.next().unwrap();
        t.next().unwrap();
        t.answer(OptionLabel::D).unwrap();
        let step = t.next().unwrap();

        assert!(step.finished);
        assert_eq!(t.status(), ProgressStatus::Completed);
        let score = t.score().unwrap();
        assert_eq!((score.correct(), score.incorrect(), score.total()), (2, 1, 4));
        assert_eq!(score.percentage(), 50);

        assert_eq!(t.next().unwrap_err(), TraversalError::Completed);
        assert_eq!(t.previous().unwrap_err(), TraversalError::Completed);
        assert_eq!(t.answer(OptionLabel::A).unwrap_err(), TraversalError::Completed);
    }

    #[test]
    fn score_never_exceeds_total() {
        let mut t = traversal(10);
        for i in 0..10 {
            if i % 3 != 0 {
                let label = t.current_question().correct();
                let pick = if i % 2 == 0 { label } else { wrong(label) };
                t.answer(pick).unwrap();
            }
            let score = t.compute_score();
            assert!(score.correct() + score.incorrect() <= score.total());
            if i < 9 {
                t.next().unwrap();
            }
        }
        let score = t.compute_score();
        assert!(score.correct() + score.incorrect() < score.total());
    }

    #[test]
    fn fully_answered_score_adds_up() {
        let mut t = traversal(5);
        loop {
            let label = t.current_question().correct();
            t.answer(wrong(label)).unwrap();
            if t.next().unwrap().finished {
                break;
            }
        }
        let score = t.score().unwrap();
        assert_eq!(score.correct() + score.incorrect(), score.total());
        assert_eq!(score.correct(), 0);
    }

    #[test]
    fn restore_drops_foreign_answers_and_clamps_index() {
        let mut answers = AnswerRecord::new();
        answers.insert(Serial::new(2), OptionLabel::B);
        answers.insert(Serial::new(99), OptionLabel::A);
        let snapshot = ProgressSnapshot::from_persisted(
            ProgressStatus::InProgress,
            42,
            answers,
            fixed_now(),
            None,
        )
        .unwrap();

        let t = Traversal::restore((1..=3).map(question).collect(), Some(&snapshot)).unwrap();
        assert_eq!(t.current_index(), 2);
        assert_eq!(t.answers().len(), 1);
        assert_eq!(t.answer_for(Serial::new(2)), Some(OptionLabel::B));
        assert_eq!(t.status(), ProgressStatus::InProgress);
    }

    #[test]
    fn snapshot_round_trips_through_restore() {
        let mut t = traversal(3);
        t.answer(OptionLabel::A).unwrap();
        t.next().unwrap();
        let snap = t.snapshot(fixed_now());

        let restored = Traversal::restore(t.questions().to_vec(), Some(&snap)).unwrap();
        assert_eq!(restored.current_index(), 1);
        assert_eq!(restored.answers(), t.answers());
        assert_eq!(snap.last_updated(), fixed_now());
    }

    #[test]
    fn reset_returns_to_not_started() {
        let mut t = traversal(1);
        t.answer(OptionLabel::A).unwrap();
        t.next().unwrap();
        assert!(t.is_complete());

        t.reset();
        assert_eq!(t.status(), ProgressStatus::NotStarted);
        assert_eq!(t.current_index(), 0);
        assert!(t.answers().is_empty());
        assert!(t.score().is_none());
    }
}
