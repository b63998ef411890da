use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use crate::model::ids::Serial;
use crate::model::question::OptionLabel;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SnapshotError {
    #[error("correct ({correct}) + incorrect ({incorrect}) exceeds total ({total})")]
    ScoreOverflow {
        correct: u32,
        incorrect: u32,
        total: u32,
    },

    #[error("completed snapshot is missing its score")]
    MissingScore,

    #[error("score present on a snapshot that is not completed")]
    UnexpectedScore,
}

//
// ─── STATUS ────────────────────────────────────────────────────────────────────
//

/// Lifecycle of one set or test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProgressStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl ProgressStatus {
    /// Storage representation (`not-started`, `in-progress`, `completed`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ProgressStatus::NotStarted => "not-started",
            ProgressStatus::InProgress => "in-progress",
            ProgressStatus::Completed => "completed",
        }
    }

    #[must_use]
    pub fn parse_str(value: &str) -> Option<Self> {
        match value {
            "not-started" => Some(Self::NotStarted),
            "in-progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    /// Badge label for dashboards.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ProgressStatus::NotStarted => "Not Started",
            ProgressStatus::InProgress => "In Progress",
            ProgressStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── SCORE ─────────────────────────────────────────────────────────────────────
//

/// Final tally of a completed unit. Unanswered questions are neither correct
/// nor incorrect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    correct: u32,
    incorrect: u32,
    total: u32,
}

impl Score {
    /// # Errors
    ///
    /// Returns `SnapshotError::ScoreOverflow` if `correct + incorrect > total`.
    pub fn new(correct: u32, incorrect: u32, total: u32) -> Result<Self, SnapshotError> {
        if u64::from(correct) + u64::from(incorrect) > u64::from(total) {
            return Err(SnapshotError::ScoreOverflow {
                correct,
                incorrect,
                total,
            });
        }
        Ok(Self {
            correct,
            incorrect,
            total,
        })
    }

    /// Counts produced by tallying a traversal, already consistent.
    pub(crate) fn tallied(correct: u32, incorrect: u32, total: u32) -> Self {
        debug_assert!(u64::from(correct) + u64::from(incorrect) <= u64::from(total));
        Self {
            correct,
            incorrect,
            total,
        }
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn incorrect(&self) -> u32 {
        self.incorrect
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn unanswered(&self) -> u32 {
        self.total - self.correct - self.incorrect
    }

    /// `round(100 * correct / total)`, 0 for an empty score.
    #[must_use]
    pub fn percentage(&self) -> u32 {
        percentage(u64::from(self.correct), u64::from(self.total))
    }
}

/// Round-half-up percentage of `part / whole`; 0 when `whole` is 0.
#[must_use]
pub fn percentage(part: u64, whole: u64) -> u32 {
    if whole == 0 {
        return 0;
    }
    let rounded = (200 * part + whole) / (2 * whole);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}

//
// ─── SNAPSHOT ──────────────────────────────────────────────────────────────────
//

/// Answers keyed by question serial.
pub type AnswerRecord = BTreeMap<Serial, OptionLabel>;

/// Persisted progress of one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSnapshot {
    status: ProgressStatus,
    current_index: usize,
    answers: AnswerRecord,
    last_updated: DateTime<Utc>,
    score: Option<Score>,
}

impl ProgressSnapshot {
    /// Rehydrate a snapshot from storage.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError::MissingScore` / `SnapshotError::UnexpectedScore`
    /// when the score does not agree with `status`.
    pub fn from_persisted(
        status: ProgressStatus,
        current_index: usize,
        answers: AnswerRecord,
        last_updated: DateTime<Utc>,
        score: Option<Score>,
    ) -> Result<Self, SnapshotError> {
        match (status, score.is_some()) {
            (ProgressStatus::Completed, false) => return Err(SnapshotError::MissingScore),
            (ProgressStatus::NotStarted | ProgressStatus::InProgress, true) => {
                return Err(SnapshotError::UnexpectedScore);
            }
            _ => {}
        }
        Ok(Self {
            status,
            current_index,
            answers,
            last_updated,
            score,
        })
    }

    pub(crate) fn from_parts(
        status: ProgressStatus,
        current_index: usize,
        answers: AnswerRecord,
        last_updated: DateTime<Utc>,
        score: Option<Score>,
    ) -> Self {
        Self {
            status,
            current_index,
            answers,
            last_updated,
            score,
        }
    }

    #[must_use]
    pub fn status(&self) -> ProgressStatus {
        self.status
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerRecord {
        &self.answers
    }

    #[must_use]
    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    #[must_use]
    pub fn score(&self) -> Option<Score> {
        self.score
    }

    #[must_use]
    pub fn answered(&self) -> usize {
        self.answers.len()
    }
}
