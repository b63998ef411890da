//! Persisted shapes for questions and progress snapshots.
//!
//! These mirror the domain types so the store can serialize them without
//! leaking JSON concerns into `quiz-core`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use quiz_core::model::{
    AnswerRecord, OptionLabel, ProgressSnapshot, ProgressStatus, QuestionError, QuestionRecord,
    Score, Serial,
};

use crate::repository::StorageError;

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// One question as it appears in the bank document and in pinned tests:
/// `{ "sn": 1, "question": "...", "options": [..4], "answer": "B" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRow {
    pub sn: u32,
    pub question: String,
    pub options: [String; 4],
    pub answer: String,
}

impl QuestionRow {
    #[must_use]
    pub fn from_record(record: &QuestionRecord) -> Self {
        Self {
            sn: record.serial().value(),
            question: record.prompt().to_owned(),
            options: record.options().clone(),
            answer: record.correct().to_string(),
        }
    }

    /// Convert the row back into a validated `QuestionRecord`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the label or serial is invalid.
    pub fn into_record(self) -> Result<QuestionRecord, QuestionError> {
        let correct: OptionLabel = self.answer.parse()?;
        QuestionRecord::new(Serial::new(self.sn), self.question, self.options, correct)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub correct: u32,
    pub incorrect: u32,
    pub total: u32,
}

/// JSON document stored under a unit's progress key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRecord {
    pub status: String,
    pub current_question_index: usize,
    #[serde(default)]
    pub answers: BTreeMap<u32, OptionLabel>,
    pub last_updated: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<ScoreRecord>,
}

impl SnapshotRecord {
    #[must_use]
    pub fn from_snapshot(snapshot: &ProgressSnapshot) -> Self {
        Self {
            status: snapshot.status().as_str().to_owned(),
            current_question_index: snapshot.current_index(),
            answers: snapshot
                .answers()
                .iter()
                .map(|(serial, label)| (serial.value(), *label))
                .collect(),
            last_updated: snapshot.last_updated(),
            score: snapshot.score().map(|s| ScoreRecord {
                correct: s.correct(),
                incorrect: s.incorrect(),
                total: s.total(),
            }),
        }
    }

    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the status is unknown or the
    /// score does not agree with it.
    pub fn into_snapshot(self) -> Result<ProgressSnapshot, StorageError> {
        let status = ProgressStatus::parse_str(&self.status)
            .ok_or_else(|| ser(format!("unknown status {:?}", self.status)))?;
        let score = self
            .score
            .map(|s| Score::new(s.correct, s.incorrect, s.total))
            .transpose()
            .map_err(ser)?;
        let answers: AnswerRecord = self
            .answers
            .into_iter()
            .map(|(sn, label)| (Serial::new(sn), label))
            .collect();
        ProgressSnapshot::from_persisted(
            status,
            self.current_question_index,
            answers,
            self.last_updated,
            score,
        )
        .map_err(ser)
    }
}
