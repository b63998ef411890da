use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::Serial;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("invalid option label: {0:?}")]
    InvalidLabel(String),

    #[error("question serial must be >= 1")]
    ZeroSerial,

    #[error("question {serial} has an empty prompt")]
    EmptyPrompt { serial: Serial },
}

//
// ─── OPTION LABEL ──────────────────────────────────────────────────────────────
//

/// Label of one of the four answer options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OptionLabel {
    A,
    B,
    C,
    D,
}

impl OptionLabel {
    /// All labels in display order.
    pub const ALL: [OptionLabel; 4] = [Self::A, Self::B, Self::C, Self::D];

    /// Zero-based position of the option this label refers to.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            OptionLabel::A => 0,
            OptionLabel::B => 1,
            OptionLabel::C => 2,
            OptionLabel::D => 3,
        }
    }

    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OptionLabel::A => "A",
            OptionLabel::B => "B",
            OptionLabel::C => "C",
            OptionLabel::D => "D",
        }
    }
}

impl fmt::Display for OptionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionLabel {
    type Err = QuestionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" | "a" => Ok(Self::A),
            "B" | "b" => Ok(Self::B),
            "C" | "c" => Ok(Self::C),
            "D" | "d" => Ok(Self::D),
            other => Err(QuestionError::InvalidLabel(other.to_owned())),
        }
    }
}

//
// ─── QUESTION RECORD ───────────────────────────────────────────────────────────
//

/// One multiple-choice question with exactly four options.
///
/// Records are immutable once loaded; every other component only reads them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionRecord {
    serial: Serial,
    prompt: String,
    options: [String; 4],
    correct: OptionLabel,
}

impl QuestionRecord {
    /// Build a validated question record.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::ZeroSerial` for serial `0` and
    /// `QuestionError::EmptyPrompt` when the prompt is blank.
    pub fn new(
        serial: Serial,
        prompt: impl Into<String>,
        options: [String; 4],
        correct: OptionLabel,
    ) -> Result<Self, QuestionError> {
        if serial.value() == 0 {
            return Err(QuestionError::ZeroSerial);
        }
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt { serial });
        }
        Ok(Self {
            serial,
            prompt,
            options,
            correct,
        })
    }

    #[must_use]
    pub fn serial(&self) -> Serial {
        self.serial
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String; 4] {
        &self.options
    }

    #[must_use]
    pub fn correct(&self) -> OptionLabel {
        self.correct
    }

    /// Text of the option behind `label`.
    #[must_use]
    pub fn option_text(&self, label: OptionLabel) -> &str {
        &self.options[label.index()]
    }

    #[must_use]
    pub fn correct_text(&self) -> &str {
        self.option_text(self.correct)
    }

    #[must_use]
    pub fn is_correct(&self, label: OptionLabel) -> bool {
        self.correct == label
    }
}
