use thiserror::Error;

use crate::model::ids::Serial;
use crate::model::question::{QuestionError, QuestionRecord};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BankError {
    #[error("question bank is empty")]
    Empty,

    #[error("duplicate question serial {0}")]
    DuplicateSerial(Serial),

    #[error("question serial {found} follows {previous}; serials must be ascending")]
    OutOfOrder { previous: Serial, found: Serial },

    #[error(transparent)]
    Question(#[from] QuestionError),
}

/// Immutable, serial-ordered collection of every question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionBank {
    questions: Vec<QuestionRecord>,
}

impl QuestionBank {
    /// Build a bank from records in document order.
    ///
    /// # Errors
    ///
    /// Returns `BankError::Empty` for no records, `BankError::DuplicateSerial`
    /// or `BankError::OutOfOrder` if serials are not strictly ascending.
    pub fn new(questions: Vec<QuestionRecord>) -> Result<Self, BankError> {
        if questions.is_empty() {
            return Err(BankError::Empty);
        }
        for pair in questions.windows(2) {
            let (previous, found) = (pair[0].serial(), pair[1].serial());
            if previous == found {
                return Err(BankError::DuplicateSerial(found));
            }
            if found < previous {
                return Err(BankError::OutOfOrder { previous, found });
            }
        }
        Ok(Self { questions })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn questions(&self) -> &[QuestionRecord] {
        &self.questions
    }

    /// Records with `start <= serial <= end`, ascending.
    #[must_use]
    pub fn range(&self, start: Serial, end: Serial) -> Vec<QuestionRecord> {
        let from = self.questions.partition_point(|q| q.serial() < start);
        let to = self.questions.partition_point(|q| q.serial() <= end);
        if from >= to {
            return Vec::new();
        }
        self.questions[from..to].to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::question::OptionLabel;

    fn q(serial: u32) -> QuestionRecord {
        QuestionRecord::new(
            Serial::new(serial),
            format!("Q{serial}"),
            ["a".into(), "b".into(), "c".into(), "d".into()],
            OptionLabel::A,
        )
        .unwrap()
    }

    #[test]
    fn empty_bank_is_rejected() {
        assert_eq!(QuestionBank::new(Vec::new()).unwrap_err(), BankError::Empty);
    }

    #[test]
    fn duplicate_and_unordered_serials_are_rejected() {
        let err = QuestionBank::new(vec![q(1), q(2), q(2)]).unwrap_err();
        assert_eq!(err, BankError::DuplicateSerial(Serial::new(2)));

        let err = QuestionBank::new(vec![q(1), q(3), q(2)]).unwrap_err();
        assert_eq!(
            err,
            BankError::OutOfOrder {
                previous: Serial::new(3),
                found: Serial::new(2)
            }
        );
    }

    #[test]
    fn range_is_inclusive_and_tolerates_gaps() {
        let bank = QuestionBank::new(vec![q(1), q(2), q(4), q(5), q(9)]).unwrap();
        let serials: Vec<u32> = bank
            .range(Serial::new(2), Serial::new(5))
            .iter()
            .map(|r| r.serial().value())
            .collect();
        assert_eq!(serials, vec![2, 4, 5]);
        assert!(bank.range(Serial::new(6), Serial::new(8)).is_empty());
        assert!(bank.range(Serial::new(5), Serial::new(2)).is_empty());
    }

    #[test]
    fn single_serial_range() {
        let bank = QuestionBank::new(vec![q(1), q(2), q(4)]).unwrap();
        let hit = bank.range(Serial::new(4), Serial::new(4));
        assert_eq!(hit.iter().map(QuestionRecord::prompt).collect::<Vec<_>>(), vec!["Q4"]);
        assert!(bank.range(Serial::new(3), Serial::new(3)).is_empty());
    }
}
