//! Splits the bank into fixed sets and draws random tests.
//!
//! Sets are contiguous serial ranges and are always re-derived. Tests are
//! random samples; pinning them is the services layer's job, this module only
//! draws.

use thiserror::Error;

use crate::model::{QuestionBank, QuestionRecord, Serial, SetNumber, TestNumber, UnitId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PartitionError {
    #[error("set {requested} is out of range (1..={total_sets})")]
    InvalidSetNumber { requested: u32, total_sets: u32 },

    #[error("test {requested} is out of range (1..={test_count})")]
    InvalidTestNumber { requested: u32, test_count: u32 },

    #[error("a test needs {requested} questions but the bank holds {available}")]
    InsufficientQuestions { requested: usize, available: usize },

    #[error("set size must be > 0")]
    InvalidSetSize,

    #[error("test size must be > 0")]
    InvalidTestSize,

    #[error("test count must be > 0")]
    InvalidTestCount,
}

/// Sizes that shape the unit catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionSettings {
    set_size: u32,
    test_size: u32,
    test_count: u32,
}

impl Default for PartitionSettings {
    /// 100-question sets, ten 100-question tests.
    fn default() -> Self {
        Self {
            set_size: 100,
            test_size: 100,
            test_count: 10,
        }
    }
}

impl PartitionSettings {
    /// # Errors
    ///
    /// Returns a `PartitionError` if any size is zero.
    pub fn new(set_size: u32, test_size: u32, test_count: u32) -> Result<Self, PartitionError> {
        if set_size == 0 {
            return Err(PartitionError::InvalidSetSize);
        }
        if test_size == 0 {
            return Err(PartitionError::InvalidTestSize);
        }
        if test_count == 0 {
            return Err(PartitionError::InvalidTestCount);
        }
        Ok(Self {
            set_size,
            test_size,
            test_count,
        })
    }

    #[must_use]
    pub fn set_size(&self) -> u32 {
        self.set_size
    }

    #[must_use]
    pub fn test_size(&self) -> u32 {
        self.test_size
    }

    #[must_use]
    pub fn test_count(&self) -> u32 {
        self.test_count
    }

    /// `ceil(bank.len / set_size)`.
    #[must_use]
    pub fn total_sets(&self, bank: &QuestionBank) -> u32 {
        bank_len(bank).div_ceil(self.set_size)
    }

    /// Inclusive serial range covered by `set`.
    ///
    /// The last set runs to `bank.len()` and may be shorter than `set_size`.
    ///
    /// # Errors
    ///
    /// Returns `PartitionError::InvalidSetNumber` outside `1..=total_sets`.
    pub fn set_range(
        &self,
        set: SetNumber,
        bank: &QuestionBank,
    ) -> Result<(Serial, Serial), PartitionError> {
        let total_sets = self.total_sets(bank);
        let n = set.value();
        if n == 0 || n > total_sets {
            return Err(PartitionError::InvalidSetNumber {
                requested: n,
                total_sets,
            });
        }
        let start = (n - 1).saturating_mul(self.set_size).saturating_add(1);
        let end = if n == total_sets {
            bank_len(bank)
        } else {
            n.saturating_mul(self.set_size)
        };
        Ok((Serial::new(start), Serial::new(end)))
    }

    /// Questions of `set`, ascending by serial.
    ///
    /// # Errors
    ///
    /// Returns `PartitionError::InvalidSetNumber` outside `1..=total_sets`.
    pub fn resolve_set(
        &self,
        set: SetNumber,
        bank: &QuestionBank,
    ) -> Result<Vec<QuestionRecord>, PartitionError> {
        let (start, end) = self.set_range(set, bank)?;
        Ok(bank.range(start, end))
    }

    /// # Errors
    ///
    /// Returns `PartitionError::InvalidTestNumber` outside `1..=test_count`.
    pub fn check_test(&self, test: TestNumber) -> Result<(), PartitionError> {
        let n = test.value();
        if n == 0 || n > self.test_count {
            return Err(PartitionError::InvalidTestNumber {
                requested: n,
                test_count: self.test_count,
            });
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns the set/test range error for `unit`.
    pub fn check_unit(&self, unit: UnitId, bank: &QuestionBank) -> Result<(), PartitionError> {
        match unit {
            UnitId::Set(set) => self.set_range(set, bank).map(|_| ()),
            UnitId::Test(test) => self.check_test(test),
        }
    }

    /// Draw a fresh test: permute a copy of the bank with `permute`, keep the
    /// first `test_size` records.
    ///
    /// # Errors
    ///
    /// Returns `PartitionError::InsufficientQuestions` if the bank is smaller
    /// than `test_size`.
    pub fn draw_test<F>(
        &self,
        bank: &QuestionBank,
        permute: F,
    ) -> Result<Vec<QuestionRecord>, PartitionError>
    where
        F: FnOnce(&mut [QuestionRecord]),
    {
        let requested = usize::try_from(self.test_size).unwrap_or(usize::MAX);
        if bank.len() < requested {
            return Err(PartitionError::InsufficientQuestions {
                requested,
                available: bank.len(),
            });
        }
        let mut pool = bank.questions().to_vec();
        permute(pool.as_mut_slice());
        pool.truncate(requested);
        Ok(pool)
    }

    /// Every unit the dashboard lists: sets first, then tests.
    #[must_use]
    pub fn unit_ids(&self, bank: &QuestionBank) -> Vec<UnitId> {
        (1..=self.total_sets(bank))
            .map(UnitId::set)
            .chain((1..=self.test_count).map(UnitId::test))
            .collect()
    }
}

fn bank_len(bank: &QuestionBank) -> u32 {
    u32::try_from(bank.len()).unwrap_or(u32::MAX)
}
