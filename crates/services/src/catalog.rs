//! Resolves units to their ordered question subsets.
//!
//! Sets are re-derived from the bank on every call. Tests are drawn once,
//! pinned in the store, and served from the pin until it is erased.

use std::sync::Arc;

use quiz_core::model::{QuestionBank, QuestionRecord, Serial, SetNumber, TestNumber, UnitId};
use quiz_core::partition::PartitionSettings;
use storage::ProgressStore;
use tracing::{debug, info, warn};

use crate::error::CatalogError;
use crate::sampling::Sampler;

/// Which list a navigation request came from; decides the fallback unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    Set,
    Test,
}

impl UnitKind {
    #[must_use]
    pub fn first(self) -> UnitId {
        self.numbered(1)
    }

    #[must_use]
    pub fn numbered(self, n: u32) -> UnitId {
        match self {
            Self::Set => UnitId::set(n),
            Self::Test => UnitId::test(n),
        }
    }
}

#[derive(Clone)]
pub struct UnitCatalog {
    bank: Arc<QuestionBank>,
    settings: PartitionSettings,
    sampler: Sampler,
    store: ProgressStore,
}

impl UnitCatalog {
    #[must_use]
    pub fn new(
        bank: Arc<QuestionBank>,
        settings: PartitionSettings,
        sampler: Sampler,
        store: ProgressStore,
    ) -> Self {
        Self {
            bank,
            settings,
            sampler,
            store,
        }
    }

    #[must_use]
    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    #[must_use]
    pub fn settings(&self) -> PartitionSettings {
        self.settings
    }

    #[must_use]
    pub fn store(&self) -> &ProgressStore {
        &self.store
    }

    #[must_use]
    pub fn total_sets(&self) -> u32 {
        self.settings.total_sets(&self.bank)
    }

    /// Sets first, then tests.
    #[must_use]
    pub fn unit_ids(&self) -> Vec<UnitId> {
        self.settings.unit_ids(&self.bank)
    }

    /// # Errors
    ///
    /// Returns `CatalogError::Partition` for an out-of-range set.
    pub fn set_range(&self, set: SetNumber) -> Result<(Serial, Serial), CatalogError> {
        Ok(self.settings.set_range(set, &self.bank)?)
    }

    /// # Errors
    ///
    /// Returns `CatalogError::Partition` for an out-of-range set.
    pub fn resolve_set(&self, set: SetNumber) -> Result<Vec<QuestionRecord>, CatalogError> {
        Ok(self.settings.resolve_set(set, &self.bank)?)
    }

    /// The pinned subset of `test`, drawing and pinning one if none exists.
    ///
    /// Drawing a fresh subset discards any snapshot left for `test`, since its
    /// answers refer to questions that are no longer in the unit.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Partition` for an out-of-range test or a bank
    /// smaller than the test size, and `CatalogError::Storage` on store failure.
    pub async fn resolve_test(&self, test: TestNumber) -> Result<Vec<QuestionRecord>, CatalogError> {
        self.settings.check_test(test)?;
        if let Some(pinned) = self.store.load_pinned(test).await? {
            debug!(%test, questions = pinned.len(), "serving pinned test");
            return Ok(pinned);
        }

        let drawn = self
            .settings
            .draw_test(&self.bank, |pool| self.sampler.shuffle_for(test, pool))?;
        let unit = UnitId::Test(test);
        if self.store.load_snapshot(unit).await?.is_some() {
            warn!(%unit, "discarding progress recorded against a lost test draw");
        }
        self.store.remove_snapshot(unit).await?;
        self.store.save_pinned(test, &drawn).await?;
        info!(%test, questions = drawn.len(), "drew and pinned new test");
        Ok(drawn)
    }

    /// # Errors
    ///
    /// See [`Self::resolve_set`] and [`Self::resolve_test`].
    pub async fn resolve(&self, unit: UnitId) -> Result<Vec<QuestionRecord>, CatalogError> {
        match unit {
            UnitId::Set(set) => self.resolve_set(set),
            UnitId::Test(test) => self.resolve_test(test).await,
        }
    }

    /// Number of questions `unit` has, without drawing a test.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the unit is out of range or the store fails.
    pub async fn question_count(&self, unit: UnitId) -> Result<usize, CatalogError> {
        match unit {
            UnitId::Set(set) => {
                let (start, end) = self.set_range(set)?;
                Ok((end.value() - start.value() + 1) as usize)
            }
            UnitId::Test(test) => {
                self.settings.check_test(test)?;
                let pinned = self.store.load_pinned(test).await?;
                Ok(pinned.map_or(self.settings.test_size() as usize, |p| p.len()))
            }
        }
    }

    /// Parse a navigation parameter, falling back to the first unit of `kind`.
    ///
    /// Accepts `set-<n>`, `test-<n>`, or a bare number read as a unit of
    /// `kind`. Unparseable or out-of-range input is logged and replaced.
    #[must_use]
    pub fn resolve_unit_or_default(&self, raw: &str, kind: UnitKind) -> UnitId {
        let parsed = raw.parse::<UnitId>().ok().or_else(|| {
            raw.trim()
                .parse::<u32>()
                .ok()
                .map(|n| kind.numbered(n))
        });
        match parsed {
            Some(unit) if self.settings.check_unit(unit, &self.bank).is_ok() => unit,
            _ => {
                let fallback = kind.first();
                warn!(raw, %fallback, "unknown unit requested, falling back");
                fallback
            }
        }
    }
}
