use quiz_core::model::UnitId;
use storage::{ProgressStore, StorageError};
use tracing::info;

use crate::catalog::UnitCatalog;

/// Erase the snapshot of `unit` and, for a test, its pinned subset.
///
/// # Errors
///
/// Returns `StorageError` if the store write fails.
pub async fn reset_unit(store: &ProgressStore, unit: UnitId) -> Result<(), StorageError> {
    store.remove_unit(unit).await?;
    info!(%unit, "unit reset");
    Ok(())
}

/// Erase every listed unit, then sweep leftover keys in the quiz namespace.
///
/// Returns the number of leftover keys removed by the sweep.
///
/// # Errors
///
/// Returns `StorageError` if the store cannot be written.
pub async fn reset_all(store: &ProgressStore, units: &[UnitId]) -> Result<usize, StorageError> {
    for &unit in units {
        store.remove_unit(unit).await?;
    }
    let swept = store.sweep_namespace().await?;
    info!(units = units.len(), swept, "all progress reset");
    Ok(swept)
}

#[derive(Clone)]
pub struct ResetService {
    catalog: UnitCatalog,
}

impl ResetService {
    #[must_use]
    pub fn new(catalog: UnitCatalog) -> Self {
        Self { catalog }
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the store write fails.
    pub async fn reset_unit(&self, unit: UnitId) -> Result<(), StorageError> {
        reset_unit(self.catalog.store(), unit).await
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be written.
    pub async fn reset_all(&self) -> Result<usize, StorageError> {
        reset_all(self.catalog.store(), &self.catalog.unit_ids()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use quiz_core::model::{
        AnswerRecord, OptionLabel, ProgressSnapshot, ProgressStatus, QuestionRecord, Serial,
        TestNumber,
    };
    use quiz_core::time::fixed_now;
    use storage::{InMemoryStore, KeyValueStore};

    fn snapshot() -> ProgressSnapshot {
        ProgressSnapshot::from_persisted(
            ProgressStatus::InProgress,
            0,
            AnswerRecord::new(),
            fixed_now(),
            None,
        )
        .unwrap()
    }

    fn question() -> QuestionRecord {
        QuestionRecord::new(
            Serial::new(1),
            "Q",
            ["a".into(), "b".into(), "c".into(), "d".into()],
            OptionLabel::A,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn reset_unit_leaves_other_units() {
        let store = ProgressStore::new(Arc::new(InMemoryStore::new()));
        store.save_snapshot(UnitId::set(1), &snapshot()).await.unwrap();
        store.save_snapshot(UnitId::test(1), &snapshot()).await.unwrap();
        store.save_pinned(TestNumber::new(1), &[question()]).await.unwrap();

        reset_unit(&store, UnitId::test(1)).await.unwrap();
        assert!(store.load_snapshot(UnitId::test(1)).await.unwrap().is_none());
        assert!(store.load_pinned(TestNumber::new(1)).await.unwrap().is_none());
        assert!(store.load_snapshot(UnitId::set(1)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn reset_all_sweeps_unknown_units() {
        let kv = InMemoryStore::new();
        let store = ProgressStore::new(Arc::new(kv.clone()));
        store.save_snapshot(UnitId::set(1), &snapshot()).await.unwrap();
        // Left behind by a larger catalog.
        store.save_snapshot(UnitId::test(40), &snapshot()).await.unwrap();
        kv.set("other-app:theme", "dark").await.unwrap();

        let swept = reset_all(&store, &[UnitId::set(1), UnitId::test(1)]).await.unwrap();
        assert_eq!(swept, 1);
        assert_eq!(kv.len().unwrap(), 1);
    }
}
