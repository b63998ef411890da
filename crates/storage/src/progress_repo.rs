use std::sync::Arc;

use quiz_core::model::{ProgressSnapshot, QuestionRecord, TestNumber, UnitId};
use tracing::warn;

use crate::keys::{NAMESPACE, pinned_questions_key, progress_key};
use crate::records::{QuestionRow, SnapshotRecord};
use crate::repository::{KeyValueStore, StorageError};

/// Typed access to snapshots and pinned tests on top of a `KeyValueStore`.
///
/// Values that fail to parse are logged and reported as absent: a corrupt
/// snapshot behaves exactly like a unit that was never started.
#[derive(Clone)]
pub struct ProgressStore {
    kv: Arc<dyn KeyValueStore>,
}

impl ProgressStore {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the backend read fails. Parse failures are
    /// not errors.
    pub async fn load_snapshot(
        &self,
        unit: UnitId,
    ) -> Result<Option<ProgressSnapshot>, StorageError> {
        let key = progress_key(unit);
        let Some(raw) = self.kv.get(&key).await? else {
            return Ok(None);
        };
        let parsed = serde_json::from_str::<SnapshotRecord>(&raw)
            .map_err(|e| StorageError::Serialization(e.to_string()))
            .and_then(SnapshotRecord::into_snapshot);
        match parsed {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(err) => {
                warn!(%unit, %key, error = %err, "discarding corrupt progress snapshot");
                Ok(None)
            }
        }
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be encoded or written.
    pub async fn save_snapshot(
        &self,
        unit: UnitId,
        snapshot: &ProgressSnapshot,
    ) -> Result<(), StorageError> {
        let json = serde_json::to_string(&SnapshotRecord::from_snapshot(snapshot))
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.kv.set(&progress_key(unit), &json).await
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the backend write fails.
    pub async fn remove_snapshot(&self, unit: UnitId) -> Result<(), StorageError> {
        self.kv.remove(&progress_key(unit)).await
    }

    /// Pinned questions of `test`, in the persisted order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend read fails. An unreadable or
    /// empty list is reported as `None`.
    pub async fn load_pinned(
        &self,
        test: TestNumber,
    ) -> Result<Option<Vec<QuestionRecord>>, StorageError> {
        let key = pinned_questions_key(test);
        let Some(raw) = self.kv.get(&key).await? else {
            return Ok(None);
        };
        let rows = match serde_json::from_str::<Vec<QuestionRow>>(&raw) {
            Ok(rows) => rows,
            Err(err) => {
                warn!(%test, %key, error = %err, "discarding corrupt pinned test");
                return Ok(None);
            }
        };
        let records: Result<Vec<_>, _> = rows.into_iter().map(QuestionRow::into_record).collect();
        match records {
            Ok(records) if !records.is_empty() => Ok(Some(records)),
            Ok(_) => {
                warn!(%test, %key, "discarding empty pinned test");
                Ok(None)
            }
            Err(err) => {
                warn!(%test, %key, error = %err, "discarding pinned test with invalid question");
                Ok(None)
            }
        }
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the list cannot be encoded or written.
    pub async fn save_pinned(
        &self,
        test: TestNumber,
        questions: &[QuestionRecord],
    ) -> Result<(), StorageError> {
        let rows: Vec<QuestionRow> = questions.iter().map(QuestionRow::from_record).collect();
        let json =
            serde_json::to_string(&rows).map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.kv.set(&pinned_questions_key(test), &json).await
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the backend write fails.
    pub async fn remove_pinned(&self, test: TestNumber) -> Result<(), StorageError> {
        self.kv.remove(&pinned_questions_key(test)).await
    }

    /// Remove everything stored for `unit`: its snapshot and, for a test, its
    /// pinned questions.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if a backend write fails.
    pub async fn remove_unit(&self, unit: UnitId) -> Result<(), StorageError> {
        self.remove_snapshot(unit).await?;
        if let UnitId::Test(test) = unit {
            self.remove_pinned(test).await?;
        }
        Ok(())
    }

    /// Remove every remaining key under the quiz namespace, returning how
    /// many were deleted.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be listed or written.
    pub async fn sweep_namespace(&self) -> Result<usize, StorageError> {
        let keys = self.kv.keys_with_prefix(NAMESPACE).await?;
        for key in &keys {
            self.kv.remove(key).await?;
        }
        Ok(keys.len())
    }
}
