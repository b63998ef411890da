use std::sync::Arc;

use quiz_core::model::{QuestionBank, UnitId};
use quiz_core::partition::PartitionSettings;
use storage::{ProgressStore, Storage};
use tracing::info;

use crate::Clock;
use crate::bank_loader::load_bank;
use crate::catalog::UnitCatalog;
use crate::config::QuizConfig;
use crate::error::{AppServicesError, ProgressError};
use crate::progress::ProgressEngine;
use crate::reset::ResetService;
use crate::sampling::Sampler;
use crate::summary::SummaryService;

/// Assembles the app-facing services over one bank and one store.
#[derive(Clone)]
pub struct QuizServices {
    clock: Clock,
    catalog: UnitCatalog,
    summary: Arc<SummaryService>,
    reset: Arc<ResetService>,
}

impl QuizServices {
    /// Load the bank and open the store named by `config`.
    ///
    /// Nothing that accepts input should be built until this succeeds.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the configuration is invalid, the bank
    /// cannot be loaded, or storage initialization fails.
    pub async fn bootstrap(config: &QuizConfig, clock: Clock) -> Result<Self, AppServicesError> {
        let settings = config.partition_settings()?;
        let source = config.bank_source();
        let bank = load_bank(&source).await?;
        let storage = match config.db_url.as_deref() {
            Some(url) => Storage::sqlite(url).await?,
            None => Storage::in_memory(),
        };
        info!(
            bank = %source,
            questions = bank.len(),
            persistent = config.db_url.is_some(),
            "quiz services ready"
        );
        Ok(Self::from_parts(bank, storage, settings, config.sampler(), clock))
    }

    #[must_use]
    pub fn from_parts(
        bank: QuestionBank,
        storage: Storage,
        settings: PartitionSettings,
        sampler: Sampler,
        clock: Clock,
    ) -> Self {
        let store = ProgressStore::new(Arc::clone(&storage.kv));
        let catalog = UnitCatalog::new(Arc::new(bank), settings, sampler, store);
        let summary = Arc::new(SummaryService::new(catalog.clone()));
        let reset = Arc::new(ResetService::new(catalog.clone()));
        Self {
            clock,
            catalog,
            summary,
            reset,
        }
    }

    /// Open `unit` where it was left off.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError` if the unit cannot be resolved or read.
    pub async fn open(&self, unit: UnitId) -> Result<ProgressEngine, ProgressError> {
        ProgressEngine::resume(&self.catalog, unit, self.clock).await
    }

    #[must_use]
    pub fn catalog(&self) -> &UnitCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn summary(&self) -> Arc<SummaryService> {
        Arc::clone(&self.summary)
    }

    #[must_use]
    pub fn reset(&self) -> Arc<ResetService> {
        Arc::clone(&self.reset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BankSourceError;

    #[tokio::test]
    async fn bootstrap_fails_on_missing_bank() {
        let config = QuizConfig {
            bank: std::env::temp_dir()
                .join("quiz-bootstrap-missing.json")
                .display()
                .to_string(),
            db_url: None,
            ..QuizConfig::default()
        };
        let err = QuizServices::bootstrap(&config, Clock::system())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, AppServicesError::Bank(BankSourceError::Load(_))));
    }

    #[tokio::test]
    async fn bootstrap_loads_bank_into_memory_store() {
        let path = std::env::temp_dir().join(format!("quiz-bootstrap-{}.json", std::process::id()));
        let doc = r#"[
            {"sn": 1, "question": "Q1", "options": ["a", "b", "c", "d"], "answer": "A"},
            {"sn": 2, "question": "Q2", "options": ["a", "b", "c", "d"], "answer": "B"},
            {"sn": 3, "question": "Q3", "options": ["a", "b", "c", "d"], "answer": "C"}
        ]"#;
        std::fs::write(&path, doc).unwrap();
        let config = QuizConfig {
            bank: path.display().to_string(),
            db_url: None,
            set_size: 2,
            test_size: 2,
            test_count: 1,
            seed: Some(3),
        };

        let services = QuizServices::bootstrap(&config, Clock::system()).await.unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(services.catalog().total_sets(), 2);
        assert_eq!(services.catalog().unit_ids().len(), 3);
        let engine = services.open(UnitId::test(1)).await.unwrap();
        assert_eq!(engine.traversal().len(), 2);
    }
}
