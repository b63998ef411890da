//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::UnitId;
use quiz_core::partition::PartitionError;
use quiz_core::traversal::TraversalError;
use storage::bank::BankLoadError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted while resolving a unit's question subset.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error(transparent)]
    Partition(#[from] PartitionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ProgressEngine`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressError {
    #[error(transparent)]
    Traversal(#[from] TraversalError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("{unit} was redrawn before the answer could be recorded")]
    Redrawn { unit: UnitId },
}

/// Errors emitted by `SummaryService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SummaryError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Partition(#[from] PartitionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while fetching the question bank.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BankSourceError {
    #[error(transparent)]
    Load(#[from] BankLoadError),
    #[error("question bank request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted while reading configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("{var} must be a positive integer, got {raw:?}")]
    InvalidNumber { var: &'static str, raw: String },
    #[error(transparent)]
    Partition(#[from] PartitionError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error("failed to load question bank: {0}")]
    Bank(#[from] BankSourceError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
