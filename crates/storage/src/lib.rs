#![forbid(unsafe_code)]

pub mod bank;
pub mod keys;
pub mod progress_repo;
pub mod records;
pub mod repository;
pub mod sqlite;

pub use progress_repo::ProgressStore;
pub use repository::{InMemoryStore, KeyValueStore, Storage, StorageError};
