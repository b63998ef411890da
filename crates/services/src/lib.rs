#![forbid(unsafe_code)]

pub mod app_services;
pub mod bank_loader;
pub mod catalog;
pub mod config;
pub mod error;
pub mod progress;
pub mod reset;
pub mod sampling;
pub mod summary;

pub use quiz_core::Clock;

pub use app_services::QuizServices;
pub use bank_loader::{BankSource, load_bank};
pub use catalog::{UnitCatalog, UnitKind};
pub use config::QuizConfig;
pub use error::{
    AppServicesError, BankSourceError, CatalogError, ConfigError, ProgressError, SummaryError,
};
pub use progress::{
    AnswerFeedback, CompletionView, EngineView, OptionMark, OptionView, ProgressEngine,
    QuestionView, ReviewItem,
};
pub use reset::ResetService;
pub use sampling::Sampler;
pub use summary::{DashboardStats, DashboardView, SummaryService, UnitCard, compute_dashboard_stats};
