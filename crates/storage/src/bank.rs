use std::path::{Path, PathBuf};

use quiz_core::model::{BankError, QuestionBank, QuestionError};
use thiserror::Error;
use tracing::info;

use crate::records::QuestionRow;

/// Errors raised while reading the question bank document.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BankLoadError {
    #[error("failed to read question bank {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("question bank is not a valid document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("question {sn} is invalid: {source}")]
    Question {
        sn: u32,
        #[source]
        source: QuestionError,
    },

    #[error(transparent)]
    Invalid(#[from] BankError),
}

/// Build a bank from document rows.
///
/// # Errors
///
/// Returns `BankLoadError::Question` for the first invalid row and
/// `BankLoadError::Invalid` if the bank as a whole is rejected.
pub fn bank_from_rows(rows: Vec<QuestionRow>) -> Result<QuestionBank, BankLoadError> {
    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let sn = row.sn;
        let record = row
            .into_record()
            .map_err(|source| BankLoadError::Question { sn, source })?;
        records.push(record);
    }
    Ok(QuestionBank::new(records)?)
}

/// Parse the JSON array document.
///
/// # Errors
///
/// Returns `BankLoadError` if the text is not a valid bank.
pub fn parse_bank(json: &str) -> Result<QuestionBank, BankLoadError> {
    let rows: Vec<QuestionRow> = serde_json::from_str(json)?;
    bank_from_rows(rows)
}

/// Read and parse the bank document at `path`.
///
/// # Errors
///
/// Returns `BankLoadError::Io` if the file cannot be read, or a parse error.
pub async fn load_bank_file(path: &Path) -> Result<QuestionBank, BankLoadError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| BankLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    let bank = parse_bank(&text)?;
    info!(path = %path.display(), questions = bank.len(), "question bank loaded");
    Ok(bank)
}
