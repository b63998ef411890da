use std::fmt;
use std::path::PathBuf;

use quiz_core::model::QuestionBank;
use reqwest::Client;
use storage::bank::{bank_from_rows, load_bank_file};
use storage::records::QuestionRow;
use tracing::info;

use crate::error::BankSourceError;

/// Where the question bank document lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BankSource {
    File(PathBuf),
    Url(String),
}

impl BankSource {
    /// `http://` and `https://` locations are URLs; anything else is a path.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let lower = raw.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Url(raw.to_owned())
        } else {
            Self::File(PathBuf::from(raw))
        }
    }
}

impl fmt::Display for BankSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}

/// Fetch and validate the bank document.
///
/// # Errors
///
/// Returns `BankSourceError` if the document cannot be read, the request
/// fails, or the document is not a valid bank.
pub async fn load_bank(source: &BankSource) -> Result<QuestionBank, BankSourceError> {
    match source {
        BankSource::File(path) => Ok(load_bank_file(path).await?),
        BankSource::Url(url) => fetch_bank(&Client::new(), url).await,
    }
}

async fn fetch_bank(client: &Client, url: &str) -> Result<QuestionBank, BankSourceError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(BankSourceError::HttpStatus(status));
    }
    let rows: Vec<QuestionRow> = response.json().await?;
    let bank = bank_from_rows(rows)?;
    info!(%url, questions = bank.len(), "question bank fetched");
    Ok(bank)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::BankError;
    use storage::bank::BankLoadError;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves one HTTP response on a local port and returns its URL.
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0_u8; 1024];
            let _ = socket.read(&mut request).await;
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });
        format!("http://{addr}/questions.json")
    }

    fn client() -> Client {
        Client::builder().no_proxy().build().unwrap()
    }

    #[tokio::test]
    async fn fetches_bank_over_http() {
        let url = serve_once(
            "200 OK",
            r#"[{"sn": 1, "question": "2 + 2?", "options": ["3", "4", "5", "6"], "answer": "B"}]"#,
        )
        .await;
        let bank = fetch_bank(&client(), &url).await.unwrap();
        assert_eq!(bank.len(), 1);
        assert_eq!(bank.questions()[0].correct_text(), "4");
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let url = serve_once("404 Not Found", "").await;
        let err = fetch_bank(&client(), &url).await.unwrap_err();
        assert!(matches!(
            err,
            BankSourceError::HttpStatus(status) if status == reqwest::StatusCode::NOT_FOUND
        ));
    }

    #[tokio::test]
    async fn fetched_document_is_validated() {
        let url = serve_once("200 OK", "[]").await;
        let err = fetch_bank(&client(), &url).await.unwrap_err();
        assert!(matches!(
            err,
            BankSourceError::Load(BankLoadError::Invalid(BankError::Empty))
        ));
    }

    #[tokio::test]
    async fn malformed_json_is_an_http_error() {
        let url = serve_once("200 OK", "{not json").await;
        let err = fetch_bank(&client(), &url).await.unwrap_err();
        assert!(matches!(err, BankSourceError::Http(_)));
    }

    #[test]
    fn parse_distinguishes_urls_from_paths() {
        assert_eq!(
            BankSource::parse("HTTPS://example.com/q.json"),
            BankSource::Url("HTTPS://example.com/q.json".into())
        );
        assert_eq!(
            BankSource::parse(" data/questions.json "),
            BankSource::File(PathBuf::from("data/questions.json"))
        );
    }

    #[tokio::test]
    async fn missing_file_surfaces_load_error() {
        let source = BankSource::File(std::env::temp_dir().join("quiz-no-such-bank.json"));
        let err = load_bank(&source).await.unwrap_err();
        assert!(matches!(err, BankSourceError::Load(BankLoadError::Io { .. })));
    }
}
