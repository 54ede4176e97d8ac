//! Error types shared by the library.

use thiserror::Error;

/// Errors surfaced by the library's public operations.
///
/// Expected collaborator failures (a search call timing out, a DNS lookup
/// returning nothing, an SMTP host refusing a connection) are absorbed inside
/// the pipeline and never show up here.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Initialization error: {0}")]
    Initialization(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Insufficient input: {0}")]
    InsufficientInput(String),

    #[error("Could not extract domain: {0}")]
    DomainExtraction(String),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Search API credentials are not configured")]
    SearchNotConfigured,

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("DNS error: {0}")]
    Dns(String),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("SMTP check inconclusive: {0}")]
    SmtpInconclusive(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Background task failed: {0}")]
    Join(String),
}

impl AppError {
    /// True for failures caused by the caller's input rather than by the service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AppError::InvalidInput(_)
                | AppError::InsufficientInput(_)
                | AppError::DomainExtraction(_)
                | AppError::UrlParse(_)
        )
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Join(err.to_string())
    }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
