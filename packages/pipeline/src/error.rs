use std::path::PathBuf;

use doclens_crawler::CrawlerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot extract text from {}: {reason}", path.display())]
    Extraction { path: PathBuf, reason: String },

    #[error("no text found in {}", path.display())]
    EmptyText { path: PathBuf },

    #[error("crawl failed: {0}")]
    Crawl(#[from] CrawlerError),

    #[error("background task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("LLM API request failed: {0}")]
    LlmApiRequest(#[from] reqwest::Error),

    #[error("LLM API error (status {status}): {message}")]
    LlmApiError { status: u16, message: String },

    #[error("LLM rate limited, retry after {retry_after_secs}s")]
    LlmRateLimited { retry_after_secs: u64 },

    #[error("failed to parse LLM response: {0}")]
    LlmResponseParse(String),

    #[error("LLM returned empty response")]
    LlmEmptyResponse,
}

impl PipelineError {
    /// Whether the error came from reading the document rather than from
    /// infrastructure.
    pub fn is_extraction(&self) -> bool {
        matches!(self, Self::Extraction { .. } | Self::EmptyText { .. })
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
