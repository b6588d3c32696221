//! Error types for the crawler.
//!
//! `CrawlerError` describes what went wrong; [`policy_for`] decides what the
//! orchestrator does about it. Keeping the two apart lets each recovery rule
//! be tested on its own.

use thiserror::Error;

/// Main error type for the crawler library.
#[derive(Debug, Error)]
pub enum CrawlerError {
    /// DNS, connect, TLS or timeout failure.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Upstream answered with something other than 200.
    #[error("HTTP {status} from {url}")]
    UpstreamStatus { url: String, status: u16 },

    /// Still 403 after retrying with a Referer header.
    #[error("HTTP 403 from {url} persisted after Referer retry")]
    ForbiddenRetryExhausted { url: String },

    /// An href could not be resolved to an absolute URL.
    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// Caller passed a crawl bound below 1.
    #[error("{name} must be at least 1, got {value}")]
    InvalidLimit { name: &'static str, value: u64 },

    /// HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    /// A single downloaded file could not be written to the content store.
    #[error("cannot store {filename}: {source}")]
    Persist {
        filename: String,
        #[source]
        source: std::io::Error,
    },

    /// IO error on the content store.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Audit log could not be written.
    #[error("audit log write failed: {0}")]
    AuditLog(#[from] csv::Error),
}

/// Result type alias for crawler operations.
pub type Result<T> = std::result::Result<T, CrawlerError>;

/// Where in the crawl an error happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CrawlStage {
    Listing,
    Detail,
    Download,
}

/// What the orchestrator does with an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Abandon this dataset or file and continue with the next one.
    SkipItem,
    /// Abandon this listing page and continue with the next page.
    SkipPage,
    /// Stop the crawl and return the error to the caller.
    Abort,
}

/// The recovery policy table.
///
/// | error                        | listing    | detail     | download   |
/// |------------------------------|------------|------------|------------|
/// | transport / upstream status  | `SkipPage` | `SkipItem` | `SkipItem` |
/// | invalid URL                  | `SkipPage` | `SkipItem` | `SkipItem` |
/// | 403 after Referer retry      | -          | -          | `SkipItem` |
/// | one file not persisted       | -          | -          | `SkipItem` |
/// | IO / audit log / client      | `Abort`    | `Abort`    | `Abort`    |
/// | invalid limit                | `Abort`    | `Abort`    | `Abort`    |
pub fn policy_for(stage: CrawlStage, error: &CrawlerError) -> FailurePolicy {
    match error {
        CrawlerError::Transport { .. }
        | CrawlerError::UpstreamStatus { .. }
        | CrawlerError::InvalidUrl { .. } => match stage {
            CrawlStage::Listing => FailurePolicy::SkipPage,
            CrawlStage::Detail | CrawlStage::Download => FailurePolicy::SkipItem,
        },
        CrawlerError::ForbiddenRetryExhausted { .. } | CrawlerError::Persist { .. } => {
            FailurePolicy::SkipItem
        }
        CrawlerError::InvalidLimit { .. }
        | CrawlerError::ClientBuild(_)
        | CrawlerError::Io(_)
        | CrawlerError::AuditLog(_) => FailurePolicy::Abort,
    }
}
