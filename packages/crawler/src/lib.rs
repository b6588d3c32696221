//! DocLens Crawler - Download business documents from an open-data catalog.
//!
//! The crawler pages through a search-results listing, follows every
//! dataset detail page it links to, and downloads the PDF, DOCX and TXT
//! files those pages offer. Files already in the content store are never
//! fetched again, and every successful download is appended to a CSV audit
//! log.
//!
//! # Example
//!
//! ```
//! use doclens_crawler::config::{listing_url, validate_limits, LISTING_URL_TEMPLATE};
//!
//! assert!(validate_limits(5, 20).is_ok());
//! assert!(listing_url(LISTING_URL_TEMPLATE, 2).ends_with("page=2"));
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Constants, `CrawlerConfig` and limit validation
//! - [`error`]: Error types and the recovery policy table
//! - [`http`]: HTTP fetcher with per-request Referer support
//! - [`listing`]: Listing pagination and dataset link discovery
//! - [`detail`]: File link discovery on dataset pages
//! - [`store`]: Content store and audit log
//! - [`download`]: Download manager (dedup, 403 retry, pacing)
//! - [`crawl`]: Orchestrator state machine
//! - [`cli`]: Command-line interface

pub mod cli;
pub mod config;
pub mod crawl;
pub mod detail;
pub mod download;
pub mod error;
pub mod http;
pub mod listing;
pub mod store;

pub use config::{validate_limits, CrawlerConfig};
pub use crawl::{CrawlFailure, CrawlReport, Crawler, SkippedFile, StopReason};
pub use detail::FileCandidate;
pub use download::{DownloadOutcome, SkipReason};
pub use error::{CrawlStage, CrawlerError, FailurePolicy, Result};
pub use http::{Fetch, FetchResponse, HttpFetcher};
pub use store::{AuditLog, AuditRecord, ContentStore};
