//! Configuration constants and validation functions for the crawler.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{CrawlerError, Result};

/// Search-results listing on the open-data catalog, filtered to PDF resources
/// and sorted by recent views. `{page}` is replaced by the 1-based page index.
pub const LISTING_URL_TEMPLATE: &str = "https://catalog.data.gov/dataset/?q=pdf&sort=views_recent+desc&ext_location=&ext_bbox=&ext_prev_extent=&res_format=PDF&page={page}";

/// Placeholder substituted by [`listing_url`].
pub const PAGE_PLACEHOLDER: &str = "{page}";

/// Substring an href must contain to be treated as a dataset detail page.
pub const DATASET_PATH_MARKER: &str = "/dataset/";

/// File extensions the crawler downloads (compared lower-cased).
pub const ALLOWED_EXTENSIONS: &[&str] = &[".pdf", ".docx", ".txt"];

/// Timeout for listing and detail page requests.
pub const PAGE_TIMEOUT_SECS: u64 = 10;

/// Timeout for file downloads.
pub const DOWNLOAD_TIMEOUT_SECS: u64 = 20;

/// Wait before retrying a download that answered 403.
pub const FORBIDDEN_RETRY_DELAY_MS: u64 = 1_000;

/// Pause after every successful download.
pub const DOWNLOAD_DELAY_MS: u64 = 1_000;

/// Directory holding downloaded files, keyed by filename.
pub const DEFAULT_CONTENT_DIR: &str = "data/raw";

/// Append-only CSV audit log of successful downloads.
pub const DEFAULT_AUDIT_LOG: &str = "data/crawl_log.csv";

/// Browser user agent, so the catalog serves the same pages it serves a person.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                              (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Language preference sent with every request.
pub const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// Runtime view of the crawler constants.
///
/// `Default` yields exactly the constants above. The `with_*` methods exist so
/// a caller can point the crawler at another upstream (a mock server in tests)
/// or relocate the content store.
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    pub listing_url_template: String,
    pub dataset_marker: String,
    pub allowed_extensions: Vec<String>,
    pub page_timeout: Duration,
    pub download_timeout: Duration,
    pub forbidden_retry_delay: Duration,
    pub download_delay: Duration,
    pub content_dir: PathBuf,
    pub audit_log: PathBuf,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            listing_url_template: LISTING_URL_TEMPLATE.to_string(),
            dataset_marker: DATASET_PATH_MARKER.to_string(),
            allowed_extensions: ALLOWED_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            page_timeout: Duration::from_secs(PAGE_TIMEOUT_SECS),
            download_timeout: Duration::from_secs(DOWNLOAD_TIMEOUT_SECS),
            forbidden_retry_delay: Duration::from_millis(FORBIDDEN_RETRY_DELAY_MS),
            download_delay: Duration::from_millis(DOWNLOAD_DELAY_MS),
            content_dir: PathBuf::from(DEFAULT_CONTENT_DIR),
            audit_log: PathBuf::from(DEFAULT_AUDIT_LOG),
        }
    }
}

impl CrawlerConfig {
    pub fn with_listing_url_template(mut self, template: impl Into<String>) -> Self {
        self.listing_url_template = template.into();
        self
    }

    pub fn with_content_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.content_dir = dir.into();
        self
    }

    pub fn with_audit_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.audit_log = path.into();
        self
    }

    /// Set both politeness delays (403 backoff and inter-download pause).
    pub fn with_delays(mut self, forbidden_retry: Duration, between_downloads: Duration) -> Self {
        self.forbidden_retry_delay = forbidden_retry;
        self.download_delay = between_downloads;
        self
    }

    pub fn with_timeouts(mut self, page: Duration, download: Duration) -> Self {
        self.page_timeout = page;
        self.download_timeout = download;
        self
    }
}

/// Build the listing URL for a page.
///
/// # Examples
/// ```
/// use doclens_crawler::config::listing_url;
///
/// assert_eq!(
///     listing_url("https://example.org/dataset/?page={page}", 3),
///     "https://example.org/dataset/?page=3"
/// );
/// ```
pub fn listing_url(template: &str, page: u32) -> String {
    if template.contains(PAGE_PLACEHOLDER) {
        template.replace(PAGE_PLACEHOLDER, &page.to_string())
    } else {
        format!("{template}{page}")
    }
}

/// Validate the caller-supplied crawl bounds.
///
/// Both must be at least 1.
///
/// # Examples
/// ```
/// use doclens_crawler::config::validate_limits;
///
/// assert!(validate_limits(10, 20).is_ok());
/// assert!(validate_limits(0, 20).is_err());
/// ```
pub fn validate_limits(max_files: usize, max_pages: u32) -> Result<()> {
    if max_files < 1 {
        return Err(CrawlerError::InvalidLimit {
            name: "max_files",
            value: max_files as u64,
        });
    }
    if max_pages < 1 {
        return Err(CrawlerError::InvalidLimit {
            name: "max_pages",
            value: u64::from(max_pages),
        });
    }
    Ok(())
}
