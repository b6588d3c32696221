use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use doclens_crawler::config::{DEFAULT_AUDIT_LOG, DEFAULT_CONTENT_DIR};
use doclens_crawler::CrawlerConfig;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";
pub const DEFAULT_MAX_UPLOAD_MB: usize = 25;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// Content store shared by uploads and the crawler.
    pub data_dir: PathBuf,
    pub crawl_log: PathBuf,
    pub cors_origins: Vec<String>,
    pub max_upload_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            data_dir: PathBuf::from(DEFAULT_CONTENT_DIR),
            crawl_log: PathBuf::from(DEFAULT_AUDIT_LOG),
            cors_origins: vec![DEFAULT_CORS_ORIGIN.to_string()],
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let bind_addr = match env::var("BIND_ADDR") {
            Ok(v) => v.parse().unwrap_or_else(|e| {
                tracing::warn!(value = %v, error = %e, "invalid BIND_ADDR, using {DEFAULT_BIND_ADDR}");
                defaults.bind_addr
            }),
            Err(_) => defaults.bind_addr,
        };

        let data_dir = env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let crawl_log = env::var("CRAWL_LOG_FILE")
            .map(PathBuf::from)
            .unwrap_or(defaults.crawl_log);

        let cors_origins = env::var("CORS_ORIGINS")
            .map(|v| parse_origins(&v))
            .unwrap_or(defaults.cors_origins);

        let max_upload_bytes = env::var("MAX_UPLOAD_MB")
            .ok()
            .and_then(|v| upload_limit_bytes(&v))
            .unwrap_or(defaults.max_upload_bytes);

        Self {
            bind_addr,
            data_dir,
            crawl_log,
            cors_origins,
            max_upload_bytes,
        }
    }

    /// Crawler settings writing into this service's content store.
    pub fn crawler_config(&self) -> CrawlerConfig {
        CrawlerConfig::default()
            .with_content_dir(&self.data_dir)
            .with_audit_log(&self.crawl_log)
    }
}

/// Megabytes to bytes; `None` when unparsable or too large for `usize`.
fn upload_limit_bytes(raw: &str) -> Option<usize> {
    raw.trim().parse::<usize>().ok()?.checked_mul(1024 * 1024)
}

/// Split a comma-separated origin list, dropping blanks.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}
