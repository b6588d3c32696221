//! Download manager: dedup, fetch, 403 retry, persist, audit, pace.

use std::thread;

use serde::Serialize;

use crate::config::CrawlerConfig;
use crate::detail::FileCandidate;
use crate::error::{CrawlerError, Result};
use crate::http::Fetch;
use crate::store::{AuditLog, AuditRecord, ContentStore};

/// Why a candidate produced no new file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// Filename already in the content store.
    AlreadyPresent,
    /// Final response status was not 200.
    Status { status: u16 },
    /// 403 on both the plain request and the Referer retry.
    ForbiddenRetryExhausted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Downloaded(String),
    Skipped(SkipReason),
}

pub struct DownloadManager<'a, F: Fetch + ?Sized> {
    fetcher: &'a F,
    config: &'a CrawlerConfig,
    store: &'a ContentStore,
    audit: &'a AuditLog,
}

impl<'a, F: Fetch + ?Sized> DownloadManager<'a, F> {
    pub fn new(
        fetcher: &'a F,
        config: &'a CrawlerConfig,
        store: &'a ContentStore,
        audit: &'a AuditLog,
    ) -> Self {
        Self {
            fetcher,
            config,
            store,
            audit,
        }
    }

    /// Download one file found on `dataset_url`.
    ///
    /// Transport failures are returned as errors; every upstream refusal is a
    /// `Skipped` outcome. After a successful download the manager sleeps for
    /// the configured inter-download delay.
    #[tracing::instrument(skip(self, candidate), fields(filename = %candidate.filename))]
    pub fn download(&self, candidate: &FileCandidate, dataset_url: &str) -> Result<DownloadOutcome> {
        if self.store.exists(&candidate.filename) {
            tracing::debug!("already in content store, skipping");
            return Ok(DownloadOutcome::Skipped(SkipReason::AlreadyPresent));
        }

        tracing::info!(url = %candidate.url, "downloading");
        let mut response = self
            .fetcher
            .get(&candidate.url, self.config.download_timeout, None)?;

        let mut retried = false;
        if response.status == 403 {
            tracing::info!(referer = dataset_url, "HTTP 403, retrying with Referer");
            thread::sleep(self.config.forbidden_retry_delay);
            response = self.fetcher.get(
                &candidate.url,
                self.config.download_timeout,
                Some(dataset_url),
            )?;
            retried = true;
        }

        if !response.is_ok() {
            let reason = if retried && response.status == 403 {
                SkipReason::ForbiddenRetryExhausted
            } else {
                SkipReason::Status {
                    status: response.status,
                }
            };
            tracing::warn!(status = response.status, ?reason, "cannot download");
            return Ok(DownloadOutcome::Skipped(reason));
        }

        self.store
            .put(&candidate.filename, &response.body)
            .map_err(|e| match e {
                CrawlerError::Io(source) => CrawlerError::Persist {
                    filename: candidate.filename.clone(),
                    source,
                },
                other => other,
            })?;
        self.audit
            .append(&AuditRecord::now(&candidate.filename, &candidate.url))?;
        tracing::info!(bytes = response.body.len(), "saved");

        thread::sleep(self.config.download_delay);
        Ok(DownloadOutcome::Downloaded(candidate.filename.clone()))
    }
}
