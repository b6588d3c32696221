//! Crawl orchestrator.
//!
//! The crawl is a small state machine: it is either paging through listing
//! pages or done. Every unit of work (a page, a dataset, a file) is preceded
//! by the same `max_files` check, so reaching the limit stops all levels at
//! once.

use serde::Serialize;

use crate::config::{validate_limits, CrawlerConfig};
use crate::detail::list_files;
use crate::download::{DownloadManager, DownloadOutcome, SkipReason};
use crate::error::{policy_for, CrawlStage, CrawlerError, FailurePolicy, Result};
use crate::http::{Fetch, HttpFetcher};
use crate::listing::{list_datasets, CrawlTarget};
use crate::store::{AuditLog, ContentStore};

/// Why a crawl ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StopReason {
    /// `max_files` new files were downloaded.
    MaxFilesReached,
    /// A listing page was served but linked to no datasets.
    EmptyListing { page: u32 },
    /// All `max_pages` pages were processed.
    #[default]
    PagesExhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CrawlState {
    Paging { page: u32 },
    Done(StopReason),
}

/// A file candidate that produced no download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub filename: String,
    pub url: String,
    pub reason: SkipReason,
}

/// An error the crawl recovered from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrawlFailure {
    pub stage: CrawlStage,
    pub url: String,
    pub error: String,
}

/// Everything one crawl invocation did.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CrawlReport {
    /// Filenames downloaded by this invocation, in download order.
    pub downloaded: Vec<String>,
    pub skipped: Vec<SkippedFile>,
    pub failures: Vec<CrawlFailure>,
    pub pages_visited: u32,
    pub stop_reason: StopReason,
}

/// Sequential crawler over the listing, detail pages and files.
pub struct Crawler<F: Fetch = HttpFetcher> {
    fetcher: F,
    config: CrawlerConfig,
    store: ContentStore,
    audit: AuditLog,
}

impl Crawler<HttpFetcher> {
    /// Crawler using the real HTTP fetcher.
    pub fn new(config: CrawlerConfig) -> Result<Self> {
        Self::with_fetcher(HttpFetcher::new()?, config)
    }
}

impl<F: Fetch> Crawler<F> {
    pub fn with_fetcher(fetcher: F, config: CrawlerConfig) -> Result<Self> {
        let store = ContentStore::open(&config.content_dir)?;
        let audit = AuditLog::new(&config.audit_log);
        Ok(Self {
            fetcher,
            config,
            store,
            audit,
        })
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    /// Crawl up to `max_pages` listing pages, downloading at most `max_files`
    /// new files.
    ///
    /// Only invalid limits and errors whose policy is `Abort` (the content
    /// store or audit log failing) are returned as `Err`; every upstream
    /// problem is recorded in the report and the crawl moves on.
    #[tracing::instrument(skip(self))]
    pub fn crawl(&self, max_files: usize, max_pages: u32) -> Result<CrawlReport> {
        validate_limits(max_files, max_pages)?;

        let mut report = CrawlReport::default();
        let mut state = CrawlState::Paging { page: 1 };

        while let CrawlState::Paging { page } = state {
            state = self.crawl_page(page, max_files, max_pages, &mut report)?;
        }
        if let CrawlState::Done(reason) = state {
            report.stop_reason = reason;
        }

        tracing::info!(
            downloaded = report.downloaded.len(),
            skipped = report.skipped.len(),
            failures = report.failures.len(),
            pages = report.pages_visited,
            stop_reason = ?report.stop_reason,
            "crawl finished"
        );
        Ok(report)
    }

    fn crawl_page(
        &self,
        page: u32,
        max_files: usize,
        max_pages: u32,
        report: &mut CrawlReport,
    ) -> Result<CrawlState> {
        if is_done(report, max_files) {
            return Ok(CrawlState::Done(StopReason::MaxFilesReached));
        }
        let target = CrawlTarget::new(&self.config, page);
        report.pages_visited += 1;
        tracing::info!(page, url = %target.url, "crawling listing page");

        let datasets = match list_datasets(&self.fetcher, &self.config, &target) {
            Ok(datasets) => datasets,
            Err(e) => {
                recover(CrawlStage::Listing, &target.url, e, report)?;
                return Ok(after_page(page, max_pages));
            }
        };

        if datasets.is_empty() {
            tracing::info!(page, "no dataset links, stopping");
            return Ok(CrawlState::Done(StopReason::EmptyListing { page }));
        }

        let manager = DownloadManager::new(&self.fetcher, &self.config, &self.store, &self.audit);

        for dataset_url in &datasets {
            if is_done(report, max_files) {
                return Ok(CrawlState::Done(StopReason::MaxFilesReached));
            }

            let files = match list_files(&self.fetcher, &self.config, dataset_url) {
                Ok(files) => files,
                Err(e) => {
                    recover(CrawlStage::Detail, dataset_url, e, report)?;
                    continue;
                }
            };

            for file in &files {
                if is_done(report, max_files) {
                    return Ok(CrawlState::Done(StopReason::MaxFilesReached));
                }

                match manager.download(file, dataset_url) {
                    Ok(DownloadOutcome::Downloaded(filename)) => report.downloaded.push(filename),
                    Ok(DownloadOutcome::Skipped(reason)) => report.skipped.push(SkippedFile {
                        filename: file.filename.clone(),
                        url: file.url.clone(),
                        reason,
                    }),
                    Err(e) => recover(CrawlStage::Download, &file.url, e, report)?,
                }
            }
        }

        Ok(after_page(page, max_pages))
    }
}

/// State after `page` has been handled.
fn after_page(page: u32, max_pages: u32) -> CrawlState {
    if page >= max_pages {
        CrawlState::Done(StopReason::PagesExhausted)
    } else {
        CrawlState::Paging { page: page + 1 }
    }
}

fn is_done(report: &CrawlReport, max_files: usize) -> bool {
    report.downloaded.len() >= max_files
}

/// Apply the failure policy: record and continue, or propagate.
fn recover(stage: CrawlStage, url: &str, error: CrawlerError, report: &mut CrawlReport) -> Result<()> {
    match policy_for(stage, &error) {
        FailurePolicy::SkipItem | FailurePolicy::SkipPage => {
            tracing::warn!(?stage, url, error = %error, "skipping after error");
            report.failures.push(CrawlFailure {
                stage,
                url: url.to_string(),
                error: error.to_string(),
            });
            Ok(())
        }
        FailurePolicy::Abort => {
            tracing::error!(?stage, url, error = %error, "aborting crawl");
            Err(error)
        }
    }
}
