//! Search-results listing pagination.
//!
//! Each listing page links to dataset detail pages; those links are what the
//! crawler descends into.

use std::sync::LazyLock;

use scraper::{Html, Selector};
use url::Url;

use crate::config::{listing_url, CrawlerConfig};
use crate::error::{CrawlerError, Result};
use crate::http::Fetch;

/// Anchors carrying an href.
#[allow(clippy::expect_used)] // Static selector that is guaranteed to be valid
pub(crate) static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid selector"));

/// One listing page to be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTarget {
    pub page: u32,
    pub url: String,
}

impl CrawlTarget {
    pub fn new(config: &CrawlerConfig, page: u32) -> Self {
        Self {
            page,
            url: listing_url(&config.listing_url_template, page),
        }
    }
}

/// Collect every href on the page that passes `keep`, resolved against `base`.
///
/// Hrefs that fail to resolve are dropped. Duplicates keep their first position.
pub(crate) fn collect_links(html: &str, base: &Url, keep: impl Fn(&str, &Url) -> bool) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut links: Vec<String> = Vec::new();

    for anchor in document.select(&ANCHOR_SELECTOR) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let href = href.trim();
        let Ok(resolved) = base.join(href) else {
            tracing::debug!(href, "skipping unresolvable href");
            continue;
        };
        if !keep(href, &resolved) {
            continue;
        }
        let resolved = resolved.to_string();
        if !links.contains(&resolved) {
            links.push(resolved);
        }
    }

    links
}

fn parse_base(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|source| CrawlerError::InvalidUrl {
        url: url.to_string(),
        source,
    })
}

/// Extract absolute dataset detail URLs from a listing page.
///
/// Keeps anchors whose raw href contains `marker`.
pub fn parse_dataset_links(html: &str, page_url: &str, marker: &str) -> Result<Vec<String>> {
    let base = parse_base(page_url)?;
    Ok(collect_links(html, &base, |href, _| href.contains(marker)))
}

/// Fetch one listing page and return its dataset links.
///
/// A non-200 answer is an `UpstreamStatus` error; an empty vector means the
/// page was served but linked to no datasets.
#[tracing::instrument(skip(fetcher, config, target), fields(page = target.page))]
pub fn list_datasets<F: Fetch + ?Sized>(
    fetcher: &F,
    config: &CrawlerConfig,
    target: &CrawlTarget,
) -> Result<Vec<String>> {
    let response = fetcher.get(&target.url, config.page_timeout, None)?;
    if !response.is_ok() {
        return Err(CrawlerError::UpstreamStatus {
            url: target.url.clone(),
            status: response.status,
        });
    }

    let links = parse_dataset_links(&response.text(), &target.url, &config.dataset_marker)?;
    tracing::info!(url = %target.url, datasets = links.len(), "listing page parsed");
    Ok(links)
}
