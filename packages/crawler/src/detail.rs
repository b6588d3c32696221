//! Dataset detail pages: discovering downloadable file links.

use url::Url;

use crate::config::CrawlerConfig;
use crate::error::{CrawlerError, Result};
use crate::http::Fetch;
use crate::listing::collect_links;

/// A downloadable file discovered on a detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    pub url: String,
    /// Final URL path segment, percent-decoded. Never empty.
    pub filename: String,
}

impl FileCandidate {
    /// Build a candidate, or `None` when no usable filename can be derived.
    pub fn from_url(url: &str) -> Option<Self> {
        let filename = derive_filename(url)?;
        Some(Self {
            url: url.to_string(),
            filename,
        })
    }
}

/// Whether the URL's path ends in one of `extensions` (case-insensitive).
///
/// Query strings and fragments are ignored.
pub fn has_allowed_extension(url: &Url, extensions: &[String]) -> bool {
    let path = url.path().to_lowercase();
    extensions.iter().any(|ext| path.ends_with(&ext.to_lowercase()))
}

/// Derive the content-store filename from a file URL.
///
/// Returns `None` for an empty last segment or one that would escape the
/// content store once decoded.
///
/// # Examples
/// ```
/// use doclens_crawler::detail::derive_filename;
///
/// assert_eq!(derive_filename("https://x.org/files/Annual%20Report.pdf").as_deref(), Some("Annual Report.pdf"));
/// assert_eq!(derive_filename("https://x.org/files/"), None);
/// ```
pub fn derive_filename(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let segment = parsed.path_segments()?.next_back()?;
    let decoded = urlencoding::decode(segment).ok()?.into_owned();

    let unsafe_name = decoded.is_empty()
        || decoded == "."
        || decoded == ".."
        || decoded.contains('/')
        || decoded.contains('\\')
        || decoded.contains('\0');
    if unsafe_name {
        return None;
    }
    Some(decoded)
}

/// Extract absolute file URLs with an allowed extension from a detail page.
pub fn parse_file_links(html: &str, dataset_url: &str, extensions: &[String]) -> Result<Vec<String>> {
    let base = Url::parse(dataset_url).map_err(|source| CrawlerError::InvalidUrl {
        url: dataset_url.to_string(),
        source,
    })?;
    Ok(collect_links(html, &base, |_, resolved| {
        has_allowed_extension(resolved, extensions)
    }))
}

/// Fetch a dataset detail page and return its file candidates.
///
/// Links whose filename cannot be derived are dropped here.
#[tracing::instrument(skip(fetcher, config))]
pub fn list_files<F: Fetch + ?Sized>(
    fetcher: &F,
    config: &CrawlerConfig,
    dataset_url: &str,
) -> Result<Vec<FileCandidate>> {
    let response = fetcher.get(dataset_url, config.page_timeout, None)?;
    if !response.is_ok() {
        return Err(CrawlerError::UpstreamStatus {
            url: dataset_url.to_string(),
            status: response.status,
        });
    }

    let links = parse_file_links(&response.text(), dataset_url, &config.allowed_extensions)?;
    let candidates: Vec<FileCandidate> = links
        .iter()
        .filter_map(|link| {
            let candidate = FileCandidate::from_url(link);
            if candidate.is_none() {
                tracing::debug!(url = %link, "no usable filename, skipping");
            }
            candidate
        })
        .collect();

    tracing::info!(dataset = dataset_url, files = candidates.len(), "detail page parsed");
    Ok(candidates)
}
