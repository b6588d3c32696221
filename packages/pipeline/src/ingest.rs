//! Ingestion services: turning uploaded and crawled files into classified
//! document rows.

use std::path::PathBuf;
use std::sync::Arc;

use doclens_crawler::{ContentStore, CrawlReport, Crawler, CrawlerConfig};
use sqlx::SqlitePool;

use crate::classification::{Classification, Classifier};
use crate::documents::{find_by_filename, insert_document};
use crate::error::{PipelineError, Result};
use crate::extract::extract_text;
use crate::models::{Document, DocumentSource, NewDocument};

/// What ingestion needs: the database, the classifier and the content store.
#[derive(Clone)]
pub struct IngestContext {
    pub pool: SqlitePool,
    pub classifier: Arc<Classifier>,
    pub store: ContentStore,
}

impl IngestContext {
    pub fn new(pool: SqlitePool, classifier: Arc<Classifier>, store: ContentStore) -> Self {
        Self {
            pool,
            classifier,
            store,
        }
    }
}

/// A stored upload and the classification it received.
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub document: Document,
    pub classification: Classification,
}

/// Reduce a client-supplied filename to a bare, non-empty basename.
///
/// # Examples
/// ```
/// use doclens_pipeline::ingest::sanitize_filename;
///
/// assert_eq!(sanitize_filename("C:\\docs\\report.pdf").unwrap(), "report.pdf");
/// assert!(sanitize_filename("../").is_err());
/// ```
pub fn sanitize_filename(raw: &str) -> Result<String> {
    let name = raw.rsplit(['/', '\\']).next().unwrap_or_default().trim();

    if name.is_empty() || name == "." || name == ".." || name.contains('\0') {
        return Err(PipelineError::InvalidInput(format!(
            "invalid filename '{raw}'"
        )));
    }
    Ok(name.to_string())
}

async fn extract_blocking(path: PathBuf) -> Result<String> {
    tokio::task::spawn_blocking(move || extract_text(&path)).await?
}

async fn classify_and_store(
    ctx: &IngestContext,
    filename: &str,
    text: &str,
    source: DocumentSource,
) -> Result<(Document, Classification)> {
    let classification = ctx.classifier.classify(text).await;
    let document = insert_document(
        &ctx.pool,
        &NewDocument {
            filename: filename.to_string(),
            classification: classification.clone(),
            source,
        },
    )
    .await?;
    Ok((document, classification))
}

/// Store an uploaded file, extract its text, classify it and persist the
/// result with source `manual`.
///
/// The file stays in the content store even when extraction fails.
#[tracing::instrument(skip(ctx, bytes), fields(bytes = bytes.len()))]
pub async fn ingest_upload(ctx: &IngestContext, filename: &str, bytes: Vec<u8>) -> Result<UploadOutcome> {
    let filename = sanitize_filename(filename)?;

    let store = ctx.store.clone();
    let name = filename.clone();
    let path = tokio::task::spawn_blocking(move || store.put(&name, &bytes)).await??;

    let text = extract_blocking(path).await?;
    let (document, classification) =
        classify_and_store(ctx, &filename, &text, DocumentSource::Manual).await?;

    Ok(UploadOutcome {
        document,
        classification,
    })
}

/// Classify and persist crawled files that have no document row yet.
///
/// Files that cannot be read are skipped. Returns the filenames added.
#[tracing::instrument(skip(ctx, filenames), fields(files = filenames.len()))]
pub async fn ingest_crawled(ctx: &IngestContext, filenames: &[String]) -> Result<Vec<String>> {
    let mut added = Vec::new();

    for filename in filenames {
        if find_by_filename(&ctx.pool, filename).await?.is_some() {
            tracing::debug!(filename = %filename, "already classified, skipping");
            continue;
        }

        let text = match extract_blocking(ctx.store.path_for(filename)).await {
            Ok(text) => text,
            Err(e) if e.is_extraction() => {
                tracing::warn!(filename = %filename, error = %e, "skipping unreadable file");
                continue;
            }
            Err(e) => return Err(e),
        };

        classify_and_store(ctx, filename, &text, DocumentSource::Crawl).await?;
        added.push(filename.clone());
    }

    tracing::info!(added = added.len(), "crawled files ingested");
    Ok(added)
}

/// Run the blocking crawler off the async runtime.
pub async fn run_crawl(config: CrawlerConfig, max_files: usize, max_pages: u32) -> Result<CrawlReport> {
    let report = tokio::task::spawn_blocking(move || {
        let crawler = Crawler::new(config)?;
        crawler.crawl(max_files, max_pages)
    })
    .await??;
    Ok(report)
}

