use std::sync::Arc;

use doclens_crawler::CrawlerConfig;
use doclens_pipeline::IngestContext;
use sqlx::SqlitePool;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub ingest: IngestContext,
    pub crawler: Arc<CrawlerConfig>,
    /// Held for the whole of a crawl; one crawl runs at a time.
    pub crawl_lock: Arc<Mutex<()>>,
}

impl AppState {
    /// The crawler is pointed at the ingest content store so crawled files
    /// are where ingestion looks for them.
    pub fn new(ingest: IngestContext, crawler: CrawlerConfig) -> Self {
        let crawler = crawler.with_content_dir(ingest.store.root());
        Self {
            ingest,
            crawler: Arc::new(crawler),
            crawl_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.ingest.pool
    }
}
