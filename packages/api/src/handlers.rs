use std::collections::BTreeMap;

use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use doclens_pipeline::categories::list_categories;
use doclens_pipeline::classification::Classification;
use doclens_pipeline::documents::{category_stats, list_documents};
use doclens_pipeline::ingest::{ingest_crawled, ingest_upload, run_crawl};
use doclens_pipeline::models::DocumentSource;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

/// Multipart field carrying the uploaded file.
const UPLOAD_FIELD: &str = "file";

pub async fn root() -> Json<Value> {
    Json(json!({ "message": "LLM Document Classifier API is running" }))
}

pub async fn health(State(state): State<AppState>) -> Result<&'static str, StatusCode> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(state.pool())
        .await
        .map_err(|_| StatusCode::SERVICE_UNAVAILABLE)?;
    Ok("OK")
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub status: &'static str,
    pub document_id: i64,
    pub classification: Classification,
}

pub async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart = multipart?;
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;
        upload = Some((filename, bytes));
        break;
    }

    let Some((filename, bytes)) = upload else {
        return Err(ApiError::Unprocessable(format!(
            "multipart field '{UPLOAD_FIELD}' is required"
        )));
    };

    let outcome = ingest_upload(&state.ingest, &filename, bytes.to_vec()).await?;

    Ok(Json(UploadResponse {
        status: "ok",
        document_id: outcome.document.id,
        classification: outcome.classification,
    }))
}

fn default_max_files() -> usize {
    5
}

fn default_max_pages() -> u32 {
    20
}

#[derive(Debug, Deserialize)]
pub struct CrawlParams {
    #[serde(default = "default_max_files")]
    pub max_files: usize,
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
}

#[derive(Debug, Serialize)]
pub struct CrawlResponse {
    pub crawled: usize,
    pub files_added: Vec<String>,
}

pub async fn crawl(
    State(state): State<AppState>,
    params: Result<Query<CrawlParams>, QueryRejection>,
) -> Result<Json<CrawlResponse>, ApiError> {
    let Query(params) = params?;
    let _guard = state.crawl_lock.lock().await;
    tracing::info!(max_files = params.max_files, max_pages = params.max_pages, "crawl requested");

    let report = run_crawl((*state.crawler).clone(), params.max_files, params.max_pages).await?;
    if !report.failures.is_empty() {
        tracing::warn!(failures = report.failures.len(), "crawl recovered from errors");
    }

    let files_added = ingest_crawled(&state.ingest, &report.downloaded).await?;

    Ok(Json(CrawlResponse {
        crawled: files_added.len(),
        files_added,
    }))
}

#[derive(Debug, Serialize)]
pub struct DocumentView {
    pub id: i64,
    pub filename: String,
    #[serde(rename = "type")]
    pub doc_type: Option<String>,
    pub confidence: Option<i64>,
    pub source: DocumentSource,
    pub created_at: DateTime<Utc>,
}

pub async fn documents(State(state): State<AppState>) -> Result<Json<Vec<DocumentView>>, ApiError> {
    let docs = list_documents(state.pool()).await?;
    Ok(Json(
        docs.into_iter()
            .map(|d| DocumentView {
                id: d.id,
                filename: d.filename,
                doc_type: d.doc_type,
                confidence: d.confidence,
                source: d.source,
                created_at: d.created_at,
            })
            .collect(),
    ))
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub stats: BTreeMap<String, i64>,
}

pub async fn stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
    let stats = category_stats(state.pool()).await?;
    Ok(Json(StatsResponse { stats }))
}

#[derive(Debug, Serialize)]
pub struct CategoryView {
    pub key: String,
    pub description: Option<String>,
}

pub async fn categories(State(state): State<AppState>) -> Result<Json<Vec<CategoryView>>, ApiError> {
    let items = list_categories(state.pool()).await?;
    Ok(Json(
        items
            .into_iter()
            .map(|c| CategoryView {
                key: c.key,
                description: c.description,
            })
            .collect(),
    ))
}
