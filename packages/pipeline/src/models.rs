use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classification::Classification;

/// How a document entered the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DocumentSource {
    /// Uploaded through the API.
    Manual,
    /// Downloaded by the crawler.
    Crawl,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Document {
    pub id: i64,
    pub filename: String,
    /// Category key assigned by the classifier.
    pub doc_type: Option<String>,
    pub summary: Option<String>,
    pub confidence: Option<i64>,
    pub source: DocumentSource,
    pub created_at: DateTime<Utc>,
}

/// A document row about to be inserted.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub filename: String,
    pub classification: Classification,
    pub source: DocumentSource,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    pub key: String,
    pub description: Option<String>,
}
