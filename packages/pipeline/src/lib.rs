//! DocLens pipeline - from stored files to classified document rows.
//!
//! - [`extract`]: Plain text from PDF, DOCX and text files
//! - [`categories`]: The fixed category catalogue and label normalization
//! - [`classification`]: LLM clients, prompt and response repair
//! - [`documents`]: Document persistence queries
//! - [`ingest`]: Upload and crawl ingestion services

pub mod categories;
pub mod classification;
pub mod config;
pub mod db;
pub mod documents;
pub mod error;
pub mod extract;
pub mod ingest;
pub mod models;

pub use categories::CategoryKey;
pub use classification::{Classification, Classifier, ClassifierConfig};
pub use config::PipelineConfig;
pub use db::{create_pool, run_migrations};
pub use error::{PipelineError, Result};
pub use ingest::IngestContext;
pub use models::{Category, Document, DocumentSource, NewDocument};
