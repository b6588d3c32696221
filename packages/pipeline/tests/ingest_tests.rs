mod common;

use std::fs;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use tempfile::{tempdir, TempDir};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use doclens_crawler::ContentStore;
use doclens_pipeline::categories::CategoryKey;
use doclens_pipeline::classification::{Classifier, LlmProvider};
use doclens_pipeline::documents::{find_by_filename, list_documents};
use doclens_pipeline::ingest::{ingest_crawled, ingest_upload, IngestContext};
use doclens_pipeline::models::DocumentSource;
use doclens_pipeline::PipelineError;

const HR_ANSWER: &str =
    r#"{"type": "HUMAN_RESOURCES", "summary": "A leave application.", "confidence": 88}"#;

async fn context(server: &MockServer, tmp: &TempDir) -> IngestContext {
    let pool = common::test_pool().await;
    let classifier =
        Classifier::from_config(&common::classifier_config(server, LlmProvider::OpenAi)).unwrap();
    let store = ContentStore::open(tmp.path().join("raw")).unwrap();
    IngestContext::new(pool, Arc::new(classifier), store)
}

#[tokio::test]
async fn test_upload_is_stored_classified_and_persisted() {
    let server = MockServer::start().await;
    common::mount_openai(&server, HR_ANSWER).await;
    let tmp = tempdir().unwrap();
    let ctx = context(&server, &tmp).await;

    let outcome = ingest_upload(&ctx, "leave.txt", b"I request three days of leave.".to_vec())
        .await
        .unwrap();

    assert_eq!(outcome.classification.doc_type, CategoryKey::HumanResources);
    assert_eq!(outcome.document.source, DocumentSource::Manual);
    assert_eq!(outcome.document.doc_type.as_deref(), Some("HUMAN_RESOURCES"));
    assert_eq!(
        fs::read_to_string(tmp.path().join("raw").join("leave.txt")).unwrap(),
        "I request three days of leave."
    );
}

#[tokio::test]
async fn test_upload_strips_directories_from_filename() {
    let server = MockServer::start().await;
    common::mount_openai(&server, HR_ANSWER).await;
    let tmp = tempdir().unwrap();
    let ctx = context(&server, &tmp).await;

    let outcome = ingest_upload(&ctx, "../../etc/leave.txt", b"leave".to_vec())
        .await
        .unwrap();

    assert_eq!(outcome.document.filename, "leave.txt");
    assert!(tmp.path().join("raw").join("leave.txt").exists());
}

#[tokio::test]
async fn test_upload_without_text_is_extraction_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let tmp = tempdir().unwrap();
    let ctx = context(&server, &tmp).await;

    let err = ingest_upload(&ctx, "scan.pdf", b"not really a pdf".to_vec())
        .await
        .unwrap_err();

    assert!(err.is_extraction());
    assert!(list_documents(&ctx.pool).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_rejects_empty_filename() {
    let server = MockServer::start().await;
    let tmp = tempdir().unwrap();
    let ctx = context(&server, &tmp).await;

    let err = ingest_upload(&ctx, "   ", b"x".to_vec()).await.unwrap_err();
    assert!(matches!(err, PipelineError::InvalidInput(_)));
}

#[tokio::test]
async fn test_crawled_files_skip_known_and_unreadable() {
    let server = MockServer::start().await;
    common::mount_openai(&server, HR_ANSWER).await;
    let tmp = tempdir().unwrap();
    let ctx = context(&server, &tmp).await;

    ctx.store.put("known.txt", b"known").unwrap();
    ctx.store.put("fresh.txt", b"fresh text").unwrap();
    ctx.store.put("blank.txt", b"   ").unwrap();
    ingest_upload(&ctx, "known.txt", b"known".to_vec()).await.unwrap();

    let files = vec![
        "known.txt".to_string(),
        "fresh.txt".to_string(),
        "blank.txt".to_string(),
    ];
    let added = ingest_crawled(&ctx, &files).await.unwrap();

    assert_eq!(added, vec!["fresh.txt".to_string()]);
    let fresh = find_by_filename(&ctx.pool, "fresh.txt").await.unwrap().unwrap();
    assert_eq!(fresh.source, DocumentSource::Crawl);
    assert!(find_by_filename(&ctx.pool, "blank.txt").await.unwrap().is_none());
    assert_eq!(list_documents(&ctx.pool).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_crawled_file_with_llm_outage_is_stored_as_others() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let tmp = tempdir().unwrap();
    let ctx = context(&server, &tmp).await;
    ctx.store.put("memo.txt", b"memo").unwrap();

    let added = ingest_crawled(&ctx, &["memo.txt".to_string()]).await.unwrap();

    assert_eq!(added, vec!["memo.txt".to_string()]);
    let doc = find_by_filename(&ctx.pool, "memo.txt").await.unwrap().unwrap();
    assert_eq!(doc.doc_type.as_deref(), Some("OTHERS"));
    assert_eq!(doc.summary.as_deref(), Some("LLM error"));
    assert_eq!(doc.confidence, Some(0));
}
