mod common;

use pretty_assertions::assert_eq;

use doclens_pipeline::categories::{list_categories, seed_categories, CategoryKey};
use doclens_pipeline::classification::Classification;
use doclens_pipeline::documents::{
    category_stats, delete_all_documents, find_by_filename, insert_document, list_documents,
};
use doclens_pipeline::models::{DocumentSource, NewDocument};

fn new_doc(filename: &str, doc_type: CategoryKey, source: DocumentSource) -> NewDocument {
    NewDocument {
        filename: filename.to_string(),
        classification: Classification {
            doc_type,
            summary: format!("Summary of {filename}"),
            confidence: 80,
        },
        source,
    }
}

#[tokio::test]
async fn test_insert_and_find_document() {
    let pool = common::test_pool().await;

    let stored = insert_document(
        &pool,
        &new_doc("invoice.pdf", CategoryKey::FinanceAccounting, DocumentSource::Crawl),
    )
    .await
    .unwrap();

    assert_eq!(stored.filename, "invoice.pdf");
    assert_eq!(stored.doc_type.as_deref(), Some("FINANCE_ACCOUNTING"));
    assert_eq!(stored.confidence, Some(80));
    assert_eq!(stored.source, DocumentSource::Crawl);

    let found = find_by_filename(&pool, "invoice.pdf").await.unwrap().unwrap();
    assert_eq!(found.id, stored.id);
    assert!(find_by_filename(&pool, "missing.pdf").await.unwrap().is_none());
}

#[tokio::test]
async fn test_list_documents_newest_first() {
    let pool = common::test_pool().await;

    for name in ["first.txt", "second.txt", "third.txt"] {
        insert_document(&pool, &new_doc(name, CategoryKey::Others, DocumentSource::Manual))
            .await
            .unwrap();
    }

    let names: Vec<String> = list_documents(&pool)
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.filename)
        .collect();
    assert_eq!(names, vec!["third.txt", "second.txt", "first.txt"]);
}

#[tokio::test]
async fn test_category_stats_counts_per_type() {
    let pool = common::test_pool().await;

    let docs = [
        ("a.pdf", CategoryKey::FinanceAccounting),
        ("b.pdf", CategoryKey::FinanceAccounting),
        ("c.docx", CategoryKey::HumanResources),
    ];
    for (name, key) in docs {
        insert_document(&pool, &new_doc(name, key, DocumentSource::Crawl))
            .await
            .unwrap();
    }

    let stats = category_stats(&pool).await.unwrap();
    assert_eq!(stats.len(), 2);
    assert_eq!(stats["FINANCE_ACCOUNTING"], 2);
    assert_eq!(stats["HUMAN_RESOURCES"], 1);
}

#[tokio::test]
async fn test_delete_all_documents() {
    let pool = common::test_pool().await;
    insert_document(&pool, &new_doc("a.txt", CategoryKey::Others, DocumentSource::Manual))
        .await
        .unwrap();
    insert_document(&pool, &new_doc("b.txt", CategoryKey::Others, DocumentSource::Manual))
        .await
        .unwrap();

    assert_eq!(delete_all_documents(&pool).await.unwrap(), 2);
    assert!(list_documents(&pool).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_seed_categories_is_idempotent() {
    let pool = common::test_pool().await;

    assert_eq!(seed_categories(&pool).await.unwrap(), 7);
    assert_eq!(seed_categories(&pool).await.unwrap(), 0);

    let categories = list_categories(&pool).await.unwrap();
    assert_eq!(categories.len(), 7);
    assert_eq!(categories[0].key, "FINANCE_ACCOUNTING");
    assert_eq!(
        categories[6].description.as_deref(),
        Some("Miscellaneous documents that do not fit above categories")
    );
}
