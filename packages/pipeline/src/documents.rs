use std::collections::BTreeMap;

use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::{Document, NewDocument};

/// Insert a classified document and return the stored row.
pub async fn insert_document(pool: &SqlitePool, new: &NewDocument) -> Result<Document> {
    let doc = sqlx::query_as::<_, Document>(
        r#"
        INSERT INTO documents (filename, doc_type, summary, confidence, source, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(&new.filename)
    .bind(new.classification.doc_type.as_str())
    .bind(&new.classification.summary)
    .bind(i64::from(new.classification.confidence))
    .bind(new.source)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    tracing::info!(id = doc.id, filename = %doc.filename, "document stored");
    Ok(doc)
}

/// The most recent row for `filename`, if any.
pub async fn find_by_filename(pool: &SqlitePool, filename: &str) -> Result<Option<Document>> {
    let doc = sqlx::query_as::<_, Document>(
        r#"
        SELECT * FROM documents
        WHERE filename = $1
        ORDER BY created_at DESC, id DESC
        LIMIT 1
        "#,
    )
    .bind(filename)
    .fetch_optional(pool)
    .await?;

    Ok(doc)
}

/// All documents, newest first.
pub async fn list_documents(pool: &SqlitePool) -> Result<Vec<Document>> {
    let docs = sqlx::query_as::<_, Document>(
        r#"
        SELECT * FROM documents
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(docs)
}

/// Number of documents per category key. Rows without a type are not counted.
pub async fn category_stats(pool: &SqlitePool) -> Result<BTreeMap<String, i64>> {
    let rows = sqlx::query_as::<_, (String, i64)>(
        r#"
        SELECT doc_type, COUNT(*) FROM documents
        WHERE doc_type IS NOT NULL AND doc_type != ''
        GROUP BY doc_type
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().collect())
}

/// Delete every document row. Returns the number removed.
pub async fn delete_all_documents(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM documents").execute(pool).await?;
    Ok(result.rows_affected())
}
