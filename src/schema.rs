//! Store schema.
//!
//! The store is always created from scratch inside the rebuild transaction,
//! so there are no incremental migrations: a schema change bumps
//! [`SCHEMA_VERSION`], which makes every existing store stale.

use anyhow::Result;
use sqlx::{Sqlite, Transaction};

/// Version recorded in the manifest; stores with any other value are rebuilt.
pub const SCHEMA_VERSION: &str = "2";

pub async fn create_schema(tx: &mut Transaction<'_, Sqlite>) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE documents (
            id INTEGER PRIMARY KEY,
            source_file TEXT NOT NULL,
            row_id INTEGER NOT NULL,
            title TEXT NOT NULL,
            body TEXT NOT NULL,
            fields_json TEXT NOT NULL DEFAULT '{}'
        )
        "#,
    )
    .execute(&mut **tx)
    .await?;

    // External-content FTS5 table: rows are inserted with the document id as
    // rowid in the same transaction as the document itself.
    sqlx::query(
        r#"
        CREATE VIRTUAL TABLE documents_fts USING fts5(
            title,
            body,
            content='documents',
            content_rowid='id'
        )
        "#,
    )
    .execute(&mut **tx)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE sources (
            source_file TEXT PRIMARY KEY,
            row_count INTEGER NOT NULL,
            columns_json TEXT NOT NULL
        )
        "#,
    )
    .execute(&mut **tx)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE manifest (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )
        "#,
    )
    .execute(&mut **tx)
    .await?;

    sqlx::query("CREATE INDEX idx_documents_source ON documents(source_file, row_id)")
        .execute(&mut **tx)
        .await?;

    Ok(())
}
