//! Read-side storage abstraction.
//!
//! Answer strategies and stats only need a handful of read queries plus a
//! ranked keyword search. The [`Store`] trait captures exactly that, so the
//! full-text backend is a capability rather than a hard dependency on FTS5.
//! [`SqliteStore`] is the production implementation.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::collections::HashMap;
use std::path::Path;

use crate::db;
use crate::models::{Fields, Match, SourceSummary, StoredDocument};

/// Key/value manifest as stored; missing keys are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    pub schema_version: Option<String>,
    pub export_signature: Option<String>,
    pub total_docs: Option<i64>,
    pub export_dir: Option<String>,
}

/// Abstract read access to a built store.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`documents_in_source`](Store::documents_in_source) | All documents of one source file |
/// | [`documents_with_prefix`](Store::documents_with_prefix) | All documents under a path prefix |
/// | [`count_with_prefix`](Store::count_with_prefix) | Count of documents under a path prefix |
/// | [`documents_containing`](Store::documents_containing) | Case-insensitive body substring match |
/// | [`count_containing`](Store::count_containing) | Count of the same |
/// | [`keyword_search`](Store::keyword_search) | Ranked full-text search |
/// | [`source_row_count`](Store::source_row_count) | Row count of one source |
/// | [`sources`](Store::sources) | Every source with its metadata |
/// | [`manifest`](Store::manifest) | Manifest of the build that produced the store |
#[async_trait]
pub trait Store: Send + Sync {
    async fn documents_in_source(&self, source_file: &str) -> Result<Vec<StoredDocument>>;

    async fn documents_with_prefix(&self, prefix: &str) -> Result<Vec<StoredDocument>>;

    async fn count_with_prefix(&self, prefix: &str) -> Result<i64>;

    /// Documents of `source_file` whose lowercased body contains `needle`
    /// (matched case-insensitively), in row order.
    async fn documents_containing(
        &self,
        source_file: &str,
        needle: &str,
        limit: Option<usize>,
    ) -> Result<Vec<StoredDocument>>;

    async fn count_containing(&self, source_file: &str, needle: &str) -> Result<i64>;

    /// Ranked full-text search over title and body. `query` is already in
    /// the backend's query syntax.
    async fn keyword_search(
        &self,
        query: &str,
        source_file: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Match>>;

    async fn source_row_count(&self, source_file: &str) -> Result<Option<i64>>;

    async fn sources(&self) -> Result<Vec<SourceSummary>>;

    async fn manifest(&self) -> Result<Manifest>;
}

/// SQLite implementation of the [`Store`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open the store at `path` read-only.
    pub async fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(db::connect_read_only(path).await?))
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}

const DOCUMENT_COLUMNS: &str = "id, source_file, row_id, title, body, fields_json";

fn document_from_row(row: &SqliteRow) -> StoredDocument {
    let fields_json: Option<String> = row.try_get("fields_json").ok();
    StoredDocument {
        id: row.get("id"),
        source_file: row.get("source_file"),
        row_id: row.get("row_id"),
        title: row.get("title"),
        body: row.get("body"),
        fields: fields_json
            .map(|raw| Fields::from_json(&raw))
            .unwrap_or_default(),
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn documents_in_source(&self, source_file: &str) -> Result<Vec<StoredDocument>> {
        let sql = format!(
            "SELECT {} FROM documents WHERE source_file = ? ORDER BY row_id ASC, id ASC",
            DOCUMENT_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(source_file)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(document_from_row).collect())
    }

    async fn documents_with_prefix(&self, prefix: &str) -> Result<Vec<StoredDocument>> {
        let sql = format!(
            "SELECT {} FROM documents WHERE LOWER(substr(source_file, 1, length(?1))) = LOWER(?1) ORDER BY id ASC",
            DOCUMENT_COLUMNS
        );
        let rows = sqlx::query(&sql).bind(prefix).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(document_from_row).collect())
    }

    async fn count_with_prefix(&self, prefix: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM documents WHERE LOWER(substr(source_file, 1, length(?1))) = LOWER(?1)",
        )
        .bind(prefix)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn documents_containing(
        &self,
        source_file: &str,
        needle: &str,
        limit: Option<usize>,
    ) -> Result<Vec<StoredDocument>> {
        let sql = format!(
            "SELECT {} FROM documents WHERE source_file = ? AND instr(LOWER(body), ?) > 0 \
             ORDER BY row_id ASC, id ASC LIMIT ?",
            DOCUMENT_COLUMNS
        );
        let limit = limit.map(|l| l as i64).unwrap_or(-1);
        let rows = sqlx::query(&sql)
            .bind(source_file)
            .bind(needle.to_ascii_lowercase())
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(document_from_row).collect())
    }

    async fn count_containing(&self, source_file: &str, needle: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM documents WHERE source_file = ? AND instr(LOWER(body), ?) > 0",
        )
        .bind(source_file)
        .bind(needle.to_ascii_lowercase())
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn keyword_search(
        &self,
        query: &str,
        source_file: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Match>> {
        let mut sql = String::from(
            r#"
            SELECT d.source_file, d.row_id, d.title,
                   snippet(documents_fts, 1, '[', ']', '…', 18) AS snippet
            FROM documents_fts
            JOIN documents d ON d.id = documents_fts.rowid
            WHERE documents_fts MATCH ?
            "#,
        );
        if source_file.is_some() {
            sql.push_str(" AND d.source_file = ?");
        }
        sql.push_str(" ORDER BY bm25(documents_fts) LIMIT ?");

        let mut q = sqlx::query(&sql).bind(query);
        if let Some(src) = source_file {
            q = q.bind(src);
        }
        let rows = q.bind(limit as i64).fetch_all(&self.pool).await?;

        Ok(rows
            .iter()
            .map(|row| {
                Match::new(
                    row.get::<String, _>("source_file"),
                    row.get::<i64, _>("row_id"),
                    row.get::<String, _>("title"),
                    row.get::<String, _>("snippet"),
                )
            })
            .collect())
    }

    async fn source_row_count(&self, source_file: &str) -> Result<Option<i64>> {
        let count: Option<i64> =
            sqlx::query_scalar("SELECT row_count FROM sources WHERE source_file = ?")
                .bind(source_file)
                .fetch_optional(&self.pool)
                .await?;
        Ok(count)
    }

    async fn sources(&self) -> Result<Vec<SourceSummary>> {
        let rows = sqlx::query(
            "SELECT source_file, row_count, columns_json FROM sources ORDER BY source_file ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .iter()
            .map(|row| {
                let columns_json: String = row.get("columns_json");
                SourceSummary {
                    source_file: row.get("source_file"),
                    row_count: row.get("row_count"),
                    columns: serde_json::from_str(&columns_json).unwrap_or_default(),
                }
            })
            .collect())
    }

    async fn manifest(&self) -> Result<Manifest> {
        let rows = sqlx::query("SELECT key, value FROM manifest")
            .fetch_all(&self.pool)
            .await?;
        let mut values: HashMap<String, String> = rows
            .iter()
            .map(|row| (row.get("key"), row.get("value")))
            .collect();
        Ok(Manifest {
            schema_version: values.remove("schema_version"),
            export_signature: values.remove("export_signature"),
            total_docs: values.remove("total_docs").and_then(|v| v.parse().ok()),
            export_dir: values.remove("export_dir"),
        })
    }
}
