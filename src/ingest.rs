//! Store rebuild.
//!
//! Coordinates the full build flow: scanner → normalizer → documents + FTS
//! entries → sources → manifest. The whole store is built inside one
//! transaction in a sibling `*.building` file and then renamed over the live
//! store, so readers see either the previous store or the new one and a
//! failed build leaves the previous store untouched.

use anyhow::{Context, Result};
use sqlx::{Sqlite, Transaction};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::db;
use crate::error::QaError;
use crate::models::NewDocument;
use crate::normalize::normalize_file;
use crate::scanner::{export_signature, scan_export};
use crate::schema::{create_schema, SCHEMA_VERSION};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebuildSummary {
    pub total_docs: i64,
    pub sources: usize,
    pub signature: String,
}

/// Rebuild the store at `config.store.path` from `config.export.root`.
pub async fn rebuild(config: &Config) -> Result<RebuildSummary> {
    let export_root = &config.export.root;
    if !export_root.exists() {
        return Err(QaError::ExportNotFound(export_root.clone()).into());
    }

    let store_path = &config.store.path;
    let build_path = building_path(store_path);
    remove_if_exists(&build_path)?;

    let pool = db::create_store(&build_path).await?;
    let result = async {
        let mut tx = pool.begin().await?;
        let summary = build_into(&mut tx, export_root).await?;
        tx.commit().await?;
        Ok::<_, anyhow::Error>(summary)
    }
    .await;
    pool.close().await;

    let summary = match result {
        Ok(summary) => summary,
        Err(e) => {
            if let Err(cleanup) = remove_if_exists(&build_path) {
                warn!(path = %build_path.display(), error = %cleanup, "failed to remove partial store");
            }
            return Err(e.context(format!("rebuilding store from {}", export_root.display())));
        }
    };

    std::fs::rename(&build_path, store_path).with_context(|| {
        format!(
            "Failed to move {} into place at {}",
            build_path.display(),
            store_path.display()
        )
    })?;

    info!(
        store = %store_path.display(),
        docs = summary.total_docs,
        sources = summary.sources,
        signature = %summary.signature,
        "store rebuilt"
    );
    Ok(summary)
}

async fn build_into(
    tx: &mut Transaction<'_, Sqlite>,
    export_root: &Path,
) -> Result<RebuildSummary> {
    create_schema(tx).await?;
    let signature = export_signature(export_root)?;

    let mut total_docs = 0i64;
    let mut sources: BTreeMap<String, (i64, Vec<String>)> = BTreeMap::new();

    for file in scan_export(export_root)? {
        let docs = normalize_file(&file);
        debug!(file = %file.relative, docs = docs.len(), "normalized export file");
        for doc in docs {
            insert_document(tx, &doc).await?;
            total_docs += 1;

            let entry = sources
                .entry(doc.source_file.clone())
                .or_insert_with(|| (0, doc.fields.keys().map(String::from).collect()));
            entry.0 += 1;
        }
    }

    for (source_file, (row_count, columns)) in &sources {
        sqlx::query("INSERT INTO sources (source_file, row_count, columns_json) VALUES (?, ?, ?)")
            .bind(source_file)
            .bind(row_count)
            .bind(serde_json::to_string(columns)?)
            .execute(&mut **tx)
            .await?;
    }

    let export_dir = export_root.display().to_string();
    let total = total_docs.to_string();
    for (key, value) in [
        ("schema_version", SCHEMA_VERSION),
        ("export_signature", signature.as_str()),
        ("total_docs", total.as_str()),
        ("export_dir", export_dir.as_str()),
    ] {
        sqlx::query("INSERT OR REPLACE INTO manifest (key, value) VALUES (?, ?)")
            .bind(key)
            .bind(value)
            .execute(&mut **tx)
            .await?;
    }

    Ok(RebuildSummary {
        total_docs,
        sources: sources.len(),
        signature,
    })
}

/// Insert a document and its full-text entry as one unit.
async fn insert_document(tx: &mut Transaction<'_, Sqlite>, doc: &NewDocument) -> Result<()> {
    let result = sqlx::query(
        "INSERT INTO documents (source_file, row_id, title, body, fields_json) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&doc.source_file)
    .bind(doc.row_id)
    .bind(&doc.title)
    .bind(&doc.body)
    .bind(doc.fields.to_json())
    .execute(&mut **tx)
    .await?;
    let id = result.last_insert_rowid();

    sqlx::query("INSERT INTO documents_fts (rowid, title, body) VALUES (?, ?, ?)")
        .bind(id)
        .bind(&doc.title)
        .bind(&doc.body)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

fn building_path(store_path: &Path) -> PathBuf {
    let mut name = store_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "store.sqlite".into());
    name.push(".building");
    store_path.with_file_name(name)
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
    }
}
