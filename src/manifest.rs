//! Staleness detection and the `ensure_index` entry point.
//!
//! A store is **missing** when its file does not exist, **fresh** when its
//! manifest carries the current [`SCHEMA_VERSION`] and a signature equal to
//! a newly computed export signature, and **stale** otherwise (including
//! when the manifest cannot be read at all). Missing and stale stores are
//! rebuilt; fresh ones are reused untouched.

use anyhow::Result;
use std::fmt;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::QaError;
use crate::ingest::{self, RebuildSummary};
use crate::scanner::export_signature;
use crate::schema::SCHEMA_VERSION;
use crate::store::{SqliteStore, Store};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexState {
    Missing,
    Fresh,
    Stale(StaleReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaleReason {
    SchemaVersion { found: Option<String> },
    Signature,
    Unreadable(String),
    /// A rebuild was explicitly requested.
    Forced,
}

impl fmt::Display for IndexState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexState::Missing => write!(f, "missing"),
            IndexState::Fresh => write!(f, "fresh"),
            IndexState::Stale(StaleReason::SchemaVersion { found }) => write!(
                f,
                "stale (schema version {} != {})",
                found.as_deref().unwrap_or("none"),
                SCHEMA_VERSION
            ),
            IndexState::Stale(StaleReason::Signature) => write!(f, "stale (export changed)"),
            IndexState::Stale(StaleReason::Unreadable(e)) => {
                write!(f, "stale (manifest unreadable: {})", e)
            }
            IndexState::Stale(StaleReason::Forced) => write!(f, "stale (rebuild requested)"),
        }
    }
}

/// Outcome of [`ensure_index`]: the state found and, when a rebuild ran,
/// its summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnsureOutcome {
    pub state: IndexState,
    pub rebuilt: Option<RebuildSummary>,
}

/// Classify the store at `config.store.path` against `config.export.root`.
pub async fn index_state(config: &Config) -> IndexState {
    if !config.store.path.exists() {
        return IndexState::Missing;
    }

    let manifest = match read_manifest(config).await {
        Ok(m) => m,
        Err(e) => {
            warn!(store = %config.store.path.display(), error = %e, "manifest unreadable");
            return IndexState::Stale(StaleReason::Unreadable(e.to_string()));
        }
    };

    if manifest.schema_version.as_deref() != Some(SCHEMA_VERSION) {
        return IndexState::Stale(StaleReason::SchemaVersion {
            found: manifest.schema_version,
        });
    }

    let current = match export_signature(&config.export.root) {
        Ok(sig) => sig,
        Err(e) => {
            debug!(error = %e, "cannot compute export signature");
            return IndexState::Stale(StaleReason::Signature);
        }
    };
    if manifest.export_signature.as_deref() != Some(current.as_str()) {
        return IndexState::Stale(StaleReason::Signature);
    }

    IndexState::Fresh
}

async fn read_manifest(config: &Config) -> Result<crate::store::Manifest> {
    let store = SqliteStore::open(&config.store.path).await?;
    let manifest = store.manifest().await;
    store.close().await;
    manifest
}

/// Make sure a store built from the current export exists, rebuilding when
/// it is missing, stale, or `force_rebuild` is set.
///
/// Fails with [`QaError::ExportNotFound`] when the export root is absent;
/// the existing store is left in place in that case.
pub async fn ensure_index(config: &Config, force_rebuild: bool) -> Result<EnsureOutcome> {
    if !config.export.root.exists() {
        return Err(QaError::ExportNotFound(config.export.root.clone()).into());
    }

    let state = if force_rebuild {
        IndexState::Stale(StaleReason::Forced)
    } else {
        index_state(config).await
    };

    if state == IndexState::Fresh {
        debug!(store = %config.store.path.display(), "store is fresh");
        return Ok(EnsureOutcome {
            state,
            rebuilt: None,
        });
    }

    info!(store = %config.store.path.display(), %state, "rebuilding store");
    let summary = ingest::rebuild(config).await?;
    Ok(EnsureOutcome {
        state,
        rebuilt: Some(summary),
    })
}
