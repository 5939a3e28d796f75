//! Per-session filesystem layout.
//!
//! Each session (tenant) owns a directory holding its extracted export, its
//! store, and `export_path.txt`, a one-line record of the export root the
//! store was built from. Upload handling lives outside this crate; it only
//! needs [`find_export_root`] and [`record_export_root`] after extracting.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub const STORE_FILE: &str = "linkedin.sqlite";
pub const EXPORT_HINT_FILE: &str = "export_path.txt";
const DEFAULT_EXPORT_DIR: &str = "export";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPaths {
    pub session_root: PathBuf,
    pub export_root: PathBuf,
    pub store_path: PathBuf,
}

impl SessionPaths {
    pub fn resolve(session_root: &Path) -> Self {
        Self {
            session_root: session_root.to_path_buf(),
            export_root: load_export_hint(session_root),
            store_path: session_root.join(STORE_FILE),
        }
    }
}

fn load_export_hint(session_root: &Path) -> PathBuf {
    let hint = session_root.join(EXPORT_HINT_FILE);
    match std::fs::read_to_string(&hint) {
        Ok(content) if !content.trim().is_empty() => PathBuf::from(content.trim()),
        _ => session_root.join(DEFAULT_EXPORT_DIR),
    }
}

/// Persist `export_root` as the session's companion record.
pub fn record_export_root(session_root: &Path, export_root: &Path) -> Result<()> {
    std::fs::create_dir_all(session_root)
        .with_context(|| format!("Failed to create session dir {}", session_root.display()))?;
    let hint = session_root.join(EXPORT_HINT_FILE);
    std::fs::write(&hint, export_root.display().to_string())
        .with_context(|| format!("Failed to write {}", hint.display()))?;
    Ok(())
}

/// Locate the real export root inside a freshly extracted archive.
///
/// Archives are either flat (`Connections.csv` at the top) or wrap everything
/// in a single folder.
pub fn find_export_root(extracted_dir: &Path) -> PathBuf {
    if extracted_dir.join("Connections.csv").exists() {
        return extracted_dir.to_path_buf();
    }
    let children: Vec<PathBuf> = std::fs::read_dir(extracted_dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.is_dir())
                .collect()
        })
        .unwrap_or_default();
    if children.len() == 1 {
        return children[0].clone();
    }
    extracted_dir.to_path_buf()
}
