//! Export scanner.
//!
//! Walks an export root and yields every eligible file (`.csv`, `.html`,
//! `.htm`, `.txt`, any case, no dot-files) in a stable order: directory
//! entries are visited sorted by name, so the sequence equals a
//! component-wise lexicographic sort of the relative paths. The same order
//! drives both the export signature and document id assignment.

use anyhow::Result;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::QaError;

const INCLUDE_GLOBS: &[&str] = &["**/*.csv", "**/*.html", "**/*.htm", "**/*.txt"];

/// One eligible file under the export root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub path: PathBuf,
    /// Path relative to the export root, `/`-separated.
    pub relative: String,
}

impl ExportFile {
    pub fn extension(&self) -> String {
        self.path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    }
}

/// Lazily enumerate eligible files under `root`.
///
/// Fails with [`QaError::ExportNotFound`] when `root` does not exist.
/// Unreadable directory entries are skipped.
pub fn scan_export(root: &Path) -> Result<impl Iterator<Item = ExportFile>> {
    if !root.exists() {
        return Err(QaError::ExportNotFound(root.to_path_buf()).into());
    }

    let include_set = build_globset(INCLUDE_GLOBS)?;
    let root = root.to_path_buf();

    let walker = WalkDir::new(&root).sort_by_file_name().into_iter();
    Ok(walker.filter_map(move |entry| {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(error = %e, "skipping unreadable export entry");
                return None;
            }
        };
        if !entry.file_type().is_file() {
            return None;
        }
        if entry.file_name().to_string_lossy().starts_with('.') {
            return None;
        }

        let path = entry.path();
        let relative = path.strip_prefix(&root).unwrap_or(path);
        let rel_str = relative_to_posix(relative);
        if !include_set.is_match(&rel_str) {
            return None;
        }

        Some(ExportFile {
            path: path.to_path_buf(),
            relative: rel_str,
        })
    }))
}

/// SHA-256 over `(relative path, size, mtime seconds)` of every eligible
/// file, in scan order, as lowercase hex.
pub fn export_signature(root: &Path) -> Result<String> {
    let mut hasher = Sha256::new();
    let mut files = 0usize;
    for file in scan_export(root)? {
        let (size, modified_secs) = match std::fs::metadata(&file.path) {
            Ok(meta) => {
                let modified_secs = meta
                    .modified()
                    .unwrap_or(std::time::SystemTime::UNIX_EPOCH)
                    .duration_since(std::time::SystemTime::UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_secs();
                (meta.len(), modified_secs)
            }
            Err(e) => {
                warn!(file = %file.relative, error = %e, "cannot stat export file");
                continue;
            }
        };
        hash_entry(&mut hasher, &file.relative, size, modified_secs);
        files += 1;
    }
    let signature = format!("{:x}", hasher.finalize());
    debug!(files, %signature, "computed export signature");
    Ok(signature)
}

/// Fields are NUL-terminated so adjacent digits never run together.
fn hash_entry(hasher: &mut Sha256, relative: &str, size: u64, modified_secs: u64) {
    let size = size.to_string();
    let modified_secs = modified_secs.to_string();
    for field in [relative, size.as_str(), modified_secs.as_str()] {
        hasher.update(field.as_bytes());
        hasher.update([0u8]);
    }
}

fn relative_to_posix(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn build_globset(patterns: &[&str]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(GlobBuilder::new(pattern).case_insensitive(true).build()?);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn relatives(root: &Path) -> Vec<String> {
        scan_export(root).unwrap().map(|f| f.relative).collect()
    }

    #[test]
    fn test_scan_filters_and_orders() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        write(root, "b.csv", "x");
        write(root, "a.csv", "x");
        write(root, "a/z.TXT", "x");
        write(root, "notes.md", "x");
        write(root, ".hidden.csv", "x");
        write(root, "Articles/Articles/post.html", "x");
        write(root, "legacy.htm", "x");

        assert_eq!(
            relatives(root),
            vec![
                "Articles/Articles/post.html",
                "a/z.TXT",
                "a.csv",
                "b.csv",
                "legacy.htm",
            ]
        );
    }

    #[test]
    fn test_scan_missing_root() {
        let tmp = TempDir::new().unwrap();
        let err = scan_export(&tmp.path().join("missing")).err().unwrap();
        assert!(QaError::is_export_not_found(&err));
    }

    #[test]
    fn test_entry_fields_are_delimited() {
        let digest = |size, mtime| {
            let mut hasher = Sha256::new();
            hash_entry(&mut hasher, "Connections.csv", size, mtime);
            format!("{:x}", hasher.finalize())
        };
        assert_ne!(digest(11, 1), digest(1, 11));
        assert_eq!(digest(11, 1), digest(11, 1));
    }

    #[test]
    fn test_signature_stable_for_untouched_files() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "Connections.csv", "First Name,Last Name\nAda,Lovelace\n");
        write(tmp.path(), "notes.txt", "hello");
        let a = export_signature(tmp.path()).unwrap();
        let b = export_signature(tmp.path()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_signature_sensitive_to_size_mtime_and_membership() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "Connections.csv", "a,b\n1,2\n");
        let base = export_signature(tmp.path()).unwrap();

        // Ineligible files do not count.
        write(tmp.path(), "readme.md", "ignored");
        assert_eq!(export_signature(tmp.path()).unwrap(), base);

        write(tmp.path(), "extra.txt", "new file");
        let added = export_signature(tmp.path()).unwrap();
        assert_ne!(added, base);

        fs::remove_file(tmp.path().join("extra.txt")).unwrap();
        let file = tmp.path().join("Connections.csv");
        let before = fs::metadata(&file).unwrap().modified().unwrap();
        fs::write(&file, "a,b\n1,2\n3,4\n").unwrap();
        let handle = fs::File::options().write(true).open(&file).unwrap();
        handle.set_modified(before).unwrap();
        assert_ne!(export_signature(tmp.path()).unwrap(), base, "size change");

        fs::write(&file, "a,b\n1,2\n").unwrap();
        let handle = fs::File::options().write(true).open(&file).unwrap();
        handle.set_modified(before).unwrap();
        assert_eq!(export_signature(tmp.path()).unwrap(), base, "restored");

        let later = SystemTime::now() + Duration::from_secs(3600);
        handle.set_modified(later).unwrap();
        assert_ne!(export_signature(tmp.path()).unwrap(), base, "touched");
    }
}
