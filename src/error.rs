//! Error kinds surfaced to callers.
//!
//! Almost everything in the pipeline recovers locally (unreadable files are
//! skipped, malformed CSV degrades to plain text, a corrupt manifest just
//! means "rebuild"). The one failure a caller is expected to act on is a
//! missing export root, which is raised as [`QaError::ExportNotFound`] inside
//! an [`anyhow::Error`].

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QaError {
    /// The export root handed to the scanner or the rebuild does not exist.
    #[error("export not found at {}", .0.display())]
    ExportNotFound(PathBuf),
}

impl QaError {
    /// True when `err` (or anything in its context chain) is an
    /// [`QaError::ExportNotFound`].
    pub fn is_export_not_found(err: &anyhow::Error) -> bool {
        err.chain().any(|cause| {
            matches!(
                cause.downcast_ref::<QaError>(),
                Some(QaError::ExportNotFound(_))
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_detects_export_not_found_through_context() {
        let err: anyhow::Result<()> = Err(QaError::ExportNotFound(PathBuf::from("/nope")).into());
        let err = err.context("rebuilding store").unwrap_err();
        assert!(QaError::is_export_not_found(&err));
        assert!(err.to_string().contains("rebuilding store"));
    }

    #[test]
    fn test_other_errors_are_not_export_not_found() {
        let err = anyhow::anyhow!("disk full");
        assert!(!QaError::is_export_not_found(&err));
    }
}
