use std::path::PathBuf;

use thiserror::Error;

/// Conditions the report distinguishes from plain I/O or parse failures.
#[derive(Debug, Error)]
pub enum ReportError {
    /// A results directory (or a method directory inside it) does not exist.
    #[error("no results found at {0}")]
    ResultsNotFound(PathBuf),

    #[error("unsupported result file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("invalid result record in {path} (record {index}): {reason}")]
    InvalidRecord {
        path: PathBuf,
        index: usize,
        reason: String,
    },

    /// Neither `<dir>/<name>.csv` nor `<dir>/<name>/` exists.
    #[error("experimental subject '{name}' not found in {dir}")]
    SubjectNotFound { dir: PathBuf, name: String },
}

impl ReportError {
    /// Whether an error chain bottoms out in a missing file or directory.
    pub fn is_not_found(err: &anyhow::Error) -> bool {
        err.chain().any(|cause| {
            if let Some(report) = cause.downcast_ref::<ReportError>() {
                return matches!(
                    report,
                    ReportError::ResultsNotFound(_) | ReportError::SubjectNotFound { .. }
                );
            }
            cause
                .downcast_ref::<std::io::Error>()
                .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound)
        })
    }
}
