//! Error types shared by the grading library.

use std::path::PathBuf;

/// Errors raised by record grading, ingestion, and file access.
#[derive(Debug, thiserror::Error)]
pub enum GradeError {
    /// A final grade was read before any compute step ran on the record.
    #[error("final grade for {first_name} {surname} has not been computed")]
    UncomputedGrade { first_name: String, surname: String },

    /// An input line could not be turned into a record.
    #[error("invalid record on line {line}: {reason}")]
    InvalidRecordLine { line: usize, reason: String },

    /// A file could not be opened, read, or written.
    #[error("cannot access {}: {source}", path.display())]
    IoUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GradeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GradeError::IoUnavailable {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = GradeError> = std::result::Result<T, E>;
