//! Error types for the csvpad core.

use std::path::PathBuf;
use thiserror::Error;

use crate::csv::CsvError;
use crate::util::FileOpenError;

/// Coarse classification of [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed CSV (ragged row, unterminated quote)
    Parse,
    /// File unreadable or unwritable
    Io,
    /// Row or field index out of range
    Index,
    /// Operation not valid in the current state
    State,
}

/// Misuse of an edit session or of the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("edit session was already committed")]
    AlreadyCommitted,
    #[error("edit session was cancelled")]
    Cancelled,
    #[error("no document is open")]
    NoDocument,
    #[error("edit session belongs to a document that is no longer open")]
    StaleSession,
}

/// Errors that can occur in document, session and controller operations.
#[derive(Debug, Error)]
pub enum Error {
    // === CSV Errors ===
    /// File content is not valid CSV.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: CsvError,
    },

    // === File System Errors ===
    /// Reading or writing the file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file was rejected before reading it.
    #[error("cannot open {path}: {reason}")]
    Unreadable {
        path: PathBuf,
        #[source]
        reason: FileOpenError,
    },

    // === Index Errors ===
    #[error("row index {index} out of range (row count {len})")]
    RowIndex { index: usize, len: usize },

    #[error("field index {index} out of range (field count {len})")]
    FieldIndex { index: usize, len: usize },

    #[error("row has {found} fields, expected {expected}")]
    RowLength { expected: usize, found: usize },

    /// Rows were supplied for a table with no columns.
    #[error("{rows} rows given without header fields")]
    EmptyHeader { rows: usize },

    // === State Errors ===
    #[error(transparent)]
    State(#[from] StateError),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Parse { .. } => ErrorKind::Parse,
            Error::Io { .. } | Error::Unreadable { .. } => ErrorKind::Io,
            Error::RowIndex { .. }
            | Error::FieldIndex { .. }
            | Error::RowLength { .. }
            | Error::EmptyHeader { .. } => ErrorKind::Index,
            Error::State(_) => ErrorKind::State,
        }
    }

    /// Short message suitable for the status line
    pub fn user_message(&self) -> String {
        match self {
            Error::Unreadable { path, reason } => {
                reason.user_message(&crate::util::filename_for_display(path))
            }
            Error::Parse { path, source } => format!(
                "Invalid CSV in {}: {}",
                crate::util::filename_for_display(path),
                source
            ),
            Error::Io { path, source } => format!(
                "Error accessing {}: {}",
                crate::util::filename_for_display(path),
                source
            ),
            other => other.to_string(),
        }
    }
}

/// Result alias for core operations
pub type Result<T> = std::result::Result<T, Error>;
