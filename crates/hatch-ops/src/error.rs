//! Error types for ingest, the operation log and scaffolding.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort an ingest run before any file is touched.
///
/// Per-file problems never surface here; they are collected as
/// [`FailureRecord`](crate::FailureRecord)s.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The destination path is missing or empty.
    #[error("Invalid destination: a destination path is required")]
    InvalidDestination,

    /// The destination root could not be created.
    #[error("Failed to create destination {path}: {source}")]
    Destination {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The background task running the ingest panicked or was cancelled.
    #[error("Ingest task failed: {0}")]
    Worker(String),
}

/// Errors reading or writing the operation log store.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed operation log: {0}")]
    Format(#[from] serde_json::Error),

    #[error("Log task failed: {0}")]
    Worker(String),
}

/// Errors creating a project folder tree.
#[derive(Debug, Error)]
pub enum ScaffoldError {
    #[error("Folder already exists: {path}")]
    AlreadyExists { path: PathBuf },

    #[error("Invalid project name: {0}")]
    InvalidName(String),

    #[error("Failed to create {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> LogError {
    LogError::Io {
        path: path.into(),
        source,
    }
}
