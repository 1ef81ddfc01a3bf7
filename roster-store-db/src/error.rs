// SPDX-FileCopyrightText: 2025 Roster contributors
// SPDX-License-Identifier: MIT

//! Error types for roster store operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for roster store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during roster store operations.
///
/// Duplicate keys and missing records are not errors; they are reported
/// as an [`Outcome`](crate::Outcome).
#[derive(Error, Debug)]
pub enum Error {
    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Failed to open database with context
    #[error("Failed to open database at '{path}': {source}")]
    DatabaseOpen {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Database file not found
    #[error("Database not found at: {0}")]
    DatabaseNotFound(PathBuf),

    /// Document store file could not be read or written
    #[error("Document store I/O error at '{path}': {source}")]
    DocumentIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Document could not be encoded or decoded
    #[error("Document format error: {0}")]
    DocumentFormat(#[from] serde_json::Error),

    /// A stored field holds a value outside its domain
    #[error("Invalid {field} value: {value:?}")]
    InvalidValue { field: &'static str, value: String },

    /// The document store refused or failed a request
    #[error("Document store error: {0}")]
    DocumentStore(String),

    /// The record change was applied but its history entry was not written.
    ///
    /// Only raised by backends without atomic multi-write units.
    #[error("{action} for '{identifier}' was applied but not recorded in history: {source}")]
    AuditIncomplete {
        identifier: String,
        action: &'static str,
        #[source]
        source: Box<Error>,
    },
}

/// Coarse failure classes surfaced to callers of the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The backing store could not serve the request; the operation was
    /// rolled back and may be retried.
    StorageUnavailable,
    /// The mutation is durable but has no history entry.
    AuditIncomplete,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::AuditIncomplete { .. } => ErrorKind::AuditIncomplete,
            _ => ErrorKind::StorageUnavailable,
        }
    }

    pub(crate) fn document_store(message: impl Into<String>) -> Self {
        Self::DocumentStore(message.into())
    }
}
