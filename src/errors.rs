//! Error types produced at the host boundary and while handling documents.

use std::path::PathBuf;

use thiserror::Error;

/// Error returned when driving the automation host.
///
/// Only the connection and project-open variants are meant for users; the
/// per-item variants are consumed by the tolerant discovery loops and never
/// surface on their own.
#[derive(Debug, Error, PartialEq)]
pub enum HostError {
    /// Returned when no running host instance could be attached and launching
    /// a new one failed.
    #[error("could not attach to or launch the automation host: {reason}")]
    Connect {
        /// Description of the connection failure.
        reason: String,
    },
    /// Returned when the host refused to open the supplied project file.
    #[error("host failed to open project {path}: {reason}")]
    OpenProject {
        /// Path that was handed to the host.
        path: PathBuf,
        /// Description of the failure reported by the host.
        reason: String,
    },
    /// Returned when a collection refuses to hand out a bulk handle.
    #[error("collection does not provide a bulk handle")]
    BulkUnavailable,
    /// Returned when a single-item lookup finds nothing at the probed key.
    #[error("no item at key {0}")]
    Lookup(i64),
    /// Returned when the build carries no automation backend.
    #[error("no automation backend compiled into this build (enable the `robot` feature)")]
    BackendUnavailable,
    /// Backend-specific failure that does not fit the other variants.
    #[error("automation backend error: {0}")]
    Backend(String),
}

/// Error returned when loading or saving a structure document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The underlying file could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The document is not valid JSON or does not match the schema.
    #[error("malformed structure document: {0}")]
    Malformed(#[from] serde_json::Error),
}
