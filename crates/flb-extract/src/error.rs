//! Error types for extraction and write-back.
//!
//! Everything here is fatal: an extracted directory that cannot be fully
//! resolved must never be assembled into a container, because an incomplete
//! image flashed to a NIC can brick it.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur serializing a chunk directory to disk or back.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Container codec error.
    #[error("{0}")]
    Container(#[from] flb_container::Error),

    /// The manifest file could not be read.
    #[error("failed to read manifest {path:?}: {source}")]
    ManifestRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The manifest is missing required fields, holds values of the wrong
    /// shape, or is semantically invalid (duplicate ordinals, bad type tags).
    #[error("manifest schema error: {detail}")]
    ManifestSchema { detail: String },

    /// A payload file referenced by the manifest does not exist.
    #[error("missing chunk file for ordinal {ordinal}: {path:?}")]
    MissingChunkFile { ordinal: u32, path: PathBuf },

    /// Manifest serialization error.
    #[error("manifest serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;
