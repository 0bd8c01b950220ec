//! Error and diagnostic types for the FLB3 codec.
//!
//! Fatal problems are [`Error`]; per-chunk corruption found while parsing is
//! a [`Diagnostic`] so a partially damaged dump stays inspectable. Everything
//! on the write path is fatal, because an incomplete container must never be
//! emitted and flashed.

use std::fmt;

use thiserror::Error;

/// Errors that can occur when reading or assembling FLB3 containers.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error.
    #[error("{0}")]
    Common(#[from] flb_common::Error),

    /// Not an FLB3 container.
    #[error("invalid FLB3 magic: expected {expected:?}, got {actual:?}")]
    InvalidMagic {
        expected: [u8; 4],
        actual: [u8; 4],
    },

    /// Container format version this codec does not understand.
    #[error("unsupported FLB3 version: {0}")]
    UnsupportedVersion(u16),

    /// Chunk ordinals are not contiguous from zero, so the container cannot
    /// be assembled.
    #[error("incomplete chunk set: expected contiguous ordinals 0..{count}, missing {missing:?}")]
    IncompleteChunkSet { count: usize, missing: Vec<u32> },

    /// More chunks than the 16-bit count field can describe.
    #[error("chunk set has {0} chunks, more than the format allows")]
    TooManyChunks(usize),

    /// A chunk payload exceeds what a 32-bit length field can describe.
    #[error("chunk {ordinal} payload is {length} bytes, larger than the format allows")]
    ChunkTooLarge { ordinal: u32, length: usize },

    /// The assembled container exceeds what a 32-bit length field can describe.
    #[error("assembled container is {0} bytes, larger than the format allows")]
    ContainerTooLarge(usize),

    /// A segment name that cannot be encoded into the fixed table field.
    #[error("chunk {ordinal} segment name {name:?} does not fit the {max}-byte NUL-padded name field")]
    InvalidSegmentName {
        ordinal: u32,
        name: String,
        max: usize,
    },
}

/// Result type for container operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A non-fatal problem found while parsing a container.
///
/// Diagnostics carry the ordinal and the expected-vs-actual values needed to
/// locate the offending chunk in a hex dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Header-declared total length disagrees with the buffer length.
    LengthMismatch { declared: u32, actual: usize },

    /// A chunk's table entry or payload extends past the end of the buffer.
    TruncatedChunk {
        ordinal: u32,
        needed: usize,
        available: usize,
    },

    /// A chunk's stored CRC does not match its payload bytes.
    ChunkChecksumMismatch {
        ordinal: u32,
        expected: u32,
        actual: u32,
    },

    /// The container-wide CRC does not match the table and payload region.
    GlobalChecksumMismatch { expected: u32, actual: u32 },

    /// Two chunks' payload ranges overlap.
    OverlappingChunks { first: u32, second: u32 },

    /// A structured chunk whose payload would not decode; it is carried as
    /// opaque instead.
    StructuredDecodeFailed { ordinal: u32 },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LengthMismatch { declared, actual } => {
                write!(f, "declared container length {declared} does not match actual {actual}")
            }
            Self::TruncatedChunk { ordinal, needed, available } => {
                write!(f, "chunk {ordinal} truncated: needs {needed} bytes, only {available} present")
            }
            Self::ChunkChecksumMismatch { ordinal, expected, actual } => {
                write!(f, "chunk {ordinal} checksum mismatch: expected {expected:#010x}, got {actual:#010x}")
            }
            Self::GlobalChecksumMismatch { expected, actual } => {
                write!(f, "container checksum mismatch: expected {expected:#010x}, got {actual:#010x}")
            }
            Self::OverlappingChunks { first, second } => {
                write!(f, "chunks {first} and {second} declare overlapping payload ranges")
            }
            Self::StructuredDecodeFailed { ordinal } => {
                write!(f, "chunk {ordinal} metadata would not decode; treating payload as opaque")
            }
        }
    }
}

impl Diagnostic {
    /// The ordinal this diagnostic points at, when it concerns one chunk.
    pub fn ordinal(&self) -> Option<u32> {
        match self {
            Self::TruncatedChunk { ordinal, .. }
            | Self::ChunkChecksumMismatch { ordinal, .. }
            | Self::StructuredDecodeFailed { ordinal } => Some(*ordinal),
            _ => None,
        }
    }
}
