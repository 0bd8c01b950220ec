//! FLB3 firmware container toolkit.
//!
//! This crate provides a unified interface to the FLB3 library ecosystem
//! for extracting, editing and reassembling Intel NIC firmware containers.
//!
//! # Crates
//!
//! - [`flb_common`] - binary reading and the CRC32C checksum engine
//! - [`flb_container`] - the container codec: chunk table, classifier,
//!   reader, writer, round-trip verifier
//! - [`flb_extract`] - extracted-directory serialization: payload files
//!   plus `manifest.json`
//!
//! # Example
//!
//! ```no_run
//! use flbtool::prelude::*;
//!
//! let data = std::fs::read("BootImg.FLB")?;
//! let parsed = ChunkDirectory::parse(&data)?;
//!
//! extract_to_dir(&parsed.directory, "extracted".as_ref())?;
//!
//! // ... edit payload files, then reassemble ...
//! let rebuilt = rebuild_from_dir("extracted".as_ref())?.to_bytes()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Re-export all sub-crates
pub use flb_common as common;
pub use flb_container as container;
pub use flb_extract as extract;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use flb_common::{checksum, SliceReader};
    pub use flb_container::{
        classify, verify_roundtrip, Chunk, ChunkClass, ChunkDirectory, ChunkTableEntry,
        Diagnostic, FlbType, Parsed, RoundTrip,
    };
    pub use flb_extract::{
        extract_to_dir, payload_file_name, rebuild_from_dir, ExtractStats, Manifest,
    };
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
