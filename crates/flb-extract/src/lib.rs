//! Extracted-directory serialization for FLB3 containers.
//!
//! A parsed container turns into a directory holding one payload file per
//! chunk plus a `manifest.json` describing ordinal, type, identifier,
//! checksum and decoded PCI metadata for each. The directory is the editing
//! surface: replace a payload file, run write-back, and the container writer
//! recomputes layout and checksums around the new bytes.
//!
//! # Example
//!
//! ```no_run
//! use flb_container::ChunkDirectory;
//! use flb_extract::{extract_to_dir, rebuild_from_dir};
//!
//! let data = std::fs::read("BootImg.FLB")?;
//! let parsed = ChunkDirectory::parse(&data)?;
//! extract_to_dir(&parsed.directory, "extracted".as_ref())?;
//!
//! // ... edit extracted/chunk_*.bin ...
//!
//! let directory = rebuild_from_dir("extracted".as_ref())?;
//! std::fs::write("BootImg.new.FLB", directory.to_bytes()?)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod extract;
mod manifest;
mod rebuild;

pub use error::{Error, Result};
pub use extract::{extract_to_dir, payload_file_name, ExtractStats};
pub use manifest::{Manifest, ManifestChunk, PciBlock, MANIFEST_FILE, MANIFEST_VERSION};
pub use rebuild::rebuild_from_dir;
