//! The extraction manifest.
//!
//! `manifest.json` is the authoritative record of chunk order, types and
//! identifiers for an extracted directory; the payload files it points at
//! are authoritative for bytes. Offsets and checksums are deliberately not
//! authoritative - the writer recomputes both, so editing a payload file
//! needs no manifest surgery.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use flb_container::pci::{PciDetails, PciDevice};
use flb_container::{ChunkClass, FlbType};

use crate::{Error, Result};

/// File name of the manifest inside an extracted directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Manifest schema version this crate reads and writes.
pub const MANIFEST_VERSION: u32 = 1;

/// Top-level manifest document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Manifest schema version.
    pub manifest_version: u32,
    /// Container format version the chunks came from.
    pub container_version: u16,
    pub chunks: Vec<ManifestChunk>,
}

/// One chunk's sidecar metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestChunk {
    pub ordinal: u32,
    /// Type tag as a hex string, e.g. `"0x20000000"`. Hand edits that
    /// mangle the tag fail loudly at load time instead of silently
    /// retagging a chunk.
    pub type_tag: String,
    /// Human-readable tag name when known. Informational.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// Segment description from the chunk table.
    pub name: String,
    /// Segment version triple.
    pub version: [u8; 3],
    /// Payload length at extraction time. Informational; the payload file's
    /// actual length wins on write-back.
    pub length: u64,
    /// CRC32C of the payload file at extraction time. Recomputed on
    /// write-back.
    pub crc32c: u32,
    pub class: ChunkClass,
    /// Payload file name, relative to the extraction directory.
    pub payload_file: String,
    /// Decoded PCI metadata for structured chunks. Informational.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pci: Option<PciBlock>,
}

/// Decoded PCI metadata carried in the manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PciBlock {
    pub details: PciDetails,
    pub devices: Vec<PciDevice>,
}

impl ManifestChunk {
    /// Parse the hex type tag back into an [`FlbType`].
    pub fn parse_type_tag(&self) -> Result<FlbType> {
        let digits = self.type_tag.strip_prefix("0x").ok_or_else(|| Error::ManifestSchema {
            detail: format!(
                "chunk {}: type_tag {:?} is not a 0x-prefixed hex string",
                self.ordinal, self.type_tag
            ),
        })?;
        u32::from_str_radix(digits, 16)
            .map(FlbType)
            .map_err(|_| Error::ManifestSchema {
                detail: format!(
                    "chunk {}: type_tag {:?} is not a valid 32-bit hex value",
                    self.ordinal, self.type_tag
                ),
            })
    }
}

impl Manifest {
    /// Load and validate the manifest from an extraction directory.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(MANIFEST_FILE);
        let text = fs::read_to_string(&path).map_err(|source| Error::ManifestRead {
            path: path.clone(),
            source,
        })?;
        let manifest: Manifest =
            serde_json::from_str(&text).map_err(|source| Error::ManifestSchema {
                detail: source.to_string(),
            })?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Write the manifest into an extraction directory.
    pub fn save(&self, dir: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(dir.join(MANIFEST_FILE), text)?;
        Ok(())
    }

    /// Path of the payload file a chunk record points at.
    pub fn payload_path(&self, dir: &Path, chunk: &ManifestChunk) -> PathBuf {
        dir.join(&chunk.payload_file)
    }

    /// Semantic checks beyond what serde enforces.
    fn validate(&self) -> Result<()> {
        if self.manifest_version != MANIFEST_VERSION {
            return Err(Error::ManifestSchema {
                detail: format!(
                    "unsupported manifest version {} (expected {})",
                    self.manifest_version, MANIFEST_VERSION
                ),
            });
        }

        let mut seen = std::collections::BTreeSet::new();
        for chunk in &self.chunks {
            if !seen.insert(chunk.ordinal) {
                return Err(Error::ManifestSchema {
                    detail: format!("duplicate ordinal {}", chunk.ordinal),
                });
            }
            chunk.parse_type_tag()?;

            // Payload references must be bare file names; a manifest must not
            // be able to point extraction traffic outside its own directory.
            let file = Path::new(&chunk.payload_file);
            if chunk.payload_file.is_empty()
                || file.file_name().map(|n| n != file.as_os_str()).unwrap_or(true)
            {
                return Err(Error::ManifestSchema {
                    detail: format!(
                        "chunk {}: payload_file {:?} is not a bare file name",
                        chunk.ordinal, chunk.payload_file
                    ),
                });
            }
        }

        Ok(())
    }
}
