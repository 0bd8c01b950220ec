//! Write-back: manifest plus payload files to a chunk directory.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use flb_container::{Chunk, ChunkDirectory, ChunkTableEntry};

use crate::manifest::{Manifest, ManifestChunk};
use crate::{Error, Result};

/// Load an extracted directory back into a [`ChunkDirectory`].
///
/// The manifest decides ordinal, type and identifier for every chunk; each
/// payload file decides its own bytes. Offsets and checksums are left for
/// the container writer to recompute, so an edited payload needs nothing
/// beyond saving the file. Missing payload files and malformed manifests
/// are fatal - a container must never be assembled from a partial chunk set.
pub fn rebuild_from_dir(dir: &Path) -> Result<ChunkDirectory> {
    let manifest = Manifest::load(dir)?;
    info!(chunks = manifest.chunks.len(), "loaded manifest");

    // Ordinal order regardless of how the manifest lists its records.
    let mut records: Vec<&ManifestChunk> = manifest.chunks.iter().collect();
    records.sort_by_key(|r| r.ordinal);

    let mut directory = ChunkDirectory::new();
    for record in records {
        let type_tag = record.parse_type_tag()?;

        let path = manifest.payload_path(dir, record);
        if !path.is_file() {
            return Err(Error::MissingChunkFile {
                ordinal: record.ordinal,
                path,
            });
        }
        let payload = fs::read(&path)?;

        if payload.len() > u32::MAX as usize {
            return Err(flb_container::Error::ChunkTooLarge {
                ordinal: record.ordinal,
                length: payload.len(),
            }
            .into());
        }
        if payload.len() as u64 != record.length {
            debug!(
                ordinal = record.ordinal,
                manifest_len = record.length,
                file_len = payload.len(),
                "payload length differs from manifest; file wins"
            );
        }

        let entry = ChunkTableEntry {
            ordinal: record.ordinal,
            type_tag,
            offset: 0, // recomputed by the writer
            length: payload.len() as u32,
            crc: record.crc32c, // extraction-time value; recomputed on write
            version: record.version,
            name: record.name.clone(),
        };

        let (chunk, downgraded) = Chunk::from_parts(entry, payload);
        if downgraded {
            debug!(
                ordinal = record.ordinal,
                "structured payload no longer decodes; carrying it as opaque"
            );
        }
        directory.push(chunk);
    }

    Ok(directory)
}
