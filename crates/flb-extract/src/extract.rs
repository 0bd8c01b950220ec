//! Extraction: chunk directory to payload files plus manifest.

use std::fs;
use std::path::Path;

use rayon::prelude::*;
use tracing::{debug, info};

use flb_common::checksum;
use flb_container::{Chunk, ChunkDirectory, FORMAT_VERSION};

use crate::manifest::{Manifest, ManifestChunk, PciBlock, MANIFEST_VERSION};
use crate::Result;

/// Summary of one extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractStats {
    pub chunks: usize,
    pub payload_bytes: u64,
}

/// Build the payload file name for a chunk.
///
/// The name encodes ordinal, type slug and a sanitized segment identifier,
/// and the exact same convention is used on write-back - the manifest records
/// the produced name, so the two sides can never drift apart.
pub fn payload_file_name(chunk: &Chunk) -> String {
    let slug = chunk.entry.type_tag.slug();
    match name_slug(&chunk.entry.name) {
        Some(name) => format!("chunk_{:03}_{}_{}.bin", chunk.ordinal(), slug, name),
        None => format!("chunk_{:03}_{}.bin", chunk.ordinal(), slug),
    }
}

/// Lowercased, underscore-separated identifier token, capped at 32 bytes.
fn name_slug(name: &str) -> Option<String> {
    let mut slug = String::new();
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('_') {
            slug.push('_');
        }
    }
    let slug = slug.trim_end_matches('_');
    if slug.is_empty() {
        return None;
    }
    let mut slug = slug.to_owned();
    slug.truncate(32);
    Some(slug)
}

/// Write every chunk payload plus the manifest into `dir`.
///
/// Payload files fan out across the rayon pool - chunks never alias each
/// other, so the only coordination is the final join. The manifest is
/// written last, after every payload it references exists.
pub fn extract_to_dir(directory: &ChunkDirectory, dir: &Path) -> Result<ExtractStats> {
    fs::create_dir_all(dir)?;

    let records: Vec<(String, &Chunk)> = directory
        .iter()
        .map(|chunk| (payload_file_name(chunk), chunk))
        .collect();

    records.par_iter().try_for_each(|(file_name, chunk)| {
        debug!(
            ordinal = chunk.ordinal(),
            file = %file_name,
            len = chunk.payload.len(),
            "writing payload"
        );
        fs::write(dir.join(file_name), &chunk.payload)?;
        Ok::<(), crate::Error>(())
    })?;

    let chunks = records
        .iter()
        .map(|(file_name, chunk)| ManifestChunk {
            ordinal: chunk.ordinal(),
            type_tag: format!("{:#010x}", chunk.entry.type_tag.0),
            type_name: chunk.entry.type_tag.name().map(str::to_owned),
            name: chunk.entry.name.clone(),
            version: chunk.entry.version,
            length: chunk.payload.len() as u64,
            crc32c: checksum::checksum(&chunk.payload),
            class: chunk.class,
            payload_file: file_name.clone(),
            pci: chunk.structured.as_ref().map(|fields| PciBlock {
                details: fields.details.clone(),
                devices: fields.devices.clone(),
            }),
        })
        .collect();

    let manifest = Manifest {
        manifest_version: MANIFEST_VERSION,
        container_version: FORMAT_VERSION,
        chunks,
    };
    manifest.save(dir)?;

    let payload_bytes = directory.iter().map(|c| c.payload.len() as u64).sum();
    info!(chunks = directory.len(), payload_bytes, "extraction complete");

    Ok(ExtractStats {
        chunks: directory.len(),
        payload_bytes,
    })
}
