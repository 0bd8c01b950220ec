//! Container parsing.

use flb_common::{checksum, SliceReader};

use crate::chunk::{Chunk, ChunkDirectory};
use crate::entry::{ChunkTableEntry, ENTRY_SIZE};
use crate::error::Diagnostic;
use crate::header::{ContainerHeader, FLB3_MAGIC, FORMAT_VERSION, HEADER_SIZE};
use crate::{Error, Result};

/// Result of parsing a container: the chunk directory plus every non-fatal
/// problem found along the way.
#[derive(Debug)]
pub struct Parsed {
    pub directory: ChunkDirectory,
    pub diagnostics: Vec<Diagnostic>,
}

impl Parsed {
    /// Whether the container parsed without a single diagnostic.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

impl ChunkDirectory {
    /// Parse an FLB3 container from a byte buffer.
    ///
    /// Only a missing magic or an unsupported format version abort the
    /// parse. Truncation, checksum mismatches and overlapping ranges are
    /// reported per chunk in [`Parsed::diagnostics`] while every intact
    /// chunk is still materialized, so a partially corrupt dump remains
    /// inspectable.
    pub fn parse(data: &[u8]) -> Result<Parsed> {
        if data.len() < HEADER_SIZE {
            return Err(flb_common::Error::UnexpectedEof {
                needed: HEADER_SIZE,
                available: data.len(),
            }
            .into());
        }

        let mut reader = SliceReader::new(data);
        let header: ContainerHeader = reader.read_struct()?;

        if !header.has_valid_magic() {
            return Err(Error::InvalidMagic {
                expected: FLB3_MAGIC,
                actual: header.magic,
            });
        }
        let version = header.version;
        if version != FORMAT_VERSION {
            return Err(Error::UnsupportedVersion(version));
        }

        let mut diagnostics = Vec::new();

        let declared_len = header.total_len;
        if declared_len as usize != data.len() {
            diagnostics.push(Diagnostic::LengthMismatch {
                declared: declared_len,
                actual: data.len(),
            });
        }

        // Chunk table. A table cut off mid-entry yields a TruncatedChunk
        // diagnostic for that ordinal and every later one; entries before
        // the cut still parse.
        let chunk_count = u32::from(header.chunk_count);
        let mut entries = Vec::with_capacity(chunk_count as usize);
        for ordinal in 0..chunk_count {
            if reader.remaining() < ENTRY_SIZE {
                for missing in ordinal..chunk_count {
                    diagnostics.push(Diagnostic::TruncatedChunk {
                        ordinal: missing,
                        needed: ENTRY_SIZE,
                        available: reader.remaining(),
                    });
                }
                break;
            }
            entries.push(ChunkTableEntry::parse(ordinal, &mut reader)?);
        }

        // Payloads.
        let mut directory = ChunkDirectory::new();
        let mut accepted: Vec<(u32, std::ops::Range<u64>)> = Vec::with_capacity(entries.len());
        for entry in entries {
            let range = entry.payload_range();
            if range.end > data.len() as u64 {
                diagnostics.push(Diagnostic::TruncatedChunk {
                    ordinal: entry.ordinal,
                    needed: range.end as usize,
                    available: data.len(),
                });
                continue;
            }

            if let Some((first, _)) = accepted
                .iter()
                .find(|(_, prior)| prior.start < range.end && range.start < prior.end)
            {
                diagnostics.push(Diagnostic::OverlappingChunks {
                    first: *first,
                    second: entry.ordinal,
                });
            }
            accepted.push((entry.ordinal, range.clone()));

            let payload = data[range.start as usize..range.end as usize].to_vec();
            if !checksum::verify(&payload, entry.crc) {
                diagnostics.push(Diagnostic::ChunkChecksumMismatch {
                    ordinal: entry.ordinal,
                    expected: entry.crc,
                    actual: checksum::checksum(&payload),
                });
            }

            let (chunk, downgraded) = Chunk::from_parts(entry, payload);
            if downgraded {
                diagnostics.push(Diagnostic::StructuredDecodeFailed {
                    ordinal: chunk.ordinal(),
                });
            }
            directory.push(chunk);
        }

        // Global checksum covers everything after the fixed header.
        let actual_global = checksum::checksum(&data[HEADER_SIZE..]);
        let declared_global = header.global_crc;
        if actual_global != declared_global {
            diagnostics.push(Diagnostic::GlobalChecksumMismatch {
                expected: declared_global,
                actual: actual_global,
            });
        }

        Ok(Parsed { directory, diagnostics })
    }
}
