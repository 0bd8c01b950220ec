//! Container assembly.

use std::collections::BTreeSet;
use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};
use flb_common::checksum;

use crate::chunk::{Chunk, ChunkDirectory};
use crate::entry::{ENTRY_SIZE, NAME_LEN};
use crate::header::{FLB3_MAGIC, FORMAT_VERSION, HEADER_SIZE};
use crate::{Error, Result};

/// Payloads start on this alignment.
pub const PAYLOAD_ALIGN: usize = 8;

/// Fill value for alignment gaps (flash erase state).
pub const PAD_BYTE: u8 = 0xFF;

impl ChunkDirectory {
    /// Assemble a container from this directory.
    ///
    /// Chunks are laid out in ordinal order regardless of their order in the
    /// directory. Offsets, per-chunk checksums, the chunk count, the total
    /// length and the global checksum are all recomputed; whatever the table
    /// entries previously declared is ignored, which is what lets an edited
    /// payload flow through without manifest surgery. An unmodified
    /// directory produced by [`ChunkDirectory::parse`] reassembles to the
    /// original bytes exactly.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let ordered = self.ordered_complete()?;

        let count = ordered.len();
        let table_end = HEADER_SIZE + count * ENTRY_SIZE;
        let mut out = vec![0u8; table_end];

        // Payload region: ordinal order, aligned, checksummed.
        let mut layouts = Vec::with_capacity(count);
        for chunk in &ordered {
            if chunk.payload.len() > u32::MAX as usize {
                return Err(Error::ChunkTooLarge {
                    ordinal: chunk.ordinal(),
                    length: chunk.payload.len(),
                });
            }

            let aligned = align_up(out.len(), PAYLOAD_ALIGN);
            out.resize(aligned, PAD_BYTE);

            let offset = out.len();
            out.extend_from_slice(&chunk.payload);
            layouts.push((offset as u64, checksum::checksum(&chunk.payload)));
        }

        if out.len() > u32::MAX as usize {
            return Err(Error::ContainerTooLarge(out.len()));
        }

        // Chunk table.
        {
            let mut table = &mut out[HEADER_SIZE..table_end];
            for (chunk, (offset, crc)) in ordered.iter().zip(&layouts) {
                table.write_u32::<LittleEndian>(chunk.entry.type_tag.0)?;
                table.write_u32::<LittleEndian>(*offset as u32)?;
                table.write_u32::<LittleEndian>(chunk.payload.len() as u32)?;
                table.write_u32::<LittleEndian>(*crc)?;
                table.write_all(&chunk.entry.version)?;
                table.write_u8(0)?; // reserved
                table.write_all(&encode_name(chunk)?)?;
            }
        }

        // Header last, so the global checksum can cover the final bytes.
        let total_len = out.len() as u32;
        {
            let mut header = &mut out[..HEADER_SIZE];
            header.write_all(&FLB3_MAGIC)?;
            header.write_u16::<LittleEndian>(FORMAT_VERSION)?;
            header.write_u16::<LittleEndian>(count as u16)?;
            header.write_u32::<LittleEndian>(total_len)?;
            header.write_u32::<LittleEndian>(0)?; // patched below
        }
        let global = checksum::checksum(&out[HEADER_SIZE..]);
        out[12..16].copy_from_slice(&global.to_le_bytes());

        Ok(out)
    }

    /// Chunks sorted by ordinal, verified to cover exactly `0..len`.
    fn ordered_complete(&self) -> Result<Vec<&Chunk>> {
        let count = self.len();
        if count > u16::MAX as usize {
            return Err(Error::TooManyChunks(count));
        }

        let mut ordered: Vec<&Chunk> = self.iter().collect();
        ordered.sort_by_key(|c| c.ordinal());

        if ordered
            .iter()
            .enumerate()
            .any(|(i, c)| c.ordinal() as usize != i)
        {
            let present: BTreeSet<u32> = ordered.iter().map(|c| c.ordinal()).collect();
            let missing = (0..count as u32).filter(|o| !present.contains(o)).collect();
            return Err(Error::IncompleteChunkSet { count, missing });
        }

        Ok(ordered)
    }
}

fn align_up(value: usize, align: usize) -> usize {
    value.div_ceil(align) * align
}

fn encode_name(chunk: &Chunk) -> Result<[u8; NAME_LEN]> {
    let bytes = chunk.entry.name.as_bytes();
    if bytes.len() > NAME_LEN || bytes.contains(&0) {
        return Err(Error::InvalidSegmentName {
            ordinal: chunk.ordinal(),
            name: chunk.entry.name.clone(),
            max: NAME_LEN,
        });
    }

    let mut buf = [0u8; NAME_LEN];
    buf[..bytes.len()].copy_from_slice(bytes);
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::FlbType;
    use crate::entry::ChunkTableEntry;

    fn chunk(ordinal: u32, tag: FlbType, payload: Vec<u8>, name: &str) -> Chunk {
        let entry = ChunkTableEntry {
            ordinal,
            type_tag: tag,
            offset: 0,
            length: payload.len() as u32,
            crc: 0,
            version: [1, 2, 3],
            name: name.to_owned(),
        };
        Chunk::from_parts(entry, payload).0
    }

    #[test]
    fn test_round_trip_is_byte_identical() {
        let mut dir = ChunkDirectory::new();
        dir.push(chunk(0, FlbType(0xC0FFEE), vec![7u8; 13], "odd sized"));
        dir.push(chunk(1, FlbType::SIGNATURE, vec![0xAB; 64], "Signature Image"));
        dir.push(chunk(2, FlbType(0x11), vec![], "empty"));

        let bytes = dir.to_bytes().unwrap();
        let parsed = ChunkDirectory::parse(&bytes).unwrap();
        assert!(parsed.is_clean(), "diagnostics: {:?}", parsed.diagnostics);

        let rebuilt = parsed.directory.to_bytes().unwrap();
        assert_eq!(bytes, rebuilt);
    }

    #[test]
    fn test_payloads_are_aligned_and_padded() {
        let mut dir = ChunkDirectory::new();
        dir.push(chunk(0, FlbType(0x1), vec![0x55; 3], "a"));
        dir.push(chunk(1, FlbType(0x2), vec![0x66; 5], "b"));

        let bytes = dir.to_bytes().unwrap();
        let parsed = ChunkDirectory::parse(&bytes).unwrap();

        for c in parsed.directory.iter() {
            assert_eq!(c.entry.offset as usize % PAYLOAD_ALIGN, 0);
        }
        // the gap between chunk 0's 3-byte payload and chunk 1 is erase-state
        let gap_start = parsed.directory.get(0).unwrap().entry.offset as usize + 3;
        let gap_end = parsed.directory.get(1).unwrap().entry.offset as usize;
        assert!(gap_end > gap_start);
        assert!(bytes[gap_start..gap_end].iter().all(|&b| b == PAD_BYTE));
    }

    #[test]
    fn test_write_sorts_by_ordinal() {
        let mut dir = ChunkDirectory::new();
        dir.push(chunk(1, FlbType(0x2), vec![2; 8], "second"));
        dir.push(chunk(0, FlbType(0x1), vec![1; 8], "first"));

        let bytes = dir.to_bytes().unwrap();
        let parsed = ChunkDirectory::parse(&bytes).unwrap();
        assert_eq!(parsed.directory.get(0).unwrap().payload, vec![1; 8]);
        assert_eq!(parsed.directory.get(1).unwrap().payload, vec![2; 8]);
    }

    #[test]
    fn test_gap_in_ordinals_is_fatal() {
        let mut dir = ChunkDirectory::new();
        dir.push(chunk(0, FlbType(0x1), vec![1], "a"));
        dir.push(chunk(2, FlbType(0x2), vec![2], "c"));

        match dir.to_bytes() {
            Err(Error::IncompleteChunkSet { count: 2, missing }) => {
                assert_eq!(missing, vec![1]);
            }
            other => panic!("expected IncompleteChunkSet, got {other:?}"),
        }
    }

    #[test]
    fn test_editing_payload_changes_checksums() {
        let mut dir = ChunkDirectory::new();
        dir.push(chunk(0, FlbType(0x1), vec![0u8; 16], "cfg"));
        let original = dir.to_bytes().unwrap();
        let original_parsed = ChunkDirectory::parse(&original).unwrap();

        let mut edited = original_parsed.directory.clone();
        let mut replacement = edited.get(0).unwrap().clone();
        replacement.payload = vec![0xFF; 16];
        edited = {
            let mut d = ChunkDirectory::new();
            d.push(replacement);
            d
        };

        let rebuilt = ChunkDirectory::parse(&edited.to_bytes().unwrap()).unwrap();
        assert_ne!(
            rebuilt.directory.get(0).unwrap().entry.crc,
            original_parsed.directory.get(0).unwrap().entry.crc
        );
        // and the global checksum moved with it
        assert_ne!(original[12..16], edited.to_bytes().unwrap()[12..16]);
    }

    #[test]
    fn test_unencodable_name_is_fatal() {
        let mut dir = ChunkDirectory::new();
        dir.push(chunk(0, FlbType(0x1), vec![1], &"x".repeat(NAME_LEN + 1)));
        assert!(matches!(
            dir.to_bytes(),
            Err(Error::InvalidSegmentName { ordinal: 0, .. })
        ));
    }

    #[test]
    fn test_align_up() {
        assert_eq!(align_up(0, 8), 0);
        assert_eq!(align_up(1, 8), 8);
        assert_eq!(align_up(8, 8), 8);
        assert_eq!(align_up(216, 8), 216);
    }
}
