//! Chunk table entries.

use std::ops::Range;

use flb_common::SliceReader;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::classify::FlbType;

/// Size of one on-disk chunk table entry in bytes.
pub const ENTRY_SIZE: usize = 100;

/// Width of the fixed, NUL-padded segment name field.
pub const NAME_LEN: usize = 80;

/// Fixed-layout prefix of a chunk table entry, everything before the name.
///
/// Layout (little-endian):
/// - 4 bytes: segment type tag
/// - 4 bytes: absolute payload offset from container start
/// - 4 bytes: payload length
/// - 4 bytes: CRC32C of the payload
/// - 3 bytes: segment version triple
/// - 1 byte: reserved, written as zero
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub(crate) struct RawEntry {
    pub type_tag: u32,
    pub offset: u32,
    pub length: u32,
    pub crc: u32,
    pub version: [u8; 3],
    pub reserved: u8,
}

/// One chunk table record in parsed form.
///
/// The ordinal is the entry's position in the table and defines on-disk
/// order; it is preserved through extraction and write-back even if the
/// table is edited out of order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkTableEntry {
    /// Position in the chunk table.
    pub ordinal: u32,
    /// Segment type tag.
    pub type_tag: FlbType,
    /// Absolute payload offset from the container start. Recomputed on write.
    pub offset: u32,
    /// Payload length in bytes. Recomputed on write.
    pub length: u32,
    /// CRC32C of the payload. Recomputed on write.
    pub crc: u32,
    /// Segment version triple (major, minor, patch).
    pub version: [u8; 3],
    /// Segment description, NUL padding stripped.
    pub name: String,
}

impl ChunkTableEntry {
    /// Parse one table entry at the reader's current position.
    ///
    /// A name field holding non-UTF-8 garbage is decoded lossily rather than
    /// failing the whole extraction; the bytes that matter for flashing live
    /// in the payload, not the label.
    pub(crate) fn parse(ordinal: u32, reader: &mut SliceReader<'_>) -> flb_common::Result<Self> {
        let raw: RawEntry = reader.read_struct()?;
        let name_bytes = reader.read_padded_bytes(NAME_LEN)?;
        let name = String::from_utf8_lossy(name_bytes).into_owned();

        Ok(Self {
            ordinal,
            type_tag: FlbType(raw.type_tag),
            offset: raw.offset,
            length: raw.length,
            crc: raw.crc,
            version: raw.version,
            name,
        })
    }

    /// Byte range the payload occupies in the container.
    ///
    /// Computed in u64 so hostile offset/length pairs cannot overflow.
    pub fn payload_range(&self) -> Range<u64> {
        let start = u64::from(self.offset);
        start..start + u64::from(self.length)
    }
}
