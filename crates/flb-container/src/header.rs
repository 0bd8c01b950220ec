//! The fixed container header.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Magic bytes at the start of every FLB3 container.
pub const FLB3_MAGIC: [u8; 4] = *b"FLB3";

/// The only container format version this codec understands.
pub const FORMAT_VERSION: u16 = 1;

/// Size of the fixed container header in bytes.
pub const HEADER_SIZE: usize = 16;

/// On-disk container header, magic included.
///
/// Layout (little-endian):
/// - 4 bytes: magic `FLB3`
/// - 2 bytes: format version
/// - 2 bytes: chunk count
/// - 4 bytes: total container length, header included
/// - 4 bytes: CRC32C of every byte after this header
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct ContainerHeader {
    pub magic: [u8; 4],
    pub version: u16,
    pub chunk_count: u16,
    pub total_len: u32,
    pub global_crc: u32,
}

impl ContainerHeader {
    /// Whether the magic field holds the FLB3 signature.
    pub fn has_valid_magic(&self) -> bool {
        self.magic == FLB3_MAGIC
    }
}
