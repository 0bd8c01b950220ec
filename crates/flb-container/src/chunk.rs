//! Chunks and the chunk directory.

use crate::classify::{classify, ChunkClass};
use crate::entry::ChunkTableEntry;
use crate::pci::StructuredFields;

/// One segment of a container: its table entry plus payload bytes.
///
/// The payload is always the source of truth for write-back. Decoded PCI
/// fields exist only to describe structured chunks in the manifest and are
/// never re-encoded.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub entry: ChunkTableEntry,
    pub payload: Vec<u8>,
    pub class: ChunkClass,
    /// Present only for chunks that decoded as structured.
    pub structured: Option<StructuredFields>,
}

impl Chunk {
    /// Build a chunk from a table entry and its payload bytes.
    ///
    /// Structured types get their PCI prefix decoded; if that fails the
    /// chunk is carried as opaque instead, and the second return value
    /// reports the downgrade so callers can surface a diagnostic.
    pub fn from_parts(entry: ChunkTableEntry, payload: Vec<u8>) -> (Self, bool) {
        let mut class = classify(entry.type_tag);
        let mut structured = None;
        let mut downgraded = false;

        if class == ChunkClass::Structured {
            match StructuredFields::decode(&payload) {
                Ok(fields) => structured = Some(fields),
                Err(_) => {
                    class = ChunkClass::Opaque;
                    downgraded = true;
                }
            }
        }

        (
            Self { entry, payload, class, structured },
            downgraded,
        )
    }

    /// The chunk's position in the table.
    #[inline]
    pub fn ordinal(&self) -> u32 {
        self.entry.ordinal
    }
}

/// Ordered collection of chunks, keyed by ordinal.
///
/// This is the unit a user edits between extraction and write-back. Each
/// parse or rebuild constructs a fresh directory; nothing is cached or
/// shared across invocations.
#[derive(Debug, Clone, Default)]
pub struct ChunkDirectory {
    chunks: Vec<Chunk>,
}

impl ChunkDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk.
    pub fn push(&mut self, chunk: Chunk) {
        self.chunks.push(chunk);
    }

    /// Number of chunks.
    #[inline]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether the directory holds no chunks.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Look up a chunk by ordinal.
    pub fn get(&self, ordinal: u32) -> Option<&Chunk> {
        self.chunks.iter().find(|c| c.entry.ordinal == ordinal)
    }

    /// Iterate chunks in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.iter()
    }

    /// Sort chunks into ordinal order.
    pub fn sort_by_ordinal(&mut self) {
        self.chunks.sort_by_key(|c| c.entry.ordinal);
    }
}
