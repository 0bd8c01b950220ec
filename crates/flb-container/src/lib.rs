//! FLB3 NIC firmware container codec.
//!
//! FLB3 is the reverse-engineered container format Intel NIC firmware ships
//! in. This crate splits a container into typed chunks and reassembles a
//! container from (possibly edited) chunks with the layout, ordering and
//! checksums the hardware expects. Round-trip fidelity is the load-bearing
//! guarantee: parsing a canonical container and writing it straight back
//! reproduces the input byte for byte.
//!
//! # File Format
//!
//! All integers little-endian.
//!
//! - 16-byte header: magic `FLB3`, format version, chunk count, total
//!   length, CRC32C of everything after the header
//! - chunk table: one 100-byte entry per chunk - type tag, payload offset,
//!   payload length, payload CRC32C, version triple, reserved byte, 80-byte
//!   NUL-padded segment name
//! - payloads in table order, each starting on an 8-byte boundary with
//!   `0xFF` fill in the gaps
//!
//! Chunk payloads come in two kinds. Structured chunks open with a PCI
//! metadata block (details word plus a supported-device list) that gets
//! decoded into the extraction manifest. Signature Image chunks and chunks
//! with unrecognized tags are opaque: their bytes are carried untouched and
//! never interpreted.
//!
//! # Example
//!
//! ```no_run
//! use flb_container::ChunkDirectory;
//!
//! let data = std::fs::read("BootImg.FLB")?;
//! let parsed = ChunkDirectory::parse(&data)?;
//!
//! for diagnostic in &parsed.diagnostics {
//!     eprintln!("warning: {diagnostic}");
//! }
//! for chunk in parsed.directory.iter() {
//!     println!("chunk {}: {} ({} bytes)", chunk.ordinal(), chunk.entry.type_tag, chunk.payload.len());
//! }
//!
//! let rebuilt = parsed.directory.to_bytes()?;
//! assert_eq!(rebuilt, data);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod chunk;
mod classify;
mod entry;
mod error;
mod header;
mod read;
mod verify;
mod write;

pub mod pci;

pub use chunk::{Chunk, ChunkDirectory};
pub use classify::{classify, ChunkClass, FlbType};
pub use entry::{ChunkTableEntry, ENTRY_SIZE, NAME_LEN};
pub use error::{Diagnostic, Error, Result};
pub use header::{ContainerHeader, FLB3_MAGIC, FORMAT_VERSION, HEADER_SIZE};
pub use read::Parsed;
pub use verify::{verify_roundtrip, RoundTrip};
pub use write::{PAD_BYTE, PAYLOAD_ALIGN};
