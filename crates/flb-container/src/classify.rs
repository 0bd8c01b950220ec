//! Chunk type tags and handling classification.
//!
//! The tag values were recovered from known firmware images. Anything
//! unrecognized - and both Signature Image tags, whose internals are
//! possibly cryptographic and deliberately not modeled - is handled
//! opaquely: bytes in, same bytes out.

use std::fmt;

/// An FLB segment type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlbType(pub u32);

impl FlbType {
    pub const PXE: Self = Self(0x0000_0300);
    pub const UEFI_DRIVER: Self = Self(0x0000_0800);
    pub const ISCSI_OPTION: Self = Self(0x0000_1000);
    pub const FCOE_OPTION: Self = Self(0x0000_2000);
    pub const COMBO_RULES: Self = Self(0x0001_0000);
    pub const CIVD_BIN: Self = Self(0x0010_0000);
    pub const COMBO_VERSION_NAME: Self = Self(0x0010_0001);
    pub const OCD_OPTION: Self = Self(0x0020_0000);
    pub const CLP_LOADER: Self = Self(0x0080_0000);
    pub const ISCSI_SETUP: Self = Self(0x0100_0000);
    pub const MODULE_40G: Self = Self(0x0200_0000);
    pub const UEFI_X64_FCOE_DRIVER: Self = Self(0x1000_0000);
    pub const SIGNATURE: Self = Self(0x2000_0000);
    pub const SIGNATURE_2: Self = Self(0x2000_0100);

    /// Human-readable name for known tags.
    pub fn name(self) -> Option<&'static str> {
        match self.0 {
            0x0000_0300 => Some("PXE"),
            0x0000_0800 => Some("UEFI_DRIVER"),
            0x0000_1000 => Some("ISCSI_OPTION"),
            0x0000_2000 => Some("FCOE_OPTION"),
            0x0001_0000 => Some("COMBO_RULES"),
            0x0010_0000 => Some("CIVD_BIN"),
            0x0010_0001 => Some("COMBO_VERSION_NAME"),
            0x0020_0000 => Some("OCD_OPTION"),
            0x0080_0000 => Some("CLP_LOADER"),
            0x0100_0000 => Some("ISCSI_SETUP"),
            0x0200_0000 => Some("MODULE_40G"),
            0x1000_0000 => Some("UEFI_X64_FCOE_DRIVER"),
            0x2000_0000 => Some("SIGNATURE"),
            0x2000_0100 => Some("SIGNATURE_2"),
            _ => None,
        }
    }

    /// Whether this tag marks a Signature Image segment.
    pub fn is_signature(self) -> bool {
        matches!(self.0, 0x2000_0000 | 0x2000_0100)
    }

    /// Short lowercase token used in extracted file names.
    pub fn slug(self) -> String {
        match self.name() {
            Some(name) => name.to_ascii_lowercase(),
            None => format!("unk{:08x}", self.0),
        }
    }
}

impl fmt::Display for FlbType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{:#x} ({})", self.0, name),
            None => write!(f, "{:#x} (UNKNOWN)", self.0),
        }
    }
}

/// How a chunk's payload is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ChunkClass {
    /// Bytes are stored and restored verbatim, never interpreted.
    Opaque,
    /// Payload begins with a decodable PCI metadata block.
    Structured,
}

/// Map a type tag to its handling strategy.
///
/// Signature Image segments and unknown tags classify as [`ChunkClass::Opaque`].
pub fn classify(tag: FlbType) -> ChunkClass {
    if tag.is_signature() || tag.name().is_none() {
        ChunkClass::Opaque
    } else {
        ChunkClass::Structured
    }
}
