//! PCI metadata embedded at the front of structured chunk payloads.
//!
//! Every non-signature segment starts with a fixed details block followed by
//! a list of supported PCI devices, terminated by an all-zeros record. The
//! decoded fields describe the chunk in the extraction manifest; the raw
//! payload bytes stay the source of truth for write-back, so there is no
//! encode path here.

use std::fmt;

use flb_common::SliceReader;

/// Size of the PCI details block in bytes.
pub const PCI_DETAILS_SIZE: usize = 41;

/// Size of one PCI device record in bytes.
pub const PCI_DEVICE_SIZE: usize = 12;

/// The fixed details block: a firmware-type word plus reserved bytes.
///
/// The reserved bytes are all zero in images read back from a NIC but
/// sometimes populated in vendor-released images; they are preserved
/// verbatim either way.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PciDetails {
    /// Firmware-type word; normally echoes the table's type tag.
    pub firmware_type: u32,
    /// The 37 reserved bytes following the type word.
    pub reserved: Vec<u8>,
}

/// One supported-device record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PciDevice {
    pub vendor: u16,
    pub device: u16,
    pub subsystem_vendor: u16,
    pub subsystem_device: u16,
    /// Two trailing words of unknown meaning, almost always zero.
    pub extra: [u16; 2],
}

impl PciDevice {
    /// Device lists end with an all-zeros record.
    pub fn is_terminator(&self) -> bool {
        self.vendor == 0
            && self.device == 0
            && self.subsystem_vendor == 0
            && self.subsystem_device == 0
            && self.extra == [0, 0]
    }
}

impl fmt::Display for PciDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04x}:{:04x} subsys {:04x}:{:04x}",
            self.vendor, self.device, self.subsystem_vendor, self.subsystem_device
        )
    }
}

/// Decoded PCI metadata prefix of a structured payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredFields {
    pub details: PciDetails,
    /// Supported devices, terminator record excluded.
    pub devices: Vec<PciDevice>,
}

impl StructuredFields {
    /// Decode the metadata prefix of a structured payload.
    ///
    /// Fails if the payload is too short for the details block or the device
    /// list runs off the end before its terminator; callers downgrade the
    /// chunk to opaque in that case instead of aborting extraction.
    pub fn decode(payload: &[u8]) -> flb_common::Result<Self> {
        let mut reader = SliceReader::new(payload);

        let firmware_type = reader.read_u32()?;
        let reserved = reader.read_bytes(PCI_DETAILS_SIZE - 4)?.to_vec();

        let mut devices = Vec::new();
        loop {
            let record = PciDevice {
                vendor: reader.read_u16()?,
                device: reader.read_u16()?,
                subsystem_vendor: reader.read_u16()?,
                subsystem_device: reader.read_u16()?,
                extra: [reader.read_u16()?, reader.read_u16()?],
            };
            if record.is_terminator() {
                break;
            }
            devices.push(record);
        }

        Ok(Self {
            details: PciDetails { firmware_type, reserved },
            devices,
        })
    }
}
