//! End-to-end extract / edit / rebuild scenarios over a real directory.

use std::fs;

use tempfile::TempDir;

use flb_container::pci::{PCI_DETAILS_SIZE, PCI_DEVICE_SIZE};
use flb_container::{Chunk, ChunkClass, ChunkDirectory, ChunkTableEntry, FlbType};
use flb_extract::{extract_to_dir, rebuild_from_dir, Manifest, MANIFEST_FILE};

fn make_chunk(ordinal: u32, tag: FlbType, payload: Vec<u8>, name: &str) -> Chunk {
    let entry = ChunkTableEntry {
        ordinal,
        type_tag: tag,
        offset: 0,
        length: payload.len() as u32,
        crc: 0,
        version: [1, 0, 0],
        name: name.to_owned(),
    };
    Chunk::from_parts(entry, payload).0
}

/// A structured payload: PCI details, one device, terminator, firmware blob.
fn structured_payload() -> Vec<u8> {
    let mut payload = Vec::new();
    payload.extend_from_slice(&0x0000_0300u32.to_le_bytes());
    payload.extend_from_slice(&[0u8; PCI_DETAILS_SIZE - 4]);
    for word in [0x8086u16, 0x1563, 0x15d9, 0x0903, 0, 0] {
        payload.extend_from_slice(&word.to_le_bytes());
    }
    payload.extend_from_slice(&[0u8; PCI_DEVICE_SIZE]);
    payload.extend_from_slice(b"pxe option rom contents");
    payload
}

/// The two-chunk scenario container: an opaque config-ish chunk and a
/// Signature Image chunk.
fn scenario_container() -> Vec<u8> {
    let mut dir = ChunkDirectory::new();
    dir.push(make_chunk(0, FlbType(0xCF6), vec![0u8; 16], "config"));
    dir.push(make_chunk(
        1,
        FlbType::SIGNATURE,
        vec![0xDE, 0xAD, 0xBE, 0xEF, 0xDE, 0xAD, 0xBE, 0xEF],
        "Signature Image",
    ));
    dir.to_bytes().unwrap()
}

#[test]
fn extract_then_rebuild_is_byte_identical() {
    let original = scenario_container();
    let parsed = ChunkDirectory::parse(&original).unwrap();
    assert!(parsed.is_clean());

    let out = TempDir::new().unwrap();
    let stats = extract_to_dir(&parsed.directory, out.path()).unwrap();
    assert_eq!(stats.chunks, 2);

    // two payload files plus the manifest
    assert!(out.path().join("chunk_000_unk00000cf6_config.bin").is_file());
    assert!(out.path().join("chunk_001_signature_signature_image.bin").is_file());
    assert!(out.path().join(MANIFEST_FILE).is_file());

    let rebuilt = rebuild_from_dir(out.path()).unwrap().to_bytes().unwrap();
    assert_eq!(rebuilt, original);
}

#[test]
fn manifest_ordinals_and_checksums_match_the_table() {
    let original = scenario_container();
    let parsed = ChunkDirectory::parse(&original).unwrap();

    let out = TempDir::new().unwrap();
    extract_to_dir(&parsed.directory, out.path()).unwrap();

    let manifest = Manifest::load(out.path()).unwrap();
    let ordinals: Vec<u32> = manifest.chunks.iter().map(|c| c.ordinal).collect();
    assert_eq!(ordinals, vec![0, 1]);

    for record in &manifest.chunks {
        let chunk = parsed.directory.get(record.ordinal).unwrap();
        assert_eq!(record.crc32c, chunk.entry.crc);
        assert_eq!(record.length, chunk.payload.len() as u64);
    }
}

#[test]
fn unedited_extraction_has_a_stable_manifest() {
    let original = scenario_container();
    let parsed = ChunkDirectory::parse(&original).unwrap();

    let first = TempDir::new().unwrap();
    extract_to_dir(&parsed.directory, first.path()).unwrap();

    // read(write(read(C))) - rebuild, reassemble, reparse, re-extract.
    let reassembled = rebuild_from_dir(first.path()).unwrap().to_bytes().unwrap();
    let reparsed = ChunkDirectory::parse(&reassembled).unwrap();

    let second = TempDir::new().unwrap();
    extract_to_dir(&reparsed.directory, second.path()).unwrap();

    assert_eq!(
        Manifest::load(first.path()).unwrap(),
        Manifest::load(second.path()).unwrap()
    );
}

#[test]
fn edited_payload_rebuilds_with_new_checksum() {
    let original = scenario_container();
    let parsed = ChunkDirectory::parse(&original).unwrap();

    let out = TempDir::new().unwrap();
    extract_to_dir(&parsed.directory, out.path()).unwrap();

    let manifest = Manifest::load(out.path()).unwrap();
    let edited_file = out.path().join(&manifest.chunks[0].payload_file);
    fs::write(&edited_file, vec![0xFFu8; 16]).unwrap();

    let rebuilt_bytes = rebuild_from_dir(out.path()).unwrap().to_bytes().unwrap();
    assert_ne!(rebuilt_bytes, original);

    let rebuilt = ChunkDirectory::parse(&rebuilt_bytes).unwrap();
    assert!(rebuilt.is_clean());

    // chunk 0 changed checksum, chunk 1 is untouched
    assert_ne!(
        rebuilt.directory.get(0).unwrap().entry.crc,
        parsed.directory.get(0).unwrap().entry.crc
    );
    assert_eq!(
        rebuilt.directory.get(1).unwrap().payload,
        parsed.directory.get(1).unwrap().payload
    );
    assert_eq!(
        rebuilt.directory.get(1).unwrap().entry.crc,
        parsed.directory.get(1).unwrap().entry.crc
    );

    // and a fresh extraction reports the new checksum in its manifest
    let second = TempDir::new().unwrap();
    extract_to_dir(&rebuilt.directory, second.path()).unwrap();
    let new_manifest = Manifest::load(second.path()).unwrap();
    assert_ne!(new_manifest.chunks[0].crc32c, manifest.chunks[0].crc32c);
    assert_eq!(new_manifest.chunks[1].crc32c, manifest.chunks[1].crc32c);
}

#[test]
fn missing_payload_file_is_fatal() {
    let parsed = ChunkDirectory::parse(&scenario_container()).unwrap();

    let out = TempDir::new().unwrap();
    extract_to_dir(&parsed.directory, out.path()).unwrap();

    let manifest = Manifest::load(out.path()).unwrap();
    fs::remove_file(out.path().join(&manifest.chunks[1].payload_file)).unwrap();

    match rebuild_from_dir(out.path()) {
        Err(flb_extract::Error::MissingChunkFile { ordinal: 1, .. }) => {}
        other => panic!("expected MissingChunkFile, got {other:?}"),
    }
}

#[test]
fn mangled_manifest_is_fatal() {
    let parsed = ChunkDirectory::parse(&scenario_container()).unwrap();

    let out = TempDir::new().unwrap();
    extract_to_dir(&parsed.directory, out.path()).unwrap();

    fs::write(out.path().join(MANIFEST_FILE), "{\"chunks\": 7}").unwrap();

    match rebuild_from_dir(out.path()) {
        Err(flb_extract::Error::ManifestSchema { .. }) => {}
        other => panic!("expected ManifestSchema, got {other:?}"),
    }
}

#[test]
fn rebuild_from_incomplete_extraction_cannot_assemble() {
    // Knock chunk 0's payload out of bounds: extraction keeps only chunk 1,
    // and the surviving chunk set refuses to assemble.
    let mut original = scenario_container();
    let offset_field = flb_container::HEADER_SIZE + 4;
    original[offset_field..offset_field + 4].copy_from_slice(&0xFFFF_FF00u32.to_le_bytes());

    let parsed = ChunkDirectory::parse(&original).unwrap();
    assert_eq!(parsed.directory.len(), 1);
    assert!(parsed.directory.get(1).is_some());
    assert!(!parsed.is_clean());

    let out = TempDir::new().unwrap();
    extract_to_dir(&parsed.directory, out.path()).unwrap();

    let directory = rebuild_from_dir(out.path()).unwrap();
    assert!(matches!(
        directory.to_bytes(),
        Err(flb_container::Error::IncompleteChunkSet { .. })
    ));
}

#[test]
fn structured_chunk_surfaces_pci_metadata() {
    let mut dir = ChunkDirectory::new();
    dir.push(make_chunk(0, FlbType::PXE, structured_payload(), "Boot Agent"));
    let container = dir.to_bytes().unwrap();

    let parsed = ChunkDirectory::parse(&container).unwrap();
    assert!(parsed.is_clean());
    assert_eq!(parsed.directory.get(0).unwrap().class, ChunkClass::Structured);

    let out = TempDir::new().unwrap();
    extract_to_dir(&parsed.directory, out.path()).unwrap();

    let manifest = Manifest::load(out.path()).unwrap();
    let record = &manifest.chunks[0];
    assert_eq!(record.class, ChunkClass::Structured);
    assert_eq!(record.type_name.as_deref(), Some("PXE"));

    let pci = record.pci.as_ref().expect("structured chunk carries pci block");
    assert_eq!(pci.details.firmware_type, 0x300);
    assert_eq!(pci.devices.len(), 1);
    assert_eq!(pci.devices[0].vendor, 0x8086);
    assert_eq!(pci.devices[0].device, 0x1563);

    // opaque passthrough still holds for the structured chunk's raw bytes
    let rebuilt = rebuild_from_dir(out.path()).unwrap().to_bytes().unwrap();
    assert_eq!(rebuilt, container);
}

#[test]
fn undecodable_structured_payload_downgrades_to_opaque() {
    let mut dir = ChunkDirectory::new();
    // UEFI_DRIVER is a structured tag, but the payload is too short for the
    // PCI details block.
    dir.push(make_chunk(0, FlbType::UEFI_DRIVER, vec![0xAA; 8], "stub"));
    let container = dir.to_bytes().unwrap();

    let parsed = ChunkDirectory::parse(&container).unwrap();
    let chunk = parsed.directory.get(0).unwrap();
    assert_eq!(chunk.class, ChunkClass::Opaque);
    assert!(parsed
        .diagnostics
        .iter()
        .any(|d| matches!(d, flb_container::Diagnostic::StructuredDecodeFailed { ordinal: 0 })));

    let out = TempDir::new().unwrap();
    extract_to_dir(&parsed.directory, out.path()).unwrap();
    let manifest = Manifest::load(out.path()).unwrap();
    assert_eq!(manifest.chunks[0].class, ChunkClass::Opaque);
    assert!(manifest.chunks[0].pci.is_none());

    // bytes still round-trip exactly
    let rebuilt = rebuild_from_dir(out.path()).unwrap().to_bytes().unwrap();
    assert_eq!(rebuilt, container);
}
