//! Common utilities for the FLB3 toolkit.
//!
//! This crate provides the foundations shared by the container codec and the
//! extraction layer:
//!
//! - [`SliceReader`] - bounds-checked binary reading from byte slices
//! - [`checksum`] - the CRC32C checksum engine used for chunk and container
//!   integrity

mod error;
mod reader;

pub mod checksum;

pub use error::{Error, Result};
pub use reader::SliceReader;

/// Re-export zerocopy traits for convenience
pub use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};
