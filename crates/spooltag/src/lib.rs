//! spooltag: multi-format codec for NFC filament spool tags.
//!
//! This crate decodes the tag formats found on 3D-printer filament
//! spools into one normalized record, and encodes the formats the
//! application writes back to tags.
//!
//! # Overview
//!
//! Five formats are supported:
//! - **SpoolEase** (V1/V2): URL query string on NTAG carriers; read and write
//! - **Bambu Lab**: Mifare Classic block map; read only
//! - **OpenTag3D**: big-endian binary NDEF record; read and write
//! - **OpenSpool**: JSON NDEF record; read and write
//! - **OpenPrintTag**: CBOR NDEF record; read only
//!
//! # Quick Start
//!
//! ```rust
//! use spooltag::{ColorCatalog, TagType, TagUid};
//! use spooltag::dispatch::{decode_ndef_url, to_spool};
//!
//! let uid = TagUid::parse("04:AA:BB:CC:DD:11:22").unwrap();
//! let result = decode_ndef_url(&uid, "https://info.filament3d.org/V2?ID=42&M=PLA");
//! assert_eq!(result.tag_type, TagType::SpoolEaseV2);
//!
//! let spool = to_spool(&result, &ColorCatalog::default()).unwrap();
//! assert_eq!(spool.material.as_deref(), Some("PLA"));
//! ```
//!
//! # Modules
//!
//! - [`model`]: UID identity, classification enums, per-format records
//! - [`codec`]: one codec per wire format
//! - [`dispatch`]: routes raw input to the matching codec
//! - [`catalog`]: material/color lookup tables
//! - [`error`]: error types
//!
//! # Robustness
//!
//! Physical tags are routinely truncated or partially written, so the
//! decoders treat malformed input as data, not as failure: a read that
//! no codec claims classifies as [`TagType::Unknown`], an unreadable
//! field inside a claimed record degrades to absent, and no decoder
//! panics on arbitrary bytes.

pub mod catalog;
pub mod codec;
pub mod dispatch;
pub mod error;
pub mod model;

// Re-export commonly used types at crate root
pub use catalog::ColorCatalog;
pub use error::UidError;
pub use model::{
    BambuLabData, BlockMap, CarrierType, NdefRecord, OpenSpoolData, OpenTagData, PrintTagData,
    RawCapture, SpoolEaseData, SpoolFromTag, TagData, TagReadResult, TagType, TagUid,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
