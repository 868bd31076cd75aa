//! Data model types for spool tags.
//!
//! This module contains all the core types for representing tag reads:
//! - UID identity ([`TagUid`])
//! - Classification enums ([`TagType`], [`CarrierType`])
//! - Per-format records and the unified envelope
//! - The normalized spool record ([`SpoolFromTag`])

pub mod data;
pub mod spool;
pub mod tag;
pub mod uid;

pub use data::{
    BambuLabData, BlockMap, NdefRecord, OpenSpoolData, OpenTagData, PrintTagData, RawCapture,
    SpoolEaseData, TagData, TagReadResult,
};
pub use spool::SpoolFromTag;
pub use tag::{CarrierType, TagType};
pub use uid::TagUid;
