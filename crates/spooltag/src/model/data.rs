//! Per-format tag records and the unified read-result envelope.
//!
//! Physical tags are frequently partially written, so every field here
//! is optional except each format's primary identity field, which the
//! codecs guarantee to be populated (a read that cannot produce it
//! classifies as [`TagType::Unknown`] instead).

use rustc_hash::FxHashMap;

use crate::model::tag::{CarrierType, TagType};
use crate::model::uid::TagUid;

/// Mapping from Mifare block index to raw block content (16 bytes each
/// on Classic carriers). Absent indices read as all-zero.
pub type BlockMap = FxHashMap<u8, Vec<u8>>;

/// A typed NDEF-style record as handed over by the transport layer:
/// a type tag (well-known type or MIME string) plus payload bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NdefRecord {
    pub record_type: String,
    pub payload: Vec<u8>,
}

impl NdefRecord {
    pub fn new(record_type: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            record_type: record_type.into(),
            payload: payload.into(),
        }
    }
}

/// Parsed data from a SpoolEase tag (URL-encoded, V1 or V2).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpoolEaseData {
    /// Wire version: 1 (id-only field set) or 2 (full field set).
    pub version: u8,
    /// Base64-encoded UID.
    pub tag_id: String,
    pub spool_id: Option<String>,
    pub material: Option<String>,
    pub material_subtype: Option<String>,
    /// RGBA hex, e.g. "FF0000FF".
    pub color_code: Option<String>,
    pub color_name: Option<String>,
    pub brand: Option<String>,
    /// Advertised weight in grams.
    pub weight_label: Option<u32>,
    /// Empty spool weight in grams.
    pub weight_core: Option<u32>,
    /// Actual weight when full, in grams.
    pub weight_new: Option<u32>,
    /// Slicer preset code, e.g. "GFL99".
    pub slicer_filament_code: Option<String>,
    pub slicer_filament_name: Option<String>,
    pub note: Option<String>,
    /// Unix timestamp of tag programming.
    pub encode_time: Option<i64>,
    /// Unix timestamp of inventory insertion.
    pub added_time: Option<i64>,
}

/// Parsed data from a Bambu Lab RFID tag (Mifare Classic blocks).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BambuLabData {
    /// Hex-encoded UID.
    pub tag_id: String,
    /// e.g. "A00-G1".
    pub material_variant_id: Option<String>,
    /// e.g. "GFA00". Identity field for classification.
    pub material_id: Option<String>,
    /// e.g. "PLA".
    pub filament_type: Option<String>,
    /// e.g. "PLA Basic".
    pub detailed_filament_type: Option<String>,
    /// RGBA hex, e.g. "FF0000FF".
    pub color_rgba: Option<String>,
    /// Empty spool weight in grams.
    pub spool_weight: Option<u16>,
}

/// Parsed data from an OpenTag3D tag (big-endian binary record).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OpenTagData {
    /// Base64-encoded UID.
    pub tag_id: String,
    /// Format version word, e.g. 0x0014 for v0.020.
    pub version: u16,
    pub material_name: Option<String>,
    /// e.g. "CF", "GF", "HT".
    pub modifiers: Option<String>,
    pub manufacturer: Option<String>,
    pub color_name: Option<String>,
    /// RGBA hex.
    pub primary_color: Option<String>,
    /// Up to three additional RGBA hex colors.
    pub secondary_colors: Vec<String>,
    /// Target filament diameter in micrometers.
    pub diameter_um: Option<u16>,
    pub weight_g: Option<u16>,
    pub print_temp_c: Option<u16>,
    pub bed_temp_c: Option<u16>,
    /// Density in g/cm³.
    pub density: Option<f64>,
    /// Extended region: online data URL (scheme reconstructed).
    pub url: Option<String>,
    /// Extended region: serial/batch string.
    pub serial: Option<String>,
    /// Extended region: manufacture date as "YYYY-MM-DD".
    pub manufacture_date: Option<String>,
}

/// Parsed data from an OpenSpool tag (NDEF JSON record).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenSpoolData {
    /// Base64-encoded UID.
    pub tag_id: String,
    /// Protocol version string, "1.0" unless the tag says otherwise.
    pub version: String,
    pub material_type: Option<String>,
    /// RGB hex without alpha, e.g. "FFAABB".
    pub color_hex: Option<String>,
    pub brand: Option<String>,
    pub min_temp: Option<u16>,
    pub max_temp: Option<u16>,
}

impl Default for OpenSpoolData {
    fn default() -> Self {
        Self {
            tag_id: String::new(),
            version: "1.0".to_string(),
            material_type: None,
            color_hex: None,
            brand: None,
            min_temp: None,
            max_temp: None,
        }
    }
}

/// Parsed data from an OpenPrintTag (CBOR record).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PrintTagData {
    /// Base64-encoded UID.
    pub tag_id: String,
    /// e.g. "PLA", "PETG". Identity field for classification.
    pub material_type: Option<String>,
    pub material_name: Option<String>,
    pub brand_name: Option<String>,
    /// RGBA hex.
    pub primary_color: Option<String>,
    pub secondary_colors: Vec<String>,
    /// Advertised weight in grams.
    pub nominal_weight: Option<u32>,
    /// Real weight when full, in grams.
    pub actual_weight: Option<u32>,
    /// Empty spool weight in grams.
    pub empty_weight: Option<u32>,
}

/// The decoded payload of a classified tag.
///
/// Exactly one format's record is carried per classification; the
/// variant tag is the source of truth for [`TagType`].
#[derive(Debug, Clone, PartialEq)]
pub enum TagData {
    SpoolEase(SpoolEaseData),
    BambuLab(BambuLabData),
    OpenPrintTag(PrintTagData),
    OpenSpool(OpenSpoolData),
    OpenTag3d(OpenTagData),
}

impl TagData {
    /// The tag type this payload classifies as.
    pub fn tag_type(&self) -> TagType {
        match self {
            TagData::SpoolEase(d) if d.version == 1 => TagType::SpoolEaseV1,
            TagData::SpoolEase(_) => TagType::SpoolEaseV2,
            TagData::BambuLab(_) => TagType::BambuLab,
            TagData::OpenPrintTag(_) => TagType::OpenPrintTag,
            TagData::OpenSpool(_) => TagType::OpenSpool,
            TagData::OpenTag3d(_) => TagType::OpenTag3d,
        }
    }
}

/// The raw input that produced a read result, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RawCapture {
    #[default]
    None,
    /// A bare URL string handed over by the transport layer.
    Url(String),
    /// The typed NDEF records as received.
    Ndef(Vec<NdefRecord>),
    /// The Mifare block map as received.
    Blocks(BlockMap),
}

/// Result of reading an NFC tag: UID identity, classification and at
/// most one decoded per-format record.
#[derive(Debug, Clone, PartialEq)]
pub struct TagReadResult {
    /// Uppercase hex UID, no separators.
    pub uid: String,
    /// URL-safe base64 UID without padding (inventory matching key).
    pub uid_base64: String,
    pub carrier: CarrierType,
    pub tag_type: TagType,
    /// `Some` iff `tag_type != Unknown`.
    pub data: Option<TagData>,
    pub raw: RawCapture,
    /// Filled in by the caller after an inventory lookup; never set by
    /// this crate.
    pub matched_spool_id: Option<String>,
}

impl TagReadResult {
    /// Builds the terminal "no codec claimed this input" envelope.
    pub fn unclassified(uid: &TagUid, carrier: CarrierType, raw: RawCapture) -> Self {
        Self {
            uid: uid.hex(),
            uid_base64: uid.base64(),
            carrier,
            tag_type: TagType::Unknown,
            data: None,
            raw,
            matched_spool_id: None,
        }
    }

    /// Builds a classified envelope; the tag type is derived from the
    /// payload so the one-populated-slot invariant holds by construction.
    pub fn classified(uid: &TagUid, carrier: CarrierType, data: TagData, raw: RawCapture) -> Self {
        Self {
            uid: uid.hex(),
            uid_base64: uid.base64(),
            carrier,
            tag_type: data.tag_type(),
            data: Some(data),
            raw,
            matched_spool_id: None,
        }
    }
}
