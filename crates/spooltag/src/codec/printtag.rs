//! OpenPrintTag CBOR codec.
//!
//! OpenPrintTag records travel as NDEF `application/vnd.openprinttag`
//! payloads holding a CBOR map keyed by small unsigned integers. Only
//! reading is supported: the standard's writer side lives with the tag
//! manufacturers, not this application.
//!
//! Map keys:
//!
//! | key | type | field |
//! |-----|------|-------|
//! | 0 | tstr | material type ("PLA") — identity field |
//! | 1 | tstr | material name ("PLA Pro") |
//! | 2 | tstr | brand name |
//! | 3 | bstr(4) | primary color RGBA |
//! | 4 | array of bstr(4) | secondary colors |
//! | 5 | uint | nominal weight (g) |
//! | 6 | uint | empty spool weight (g) |
//! | 7 | uint | actual full weight (g) |
//!
//! The reader handles the definite-length CBOR subset those tags use
//! (uint, negint, bstr, tstr, array, map, tag, simple/float headers).
//! Truncated input rejects the whole record; a value of an unexpected
//! type degrades that one field to absent; unknown keys are skipped.

use log::debug;

use crate::model::spool::NoteBuilder;
use crate::model::{PrintTagData, SpoolFromTag, TagType, TagUid};

/// NDEF record type tag carrying OpenPrintTag payloads.
pub const RECORD_TYPE: &str = "application/vnd.openprinttag";

const KEY_MATERIAL_TYPE: u64 = 0;
const KEY_MATERIAL_NAME: u64 = 1;
const KEY_BRAND_NAME: u64 = 2;
const KEY_PRIMARY_COLOR: u64 = 3;
const KEY_SECONDARY_COLORS: u64 = 4;
const KEY_NOMINAL_WEIGHT: u64 = 5;
const KEY_EMPTY_WEIGHT: u64 = 6;
const KEY_ACTUAL_WEIGHT: u64 = 7;

/// Largest map/array the reader will walk; physical tags hold a
/// handful of entries, so anything larger is not one of these records.
const MAX_ITEMS: u64 = 64;
/// Nesting allowance: the field map, one array level, one level spare.
const MAX_DEPTH: u8 = 3;

/// A decoded CBOR data item, borrowed from the payload.
#[derive(Debug, Clone, PartialEq)]
enum Item<'a> {
    Uint(u64),
    Bytes(&'a [u8]),
    Text(&'a str),
    Array(Vec<Item<'a>>),
    /// Consumed but carrying nothing this codec interprets
    /// (negatives, floats, nested maps, invalid UTF-8 text).
    Other,
}

/// Bounds-checked reader over a CBOR byte payload.
struct CborReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> CborReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn read_byte(&mut self) -> Option<u8> {
        let byte = *self.data.get(self.pos)?;
        self.pos += 1;
        Some(byte)
    }

    fn read_bytes(&mut self, n: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(n)?;
        if end > self.data.len() {
            return None;
        }
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Some(bytes)
    }

    /// Reads a header's additional-information argument. Indefinite
    /// lengths (info 31) are not part of the subset and reject.
    fn read_argument(&mut self, info: u8) -> Option<u64> {
        match info {
            0..=23 => Some(u64::from(info)),
            24 => self.read_byte().map(u64::from),
            25 => self.read_bytes(2).map(|b| u64::from(u16::from_be_bytes([b[0], b[1]]))),
            26 => self
                .read_bytes(4)
                .map(|b| u64::from(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))),
            27 => self
                .read_bytes(8)
                .map(|b| u64::from_be_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])),
            _ => None,
        }
    }

    /// Reads one data item, bounded in size and nesting depth.
    /// `None` means truncated or outside the supported subset in a way
    /// that loses framing — the whole record is then unreadable.
    fn read_item(&mut self, depth: u8) -> Option<Item<'a>> {
        if depth == 0 {
            return None;
        }
        let header = self.read_byte()?;
        let major = header >> 5;
        let info = header & 0x1F;
        let arg = self.read_argument(info)?;

        match major {
            0 => Some(Item::Uint(arg)),
            // Negative integers keep framing but carry nothing we use.
            1 => Some(Item::Other),
            2 => self.read_bytes(usize::try_from(arg).ok()?).map(Item::Bytes),
            3 => {
                let raw = self.read_bytes(usize::try_from(arg).ok()?)?;
                match std::str::from_utf8(raw) {
                    Ok(s) => Some(Item::Text(s)),
                    Err(_) => Some(Item::Other),
                }
            }
            4 => {
                if arg > MAX_ITEMS {
                    return None;
                }
                let mut items = Vec::with_capacity(arg as usize);
                for _ in 0..arg {
                    items.push(self.read_item(depth - 1)?);
                }
                Some(Item::Array(items))
            }
            5 => {
                if arg > MAX_ITEMS {
                    return None;
                }
                // Nested maps are skipped, entry by entry.
                for _ in 0..arg {
                    self.read_item(depth - 1)?;
                    self.read_item(depth - 1)?;
                }
                Some(Item::Other)
            }
            // Semantic tag: the argument is the tag number; the tagged
            // item follows.
            6 => self.read_item(depth - 1).map(|_| Item::Other),
            // Major 7: simple values and floats; the argument bytes
            // were already consumed by the header read.
            _ => Some(Item::Other),
        }
    }
}

/// The top-level field map, or `None` when the payload is not a
/// well-formed record of the supported subset.
fn parse_fields(payload: &[u8]) -> Option<PrintTagData> {
    let mut reader = CborReader::new(payload);
    let header = reader.read_byte()?;
    if header >> 5 != 5 {
        return None;
    }
    let entries = reader.read_argument(header & 0x1F)?;
    if entries > MAX_ITEMS {
        return None;
    }

    let mut data = PrintTagData::default();
    for _ in 0..entries {
        let key = reader.read_item(MAX_DEPTH)?;
        let value = reader.read_item(MAX_DEPTH)?;
        let Item::Uint(key) = key else {
            // Non-integer keys are not ours; skip the entry.
            continue;
        };
        match key {
            KEY_MATERIAL_TYPE => data.material_type = text(&value),
            KEY_MATERIAL_NAME => data.material_name = text(&value),
            KEY_BRAND_NAME => data.brand_name = text(&value),
            KEY_PRIMARY_COLOR => data.primary_color = color(&value),
            KEY_SECONDARY_COLORS => {
                if let Item::Array(items) = &value {
                    data.secondary_colors = items.iter().filter_map(color).collect();
                }
            }
            KEY_NOMINAL_WEIGHT => data.nominal_weight = weight(&value),
            KEY_EMPTY_WEIGHT => data.empty_weight = weight(&value),
            KEY_ACTUAL_WEIGHT => data.actual_weight = weight(&value),
            _ => {}
        }
    }
    Some(data)
}

fn text(item: &Item<'_>) -> Option<String> {
    match item {
        Item::Text(s) => {
            let s = s.trim();
            if s.is_empty() { None } else { Some(s.to_string()) }
        }
        _ => None,
    }
}

/// A 4-byte RGBA byte string; all-zero means unset, like the other
/// binary formats.
fn color(item: &Item<'_>) -> Option<String> {
    match item {
        Item::Bytes(raw) if raw.len() == 4 && raw.iter().any(|&b| b != 0) => {
            Some(hex::encode_upper(raw))
        }
        _ => None,
    }
}

fn weight(item: &Item<'_>) -> Option<u32> {
    match item {
        Item::Uint(v) if *v > 0 => u32::try_from(*v).ok(),
        _ => None,
    }
}

/// Structural probe: the payload is a readable field map with a
/// non-empty material type. Never panics.
pub fn can_decode(payload: &[u8]) -> bool {
    parse_fields(payload).is_some_and(|data| data.material_type.is_some())
}

/// Decodes an OpenPrintTag payload.
///
/// Returns `None` for truncated or non-CBOR input and for records
/// missing the material type (the identity field). Fields of an
/// unexpected type degrade to absent rather than rejecting the record.
pub fn decode(uid: &TagUid, payload: &[u8]) -> Option<PrintTagData> {
    let mut data = match parse_fields(payload) {
        Some(data) => data,
        None => {
            debug!("unreadable OpenPrintTag payload ({} bytes)", payload.len());
            return None;
        }
    };
    data.material_type.as_ref()?;
    data.tag_id = uid.base64();
    Some(data)
}

/// Projects OpenPrintTag data onto the normalized spool record.
pub fn to_spool(data: &PrintTagData) -> SpoolFromTag {
    let mut spool = SpoolFromTag::for_tag(data.tag_id.clone(), TagType::OpenPrintTag);
    spool.material = data.material_type.clone();
    spool.subtype = data.material_name.clone();
    spool.rgba = data.primary_color.clone();
    spool.brand = data.brand_name.clone();
    spool.label_weight = data.nominal_weight;
    spool.core_weight = data.empty_weight;
    spool.weight_new = data.actual_weight;
    spool.slicer_filament = data
        .material_type
        .as_deref()
        .and_then(crate::catalog::material_to_slicer)
        .map(String::from);

    let mut note = NoteBuilder::new();
    if spool.slicer_filament.is_none() {
        note.missing("Slicer Filament");
    }
    if spool.rgba.is_none() {
        note.missing("Color");
    }
    if spool.brand.is_none() {
        note.missing("Brand");
    }
    spool.note = note.finish();
    spool
}
