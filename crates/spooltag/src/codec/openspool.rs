//! OpenSpool JSON codec.
//!
//! OpenSpool is the simplest of the open filament-tag standards: a flat
//! JSON object in an NDEF `application/json` record, identified by a
//! `"protocol": "openspool"` marker. Temperatures travel as numeric
//! strings on the wire.
//!
//! ```json
//! {"protocol":"openspool","version":"1.0","type":"PLA",
//!  "color_hex":"FFAABB","brand":"Generic","min_temp":"220","max_temp":"240"}
//! ```

use log::debug;
use serde::Serialize;
use serde_json::Value;

use crate::catalog;
use crate::model::spool::NoteBuilder;
use crate::model::{OpenSpoolData, SpoolFromTag, TagType, TagUid};

/// NDEF record type tag carrying OpenSpool payloads.
pub const RECORD_TYPE: &str = "application/json";

/// Value of the protocol marker field.
pub const PROTOCOL_ID: &str = "openspool";

/// Structural probe: the payload parses as JSON and carries the
/// OpenSpool protocol marker. False on any failure; never panics.
pub fn can_decode(payload: &[u8]) -> bool {
    match serde_json::from_slice::<Value>(payload) {
        Ok(value) => value.get("protocol").and_then(Value::as_str) == Some(PROTOCOL_ID),
        Err(_) => false,
    }
}

/// Decodes an OpenSpool JSON payload.
///
/// Returns `None` when the payload is not JSON or the protocol marker
/// is missing. Temperature fields are parsed defensively: a
/// non-numeric string yields an absent field, not a failed decode.
pub fn decode(uid: &TagUid, payload: &[u8]) -> Option<OpenSpoolData> {
    let value: Value = match serde_json::from_slice(payload) {
        Ok(value) => value,
        Err(err) => {
            debug!("not an OpenSpool record: {err}");
            return None;
        }
    };
    if value.get("protocol").and_then(Value::as_str) != Some(PROTOCOL_ID) {
        debug!("not an OpenSpool record: missing protocol marker");
        return None;
    }

    Some(OpenSpoolData {
        tag_id: uid.base64(),
        version: value
            .get("version")
            .and_then(Value::as_str)
            .unwrap_or("1.0")
            .to_string(),
        material_type: str_field(&value, "type"),
        color_hex: str_field(&value, "color_hex"),
        brand: str_field(&value, "brand"),
        min_temp: temp_field(&value, "min_temp"),
        max_temp: temp_field(&value, "max_temp"),
    })
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Temperatures are string-typed on the wire, but tolerate tags that
/// wrote them as bare numbers.
fn temp_field(value: &Value, key: &str) -> Option<u16> {
    match value.get(key)? {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_u64().and_then(|v| u16::try_from(v).ok()),
        _ => None,
    }
}

/// Wire shape for [`encode`]; field order is the serialized key order.
#[derive(Serialize)]
struct WireRecord<'a> {
    protocol: &'a str,
    version: &'a str,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    material_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    color_hex: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    brand: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_temp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_temp: Option<String>,
}

/// Encodes OpenSpool data as compact JSON bytes with deterministic key
/// order, temperatures re-rendered as strings. Only present fields are
/// serialized. Round-trips through [`decode`] for every field.
pub fn encode(data: &OpenSpoolData) -> Vec<u8> {
    let record = WireRecord {
        protocol: PROTOCOL_ID,
        version: &data.version,
        material_type: data.material_type.as_deref(),
        color_hex: data.color_hex.as_deref(),
        brand: data.brand.as_deref(),
        min_temp: data.min_temp.map(|v| v.to_string()),
        max_temp: data.max_temp.map(|v| v.to_string()),
    };
    // Serializing a struct with only scalar fields cannot fail.
    serde_json::to_vec(&record).unwrap_or_default()
}

/// Projects OpenSpool data onto the normalized spool record.
///
/// The wire color is RGB without alpha; full opacity is appended here.
/// OpenSpool carries no weights or color names.
pub fn to_spool(data: &OpenSpoolData) -> SpoolFromTag {
    let mut spool = SpoolFromTag::for_tag(data.tag_id.clone(), TagType::OpenSpool);

    spool.rgba = data.color_hex.as_deref().and_then(|hex| {
        let color = hex.trim_start_matches('#').to_ascii_uppercase();
        match color.len() {
            6 => Some(format!("{color}FF")),
            8 => Some(color),
            _ => None,
        }
    });
    spool.material = data.material_type.clone();
    spool.brand = data.brand.clone();
    spool.slicer_filament = data
        .material_type
        .as_deref()
        .and_then(catalog::material_to_slicer)
        .map(String::from);

    let mut note = NoteBuilder::new();
    match (data.min_temp, data.max_temp) {
        (Some(min), Some(max)) => note.push(format!("Temp: {min}-{max}C")),
        (Some(min), None) => note.push(format!("Min temp: {min}C")),
        (None, Some(max)) => note.push(format!("Max temp: {max}C")),
        (None, None) => {}
    }
    if data.material_type.is_none() {
        note.missing("Material");
    }
    if spool.slicer_filament.is_none() {
        note.missing("Slicer Filament");
    }
    if spool.rgba.is_none() {
        note.missing("Color");
    }
    if data.brand.is_none() {
        note.missing("Brand");
    }
    spool.note = note.finish();
    spool
}
