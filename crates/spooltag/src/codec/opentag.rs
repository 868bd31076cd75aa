//! OpenTag3D binary codec.
//!
//! OpenTag3D stores a big-endian struct at fixed offsets inside an NDEF
//! record of type `application/opentag3d`. The core region (102 bytes)
//! fits an NTAG213; higher-capacity carriers add an extended region
//! with URL, serial and manufacture date.
//!
//! Core region offsets:
//!
//! | offset | size | field |
//! |--------|------|-------|
//! | 0x00 | 2  | tag version (u16, 0x0014 = v0.020) |
//! | 0x02 | 5  | material name |
//! | 0x07 | 5  | modifiers ("CF", "GF", "HT") |
//! | 0x1B | 16 | manufacturer |
//! | 0x2B | 32 | color name |
//! | 0x4B | 4  | primary color RGBA |
//! | 0x4F | 12 | secondary colors 1-3, RGBA each |
//! | 0x5C | 2  | target diameter (µm) |
//! | 0x5E | 2  | target weight (g) |
//! | 0x60 | 1  | print temperature (°C / 5) |
//! | 0x61 | 1  | bed temperature (°C / 5) |
//! | 0x62 | 2  | density (g/cm³ × 1000) |
//!
//! Extended region: 0x70 URL suffix (32 bytes, scheme omitted), 0x90
//! serial/batch (16 bytes), 0xA0 manufacture date (u16 year, u8 month,
//! u8 day).
//!
//! Known format limitation: all-zero means "unset" for the numeric
//! fields and color slots, so a legitimately zero value is not
//! representable. Zeros therefore decode as absent, and the round-trip
//! law holds modulo that ambiguity.

use log::warn;

use crate::catalog;
use crate::codec::fields::{
    read_fixed_str, read_rgba, read_u8, read_u16_be, write_fixed_str, write_rgba,
};
use crate::model::spool::NoteBuilder;
use crate::model::{OpenTagData, SpoolFromTag, TagType, TagUid};

/// NDEF record type tag carrying OpenTag3D payloads.
pub const RECORD_TYPE: &str = "application/opentag3d";

/// Version word written when the caller does not supply one.
pub const DEFAULT_VERSION: u16 = 0x0014;

/// Core region length; the decode minimum.
pub const CORE_LEN: usize = 0x66;
/// Total length with the extended region.
pub const EXTENDED_LEN: usize = 0xA4;

const OFF_VERSION: usize = 0x00;
const OFF_MATERIAL: usize = 0x02;
const OFF_MODIFIERS: usize = 0x07;
const OFF_MANUFACTURER: usize = 0x1B;
const OFF_COLOR_NAME: usize = 0x2B;
const OFF_COLOR_PRIMARY: usize = 0x4B;
const OFF_COLORS_SECONDARY: [usize; 3] = [0x4F, 0x53, 0x57];
const OFF_DIAMETER: usize = 0x5C;
const OFF_WEIGHT: usize = 0x5E;
const OFF_PRINT_TEMP: usize = 0x60;
const OFF_BED_TEMP: usize = 0x61;
const OFF_DENSITY: usize = 0x62;
const OFF_URL: usize = 0x70;
const OFF_SERIAL: usize = 0x90;
const OFF_MFG_DATE: usize = 0xA0;

const SIZE_MATERIAL: usize = 5;
const SIZE_MODIFIERS: usize = 5;
const SIZE_MANUFACTURER: usize = 16;
const SIZE_COLOR_NAME: usize = 32;
const SIZE_URL: usize = 32;
const SIZE_SERIAL: usize = 16;

/// Structural probe: the payload covers at least the core region.
pub fn can_decode(payload: &[u8]) -> bool {
    payload.len() >= CORE_LEN
}

/// Decodes an OpenTag3D payload.
///
/// Rejects (returns `None`) only buffers shorter than the core region.
/// Individual fields that fail to parse — bad UTF-8, zero-valued
/// integers — degrade to absent fields. Extended fields are read only
/// when the buffer covers them.
pub fn decode(uid: &TagUid, payload: &[u8]) -> Option<OpenTagData> {
    if payload.len() < CORE_LEN {
        warn!("OpenTag3D payload too short: {} bytes", payload.len());
        return None;
    }

    let secondary_colors = OFF_COLORS_SECONDARY
        .iter()
        .filter_map(|&off| read_rgba(payload, off))
        .collect();

    let print_temp_c = read_u8(payload, OFF_PRINT_TEMP)
        .filter(|&v| v != 0)
        .map(|v| u16::from(v) * 5);
    let bed_temp_c = read_u8(payload, OFF_BED_TEMP)
        .filter(|&v| v != 0)
        .map(|v| u16::from(v) * 5);
    let density = read_u16_be(payload, OFF_DENSITY)
        .filter(|&v| v != 0)
        .map(|v| f64::from(v) / 1000.0);

    let url = if payload.len() >= OFF_URL + SIZE_URL {
        read_fixed_str(payload, OFF_URL, SIZE_URL).map(|suffix| format!("https://{suffix}"))
    } else {
        None
    };
    let serial = if payload.len() >= OFF_SERIAL + SIZE_SERIAL {
        read_fixed_str(payload, OFF_SERIAL, SIZE_SERIAL)
    } else {
        None
    };
    let manufacture_date = decode_date(payload);

    Some(OpenTagData {
        tag_id: uid.base64(),
        version: read_u16_be(payload, OFF_VERSION).unwrap_or(0),
        material_name: read_fixed_str(payload, OFF_MATERIAL, SIZE_MATERIAL),
        modifiers: read_fixed_str(payload, OFF_MODIFIERS, SIZE_MODIFIERS),
        manufacturer: read_fixed_str(payload, OFF_MANUFACTURER, SIZE_MANUFACTURER),
        color_name: read_fixed_str(payload, OFF_COLOR_NAME, SIZE_COLOR_NAME),
        primary_color: read_rgba(payload, OFF_COLOR_PRIMARY),
        secondary_colors,
        diameter_um: read_u16_be(payload, OFF_DIAMETER).filter(|&v| v != 0),
        weight_g: read_u16_be(payload, OFF_WEIGHT).filter(|&v| v != 0),
        print_temp_c,
        bed_temp_c,
        density,
        url,
        serial,
        manufacture_date,
    })
}

fn decode_date(payload: &[u8]) -> Option<String> {
    if payload.len() < OFF_MFG_DATE + 4 {
        return None;
    }
    let year = read_u16_be(payload, OFF_MFG_DATE).filter(|&v| v != 0)?;
    let month = read_u8(payload, OFF_MFG_DATE + 2).filter(|&v| v != 0)?;
    let day = read_u8(payload, OFF_MFG_DATE + 3).filter(|&v| v != 0)?;
    Some(format!("{year:04}-{month:02}-{day:02}"))
}

/// Encodes OpenTag3D data as tag-writable bytes.
///
/// Writes exactly the core region, or core plus extended when
/// `extended` is set (which needs an NTAG215 or larger). Unset fields
/// stay zero; overlong strings truncate to their fixed width.
pub fn encode(data: &OpenTagData, extended: bool) -> Vec<u8> {
    let len = if extended { EXTENDED_LEN } else { CORE_LEN };
    let mut payload = vec![0u8; len];

    let version = if data.version != 0 {
        data.version
    } else {
        DEFAULT_VERSION
    };
    payload[OFF_VERSION..OFF_VERSION + 2].copy_from_slice(&version.to_be_bytes());

    if let Some(v) = &data.material_name {
        write_fixed_str(&mut payload, OFF_MATERIAL, SIZE_MATERIAL, v);
    }
    if let Some(v) = &data.modifiers {
        write_fixed_str(&mut payload, OFF_MODIFIERS, SIZE_MODIFIERS, v);
    }
    if let Some(v) = &data.manufacturer {
        write_fixed_str(&mut payload, OFF_MANUFACTURER, SIZE_MANUFACTURER, v);
    }
    if let Some(v) = &data.color_name {
        write_fixed_str(&mut payload, OFF_COLOR_NAME, SIZE_COLOR_NAME, v);
    }
    if let Some(v) = &data.primary_color {
        write_rgba(&mut payload, OFF_COLOR_PRIMARY, v);
    }
    for (color, &off) in data.secondary_colors.iter().zip(OFF_COLORS_SECONDARY.iter()) {
        write_rgba(&mut payload, off, color);
    }

    if let Some(v) = data.diameter_um {
        payload[OFF_DIAMETER..OFF_DIAMETER + 2].copy_from_slice(&v.to_be_bytes());
    }
    if let Some(v) = data.weight_g {
        payload[OFF_WEIGHT..OFF_WEIGHT + 2].copy_from_slice(&v.to_be_bytes());
    }
    if let Some(v) = data.print_temp_c {
        payload[OFF_PRINT_TEMP] = (v / 5).min(255) as u8;
    }
    if let Some(v) = data.bed_temp_c {
        payload[OFF_BED_TEMP] = (v / 5).min(255) as u8;
    }
    if let Some(v) = data.density {
        let raw = (v * 1000.0).round().clamp(0.0, 65535.0) as u16;
        payload[OFF_DENSITY..OFF_DENSITY + 2].copy_from_slice(&raw.to_be_bytes());
    }

    if extended {
        if let Some(url) = &data.url {
            let suffix = url
                .strip_prefix("https://")
                .or_else(|| url.strip_prefix("http://"))
                .unwrap_or(url);
            write_fixed_str(&mut payload, OFF_URL, SIZE_URL, suffix);
        }
        if let Some(v) = &data.serial {
            write_fixed_str(&mut payload, OFF_SERIAL, SIZE_SERIAL, v);
        }
        if let Some(date) = &data.manufacture_date {
            encode_date(&mut payload, date);
        }
    }

    payload
}

fn encode_date(payload: &mut [u8], date: &str) {
    let mut parts = date.splitn(3, '-');
    let year: Option<u16> = parts.next().and_then(|p| p.parse().ok());
    let month: Option<u8> = parts.next().and_then(|p| p.parse().ok());
    let day: Option<u8> = parts.next().and_then(|p| p.parse().ok());
    // A date that does not parse as YYYY-MM-DD leaves the slot unset.
    if let (Some(year), Some(month), Some(day)) = (year, month, day) {
        payload[OFF_MFG_DATE..OFF_MFG_DATE + 2].copy_from_slice(&year.to_be_bytes());
        payload[OFF_MFG_DATE + 2] = month;
        payload[OFF_MFG_DATE + 3] = day;
    }
}

/// Projects OpenTag3D data onto the normalized spool record.
pub fn to_spool(data: &OpenTagData) -> SpoolFromTag {
    let mut spool = SpoolFromTag::for_tag(data.tag_id.clone(), TagType::OpenTag3d);
    spool.material = data.material_name.clone();
    spool.subtype = data.modifiers.clone();
    spool.color_name = data.color_name.clone();
    spool.rgba = data.primary_color.clone();
    spool.brand = data.manufacturer.clone();
    spool.label_weight = data.weight_g.map(u32::from);
    spool.slicer_filament = data
        .material_name
        .as_deref()
        .and_then(catalog::material_to_slicer)
        .map(String::from);

    let mut note = NoteBuilder::new();
    match (data.print_temp_c, data.bed_temp_c) {
        (Some(print), Some(bed)) => note.push(format!("Print: {print}C, Bed: {bed}C")),
        (Some(print), None) => note.push(format!("Print temp: {print}C")),
        _ => {}
    }
    if let Some(density) = data.density {
        note.push(format!("Density: {density:.2} g/cm³"));
    }
    if let Some(um) = data.diameter_um {
        note.push(format!("Diameter: {:.2}mm", f64::from(um) / 1000.0));
    }
    if let Some(serial) = &data.serial {
        note.push(format!("S/N: {serial}"));
    }
    if let Some(date) = &data.manufacture_date {
        note.push(format!("Mfg: {date}"));
    }
    if let Some(url) = &data.url {
        note.push(format!("URL: {url}"));
    }
    if spool.material.is_none() {
        note.missing("Material");
    }
    if spool.slicer_filament.is_none() {
        note.missing("Slicer Filament");
    }
    if data.color_name.is_none() && data.primary_color.is_none() {
        note.missing("Color");
    }
    if data.manufacturer.is_none() {
        note.missing("Brand");
    }
    spool.note = note.finish();
    spool
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn uid() -> TagUid {
        TagUid::parse("04AABBCCDD1122").unwrap()
    }

    fn full_data() -> OpenTagData {
        OpenTagData {
            tag_id: uid().base64(),
            version: DEFAULT_VERSION,
            material_name: Some("PETG".to_string()),
            modifiers: Some("CF".to_string()),
            manufacturer: Some("Polymaker".to_string()),
            color_name: Some("Black".to_string()),
            primary_color: Some("1A1A1AFF".to_string()),
            secondary_colors: vec!["FF0000FF".to_string(), "00FF00FF".to_string()],
            diameter_um: Some(1750),
            weight_g: Some(1000),
            print_temp_c: Some(250),
            bed_temp_c: Some(80),
            density: Some(1.27),
            url: Some("https://example.com/spool/1".to_string()),
            serial: Some("BATCH-042".to_string()),
            manufacture_date: Some("2025-03-14".to_string()),
        }
    }

    #[test]
    fn test_reject_short_payload() {
        assert!(!can_decode(&[0u8; 50]));
        assert_eq!(decode(&uid(), &[0u8; 50]), None);
        assert_eq!(decode(&uid(), &[]), None);
        assert_eq!(decode(&uid(), &[0u8; CORE_LEN - 1]), None);
    }

    #[test]
    fn test_decode_minimal_core() {
        let mut payload = vec![0u8; CORE_LEN];
        payload[OFF_VERSION..OFF_VERSION + 2].copy_from_slice(&DEFAULT_VERSION.to_be_bytes());
        payload[OFF_MATERIAL..OFF_MATERIAL + 3].copy_from_slice(b"PLA");

        let data = decode(&uid(), &payload).unwrap();
        assert_eq!(data.material_name.as_deref(), Some("PLA"));
        assert_eq!(data.version, DEFAULT_VERSION);
        // Zero-valued numerics decode as absent.
        assert_eq!(data.weight_g, None);
        assert_eq!(data.print_temp_c, None);
        assert_eq!(data.density, None);
        assert_eq!(data.primary_color, None);
        assert!(data.secondary_colors.is_empty());
        // Core-only buffer carries no extended fields.
        assert_eq!(data.url, None);
        assert_eq!(data.serial, None);
        assert_eq!(data.manufacture_date, None);
    }

    #[test]
    fn test_core_roundtrip() {
        let mut data = full_data();
        // Core-only encode drops the extended fields.
        data.url = None;
        data.serial = None;
        data.manufacture_date = None;

        let payload = encode(&data, false);
        assert_eq!(payload.len(), CORE_LEN);
        let decoded = decode(&uid(), &payload).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn test_extended_roundtrip() {
        let data = full_data();
        let payload = encode(&data, true);
        assert_eq!(payload.len(), EXTENDED_LEN);
        let decoded = decode(&uid(), &payload).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn test_roundtrip_reproduces_set_fields() {
        let data = OpenTagData {
            tag_id: uid().base64(),
            material_name: Some("PC".to_string()),
            weight_g: Some(800),
            print_temp_c: Some(270),
            ..Default::default()
        };
        let decoded = decode(&uid(), &encode(&data, false)).unwrap();
        assert_eq!(decoded.material_name.as_deref(), Some("PC"));
        assert_eq!(decoded.weight_g, Some(800));
        assert_eq!(decoded.print_temp_c, Some(270));
    }

    #[test]
    fn test_encode_truncates_overlong_strings() {
        let data = OpenTagData {
            material_name: Some("POLYCARBONATE".to_string()),
            ..Default::default()
        };
        let decoded = decode(&uid(), &encode(&data, false)).unwrap();
        assert_eq!(decoded.material_name.as_deref(), Some("POLYC"));
    }

    #[test]
    fn test_invalid_utf8_field_degrades() {
        let mut payload = encode(&full_data(), false);
        payload[OFF_MANUFACTURER] = 0xFF;
        payload[OFF_MANUFACTURER + 1] = 0xFE;
        let decoded = decode(&uid(), &payload).unwrap();
        assert_eq!(decoded.manufacturer, None);
        // The neighbouring fields still decode.
        assert_eq!(decoded.material_name.as_deref(), Some("PETG"));
        assert_eq!(decoded.color_name.as_deref(), Some("Black"));
    }

    #[test]
    fn test_bad_primary_color_hex_leaves_slot_unset() {
        let data = OpenTagData {
            material_name: Some("PLA".to_string()),
            primary_color: Some("not a color".to_string()),
            ..Default::default()
        };
        let decoded = decode(&uid(), &encode(&data, false)).unwrap();
        assert_eq!(decoded.primary_color, None);
    }

    #[test]
    fn test_url_scheme_reconstruction() {
        let data = OpenTagData {
            material_name: Some("PLA".to_string()),
            url: Some("http://example.com/x".to_string()),
            ..Default::default()
        };
        let decoded = decode(&uid(), &encode(&data, true)).unwrap();
        // The wire omits the scheme; decode reconstructs https.
        assert_eq!(decoded.url.as_deref(), Some("https://example.com/x"));
    }

    #[test]
    fn test_malformed_date_leaves_slot_unset() {
        let data = OpenTagData {
            material_name: Some("PLA".to_string()),
            manufacture_date: Some("soonish".to_string()),
            ..Default::default()
        };
        let decoded = decode(&uid(), &encode(&data, true)).unwrap();
        assert_eq!(decoded.manufacture_date, None);
    }

    #[test]
    fn test_to_spool_full() {
        let spool = to_spool(&full_data());
        assert_eq!(spool.material.as_deref(), Some("PETG"));
        assert_eq!(spool.subtype.as_deref(), Some("CF"));
        assert_eq!(spool.brand.as_deref(), Some("Polymaker"));
        assert_eq!(spool.color_name.as_deref(), Some("Black"));
        assert_eq!(spool.rgba.as_deref(), Some("1A1A1AFF"));
        assert_eq!(spool.label_weight, Some(1000));
        assert_eq!(spool.slicer_filament.as_deref(), Some("GFL01"));
        let note = spool.note.unwrap();
        assert!(note.contains("Print: 250C, Bed: 80C"), "{note}");
        assert!(note.contains("Density: 1.27"), "{note}");
        assert!(note.contains("S/N: BATCH-042"), "{note}");
        assert!(!note.contains("Missing"), "{note}");
    }

    #[test]
    fn test_to_spool_reports_missing_fields() {
        let data = OpenTagData {
            tag_id: uid().base64(),
            material_name: Some("WOOD".to_string()),
            ..Default::default()
        };
        let note = to_spool(&data).note.unwrap();
        // WOOD has no slicer preset; color and brand are absent too.
        assert_eq!(note, "Missing: Slicer Filament, Color, Brand");
    }

    proptest! {
        #[test]
        fn prop_core_roundtrip(
            material in "[A-Z]{1,5}",
            weight in 1u16..=60000,
            diameter in 1u16..=5000,
            print_temp in 1u16..=51,
            bed_temp in 1u16..=24,
        ) {
            let data = OpenTagData {
                tag_id: uid().base64(),
                version: DEFAULT_VERSION,
                material_name: Some(material),
                weight_g: Some(weight),
                diameter_um: Some(diameter),
                // Stored as °C / 5, so only multiples of 5 are representable.
                print_temp_c: Some(print_temp * 5),
                bed_temp_c: Some(bed_temp * 5),
                ..Default::default()
            };
            let decoded = decode(&uid(), &encode(&data, false)).unwrap();
            prop_assert_eq!(decoded, data);
        }

        #[test]
        fn prop_decode_never_panics(payload in proptest::collection::vec(any::<u8>(), 0..300)) {
            let _ = decode(&uid(), &payload);
        }
    }
}
