//! SpoolEase URL codec.
//!
//! SpoolEase tags are NTAGs carrying a single NDEF URL record pointing
//! at `https://info.filament3d.org/`, with the spool fields packed into
//! short query keys. Two wire versions exist: V1 carries only a spool
//! id, V2 carries the full field set.
//!
//! Query keys (V2):
//!
//! | key | field | | key | field |
//! |-----|-------|-|-----|-------|
//! | TG | tag id (base64)  | | WL | label weight (g) |
//! | ID | spool id         | | WE | core (empty) weight (g) |
//! | M  | material         | | WF | full weight (g) |
//! | MS | material subtype | | SC | slicer preset code |
//! | CC | RGBA hex         | | SN | slicer preset name |
//! | CN | color name       | | NT | note |
//! | B  | brand            | | ET/AT | encode/added unix time |

use log::debug;

use crate::catalog;
use crate::model::{SpoolEaseData, SpoolFromTag, TagType, TagUid};

/// URL prefix every SpoolEase tag starts with.
pub const BASE_URL: &str = "https://info.filament3d.org/";

/// Default tag version written by [`encode`].
pub const WIRE_VERSION: u8 = 2;

/// Returns the wire version a SpoolEase URL declares, if any.
fn version_segment(url: &str) -> Option<u8> {
    let rest = url.strip_prefix(BASE_URL)?;
    if rest.starts_with("V2") {
        Some(2)
    } else if rest.starts_with("V1") {
        Some(1)
    } else {
        None
    }
}

/// Structural probe: true iff the URL carries the SpoolEase host and a
/// known version path segment. Never panics on arbitrary input.
pub fn can_decode(url: &str) -> bool {
    version_segment(url).is_some()
}

/// Decodes a SpoolEase URL into its field set.
///
/// Unknown keys are ignored and malformed numeric values leave their
/// field unset; no query content causes a hard failure. Returns `None`
/// when the URL is not SpoolEase-shaped or the version's identity field
/// (V2: material, V1: spool id) is missing.
pub fn decode(url: &str, uid: &TagUid) -> Option<SpoolEaseData> {
    let version = version_segment(url)?;
    let query = url.split_once('?').map(|(_, q)| q).unwrap_or("");

    let mut data = SpoolEaseData {
        version,
        tag_id: uid.base64(),
        ..Default::default()
    };

    for pair in query.split('&') {
        if pair.is_empty() {
            continue;
        }
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let value = percent_decode(value);
        if value.is_empty() {
            continue;
        }
        match key {
            // TG duplicates the UID on the wire; the reader-supplied
            // UID stays authoritative.
            "TG" => {}
            "ID" => data.spool_id = Some(value),
            "M" => data.material = Some(value),
            "MS" => data.material_subtype = Some(value),
            "CC" => data.color_code = Some(value.to_ascii_uppercase()),
            "CN" => data.color_name = Some(value),
            "B" => data.brand = Some(value),
            "WL" => data.weight_label = value.parse().ok(),
            "WE" => data.weight_core = value.parse().ok(),
            "WF" => data.weight_new = value.parse().ok(),
            "SC" => data.slicer_filament_code = Some(value),
            "SN" => data.slicer_filament_name = Some(value),
            "NT" => data.note = Some(value),
            "ET" => data.encode_time = value.parse().ok(),
            "AT" => data.added_time = value.parse().ok(),
            _ => {}
        }
    }

    let identity_ok = match version {
        1 => data.spool_id.is_some(),
        _ => data.material.is_some(),
    };
    if !identity_ok {
        debug!("SpoolEase V{version} URL missing its identity field");
        return None;
    }
    Some(data)
}

/// Encodes a field set as a V2 URL with deterministic key order.
///
/// Free-text values are percent-encoded; absent fields are omitted.
/// Every field [`decode`] can produce round-trips through this encoder.
pub fn encode(data: &SpoolEaseData) -> String {
    let mut url = format!("{BASE_URL}V2/?");
    let mut first = true;

    let mut push = |url: &mut String, key: &str, value: &str| {
        if !first {
            url.push('&');
        }
        first = false;
        url.push_str(key);
        url.push('=');
        url.push_str(&percent_encode(value));
    };

    push(&mut url, "TG", &data.tag_id);
    if let Some(v) = &data.spool_id {
        push(&mut url, "ID", v);
    }
    if let Some(v) = &data.material {
        push(&mut url, "M", v);
    }
    if let Some(v) = &data.material_subtype {
        push(&mut url, "MS", v);
    }
    if let Some(v) = &data.color_code {
        push(&mut url, "CC", v);
    }
    if let Some(v) = &data.color_name {
        push(&mut url, "CN", v);
    }
    if let Some(v) = &data.brand {
        push(&mut url, "B", v);
    }
    if let Some(v) = data.weight_label {
        push(&mut url, "WL", &v.to_string());
    }
    if let Some(v) = data.weight_core {
        push(&mut url, "WE", &v.to_string());
    }
    if let Some(v) = data.weight_new {
        push(&mut url, "WF", &v.to_string());
    }
    if let Some(v) = &data.slicer_filament_code {
        push(&mut url, "SC", v);
    }
    if let Some(v) = &data.slicer_filament_name {
        push(&mut url, "SN", v);
    }
    if let Some(v) = &data.note {
        push(&mut url, "NT", v);
    }
    if let Some(v) = data.encode_time {
        push(&mut url, "ET", &v.to_string());
    }
    if let Some(v) = data.added_time {
        push(&mut url, "AT", &v.to_string());
    }

    url
}

/// Projects SpoolEase data onto the normalized spool record.
///
/// SpoolEase is this application's own format, so the mapping is
/// field-for-field; the note passes through unchanged.
pub fn to_spool(data: &SpoolEaseData) -> SpoolFromTag {
    let origin = if data.version == 1 {
        TagType::SpoolEaseV1
    } else {
        TagType::SpoolEaseV2
    };
    let mut spool = SpoolFromTag::for_tag(data.tag_id.clone(), origin);
    spool.material = data.material.clone();
    spool.subtype = data.material_subtype.clone();
    spool.color_name = data.color_name.clone();
    spool.rgba = data.color_code.clone();
    spool.brand = data.brand.clone();
    spool.label_weight = data.weight_label;
    spool.core_weight = data.weight_core;
    spool.weight_new = data.weight_new;
    spool.slicer_filament = data
        .slicer_filament_code
        .clone()
        .or_else(|| data.material.as_deref().and_then(catalog::material_to_slicer).map(String::from));
    spool.note = data.note.clone();
    spool
}

/// Percent-decodes a query value; `+` decodes as space. Stray or
/// truncated escapes pass through literally rather than failing.
fn percent_decode(value: &str) -> String {
    let raw = value.as_bytes();
    let mut out = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        match raw[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' => {
                if let (Some(hi), Some(lo)) = (
                    raw.get(i + 1).and_then(|b| (*b as char).to_digit(16)),
                    raw.get(i + 2).and_then(|b| (*b as char).to_digit(16)),
                ) {
                    out.push(((hi as u8) << 4) | lo as u8);
                    i += 3;
                } else {
                    out.push(b'%');
                    i += 1;
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Percent-encodes a query value: unreserved characters pass through,
/// everything else (including space) becomes `%XX`.
fn percent_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for b in value.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char);
            }
            _ => {
                out.push('%');
                out.push_str(&format!("{b:02X}"));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uid() -> TagUid {
        TagUid::parse("04AABBCCDD1122").unwrap()
    }

    #[test]
    fn test_can_decode_versions() {
        assert!(can_decode("https://info.filament3d.org/V2/?TG=abc&M=PLA"));
        assert!(can_decode("https://info.filament3d.org/V1?ID=123"));
        assert!(!can_decode("https://example.com/test"));
        assert!(!can_decode("https://info.filament3d.org/V9/?M=PLA"));
        assert!(!can_decode(""));
        assert!(!can_decode("not a url at all"));
    }

    #[test]
    fn test_decode_v2_full() {
        let url = "https://info.filament3d.org/V2/?\
                   TG=BKq7zN0RIg&ID=spool123&M=PLA&MS=Silk&CC=FF0000FF&CN=Red\
                   &B=Polymaker&WL=1000&WE=200&WF=1200&SC=GFL99&SN=Generic%20PLA";
        let data = decode(url, &uid()).unwrap();
        assert_eq!(data.version, 2);
        assert_eq!(data.material.as_deref(), Some("PLA"));
        assert_eq!(data.material_subtype.as_deref(), Some("Silk"));
        assert_eq!(data.color_code.as_deref(), Some("FF0000FF"));
        assert_eq!(data.color_name.as_deref(), Some("Red"));
        assert_eq!(data.brand.as_deref(), Some("Polymaker"));
        assert_eq!(data.weight_label, Some(1000));
        assert_eq!(data.weight_core, Some(200));
        assert_eq!(data.weight_new, Some(1200));
        assert_eq!(data.slicer_filament_code.as_deref(), Some("GFL99"));
        assert_eq!(data.slicer_filament_name.as_deref(), Some("Generic PLA"));
        assert_eq!(data.spool_id.as_deref(), Some("spool123"));
        assert_eq!(data.tag_id, "BKq7zN0RIg");
    }

    #[test]
    fn test_decode_v2_minimal() {
        let data = decode("https://info.filament3d.org/V2/?M=PETG", &uid()).unwrap();
        assert_eq!(data.material.as_deref(), Some("PETG"));
        assert_eq!(data.brand, None);
        assert_eq!(data.weight_label, None);
    }

    #[test]
    fn test_decode_v1_id_only() {
        let data = decode("https://info.filament3d.org/V1?ID=123", &uid()).unwrap();
        assert_eq!(data.version, 1);
        assert_eq!(data.spool_id.as_deref(), Some("123"));
        assert_eq!(data.material, None);
    }

    #[test]
    fn test_decode_missing_identity_field() {
        // V2 without material and V1 without id both fail classification.
        assert_eq!(decode("https://info.filament3d.org/V2/?B=Test", &uid()), None);
        assert_eq!(decode("https://info.filament3d.org/V1?M=PLA", &uid()), None);
    }

    #[test]
    fn test_decode_tolerates_junk_values() {
        let url = "https://info.filament3d.org/V2/?M=PLA&WL=heavy&XX=1&ET=&=&CC=ff00aaff";
        let data = decode(url, &uid()).unwrap();
        assert_eq!(data.material.as_deref(), Some("PLA"));
        assert_eq!(data.weight_label, None);
        assert_eq!(data.encode_time, None);
        // Color codes normalize to uppercase.
        assert_eq!(data.color_code.as_deref(), Some("FF00AAFF"));
    }

    #[test]
    fn test_encode_deterministic_order() {
        let data = SpoolEaseData {
            version: 2,
            tag_id: "BKq7zN0RIg".to_string(),
            material: Some("PLA".to_string()),
            brand: Some("Polymaker".to_string()),
            weight_label: Some(1000),
            slicer_filament_name: Some("Generic PLA".to_string()),
            ..Default::default()
        };
        assert_eq!(
            encode(&data),
            "https://info.filament3d.org/V2/?TG=BKq7zN0RIg&M=PLA&B=Polymaker&WL=1000&SN=Generic%20PLA"
        );
    }

    #[test]
    fn test_roundtrip_full() {
        let data = SpoolEaseData {
            version: 2,
            tag_id: uid().base64(),
            spool_id: Some("spool123".to_string()),
            material: Some("PLA".to_string()),
            material_subtype: Some("Silk".to_string()),
            color_code: Some("FF0000FF".to_string()),
            color_name: Some("Fire Red".to_string()),
            brand: Some("Polymaker".to_string()),
            weight_label: Some(1000),
            weight_core: Some(200),
            weight_new: Some(1200),
            slicer_filament_code: Some("GFL99".to_string()),
            slicer_filament_name: Some("Generic PLA".to_string()),
            note: Some("shelf 3; dry box".to_string()),
            encode_time: Some(1_700_000_000),
            added_time: Some(1_700_000_100),
        };
        let decoded = decode(&encode(&data), &uid()).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn test_to_spool() {
        let url = "https://info.filament3d.org/V2/?M=ABS&CC=0000FFFF&B=eSUN&WL=1000";
        let data = decode(url, &uid()).unwrap();
        let spool = to_spool(&data);
        assert_eq!(spool.material.as_deref(), Some("ABS"));
        assert_eq!(spool.rgba.as_deref(), Some("0000FFFF"));
        assert_eq!(spool.brand.as_deref(), Some("eSUN"));
        assert_eq!(spool.label_weight, Some(1000));
        assert_eq!(spool.tag_type, "SpoolEaseV2");
        // No explicit preset on the tag: fall back to the material table.
        assert_eq!(spool.slicer_filament.as_deref(), Some("GFL02"));
    }

    #[test]
    fn test_percent_roundtrip() {
        for s in ["", "plain", "with space", "ünïcode", "100% PLA & more"] {
            assert_eq!(percent_decode(&percent_encode(s)), s);
        }
        // '+' decodes as space on input even though we emit %20.
        assert_eq!(percent_decode("Generic+PLA"), "Generic PLA");
        // Truncated escapes pass through.
        assert_eq!(percent_decode("50%"), "50%");
        assert_eq!(percent_decode("%ZZ"), "%ZZ");
    }
}
