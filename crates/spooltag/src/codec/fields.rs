//! Shared helpers for fixed-offset tag layouts.
//!
//! The binary formats (Bambu Lab, OpenTag3D) store strings as
//! fixed-width, NUL-terminated-or-padded fields and integers at fixed
//! offsets. Every read here is bounds-checked first; an out-of-range or
//! unparseable field is an absent field, never a panic.

/// Reads a fixed-width string field: trims at the first NUL, validates
/// UTF-8, strips surrounding whitespace (space padding).
///
/// Returns `None` for out-of-bounds reads, invalid UTF-8 and fields
/// that trim to empty. Invalid sequences are rejected rather than
/// lossily replaced so behavior stays deterministic.
pub(crate) fn read_fixed_str(data: &[u8], offset: usize, width: usize) -> Option<String> {
    let end = offset.checked_add(width)?;
    if end > data.len() {
        return None;
    }
    let mut raw = &data[offset..end];
    if let Some(nul) = raw.iter().position(|&b| b == 0) {
        raw = &raw[..nul];
    }
    let s = std::str::from_utf8(raw).ok()?.trim();
    if s.is_empty() { None } else { Some(s.to_string()) }
}

/// Writes a string into a fixed-width field, truncating to the field
/// width on a UTF-8 character boundary. Unused bytes stay zero.
pub(crate) fn write_fixed_str(buf: &mut [u8], offset: usize, width: usize, value: &str) {
    let mut end = value.len().min(width);
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    buf[offset..offset + end].copy_from_slice(&value.as_bytes()[..end]);
}

/// Reads a big-endian u16 at a fixed offset; `None` if out of bounds.
pub(crate) fn read_u16_be(data: &[u8], offset: usize) -> Option<u16> {
    let end = offset.checked_add(2)?;
    if end > data.len() {
        return None;
    }
    Some(u16::from_be_bytes([data[offset], data[offset + 1]]))
}

/// Reads a little-endian u16 at a fixed offset; `None` if out of bounds.
pub(crate) fn read_u16_le(data: &[u8], offset: usize) -> Option<u16> {
    let end = offset.checked_add(2)?;
    if end > data.len() {
        return None;
    }
    Some(u16::from_le_bytes([data[offset], data[offset + 1]]))
}

/// Reads a u8 at a fixed offset; `None` if out of bounds.
pub(crate) fn read_u8(data: &[u8], offset: usize) -> Option<u8> {
    data.get(offset).copied()
}

/// Reads a 4-byte RGBA color slot as uppercase hex.
///
/// All-zero slots mean "unset" on the wire and decode as `None`.
pub(crate) fn read_rgba(data: &[u8], offset: usize) -> Option<String> {
    let end = offset.checked_add(4)?;
    if end > data.len() {
        return None;
    }
    let rgba = &data[offset..end];
    if rgba.iter().all(|&b| b == 0) {
        return None;
    }
    Some(hex::encode_upper(rgba))
}

/// Writes an RGBA hex string into a 4-byte color slot; silently skips
/// values that are not 8 hex digits (the slot stays zero/unset).
pub(crate) fn write_rgba(buf: &mut [u8], offset: usize, rgba: &str) {
    if let Ok(bytes) = hex::decode(rgba) {
        if bytes.len() == 4 {
            buf[offset..offset + 4].copy_from_slice(&bytes);
        }
    }
}
