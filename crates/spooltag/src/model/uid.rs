//! Tag UID handling.
//!
//! NFC readers report the chip UID as hex, but the SpoolEase ecosystem
//! historically keys spools by the URL-safe base64 form of the same
//! bytes. Both renderings live here so every codec agrees on them.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::error::UidError;

/// A tag UID: the raw unique identifier bytes of an NFC chip.
///
/// Typically 4 or 7 bytes, but any non-empty length is accepted since
/// carrier families differ. Normalization is idempotent: parsing the
/// output of [`TagUid::hex`] yields an equal value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TagUid {
    bytes: Vec<u8>,
}

impl TagUid {
    /// Parses a UID from a hex string.
    ///
    /// Separators (`:`, `-`, spaces) and mixed case are tolerated, so
    /// `"04:aa:bb:cc:dd:11:22"` and `"04AABBCCDD1122"` parse equal.
    pub fn parse(s: &str) -> Result<Self, UidError> {
        let cleaned: String = s
            .chars()
            .filter(|c| !matches!(c, ':' | '-' | ' '))
            .collect();
        if cleaned.is_empty() {
            return Err(UidError::Empty);
        }
        let bytes = hex::decode(&cleaned).map_err(|_| UidError::InvalidHex {
            uid: s.to_string(),
        })?;
        Ok(Self { bytes })
    }

    /// Creates a UID directly from raw bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Raw UID bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Uppercase hex rendering with no separators (envelope form).
    pub fn hex(&self) -> String {
        hex::encode_upper(&self.bytes)
    }

    /// URL-safe base64 rendering without padding.
    ///
    /// This is the stable identity key used for matching tags against
    /// existing spool inventory.
    pub fn base64(&self) -> String {
        URL_SAFE_NO_PAD.encode(&self.bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_hex() {
        let uid = TagUid::parse("04AABBCCDD1122").unwrap();
        assert_eq!(uid.as_bytes(), &[0x04, 0xAA, 0xBB, 0xCC, 0xDD, 0x11, 0x22]);
    }

    #[test]
    fn test_parse_with_separators_and_case() {
        let plain = TagUid::parse("04AABBCCDD1122").unwrap();
        let colons = TagUid::parse("04:aa:bb:cc:dd:11:22").unwrap();
        let dashes = TagUid::parse("04-AA-BB-CC-DD-11-22").unwrap();
        assert_eq!(plain, colons);
        assert_eq!(plain, dashes);
    }

    #[test]
    fn test_hex_is_uppercase_and_idempotent() {
        let uid = TagUid::parse("04aabbccdd1122").unwrap();
        assert_eq!(uid.hex(), "04AABBCCDD1122");
        // Normalizing an already-normalized UID yields itself.
        let again = TagUid::parse(&uid.hex()).unwrap();
        assert_eq!(again.hex(), uid.hex());
    }

    #[test]
    fn test_base64_has_no_padding() {
        let uid = TagUid::parse("04AABBCCDD1122").unwrap();
        let b64 = uid.base64();
        assert!(!b64.contains('='), "base64 UID must be unpadded: {b64}");
        assert_eq!(b64, "BKq7zN0RIg");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(TagUid::parse(""), Err(UidError::Empty));
        assert!(matches!(
            TagUid::parse("not hex"),
            Err(UidError::InvalidHex { .. })
        ));
        // Odd-length hex is not a valid byte string either.
        assert!(matches!(
            TagUid::parse("ABC"),
            Err(UidError::InvalidHex { .. })
        ));
    }
}
