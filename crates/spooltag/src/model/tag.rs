//! Tag and carrier classification enums.

use std::fmt;

/// The tag format a read was classified as.
///
/// Closed enumeration, determined once per decode. `Unknown` is a valid
/// terminal classification, not an error: it means no codec claimed the
/// input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagType {
    SpoolEaseV1,
    SpoolEaseV2,
    BambuLab,
    OpenPrintTag,
    OpenSpool,
    OpenTag3d,
    Unknown,
}

impl TagType {
    /// Stable display string, also used as the `data_origin` marker on
    /// normalized spool records.
    pub fn as_str(&self) -> &'static str {
        match self {
            TagType::SpoolEaseV1 => "SpoolEaseV1",
            TagType::SpoolEaseV2 => "SpoolEaseV2",
            TagType::BambuLab => "Bambu Lab",
            TagType::OpenPrintTag => "OpenPrintTag",
            TagType::OpenSpool => "OpenSpool",
            TagType::OpenTag3d => "OpenTag3D",
            TagType::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for TagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The physical NFC chip family the bytes came from.
///
/// Independent of [`TagType`]: it affects block numbering and capacity,
/// not the logical format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CarrierType {
    /// NTAG213/215/216 (NDEF carrier).
    Ntag,
    MifareClassic1k,
    MifareClassic4k,
    Unknown,
}

impl CarrierType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CarrierType::Ntag => "NTAG",
            CarrierType::MifareClassic1k => "MifareClassic1K",
            CarrierType::MifareClassic4k => "MifareClassic4K",
            CarrierType::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for CarrierType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
