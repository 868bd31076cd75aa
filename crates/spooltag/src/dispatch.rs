//! Format dispatch: routes raw tag input to the matching codec.
//!
//! One entry point per transport shape (bare URL, NDEF record list,
//! Mifare block map). Each returns a [`TagReadResult`] envelope that is
//! always populated with the UID identity; classification falls back to
//! [`TagType::Unknown`] when no codec claims the input, which is a
//! valid terminal outcome rather than an error.

use log::debug;

use crate::catalog::ColorCatalog;
use crate::codec::{bambu, openspool, opentag, printtag, spoolease};
use crate::model::{
    BlockMap, CarrierType, NdefRecord, RawCapture, SpoolFromTag, TagData, TagReadResult, TagType,
    TagUid,
};

/// NDEF URI abbreviation table (NFC Forum URI RTD, identifier codes
/// 0x00-0x23). Codes outside the table expand to no prefix.
const URI_PREFIXES: &[&str] = &[
    "",
    "http://www.",
    "https://www.",
    "http://",
    "https://",
    "tel:",
    "mailto:",
    "ftp://anonymous:anonymous@",
    "ftp://ftp.",
    "ftps://",
    "sftp://",
    "smb://",
    "nfs://",
    "ftp://",
    "dav://",
    "news:",
    "telnet://",
    "imap:",
    "rtsp://",
    "urn:",
    "pop:",
    "sip:",
    "sips:",
    "tftp:",
    "btspp://",
    "btl2cap://",
    "btgoep://",
    "tcpobex://",
    "irdaobex://",
    "file://",
    "urn:epc:id:",
    "urn:epc:tag:",
    "urn:epc:pat:",
    "urn:epc:raw:",
    "urn:epc:",
    "urn:nfc:",
];

/// Expands an NDEF URI record payload (prefix identifier byte followed
/// by the URI remainder) into the full URL string.
fn expand_uri_payload(payload: &[u8]) -> Option<String> {
    let (&code, rest) = payload.split_first()?;
    let prefix = URI_PREFIXES.get(usize::from(code)).copied().unwrap_or("");
    let rest = String::from_utf8_lossy(rest);
    Some(format!("{prefix}{rest}"))
}

/// Decodes a bare NDEF URL handed over by the transport layer
/// (the common NTAG read path).
pub fn decode_ndef_url(uid: &TagUid, url: &str) -> TagReadResult {
    if spoolease::can_decode(url) {
        if let Some(data) = spoolease::decode(url, uid) {
            return TagReadResult::classified(
                uid,
                CarrierType::Ntag,
                TagData::SpoolEase(data),
                RawCapture::Url(url.to_string()),
            );
        }
    }
    debug!("NDEF URL not claimed by any codec: {url}");
    TagReadResult::unclassified(uid, CarrierType::Ntag, RawCapture::Url(url.to_string()))
}

/// Decodes a list of typed NDEF records.
///
/// Records are tried in order; the first one a codec claims wins.
/// A record whose type matches a codec but whose payload fails to
/// decode does not stop the scan, later records still get a chance.
pub fn decode_ndef_records(uid: &TagUid, records: &[NdefRecord]) -> TagReadResult {
    for record in records {
        let record_type = record.record_type.as_str();
        let payload = record.payload.as_slice();

        if record_type == printtag::RECORD_TYPE {
            if let Some(data) = printtag::decode(uid, payload) {
                return classified_ndef(uid, TagData::OpenPrintTag(data), records);
            }
        }

        if record_type == openspool::RECORD_TYPE && openspool::can_decode(payload) {
            if let Some(data) = openspool::decode(uid, payload) {
                return classified_ndef(uid, TagData::OpenSpool(data), records);
            }
        }

        if record_type == opentag::RECORD_TYPE {
            if let Some(data) = opentag::decode(uid, payload) {
                return classified_ndef(uid, TagData::OpenTag3d(data), records);
            }
        }

        if record_type == "U" || record_type.starts_with("urn:nfc:wkt:U") {
            if let Some(url) = expand_uri_payload(payload) {
                if spoolease::can_decode(&url) {
                    if let Some(data) = spoolease::decode(&url, uid) {
                        return classified_ndef(uid, TagData::SpoolEase(data), records);
                    }
                }
            }
        }
    }
    debug!("no codec claimed any of {} NDEF records", records.len());
    TagReadResult::unclassified(uid, CarrierType::Ntag, RawCapture::Ndef(records.to_vec()))
}

fn classified_ndef(uid: &TagUid, data: TagData, records: &[NdefRecord]) -> TagReadResult {
    TagReadResult::classified(uid, CarrierType::Ntag, data, RawCapture::Ndef(records.to_vec()))
}

/// Decodes a Mifare Classic block map (the Bambu Lab read path).
pub fn decode_mifare_blocks(uid: &TagUid, blocks: &BlockMap) -> TagReadResult {
    if let Some(data) = bambu::decode(uid, blocks) {
        return TagReadResult::classified(
            uid,
            CarrierType::MifareClassic1k,
            TagData::BambuLab(data),
            RawCapture::Blocks(blocks.clone()),
        );
    }
    debug!("Mifare block map not claimed: {} blocks", blocks.len());
    TagReadResult::unclassified(
        uid,
        CarrierType::MifareClassic1k,
        RawCapture::Blocks(blocks.clone()),
    )
}

/// Projects a read result onto the normalized spool record.
///
/// `None` for unclassified reads. The catalog only matters for Bambu
/// Lab tags (color-name enrichment); pass an empty one otherwise.
pub fn to_spool(result: &TagReadResult, catalog: &ColorCatalog) -> Option<SpoolFromTag> {
    match result.data.as_ref()? {
        TagData::SpoolEase(data) => Some(spoolease::to_spool(data)),
        TagData::BambuLab(data) => Some(bambu::to_spool(data, catalog)),
        TagData::OpenPrintTag(data) => Some(printtag::to_spool(data)),
        TagData::OpenSpool(data) => Some(openspool::to_spool(data)),
        TagData::OpenTag3d(data) => Some(opentag::to_spool(data)),
    }
}
