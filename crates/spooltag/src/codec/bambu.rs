//! Bambu Lab RFID codec.
//!
//! Bambu spools carry Mifare Classic tags; the interesting fields live
//! in four 16-byte blocks of the first sectors. This application only
//! reads them — writing would need sector key material that stays in
//! the NFC transport layer.
//!
//! Block layout:
//! - block 1: 8-byte material variant id + 8-byte material id (ASCII)
//! - block 2: 16-byte filament type ("PLA")
//! - block 4: 16-byte detailed filament type ("PLA Basic")
//! - block 5: 4-byte RGBA color, then u16 LE spool weight in grams

use crate::catalog::ColorCatalog;
use crate::codec::fields::{read_fixed_str, read_rgba, read_u16_le};
use crate::model::{BambuLabData, BlockMap, SpoolFromTag, TagType, TagUid};

const BLOCK_IDS: u8 = 1;
const BLOCK_FILAMENT_TYPE: u8 = 2;
const BLOCK_DETAILED_TYPE: u8 = 4;
const BLOCK_COLOR_WEIGHT: u8 = 5;

/// Material id → slicer display name, for the ids seen in the wild.
///
/// Ids missing here still decode; they just surface the raw code.
const BAMBU_MATERIALS: &[(&str, &str)] = &[
    ("GFA00", "Bambu PLA Basic"),
    ("GFA01", "Bambu PLA Matte"),
    ("GFA02", "Bambu PLA Metal"),
    ("GFA05", "Bambu PLA Silk"),
    ("GFA07", "Bambu PLA Marble"),
    ("GFA08", "Bambu PLA Sparkle"),
    ("GFA09", "Bambu PLA Tough"),
    ("GFA12", "Bambu PLA Glow"),
    ("GFB00", "Bambu ABS"),
    ("GFB01", "Bambu ASA"),
    ("GFC00", "Bambu PC"),
    ("GFG00", "Bambu PETG Basic"),
    ("GFG01", "Bambu PETG Translucent"),
    ("GFN03", "Bambu PA-CF"),
    ("GFN04", "Bambu PAHT-CF"),
    ("GFS00", "Bambu Support W"),
    ("GFS01", "Bambu Support G"),
    ("GFT01", "Bambu PET-CF"),
    ("GFU01", "Bambu TPU 95A"),
];

/// Returns the slicer display name for a Bambu material id.
pub fn slicer_name(material_id: &str) -> Option<&'static str> {
    BAMBU_MATERIALS
        .iter()
        .find(|(id, _)| *id == material_id)
        .map(|(_, name)| *name)
}

fn block<'a>(blocks: &'a BlockMap, index: u8) -> &'a [u8] {
    blocks.get(&index).map(Vec::as_slice).unwrap_or(&[])
}

/// Structural probe: true iff the block map carries a non-empty
/// material id where Bambu tags put one.
pub fn can_decode(blocks: &BlockMap) -> bool {
    read_fixed_str(block(blocks, BLOCK_IDS), 8, 8).is_some()
}

/// Decodes Bambu Lab data from a Mifare block map.
///
/// Missing blocks read as empty; any field other than the material id
/// may be absent. Returns `None` when the material id (the identity
/// field) is missing, which means the blocks are not a Bambu tag.
pub fn decode(uid: &TagUid, blocks: &BlockMap) -> Option<BambuLabData> {
    let ids = block(blocks, BLOCK_IDS);
    let material_id = read_fixed_str(ids, 8, 8)?;

    let color_weight = block(blocks, BLOCK_COLOR_WEIGHT);
    Some(BambuLabData {
        tag_id: uid.hex(),
        material_variant_id: read_fixed_str(ids, 0, 8),
        material_id: Some(material_id),
        filament_type: read_fixed_str(block(blocks, BLOCK_FILAMENT_TYPE), 0, 16),
        detailed_filament_type: read_fixed_str(block(blocks, BLOCK_DETAILED_TYPE), 0, 16),
        color_rgba: read_rgba(color_weight, 0),
        spool_weight: read_u16_le(color_weight, 4).filter(|&w| w != 0),
    })
}

/// Projects Bambu Lab data onto the normalized spool record.
///
/// The color name comes from the injected catalog, keyed by material id
/// and RGBA; an empty catalog simply leaves it absent.
pub fn to_spool(data: &BambuLabData, catalog: &ColorCatalog) -> SpoolFromTag {
    let mut spool = SpoolFromTag::for_tag(data.tag_id.clone(), TagType::BambuLab);
    let material_id = data.material_id.as_deref().unwrap_or("");

    spool.material = data.filament_type.clone();
    spool.subtype = data.detailed_filament_type.clone();
    spool.rgba = data.color_rgba.clone();
    spool.color_name = data
        .color_rgba
        .as_deref()
        .and_then(|rgba| catalog.lookup(material_id, rgba))
        .map(String::from);
    spool.brand = Some("Bambu".to_string());
    spool.core_weight = data.spool_weight.map(u32::from);
    // The material id doubles as the slicer preset code for Bambu tags.
    spool.slicer_filament = data.material_id.clone();
    spool
}
