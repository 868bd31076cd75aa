//! Injected enrichment data: the manufacturer color catalog and the
//! material → slicer preset table.
//!
//! The catalog is an external collaborator: the application builds it
//! once at startup (e.g. from `bambu-color-names.csv`) and passes it,
//! read-only, into [`crate::dispatch::to_spool`]. It is never mutated
//! after construction, so concurrent readers need no synchronization.

use rustc_hash::FxHashMap;

use crate::codec::bambu;

/// Material type → slicer filament preset code.
///
/// Shared by the OpenSpool and OpenTag3D projections, which carry a
/// bare material name and no preset of their own.
const MATERIAL_TO_SLICER: &[(&str, &str)] = &[
    ("PLA", "GFL00"),
    ("PETG", "GFL01"),
    ("ABS", "GFL02"),
    ("ASA", "GFL03"),
    ("PC", "GFL04"),
    ("TPU", "GFL05"),
    ("PVA", "GFL06"),
    ("PA", "GFL07"),
    ("PAHT-CF", "GFL08"),
    ("PET-CF", "GFL09"),
    ("PA-CF", "GFL10"),
    ("PLA-CF", "GFL11"),
    ("HIPS", "GFL14"),
];

/// Looks up the generic slicer preset code for a material type
/// (case-insensitive). Unknown materials have no preset.
pub fn material_to_slicer(material: &str) -> Option<&'static str> {
    let upper = material.trim().to_ascii_uppercase();
    MATERIAL_TO_SLICER
        .iter()
        .find(|(m, _)| *m == upper)
        .map(|(_, code)| *code)
}

/// Read-only color-name lookup keyed by (material id, RGBA hex).
///
/// Construct once with [`ColorCatalog::from_entries`] and share for the
/// process lifetime. [`ColorCatalog::default`] is the empty catalog,
/// under which every lookup misses.
#[derive(Debug, Clone, Default)]
pub struct ColorCatalog {
    by_key: FxHashMap<(String, String), String>,
}

impl ColorCatalog {
    /// Builds a catalog from `(material_id, rgba_hex, color_name)`
    /// entries. RGBA keys are normalized to uppercase.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, S, S)>,
        S: Into<String>,
    {
        let by_key = entries
            .into_iter()
            .map(|(material_id, rgba, name)| {
                (
                    (material_id.into(), rgba.into().to_ascii_uppercase()),
                    name.into(),
                )
            })
            .collect();
        Self { by_key }
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Looks up a color name by material id and RGBA hex.
    ///
    /// `material_id` is normally the tag's code ("GFA00"), but readers
    /// that only surface the slicer display name ("Bambu PLA Basic")
    /// are handled by a bounded fallback scan over the catalog.
    pub fn lookup(&self, material_id: &str, rgba_hex: &str) -> Option<&str> {
        if material_id.is_empty() {
            return None;
        }
        let rgba = rgba_hex.to_ascii_uppercase();
        if let Some(name) = self
            .by_key
            .get(&(material_id.to_string(), rgba.clone()))
        {
            return Some(name);
        }
        if material_id.starts_with("Bambu ") {
            for ((mat_id, entry_rgba), name) in &self.by_key {
                if *entry_rgba == rgba && bambu::slicer_name(mat_id) == Some(material_id) {
                    return Some(name);
                }
            }
        }
        None
    }
}
