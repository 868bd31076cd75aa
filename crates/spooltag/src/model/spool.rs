//! The normalized spool record every format projects into.

use crate::model::tag::TagType;

/// Spool data extracted from any tag type, normalized for the rest of
/// the application (inventory, display, staging).
///
/// Missing source fields stay `None` — projections never fabricate
/// values. The one exception is `note`, which a projection may
/// synthesize (temperature ranges, "Missing: Color, Brand" markers) to
/// surface degraded tag data to the user.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpoolFromTag {
    /// Base64 tag identity key.
    pub tag_id: String,
    /// Display string of the originating [`TagType`].
    pub tag_type: String,
    pub material: Option<String>,
    pub subtype: Option<String>,
    pub color_name: Option<String>,
    /// RGBA hex, e.g. "FF0000FF".
    pub rgba: Option<String>,
    pub brand: Option<String>,
    /// Advertised weight in grams.
    pub label_weight: Option<u32>,
    /// Empty spool weight in grams.
    pub core_weight: Option<u32>,
    /// Actual weight when full, in grams.
    pub weight_new: Option<u32>,
    /// Slicer preset code, e.g. "GFL00".
    pub slicer_filament: Option<String>,
    pub note: Option<String>,
    pub data_origin: Option<String>,
}

impl SpoolFromTag {
    /// Starts a record with identity and origin filled in.
    pub(crate) fn for_tag(tag_id: impl Into<String>, origin: TagType) -> Self {
        Self {
            tag_id: tag_id.into(),
            tag_type: origin.as_str().to_string(),
            data_origin: Some(origin.as_str().to_string()),
            ..Default::default()
        }
    }
}

/// Accumulates note fragments and the missing-field list the way the
/// projections report degraded tags ("Temp: 200-220C; Missing: Brand").
#[derive(Debug, Default)]
pub(crate) struct NoteBuilder {
    parts: Vec<String>,
    missing: Vec<&'static str>,
}

impl NoteBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, part: impl Into<String>) {
        self.parts.push(part.into());
    }

    /// Marks a field the source format could not provide.
    pub fn missing(&mut self, field: &'static str) {
        self.missing.push(field);
    }

    pub fn finish(mut self) -> Option<String> {
        if !self.missing.is_empty() {
            self.parts.push(format!("Missing: {}", self.missing.join(", ")));
        }
        if self.parts.is_empty() {
            None
        } else {
            Some(self.parts.join("; "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_builder_empty_is_none() {
        assert_eq!(NoteBuilder::new().finish(), None);
    }

    #[test]
    fn test_note_builder_joins_parts_and_missing() {
        let mut note = NoteBuilder::new();
        note.push("Temp: 200-220C");
        note.missing("Color");
        note.missing("Brand");
        assert_eq!(
            note.finish().as_deref(),
            Some("Temp: 200-220C; Missing: Color, Brand")
        );
    }
}
