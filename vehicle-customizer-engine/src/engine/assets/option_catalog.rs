use bevy::prelude::*;
use constants::slots::{VehicleSlot, slot_for_option_type};
use serde::{Deserialize, Serialize};

/// One purchasable customization choice, as served by the catalog endpoint.
/// Immutable once loaded; the catalog owns every record for the session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomizationOption {
    pub id: String,
    /// Fixed option type tag, e.g. "exterior-hood". Maps to exactly one slot.
    #[serde(rename = "type")]
    pub option_type: String,
    #[serde(default)]
    pub title: Option<String>,
    /// Non-negative, currency-agnostic whole units.
    pub price: u32,
    /// Optional "#RRGGBB" override colour. Options without one (audio parts,
    /// asset swaps) never touch material state.
    #[serde(rename = "colorCode", default, skip_serializing_if = "Option::is_none")]
    pub colour_code: Option<String>,
    #[serde(rename = "image", default, skip_serializing_if = "Option::is_none")]
    pub preview_image: Option<String>,
    /// Mesh/material override reference. Carried through but not exercised by
    /// the colour path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset: Option<String>,
}

impl CustomizationOption {
    /// Slot this option belongs to, via the fixed slot/type table.
    pub fn slot(&self) -> Option<VehicleSlot> {
        slot_for_option_type(&self.option_type)
    }

    /// Validated override colour, if the record carries a well-formed code.
    pub fn colour(&self) -> Option<Color> {
        self.colour_code.as_deref().and_then(parse_colour_code)
    }
}

/// Parse a "#RRGGBB" colour code. Malformed codes are rejected, not coerced.
pub fn parse_colour_code(code: &str) -> Option<Color> {
    let hex = code.strip_prefix('#')?;
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::srgb_u8(r, g, b))
}

/// The full option catalog as a loadable JSON asset. The wire format is a
/// bare array of records, mirrored exactly. Promoted to a read-only resource
/// once loading completes.
#[derive(Asset, TypePath, Resource, Debug, Clone, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct OptionCatalog {
    pub options: Vec<CustomizationOption>,
}

impl OptionCatalog {
    pub fn option(&self, id: &str) -> Option<&CustomizationOption> {
        self.options.iter().find(|option| option.id == id)
    }

    pub fn options_for_slot(&self, slot: VehicleSlot) -> impl Iterator<Item = &CustomizationOption> {
        self.options
            .iter()
            .filter(move |option| option.slot() == Some(slot))
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colour_codes_are_strictly_validated() {
        assert!(parse_colour_code("#112233").is_some());
        assert!(parse_colour_code("#AaBbCc").is_some());
        assert!(parse_colour_code("112233").is_none());
        assert!(parse_colour_code("#11223").is_none());
        assert!(parse_colour_code("#1122334").is_none());
        assert!(parse_colour_code("#11223g").is_none());
        assert!(parse_colour_code("").is_none());
    }

    #[test]
    fn parsed_colour_matches_components() {
        let colour = parse_colour_code("#112233").unwrap();
        assert_eq!(colour, Color::srgb_u8(0x11, 0x22, 0x33));
    }

    #[test]
    fn catalog_wire_format_is_a_bare_array() {
        let json = r##"[
            {"id": "opt-hood-red", "type": "exterior-hood", "title": "Crimson Hood",
             "price": 500, "colorCode": "#112233"},
            {"id": "opt-audio-1", "type": "interior-sound-system", "price": 900}
        ]"##;
        let catalog: OptionCatalog = serde_json::from_str(json).unwrap();
        assert_eq!(catalog.len(), 2);

        let hood = catalog.option("opt-hood-red").unwrap();
        assert_eq!(hood.slot(), Some(constants::slots::VehicleSlot::Hood));
        assert!(hood.colour().is_some());

        let audio = catalog.option("opt-audio-1").unwrap();
        assert_eq!(audio.title, None);
        assert!(audio.colour().is_none());
    }
}
