//! Emoji codes and the glyph ↔ code point conversion
//!
//! The catalog stores integer code points while the detector reports short
//! text glyphs. Both forms must compare equal after decoding.

use serde::{Deserialize, Serialize};

use crate::error::GlyphError;
use crate::{EMOJI_CATALOG, EMOJI_NAMES};

const HIGH_SURROGATE_START: u16 = 0xD800;
const HIGH_SURROGATE_END: u16 = 0xDBFF;
const LOW_SURROGATE_START: u16 = 0xDC00;
const LOW_SURROGATE_END: u16 = 0xDFFF;

/// Emoji presentation selector, appended by some detectors (e.g. "☺️")
const VARIATION_SELECTOR_16: u16 = 0xFE0F;

/// Integer code point identifying one emoji
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmojiCode(pub u32);

impl EmojiCode {
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Decode 1 or 2 UTF-16 units with the surrogate-pair rule
    pub fn from_utf16(units: &[u16]) -> Result<Self, GlyphError> {
        match *units {
            [] => Err(GlyphError::Empty),
            [unit] if is_surrogate(unit) => Err(GlyphError::UnpairedSurrogate(unit)),
            [unit] => Ok(Self(u32::from(unit))),
            [high, low] if is_high_surrogate(high) && is_low_surrogate(low) => {
                let code = (u32::from(high - HIGH_SURROGATE_START)) * 0x400
                    + u32::from(low - LOW_SURROGATE_START)
                    + 0x10000;
                Ok(Self(code))
            }
            [high, _] if is_surrogate(high) => Err(GlyphError::UnpairedSurrogate(high)),
            [_, low] if is_surrogate(low) => Err(GlyphError::UnpairedSurrogate(low)),
            _ => Err(GlyphError::TooLong(units.len())),
        }
    }

    /// Decode a detector glyph such as "😃"
    pub fn from_glyph(glyph: &str) -> Result<Self, GlyphError> {
        let mut units: Vec<u16> = glyph.encode_utf16().collect();
        if units.len() > 1 && units.last() == Some(&VARIATION_SELECTOR_16) {
            units.pop();
        }
        Self::from_utf16(&units)
    }

    /// Render back to a text glyph; `None` if not a Unicode scalar value
    pub fn glyph(&self) -> Option<String> {
        char::from_u32(self.0).map(String::from)
    }

    /// Look up a catalog entry by its short name ("smiley", "wink", ...)
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        EMOJI_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|i| Self(EMOJI_CATALOG[i]))
    }

    /// Catalog name, if this code is in the catalog
    pub fn name(&self) -> Option<&'static str> {
        EMOJI_CATALOG
            .iter()
            .position(|c| *c == self.0)
            .map(|i| EMOJI_NAMES[i])
    }

    pub fn in_catalog(&self) -> bool {
        EMOJI_CATALOG.contains(&self.0)
    }

    /// The full catalog as codes
    pub fn catalog() -> impl Iterator<Item = EmojiCode> {
        EMOJI_CATALOG.iter().copied().map(EmojiCode)
    }
}

impl std::fmt::Display for EmojiCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.glyph() {
            Some(glyph) => write!(f, "{}", glyph),
            None => write!(f, "&#{};", self.0),
        }
    }
}

fn is_high_surrogate(unit: u16) -> bool {
    (HIGH_SURROGATE_START..=HIGH_SURROGATE_END).contains(&unit)
}

fn is_low_surrogate(unit: u16) -> bool {
    (LOW_SURROGATE_START..=LOW_SURROGATE_END).contains(&unit)
}

fn is_surrogate(unit: u16) -> bool {
    is_high_surrogate(unit) || is_low_surrogate(unit)
}
