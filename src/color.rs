//! Color types and the qualitative palettes used by the ordinal color scale.
//!
//! Colors round-trip through CSS hex notation (`#rrggbb` / `#rrggbbaa`) so that
//! chart settings can be written by hand in YAML.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// RGBA color with 8-bit components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba {
    /// Red component (0-255).
    pub r: u8,
    /// Green component (0-255).
    pub g: u8,
    /// Blue component (0-255).
    pub b: u8,
    /// Alpha component (0-255, 255 = fully opaque).
    pub a: u8,
}

impl Rgba {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    /// Opaque black.
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    /// Opaque white.
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    /// Neutral grey used for values the quantile classifier cannot place.
    pub const UNCLASSIFIED: Self = Self::rgb(204, 204, 204);

    /// Create a new RGBA color.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque RGB color (alpha = 255).
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Create an opaque color from a packed `0xRRGGBB` value.
    #[must_use]
    pub const fn from_u32(rgb: u32) -> Self {
        Self::rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }

    /// Create a color with modified alpha.
    #[must_use]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` (leading `#` optional).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidColor`] for any other shape or non-hex digits.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.trim().trim_start_matches('#');
        let invalid = || Error::InvalidColor(hex.to_string());
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid());

        match digits.len() {
            3 => {
                let nibble = |i: usize| {
                    u8::from_str_radix(&digits[i..=i], 16).map(|v| v * 17).map_err(|_| invalid())
                };
                Ok(Self::rgb(nibble(0)?, nibble(1)?, nibble(2)?))
            }
            6 => Ok(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Self::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => Err(invalid()),
        }
    }

    /// Lowercase hex notation; alpha is appended only when not opaque.
    #[must_use]
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// CSS color string as written into SVG attributes.
    #[must_use]
    pub fn to_css(&self) -> String {
        if self.a == 255 {
            format!("rgb({},{},{})", self.r, self.g, self.b)
        } else {
            format!("rgba({},{},{},{:.3})", self.r, self.g, self.b, f32::from(self.a) / 255.0)
        }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Rgba {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Rgba {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::from_hex(&value)
    }
}

impl From<Rgba> for String {
    fn from(color: Rgba) -> Self {
        color.to_hex()
    }
}

/// Ten-color qualitative palette (d3 `schemeCategory10`).
pub const CATEGORY10: [Rgba; 10] = [
    Rgba::from_u32(0x1f77b4),
    Rgba::from_u32(0xff7f0e),
    Rgba::from_u32(0x2ca02c),
    Rgba::from_u32(0xd62728),
    Rgba::from_u32(0x9467bd),
    Rgba::from_u32(0x8c564b),
    Rgba::from_u32(0xe377c2),
    Rgba::from_u32(0x7f7f7f),
    Rgba::from_u32(0xbcbd22),
    Rgba::from_u32(0x17becf),
];

/// Twenty-color palette in four shades per hue (d3 `schemeCategory20c`).
pub const CATEGORY20C: [Rgba; 20] = [
    Rgba::from_u32(0x3182bd),
    Rgba::from_u32(0x6baed6),
    Rgba::from_u32(0x9ecae1),
    Rgba::from_u32(0xc6dbef),
    Rgba::from_u32(0xe6550d),
    Rgba::from_u32(0xfd8d3c),
    Rgba::from_u32(0xfdae6b),
    Rgba::from_u32(0xfdd0a2),
    Rgba::from_u32(0x31a354),
    Rgba::from_u32(0x74c476),
    Rgba::from_u32(0xa1d99b),
    Rgba::from_u32(0xc7e9c0),
    Rgba::from_u32(0x756bb1),
    Rgba::from_u32(0x9e9ac8),
    Rgba::from_u32(0xbcbddc),
    Rgba::from_u32(0xdadaeb),
    Rgba::from_u32(0x636363),
    Rgba::from_u32(0x969696),
    Rgba::from_u32(0xbdbdbd),
    Rgba::from_u32(0xd9d9d9),
];
