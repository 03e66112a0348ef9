use std::fmt;
use std::str::FromStr;

use crate::foundation::error::{FrameitError, FrameitResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Number of pixels covered by the canvas.
    pub fn pixel_count(self) -> usize {
        (self.width as usize).saturating_mul(self.height as usize)
    }
}

/// Background color of a frame, parsed from a CSS-style hex string.
///
/// Accepts `#RGB`, `#RRGGBB` and `#RRGGBBAA` (case-insensitive, leading `#` optional). Channels are
/// straight (not premultiplied) alpha.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FrameColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl FrameColor {
    /// `#4A90E2`, the color new frames start with.
    pub const DEFAULT: Self = Self {
        r: 0x4A,
        g: 0x90,
        b: 0xE2,
        a: 0xFF,
    };

    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn parse_hex(s: &str) -> FrameitResult<Self> {
        let s = s.trim();
        let s = s.strip_prefix('#').unwrap_or(s);
        if !s.is_ascii() {
            return Err(FrameitError::validation(format!(
                "invalid hex color \"{s}\""
            )));
        }

        fn hex_byte(pair: &str) -> FrameitResult<u8> {
            u8::from_str_radix(pair, 16)
                .map_err(|_| FrameitError::validation(format!("invalid hex byte \"{pair}\"")))
        }

        let (r, g, b, a) = match s.len() {
            3 => {
                // #RGB expands each nibble to a full byte.
                let r = hex_byte(&s[0..1].repeat(2))?;
                let g = hex_byte(&s[1..2].repeat(2))?;
                let b = hex_byte(&s[2..3].repeat(2))?;
                (r, g, b, 255)
            }
            6 => (
                hex_byte(&s[0..2])?,
                hex_byte(&s[2..4])?,
                hex_byte(&s[4..6])?,
                255,
            ),
            8 => (
                hex_byte(&s[0..2])?,
                hex_byte(&s[2..4])?,
                hex_byte(&s[4..6])?,
                hex_byte(&s[6..8])?,
            ),
            _ => {
                return Err(FrameitError::validation(
                    "hex color must be #RGB, #RRGGBB or #RRGGBBAA (case-insensitive)",
                ));
            }
        };
        Ok(Self { r, g, b, a })
    }

    /// Canonical uppercase hex form; the alpha pair is only emitted when not opaque.
    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }

}

impl Default for FrameColor {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl FromStr for FrameColor {
    type Err = FrameitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_hex(s)
    }
}

impl TryFrom<String> for FrameColor {
    type Error = FrameitError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse_hex(&value)
    }
}

impl From<FrameColor> for String {
    fn from(value: FrameColor) -> Self {
        value.to_hex()
    }
}

impl fmt::Display for FrameColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
