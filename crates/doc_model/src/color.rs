//! RGB color values
//!
//! Markup stores colors as six uppercase hex digits (`4472C4`). Theme
//! references are resolved before a value reaches the tree, so a [`Color`]
//! is always a concrete 24-bit RGB triple.

use crate::{DocModelError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A 24-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    /// Create a color from its channels
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a six hex digit string, with or without a leading `#`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Self::rgb(r, g, b))
    }

    /// Six uppercase hex digits, the markup attribute form
    pub fn to_hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// CSS form (`#RRGGBB`)
    pub fn to_css(&self) -> String {
        format!("#{}", self.to_hex())
    }

    /// Darken toward black: each channel is multiplied by `shade / 255`
    pub fn shaded(&self, shade: u8) -> Self {
        let f = |c: u8| ((c as f32) * (shade as f32) / 255.0).round() as u8;
        Self::rgb(f(self.r), f(self.g), f(self.b))
    }

    /// Lighten toward white by `1 - tint / 255`
    pub fn tinted(&self, tint: u8) -> Self {
        let amount = 1.0 - (tint as f32) / 255.0;
        let f = |c: u8| {
            let c = c as f32;
            (c + (255.0 - c) * amount).round().min(255.0) as u8
        };
        Self::rgb(f(self.r), f(self.g), f(self.b))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}

impl FromStr for Color {
    type Err = DocModelError;

    fn from_str(s: &str) -> Result<Self> {
        Color::from_hex(s).ok_or_else(|| DocModelError::InvalidColor(s.to_string()))
    }
}

impl TryFrom<String> for Color {
    type Error = DocModelError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_css()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_from_hex() {
        assert_eq!(Color::from_hex("4472C4"), Some(Color::rgb(0x44, 0x72, 0xC4)));
        assert_eq!(Color::from_hex("#d6e4f0"), Some(Color::rgb(0xD6, 0xE4, 0xF0)));
        assert_eq!(Color::from_hex("auto"), None);
        assert_eq!(Color::from_hex("12345"), None);
    }

    #[test]
    fn test_shade_and_tint_boundaries() {
        let c = Color::rgb(0x44, 0x72, 0xC4);
        assert_eq!(c.shaded(255), c);
        assert_eq!(c.shaded(0), Color::BLACK);
        assert_eq!(c.tinted(255), c);
        assert_eq!(c.tinted(0), Color::WHITE);
    }

    #[test]
    fn test_serde_as_css_string() {
        let json = serde_json::to_string(&Color::rgb(255, 0, 16)).unwrap();
        assert_eq!(json, "\"#FF0010\"");
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Color::rgb(255, 0, 16));
        assert!(serde_json::from_str::<Color>("\"nope\"").is_err());
    }

    proptest! {
        #[test]
        fn hex_round_trip(r in any::<u8>(), g in any::<u8>(), b in any::<u8>()) {
            let color = Color::rgb(r, g, b);
            prop_assert_eq!(Color::from_hex(&color.to_hex()), Some(color));
        }

        #[test]
        fn shade_never_brightens(r in any::<u8>(), g in any::<u8>(), b in any::<u8>(), s in any::<u8>()) {
            let shaded = Color::rgb(r, g, b).shaded(s);
            prop_assert!(shaded.r <= r && shaded.g <= g && shaded.b <= b);
        }
    }
}
