use std::fmt;

use serde::{Deserialize, Serialize};

/// Chart palette presets offered in the style options.
pub const ACCENT_PRESETS: [(&str, Rgb); 5] = [
    ("Sky Blue", Rgb::new(0xA3, 0xC9, 0xF9)),
    ("Mint Green", Rgb::new(0xA7, 0xE9, 0xAF)),
    ("Peach", Rgb::new(0xFF, 0xBC, 0xB3)),
    ("Lavender", Rgb::new(0xD5, 0xB3, 0xFF)),
    ("Soft Gray", Rgb::new(0xD3, 0xD3, 0xD3)),
];

pub const DEFAULT_ACCENT: Rgb = ACCENT_PRESETS[0].1;
pub const DEFAULT_THRESHOLD_COLOR: Rgb = Rgb::new(0xFF, 0x4B, 0x4B);
/// Title and axis text.
pub const TEXT_COLOR: Rgb = Rgb::new(0x33, 0x33, 0x33);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorError {
    InvalidHexDigit,
    InvalidHexLength,
}

impl fmt::Display for ColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorError::InvalidHexDigit => write!(f, "invalid hex digit in colour"),
            ColorError::InvalidHexLength => write!(f, "colour must look like #rrggbb"),
        }
    }
}

impl std::error::Error for ColorError {}

/// An opaque sRGB colour, serialized as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn from_hex(hex: &str) -> Result<Self, ColorError> {
        let h = hex.trim().trim_start_matches('#');
        if h.len() != 6 || !h.is_ascii() {
            return Err(ColorError::InvalidHexLength);
        }
        let byte = |s: &str| u8::from_str_radix(s, 16).map_err(|_| ColorError::InvalidHexDigit);
        Ok(Self::new(byte(&h[..2])?, byte(&h[2..4])?, byte(&h[4..])?))
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    pub fn to_array(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    pub fn from_array([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }

    pub fn color32(&self) -> egui::Color32 {
        egui::Color32::from_rgb(self.r, self.g, self.b)
    }

    pub fn plotters(&self) -> plotters::style::RGBColor {
        plotters::style::RGBColor(self.r, self.g, self.b)
    }
}

impl Default for Rgb {
    fn default() -> Self {
        DEFAULT_ACCENT
    }
}

impl TryFrom<String> for Rgb {
    type Error = ColorError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Rgb::from_hex(&s)
    }
}

impl From<Rgb> for String {
    fn from(c: Rgb) -> Self {
        c.to_hex()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip() {
        let c = Rgb::from_hex("#ff4b4b").unwrap();
        assert_eq!(c, DEFAULT_THRESHOLD_COLOR);
        assert_eq!(c.to_hex(), "#FF4B4B");
    }

    #[test]
    fn bad_hex_is_rejected() {
        assert_eq!(Rgb::from_hex("#12345"), Err(ColorError::InvalidHexLength));
        assert_eq!(Rgb::from_hex("#12345g"), Err(ColorError::InvalidHexDigit));
    }

    #[test]
    fn serializes_as_hex_string() {
        let json = serde_json::to_string(&DEFAULT_ACCENT).unwrap();
        assert_eq!(json, "\"#A3C9F9\"");
        let back: Rgb = serde_json::from_str(&json).unwrap();
        assert_eq!(back, DEFAULT_ACCENT);
    }
}
