//! Colors: parsing, serialization and the word palette.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::AppError;

/// 8-bit RGBA color. Serializes as `#rrggbb` (or `#rrggbbaa` when not opaque).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::opaque(255, 255, 255);
    pub const BLACK: Rgb = Rgb::opaque(0, 0, 0);

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// `h` in degrees, `s` and `l` in 0..=1.
    pub fn from_hsl(h: f32, s: f32, l: f32) -> Self {
        let h = h.rem_euclid(360.0);
        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
        let m = l - c / 2.0;
        let (r, g, b) = match h as u32 / 60 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let channel = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        Self::opaque(channel(r), channel(g), channel(b))
    }

    pub fn to_skia(self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }

    /// Relative luminance approximation, 0..=255.
    pub fn luma(self) -> u32 {
        (299 * self.r as u32 + 587 * self.g as u32 + 114 * self.b as u32) / 1000
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Rgb::WHITE
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.a != 255 {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

impl FromStr for Rgb {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let named = match raw.to_ascii_lowercase().as_str() {
            "white" => Some(Rgb::WHITE),
            "black" => Some(Rgb::BLACK),
            "gray" | "grey" => Some(Rgb::opaque(128, 128, 128)),
            "transparent" => Some(Rgb { r: 0, g: 0, b: 0, a: 0 }),
            _ => None,
        };
        if let Some(color) = named {
            return Ok(color);
        }

        let invalid = || AppError::Validation(format!("invalid color '{raw}'"));
        let hex = raw.strip_prefix('#').ok_or_else(invalid)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        let nibble = |i: usize| {
            u8::from_str_radix(&hex[i..i + 1], 16)
                .map(|v| v * 17)
                .map_err(|_| invalid())
        };
        match hex.len() {
            3 => Ok(Rgb::opaque(nibble(0)?, nibble(1)?, nibble(2)?)),
            6 => Ok(Rgb::opaque(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Rgb {
                r: byte(0)?,
                g: byte(2)?,
                b: byte(4)?,
                a: byte(6)?,
            }),
            _ => Err(invalid()),
        }
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Palette
// ────────────────────────────────────────────────────────────────────────────

const GOLDEN_ANGLE: f32 = 137.507_77;

/// Color of the `index`-th placed word: golden-angle hue steps at fixed saturation.
/// Lightness flips on dark backgrounds so words stay readable.
pub fn word_color(index: usize, background: Rgb) -> Rgb {
    let hue = (index as f32 * GOLDEN_ANGLE) % 360.0;
    let lightness = if background.a > 0 && background.luma() < 128 {
        0.65
    } else {
        0.45
    };
    Rgb::from_hsl(hue, 0.8, lightness)
}
