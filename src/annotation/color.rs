//! RGBA color type, hex conversion, and the annotation palette.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Represents an RGBA color with floating-point components.
///
/// All components are in the range 0.0 (minimum) to 1.0 (maximum). Colors
/// travel over the wire as `#rrggbb` hex strings, which is also how the
/// backend stores them.
///
/// # Examples
///
/// ```
/// use boxmark::annotation::Color;
/// let green = Color::from_hex("#22c55e").unwrap();
/// assert_eq!(green.to_hex(), "#22c55e");
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red component (0.0 = no red, 1.0 = full red)
    pub r: f64,
    /// Green component (0.0 = no green, 1.0 = full green)
    pub g: f64,
    /// Blue component (0.0 = no blue, 1.0 = full blue)
    pub b: f64,
    /// Alpha/transparency (0.0 = fully transparent, 1.0 = fully opaque)
    pub a: f64,
}

impl Color {
    /// Creates a new color from RGBA components.
    pub fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Creates an opaque color from 0-255 channel values.
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: f64::from(r) / 255.0,
            g: f64::from(g) / 255.0,
            b: f64::from(b) / 255.0,
            a: 1.0,
        }
    }

    /// Parses `#rrggbb` (leading `#` optional, case-insensitive).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
        Some(Self::from_rgb8(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Formats the color as a lowercase `#rrggbb` string (alpha is dropped).
    pub fn to_hex(&self) -> String {
        let to_u8 = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "#{:02x}{:02x}{:02x}",
            to_u8(self.r),
            to_u8(self.g),
            to_u8(self.b)
        )
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Color::from_hex(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid hex color '{raw}'")))
    }
}

// ============================================================================
// Predefined Color Constants
// ============================================================================
// Channels are exact multiples of 1/255 so each constant survives a trip
// through the `#rrggbb` wire format unchanged.

/// Predefined red color (R=1.0, G=0.0, B=0.0)
pub const RED: Color = Color {
    r: 1.0,
    g: 0.0,
    b: 0.0,
    a: 1.0,
};

/// Predefined green color (R=0.0, G=1.0, B=0.0)
pub const GREEN: Color = Color {
    r: 0.0,
    g: 1.0,
    b: 0.0,
    a: 1.0,
};

/// Predefined blue color (R=0.0, G=0.0, B=1.0)
pub const BLUE: Color = Color {
    r: 0.0,
    g: 0.0,
    b: 1.0,
    a: 1.0,
};

/// Predefined yellow color (R=1.0, G=1.0, B=0.0)
pub const YELLOW: Color = Color {
    r: 1.0,
    g: 1.0,
    b: 0.0,
    a: 1.0,
};

/// Predefined orange color (#ff8000)
pub const ORANGE: Color = Color {
    r: 1.0,
    g: 128.0 / 255.0,
    b: 0.0,
    a: 1.0,
};

/// Predefined pink/magenta color (R=1.0, G=0.0, B=1.0)
pub const PINK: Color = Color {
    r: 1.0,
    g: 0.0,
    b: 1.0,
    a: 1.0,
};

/// Predefined white color (R=1.0, G=1.0, B=1.0)
pub const WHITE: Color = Color {
    r: 1.0,
    g: 1.0,
    b: 1.0,
    a: 1.0,
};

/// Predefined black color (R=0.0, G=0.0, B=0.0)
pub const BLACK: Color = Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 1.0,
};

/// Hex values of the default box palette, in assignment order.
pub const DEFAULT_PALETTE_HEX: [&str; 8] = [
    "#22c55e", "#f59e0b", "#a855f7", "#ef4444", "#ec4899", "#14b8a6", "#f97316", "#8b5cf6",
];

/// Rotating color source for newly committed boxes.
///
/// Each call to [`Palette::next_color`] hands out the next entry, wrapping
/// around, so adjacent boxes get visually distinct outlines.
#[derive(Debug, Clone)]
pub struct Palette {
    colors: Vec<Color>,
    cursor: usize,
}

impl Palette {
    /// Builds a palette from the given colors, falling back to the default
    /// palette when the list is empty.
    pub fn new(colors: Vec<Color>) -> Self {
        if colors.is_empty() {
            return Self::default();
        }
        Self { colors, cursor: 0 }
    }

    /// Returns the next color and advances the rotation.
    pub fn next_color(&mut self) -> Color {
        let color = self.colors[self.cursor % self.colors.len()];
        self.cursor = (self.cursor + 1) % self.colors.len();
        color
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }
}

impl Default for Palette {
    fn default() -> Self {
        let colors = DEFAULT_PALETTE_HEX
            .iter()
            .filter_map(|hex| Color::from_hex(hex))
            .collect();
        Self { colors, cursor: 0 }
    }
}
