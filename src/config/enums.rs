//! Configuration enum types.

use crate::annotation::Color;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Color specification - a named color, a hex string, or RGB values.
///
/// # Examples
/// ```toml
/// [palette]
/// colors = ["green", "#f59e0b", [168, 85, 247]]
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
#[serde(untagged)]
pub enum ColorSpec {
    /// Named color (red, green, blue, yellow, orange, pink, white, black) or `#rrggbb`
    Name(String),
    /// RGB color as [red, green, blue] where each component is 0-255
    Rgb([u8; 3]),
}

impl ColorSpec {
    /// Converts the color specification to a [`Color`].
    ///
    /// Returns `None` for unknown names and malformed hex strings.
    pub fn to_color(&self) -> Option<Color> {
        match self {
            ColorSpec::Name(name) if name.trim_start().starts_with('#') => Color::from_hex(name),
            ColorSpec::Name(name) => crate::util::name_to_color(name),
            ColorSpec::Rgb([r, g, b]) => Some(Color::from_rgb8(*r, *g, *b)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::color::{BLUE, RED};

    #[test]
    fn color_spec_variants_resolve() {
        assert_eq!(ColorSpec::Name("red".into()).to_color(), Some(RED));
        assert_eq!(ColorSpec::Name("#0000ff".into()).to_color(), Some(BLUE));
        assert_eq!(ColorSpec::Rgb([255, 0, 0]).to_color(), Some(RED));
        assert_eq!(ColorSpec::Name("mauve".into()).to_color(), None);
        assert_eq!(ColorSpec::Name("#12".into()).to_color(), None);
    }
}
