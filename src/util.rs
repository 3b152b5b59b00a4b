//! Utility functions for colors and canvas geometry.
//!
//! This module provides:
//! - Color-name lookup used by the configuration system
//! - Axis-aligned rectangle normalization and hit-testing
//! - Canvas bounds clamping for pointer coordinates

use crate::annotation::color::*;

// ============================================================================
// Color Mapping
// ============================================================================

/// Maps color name strings to Color values.
///
/// Used by the configuration system to parse color names from the config file.
///
/// # Supported Names (case-insensitive)
/// - "red", "green", "blue", "yellow", "orange", "pink", "white", "black"
pub fn name_to_color(name: &str) -> Option<Color> {
    match name.to_lowercase().as_str() {
        "red" => Some(RED),
        "green" => Some(GREEN),
        "blue" => Some(BLUE),
        "yellow" => Some(YELLOW),
        "orange" => Some(ORANGE),
        "pink" => Some(PINK),
        "white" => Some(WHITE),
        "black" => Some(BLACK),
        _ => None,
    }
}

// ============================================================================
// Geometry Utilities
// ============================================================================

/// Clamps a pointer position to the canvas rectangle `[0, width] x [0, height]`.
pub fn clamp_to_canvas(x: f64, y: f64, width: f64, height: f64) -> (f64, f64) {
    (x.clamp(0.0, width), y.clamp(0.0, height))
}

/// Returns true if the point lies inside `[0, width] x [0, height]`.
pub fn within_canvas(x: f64, y: f64, width: f64, height: f64) -> bool {
    (0.0..=width).contains(&x) && (0.0..=height).contains(&y)
}

/// Axis-aligned rectangle in min-corner/size form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Builds a normalized rectangle from two opposite corners given in any order.
    pub fn from_corners(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            x: x1.min(x2),
            y: y1.min(y2),
            width: (x2 - x1).abs(),
            height: (y2 - y1).abs(),
        }
    }

    /// Inclusive containment test.
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_from_corners_normalizes_any_drag_direction() {
        let rect = Rect::from_corners(50.0, 80.0, 10.0, 20.0);
        assert_eq!(
            rect,
            Rect {
                x: 10.0,
                y: 20.0,
                width: 40.0,
                height: 60.0
            }
        );
    }

    #[test]
    fn rect_containment_includes_edges() {
        let rect = Rect::from_corners(0.0, 0.0, 10.0, 10.0);
        assert!(rect.contains(0.0, 0.0));
        assert!(rect.contains(10.0, 10.0));
        assert!(!rect.contains(10.1, 5.0));
    }

    #[test]
    fn clamp_keeps_points_on_canvas() {
        assert_eq!(clamp_to_canvas(-5.0, 900.0, 800.0, 600.0), (0.0, 600.0));
        assert!(within_canvas(800.0, 600.0, 800.0, 600.0));
        assert!(!within_canvas(-1.0, 10.0, 800.0, 600.0));
    }

    #[test]
    fn name_lookup_is_case_insensitive() {
        assert_eq!(name_to_color("White"), Some(WHITE));
        assert!(name_to_color("chartreuse").is_none());
    }
}
