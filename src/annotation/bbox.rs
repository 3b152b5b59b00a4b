//! Bounding box definition.

use super::color::Color;
use crate::util::Rect;
use serde::{Deserialize, Serialize};

/// A labeled rectangular annotation on an image.
///
/// The rectangle is stored as the two corners of the drag gesture that made
/// it, so `start_x` may be greater than `end_x` (and likewise on y). Use
/// [`BoundingBox::rect`] for the normalized form.
///
/// Equality is structural over every field; history snapshots rely on it to
/// skip entries that would not change the annotation set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    /// X of the corner where the drag started
    pub start_x: f64,
    /// Y of the corner where the drag started
    pub start_y: f64,
    /// X of the corner where the drag ended
    pub end_x: f64,
    /// Y of the corner where the drag ended
    pub end_y: f64,
    /// User-assigned label
    #[serde(default)]
    pub label: String,
    /// Outline color picked when the box was created
    pub color: Color,
}

impl BoundingBox {
    pub fn new(
        start_x: f64,
        start_y: f64,
        end_x: f64,
        end_y: f64,
        label: impl Into<String>,
        color: Color,
    ) -> Self {
        Self {
            start_x,
            start_y,
            end_x,
            end_y,
            label: label.into(),
            color,
        }
    }

    /// Normalized min-corner/size rectangle.
    pub fn rect(&self) -> Rect {
        Rect::from_corners(self.start_x, self.start_y, self.end_x, self.end_y)
    }

    /// True when the box has zero width or zero height.
    pub fn is_degenerate(&self) -> bool {
        self.start_x == self.end_x || self.start_y == self.end_y
    }

    /// Hit-test against the normalized bounds, edges included.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.rect().contains(x, y)
    }
}

/// Index of the topmost box under the point, if any.
///
/// Boxes later in the slice are drawn on top, so the search runs back to front.
pub fn hit_test(boxes: &[BoundingBox], x: f64, y: f64) -> Option<usize> {
    boxes.iter().rposition(|b| b.contains(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::color::{BLUE, RED};

    #[test]
    fn reversed_corners_still_hit() {
        let b = BoundingBox::new(50.0, 80.0, 10.0, 20.0, "cat", RED);
        assert!(b.contains(30.0, 50.0));
        assert!(!b.contains(5.0, 50.0));
    }

    #[test]
    fn topmost_box_wins_on_overlap() {
        let boxes = vec![
            BoundingBox::new(0.0, 0.0, 100.0, 100.0, "below", RED),
            BoundingBox::new(50.0, 50.0, 150.0, 150.0, "above", BLUE),
        ];
        assert_eq!(hit_test(&boxes, 75.0, 75.0), Some(1));
        assert_eq!(hit_test(&boxes, 25.0, 25.0), Some(0));
        assert_eq!(hit_test(&boxes, 200.0, 200.0), None);
    }

    #[test]
    fn degenerate_detection_checks_each_axis() {
        assert!(BoundingBox::new(10.0, 10.0, 10.0, 50.0, "", RED).is_degenerate());
        assert!(BoundingBox::new(10.0, 10.0, 50.0, 10.0, "", RED).is_degenerate());
        assert!(!BoundingBox::new(10.0, 10.0, 50.0, 50.0, "", RED).is_degenerate());
    }

    #[test]
    fn serializes_with_camel_case_corners() {
        let b = BoundingBox::new(1.0, 2.0, 3.0, 4.0, "dog", RED);
        let value = serde_json::to_value(&b).unwrap();
        assert_eq!(value["startX"], 1.0);
        assert_eq!(value["endY"], 4.0);
        assert_eq!(value["color"], "#ff0000");
    }
}
