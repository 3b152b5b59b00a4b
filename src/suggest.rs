//! Automatic box suggestions from an external object detector.
//!
//! No detector ships with the crate. Front-ends plug one in through
//! [`Detector`] and feed the converted boxes to
//! [`AnnotationSession::apply_suggestions`](crate::session::AnnotationSession::apply_suggestions).

use crate::annotation::{BoundingBox, Palette};
use crate::util::clamp_to_canvas;
use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One detected object in normalized image coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    /// 0.0 - 1.0
    pub confidence: f64,
    /// `[x, y, width, height]`, each 0.0 - 1.0 of the image size
    pub bbox: [f64; 4],
}

#[derive(Debug, Error)]
pub enum SuggestError {
    #[error("detector unavailable: {0}")]
    Unavailable(String),
    #[error("detection failed: {0}")]
    Failed(String),
}

/// Source of object detections for an image.
#[async_trait]
pub trait Detector: Send + Sync {
    /// Detects objects in the image at `image_url`.
    async fn detect(&self, image_url: &str) -> Result<Vec<Detection>, SuggestError>;
}

/// Converts detections into canvas boxes.
///
/// Coordinates are scaled to `canvas_width` x `canvas_height` and clamped to
/// the canvas. Detections below `min_confidence` are dropped, as are boxes
/// with non-finite bounds or zero area. Each kept box takes the next palette color.
pub fn detections_to_boxes(
    detections: &[Detection],
    canvas_width: f64,
    canvas_height: f64,
    palette: &mut Palette,
    min_confidence: f64,
) -> Vec<BoundingBox> {
    detections
        .iter()
        .filter(|detection| {
            let keep = detection.confidence >= min_confidence;
            if !keep {
                debug!(
                    "Dropping '{}' detection at confidence {:.2}",
                    detection.label, detection.confidence
                );
            }
            keep
        })
        .filter_map(|detection| {
            if !detection.bbox.iter().all(|v| v.is_finite()) {
                debug!("Dropping '{}' detection with non-finite bounds", detection.label);
                return None;
            }
            let [x, y, w, h] = detection.bbox;
            let (start_x, start_y) =
                clamp_to_canvas(x * canvas_width, y * canvas_height, canvas_width, canvas_height);
            let (end_x, end_y) = clamp_to_canvas(
                (x + w) * canvas_width,
                (y + h) * canvas_height,
                canvas_width,
                canvas_height,
            );
            if start_x == end_x || start_y == end_y {
                return None;
            }
            let label = match detection.label.trim() {
                "" => "object".to_string(),
                trimmed => trimmed.to_string(),
            };
            Some(BoundingBox::new(
                start_x,
                start_y,
                end_x,
                end_y,
                label,
                palette.next_color(),
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::color::{BLUE, GREEN};

    fn detection(label: &str, confidence: f64, bbox: [f64; 4]) -> Detection {
        Detection {
            label: label.to_string(),
            confidence,
            bbox,
        }
    }

    #[test]
    fn scales_to_canvas_and_assigns_colors() {
        let mut palette = Palette::new(vec![GREEN, BLUE]);
        let boxes = detections_to_boxes(
            &[
                detection("cat", 0.9, [0.1, 0.2, 0.5, 0.5]),
                detection("dog", 0.8, [0.0, 0.0, 0.25, 0.25]),
            ],
            800.0,
            600.0,
            &mut palette,
            0.5,
        );
        assert_eq!(
            boxes,
            vec![
                BoundingBox::new(80.0, 120.0, 480.0, 420.0, "cat", GREEN),
                BoundingBox::new(0.0, 0.0, 200.0, 150.0, "dog", BLUE),
            ]
        );
    }

    #[test]
    fn drops_low_confidence_and_degenerate_results() {
        let mut palette = Palette::default();
        let boxes = detections_to_boxes(
            &[
                detection("faint", 0.2, [0.1, 0.1, 0.2, 0.2]),
                detection("flat", 0.9, [0.1, 0.1, 0.0, 0.2]),
                detection("offscreen", 0.9, [1.2, 0.1, 0.3, 0.3]),
                detection("nan", 0.9, [f64::NAN, 0.1, 0.3, 0.3]),
            ],
            800.0,
            600.0,
            &mut palette,
            0.5,
        );
        assert!(boxes.is_empty());
    }

    #[test]
    fn clamps_overflowing_boxes() {
        let mut palette = Palette::default();
        let boxes = detections_to_boxes(
            &[detection(" ", 1.0, [0.5, 0.5, 0.9, 0.9])],
            100.0,
            100.0,
            &mut palette,
            0.0,
        );
        assert_eq!(boxes.len(), 1);
        assert_eq!((boxes[0].end_x, boxes[0].end_y), (100.0, 100.0));
        assert_eq!(boxes[0].label, "object");
    }
}
