use crate::annotation::color::RED;
use crate::annotation::{BoundingBox, Color};
use crate::util::Rect;

use super::{DrawingState, InputState};

/// How a rectangle outline should be stroked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeStyle {
    /// Committed box
    Solid,
    /// Committed box that is currently selected
    Highlighted,
    /// Candidate box still being drawn or labeled
    Dashed,
}

/// One rectangle to draw, in normalized canvas coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderItem {
    pub rect: Rect,
    pub color: Color,
    pub style: StrokeStyle,
    pub label: Option<String>,
}

/// Text-entry affordance for a pending label.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelPrompt {
    pub x: f64,
    pub y: f64,
    pub buffer: String,
}

impl InputState {
    /// Returns the draw list for the given annotation set, bottom to top.
    ///
    /// Committed boxes come first in draw order, followed by the candidate
    /// (if a drag or label prompt is active).
    pub fn render_items(&self, annotations: &[BoundingBox]) -> Vec<RenderItem> {
        let mut items: Vec<RenderItem> = annotations
            .iter()
            .enumerate()
            .map(|(index, bbox)| RenderItem {
                rect: bbox.rect(),
                color: bbox.color,
                style: if self.selected == Some(index) {
                    StrokeStyle::Highlighted
                } else {
                    StrokeStyle::Solid
                },
                label: Some(bbox.label.clone()),
            })
            .collect();

        if let Some(rect) = self.candidate_rect() {
            items.push(RenderItem {
                rect,
                color: RED,
                style: StrokeStyle::Dashed,
                label: None,
            });
        }

        items
    }

    /// Normalized rectangle of the in-progress candidate, if any.
    pub fn candidate_rect(&self) -> Option<Rect> {
        match &self.state {
            DrawingState::Idle => None,
            DrawingState::Dragging {
                start_x,
                start_y,
                end_x,
                end_y,
            }
            | DrawingState::PendingLabel {
                start_x,
                start_y,
                end_x,
                end_y,
                ..
            } => Some(Rect::from_corners(*start_x, *start_y, *end_x, *end_y)),
        }
    }

    /// The label prompt to display, if a candidate is waiting for a label.
    pub fn label_prompt(&self) -> Option<LabelPrompt> {
        match &self.state {
            DrawingState::PendingLabel {
                anchor_x,
                anchor_y,
                buffer,
                ..
            } => Some(LabelPrompt {
                x: *anchor_x,
                y: *anchor_y,
                buffer: buffer.clone(),
            }),
            _ => None,
        }
    }
}
