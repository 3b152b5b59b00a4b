use crate::annotation::{BoundingBox, hit_test};
use crate::input::events::MouseButton;
use crate::util;
use log::debug;

use super::{DrawingState, EditorCommand, InputState};

impl InputState {
    /// Processes a mouse button press event.
    ///
    /// # Behavior
    /// - Left click while Idle on a box: selects the topmost box under the pointer
    /// - Left click while Idle elsewhere on the canvas: starts a drag
    /// - Left click outside the canvas: clears the selection
    /// - Right click: cancels any drag or label prompt
    ///
    /// Events with non-finite coordinates are ignored.
    pub fn on_mouse_press(
        &mut self,
        button: MouseButton,
        x: f64,
        y: f64,
        annotations: &[BoundingBox],
    ) {
        if !finite_point(x, y) {
            debug!("Ignoring press at non-finite point ({x}, {y})");
            return;
        }
        match button {
            MouseButton::Left => {
                if !matches!(self.state, DrawingState::Idle) {
                    return;
                }

                if !util::within_canvas(x, y, self.canvas_width, self.canvas_height) {
                    self.clear_selection();
                    return;
                }

                if let Some(index) = hit_test(annotations, x, y) {
                    self.selected = Some(index);
                    self.needs_redraw = true;
                    return;
                }

                self.selected = None;
                let (x, y) = util::clamp_to_canvas(x, y, self.canvas_width, self.canvas_height);
                self.state = DrawingState::Dragging {
                    start_x: x,
                    start_y: y,
                    end_x: x,
                    end_y: y,
                };
                self.needs_redraw = true;
            }
            MouseButton::Right => {
                if !matches!(self.state, DrawingState::Idle) {
                    self.state = DrawingState::Idle;
                    self.needs_redraw = true;
                }
            }
            MouseButton::Middle => {}
        }
    }

    /// Processes mouse motion.
    ///
    /// While dragging, only the candidate's end corner moves, clamped to the canvas.
    pub fn on_mouse_motion(&mut self, x: f64, y: f64) {
        if !finite_point(x, y) {
            return;
        }
        let (cx, cy) = util::clamp_to_canvas(x, y, self.canvas_width, self.canvas_height);
        if let DrawingState::Dragging { end_x, end_y, .. } = &mut self.state {
            *end_x = cx;
            *end_y = cy;
            self.needs_redraw = true;
        }
    }

    /// Processes mouse button release events.
    ///
    /// Finishing a drag either discards a zero-area candidate, opens the
    /// label prompt, or (with prompting disabled) commits immediately with
    /// the default label.
    pub fn on_mouse_release(
        &mut self,
        button: MouseButton,
        x: f64,
        y: f64,
        annotations: &[BoundingBox],
    ) -> Option<EditorCommand> {
        if button != MouseButton::Left {
            return None;
        }
        if !finite_point(x, y) {
            debug!("Ignoring release at non-finite point ({x}, {y})");
            return None;
        }

        self.on_mouse_motion(x, y);
        let DrawingState::Dragging {
            start_x,
            start_y,
            end_x,
            end_y,
        } = self.state
        else {
            return None;
        };

        self.needs_redraw = true;
        if start_x == end_x || start_y == end_y {
            debug!("Discarding zero-area box at ({start_x}, {start_y})");
            self.state = DrawingState::Idle;
            return None;
        }

        if self.prompt_for_label {
            let (anchor_x, anchor_y) =
                util::clamp_to_canvas(x, y, self.canvas_width, self.canvas_height);
            self.state = DrawingState::PendingLabel {
                start_x,
                start_y,
                end_x,
                end_y,
                anchor_x,
                anchor_y,
                buffer: String::new(),
            };
            return None;
        }

        self.state = DrawingState::Idle;
        let label = self.default_label.clone();
        self.commit_candidate((start_x, start_y, end_x, end_y), &label, annotations)
    }
}

fn finite_point(x: f64, y: f64) -> bool {
    x.is_finite() && y.is_finite()
}
