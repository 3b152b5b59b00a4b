//! Drawing state machine and input state management.

use super::modifiers::Modifiers;
use crate::annotation::{BoundingBox, Palette};
use crate::config::{Action, Config, KeyBinding};
use std::collections::HashMap;

mod actions;
mod mouse;
mod render;

pub use render::{LabelPrompt, RenderItem, StrokeStyle};

/// Current drawing mode state machine.
///
/// Tracks whether the user is idle, dragging out a candidate box, or typing
/// a label for a finished candidate. State transitions occur based on mouse
/// and keyboard events.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawingState {
    /// No active gesture
    Idle,
    /// Left button held; the candidate spans start..end (end follows the pointer)
    Dragging {
        start_x: f64,
        start_y: f64,
        end_x: f64,
        end_y: f64,
    },
    /// Candidate finished; waiting for a label to be confirmed or cancelled
    PendingLabel {
        start_x: f64,
        start_y: f64,
        end_x: f64,
        end_y: f64,
        /// Where the label prompt is anchored (pointer release position)
        anchor_x: f64,
        anchor_y: f64,
        /// Label typed so far
        buffer: String,
    },
}

/// What the owner of the annotation set should do in response to an event.
///
/// The state machine never owns annotations: it reads the current set and
/// proposes the next one, leaving history and persistence to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorCommand {
    /// Replace the annotation set with this one (commit or deletion)
    SetAnnotations(Vec<BoundingBox>),
    Undo,
    Redo,
    Export,
    Save,
}

/// Input state for one canvas.
///
/// Holds the drawing state machine, the current selection, modifier keys,
/// labeling preferences, and the color rotation for new boxes.
#[derive(Debug)]
pub struct InputState {
    /// Canvas width in pixels (pointer positions are clamped to it)
    pub canvas_width: f64,
    /// Canvas height in pixels
    pub canvas_height: f64,
    /// Current modifier key state
    pub modifiers: Modifiers,
    /// Current drawing mode state machine
    pub state: DrawingState,
    /// Index of the selected box, independent of drawing
    pub selected: Option<usize>,
    /// Whether the display needs to be redrawn
    pub needs_redraw: bool,
    /// Ask for a label before committing
    pub prompt_for_label: bool,
    /// Label used when prompting is off or the typed label is blank
    pub default_label: String,
    palette: Palette,
    action_map: HashMap<KeyBinding, Action>,
}

impl InputState {
    /// Creates an idle input state.
    pub fn new(
        canvas_width: f64,
        canvas_height: f64,
        prompt_for_label: bool,
        default_label: impl Into<String>,
        palette: Palette,
        action_map: HashMap<KeyBinding, Action>,
    ) -> Self {
        Self {
            canvas_width,
            canvas_height,
            modifiers: Modifiers::new(),
            state: DrawingState::Idle,
            selected: None,
            needs_redraw: true,
            prompt_for_label,
            default_label: default_label.into(),
            palette,
            action_map,
        }
    }

    /// Builds an input state from the loaded configuration.
    ///
    /// # Errors
    /// Returns the keybinding parser's message for invalid or duplicate bindings.
    pub fn from_config(config: &Config) -> Result<Self, String> {
        let action_map = config.keybindings.build_action_map()?;
        Ok(Self::new(
            f64::from(config.canvas.width),
            f64::from(config.canvas.height),
            config.labels.prompt_for_label,
            config.labels.default_label.clone(),
            config.build_palette(),
            action_map,
        ))
    }

    /// Drops any gesture in progress and the selection.
    ///
    /// Called when the annotation set is swapped underneath the editor
    /// (undo, redo, image switch) so stale indices never leak.
    pub fn reset(&mut self) {
        self.state = DrawingState::Idle;
        self.selected = None;
        self.needs_redraw = true;
    }

    pub fn clear_selection(&mut self) {
        if self.selected.take().is_some() {
            self.needs_redraw = true;
        }
    }

    /// Hands out the color for the next committed box.
    pub fn next_color(&mut self) -> crate::annotation::Color {
        self.palette.next_color()
    }

    /// Color rotation shared with boxes created outside the gesture flow
    /// (loaded rows without a color, suggestions).
    pub fn palette_mut(&mut self) -> &mut Palette {
        &mut self.palette
    }

    /// Builds the committed box for a candidate and the resulting annotation set.
    ///
    /// Returns `None` for zero-area candidates.
    fn commit_candidate(
        &mut self,
        (start_x, start_y, end_x, end_y): (f64, f64, f64, f64),
        label: &str,
        annotations: &[BoundingBox],
    ) -> Option<EditorCommand> {
        if start_x == end_x || start_y == end_y {
            return None;
        }

        let label = match label.trim() {
            "" => self.default_label.clone(),
            trimmed => trimmed.to_string(),
        };
        let candidate = BoundingBox::new(start_x, start_y, end_x, end_y, label, self.next_color());

        let mut next = annotations.to_vec();
        next.push(candidate);
        Some(EditorCommand::SetAnnotations(next))
    }

    fn find_action(&self, key_name: &str) -> Option<Action> {
        let binding = KeyBinding {
            key: key_name.to_string(),
            ctrl: self.modifiers.ctrl,
            shift: self.modifiers.shift,
            alt: self.modifiers.alt,
        };
        self.action_map.get(&binding).copied()
    }
}
