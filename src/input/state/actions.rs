use crate::annotation::BoundingBox;
use crate::config::Action;
use crate::input::events::Key;

use super::{DrawingState, EditorCommand, InputState};

impl InputState {
    /// Processes a key press event.
    ///
    /// Handles:
    /// - Modifier key tracking
    /// - Label entry while a candidate is pending (characters, Backspace,
    ///   Enter to confirm, Escape to cancel)
    /// - Escape to cancel an active drag
    /// - Configurable actions while idle (undo, redo, delete selection, ...)
    pub fn on_key_press(&mut self, key: Key, annotations: &[BoundingBox]) -> Option<EditorCommand> {
        if self.modifiers.update(key, true) {
            return None;
        }

        if matches!(self.state, DrawingState::PendingLabel { .. }) {
            return self.handle_label_key(key, annotations);
        }

        if matches!(self.state, DrawingState::Dragging { .. }) {
            if key == Key::Escape {
                self.state = DrawingState::Idle;
                self.needs_redraw = true;
            }
            return None;
        }

        let action = key.name().and_then(|name| self.find_action(&name))?;
        self.handle_action(action, annotations)
    }

    /// Processes a key release event (modifier tracking only).
    pub fn on_key_release(&mut self, key: Key) {
        self.modifiers.update(key, false);
    }

    /// Executes a bound action while idle.
    pub fn handle_action(
        &mut self,
        action: Action,
        annotations: &[BoundingBox],
    ) -> Option<EditorCommand> {
        match action {
            Action::Undo => Some(EditorCommand::Undo),
            Action::Redo => Some(EditorCommand::Redo),
            Action::Export => Some(EditorCommand::Export),
            Action::Save => Some(EditorCommand::Save),
            Action::ClearSelection => {
                self.clear_selection();
                None
            }
            Action::DeleteSelection => {
                let index = self.selected.take()?;
                self.needs_redraw = true;
                if index >= annotations.len() {
                    return None;
                }
                let mut next = annotations.to_vec();
                next.remove(index);
                Some(EditorCommand::SetAnnotations(next))
            }
        }
    }

    fn handle_label_key(&mut self, key: Key, annotations: &[BoundingBox]) -> Option<EditorCommand> {
        // Shortcuts are not typed into the label.
        if self.modifiers.shortcut_held() {
            return None;
        }

        let DrawingState::PendingLabel {
            start_x,
            start_y,
            end_x,
            end_y,
            buffer,
            ..
        } = &mut self.state
        else {
            return None;
        };

        match key {
            Key::Char(c) => buffer.push(c),
            Key::Space => buffer.push(' '),
            Key::Backspace => {
                buffer.pop();
            }
            Key::Escape => {
                self.state = DrawingState::Idle;
            }
            Key::Return => {
                let corners = (*start_x, *start_y, *end_x, *end_y);
                let label = std::mem::take(buffer);
                self.state = DrawingState::Idle;
                self.needs_redraw = true;
                return self.commit_candidate(corners, &label, annotations);
            }
            _ => return None,
        }

        self.needs_redraw = true;
        None
    }
}
