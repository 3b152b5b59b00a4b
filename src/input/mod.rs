//! Input handling and drawing state machine.
//!
//! This module translates front-end keyboard and mouse events into editor
//! commands. It tracks the current gesture (idle, dragging a box, entering a
//! label), the selection, and modifier keys, and can replay scripted events.

pub mod events;
pub mod modifiers;
pub mod script;
pub mod state;

pub use events::{Key, MouseButton};
pub use modifiers::Modifiers;
pub use script::{ScriptError, ScriptEvent, parse_script};
pub use state::{
    DrawingState, EditorCommand, InputState, LabelPrompt, RenderItem, StrokeStyle,
};
