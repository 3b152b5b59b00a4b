//! Generic input event types.

/// Generic key representation.
///
/// Front ends map their native key codes to these values for unified input handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Regular character key (a-z, 0-9, symbols)
    Char(char),
    /// Escape key
    Escape,
    /// Return/Enter key
    Return,
    /// Backspace key
    Backspace,
    /// Delete key
    Delete,
    /// Space bar
    Space,
    /// Shift modifier
    Shift,
    /// Ctrl (or Cmd) modifier
    Ctrl,
    /// Alt modifier
    Alt,
    /// Unmapped or unrecognized key
    Unknown,
}

impl Key {
    /// Lowercase name used for keybinding lookup, or `None` for keys that
    /// cannot be bound (modifiers, unknown keys).
    pub fn name(&self) -> Option<String> {
        let name = match self {
            Key::Char(c) => return Some(c.to_lowercase().collect()),
            Key::Escape => "escape",
            Key::Return => "return",
            Key::Backspace => "backspace",
            Key::Delete => "delete",
            Key::Space => "space",
            Key::Shift | Key::Ctrl | Key::Alt | Key::Unknown => return None,
        };
        Some(name.to_string())
    }
}

/// Mouse button identification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    /// Left mouse button (draw and select)
    Left,
    /// Right mouse button (cancel gesture)
    Right,
    /// Middle mouse button (currently unused)
    Middle,
}
