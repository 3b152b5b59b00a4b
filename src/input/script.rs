//! Line-oriented event scripts for driving the editor without a window.
//!
//! ```text
//! # draw a box and label it
//! down 10 10
//! move 40 30
//! up 60 50
//! type cat
//! key enter
//! key ctrl+z
//! ```

use super::events::{Key, MouseButton};
use thiserror::Error;

/// One scripted input event.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptEvent {
    Press { button: MouseButton, x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Release { button: MouseButton, x: f64, y: f64 },
    /// Each character is fed as a separate key press
    Type(String),
    Key(Key),
    /// Modifiers held down around a key, as in `key ctrl+shift+z`
    Chord { held: Vec<Key>, key: Key },
    Undo,
    Redo,
}

#[derive(Debug, Error, PartialEq)]
#[error("line {line}: {message}")]
pub struct ScriptError {
    pub line: usize,
    pub message: String,
}

/// Parses a script. Blank lines and `#` comments are skipped.
pub fn parse_script(source: &str) -> Result<Vec<ScriptEvent>, ScriptError> {
    source
        .lines()
        .enumerate()
        .filter_map(|(index, raw)| {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                None
            } else {
                Some(parse_line(line).map_err(|message| ScriptError {
                    line: index + 1,
                    message,
                }))
            }
        })
        .collect()
}

fn parse_line(line: &str) -> Result<ScriptEvent, String> {
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    match command.to_lowercase().as_str() {
        "down" => {
            let (x, y) = parse_point(rest)?;
            Ok(ScriptEvent::Press {
                button: MouseButton::Left,
                x,
                y,
            })
        }
        "right" => {
            let (x, y) = parse_point(rest)?;
            Ok(ScriptEvent::Press {
                button: MouseButton::Right,
                x,
                y,
            })
        }
        "move" => {
            let (x, y) = parse_point(rest)?;
            Ok(ScriptEvent::Move { x, y })
        }
        "up" => {
            let (x, y) = parse_point(rest)?;
            Ok(ScriptEvent::Release {
                button: MouseButton::Left,
                x,
                y,
            })
        }
        "type" => Ok(ScriptEvent::Type(rest.to_string())),
        "key" => parse_chord(rest),
        "undo" => Ok(ScriptEvent::Undo),
        "redo" => Ok(ScriptEvent::Redo),
        other => Err(format!("unknown command '{other}'")),
    }
}

fn parse_point(args: &str) -> Result<(f64, f64), String> {
    let parts: Vec<&str> = args.split_whitespace().collect();
    let [x, y] = parts.as_slice() else {
        return Err(format!("expected 'X Y', got '{args}'"));
    };
    let parse = |raw: &str| match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(format!("invalid coordinate '{raw}'")),
    };
    Ok((parse(*x)?, parse(*y)?))
}

fn parse_chord(chord: &str) -> Result<ScriptEvent, String> {
    if chord.len() <= 1 || !chord.contains('+') {
        return parse_key(chord).map(ScriptEvent::Key);
    }

    // "ctrl++" names the '+' key itself
    let (modifiers, key) = match chord.strip_suffix("++") {
        Some(prefix) => (prefix, "+"),
        None => chord.rsplit_once('+').unwrap_or(("", chord)),
    };
    let mut held = Vec::new();
    for part in modifiers.split('+') {
        match parse_key(part.trim())? {
            modifier @ (Key::Ctrl | Key::Shift | Key::Alt) => held.push(modifier),
            _ => return Err(format!("'{part}' is not a modifier in '{chord}'")),
        }
    }
    let key = parse_key(key.trim())?;
    Ok(ScriptEvent::Chord { held, key })
}

fn parse_key(name: &str) -> Result<Key, String> {
    let key = match name.to_lowercase().as_str() {
        "enter" | "return" => Key::Return,
        "escape" | "esc" => Key::Escape,
        "backspace" => Key::Backspace,
        "delete" | "del" => Key::Delete,
        "space" => Key::Space,
        "shift" => Key::Shift,
        "ctrl" | "control" => Key::Ctrl,
        "alt" => Key::Alt,
        _ => {
            let mut chars = name.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Key::Char(c),
                _ => return Err(format!("unknown key '{name}'")),
            }
        }
    };
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_gesture() {
        let script = "# comment\n\ndown 10 10\nmove 20 25.5\nup 30 40\ntype big cat\nkey enter\nundo\nredo\n";
        let events = parse_script(script).unwrap();
        assert_eq!(
            events,
            vec![
                ScriptEvent::Press {
                    button: MouseButton::Left,
                    x: 10.0,
                    y: 10.0
                },
                ScriptEvent::Move { x: 20.0, y: 25.5 },
                ScriptEvent::Release {
                    button: MouseButton::Left,
                    x: 30.0,
                    y: 40.0
                },
                ScriptEvent::Type("big cat".into()),
                ScriptEvent::Key(Key::Return),
                ScriptEvent::Undo,
                ScriptEvent::Redo,
            ]
        );
    }

    #[test]
    fn single_characters_become_char_keys() {
        let events = parse_script("key z\nkey Delete").unwrap();
        assert_eq!(
            events,
            vec![ScriptEvent::Key(Key::Char('z')), ScriptEvent::Key(Key::Delete)]
        );
    }

    #[test]
    fn errors_report_line_numbers() {
        let err = parse_script("down 1 1\n\nmove 1\n").unwrap_err();
        assert_eq!(err.line, 3);
        assert!(err.to_string().starts_with("line 3:"));

        let err = parse_script("jump 1 2").unwrap_err();
        assert!(err.message.contains("unknown command"));

        let err = parse_script("key hyper").unwrap_err();
        assert!(err.message.contains("unknown key"));

        let err = parse_script("key z+ctrl").unwrap_err();
        assert!(err.message.contains("not a modifier"));
    }

    #[test]
    fn chords_hold_modifiers_around_the_key() {
        let events = parse_script("key ctrl+z
key Ctrl+Shift+Z
key ctrl++
key +").unwrap();
        assert_eq!(
            events,
            vec![
                ScriptEvent::Chord {
                    held: vec![Key::Ctrl],
                    key: Key::Char('z')
                },
                ScriptEvent::Chord {
                    held: vec![Key::Ctrl, Key::Shift],
                    key: Key::Char('Z')
                },
                ScriptEvent::Chord {
                    held: vec![Key::Ctrl],
                    key: Key::Char('+')
                },
                ScriptEvent::Key(Key::Char('+')),
            ]
        );
    }

    #[test]
    fn non_finite_coordinates_are_rejected() {
        for script in ["down nan 5", "move 1 inf", "up -infinity 2"] {
            let err = parse_script(script).unwrap_err();
            assert!(err.message.contains("invalid coordinate"), "{script}");
        }
    }
}
