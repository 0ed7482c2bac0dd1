//! Pointer and keyboard events fed to an editor session.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Pointer event in device coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PointerEvent {
    Down { position: Point },
    Move { position: Point },
    Up { position: Point },
}

impl PointerEvent {
    pub fn position(&self) -> Point {
        match *self {
            PointerEvent::Down { position }
            | PointerEvent::Move { position }
            | PointerEvent::Up { position } => position,
        }
    }
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const CTRL: Self = Self {
        ctrl: true,
        ..Self::NONE
    };

    pub const CTRL_SHIFT: Self = Self {
        ctrl: true,
        shift: true,
        ..Self::NONE
    };

    /// Ctrl on Linux/Windows, Cmd on macOS; either is accepted.
    pub fn platform(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Keys the editor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Key {
    Delete,
    Backspace,
    Escape,
    Char(char),
}

/// A key press with its modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: Key,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn plain(key: Key) -> Self {
        Self::new(key, Modifiers::NONE)
    }
}

/// Editor-level action bound to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorCommand {
    DeleteSelection,
    Undo,
    Redo,
    Cancel,
}

impl EditorCommand {
    /// Map a key press to a command, `None` for unbound keys.
    pub fn from_key(event: &KeyEvent) -> Option<Self> {
        let mods = event.modifiers;
        match event.key {
            Key::Delete | Key::Backspace if !mods.platform() => Some(Self::DeleteSelection),
            Key::Escape => Some(Self::Cancel),
            Key::Char(c) if mods.platform() => match c.to_ascii_lowercase() {
                'z' if mods.shift => Some(Self::Redo),
                'z' => Some(Self::Undo),
                'y' => Some(Self::Redo),
                _ => None,
            },
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undo_redo_bindings() {
        let undo = KeyEvent::new(Key::Char('z'), Modifiers::CTRL);
        assert_eq!(EditorCommand::from_key(&undo), Some(EditorCommand::Undo));

        let redo_y = KeyEvent::new(Key::Char('y'), Modifiers::CTRL);
        assert_eq!(EditorCommand::from_key(&redo_y), Some(EditorCommand::Redo));

        let redo_shift = KeyEvent::new(Key::Char('Z'), Modifiers::CTRL_SHIFT);
        assert_eq!(EditorCommand::from_key(&redo_shift), Some(EditorCommand::Redo));

        let cmd = Modifiers {
            meta: true,
            ..Modifiers::NONE
        };
        let mac_undo = KeyEvent::new(Key::Char('z'), cmd);
        assert_eq!(EditorCommand::from_key(&mac_undo), Some(EditorCommand::Undo));
    }

    #[test]
    fn test_delete_bindings() {
        for key in [Key::Delete, Key::Backspace] {
            assert_eq!(
                EditorCommand::from_key(&KeyEvent::plain(key)),
                Some(EditorCommand::DeleteSelection)
            );
        }
        assert_eq!(EditorCommand::from_key(&KeyEvent::plain(Key::Char('z'))), None);
    }

    #[test]
    fn test_pointer_event_json() {
        let event: PointerEvent =
            serde_json::from_str(r#"{"kind":"down","position":{"x":1.0,"y":2.0}}"#).unwrap();
        assert_eq!(event.position(), Point::new(1.0, 2.0));
    }
}
