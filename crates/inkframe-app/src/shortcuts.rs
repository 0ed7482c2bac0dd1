//! Keyboard shortcut registry and documentation.

use inkframe_core::{EditorCommand, Key, KeyEvent, Modifiers};

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub shift: bool,
    pub command: EditorCommand,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(
        key: &'static str,
        ctrl: bool,
        shift: bool,
        command: EditorCommand,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            ctrl,
            shift,
            command,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+Z").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key);
        parts.join("+")
    }

    /// The key press this shortcut stands for.
    pub fn key_event(&self) -> Option<KeyEvent> {
        let key = match self.key {
            "Delete" => Key::Delete,
            "Backspace" => Key::Backspace,
            "Escape" => Key::Escape,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Char(c.to_ascii_lowercase()),
                    _ => return None,
                }
            }
        };
        let modifiers = Modifiers {
            ctrl: self.ctrl,
            shift: self.shift,
            ..Modifiers::NONE
        };
        Some(KeyEvent::new(key, modifiers))
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new("Z", true, false, EditorCommand::Undo, "Undo"),
            Shortcut::new("Z", true, true, EditorCommand::Redo, "Redo"),
            Shortcut::new("Y", true, false, EditorCommand::Redo, "Redo"),
            Shortcut::new(
                "Delete",
                false,
                false,
                EditorCommand::DeleteSelection,
                "Delete selected object",
            ),
            Shortcut::new(
                "Backspace",
                false,
                false,
                EditorCommand::DeleteSelection,
                "Delete selected object",
            ),
            Shortcut::new(
                "Escape",
                false,
                false,
                EditorCommand::Cancel,
                "Finish text editing or clear selection",
            ),
        ]
    }

    /// Print all shortcuts to console.
    pub fn print_all() {
        println!("\n=== Keyboard Shortcuts ===");
        println!("  (Cmd may be used in place of Ctrl on macOS)");
        for shortcut in Self::all() {
            println!("  {:20} {}", shortcut.format(), shortcut.description);
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_matches_key_bindings() {
        for shortcut in ShortcutRegistry::all() {
            let event = shortcut.key_event().unwrap();
            assert_eq!(
                EditorCommand::from_key(&event),
                Some(shortcut.command),
                "{}",
                shortcut.format()
            );
        }
    }

    #[test]
    fn test_format() {
        let redo = &ShortcutRegistry::all()[1];
        assert_eq!(redo.format(), "Ctrl+Shift+Z");
    }
}
