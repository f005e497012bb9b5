//! Keyboard events and quick-navigate keybindings.

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;

bitflags! {
    /// Modifier keys held during a key event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const CTRL = 0b0001;
        const SHIFT = 0b0010;
        const ALT = 0b0100;
        const META = 0b1000;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Enter,
    Escape,
    Tab,
    Space,
    Up,
    Down,
    Home,
    End,
    Ctrl,
    Shift,
    Alt,
    Meta,
    Char(char),
}

impl KeyCode {
    /// The modifier flag a modifier key stands for.
    pub fn modifier(self) -> Option<Modifiers> {
        match self {
            KeyCode::Ctrl => Some(Modifiers::CTRL),
            KeyCode::Shift => Some(Modifiers::SHIFT),
            KeyCode::Alt => Some(Modifiers::ALT),
            KeyCode::Meta => Some(Modifiers::META),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::empty(),
        }
    }

    pub fn with_modifiers(code: KeyCode, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }
}

impl From<KeyCode> for KeyEvent {
    fn from(code: KeyCode) -> Self {
        Self::new(code)
    }
}

/// One key press with modifiers, e.g. `ctrl+p`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyChord {
    pub modifiers: Modifiers,
    pub code: KeyCode,
}

/// A keybinding of one or two chords (`ctrl+k ctrl+p`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Keybinding {
    parts: Vec<KeyChord>,
}

impl Keybinding {
    pub fn single(chord: KeyChord) -> Self {
        Self { parts: vec![chord] }
    }

    pub fn chord(first: KeyChord, second: KeyChord) -> Self {
        Self {
            parts: vec![first, second],
        }
    }

    pub fn parts(&self) -> &[KeyChord] {
        &self.parts
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeybindingParseError(String);

impl fmt::Display for KeybindingParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid keybinding '{}'", self.0)
    }
}

impl std::error::Error for KeybindingParseError {}

impl FromStr for KeyChord {
    type Err = KeybindingParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let invalid = || KeybindingParseError(text.to_string());
        let mut modifiers = Modifiers::empty();
        let mut code = None;
        for part in text.split('+').map(str::trim) {
            let lowered = part.to_ascii_lowercase();
            let parsed = match lowered.as_str() {
                "ctrl" | "control" => {
                    modifiers |= Modifiers::CTRL;
                    continue;
                }
                "shift" => {
                    modifiers |= Modifiers::SHIFT;
                    continue;
                }
                "alt" | "option" => {
                    modifiers |= Modifiers::ALT;
                    continue;
                }
                "meta" | "cmd" | "win" => {
                    modifiers |= Modifiers::META;
                    continue;
                }
                "enter" => KeyCode::Enter,
                "escape" | "esc" => KeyCode::Escape,
                "tab" => KeyCode::Tab,
                "space" => KeyCode::Space,
                "up" => KeyCode::Up,
                "down" => KeyCode::Down,
                "home" => KeyCode::Home,
                "end" => KeyCode::End,
                other => {
                    let mut chars = other.chars();
                    match (chars.next(), chars.next()) {
                        (Some(ch), None) => KeyCode::Char(ch),
                        _ => return Err(invalid()),
                    }
                }
            };
            if code.replace(parsed).is_some() {
                return Err(invalid());
            }
        }
        let code = code.ok_or_else(invalid)?;
        Ok(KeyChord { modifiers, code })
    }
}

impl FromStr for Keybinding {
    type Err = KeybindingParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let parts = text
            .split_whitespace()
            .map(KeyChord::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        match parts.len() {
            1 | 2 => Ok(Keybinding { parts }),
            _ => Err(KeybindingParseError(text.to_string())),
        }
    }
}

/// Keybindings that opened a picker while their modifiers are still held.
///
/// Releasing one of those modifiers accepts the focused item.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuickNavigateConfiguration {
    pub keybindings: Vec<Keybinding>,
}

impl QuickNavigateConfiguration {
    pub fn new(keybindings: Vec<Keybinding>) -> Self {
        Self { keybindings }
    }

    /// True when releasing `key` ends quick navigation. Chord bindings never
    /// trigger.
    pub fn is_release_trigger(&self, key: &KeyEvent) -> bool {
        let Some(released) = key.code.modifier() else {
            return false;
        };
        self.keybindings
            .iter()
            .any(|binding| match binding.parts() {
                [single] => single.modifiers.contains(released),
                _ => false,
            })
    }
}
