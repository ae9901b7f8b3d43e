//! Translation from remote [`Command`]s to what the surface understands.
//!
//! Pure functions only: nothing here touches the surface. The render loop
//! applies the resulting [`Action`] on its own thread.
//!
//! Key mapping is deliberately small: a single character maps to the code of
//! its upper-case form, plus `Enter` and `Backspace`. Any other token is
//! reported as [`DispatchError::UnsupportedKey`] instead of guessing a code.

use super::error::DispatchError;
use crate::core::Command;

/// Prefixes treated as already carrying a scheme even without `://`.
const OPAQUE_SCHEMES: &[&str] = &["about:", "data:", "file:", "javascript:"];

/// Toolkit key code. Printable keys use the code point of their upper-case
/// character; control keys live above `0x0100_0000`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyCode(pub u32);

impl KeyCode {
    pub const BACKSPACE: KeyCode = KeyCode(0x0100_0003);
    pub const RETURN: KeyCode = KeyCode(0x0100_0004);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
}

/// Synthetic input event in surface-local pixel space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    MousePress { x: i32, y: i32, button: MouseButton },
    MouseRelease { x: i32, y: i32, button: MouseButton },
    KeyPress { code: KeyCode, text: String },
    KeyRelease { code: KeyCode, text: String },
}

/// What the render loop should do with the surface for one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Load a normalized navigation target
    Load(String),
    /// Dispatch events, in order, to the focused element (or the surface)
    Input(Vec<InputEvent>),
}

/// Prefix `https://` unless the input already names a scheme.
pub fn normalize_url(raw: &str) -> String {
    let url = raw.trim();
    if has_scheme(url) {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

fn has_scheme(url: &str) -> bool {
    if let Some((scheme, _)) = url.split_once("://") {
        let mut chars = scheme.chars();
        let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
            && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
        if valid {
            return true;
        }
    }
    let lower = url.to_ascii_lowercase();
    OPAQUE_SCHEMES.iter().any(|prefix| lower.starts_with(prefix))
}

/// Resolve a key token to its key code, `None` for unsupported tokens.
pub fn key_code(key: &str) -> Option<KeyCode> {
    match key {
        "Enter" => Some(KeyCode::RETURN),
        "Backspace" => Some(KeyCode::BACKSPACE),
        _ => {
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => {
                    let upper = c.to_uppercase().next().unwrap_or(c);
                    Some(KeyCode(upper as u32))
                }
                _ => None,
            }
        }
    }
}

/// Map a command to the surface action that carries it out.
pub fn translate(command: &Command) -> Result<Action, DispatchError> {
    match command {
        Command::Navigate { url } => Ok(Action::Load(normalize_url(url))),
        Command::Click { x, y } => {
            let (x, y) = (*x, *y);
            let button = MouseButton::Left;
            Ok(Action::Input(vec![
                InputEvent::MousePress { x, y, button },
                InputEvent::MouseRelease { x, y, button },
            ]))
        }
        Command::KeyInput { key } => {
            let code = key_code(key).ok_or_else(|| DispatchError::UnsupportedKey(key.clone()))?;
            Ok(Action::Input(vec![
                InputEvent::KeyPress { code, text: key.clone() },
                InputEvent::KeyRelease { code, text: key.clone() },
            ]))
        }
    }
}
