//! Hotkey binding strings.
//!
//! A binding is written as `+`-separated parts, modifiers first and the
//! trigger key last: "Alt+Space", "Ctrl+Shift+D", "F9". The same string is
//! handed to the OS for registration and decomposed into virtual-key codes
//! for release polling.

use std::fmt;
use std::str::FromStr;

use voxkey_core::VoxkeyError;

/// A parsed push-to-talk binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    parts: Vec<BindingKey>,
}

/// One key within a binding, with its Windows virtual-key code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindingKey {
    pub name: KeyName,
    pub vk: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyName {
    Ctrl,
    Alt,
    Shift,
    Win,
    Space,
    Enter,
    Tab,
    Escape,
    /// A–Z or 0–9.
    Char(char),
    /// F1–F24.
    Function(u8),
}

impl fmt::Display for KeyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyName::Ctrl => write!(f, "Ctrl"),
            KeyName::Alt => write!(f, "Alt"),
            KeyName::Shift => write!(f, "Shift"),
            KeyName::Win => write!(f, "Super"),
            KeyName::Space => write!(f, "Space"),
            KeyName::Enter => write!(f, "Enter"),
            KeyName::Tab => write!(f, "Tab"),
            KeyName::Escape => write!(f, "Escape"),
            KeyName::Char(c) => write!(f, "{}", c),
            KeyName::Function(n) => write!(f, "F{}", n),
        }
    }
}

fn parse_part(part: &str) -> Result<BindingKey, VoxkeyError> {
    let lowered = part.to_lowercase();
    let (name, vk) = match lowered.as_str() {
        "ctrl" | "control" => (KeyName::Ctrl, 0x11),
        "alt" => (KeyName::Alt, 0x12),
        "shift" => (KeyName::Shift, 0x10),
        "win" | "super" | "meta" => (KeyName::Win, 0x5B),
        "space" => (KeyName::Space, 0x20),
        "enter" | "return" => (KeyName::Enter, 0x0D),
        "tab" => (KeyName::Tab, 0x09),
        "escape" | "esc" => (KeyName::Escape, 0x1B),
        _ => {
            if let Some(n) = lowered.strip_prefix('f').and_then(|s| s.parse::<u8>().ok()) {
                if (1..=24).contains(&n) {
                    (KeyName::Function(n), 0x70 + n as u16 - 1)
                } else {
                    return Err(VoxkeyError::Hotkey(format!("Unknown key '{}'", part)));
                }
            } else if lowered.len() == 1 {
                let c = lowered.chars().next().unwrap();
                if c.is_ascii_alphanumeric() {
                    (KeyName::Char(c.to_ascii_uppercase()), c.to_ascii_uppercase() as u16)
                } else {
                    return Err(VoxkeyError::Hotkey(format!("Unknown key '{}'", part)));
                }
            } else {
                return Err(VoxkeyError::Hotkey(format!("Unknown key '{}'", part)));
            }
        }
    };
    Ok(BindingKey { name, vk })
}

impl FromStr for Binding {
    type Err = VoxkeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<BindingKey> = s
            .split('+')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(parse_part)
            .collect::<Result<_, _>>()?;

        if parts.is_empty() {
            return Err(VoxkeyError::Hotkey("Empty hotkey binding".into()));
        }

        let non_modifiers = parts.iter().filter(|p| !is_modifier(p.name)).count();
        if non_modifiers != 1 {
            return Err(VoxkeyError::Hotkey(format!(
                "Binding '{}' must have exactly one non-modifier key",
                s
            )));
        }

        Ok(Self { parts })
    }
}

fn is_modifier(name: KeyName) -> bool {
    matches!(
        name,
        KeyName::Ctrl | KeyName::Alt | KeyName::Shift | KeyName::Win
    )
}

impl Binding {
    /// Virtual-key codes of every key in the binding, for release polling.
    pub fn vk_codes(&self) -> Vec<u16> {
        self.parts.iter().map(|p| p.vk).collect()
    }

    /// The canonical registration string, e.g. "Ctrl+Alt+Space".
    pub fn canonical(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for part in &self.parts {
            if !first {
                write!(f, "+")?;
            }
            write!(f, "{}", part.name)?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_modifier_combo() {
        let binding: Binding = "Ctrl+Alt+Space".parse().unwrap();
        assert_eq!(binding.vk_codes(), vec![0x11, 0x12, 0x20]);
        assert_eq!(binding.to_string(), "Ctrl+Alt+Space");
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        let binding: Binding = "ctrl+shift+d".parse().unwrap();
        assert_eq!(binding.to_string(), "Ctrl+Shift+D");
        assert_eq!(binding.vk_codes(), vec![0x11, 0x10, 'D' as u16]);
    }

    #[test]
    fn test_parse_bare_function_key() {
        let binding: Binding = "F9".parse().unwrap();
        assert_eq!(binding.vk_codes(), vec![0x78]);
    }

    #[test]
    fn test_parse_with_spaces() {
        let binding: Binding = " Alt + Space ".parse().unwrap();
        assert_eq!(binding.to_string(), "Alt+Space");
    }

    #[test]
    fn test_reject_empty() {
        assert!("".parse::<Binding>().is_err());
        assert!("+".parse::<Binding>().is_err());
    }

    #[test]
    fn test_reject_unknown_key() {
        assert!("Ctrl+Banana".parse::<Binding>().is_err());
    }

    #[test]
    fn test_reject_modifiers_only() {
        assert!("Ctrl+Alt".parse::<Binding>().is_err());
    }

    #[test]
    fn test_reject_two_trigger_keys() {
        assert!("A+B".parse::<Binding>().is_err());
    }

    #[test]
    fn test_digit_key() {
        let binding: Binding = "Ctrl+1".parse().unwrap();
        assert_eq!(binding.vk_codes(), vec![0x11, '1' as u16]);
    }
}
