use crate::item::{Item, ItemId};

/// Result of matching one keypress against the play area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyMatch {
    /// not part of the key set
    Unrecognized(char),
    /// a known key with no rising item behind it (late or duplicate press)
    NoTarget(char),
    Target(ItemId),
}

/// What a keypress did to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// session not running, nothing happened
    Ignored,
    Hit { id: ItemId, restored_lives: u32 },
    Unrecognized(char),
    NoTarget(char),
}

impl KeyOutcome {
    pub fn is_penalty(&self) -> bool {
        matches!(self, KeyOutcome::Unrecognized(_) | KeyOutcome::NoTarget(_))
    }
}

pub fn normalize(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Only rising items can be matched; items mid hit-animation still hold
/// their key but no longer take presses.
pub fn classify(c: char, keys: &[char], items: &[Item]) -> KeyMatch {
    let key = normalize(c);
    if !keys.contains(&key) {
        return KeyMatch::Unrecognized(key);
    }
    match items.iter().find(|it| it.key == key && it.is_rising()) {
        Some(it) => KeyMatch::Target(it.id),
        None => KeyMatch::NoTarget(key),
    }
}
