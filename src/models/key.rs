//! Per-scancode key behavior and dead-key result trees.

use indexmap::IndexMap;

/// Bit marking the extended scancode range (0xE0-prefixed raw scancodes).
pub const EXTENDED_FLAG: u16 = 0x100;

/// Table slot for a normalized scancode.
///
/// Keymaps are 256-slot tables: the low 7 bits index the base range and
/// extended scancodes occupy the upper half.
pub fn scancode_slot(scancode: u16) -> usize {
    usize::from((scancode & 0x7f) | ((scancode & EXTENDED_FLAG) >> 1))
}

/// One direct dead-key resolution: the text produced when the combining
/// character is typed after the accent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectResult {
    /// Produced text.
    pub text: String,
    /// Unicode scalar value of `text` when it is a single character, 0
    /// otherwise.
    pub codepoint: u32,
}

/// A second-level dead-key table. Its entries are direct results only,
/// which makes the two-level nesting limit a property of the type rather
/// than a runtime check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedTable {
    /// Accent character of the nested table (the combining character that
    /// led to it).
    pub accent: char,
    /// Combining character → final result.
    pub entries: IndexMap<char, DirectResult>,
}

/// One entry of a first-level dead-key table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeadKeyEntry {
    /// The combining character resolves directly to text.
    Direct(DirectResult),
    /// The combining character opens a second dead-key level.
    Nested(NestedTable),
}

/// A first-level dead-key table attached to a dead key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadKeyTable {
    /// The triggering accent character, shared by every entry.
    pub accent: char,
    /// Combining character → resolution.
    pub entries: IndexMap<char, DeadKeyEntry>,
}

/// One scancode's behavior under one modifier combination.
///
/// A dead key carries its accent character as `text`/`codepoint` and a
/// populated `dead_keys` table; an action or navigation key carries only a
/// virtual-key name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    /// Normalized scancode (0–0x1FF, bit [`EXTENDED_FLAG`] marks the
    /// extended range).
    pub scancode: u16,
    /// Unicode scalar value of `text` when single-character, the accent's
    /// codepoint for a dead key, 0 for empty or multi-character text.
    pub codepoint: u32,
    /// Produced text, or the accent character for a dead key. Empty for
    /// virtual-key-only records.
    pub text: String,
    /// Virtual-key identifier, meaningful when `text` is empty.
    pub vk: Option<String>,
    /// Dead-key resolutions, present only when this key is a dead key.
    pub dead_keys: Option<DeadKeyTable>,
}

impl Key {
    /// Creates a key carrying only a virtual-key identifier.
    pub fn from_vk(scancode: u16, vk: impl Into<String>) -> Self {
        Self {
            scancode,
            codepoint: 0,
            text: String::new(),
            vk: Some(vk.into()),
            dead_keys: None,
        }
    }

    /// Returns true when this key is a dead key.
    pub fn is_dead(&self) -> bool {
        self.dead_keys.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scancode_slot_base_range() {
        assert_eq!(scancode_slot(0x1E), 0x1E);
        assert_eq!(scancode_slot(0x7F), 0x7F);
    }

    #[test]
    fn test_scancode_slot_extended_range() {
        assert_eq!(scancode_slot(0x100 | 0x1D), 0x9D);
        assert_eq!(scancode_slot(0x135), 0xB5);
    }
}
