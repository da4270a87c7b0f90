//! Data models for keyboard layouts and modifier masks.
//!
//! This module contains all the core data structures used throughout the
//! application. Models are independent of parsing and output generation.

pub mod key;
pub mod layout;
pub mod modifiers;

// Re-export all model types
pub use key::{
    scancode_slot, DeadKeyEntry, DeadKeyTable, DirectResult, Key, NestedTable, EXTENDED_FLAG,
};
pub use layout::{
    empty_keymap, renamed_display_name, KeyLayout, Keymap, CANONICAL_KEYMAPS, MERGE_NUMLOCK,
    MERGE_NUMLOCK_CAPITAL,
};
pub use modifiers::ModifierMask;
