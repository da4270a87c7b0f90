//! Layout model: the per-modifier-combination scancode tables and layout
//! metadata produced by the builder and consumed by the reversal engine.

use crate::models::key::{DeadKeyEntry, Key};
use indexmap::IndexMap;

/// A 256-slot scancode table for one modifier combination.
pub type Keymap = Box<[Option<Key>; 256]>;

/// Allocates an empty keymap.
pub fn empty_keymap() -> Keymap {
    Box::new([const { None }; 256])
}

/// The fixed enumeration of canonical modifier-combination names a layout
/// source may qualify results with. Order is preserved in the model and in
/// the emitted output.
pub const CANONICAL_KEYMAPS: [&str; 22] = [
    "",
    "VK_SHIFT",
    "VK_SHIFT VK_CONTROL",
    "VK_SHIFT VK_CAPITAL",
    "VK_SHIFT VK_NUMLOCK",
    "VK_SHIFT VK_KANA",
    "VK_SHIFT VK_OEM_8",
    "VK_SHIFT VK_CONTROL VK_MENU",
    "VK_SHIFT VK_CONTROL VK_KANA",
    "VK_SHIFT VK_KANA VK_NUMLOCK",
    "VK_SHIFT VK_CONTROL VK_MENU VK_CAPITAL",
    "VK_SHIFT VK_CONTROL VK_MENU VK_NUMLOCK",
    "VK_CONTROL",
    "VK_CONTROL VK_MENU",
    "VK_CONTROL VK_KANA",
    "VK_CONTROL VK_MENU VK_NUMLOCK",
    "VK_CONTROL VK_MENU VK_CAPITAL",
    "VK_CAPITAL",
    "VK_NUMLOCK",
    "VK_OEM_8",
    "VK_KANA",
    "VK_KANA VK_NUMLOCK",
];

/// (NumLock variant, CapsLock variant, synthesized CapsLock+NumLock name)
/// triples for the first merge phase.
pub const MERGE_NUMLOCK_CAPITAL: [(&str, &str, &str); 4] = [
    (
        "VK_SHIFT VK_NUMLOCK",
        "VK_SHIFT VK_CAPITAL",
        "VK_SHIFT VK_CAPITAL VK_NUMLOCK",
    ),
    (
        "VK_SHIFT VK_CONTROL VK_MENU VK_NUMLOCK",
        "VK_SHIFT VK_CONTROL VK_MENU VK_CAPITAL",
        "VK_SHIFT VK_CONTROL VK_MENU VK_CAPITAL VK_NUMLOCK",
    ),
    (
        "VK_CONTROL VK_MENU VK_NUMLOCK",
        "VK_CONTROL VK_MENU VK_CAPITAL",
        "VK_CONTROL VK_MENU VK_CAPITAL VK_NUMLOCK",
    ),
    ("VK_NUMLOCK", "VK_CAPITAL", "VK_CAPITAL VK_NUMLOCK"),
];

/// (NumLock variant, base variant) pairs for the second merge phase. After
/// the merge the NumLock-only table is discarded.
pub const MERGE_NUMLOCK: [(&str, &str); 6] = [
    ("VK_SHIFT VK_NUMLOCK", "VK_SHIFT"),
    ("VK_SHIFT VK_KANA VK_NUMLOCK", "VK_SHIFT VK_KANA"),
    (
        "VK_SHIFT VK_CONTROL VK_MENU VK_NUMLOCK",
        "VK_SHIFT VK_CONTROL VK_MENU",
    ),
    ("VK_CONTROL VK_MENU VK_NUMLOCK", "VK_CONTROL VK_MENU"),
    ("VK_NUMLOCK", ""),
    ("VK_KANA VK_NUMLOCK", "VK_KANA"),
];

/// Overrides for vendor display names that are ambiguous between variants
/// of the same locale.
const RENAME_DISPLAY_NAME: [(&str, &str); 3] = [
    ("00000409", "United States - English"),
    ("0000041a", "Croatian"),
    ("0000040c", "French"),
];

/// Returns the override display name for a layout id, if one exists.
pub fn renamed_display_name(klid: &str) -> Option<&'static str> {
    RENAME_DISPLAY_NAME
        .iter()
        .find(|(k, _)| *k == klid)
        .map(|(_, name)| *name)
}

/// One input layout: metadata, per-modifier-combination scancode tables and
/// quirk flags. Built once per source file, immutable thereafter, consumed
/// exactly once by the reversal engine.
#[derive(Debug)]
pub struct KeyLayout {
    /// Locale identifier (hex string, e.g. "00000409").
    pub klid: String,
    /// Locale name (e.g. "en-US").
    pub locale_name: String,
    /// Display name, after rename-table overrides.
    pub display_name: String,
    /// Display name as found in the source.
    pub origin_display_name: String,
    /// Canonical modifier-combination name → 256-slot table, in canonical
    /// order.
    pub keymaps: IndexMap<String, Keymap>,
    /// Scancodes outside the normal extended range (Pause), never reversed.
    pub extra_scancodes: IndexMap<u16, Key>,
    /// The layout declares right Alt as AltGr.
    pub alt_right_is_altgr: bool,
    /// Right Control behaves as the OEM8 extra modifier key.
    pub right_ctrl_is_oem8: bool,
}

impl KeyLayout {
    /// Renders a slot-by-slot dump of every keymap, for verbose logging.
    pub fn dump(&self) -> String {
        let mut out = format!(
            "KLID: {}\nLocaleName: {}\nDisplayName: {}\nRightAltIsAltGr: {}\nRightCtrlIsOem8: {}\n",
            self.klid,
            self.locale_name,
            self.display_name,
            self.alt_right_is_altgr,
            self.right_ctrl_is_oem8
        );

        for (mods, keymap) in &self.keymaps {
            let name = if mods.is_empty() { "normal" } else { mods };
            out.push_str(name);
            out.push('\n');
            dump_slots(&mut out, keymap);
        }

        out.push_str("extra:\n");
        for (sc, key) in &self.extra_scancodes {
            out.push_str(&format!(
                "  0x{sc:04X} vk='{}'\n",
                key.vk.as_deref().unwrap_or("")
            ));
        }
        out
    }
}

fn dump_slots(out: &mut String, keymap: &Keymap) {
    for (slot, entry) in keymap.iter().enumerate() {
        let Some(key) = entry else {
            out.push_str(&format!("  0x{slot:02X} -\n"));
            continue;
        };
        // control characters and DEL would garble the dump
        let text = if key.codepoint < 0x20 || key.codepoint == 0x7f {
            match key.codepoint {
                0x07 => "\\a",
                0x08 => "\\b",
                0x09 => "\\t",
                0x0A => "\\n",
                0x0B => "\\v",
                0x0C => "\\f",
                0x0D => "\\r",
                _ => "",
            }
        } else {
            key.text.as_str()
        };
        out.push_str(&format!(
            "  0x{slot:02X}: codepoint=0x{:04x} text='{text}' vk='{}'\n",
            key.codepoint,
            key.vk.as_deref().unwrap_or("")
        ));
        if let Some(table) = &key.dead_keys {
            out.push_str("       DeadKeys: ");
            let mut prefix = "";
            for (with, entry) in &table.entries {
                match entry {
                    DeadKeyEntry::Direct(res) => {
                        out.push_str(&format!(
                            "{prefix}{} + {with} => {}\n",
                            table.accent, res.codepoint
                        ));
                    }
                    DeadKeyEntry::Nested(nested) => {
                        out.push_str(&format!(
                            "{prefix}{} + {with} => dead key '{}'\n",
                            table.accent, nested.accent
                        ));
                    }
                }
                prefix = "                 ";
            }
        }
    }
}
