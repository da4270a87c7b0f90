//! JavaScript module emission.
//!
//! Turns reversed layouts into a self-contained JS module: deduplicated
//! `keyN`/`keymapN`/`accentsN`/`dkeymapN` bindings, one object literal per
//! layout, and the independent `actionLayout` side table mapping action
//! names to their canonical scancodes.

use crate::emit::interner::Interner;
use crate::models::KeyLayout;
use crate::reverse::actions::ACTIONS;
use crate::reverse::{ReversedLayout, ScancodesByMask};

/// Control characters and quoting hazards escaped in emitted string
/// literals.
const CHAR_ESCAPES: [(char, &str); 8] = [
    ('\u{8}', "\\b"),
    ('\t', "\\t"),
    ('\n', "\\n"),
    ('\u{b}', "\\v"),
    ('\u{c}', "\\f"),
    ('\r', "\\r"),
    ('\\', "\\\\"),
    ('\'', "\\'"),
];

fn escape_char(c: char) -> Option<&'static str> {
    CHAR_ESCAPES
        .iter()
        .find(|(from, _)| *from == c)
        .map(|(_, to)| *to)
}

/// Escapes a combining or dead-key result character; characters outside
/// the escape table are emitted as-is.
fn escape_verbatim(text: &str) -> String {
    let mut chars = text.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if let Some(escaped) = escape_char(c) {
            return escaped.to_string();
        }
    }
    text.to_string()
}

/// Escapes a keymap key: escape-table hit, printable text as-is, otherwise
/// a `\xNN`/`\uNNNN` codepoint escape.
fn escape_key_text(text: &str, codepoint: u32) -> String {
    let mut chars = text.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if let Some(escaped) = escape_char(c) {
            return escaped.to_string();
        }
    }
    if text.chars().all(|c| !c.is_control()) {
        text.to_string()
    } else if codepoint <= 0xff {
        format!("\\x{codepoint:02x}")
    } else {
        format!("\\u{codepoint:04x}")
    }
}

fn scancodes_by_mask_body(scancodes_by_mask: &ScancodesByMask) -> String {
    let mut body = String::new();
    for (mask, scancodes) in scancodes_by_mask {
        body.push_str(&format!("0x{mask:x}: 0x{:x}, ", scancodes[0]));
    }
    body
}

/// Accumulates reversed layouts and emits the final JS module.
#[derive(Debug, Default)]
pub struct JsEmitter {
    keys: Interner,
    keymaps: Interner,
    accents: Interner,
    dkeymaps: Interner,
    layouts: String,
}

impl JsEmitter {
    /// Creates an empty emitter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one reversed layout, interning its sub-tables.
    pub fn push_layout(&mut self, layout: &KeyLayout, reversed: &ReversedLayout) {
        let mut body = String::from("{\n");
        for ((text, codepoint), scancodes_by_mask) in &reversed.keymap {
            let key = escape_key_text(text, *codepoint);
            let keys_ref = self.push_keys(scancodes_by_mask);
            body.push_str(&format!("    '{key}': {keys_ref},\n"));
        }
        body.push_str("  };\n\n");
        let keymap_idx = self.keymaps.intern(body);

        // accent tables are interned per layout; dead-key entries refer to
        // them by index
        let mut accent_tables = Interner::new();
        let mut body = String::from("{\n");
        for (text, entry) in &reversed.dead_keys {
            let accent_idx = accent_tables.intern(scancodes_by_mask_body(&entry.scancodes));
            body.push_str(&format!(
                "    '{}': [{accent_idx}, '{}'],\n",
                escape_verbatim(text),
                escape_verbatim(&entry.combining.to_string())
            ));
        }
        for (text, entry) in &reversed.dead_keys2 {
            let accent_idx = accent_tables.intern(scancodes_by_mask_body(&entry.scancodes));
            body.push_str(&format!(
                "    '{}': [{accent_idx}, '{}', '{}'],\n",
                escape_verbatim(text),
                escape_verbatim(&entry.first.to_string()),
                escape_verbatim(&entry.second.to_string())
            ));
        }
        body.push_str("  };\n\n");
        let dkeymap_idx = self.dkeymaps.intern(body);

        let mut body = String::from("[\n");
        for table in accent_tables.bodies() {
            body.push_str(&format!("    {{{table}}},\n"));
        }
        body.push_str("  ];\n\n");
        let accents_idx = self.accents.intern(body);

        self.layouts.push_str(&format!(
            "  {{\n    klid: 0x{},\n    localeName: \"{}\",\n    displayName: \"{}\",\n    \
             ctrlRightIsOem8: {},\n    altRightIsAltGr: {},\n    keymap: keymap{keymap_idx},\n    \
             deadkeys: dkeymap{dkeymap_idx},\n    accents: accents{accents_idx},\n  }},\n",
            layout.klid,
            layout.locale_name,
            layout.display_name,
            layout.right_ctrl_is_oem8,
            layout.alt_right_is_altgr,
        ));
    }

    fn push_keys(&mut self, scancodes_by_mask: &ScancodesByMask) -> String {
        let body = scancodes_by_mask_body(scancodes_by_mask);
        let idx = self.keys.intern(format!("{{ {body}}};\n"));
        format!("key{idx}")
    }

    /// Renders the complete JS module.
    pub fn finish(self) -> String {
        let mut out = String::from(
            "// keymap: { text: { mod_flags: scancode } }\n\
             // deadkeys: { text: [ idxAccent, idxKeymap, idxKeymap ? ]\n\
             // accents: [ { mod_flags: scancode } ]\n\
             const layouts = (function(){\n",
        );

        for (name, interner) in [
            ("key", &self.keys),
            ("keymap", &self.keymaps),
            ("accents", &self.accents),
            ("dkeymap", &self.dkeymaps),
        ] {
            for (idx, body) in interner.bodies().enumerate() {
                out.push_str(&format!("  const {name}{idx} = {body}"));
            }
        }

        out.push_str("  return [\n");
        out.push_str(&self.layouts);
        out.push_str("  ];\n})();\n\n");

        out.push_str("const actionLayout = {\n");
        for (_, action, scancode) in ACTIONS {
            out.push_str(&format!("  \"{action}\": 0x{scancode:x},\n"));
        }
        out.push_str("};\n\n");

        out.push_str(
            "try {\n\
             \x20   module.exports.layouts = layouts;\n\
             \x20   module.exports.actionLayout = actionLayout;\n\
             }\n\
             catch(e) {\n\
             \x20   // module not found\n\
             }\n",
        );
        out
    }
}
