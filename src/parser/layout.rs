//! Layout XML parsing and model building.
//!
//! A layout source describes one keyboard layout: a metadata element, then
//! an ordered list of physical-key records. Each record names a raw
//! scancode and zero or more modifier-qualified results (text, hex
//! codepoint sequence, virtual-key name, or a nested dead-key tree). This
//! module routes those records into the canonical keymap tables, parses
//! dead-key trees, detects the OEM8 right-Control quirk and applies the
//! NumLock/CapsLock merge rules.
//!
//! All errors raised here are format errors: the input cannot be modeled
//! and processing of the file aborts.

use crate::models::{
    empty_keymap, renamed_display_name, scancode_slot, DeadKeyEntry, DeadKeyTable, DirectResult,
    Key, KeyLayout, Keymap, NestedTable, CANONICAL_KEYMAPS, EXTENDED_FLAG, MERGE_NUMLOCK,
    MERGE_NUMLOCK_CAPITAL,
};
use crate::parser::xml_tree::{expect_attrs, parse_document, Element};
use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use log::debug;
use std::path::Path;

/// Parses a layout XML file into a [`KeyLayout`].
pub fn parse_layout_file(path: &Path) -> Result<KeyLayout> {
    debug!("parsing layout file: {}", path.display());
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read layout file: {}", path.display()))?;

    parse_layout_str(&content)
        .with_context(|| format!("Failed to parse layout file: {}", path.display()))
}

/// Parses a layout XML document from a string.
pub fn parse_layout_str(content: &str) -> Result<KeyLayout> {
    let root = parse_document(content)?;

    let alt_right_is_altgr = root
        .attr("RightAltIsAltGr")
        .context("missing RightAltIsAltGr attribute on root element")?
        == "true";

    if root.children.len() < 2 {
        bail!("expected a metadata element and a physical-key list");
    }

    let values = expect_attrs(
        &root.children[0],
        "metadata",
        &[
            ("KLID", true),
            ("LocaleName", true),
            ("LayoutDisplayName", true),
        ],
    )?;
    let klid = values[0].clone().unwrap_or_default();
    let locale_name = values[1].clone().unwrap_or_default();
    let origin_display_name = values[2].clone().unwrap_or_default();
    let display_name = renamed_display_name(&klid)
        .map_or_else(|| origin_display_name.clone(), String::from);

    let mut builder = Builder::new();
    for pk in &root.children[1].children {
        builder.add_physical_key(pk)?;
    }
    builder.merge_numlock_tables()?;

    Ok(KeyLayout {
        klid,
        locale_name,
        display_name,
        origin_display_name,
        keymaps: builder.keymaps,
        extra_scancodes: builder.extra_scancodes,
        alt_right_is_altgr,
        right_ctrl_is_oem8: builder.right_ctrl_is_oem8,
    })
}

/// Accumulates keymap tables while physical-key records are routed.
struct Builder {
    keymaps: IndexMap<String, Keymap>,
    extra_scancodes: IndexMap<u16, Key>,
    right_ctrl_is_oem8: bool,
    has_oem8_key: bool,
}

impl Builder {
    fn new() -> Self {
        let keymaps = CANONICAL_KEYMAPS
            .iter()
            .map(|mods| ((*mods).to_string(), empty_keymap()))
            .collect();
        Self {
            keymaps,
            extra_scancodes: IndexMap::new(),
            right_ctrl_is_oem8: false,
            has_oem8_key: false,
        }
    }

    /// Routes one physical-key record into the keymap tables.
    fn add_physical_key(&mut self, pk: &Element) -> Result<()> {
        let values = expect_attrs(pk, "PK", &[("SC", true), ("VK", true), ("Name", false)])?;
        let sc_attr = values[0].as_deref().unwrap_or_default();
        let vk = values[1].clone().unwrap_or_default();

        let raw = u16::from_str_radix(sc_attr, 16)
            .with_context(|| format!("PK: bad scancode '{sc_attr}'"))?;

        // 0xE0XX -> extended, 0xE11D -> pause
        if raw & 0xff == 0 {
            bail!("PK: scancode 0x{raw:04X} has an empty low byte");
        }
        if !matches!(raw >> 8, 0 | 0xE0 | 0xE1) {
            bail!("PK: unsupported scancode range 0x{raw:04X}");
        }

        if raw > 0xE100 {
            if raw != 0xE11D {
                bail!("PK: unsupported scancode 0x{raw:04X} beyond the extended range");
            }
            self.extra_scancodes.insert(raw, Key::from_vk(raw, vk));
            return Ok(());
        }

        if pk.children.is_empty() && vk == "VK_OEM_8" {
            // the OEM8 remap record follows the results that referenced OEM8
            if !self.has_oem8_key {
                bail!("PK: VK_OEM_8 remap before any VK_OEM_8-qualified result");
            }
            if raw != 0xE01D {
                bail!("PK: VK_OEM_8 remap expected on right Control (E01D), got 0x{raw:04X}");
            }
            self.right_ctrl_is_oem8 = true;
        }

        let scancode = (raw & 0x7f) | if raw >> 8 != 0 { EXTENDED_FLAG } else { 0 };
        let slot = scancode_slot(scancode);

        if pk.children.is_empty() {
            let keymap = &mut self.keymaps[""];
            if keymap[slot].is_some() {
                bail!("PK: scancode 0x{scancode:03X} already assigned");
            }
            keymap[slot] = Some(Key::from_vk(scancode, vk));
            return Ok(());
        }

        for result in &pk.children {
            self.add_result(result, scancode, slot)?;
        }
        Ok(())
    }

    /// Routes one modifier-qualified result of a physical-key record.
    fn add_result(&mut self, result: &Element, scancode: u16, slot: usize) -> Result<()> {
        let values = expect_attrs(
            result,
            "Result",
            &[
                ("Text", false),
                ("TextCodepoints", false),
                ("VK", false),
                ("With", false),
            ],
        )?;
        let text = values[0].clone();
        let codepoints = values[1].clone();
        let vk = values[2].clone();
        let mods = values[3].clone().unwrap_or_default();

        if mods.contains("VK_OEM_8") {
            if self.right_ctrl_is_oem8 {
                bail!("Result: VK_OEM_8-qualified result after the VK_OEM_8 remap record");
            }
            self.has_oem8_key = true;
        }

        let Some(keymap) = self.keymaps.get_mut(&mods) else {
            bail!("Result: unknown modifier combination '{mods}'");
        };
        if keymap[slot].is_some() {
            bail!("Result: scancode 0x{scancode:03X} already assigned in '{mods}'");
        }

        if text.as_deref().is_some_and(|t| !t.is_empty()) || codepoints.is_some() {
            let (codepoint, text) = if let Some(hex) = codepoints {
                if text.as_deref().is_some_and(|t| !t.is_empty()) {
                    bail!("Result: both Text and TextCodepoints present");
                }
                decode_codepoints(&hex)?
            } else {
                let text = text.unwrap_or_default();
                let mut chars = text.chars();
                let codepoint = match (chars.next(), chars.next()) {
                    (Some(c), None) => c as u32,
                    _ => 0, // multi char
                };
                (codepoint, text)
            };
            keymap[slot] = Some(Key {
                scancode,
                codepoint,
                text,
                vk,
                dead_keys: None,
            });
        } else if !result.children.is_empty() {
            if vk.is_some() {
                bail!("Result: dead-key result cannot carry a virtual key");
            }
            if result.children.len() != 1 {
                bail!("Result: expected exactly one dead-key table");
            }
            let table = parse_dead_key_table(&result.children[0])?;
            keymap[slot] = Some(Key {
                scancode,
                codepoint: table.accent as u32,
                text: table.accent.to_string(),
                vk: None,
                dead_keys: Some(table),
            });
        } else if let Some(vk) = vk {
            // text-less virtual-key result; the reversal engine validates it
            keymap[slot] = Some(Key::from_vk(scancode, vk));
        }

        Ok(())
    }

    /// Applies the two NumLock/CapsLock merge phases, in this exact order:
    /// first synthesize the four CapsLock+NumLock tables, then fold each
    /// NumLock variant into its base table and discard it.
    fn merge_numlock_tables(&mut self) -> Result<()> {
        for (num_mod, caps_mod, merged_mod) in MERGE_NUMLOCK_CAPITAL {
            let mut merged = empty_keymap();
            {
                let caps = &self.keymaps[caps_mod];
                let num = &self.keymaps[num_mod];
                for slot in 0..256 {
                    merged[slot] = match (&caps[slot], &num[slot]) {
                        (Some(_), Some(_)) => bail!(
                            "slot 0x{slot:02X} populated in both '{caps_mod}' and '{num_mod}'"
                        ),
                        (Some(key), None) => Some(key.clone()),
                        (None, key) => key.clone(),
                    };
                }
            }
            self.keymaps.insert(merged_mod.to_string(), merged);
        }

        for (num_mod, base_mod) in MERGE_NUMLOCK {
            let num = self
                .keymaps
                .shift_remove(num_mod)
                .with_context(|| format!("missing canonical keymap '{num_mod}'"))?;
            let base = &mut self.keymaps[base_mod];
            for (slot, key) in num.iter().enumerate() {
                match (&base[slot], key) {
                    (Some(_), Some(_)) => {
                        bail!("slot 0x{slot:02X} populated in both '{base_mod}' and '{num_mod}'");
                    }
                    (None, Some(key)) => base[slot] = Some(key.clone()),
                    _ => {}
                }
            }
        }
        Ok(())
    }
}

/// Decodes a hex TextCodepoints attribute: the value is the UTF-8 byte
/// sequence of the produced text, read big-endian.
fn decode_codepoints(hex: &str) -> Result<(u32, String)> {
    let value = u32::from_str_radix(hex, 16)
        .with_context(|| format!("Result: bad TextCodepoints '{hex}'"))?;
    let bytes = value.to_be_bytes();
    let skip = bytes.iter().take_while(|b| **b == 0).count();
    let text = std::str::from_utf8(&bytes[skip..])
        .with_context(|| format!("Result: TextCodepoints '{hex}' is not valid UTF-8"))?;
    Ok((value, text.to_string()))
}

/// Parses a first-level dead-key table. Entries either resolve directly or
/// open exactly one nested table one level deeper.
fn parse_dead_key_table(node: &Element) -> Result<DeadKeyTable> {
    let values = expect_attrs(node, "DeadKeyTable", &[("Accent", true), ("Name", false)])?;
    let accent = single_char(values[0].as_deref().unwrap_or_default(), "Accent")?;

    let mut entries = IndexMap::new();
    for result in &node.children {
        let values = expect_attrs(result, "Result", &[("Text", false), ("With", true)])?;
        let with = single_char(values[1].as_deref().unwrap_or_default(), "With")?;

        let entry = match values[0].as_deref().filter(|t| !t.is_empty()) {
            Some(text) => DeadKeyEntry::Direct(direct_result(text)),
            None => {
                if result.children.len() != 1 {
                    bail!("DeadKeyTable: entry '{with}' resolves to neither text nor a nested table");
                }
                DeadKeyEntry::Nested(parse_nested_table(&result.children[0])?)
            }
        };
        if entries.insert(with, entry).is_some() {
            bail!("DeadKeyTable: duplicate combining character '{with}' for accent '{accent}'");
        }
    }

    if entries.is_empty() {
        bail!("DeadKeyTable: empty table for accent '{accent}'");
    }
    Ok(DeadKeyTable { accent, entries })
}

/// Parses a second-level dead-key table. Every entry must resolve directly;
/// a third nesting level is a format error.
fn parse_nested_table(node: &Element) -> Result<NestedTable> {
    let values = expect_attrs(node, "DeadKeyTable", &[("Accent", true), ("Name", false)])?;
    let accent = single_char(values[0].as_deref().unwrap_or_default(), "Accent")?;

    let mut entries = IndexMap::new();
    for result in &node.children {
        let values = expect_attrs(result, "Result", &[("Text", false), ("With", true)])?;
        let with = single_char(values[1].as_deref().unwrap_or_default(), "With")?;

        let Some(text) = values[0].as_deref().filter(|t| !t.is_empty()) else {
            bail!("DeadKeyTable: dead keys nested deeper than two levels (accent '{accent}')");
        };
        if entries.insert(with, direct_result(text)).is_some() {
            bail!("DeadKeyTable: duplicate combining character '{with}' for accent '{accent}'");
        }
    }

    if entries.is_empty() {
        bail!("DeadKeyTable: empty table for accent '{accent}'");
    }
    Ok(NestedTable { accent, entries })
}

fn direct_result(text: &str) -> DirectResult {
    let mut chars = text.chars();
    let codepoint = match (chars.next(), chars.next()) {
        (Some(c), None) => c as u32,
        _ => 0,
    };
    DirectResult {
        text: text.to_string(),
        codepoint,
    }
}

fn single_char(value: &str, what: &str) -> Result<char> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => bail!("DeadKeyTable: {what} must be a single character, got '{value}'"),
    }
}
