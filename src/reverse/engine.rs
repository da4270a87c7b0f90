//! The reversal engine: inverts scancode-keyed layout tables into
//! character-keyed tables.
//!
//! For every canonical modifier combination (except those still carrying
//! the raw NumLock bit, whose effect was folded in by the builder), every
//! populated slot contributes to one of three maps: the normal keymap
//! (text → mask → scancodes), the single-level dead-key map, or the
//! two-level dead-key map. Numpad-symbol conflicts are excluded, missing
//! CapsLock variants are synthesized, and action/unknown virtual keys are
//! validated into the diagnostics report.

use crate::models::{scancode_slot, DeadKeyEntry, KeyLayout, ModifierMask};
use crate::reverse::actions::{action_for, is_accepted_duplicate, is_known_unmapped};
use crate::reverse::report::{ValidationErrorKind, ValidationReport};
use anyhow::Result;
use indexmap::IndexMap;
use std::collections::HashSet;

/// Scancodes of the numeric-keypad punctuation keys (decimal point,
/// divide, multiply, subtract, add, enter).
pub const NUMPAD_SYMBOL_SCANCODES: [u16; 6] = [0x53, 0x135, 0x37, 0x4A, 0x4E, 0x11C];

/// Scancodes in the numpad digit range are exempt from the action-key
/// canonical-scancode check.
const NUMPAD_DIGIT_RANGE: std::ops::RangeInclusive<u16> = 0x47..=0x53;

/// Modifier mask → ordered scancode list; the first element is the
/// canonical scancode for that mask.
pub type ScancodesByMask = IndexMap<ModifierMask, Vec<u16>>;

/// Scancodes producing one character through a single dead key.
#[derive(Debug, Clone)]
pub struct DeadKeyRef {
    /// Mask → dead-key scancodes.
    pub scancodes: ScancodesByMask,
    /// Character typed after the dead key.
    pub combining: char,
}

/// Scancodes producing one character through a two-level dead-key chain.
#[derive(Debug, Clone)]
pub struct DoubleDeadKeyRef {
    /// Mask → first-level dead-key scancodes.
    pub scancodes: ScancodesByMask,
    /// Character opening the second dead-key level.
    pub first: char,
    /// Character typed after the second dead key.
    pub second: char,
}

/// The character-first lookup structure for one layout.
#[derive(Debug, Default)]
pub struct ReversedLayout {
    /// (text, codepoint) → mask → scancodes.
    pub keymap: IndexMap<(String, u32), ScancodesByMask>,
    /// Result text → single dead-key reference.
    pub dead_keys: IndexMap<String, DeadKeyRef>,
    /// Result text → double dead-key reference. Never shares a key with
    /// `dead_keys` after deduplication.
    pub dead_keys2: IndexMap<String, DoubleDeadKeyRef>,
}

/// Inverts one layout, collecting validation diagnostics into `report`.
pub fn reverse_layout(layout: &KeyLayout, report: &mut ValidationReport) -> Result<ReversedLayout> {
    let mut reversed = ReversedLayout::default();
    let conflict_chars = numpad_conflict_chars(layout);
    let mut normal_texts: HashSet<String> = HashSet::new();

    // text characters and actions
    for (mods, keymap) in &layout.keymaps {
        let mask = ModifierMask::from_names(mods)?;
        if mask.contains(ModifierMask::NUMLOCK) {
            continue;
        }

        for key in keymap.iter().flatten() {
            if key.is_dead() {
                continue;
            }
            if !key.text.is_empty() {
                // numpad symbol in conflict with another key producing the
                // same character: the non-numpad occurrence wins
                if conflict_chars.contains(&key.text)
                    && NUMPAD_SYMBOL_SCANCODES.contains(&key.scancode)
                {
                    continue;
                }
                normal_texts.insert(key.text.clone());
                reversed
                    .keymap
                    .entry((key.text.clone(), key.codepoint))
                    .or_default()
                    .entry(mask)
                    .or_default()
                    .push(key.scancode);
            } else if let Some(vk) = key.vk.as_deref() {
                validate_virtual_key(layout, mods, mask, key.scancode, key.codepoint, vk, report);
            }
        }
    }

    // add capslock when missing
    for by_mask in reversed.keymap.values_mut() {
        if by_mask
            .keys()
            .any(|mask| mask.contains(ModifierMask::CAPSLOCK))
        {
            continue;
        }
        let synthesized: Vec<(ModifierMask, Vec<u16>)> = by_mask
            .iter()
            .map(|(mask, scancodes)| (*mask | ModifierMask::CAPSLOCK, scancodes.clone()))
            .collect();
        for (mask, scancodes) in synthesized {
            by_mask.insert(mask, scancodes);
        }
    }

    // dead keys and dead keys of dead keys
    for (mods, keymap) in &layout.keymaps {
        let mask = ModifierMask::from_names(mods)?;
        if mask.contains(ModifierMask::NUMLOCK) {
            continue;
        }

        for key in keymap.iter().flatten() {
            let Some(table) = &key.dead_keys else {
                continue;
            };
            for (with, entry) in &table.entries {
                match entry {
                    DeadKeyEntry::Direct(result) => {
                        if normal_texts.contains(&result.text) {
                            continue;
                        }
                        reversed
                            .dead_keys
                            .entry(result.text.clone())
                            .or_insert_with(|| DeadKeyRef {
                                scancodes: ScancodesByMask::new(),
                                combining: *with,
                            })
                            .scancodes
                            .entry(mask)
                            .or_default()
                            .push(key.scancode);
                    }
                    DeadKeyEntry::Nested(nested) => {
                        for (second, result) in &nested.entries {
                            if normal_texts.contains(&result.text) {
                                continue;
                            }
                            reversed
                                .dead_keys2
                                .entry(result.text.clone())
                                .or_insert_with(|| DoubleDeadKeyRef {
                                    scancodes: ScancodesByMask::new(),
                                    first: *with,
                                    second: *second,
                                })
                                .scancodes
                                .entry(mask)
                                .or_default()
                                .push(key.scancode);
                        }
                    }
                }
            }
        }
    }

    // a character reachable via one dead key must not also be listed as
    // reachable via a longer chain
    let singles: Vec<String> = reversed.dead_keys.keys().cloned().collect();
    for text in singles {
        reversed.dead_keys2.shift_remove(&text);
    }

    Ok(reversed)
}

/// Characters produced at numpad-symbol scancodes that also appear
/// elsewhere in the layout.
fn numpad_conflict_chars(layout: &KeyLayout) -> HashSet<String> {
    let mut numpad_chars: HashSet<&str> = HashSet::new();
    for keymap in layout.keymaps.values() {
        for scancode in NUMPAD_SYMBOL_SCANCODES {
            if let Some(key) = &keymap[scancode_slot(scancode)] {
                if !key.text.is_empty() {
                    numpad_chars.insert(&key.text);
                }
            }
        }
    }

    layout
        .keymaps
        .values()
        .flat_map(|keymap| keymap.iter().flatten())
        .filter(|key| numpad_chars.contains(key.text.as_str()))
        .map(|key| key.text.clone())
        .collect()
}

/// Validates a text-less slot carrying a virtual key.
fn validate_virtual_key(
    layout: &KeyLayout,
    mods: &str,
    mask: ModifierMask,
    scancode: u16,
    codepoint: u32,
    vk: &str,
    report: &mut ValidationReport,
) {
    let mods_label = if mods.is_empty() { "noMod" } else { mods };

    if let Some((action, expected)) = action_for(vk) {
        if !mask.is_empty() {
            report.add(
                ValidationErrorKind::ActionWithModifier,
                format!(
                    "Action key with control key ({vk} + {mods_label}) in {} (0x{})",
                    layout.display_name, layout.klid
                ),
            );
        } else if !NUMPAD_DIGIT_RANGE.contains(&scancode)
            && expected != scancode
            && !is_accepted_duplicate(vk, scancode)
        {
            report.add(
                ValidationErrorKind::ActionScancodeMismatch,
                format!(
                    "Bad scancode for action key: {action} (0x{scancode:x} instead of 0x{expected:x}) in {} (0x{})",
                    layout.display_name, layout.klid
                ),
            );
        }
    } else if !is_known_unmapped(vk) && !(codepoint == 0 && mask.is_empty()) {
        report.add(
            ValidationErrorKind::UnknownKey,
            format!(
                "Unknown {vk} + {mods_label} in {} (0x{})",
                layout.display_name, layout.klid
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_layout_str;

    fn layout_from(keys: &str) -> KeyLayout {
        parse_layout_str(&format!(
            r#"<KbdLayout RightAltIsAltGr="false">
  <metadata KLID="00000807" LocaleName="de-CH" LayoutDisplayName="Test"/>
  <PhysicalKeys>{keys}</PhysicalKeys>
</KbdLayout>"#
        ))
        .unwrap()
    }

    fn reverse(keys: &str) -> (ReversedLayout, ValidationReport) {
        let layout = layout_from(keys);
        let mut report = ValidationReport::new();
        let reversed = reverse_layout(&layout, &mut report).unwrap();
        (reversed, report)
    }

    #[test]
    fn test_basic_reversal_with_capslock_synthesis() {
        let (reversed, report) = reverse(
            r#"<PK SC="1E" VK="VK_A">
                 <Result Text="a"/>
                 <Result Text="A" With="VK_SHIFT"/>
               </PK>"#,
        );
        assert!(report.is_valid());

        let lower = &reversed.keymap[&("a".to_string(), u32::from(b'a'))];
        assert_eq!(lower[&ModifierMask::NONE], vec![0x1E]);
        assert_eq!(lower[&ModifierMask::CAPSLOCK], vec![0x1E]);
        let upper = &reversed.keymap[&("A".to_string(), u32::from(b'A'))];
        assert_eq!(upper[&ModifierMask::SHIFT], vec![0x1E]);
        assert_eq!(
            upper[&(ModifierMask::SHIFT | ModifierMask::CAPSLOCK)],
            vec![0x1E]
        );
    }

    #[test]
    fn test_explicit_capslock_suppresses_synthesis() {
        let (reversed, _) = reverse(
            r#"<PK SC="10" VK="VK_Q">
                 <Result Text="q"/>
                 <Result Text="Q" With="VK_CAPITAL"/>
               </PK>"#,
        );
        let lower = &reversed.keymap[&("q".to_string(), u32::from(b'q'))];
        assert_eq!(lower.len(), 1, "no synthesized CapsLock for 'q'");
        assert!(reversed
            .keymap
            .contains_key(&("Q".to_string(), u32::from(b'Q'))));
    }

    #[test]
    fn test_numpad_symbol_conflict_excluded() {
        // '/' exists both on the main row (0x35) and on the numpad divide
        // key (0xE035): the numpad occurrence must not enter the map
        let (reversed, _) = reverse(
            r#"<PK SC="35" VK="VK_OEM_2"><Result Text="/"/></PK>
               <PK SC="E035" VK="VK_DIVIDE"><Result Text="/"/></PK>"#,
        );
        let slash = &reversed.keymap[&("/".to_string(), u32::from(b'/'))];
        assert_eq!(slash[&ModifierMask::NONE], vec![0x35]);
    }

    #[test]
    fn test_action_key_with_modifier_reports_error() {
        let (_, report) = reverse(
            r#"<PK SC="3B" VK="VK_X"><Result VK="VK_F1" With="VK_SHIFT"/></PK>"#,
        );
        assert_eq!(report.errors.len(), 1);
        assert_eq!(
            report.errors[0].kind,
            ValidationErrorKind::ActionWithModifier
        );
        assert!(report.errors[0].message.contains("VK_F1"));
        assert!(report.errors[0].message.contains("Test"));
    }

    #[test]
    fn test_action_key_at_canonical_scancode_is_clean() {
        let (_, report) = reverse(r#"<PK SC="3B" VK="VK_F1"/>"#);
        assert!(report.is_valid(), "{}", report.format_message());
    }

    #[test]
    fn test_action_key_scancode_mismatch_reports_error() {
        let (_, report) = reverse(r#"<PK SC="3C" VK="VK_F1"/>"#);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(
            report.errors[0].kind,
            ValidationErrorKind::ActionScancodeMismatch
        );
    }

    #[test]
    fn test_accepted_duplicate_scancode_is_clean() {
        let (_, report) = reverse(r#"<PK SC="54" VK="VK_SNAPSHOT"/>"#);
        assert!(report.is_valid(), "{}", report.format_message());
    }

    #[test]
    fn test_unknown_virtual_key_reports_error_under_modifier() {
        let (_, report) = reverse(
            r#"<PK SC="29" VK="VK_X"><Result VK="VK_WEIRD" With="VK_SHIFT"/></PK>"#,
        );
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].kind, ValidationErrorKind::UnknownKey);
    }

    #[test]
    fn test_known_unmapped_virtual_key_is_clean() {
        let (_, report) = reverse(r#"<PK SC="2A" VK="VK_LSHIFT"/>"#);
        assert!(report.is_valid(), "{}", report.format_message());
    }

    #[test]
    fn test_dead_key_reversal() {
        let (reversed, _) = reverse(
            r#"<PK SC="1A" VK="VK_OEM_4">
                 <Result>
                   <DeadKeyTable Accent="^">
                     <Result Text="â" With="a"/>
                   </DeadKeyTable>
                 </Result>
               </PK>"#,
        );
        let entry = &reversed.dead_keys["â"];
        assert_eq!(entry.combining, 'a');
        assert_eq!(entry.scancodes[&ModifierMask::NONE], vec![0x1A]);
    }

    #[test]
    fn test_dead_key_result_shadowed_by_normal_key() {
        // 'â' is directly typable, so the dead-key path is dropped
        let (reversed, _) = reverse(
            r#"<PK SC="10" VK="VK_Q"><Result Text="â"/></PK>
               <PK SC="1A" VK="VK_OEM_4">
                 <Result>
                   <DeadKeyTable Accent="^">
                     <Result Text="â" With="a"/>
                   </DeadKeyTable>
                 </Result>
               </PK>"#,
        );
        assert!(reversed.dead_keys.is_empty());
    }

    #[test]
    fn test_single_level_dead_key_wins_over_double() {
        let (reversed, _) = reverse(
            r#"<PK SC="1A" VK="VK_OEM_4">
                 <Result>
                   <DeadKeyTable Accent="^">
                     <Result Text="ẑ" With="z"/>
                     <Result With="~">
                       <DeadKeyTable Accent="~">
                         <Result Text="ẑ" With="w"/>
                         <Result Text="ṽ" With="v"/>
                       </DeadKeyTable>
                     </Result>
                   </DeadKeyTable>
                 </Result>
               </PK>"#,
        );
        assert!(reversed.dead_keys.contains_key("ẑ"));
        assert!(!reversed.dead_keys2.contains_key("ẑ"));
        let double = &reversed.dead_keys2["ṽ"];
        assert_eq!((double.first, double.second), ('~', 'v'));
    }

    #[test]
    fn test_first_seen_scancode_is_canonical() {
        let (reversed, _) = reverse(
            r#"<PK SC="02" VK="VK_1"><Result Text="1"/></PK>
               <PK SC="4F" VK="VK_NUMPAD1"><Result Text="1" With="VK_NUMLOCK"/></PK>"#,
        );
        // the NumLock table was folded into the base table; slot order puts
        // 0x02 first
        let ones = &reversed.keymap[&("1".to_string(), u32::from(b'1'))];
        assert_eq!(ones[&ModifierMask::NONE], vec![0x02, 0x4F]);
    }
}
