//! Modifier flags and canonical modifier-mask computation.
//!
//! Layout sources qualify results with space-separated virtual-key modifier
//! names ("VK_SHIFT VK_CONTROL VK_MENU"). Reversed tables are keyed by a
//! compact bitmask over those names, with two folds applied: Control+Alt is
//! the conventional AltGr combination and is replaced by the AltGr bit, and
//! a remaining Control bit is always stripped (Control-only combinations do
//! not produce distinguishable printable output).

use anyhow::{bail, Result};
use serde::Serialize;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Bitmask over the fixed modifier vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
pub struct ModifierMask(pub u16);

impl ModifierMask {
    /// No modifier held.
    pub const NONE: Self = Self(0);
    /// Either shift key.
    pub const SHIFT: Self = Self(1 << 0);
    /// Alternate graphics (the Control+Alt fold).
    pub const ALTGR: Self = Self(1 << 1);
    /// CapsLock engaged.
    pub const CAPSLOCK: Self = Self(1 << 2);
    /// Either control key (never present in a final mask).
    pub const CONTROL: Self = Self(1 << 3);
    /// Either alt key.
    pub const ALT: Self = Self(1 << 4);
    /// The OEM8 extra modifier found on some vendor layouts.
    pub const OEM8: Self = Self(1 << 5);
    /// Kana shift.
    pub const KANA: Self = Self(1 << 6);
    /// Kana lock.
    pub const KANALOCK: Self = Self(1 << 7);
    /// NumLock engaged.
    pub const NUMLOCK: Self = Self(1 << 8);

    /// Looks up the flag for one virtual-key modifier name.
    ///
    /// The empty name is accepted and contributes nothing, so that
    /// space-splitting an empty qualifier string works out.
    pub fn from_name(name: &str) -> Result<Self> {
        Ok(match name {
            "" => Self::NONE,
            "VK_SHIFT" => Self::SHIFT,
            "altgr" => Self::ALTGR,
            "VK_CAPITAL" => Self::CAPSLOCK,
            "VK_CONTROL" => Self::CONTROL,
            "VK_MENU" => Self::ALT,
            "VK_OEM_8" => Self::OEM8,
            "VK_KANA" => Self::KANA,
            "VK_KANALOCK" => Self::KANALOCK,
            "VK_NUMLOCK" => Self::NUMLOCK,
            _ => bail!("undefined modifier name: {name}"),
        })
    }

    /// Computes the canonical mask for a space-separated modifier-name
    /// combination.
    ///
    /// Control+Alt is folded to AltGr, then Control is stripped. The result
    /// is the form every reversed-table key uses.
    pub fn from_names(names: &str) -> Result<Self> {
        let mut mask = Self::NONE;
        for name in names.split(' ') {
            mask |= Self::from_name(name)?;
        }
        Ok(mask.canonicalize())
    }

    /// Applies the Ctrl+Alt→AltGr fold and strips the Control bit.
    #[must_use]
    pub fn canonicalize(self) -> Self {
        let ctrl_alt = Self::CONTROL | Self::ALT;
        let mask = if self.contains(ctrl_alt) {
            Self(self.0 & !ctrl_alt.0) | Self::ALTGR
        } else {
            self
        };
        Self(mask.0 & !Self::CONTROL.0)
    }

    /// Returns true when every bit of `other` is set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns true when no bit is set.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for ModifierMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ModifierMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::LowerHex for ModifierMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ctrl_alt_folds_to_altgr() {
        let folded = ModifierMask::from_names("VK_CONTROL VK_MENU").unwrap();
        assert_eq!(folded, ModifierMask::ALTGR);
        assert_eq!(folded, ModifierMask::from_names("altgr").unwrap());
    }

    #[test]
    fn test_control_alone_is_stripped() {
        assert_eq!(
            ModifierMask::from_names("VK_CONTROL").unwrap(),
            ModifierMask::NONE
        );
        assert_eq!(ModifierMask::from_names("").unwrap(), ModifierMask::NONE);
    }

    #[test]
    fn test_shift_control_keeps_shift() {
        assert_eq!(
            ModifierMask::from_names("VK_SHIFT VK_CONTROL").unwrap(),
            ModifierMask::SHIFT
        );
    }

    #[test]
    fn test_fold_preserves_other_bits() {
        let mask = ModifierMask::from_names("VK_SHIFT VK_CONTROL VK_MENU VK_CAPITAL").unwrap();
        assert_eq!(
            mask,
            ModifierMask::SHIFT | ModifierMask::ALTGR | ModifierMask::CAPSLOCK
        );
    }

    #[test]
    fn test_unknown_name_is_rejected() {
        assert!(ModifierMask::from_names("VK_BOGUS").is_err());
    }
}
