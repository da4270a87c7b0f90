//! Static virtual-key tables used by the reversal engine.
//!
//! Action keys are non-printable keys identified by a fixed virtual-key
//! name; each has one canonical scancode that every layout is expected to
//! agree on. Virtual keys in the known-unmapped set are understood but
//! intentionally produce no reversed entry.

/// (virtual key, action name, canonical scancode).
pub const ACTIONS: [(&str, &str, u16); 59] = [
    ("VK_APPS", "ContextMenu", 0x15D),
    ("VK_BROWSER_BACK", "BrowserBack", 0x16A),
    ("VK_BROWSER_FAVORITES", "BrowserFavorites", 0x166),
    ("VK_BROWSER_FORWARD", "BrowserForward", 0x169),
    ("VK_BROWSER_HOME", "BrowserHome", 0x132),
    ("VK_BROWSER_REFRESH", "BrowserRefresh", 0x167),
    ("VK_BROWSER_SEARCH", "BrowserSearch", 0x165),
    ("VK_BROWSER_STOP", "BrowserStop", 0x168),
    ("VK_CLEAR", "Clear", 0x59),
    ("VK_DBE_NOCODEINPUT", "CodeInput", 0x62),
    ("VK_DELETE", "Delete", 0x153),
    ("VK_DOWN", "ArrowDown", 0x150),
    ("VK_END", "End", 0x14F),
    ("VK_F1", "F1", 0x3B),
    ("VK_F2", "F2", 0x3C),
    ("VK_F3", "F3", 0x3D),
    ("VK_F4", "F4", 0x3E),
    ("VK_F5", "F5", 0x3F),
    ("VK_F6", "F6", 0x40),
    ("VK_F7", "F7", 0x41),
    ("VK_F8", "F8", 0x42),
    ("VK_F9", "F9", 0x43),
    ("VK_F10", "F10", 0x44),
    ("VK_F11", "F11", 0x57),
    ("VK_F12", "F12", 0x58),
    ("VK_F13", "F13", 0x64),
    ("VK_F14", "F14", 0x65),
    ("VK_F15", "F15", 0x66),
    ("VK_F16", "F16", 0x67),
    ("VK_F17", "F17", 0x68),
    ("VK_F18", "F18", 0x69),
    ("VK_F19", "F19", 0x6A),
    ("VK_F20", "F20", 0x6B),
    ("VK_F21", "F21", 0x6C),
    ("VK_F22", "F22", 0x6D),
    ("VK_F23", "F23", 0x6E),
    ("VK_F24", "F24", 0x76),
    ("VK_HELP", "Help", 0x63),
    ("VK_HOME", "Home", 0x147),
    ("VK_INSERT", "Insert", 0x152),
    ("VK_LAUNCH_APP1", "LaunchApp1", 0x16B),
    ("VK_LAUNCH_APP2", "LaunchApp2", 0x121),
    ("VK_LAUNCH_MAIL", "LaunchMail", 0x16C),
    ("VK_LAUNCH_MEDIA_SELECT", "LaunchMediaPlayer", 0x16D),
    ("VK_LEFT", "ArrowLeft", 0x14B),
    ("VK_MEDIA_NEXT_TRACK", "MediaTrackNext", 0x119),
    ("VK_MEDIA_PLAY_PAUSE", "MediaPlayPause", 0x122),
    ("VK_MEDIA_PREV_TRACK", "MediaTrackPrevious", 0x110),
    ("VK_MEDIA_STOP", "MediaStop", 0x124),
    ("VK_NEXT", "PageDown", 0x151),
    ("VK_PRIOR", "PageUp", 0x149),
    ("VK_RIGHT", "ArrowRight", 0x14D),
    ("VK_SCROLL", "ScrollLock", 0x46),
    ("VK_SLEEP", "Standby", 0x15F),
    ("VK_SNAPSHOT", "PrintScreen", 0x137),
    ("VK_UP", "ArrowUp", 0x148),
    ("VK_VOLUME_DOWN", "AudioVolumeDown", 0x12E),
    ("VK_VOLUME_MUTE", "AudioVolumeMute", 0x120),
    ("VK_VOLUME_UP", "AudioVolumeUp", 0x130),
];

/// (virtual key, scancode) pairs accepted despite not matching the action's
/// canonical scancode.
const ACCEPTED_DUPLICATES: [(&str, u16); 1] = [("VK_SNAPSHOT", 0x54)];

/// Virtual keys that are known but intentionally carry no reversed entry:
/// OEM punctuation handled through text results, IME keys, and the modifier
/// keys themselves.
const KNOWN_UNMAPPED: [&str; 39] = [
    "VK_ABNT_C1",
    "VK_ABNT_C2",
    "VK_DBE_FLUSHSTRING",
    "VK_DBE_KATAKANA",
    "VK_HANJA",
    "VK_IME_OFF",
    "VK_IME_ON",
    "VK_OEM_102",
    "VK_OEM_1",
    "VK_OEM_2",
    "VK_OEM_3",
    "VK_OEM_4",
    "VK_OEM_5",
    "VK_OEM_6",
    "VK_OEM_7",
    "VK_OEM_8",
    "VK_OEM_AUTO",
    "VK_OEM_BACKTAB",
    "VK_OEM_COMMA",
    "VK_OEM_JUMP",
    "VK_OEM_MINUS",
    "VK_OEM_PA1",
    "VK_OEM_PA2",
    "VK_OEM_PA3",
    "VK_OEM_PERIOD",
    "VK_OEM_PLUS",
    "VK_OEM_RESET",
    "VK_OEM_WSCTRL",
    "VK_LCONTROL",
    "VK_LSHIFT",
    "VK_RSHIFT",
    "VK_LMENU",
    "VK_CAPITAL",
    "VK_NUMLOCK",
    "VK_RCONTROL",
    "VK_RMENU",
    "VK_LWIN",
    "VK_RWIN",
    "VK_KANA",
];

/// Looks up the action entry for a virtual key.
pub fn action_for(vk: &str) -> Option<(&'static str, u16)> {
    ACTIONS
        .iter()
        .find(|(name, _, _)| *name == vk)
        .map(|(_, action, scancode)| (*action, *scancode))
}

/// Returns true when this (virtual key, scancode) pair is an accepted
/// deviation from the canonical action scancode.
pub fn is_accepted_duplicate(vk: &str, scancode: u16) -> bool {
    ACCEPTED_DUPLICATES
        .iter()
        .any(|(name, sc)| *name == vk && *sc == scancode)
}

/// Returns true when this virtual key is known but intentionally unmapped.
pub fn is_known_unmapped(vk: &str) -> bool {
    KNOWN_UNMAPPED.contains(&vk)
}
