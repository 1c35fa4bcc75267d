//! Modifier key codes
//!
//! Key codes are plain HID keyboard page usages. Everything at or above [`KEY_LEFT_CTRL`] is
//! treated as a modifier and carried in the report's modifier bitmask, everything below it takes
//! one of the six key slots.

pub const KEY_LEFT_CTRL: u8 = 0xE0;
pub const KEY_LEFT_SHIFT: u8 = 0xE1;
pub const KEY_LEFT_ALT: u8 = 0xE2;
pub const KEY_LEFT_GUI: u8 = 0xE3;
pub const KEY_RIGHT_CTRL: u8 = 0xE4;
pub const KEY_RIGHT_SHIFT: u8 = 0xE5;
pub const KEY_RIGHT_ALT: u8 = 0xE6;
pub const KEY_RIGHT_GUI: u8 = 0xE7;

/// First modifier code, bit `n` of the modifier byte is key `MODIFIER_BASE + n`
pub const MODIFIER_BASE: u8 = KEY_LEFT_CTRL;

/// Usage 0 doubles as the empty slot marker and can never be pressed
pub const NO_KEY: u8 = 0x00;

#[must_use]
pub const fn is_modifier(code: u8) -> bool {
    code >= MODIFIER_BASE
}

/// Modifier bitmask for `code`, `None` for standard keys and for codes past [`KEY_RIGHT_GUI`]
#[must_use]
pub const fn modifier_bit(code: u8) -> Option<u8> {
    if is_modifier(code) {
        1u8.checked_shl((code - MODIFIER_BASE) as u32)
    } else {
        None
    }
}
