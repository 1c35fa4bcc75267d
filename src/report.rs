//! Keyboard input report

use crate::key::{is_modifier, modifier_bit, NO_KEY};
use crate::{KeyboardError, UsbHidError};
use log::{error, warn};
use packed_struct::prelude::*;

/// Number of non-modifier keys that can be held at once
pub const KEY_SLOTS: usize = 6;

/// Size of a packed [`KeyReport`], excluding the report ID
pub const KEY_REPORT_LEN: usize = 8;

/// The persistent set of pressed keys, laid out as the HID keyboard input report
///
/// Byte 0 holds one bit per modifier, byte 1 is reserved and always zero, bytes 2..8 hold the
/// pressed key codes in the order they were pressed, with 0 marking an empty slot.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Default, PackedStruct)]
#[packed_struct(endian = "lsb", bit_numbering = "msb0", size_bytes = "8")]
pub struct KeyReport {
    #[packed_field(bytes = "0")]
    modifiers: u8,
    #[packed_field(bytes = "1")]
    reserved: u8,
    #[packed_field(bytes = "2..8", element_size_bits = "8")]
    keys: [u8; 6],
}

impl KeyReport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn modifiers(&self) -> u8 {
        self.modifiers
    }

    #[must_use]
    pub fn keys(&self) -> &[u8; KEY_SLOTS] {
        &self.keys
    }

    /// Number of occupied key slots
    #[must_use]
    pub fn pressed_keys(&self) -> usize {
        self.keys.iter().filter(|&&k| k != NO_KEY).count()
    }

    #[must_use]
    pub fn is_pressed(&self, code: u8) -> bool {
        if is_modifier(code) {
            modifier_bit(code).is_some_and(|bit| self.modifiers & bit != 0)
        } else {
            code != NO_KEY && self.keys.contains(&code)
        }
    }

    /// Add `code` to the report
    ///
    /// Modifiers set their bit. Standard keys already present are left where they are, new ones
    /// take the first empty slot. Fails with [`KeyboardError::ReportFull`] when all slots are
    /// taken by other keys, leaving the report untouched.
    ///
    /// Code 0 is the empty slot marker, so it counts as present while any slot is free and as a
    /// new key once the report is full.
    pub fn press(&mut self, code: u8) -> Result<(), KeyboardError> {
        if is_modifier(code) {
            match modifier_bit(code) {
                Some(bit) => self.modifiers |= bit,
                None => warn!("Ignoring press of {:X}, no modifier bit for it", code),
            }
            return Ok(());
        }

        if self.keys.contains(&code) {
            return Ok(());
        }

        let slot = self
            .keys
            .iter_mut()
            .find(|k| **k == NO_KEY)
            .ok_or(KeyboardError::ReportFull)?;
        *slot = code;
        Ok(())
    }

    /// Remove `code` from the report, releasing a key that isn't held is a no-op
    pub fn release(&mut self, code: u8) {
        if is_modifier(code) {
            if let Some(bit) = modifier_bit(code) {
                self.modifiers &= !bit;
            }
            return;
        }

        if code == NO_KEY {
            return;
        }

        // a key is only ever stored once, check every slot anyway
        for k in self.keys.iter_mut().filter(|k| **k == code) {
            *k = NO_KEY;
        }
    }

    pub fn release_all(&mut self) {
        self.modifiers = 0;
        self.keys = [NO_KEY; KEY_SLOTS];
    }

    pub fn to_bytes(&self) -> Result<[u8; KEY_REPORT_LEN], UsbHidError> {
        self.pack().map_err(|e| {
            error!("Error packing KeyReport: {:?}", e);
            UsbHidError::SerializationError
        })
    }
}
