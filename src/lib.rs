//! Six key rollover USB HID keyboard for [usb-device](https://crates.io/crates/usb-device).
//!
//! The crate keeps a persistent "currently pressed keys" report and sends it to the host every
//! time a key is pressed or released. Up to six non-modifier keys can be held at once, plus the
//! eight modifier keys which are carried as a bitmask.
//!
//! The report state machine ([`keyboard::Keyboard`]) only needs something implementing
//! [`keyboard::ReportSender`]. [`device::PureKeyboard`] pairs it with
//! [`interface::KeyboardInterface`] and can be polled as a `usb-device` class directly:
//!
//! ```rust,ignore
//! use usbd_pure_keyboard::key::KEY_LEFT_SHIFT;
//! use usbd_pure_keyboard::prelude::*;
//! use usb_device::prelude::*;
//!
//! let usb_alloc = UsbBusAllocator::new(usb_bus);
//!
//! let mut keyboard = PureKeyboard::new(&usb_alloc, KeyboardConfig::default());
//!
//! let mut usb_dev = UsbDeviceBuilder::new(&usb_alloc, UsbVidPid(0x1209, 0x0001))
//!     .strings(&[StringDescriptors::default().product("Keyboard")])
//!     .unwrap()
//!     .build();
//!
//! loop {
//!     if usb_dev.poll(&mut [&mut keyboard]) {
//!         continue;
//!     }
//!
//!     if button.is_low() {
//!         // shift + 'a'
//!         keyboard.press(KEY_LEFT_SHIFT).ok();
//!         keyboard.press(0x04).ok();
//!     } else {
//!         keyboard.release_all().ok();
//!     }
//! }
//! ```
//!
//! Every operation takes `&mut self`. If the keyboard is driven from an interrupt handler as well
//! as from thread mode, wrap the owning value in a `critical_section::Mutex<RefCell<_>>` (or an
//! RTIC resource) so each mutate-and-send sequence runs without being interrupted.

#![no_std]

//Allow the use of std in tests
#[cfg(test)]
#[macro_use]
extern crate std;

use usb_device::UsbError;

pub mod descriptor;
pub mod device;
pub mod interface;
pub mod key;
pub mod keyboard;
pub mod prelude;
pub mod report;

#[cfg(test)]
mod test_bus;

/// Errors raised while handing a report to the USB transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsbHidError {
    /// The endpoint is still busy with a previous report
    WouldBlock,
    UsbError(UsbError),
    SerializationError,
}

impl From<UsbError> for UsbHidError {
    fn from(e: UsbError) -> Self {
        match e {
            UsbError::WouldBlock => Self::WouldBlock,
            _ => Self::UsbError(e),
        }
    }
}

/// Configuration values that don't fit their descriptor fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsbHidBuilderError {
    ValueOverflow,
    SliceLengthOverflow,
}

pub type BuilderResult<B> = core::result::Result<B, UsbHidBuilderError>;

/// Errors returned by the keyboard operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyboardError {
    /// All six key slots hold other keys, the key was dropped and nothing was sent
    ReportFull,
    /// The report was updated but could not be sent
    Usb(UsbHidError),
}

impl From<UsbHidError> for KeyboardError {
    fn from(e: UsbHidError) -> Self {
        Self::Usb(e)
    }
}
