//! The USB HID keyboard Prelude.
//!
//! The purpose of this module is to alleviate imports of structs and enums
//! required to instance the keyboard class:
//!
//! ```
//! # #![allow(unused_imports)]
//! use usbd_pure_keyboard::prelude::*;
//! ```

pub use crate::descriptor::{HidProtocol, KEYBOARD_REPORT_ID};
pub use crate::device::PureKeyboard;
pub use crate::interface::{KeyboardConfig, KeyboardInterface};
pub use crate::report::KeyReport;
pub use crate::{KeyboardError, UsbHidBuilderError, UsbHidError};
