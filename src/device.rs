//! The keyboard as a USB class

use crate::interface::{KeyboardConfig, KeyboardInterface};
use crate::keyboard::Keyboard;
use crate::report::KeyReport;
use crate::{KeyboardError, UsbHidError};
use delegate::delegate;
use log::info;
#[allow(clippy::wildcard_imports)]
use usb_device::class_prelude::*;
use usb_device::LangID;

/// Six key rollover keyboard, sending report ID 2 on every change
///
/// Pass it to `UsbDevice::poll` like any other class. Pressing a seventh standard key fails with
/// [`KeyboardError::ReportFull`]. A failed send leaves the change in place, call
/// [`PureKeyboard::send_report`] to retry it.
pub struct PureKeyboard<'a, B: UsbBus> {
    keyboard: Keyboard<KeyboardInterface<'a, B>>,
}

impl<'a, B: UsbBus> PureKeyboard<'a, B> {
    pub fn new(usb_alloc: &'a UsbBusAllocator<B>, config: KeyboardConfig<'a>) -> Self {
        Self {
            keyboard: Keyboard::new(KeyboardInterface::new(usb_alloc, config)),
        }
    }

    delegate! {
        to self.keyboard {
            pub fn press(&mut self, code: u8) -> Result<(), KeyboardError>;
            pub fn release(&mut self, code: u8) -> Result<(), KeyboardError>;
            pub fn release_all(&mut self) -> Result<(), KeyboardError>;
            pub fn send_report(&mut self) -> Result<(), UsbHidError>;
            #[must_use]
            pub fn report(&self) -> &KeyReport;
            #[must_use]
            #[call(sender)]
            pub fn interface(&self) -> &KeyboardInterface<'a, B>;
        }
    }
}

impl<B: UsbBus> UsbClass<B> for PureKeyboard<'_, B> {
    fn get_configuration_descriptors(
        &self,
        writer: &mut DescriptorWriter,
    ) -> usb_device::Result<()> {
        self.keyboard.sender().get_configuration_descriptors(writer)
    }

    fn get_string(&self, index: StringIndex, lang_id: LangID) -> Option<&str> {
        self.keyboard.sender().get_string(index, lang_id)
    }

    fn reset(&mut self) {
        self.keyboard.sender_mut().reset();
        // the host forgets held keys on reset, nothing to send
        self.keyboard.clear();
        info!("Keyboard state cleared");
    }

    fn control_in(&mut self, transfer: ControlIn<B>) {
        self.keyboard.sender_mut().control_in(transfer);
    }

    fn control_out(&mut self, transfer: ControlOut<B>) {
        self.keyboard.sender_mut().control_out(transfer);
    }
}
