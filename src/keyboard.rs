//! Key report state manager

use crate::descriptor::KEYBOARD_REPORT_ID;
use crate::report::KeyReport;
use crate::{KeyboardError, UsbHidError};
use log::trace;

/// Something able to deliver an input report to the host
pub trait ReportSender {
    /// Send `data` tagged with `report_id`
    fn send_report(&mut self, report_id: u8, data: &[u8]) -> Result<(), UsbHidError>;
}

/// Tracks the pressed keys and sends the full report after every change
///
/// Every successful mutation is followed by a send, even when the report didn't actually change.
/// If the send fails the change is kept and the error is returned; the next send carries it.
pub struct Keyboard<S> {
    report: KeyReport,
    sender: S,
}

impl<S: ReportSender> Keyboard<S> {
    pub fn new(sender: S) -> Self {
        Self {
            report: KeyReport::new(),
            sender,
        }
    }

    /// Press `code` and send the report
    ///
    /// Returns [`KeyboardError::ReportFull`] without sending anything if `code` is a standard
    /// key, isn't already held and six other keys are.
    pub fn press(&mut self, code: u8) -> Result<(), KeyboardError> {
        self.report.press(code)?;
        trace!("Pressed {:X}", code);
        self.send_report()?;
        Ok(())
    }

    /// Release `code` and send the report
    pub fn release(&mut self, code: u8) -> Result<(), KeyboardError> {
        self.report.release(code);
        trace!("Released {:X}", code);
        self.send_report()?;
        Ok(())
    }

    /// Release every key and modifier and send the report
    pub fn release_all(&mut self) -> Result<(), KeyboardError> {
        self.report.release_all();
        trace!("Released all keys");
        self.send_report()?;
        Ok(())
    }

    /// Send the current report again without changing it
    pub fn send_report(&mut self) -> Result<(), UsbHidError> {
        let data = self.report.to_bytes()?;
        self.sender.send_report(KEYBOARD_REPORT_ID, &data)
    }

    /// Forget all pressed keys without sending anything
    pub fn clear(&mut self) {
        self.report.release_all();
    }

    #[must_use]
    pub fn report(&self) -> &KeyReport {
        &self.report
    }

    #[must_use]
    pub fn sender(&self) -> &S {
        &self.sender
    }

    pub fn sender_mut(&mut self) -> &mut S {
        &mut self.sender
    }
}

#[cfg(test)]
mod test {
    #![allow(clippy::unwrap_used)]

    use std::vec::Vec;

    use super::*;
    use crate::key::{KEY_LEFT_CTRL, KEY_LEFT_SHIFT};
    use crate::test_bus::init_logging;

    const KEY_A: u8 = 0x04;

    #[derive(Default)]
    struct RecordingSender {
        sent: Vec<(u8, Vec<u8>)>,
        fail_with: Option<UsbHidError>,
    }

    impl ReportSender for RecordingSender {
        fn send_report(&mut self, report_id: u8, data: &[u8]) -> Result<(), UsbHidError> {
            if let Some(e) = self.fail_with {
                return Err(e);
            }
            self.sent.push((report_id, data.to_vec()));
            Ok(())
        }
    }

    fn keyboard() -> Keyboard<RecordingSender> {
        init_logging();
        Keyboard::new(RecordingSender::default())
    }

    fn last_sent(keyboard: &Keyboard<RecordingSender>) -> &[u8] {
        &keyboard.sender().sent.last().unwrap().1
    }

    #[test]
    fn shift_a_scenario() {
        let mut keyboard = keyboard();

        keyboard.press(KEY_LEFT_SHIFT).unwrap();
        assert_eq!(keyboard.report().modifiers(), 0b0000_0010);
        assert_eq!(last_sent(&keyboard), &[0b10, 0, 0, 0, 0, 0, 0, 0]);

        keyboard.press(KEY_A).unwrap();
        assert_eq!(keyboard.report().keys(), &[KEY_A, 0, 0, 0, 0, 0]);
        assert_eq!(last_sent(&keyboard), &[0b10, 0, KEY_A, 0, 0, 0, 0, 0]);

        keyboard.press(KEY_A).unwrap();
        assert_eq!(keyboard.report().keys(), &[KEY_A, 0, 0, 0, 0, 0]);

        keyboard.release(KEY_A).unwrap();
        assert_eq!(keyboard.report().keys(), &[0; 6]);
        assert_eq!(keyboard.report().modifiers(), 0b0000_0010);

        keyboard.release_all().unwrap();
        assert_eq!(keyboard.report().modifiers(), 0);
        assert_eq!(last_sent(&keyboard), &[0; 8]);

        assert_eq!(keyboard.sender().sent.len(), 5);
    }

    #[test]
    fn every_report_uses_the_keyboard_report_id() {
        let mut keyboard = keyboard();
        keyboard.press(KEY_A).unwrap();
        keyboard.release(KEY_A).unwrap();
        keyboard.release_all().unwrap();

        assert!(keyboard
            .sender()
            .sent
            .iter()
            .all(|(id, data)| *id == KEYBOARD_REPORT_ID && data.len() == 8));
    }

    #[test]
    fn repeated_press_sends_identical_reports() {
        let mut keyboard = keyboard();
        keyboard.press(KEY_A).unwrap();
        keyboard.press(KEY_A).unwrap();

        let sent = &keyboard.sender().sent;
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0], sent[1]);
    }

    #[test]
    fn release_of_absent_key_still_sends() {
        let mut keyboard = keyboard();
        keyboard.release(KEY_A).unwrap();
        keyboard.release(KEY_LEFT_CTRL).unwrap();

        assert_eq!(keyboard.sender().sent.len(), 2);
        assert_eq!(last_sent(&keyboard), &[0; 8]);
    }

    #[test]
    fn full_report_drops_key_without_sending() {
        let mut keyboard = keyboard();
        for k in 0x04..0x0A {
            keyboard.press(k).unwrap();
        }
        assert_eq!(keyboard.sender().sent.len(), 6);

        assert_eq!(keyboard.press(0x20), Err(KeyboardError::ReportFull));
        assert_eq!(keyboard.sender().sent.len(), 6);
        assert_eq!(
            keyboard.report().keys(),
            &[0x04, 0x05, 0x06, 0x07, 0x08, 0x09]
        );
    }

    #[test]
    fn zero_on_full_report_is_not_sent() {
        let mut keyboard = keyboard();
        for k in 0x04..0x0A {
            keyboard.press(k).unwrap();
        }

        assert_eq!(keyboard.press(0), Err(KeyboardError::ReportFull));
        assert_eq!(keyboard.sender().sent.len(), 6);
    }

    #[test]
    fn zero_with_free_slot_is_sent() {
        let mut keyboard = keyboard();
        keyboard.press(KEY_A).unwrap();
        keyboard.press(0).unwrap();

        assert_eq!(keyboard.sender().sent.len(), 2);
        assert_eq!(last_sent(&keyboard), &[0, 0, KEY_A, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn slot_count_never_exceeds_six() {
        let mut keyboard = keyboard();
        for k in 0x04..0x40 {
            keyboard.press(k).ok();
            if k % 3 == 0 {
                keyboard.release(k - 2).unwrap();
            }
            assert!(keyboard.report().pressed_keys() <= 6);
        }
    }

    #[test]
    fn send_failure_keeps_state() {
        let mut keyboard = keyboard();
        keyboard.sender_mut().fail_with = Some(UsbHidError::WouldBlock);

        assert_eq!(
            keyboard.press(KEY_A),
            Err(KeyboardError::Usb(UsbHidError::WouldBlock))
        );
        assert!(keyboard.report().is_pressed(KEY_A));

        keyboard.sender_mut().fail_with = None;
        keyboard.send_report().unwrap();
        assert_eq!(last_sent(&keyboard), &[0, 0, KEY_A, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn clear_does_not_send() {
        let mut keyboard = keyboard();
        keyboard.press(KEY_A).unwrap();
        keyboard.clear();

        assert_eq!(keyboard.sender().sent.len(), 1);
        assert_eq!(keyboard.report().pressed_keys(), 0);
    }
}
