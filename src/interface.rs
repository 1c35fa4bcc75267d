//! The keyboard's HID interface on a [`usb_device`] bus
//!
//! [`KeyboardInterface`] owns the interrupt IN endpoint and answers the HID class requests a
//! host sends to a keyboard. It keeps the last report that made it onto the endpoint so
//! GET_REPORT can repeat it.
use crate::descriptor::{
    DescriptorType, HidDescriptor, HidProtocol, HidRequest, HID_DESCRIPTOR_LEN,
    INTERFACE_CLASS_HID, INTERFACE_NO_BOOT, KEYBOARD_REPORT_DESCRIPTOR, KEYBOARD_REPORT_ID,
};
use crate::keyboard::ReportSender;
use crate::{BuilderResult, UsbHidBuilderError, UsbHidError};
use fugit::{ExtU32, MillisDurationU32};
use heapless::Vec;
use log::{error, info, trace, warn};
use packed_struct::prelude::*;
#[allow(clippy::wildcard_imports)]
use usb_device::class_prelude::*;
use usb_device::control::{Recipient, Request, RequestType};
use usb_device::device::DEFAULT_ALTERNATE_SETTING;
use usb_device::LangID;

/// Largest input report, report ID included, the interface can send
pub const MAX_INPUT_REPORT_LEN: usize = 16;

/// Idle rates travel in units of 4ms
const IDLE_UNIT_MS: u32 = 4;

/// Settings for a [`KeyboardInterface`], consumed when the interface is allocated
#[must_use = "this `KeyboardConfig` must be passed to `PureKeyboard::new()`"]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyboardConfig<'a> {
    report_descriptor: &'a [u8],
    report_descriptor_len: u16,
    description: Option<&'a str>,
    poll_interval_ms: u8,
    idle_default: u8,
}

impl Default for KeyboardConfig<'_> {
    /// Report ID 2 keyboard named "Keyboard", polled every 10ms, idle 0 (infinite)
    fn default() -> Self {
        #[allow(clippy::cast_possible_truncation)]
        const LEN: u16 = {
            assert!(KEYBOARD_REPORT_DESCRIPTOR.len() <= u16::MAX as usize);
            KEYBOARD_REPORT_DESCRIPTOR.len() as u16
        };

        Self {
            report_descriptor: KEYBOARD_REPORT_DESCRIPTOR,
            report_descriptor_len: LEN,
            description: Some("Keyboard"),
            poll_interval_ms: 10,
            idle_default: 0,
        }
    }
}

impl<'a> KeyboardConfig<'a> {
    /// Replace the report descriptor, it must still describe report ID 2 with the 8 byte layout
    pub fn report_descriptor(mut self, report_descriptor: &'a [u8]) -> BuilderResult<Self> {
        self.report_descriptor_len = u16::try_from(report_descriptor.len())
            .map_err(|_| UsbHidBuilderError::SliceLengthOverflow)?;
        self.report_descriptor = report_descriptor;
        Ok(self)
    }

    pub fn description(mut self, description: &'a str) -> Self {
        self.description = Some(description);
        self
    }

    pub fn poll_interval(mut self, interval: MillisDurationU32) -> BuilderResult<Self> {
        self.poll_interval_ms =
            u8::try_from(interval.to_millis()).map_err(|_| UsbHidBuilderError::ValueOverflow)?;
        Ok(self)
    }

    /// Idle rate restored on every bus reset, 0 means reports are only sent on change
    pub fn idle_default(mut self, idle: MillisDurationU32) -> BuilderResult<Self> {
        let units = match idle.to_millis() {
            0 => 0,
            // shorter than one unit but not infinite
            ms if ms < IDLE_UNIT_MS => 1,
            ms => ms / IDLE_UNIT_MS,
        };
        self.idle_default = u8::try_from(units).map_err(|_| UsbHidBuilderError::ValueOverflow)?;
        Ok(self)
    }
}

fn idle_duration(units: u8) -> MillisDurationU32 {
    (u32::from(units) * IDLE_UNIT_MS).millis()
}

/// HID interface with a single interrupt IN endpoint
pub struct KeyboardInterface<'a, B: UsbBus> {
    config: KeyboardConfig<'a>,
    number: InterfaceNumber,
    endpoint: EndpointIn<'a, B>,
    description_index: Option<StringIndex>,
    protocol: HidProtocol,
    idle: u8,
    /// Set when the host picked a rate for the keyboard report ID alone
    report_idle: Option<u8>,
    last_report: Vec<u8, MAX_INPUT_REPORT_LEN>,
}

impl<'a, B: UsbBus> KeyboardInterface<'a, B> {
    pub fn new(usb_alloc: &'a UsbBusAllocator<B>, config: KeyboardConfig<'a>) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        let endpoint = usb_alloc.interrupt(MAX_INPUT_REPORT_LEN as u16, config.poll_interval_ms);

        Self {
            number: usb_alloc.interface(),
            description_index: config.description.map(|_| usb_alloc.string()),
            endpoint,
            // HID 1.11 section 7.2.6, devices start in report protocol
            protocol: HidProtocol::Report,
            idle: config.idle_default,
            report_idle: None,
            last_report: Vec::new(),
            config,
        }
    }

    #[must_use]
    pub fn protocol(&self) -> HidProtocol {
        self.protocol
    }

    /// Idle rate applying to every report without its own rate
    #[must_use]
    pub fn idle(&self) -> MillisDurationU32 {
        idle_duration(self.idle)
    }

    #[must_use]
    pub fn report_idle(&self) -> Option<MillisDurationU32> {
        self.report_idle.map(idle_duration)
    }

    /// The last report written to the endpoint, report ID first
    #[must_use]
    pub fn last_report(&self) -> Option<&[u8]> {
        if self.last_report.is_empty() {
            None
        } else {
            Some(&self.last_report)
        }
    }

    fn idle_for(&self, report_id: u8) -> u8 {
        match self.report_idle {
            Some(idle) if report_id == KEYBOARD_REPORT_ID => idle,
            _ => self.idle,
        }
    }

    fn set_idle(&mut self, report_id: u8, idle: u8) {
        match report_id {
            // applies to all reports, HID 1.11 section 7.2.4
            0 => {
                self.idle = idle;
                self.report_idle = None;
                info!("Idle set to {} for all reports", idle);
            }
            KEYBOARD_REPORT_ID => {
                self.report_idle = Some(idle);
                info!("Idle set to {} for ID{}", idle, report_id);
            }
            _ => warn!("Ignoring idle {} for unknown report ID{}", idle, report_id),
        }
    }

    fn hid_descriptor(&self) -> Option<[u8; HID_DESCRIPTOR_LEN]> {
        HidDescriptor::for_report(self.config.report_descriptor_len)
            .pack()
            .map_err(|e| error!("Failed to pack HID descriptor - {:?}", e))
            .ok()
    }

    fn is_for_us(&self, request: &Request) -> bool {
        request.recipient == Recipient::Interface
            && request.index == u16::from(u8::from(self.number))
    }

    fn standard_in(&self, transfer: ControlIn<B>) {
        let request = transfer.request();
        if request.request != Request::GET_DESCRIPTOR {
            return;
        }

        let [_, descriptor_type] = request.value.to_le_bytes();
        let result = match DescriptorType::try_from(descriptor_type) {
            Ok(DescriptorType::Report) => transfer.accept_with(self.config.report_descriptor),
            Ok(DescriptorType::Hid) => match self.hid_descriptor() {
                Some(descriptor) => transfer.accept_with(&descriptor),
                None => transfer.reject(),
            },
            Err(_) => {
                trace!("Leaving descriptor type {:X} to the device", descriptor_type);
                return;
            }
        };

        if let Err(e) = result {
            error!("Failed to send descriptor {:X} - {:?}", descriptor_type, e);
        }
    }

    fn class_in(&self, transfer: ControlIn<B>) {
        let request = transfer.request();
        let code = request.request;
        let [report_id, _] = request.value.to_le_bytes();

        let result = match HidRequest::try_from(code) {
            Ok(HidRequest::GetReport) => match self.last_report() {
                Some(report) if report[0] == report_id => transfer.accept_with(report),
                _ => {
                    warn!("No input report ID{} to return", report_id);
                    transfer.reject()
                }
            },
            Ok(HidRequest::GetIdle) => transfer.accept_with(&[self.idle_for(report_id)]),
            Ok(HidRequest::GetProtocol) => transfer.accept_with(&[self.protocol.into()]),
            _ => {
                warn!("Rejecting class request {:X}", code);
                transfer.reject()
            }
        };

        if let Err(e) = result {
            error!("Class request {:X} failed - {:?}", code, e);
        }
    }
}

impl<B: UsbBus> UsbClass<B> for KeyboardInterface<'_, B> {
    fn get_configuration_descriptors(
        &self,
        writer: &mut DescriptorWriter,
    ) -> usb_device::Result<()> {
        writer.interface_alt(
            self.number,
            DEFAULT_ALTERNATE_SETTING,
            INTERFACE_CLASS_HID,
            INTERFACE_NO_BOOT,
            INTERFACE_NO_BOOT,
            self.description_index,
        )?;

        // HID 1.11 appendix F.3: interface, then HID, then endpoint
        let hid = self.hid_descriptor().ok_or(UsbError::ParseError)?;
        writer.write(DescriptorType::Hid.into(), &hid[2..])?;
        writer.endpoint(&self.endpoint)
    }

    fn get_string(&self, index: StringIndex, _lang_id: LangID) -> Option<&str> {
        if self.description_index == Some(index) {
            self.config.description
        } else {
            None
        }
    }

    fn reset(&mut self) {
        self.protocol = HidProtocol::Report;
        self.idle = self.config.idle_default;
        self.report_idle = None;
        self.last_report.clear();
        info!("Interface {} reset", u8::from(self.number));
    }

    fn control_in(&mut self, transfer: ControlIn<B>) {
        let request = transfer.request();
        if !self.is_for_us(request) {
            return;
        }

        let kind = request.request_type;
        match kind {
            RequestType::Standard => self.standard_in(transfer),
            RequestType::Class => self.class_in(transfer),
            _ => {}
        }
    }

    fn control_out(&mut self, transfer: ControlOut<B>) {
        let request = transfer.request();
        if request.request_type != RequestType::Class || !self.is_for_us(request) {
            return;
        }

        let code = request.request;
        let [low, high] = request.value.to_le_bytes();
        let accepted = match HidRequest::try_from(code) {
            Ok(HidRequest::SetIdle) => {
                self.set_idle(low, high);
                true
            }
            Ok(HidRequest::SetProtocol) => match HidProtocol::try_from(low) {
                Ok(protocol) => {
                    self.protocol = protocol;
                    info!("Protocol set to {:?}", protocol);
                    true
                }
                Err(_) => {
                    warn!("Unknown protocol {}", low);
                    false
                }
            },
            // SET_REPORT included, the descriptor has no output or feature report
            _ => {
                warn!("Rejecting class request {:X}", code);
                false
            }
        };

        let result = if accepted {
            transfer.accept()
        } else {
            transfer.reject()
        };
        if let Err(e) = result {
            error!("Class request {:X} failed - {:?}", code, e);
        }
    }
}

impl<B: UsbBus> ReportSender for KeyboardInterface<'_, B> {
    fn send_report(&mut self, report_id: u8, data: &[u8]) -> Result<(), UsbHidError> {
        let mut framed: Vec<u8, MAX_INPUT_REPORT_LEN> = Vec::new();
        if framed.push(report_id).is_err() || framed.extend_from_slice(data).is_err() {
            error!("Report ID{} too long, {} bytes", report_id, data.len());
            return Err(UsbError::BufferOverflow.into());
        }

        let written = self.endpoint.write(&framed).map_err(|e| {
            trace!("Report ID{} not sent - {:?}", report_id, e);
            UsbHidError::from(e)
        })?;
        trace!("Sent report ID{}, {} bytes", report_id, written);

        // only a report the host could have seen is repeated by GET_REPORT
        self.last_report = framed;
        Ok(())
    }
}
