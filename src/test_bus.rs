//! In-memory bus playing the host side in tests
//!
//! Every IN endpoint shares one pipe towards the host. A write fails with `WouldBlock` until the
//! host takes what is already there, the same back pressure a real interrupt endpoint gives.
#![allow(clippy::unwrap_used)]

use std::sync::{Mutex, MutexGuard};
use std::vec::Vec;

use env_logger::Env;
use log::SetLoggerError;
use usb_device::bus::{PollResult, UsbBus};
use usb_device::endpoint::{EndpointAddress, EndpointType};
use usb_device::{UsbDirection, UsbError};

/// bmRequestType values
pub(crate) const STANDARD_DEVICE_IN: u8 = 0x80;
pub(crate) const STANDARD_INTERFACE_IN: u8 = 0x81;
pub(crate) const CLASS_IN: u8 = 0xA1;
pub(crate) const CLASS_OUT: u8 = 0x21;

pub(crate) fn init_logging() {
    let _: Result<(), SetLoggerError> =
        env_logger::Builder::from_env(Env::default().default_filter_or("trace"))
            .is_test(true)
            .try_init();
}

/// Build a SETUP packet
pub(crate) fn setup(request_type: u8, request: u8, value: u16, index: u16, length: u16) -> [u8; 8] {
    let [value_lo, value_hi] = value.to_le_bytes();
    let [index_lo, index_hi] = index.to_le_bytes();
    let [length_lo, length_hi] = length.to_le_bytes();
    [
        request_type,
        request,
        value_lo,
        value_hi,
        index_lo,
        index_hi,
        length_lo,
        length_hi,
    ]
}

#[derive(Default)]
struct Pipes {
    setup: Option<[u8; 8]>,
    to_host: Vec<u8>,
}

#[derive(Default)]
pub(crate) struct Host {
    pipes: Mutex<Pipes>,
}

impl Host {
    fn pipes(&self) -> MutexGuard<'_, Pipes> {
        self.pipes.lock().unwrap()
    }

    pub(crate) fn send_setup(&self, packet: [u8; 8]) {
        let mut pipes = self.pipes();
        assert!(pipes.setup.is_none(), "previous SETUP not consumed");
        pipes.setup = Some(packet);
    }

    /// Collect the packet waiting on the IN pipe, empty if there is none
    pub(crate) fn take_in(&self) -> Vec<u8> {
        core::mem::take(&mut self.pipes().to_host)
    }
}

pub(crate) struct TestBus<'h> {
    host: &'h Host,
    allocated: usize,
}

impl<'h> TestBus<'h> {
    pub(crate) fn new(host: &'h Host) -> Self {
        Self { host, allocated: 0 }
    }
}

impl UsbBus for TestBus<'_> {
    fn alloc_ep(
        &mut self,
        ep_dir: UsbDirection,
        _ep_addr: Option<EndpointAddress>,
        _ep_type: EndpointType,
        _max_packet_size: u16,
        _interval: u8,
    ) -> usb_device::Result<EndpointAddress> {
        let address = EndpointAddress::from_parts(self.allocated, ep_dir);
        self.allocated += 1;
        Ok(address)
    }

    fn enable(&mut self) {}

    fn reset(&self) {}

    fn set_device_address(&self, _addr: u8) {}

    fn write(&self, _ep_addr: EndpointAddress, buf: &[u8]) -> usb_device::Result<usize> {
        let mut pipes = self.host.pipes();
        if !pipes.to_host.is_empty() {
            return Err(UsbError::WouldBlock);
        }
        pipes.to_host.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn read(&self, _ep_addr: EndpointAddress, buf: &mut [u8]) -> usb_device::Result<usize> {
        let packet = self.host.pipes().setup.take().ok_or(UsbError::WouldBlock)?;
        buf[..packet.len()].copy_from_slice(&packet);
        Ok(packet.len())
    }

    fn set_stalled(&self, _ep_addr: EndpointAddress, _stalled: bool) {}

    fn is_stalled(&self, _ep_addr: EndpointAddress) -> bool {
        false
    }

    fn suspend(&self) {}

    fn resume(&self) {}

    fn poll(&self) -> PollResult {
        PollResult::Data {
            ep_out: 0,
            ep_in_complete: 1,
            ep_setup: u16::from(self.host.pipes().setup.is_some()),
        }
    }
}
