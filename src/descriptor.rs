//! Keyboard interface descriptors and HID request codes
use num_enum::{IntoPrimitive, TryFromPrimitive};
use packed_struct::prelude::*;

/// Report ID carried by every keyboard input report
pub const KEYBOARD_REPORT_ID: u8 = 2;

/// Keyboard report descriptor
///
/// One input report, ID [`KEYBOARD_REPORT_ID`]: a byte of modifier bits (usages 224-231), a
/// constant reserved byte and an array of six key usages in the range 0-101.
#[rustfmt::skip]
pub const KEYBOARD_REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x01,                 // Usage Page (Generic Desktop),
    0x09, 0x06,                 // Usage (Keyboard),
    0xA1, 0x01,                 // Collection (Application),
    0x85, KEYBOARD_REPORT_ID,   //     Report ID (2),
    0x05, 0x07,                 //     Usage Page (Key Codes),
    0x19, 0xE0,                 //     Usage Minimum (224),
    0x29, 0xE7,                 //     Usage Maximum (231),
    0x15, 0x00,                 //     Logical Minimum (0),
    0x25, 0x01,                 //     Logical Maximum (1),
    0x75, 0x01,                 //     Report Size (1),
    0x95, 0x08,                 //     Report Count (8),
    0x81, 0x02,                 //     Input (Data, Variable, Absolute), ;Modifier byte
    0x95, 0x01,                 //     Report Count (1),
    0x75, 0x08,                 //     Report Size (8),
    0x81, 0x03,                 //     Input (Constant, Variable, Absolute), ;Reserved byte
    0x95, 0x06,                 //     Report Count (6),
    0x75, 0x08,                 //     Report Size (8),
    0x15, 0x00,                 //     Logical Minimum (0),
    0x25, 0x65,                 //     Logical Maximum (101),
    0x05, 0x07,                 //     Usage Page (Key Codes),
    0x19, 0x00,                 //     Usage Minimum (0),
    0x29, 0x65,                 //     Usage Maximum (101),
    0x81, 0x00,                 //     Input (Data, Array, Absolute), ;Key array
    0xC0,                       // End Collection
];

/// bInterfaceClass for HID
pub(crate) const INTERFACE_CLASS_HID: u8 = 0x03;
/// Not a boot device, so both subclass and protocol are zero
pub(crate) const INTERFACE_NO_BOOT: u8 = 0x00;

pub(crate) const HID_DESCRIPTOR_LEN: usize = 9;

/// Class specific descriptor types, the high byte of a GET_DESCRIPTOR value
#[derive(Debug, Clone, Copy, PartialEq, Eq, PrimitiveEnum, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub(crate) enum DescriptorType {
    Hid = 0x21,
    Report = 0x22,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum HidProtocol {
    Boot = 0x00,
    Report = 0x01,
}

/// bRequest values of HID class requests
#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub(crate) enum HidRequest {
    GetReport = 0x01,
    GetIdle = 0x02,
    GetProtocol = 0x03,
    SetReport = 0x09,
    SetIdle = 0x0A,
    SetProtocol = 0x0B,
}

/// HID class descriptor announcing a single report descriptor, HID 1.11 section 6.2.1
#[derive(Debug, Clone, Copy, PartialEq, Eq, PackedStruct)]
#[packed_struct(endian = "lsb", bit_numbering = "msb0", size_bytes = "9")]
pub(crate) struct HidDescriptor {
    #[packed_field(bytes = "0")]
    length: u8,
    #[packed_field(bytes = "1", ty = "enum")]
    descriptor_type: DescriptorType,
    #[packed_field(bytes = "2..=3")]
    bcd_hid: u16,
    #[packed_field(bytes = "4")]
    country_code: u8,
    #[packed_field(bytes = "5")]
    num_descriptors: u8,
    #[packed_field(bytes = "6", ty = "enum")]
    report_type: DescriptorType,
    #[packed_field(bytes = "7..=8")]
    report_length: u16,
}

impl HidDescriptor {
    /// HID 1.11, no localization
    pub(crate) fn for_report(report_length: u16) -> Self {
        Self {
            length: 9,
            descriptor_type: DescriptorType::Hid,
            bcd_hid: 0x0111,
            country_code: 0,
            num_descriptors: 1,
            report_type: DescriptorType::Report,
            report_length,
        }
    }
}
