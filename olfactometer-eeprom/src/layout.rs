// SPDX-License-Identifier: Apache-2.0
// Copyright © 2026 Olfactometer developers

//! Layout of the Olfactometer EEPROM.
//!
//! The EEPROM is written as 16-byte records. There are 128 record slots (2 KiB), all of them
//! erased (`0xFF`) except for the serial number in the first record and the calibration block
//! starting at slot 100. The calibration block holds one 32-byte row for each of the six
//! channels, with every value stored high byte first.
use core::fmt;

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::util::WORD_SIZE;

/// The number of bytes in one image record.
pub const RECORD_LENGTH: usize = 16;

/// The number of record slots in the EEPROM.
pub const RECORD_SLOTS: usize = 128;

/// The size of the EEPROM in bytes.
pub const EEPROM_LENGTH: usize = RECORD_SLOTS * RECORD_LENGTH;

/// The record slot the calibration block starts at.
pub const CALIBRATION_BASE_SLOT: usize = 100;

/// The number of calibration rows (one per channel) in the calibration block.
pub const CALIBRATION_ROWS: usize = 6;

/// The number of values in a calibration row.
pub const WORDS_PER_ROW: usize = 16;

/// The number of values in one record.
pub const WORDS_PER_RECORD: usize = RECORD_LENGTH / WORD_SIZE;

/// The number of bytes a calibration row occupies.
pub const ROW_LENGTH: usize = WORDS_PER_ROW * WORD_SIZE;

/// The number of values in each row that the firmware actually loads.
pub const FIRMWARE_VALUES_PER_CHANNEL: usize = 11;

/// Contents of every record that isn't otherwise written.
pub const FILLER: [u8; RECORD_LENGTH] = [0xFF; RECORD_LENGTH];

/// Named locations within the EEPROM.
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, IntoPrimitive, TryFromPrimitive)]
#[repr(u16)]
pub enum EepromAddress {
    Base = 0x0000,

    /// The serial number, high byte first. Erased (`0xFFFF`) when no serial number was given.
    SerialNumber = 0x0004,

    /// The first calibration row. The firmware reads each channel from here in 32 byte steps.
    CalibrationStart = 0x0640,

    /// One past the last byte of the EEPROM.
    End = 0x0800,
}

impl EepromAddress {
    pub fn byte_offset(&self) -> usize {
        u16::from(*self) as usize
    }

    /// The byte offset of the calibration row for `channel`.
    pub fn calibration_row(channel: usize) -> usize {
        Self::CalibrationStart.byte_offset() + channel * ROW_LENGTH
    }
}

/// A 16-bit record address.
#[derive(Clone, Copy, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct Address(u16);

impl Address {
    /// Wrap the given address in an `Address`.
    pub const fn new(address: u16) -> Self {
        Self(address)
    }

    /// The address of a record slot.
    ///
    /// Like the addresses in the Intel-HEX data records, this wraps at 16 bits.
    pub const fn of_slot(slot: usize) -> Self {
        Self((slot * RECORD_LENGTH) as u16)
    }

    pub(crate) fn as_bytes(&self) -> [u8; 2] {
        self.0.to_be_bytes()
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({:#06X})", self.0)
    }
}

impl From<u16> for Address {
    fn from(raw_address: u16) -> Self {
        Self::new(raw_address)
    }
}

impl From<EepromAddress> for Address {
    fn from(address: EepromAddress) -> Self {
        Self::new(address.into())
    }
}

impl From<Address> for u16 {
    fn from(address: Address) -> Self {
        address.0
    }
}

impl From<Address> for usize {
    fn from(address: Address) -> Self {
        address.0 as usize
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn calibration_block_location() {
        assert_eq!(
            Address::of_slot(CALIBRATION_BASE_SLOT),
            Address::from(EepromAddress::CalibrationStart)
        );
        // The firmware reads channel n from 1600 + 32 * n
        assert_eq!(EepromAddress::calibration_row(0), 1600);
        assert_eq!(EepromAddress::calibration_row(5), 1760);
    }

    #[test]
    fn eeprom_size() {
        assert_eq!(EEPROM_LENGTH, EepromAddress::End.byte_offset());
        assert_eq!(WORDS_PER_RECORD * 2, WORDS_PER_ROW);
    }

    #[test]
    fn address_from_raw() {
        assert_eq!(
            EepromAddress::try_from(0x0004u16).ok(),
            Some(EepromAddress::SerialNumber)
        );
        assert!(EepromAddress::try_from(0x0005u16).is_err());
    }

    #[test]
    fn address_debug() {
        assert_eq!(format!("{:?}", Address::of_slot(100)), "Address(0x0640)");
        assert_eq!(Address::new(0x0640).as_bytes(), [0x06, 0x40]);
    }
}
