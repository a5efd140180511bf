// SPDX-License-Identifier: Apache-2.0
// Copyright © 2026 Olfactometer developers

//! Intel-HEX encoding.
//!
//! Each record is one line: a `:` start code followed by hexadecimal digit pairs for the byte
//! count, the 16-bit address (high byte first), the record type, the data and a checksum. The
//! checksum is the two's complement of the sum of every other byte in the record, so all of a
//! record's bytes add up to zero (mod 256).
//!
//! Only data and end-of-file records are ever written. Images are written with uppercase digits
//! and no byte-order mark.
use std::io::{self, BufRead, Write};

use arrayvec::ArrayVec;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use tracing::{debug, trace};

use crate::error::HexError;
use crate::image::EepromImage;
use crate::layout::Address;
use crate::util::{parse_digits, Buffer};

/// The most data bytes a record can hold.
pub const MAX_DATA_LENGTH: usize = u8::MAX as usize;

/// Byte count, two address bytes and the record type.
const HEADER_LENGTH: usize = 4;

const MAX_RECORD_LENGTH: usize = HEADER_LENGTH + MAX_DATA_LENGTH + 1;

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

#[derive(Clone, Copy, Debug, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum RecordType {
    Data = 0x00,
    EndOfFile = 0x01,
    ExtendedSegmentAddress = 0x02,
    StartSegmentAddress = 0x03,
    ExtendedLinearAddress = 0x04,
    StartLinearAddress = 0x05,
}

/// The line terminator written after each record.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum LineEnding {
    #[default]
    #[cfg_attr(feature = "cli", value(name = "crlf"))]
    CrLf,

    #[cfg_attr(feature = "cli", value(name = "lf"))]
    Lf,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::CrLf => "\r\n",
            LineEnding::Lf => "\n",
        }
    }
}

/// A single Intel-HEX record.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HexRecord {
    pub record_type: RecordType,
    pub address: Address,
    pub data: ArrayVec<u8, MAX_DATA_LENGTH>,
}

impl HexRecord {
    pub fn end_of_file() -> Self {
        Self {
            record_type: RecordType::EndOfFile,
            address: Address::new(0),
            data: ArrayVec::new(),
        }
    }

    /// Format this record as a line of text, without the line ending.
    pub fn to_line(&self) -> String {
        format_record(self.record_type, self.address, &self.data)
    }
}

/// Compute the checksum for the given record bytes.
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes
        .iter()
        .fold(0u8, |sum, byte| sum.wrapping_add(*byte))
        .wrapping_neg()
}

/// `data` must be at most [`MAX_DATA_LENGTH`] bytes long.
fn format_record(record_type: RecordType, address: Address, data: &[u8]) -> String {
    debug_assert!(data.len() <= MAX_DATA_LENGTH);
    let mut bytes: ArrayVec<u8, MAX_RECORD_LENGTH> = ArrayVec::new();
    bytes.push(data.len() as u8);
    bytes.extend(address.as_bytes());
    bytes.push(record_type.into());
    bytes.extend(data.iter().copied().take(MAX_DATA_LENGTH));
    bytes.push(checksum(&bytes));

    let mut line = String::with_capacity(1 + bytes.len() * 2);
    line.push(':');
    for byte in bytes {
        line.push(HEX_DIGITS[usize::from(byte >> 4)] as char);
        line.push(HEX_DIGITS[usize::from(byte & 0x0F)] as char);
    }
    line
}

/// Write an image as Intel-HEX, one data record per image record, in image order.
pub fn write_image<W: Write>(
    image: &EepromImage,
    mut writer: W,
    line_ending: LineEnding,
) -> io::Result<()> {
    let line_ending = line_ending.as_str().as_bytes();
    for record in image.records() {
        let line = format_record(RecordType::Data, record.address(), record.data());
        writer.write_all(line.as_bytes())?;
        writer.write_all(line_ending)?;
    }
    writer.write_all(HexRecord::end_of_file().to_line().as_bytes())?;
    writer.write_all(line_ending)?;
    debug!(records = image.records().len(), "wrote Intel-HEX image");
    Ok(())
}

/// Read every record up to and including the end-of-file record.
///
/// Both CRLF and LF line endings are accepted and blank lines are skipped.
pub fn read_records<R: BufRead>(reader: R) -> Result<Vec<HexRecord>, HexError> {
    let mut records = Vec::new();
    let mut end_of_file = false;
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = index + 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if end_of_file {
            return Err(HexError::DataAfterEndOfFile { line: line_number });
        }
        let record = parse_line(line, line_number)?;
        trace!(line = line_number, record = ?record, "read record");
        end_of_file = record.record_type == RecordType::EndOfFile;
        records.push(record);
    }
    if end_of_file {
        debug!(records = records.len(), "read Intel-HEX records");
        Ok(records)
    } else {
        Err(HexError::MissingEndOfFile)
    }
}

fn parse_line(line: &str, line_number: usize) -> Result<HexRecord, HexError> {
    let digits = line
        .strip_prefix(':')
        .ok_or(HexError::MissingStartCode { line: line_number })?;
    if !digits.is_ascii() {
        return Err(HexError::InvalidDigit { line: line_number });
    }
    if digits.len() % 2 != 0 {
        return Err(HexError::Truncated { line: line_number });
    }
    let mut bytes: ArrayVec<u8, MAX_RECORD_LENGTH> = ArrayVec::new();
    for pair in digits.as_bytes().chunks_exact(2) {
        // Already checked for ASCII, so every pair is a valid str
        let pair = std::str::from_utf8(pair)
            .map_err(|_| HexError::InvalidDigit { line: line_number })?;
        let byte =
            parse_digits(pair, 16).ok_or(HexError::InvalidDigit { line: line_number })?;
        if bytes.try_push(byte).is_err() {
            return Err(HexError::LengthMismatch {
                line: line_number,
                declared: usize::from(bytes[0]),
                actual: digits.len() / 2 - HEADER_LENGTH - 1,
            });
        }
    }
    if bytes.len() < HEADER_LENGTH + 1 {
        return Err(HexError::Truncated { line: line_number });
    }

    let (body, stored_checksum) = bytes.split_at(bytes.len() - 1);
    let mut buf = body;
    let declared = usize::from(buf.get_u8());
    let address = buf.get_u16();
    let raw_type = buf.get_u8();
    if declared != buf.len() {
        return Err(HexError::LengthMismatch {
            line: line_number,
            declared,
            actual: buf.len(),
        });
    }
    let expected = checksum(body);
    if expected != stored_checksum[0] {
        return Err(HexError::Checksum {
            line: line_number,
            expected,
            actual: stored_checksum[0],
        });
    }
    let record_type =
        RecordType::try_from(raw_type).map_err(|_| HexError::UnknownRecordType {
            line: line_number,
            record_type: raw_type,
        })?;
    match record_type {
        RecordType::Data | RecordType::EndOfFile => {
            let mut data = ArrayVec::new();
            // buf is at most MAX_DATA_LENGTH long, as the byte count is a single byte
            data.extend(buf.iter().copied());
            Ok(HexRecord {
                record_type,
                address: address.into(),
                data,
            })
        }
        _ => Err(HexError::UnsupportedRecordType {
            line: line_number,
            record_type,
        }),
    }
}

#[cfg(test)]
mod test {
    use std::io::BufReader;

    use olfactometer_eeprom_test_data::{SERIALIZED_HEX, SIMPLE_HEX};

    use super::*;

    #[test]
    fn checksum_examples() {
        // Examples from the Wikipedia article on Intel-HEX
        let record = b"\x03\x00\x30\x00\x02\x33\x7A";
        assert_eq!(checksum(record), 0x1E);
        assert_eq!(checksum(b"\x00\x00\x00\x01"), 0xFF);
        assert_eq!(checksum(&[]), 0x00);
    }

    #[test]
    fn end_of_file_record() {
        assert_eq!(HexRecord::end_of_file().to_line(), ":00000001FF");
    }

    #[test]
    fn format_data_record() {
        let line = format_record(RecordType::Data, Address::new(0x0030), b"\x02\x33\x7A");
        assert_eq!(line, ":0300300002337A1E");
        let line = format_record(RecordType::Data, Address::new(0x07F0), &[0xFF; 16]);
        assert_eq!(line, ":1007F000FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF09");
    }

    #[test]
    fn line_endings() {
        assert_eq!(LineEnding::default(), LineEnding::CrLf);
        assert_eq!(LineEnding::CrLf.as_str(), "\r\n");
        assert_eq!(LineEnding::Lf.as_str(), "\n");
    }

    #[test]
    fn parse_data_line() {
        let record = parse_line(":0300300002337A1E", 1).unwrap();
        assert_eq!(record.record_type, RecordType::Data);
        assert_eq!(record.address, Address::new(0x0030));
        assert_eq!(&record.data[..], b"\x02\x33\x7A");
        // Lowercase digits are fine too
        let lower = parse_line(":0300300002337a1e", 1).unwrap();
        assert_eq!(record, lower);
    }

    #[test]
    fn every_golden_record_sums_to_zero() {
        for golden in [SIMPLE_HEX, SERIALIZED_HEX] {
            let records = read_records(BufReader::new(golden.as_bytes())).unwrap();
            assert_eq!(records.len(), 129);
            for line in golden.lines() {
                let digits = &line[1..];
                let sum = digits
                    .as_bytes()
                    .chunks(2)
                    .map(|pair| {
                        u8::from_str_radix(std::str::from_utf8(pair).unwrap(), 16).unwrap()
                    })
                    .fold(0u8, |sum, byte| sum.wrapping_add(byte));
                assert_eq!(sum, 0, "{} does not sum to zero", line);
            }
        }
    }

    #[test]
    fn read_errors() {
        let cases: [(&str, fn(&HexError) -> bool); 9] = [
            ("0300300002337A1E\n:00000001FF\n", |e: &HexError| {
                matches!(e, HexError::MissingStartCode { line: 1 })
            }),
            (":03003000023G7A1E\n:00000001FF\n", |e: &HexError| {
                matches!(e, HexError::InvalidDigit { line: 1 })
            }),
            (":0300300002337A1\n:00000001FF\n", |e: &HexError| {
                matches!(e, HexError::Truncated { line: 1 })
            }),
            (":000000\n:00000001FF\n", |e: &HexError| {
                matches!(e, HexError::Truncated { line: 1 })
            }),
            (":0400300002337A1D\n:00000001FF\n", |e: &HexError| {
                matches!(
                    e,
                    HexError::LengthMismatch {
                        line: 1,
                        declared: 4,
                        actual: 3
                    }
                )
            }),
            (":0300300002337A1F\n:00000001FF\n", |e: &HexError| {
                matches!(
                    e,
                    HexError::Checksum {
                        line: 1,
                        expected: 0x1E,
                        actual: 0x1F
                    }
                )
            }),
            (":00000006FA\n", |e: &HexError| {
                matches!(
                    e,
                    HexError::UnknownRecordType {
                        line: 1,
                        record_type: 6
                    }
                )
            }),
            (":020000040000FA\n:00000001FF\n", |e: &HexError| {
                matches!(
                    e,
                    HexError::UnsupportedRecordType {
                        line: 1,
                        record_type: RecordType::ExtendedLinearAddress
                    }
                )
            }),
            (":00000001FF\n\n:0300300002337A1E\n", |e: &HexError| {
                matches!(e, HexError::DataAfterEndOfFile { line: 3 })
            }),
        ];
        for (input, check) in cases.iter() {
            let err = read_records(input.as_bytes()).unwrap_err();
            assert!(check(&err), "{:?} gave {:?}", input, err);
        }
    }

    #[test]
    fn missing_end_of_file() {
        let err = read_records(":0300300002337A1E\r\n".as_bytes()).unwrap_err();
        assert!(matches!(err, HexError::MissingEndOfFile));
        let err = read_records("".as_bytes()).unwrap_err();
        assert!(matches!(err, HexError::MissingEndOfFile));
    }
}
