// SPDX-License-Identifier: Apache-2.0
// Copyright © 2026 Olfactometer developers
use std::error;
use std::fmt;
use std::io;

use crate::hex::RecordType;

/// Errors from reading a calibration table.
#[derive(Debug)]
pub enum ParseError {
    /// The calibration file could not be read.
    Io(io::Error),

    /// A field was not a decimal integer in `0..=65535`.
    ///
    /// `line` and `column` are 1-based, `column` counting comma-separated fields.
    InvalidNumber {
        line: usize,
        column: usize,
        value: String,
    },

    /// A line had more values than fit in a calibration row.
    MalformedRow { line: usize, fields: usize },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Io(err) => write!(f, "unable to read calibration data: {}", err),
            ParseError::InvalidNumber {
                line,
                column,
                value,
            } => write!(
                f,
                "line {}, field {}: {:?} is not an unsigned 16-bit integer",
                line, column, value
            ),
            ParseError::MalformedRow { line, fields } => write!(
                f,
                "line {}: {} fields given, a calibration row holds at most {}",
                line,
                fields,
                crate::layout::WORDS_PER_ROW
            ),
        }
    }
}

impl error::Error for ParseError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            ParseError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for ParseError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

/// Errors from laying out an EEPROM image.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildError {
    /// The calibration table is too short to fill the calibration block.
    InsufficientRows { required: usize, found: usize },

    /// There is no zero-valued slot left in the last calibration row for the temperature.
    CalibrationRowFull,
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::InsufficientRows { required, found } => write!(
                f,
                "calibration table has {} rows, {} are required",
                found, required
            ),
            BuildError::CalibrationRowFull => {
                write!(f, "last calibration row has no free slot for the temperature")
            }
        }
    }
}

impl error::Error for BuildError {}

/// Errors from reading an Intel-HEX file.
///
/// Line numbers are 1-based.
#[derive(Debug)]
pub enum HexError {
    Io(io::Error),

    /// The line does not start with `:`.
    MissingStartCode { line: usize },

    /// The line contains something other than pairs of hexadecimal digits.
    InvalidDigit { line: usize },

    /// The line is too short to hold a record.
    Truncated { line: usize },

    /// The byte count field disagrees with the number of data bytes on the line.
    LengthMismatch {
        line: usize,
        declared: usize,
        actual: usize,
    },

    Checksum {
        line: usize,
        expected: u8,
        actual: u8,
    },

    UnknownRecordType { line: usize, record_type: u8 },

    /// A valid record type that has no meaning for a 2 KiB EEPROM.
    UnsupportedRecordType {
        line: usize,
        record_type: RecordType,
    },

    MissingEndOfFile,

    DataAfterEndOfFile { line: usize },

    /// A data record whose payload is not one EEPROM record long.
    RecordLength { address: u16, length: usize },
}

impl fmt::Display for HexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HexError::Io(err) => write!(f, "unable to read Intel-HEX data: {}", err),
            HexError::MissingStartCode { line } => {
                write!(f, "line {}: record does not start with ':'", line)
            }
            HexError::InvalidDigit { line } => {
                write!(f, "line {}: record contains a non-hexadecimal digit", line)
            }
            HexError::Truncated { line } => write!(f, "line {}: record is truncated", line),
            HexError::LengthMismatch {
                line,
                declared,
                actual,
            } => write!(
                f,
                "line {}: byte count is {} but {} data bytes are present",
                line, declared, actual
            ),
            HexError::Checksum {
                line,
                expected,
                actual,
            } => write!(
                f,
                "line {}: checksum is {:#04X}, expected {:#04X}",
                line, actual, expected
            ),
            HexError::UnknownRecordType { line, record_type } => {
                write!(f, "line {}: unknown record type {:#04X}", line, record_type)
            }
            HexError::UnsupportedRecordType { line, record_type } => {
                write!(f, "line {}: unsupported record type {:?}", line, record_type)
            }
            HexError::MissingEndOfFile => write!(f, "no end-of-file record"),
            HexError::DataAfterEndOfFile { line } => {
                write!(f, "line {}: record after the end-of-file record", line)
            }
            HexError::RecordLength { address, length } => write!(
                f,
                "record at {:#06X} holds {} bytes, expected {}",
                address,
                length,
                crate::layout::RECORD_LENGTH
            ),
        }
    }
}

impl error::Error for HexError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            HexError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for HexError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

/// Any error from this library.
#[derive(Debug)]
pub enum Error {
    Parse(ParseError),

    Build(BuildError),

    Hex(HexError),

    /// Errors writing an image out.
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Parse(err) => write!(f, "Parse Error: {}", err),
            Error::Build(err) => write!(f, "Build Error: {}", err),
            Error::Hex(err) => write!(f, "Intel-HEX Error: {}", err),
            Error::Io(err) => write!(f, "I/O Error: {}", err),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Parse(err) => Some(err),
            Error::Build(err) => Some(err),
            Error::Hex(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Self::Parse(err)
    }
}

impl From<BuildError> for Error {
    fn from(err: BuildError) -> Self {
        Self::Build(err)
    }
}

impl From<HexError> for Error {
    fn from(err: HexError) -> Self {
        Self::Hex(err)
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

#[cfg(test)]
mod test {
    use std::error::Error as _;
    use std::io;

    use super::{BuildError, Error, ParseError};

    #[test]
    fn io_errors_are_chained() {
        let err = Error::from(ParseError::from(io::Error::new(
            io::ErrorKind::NotFound,
            "missing",
        )));
        let parse_err = err.source().expect("Error should wrap the parse error");
        let io_err = parse_err.source().expect("ParseError should wrap the I/O error");
        assert_eq!(io_err.to_string(), "missing");
    }

    #[test]
    fn display_insufficient_rows() {
        let err = BuildError::InsufficientRows {
            required: 6,
            found: 5,
        };
        assert_eq!(
            err.to_string(),
            "calibration table has 5 rows, 6 are required"
        );
    }

    #[test]
    fn display_invalid_number() {
        let err = ParseError::InvalidNumber {
            line: 3,
            column: 2,
            value: "70000".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "line 3, field 2: \"70000\" is not an unsigned 16-bit integer"
        );
    }
}
