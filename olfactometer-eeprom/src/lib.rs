//! A pure-Rust library for generating the EEPROM calibration image of an Olfactometer.
//!
//! The Olfactometer keeps the flow calibration for its six channels in EEPROM. That calibration
//! is produced as a CSV file with one line per channel, and has to be turned into an Intel-HEX
//! file that can be programmed into the device. Optionally, the device's serial number and a
//! temperature value are written into the image as well.
//!
//! Generating an image is three steps: parse the [`CalibrationTable`], [build][EepromImage::build]
//! an [`EepromImage`] from it, then serialize the image as Intel-HEX.
//! ```
//! use olfactometer_eeprom::{CalibrationTable, EepromImage, ImageOptions, LineEnding};
//!
//! // Six channels with three values each
//! let csv = "1,2,3\n".repeat(6);
//! let table: CalibrationTable = csv.parse()?;
//! let image = EepromImage::build(&table, ImageOptions::serialized(300, 10))?;
//! let hex = image.to_intel_hex(LineEnding::Lf);
//! // The serial number is at offset 4 of the first record
//! assert!(hex.starts_with(":10000000FFFFFFFF012CFFFF"));
//! assert!(hex.ends_with(":00000001FF\n"));
//! # Ok::<(), olfactometer_eeprom::Error>(())
//! ```
//!
//! # Image Layout
//! The EEPROM is 128 records of 16 bytes each. Unused records are erased (`0xFF`). The first six
//! rows of the calibration table are stored starting at record 100 (address `0x0640`), each
//! sixteen value row taking up two records. All values are stored high byte first. See the
//! [`layout`] module for the details.
//!
//! Images can also be read back from Intel-HEX with [`EepromImage::from_intel_hex`], which is
//! handy for checking what a file will program into a device.

pub mod calibration;
pub mod error;
pub mod hex;
pub mod image;
pub mod layout;
mod util;

pub use calibration::{CalibrationRow, CalibrationTable};
#[doc(inline)]
pub use error::{BuildError, Error, HexError, ParseError};
pub use hex::LineEnding;
pub use image::{EepromImage, ImageOptions, Record};
pub use layout::{Address, EepromAddress};
