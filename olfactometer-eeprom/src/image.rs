// SPDX-License-Identifier: Apache-2.0
// Copyright © 2026 Olfactometer developers

//! EEPROM image generation.
use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;

use tracing::{debug, trace};

use crate::calibration::{CalibrationRow, CalibrationTable};
use crate::error::{BuildError, Error, HexError};
use crate::hex::{self, LineEnding, RecordType};
use crate::layout::*;
use crate::util::{put_be_words, Buffer};

/// Values written into the image that don't come from the calibration table.
///
/// The default writes neither, giving an image of just the calibration block and filler.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ImageOptions {
    /// Stored high byte first at [`EepromAddress::SerialNumber`].
    pub serial_number: Option<u16>,

    /// Stored in the high byte of the first zero value in the last calibration row.
    pub temperature: Option<u8>,
}

impl ImageOptions {
    pub fn serialized(serial_number: u16, temperature: u8) -> Self {
        Self {
            serial_number: Some(serial_number),
            temperature: Some(temperature),
        }
    }

    /// Like [`serialized`][ImageOptions::serialized], but keeping only the low 16 bits of the
    /// serial number and the low 8 bits of the temperature.
    ///
    /// Out of range values are truncated, not rejected.
    pub fn truncating(serial_number: u32, temperature: u32) -> Self {
        Self::serialized(serial_number as u16, temperature as u8)
    }

    pub fn with_serial_number(self, serial_number: u16) -> Self {
        Self {
            serial_number: Some(serial_number),
            ..self
        }
    }

    pub fn with_temperature(self, temperature: u8) -> Self {
        Self {
            temperature: Some(temperature),
            ..self
        }
    }
}

/// A 16-byte chunk of the EEPROM and where it goes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Record {
    address: Address,
    data: [u8; RECORD_LENGTH],
}

impl Record {
    pub fn new(address: Address, data: [u8; RECORD_LENGTH]) -> Self {
        Self { address, data }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn data(&self) -> &[u8; RECORD_LENGTH] {
        &self.data
    }
}

/// A complete EEPROM image, as an ordered list of records.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EepromImage {
    records: Vec<Record>,
}

impl EepromImage {
    /// Lay out the EEPROM for a calibration table.
    ///
    /// Every slot is filled with [`FILLER`], except for the first slot when a serial number is
    /// given and the calibration block. The calibration block takes the first
    /// [`CALIBRATION_ROWS`] rows of `table`, each row being split across two records. When a
    /// temperature is given, it is added to the last of those rows.
    pub fn build(table: &CalibrationTable, options: ImageOptions) -> Result<Self, BuildError> {
        let mut records = Vec::with_capacity(RECORD_SLOTS);
        let mut slot = 0;
        while slot < RECORD_SLOTS {
            if slot == CALIBRATION_BASE_SLOT {
                // Each row advances the slot by one, but uses two slots (relative to the
                // block's base slot, row k lands in slots 2k and 2k + 1).
                for k in 0..CALIBRATION_ROWS {
                    let row = table.row(k).ok_or(BuildError::InsufficientRows {
                        required: CALIBRATION_ROWS,
                        found: table.len(),
                    })?;
                    let row = match options.temperature {
                        Some(temperature) if k == CALIBRATION_ROWS - 1 => {
                            with_temperature(row, temperature)?
                        }
                        _ => *row,
                    };
                    let [first, second] = split_row(&row);
                    records.push(Record::new(Address::of_slot(slot + k), first));
                    records.push(Record::new(Address::of_slot(slot + k + 1), second));
                    slot += 1;
                }
                // Skip the rest of the slots the calibration block covered.
                slot += CALIBRATION_ROWS - 1;
            } else {
                let data = match options.serial_number {
                    Some(serial_number) if slot == 0 => with_serial_number(serial_number),
                    _ => FILLER,
                };
                records.push(Record::new(Address::of_slot(slot), data));
            }
            slot += 1;
        }
        debug!(
            records = records.len(),
            serial_number = ?options.serial_number,
            temperature = ?options.temperature,
            "built EEPROM image"
        );
        Ok(Self { records })
    }

    /// Create an image from Intel-HEX data, like that written by
    /// [`to_intel_hex`][EepromImage::to_intel_hex].
    ///
    /// Every data record has to be exactly one image record long.
    pub fn from_intel_hex<R: BufRead>(reader: R) -> Result<Self, HexError> {
        let records = hex::read_records(reader)?
            .into_iter()
            .filter(|record| record.record_type == RecordType::Data)
            .map(|record| -> Result<Record, HexError> {
                let data: [u8; RECORD_LENGTH] = record.data.as_slice().try_into().map_err(|_| {
                    HexError::RecordLength {
                        address: record.address.into(),
                        length: record.data.len(),
                    }
                })?;
                Ok(Record::new(record.address, data))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { records })
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Serialize this image as Intel-HEX text.
    pub fn to_intel_hex(&self, line_ending: LineEnding) -> String {
        let mut text = String::new();
        for record in self.records.iter() {
            let line = hex::HexRecord {
                record_type: RecordType::Data,
                address: record.address,
                data: record.data.iter().copied().collect(),
            }
            .to_line();
            text.push_str(&line);
            text.push_str(line_ending.as_str());
        }
        text.push_str(&hex::HexRecord::end_of_file().to_line());
        text.push_str(line_ending.as_str());
        text
    }

    /// Write this image to `path` as Intel-HEX, replacing the file if it exists.
    pub fn save<P: AsRef<Path>>(&self, path: P, line_ending: LineEnding) -> Result<(), Error> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        hex::write_image(self, &mut writer, line_ending)?;
        writer.flush()?;
        debug!(path = %path.display(), "saved EEPROM image");
        Ok(())
    }

    /// The contents of the EEPROM after writing this image to an erased EEPROM.
    ///
    /// Bytes outside of the EEPROM are ignored.
    pub fn to_bytes(&self) -> [u8; EEPROM_LENGTH] {
        let mut bytes = [0xFF; EEPROM_LENGTH];
        for record in self.records.iter() {
            let start = usize::from(record.address);
            if start >= EEPROM_LENGTH {
                trace!(address = ?record.address, "record is past the end of the EEPROM");
                continue;
            }
            let end = (start + RECORD_LENGTH).min(EEPROM_LENGTH);
            bytes[start..end].copy_from_slice(&record.data[..end - start]);
        }
        bytes
    }

    /// The serial number, if one was written.
    pub fn serial_number(&self) -> Option<u16> {
        let bytes = self.to_bytes();
        let mut buf = &bytes[EepromAddress::SerialNumber.byte_offset()..];
        match buf.get_u16() {
            0xFFFF => None,
            serial_number => Some(serial_number),
        }
    }

    /// The calibration row stored for a channel, as it would be read back by the firmware.
    ///
    /// For the last channel this includes the temperature if one was written.
    pub fn calibration_row(&self, channel: usize) -> Option<CalibrationRow> {
        if channel >= CALIBRATION_ROWS {
            return None;
        }
        let bytes = self.to_bytes();
        let mut buf = &bytes[EepromAddress::calibration_row(channel)..];
        let mut row = [0u16; WORDS_PER_ROW];
        row.iter_mut().for_each(|value| *value = buf.get_u16());
        Some(row)
    }

    /// Only the values of a calibration row that the firmware uses.
    pub fn channel_calibration(
        &self,
        channel: usize,
    ) -> Option<[u16; FIRMWARE_VALUES_PER_CHANNEL]> {
        let row = self.calibration_row(channel)?;
        let mut values = [0u16; FIRMWARE_VALUES_PER_CHANNEL];
        values.copy_from_slice(&row[..FIRMWARE_VALUES_PER_CHANNEL]);
        Some(values)
    }
}

/// Return a copy of `row` with `temperature` in the high byte of the first zero value.
fn with_temperature(row: &CalibrationRow, temperature: u8) -> Result<CalibrationRow, BuildError> {
    let index = row
        .iter()
        .position(|value| *value == 0)
        .ok_or(BuildError::CalibrationRowFull)?;
    let mut patched = *row;
    patched[index] = (patched[index] & 0x00FF) | (u16::from(temperature) << 8);
    trace!(index, value = patched[index], "added temperature to calibration row");
    Ok(patched)
}

fn with_serial_number(serial_number: u16) -> [u8; RECORD_LENGTH] {
    let mut data = FILLER;
    let offset = EepromAddress::SerialNumber.byte_offset();
    put_be_words(&[serial_number], &mut data[offset..]);
    data
}

/// Split a row into the data for two records, storing each value high byte first.
fn split_row(row: &CalibrationRow) -> [[u8; RECORD_LENGTH]; 2] {
    let mut halves = [[0u8; RECORD_LENGTH]; 2];
    for (half, words) in halves.iter_mut().zip(row.chunks_exact(WORDS_PER_RECORD)) {
        put_be_words(words, half);
    }
    halves
}
