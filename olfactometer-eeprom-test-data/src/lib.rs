// SPDX-License-Identifier: Apache-2.0
// Copyright © 2026 Olfactometer developers

/// Serial number used to generate [`SERIALIZED_HEX`].
pub const SAMPLE_SERIAL_NUMBER: u16 = 1234;

/// Temperature used to generate [`SERIALIZED_HEX`].
pub const SAMPLE_TEMPERATURE: u8 = 25;

/// A calibration table for all six channels.
///
/// Each line only has the eleven values the firmware reads, so the last five slots of every row
/// are zero. The last row starts with a non-zero value so the temperature lands in slot 11.
pub const CALIBRATION_CSV: &str = include_str!("../data/calibration.csv");

/// [`CALIBRATION_CSV`] as an image without a serial number or temperature, CRLF line endings.
pub const SIMPLE_HEX: &str = include_str!("../data/calibration.hex");

/// [`CALIBRATION_CSV`] with [`SAMPLE_SERIAL_NUMBER`] and [`SAMPLE_TEMPERATURE`], CRLF line
/// endings.
pub const SERIALIZED_HEX: &str = include_str!("../data/calibration-serialized.hex");

/// A calibration table of `rows` lines with sixteen zeroes each.
pub fn zeroed_calibration_csv(rows: usize) -> String {
    let line = ["0"; 16].join(",");
    let mut csv = String::new();
    for _ in 0..rows {
        csv.push_str(&line);
        csv.push('\n');
    }
    csv
}

/// A calibration table of `rows` lines, where row `n` holds `n * 16 + 1` through `n * 16 + 16`.
///
/// None of the values are zero, so the last calibration row has no room for a temperature.
pub fn counting_calibration_csv(rows: usize) -> String {
    let mut csv = String::new();
    for row in 0..rows {
        let values: Vec<String> = (1..=16).map(|n| (row * 16 + n).to_string()).collect();
        csv.push_str(&values.join(","));
        csv.push('\n');
    }
    csv
}
