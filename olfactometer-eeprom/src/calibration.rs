// SPDX-License-Identifier: Apache-2.0
// Copyright © 2026 Olfactometer developers

//! Calibration tables.
//!
//! A calibration file is plain text with one row per line, each row being up to sixteen
//! comma-separated decimal values. Rows with fewer than sixteen values are padded with zeroes.
//! Lines that are empty (or only whitespace) are skipped, and whitespace around each value is
//! ignored. Signs are not accepted.
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use arrayvec::ArrayVec;
use tracing::{debug, trace};

use crate::error::ParseError;
use crate::layout::WORDS_PER_ROW;
use crate::util::parse_digits;

/// One line of a calibration file.
pub type CalibrationRow = [u16; WORDS_PER_ROW];

/// The rows of a calibration file, in file order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CalibrationTable {
    rows: Vec<CalibrationRow>,
}

impl CalibrationTable {
    pub fn new(rows: Vec<CalibrationRow>) -> Self {
        Self { rows }
    }

    /// Read a calibration table line by line.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, ParseError> {
        let mut rows = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let line_number = index + 1;
            if line.trim().is_empty() {
                trace!(line = line_number, "skipping blank line");
                continue;
            }
            rows.push(parse_row(&line, line_number)?);
        }
        debug!(rows = rows.len(), "parsed calibration table");
        Ok(Self { rows })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ParseError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "opening calibration table");
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn rows(&self) -> &[CalibrationRow] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&CalibrationRow> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl FromStr for CalibrationTable {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_reader(s.as_bytes())
    }
}

fn parse_row(line: &str, line_number: usize) -> Result<CalibrationRow, ParseError> {
    let mut values: ArrayVec<u16, WORDS_PER_ROW> = ArrayVec::new();
    for (index, field) in line.split(',').enumerate() {
        let field = field.trim();
        let value = parse_digits(field, 10).ok_or_else(|| ParseError::InvalidNumber {
            line: line_number,
            column: index + 1,
            value: field.to_string(),
        })?;
        values
            .try_push(value)
            .map_err(|_| ParseError::MalformedRow {
                line: line_number,
                fields: line.split(',').count(),
            })?;
    }
    // Unset values stay zero
    let mut row = [0u16; WORDS_PER_ROW];
    row[..values.len()].copy_from_slice(&values);
    Ok(row)
}
