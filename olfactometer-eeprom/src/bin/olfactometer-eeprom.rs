use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use olfactometer_eeprom::layout::CALIBRATION_ROWS;
use olfactometer_eeprom::{CalibrationTable, EepromImage, ImageOptions, LineEnding};

const ABOUT: &str = "
Generate the EEPROM calibration image for an Olfactometer from a CSV calibration \
file, or inspect a generated Intel-HEX image.
";

#[derive(Parser, Debug)]
#[command(version, about = ABOUT, long_about = ABOUT)]
struct Args {
    /// Log more detail, can be repeated. RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build an Intel-HEX EEPROM image from a calibration CSV file
    Generate {
        /// Path to the calibration CSV file
        #[arg(short, long)]
        input: PathBuf,

        /// Path to the resulting Intel-HEX file
        #[arg(short, long)]
        output: PathBuf,

        /// Serial number to store in the image (decimal or 0x-prefixed), truncated to 16 bits
        #[arg(short, long, value_parser = parse_integer)]
        serial_number: Option<u32>,

        /// Temperature to store in the last calibration row, truncated to 8 bits
        #[arg(short, long, value_parser = parse_integer)]
        temperature: Option<u32>,

        #[arg(long, value_enum, default_value_t = LineEnding::CrLf)]
        line_ending: LineEnding,
    },

    /// Show the serial number and calibration stored in an Intel-HEX image
    Inspect {
        /// Path to the Intel-HEX file
        file: PathBuf,
    },
}

fn parse_integer(arg: &str) -> Result<u32, String> {
    let parsed = match arg.strip_prefix("0x").or_else(|| arg.strip_prefix("0X")) {
        Some(hex_digits) => u32::from_str_radix(hex_digits, 16),
        None => arg.parse(),
    };
    parsed.map_err(|err| format!("{:?} is not an integer: {}", arg, err))
}

/// Log when narrowing a value to fit its field changed it.
fn check_truncation(name: &str, value: u32, narrowed: u32) {
    if value != narrowed {
        warn!("{} {} does not fit, using {}", name, value, narrowed);
    }
}

fn generate(
    input: &Path,
    output: &Path,
    serial_number: Option<u32>,
    temperature: Option<u32>,
    line_ending: LineEnding,
) -> Result<()> {
    let table = CalibrationTable::from_path(input)
        .with_context(|| format!("Failed to read calibration table {}", input.display()))?;
    info!(rows = table.len(), "loaded {}", input.display());

    let mut options = ImageOptions::default();
    if let Some(serial_number) = serial_number {
        let narrowed = serial_number as u16;
        check_truncation("serial number", serial_number, narrowed.into());
        options = options.with_serial_number(narrowed);
    }
    if let Some(temperature) = temperature {
        let narrowed = temperature as u8;
        check_truncation("temperature", temperature, narrowed.into());
        options = options.with_temperature(narrowed);
    }

    let image = EepromImage::build(&table, options)
        .with_context(|| format!("Failed to build an image from {}", input.display()))?;
    image
        .save(output, line_ending)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!(records = image.records().len(), "saved {}", output.display());
    Ok(())
}

fn inspect(file: &Path) -> Result<()> {
    let reader = BufReader::new(
        File::open(file).with_context(|| format!("Failed to open {}", file.display()))?,
    );
    let image = EepromImage::from_intel_hex(reader)
        .with_context(|| format!("Failed to read Intel-HEX image {}", file.display()))?;

    match image.serial_number() {
        Some(serial_number) => println!("Serial number: {}", serial_number),
        None => println!("Serial number: (none)"),
    }
    for channel in 0..CALIBRATION_ROWS {
        if let Some(row) = image.calibration_row(channel) {
            let values: Vec<String> = row.iter().map(|value| value.to_string()).collect();
            println!("Channel {}: {}", channel, values.join(","));
        }
    }
    Ok(())
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    match args.command {
        Command::Generate {
            input,
            output,
            serial_number,
            temperature,
            line_ending,
        } => generate(&input, &output, serial_number, temperature, line_ending),
        Command::Inspect { file } => inspect(&file),
    }
}

#[cfg(test)]
mod test {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn integers() {
        assert_eq!(parse_integer("300"), Ok(300));
        assert_eq!(parse_integer("0x12C"), Ok(300));
        assert_eq!(parse_integer("0X12c"), Ok(300));
        assert!(parse_integer("twelve").is_err());
        assert!(parse_integer("-1").is_err());
    }

    #[test]
    fn generate_arguments() {
        let args = Args::try_parse_from([
            "olfactometer-eeprom",
            "generate",
            "-i",
            "calibration.csv",
            "-o",
            "calibration.hex",
            "--serial-number",
            "0x12C",
            "--temperature",
            "10",
            "--line-ending",
            "lf",
        ])
        .unwrap();
        match args.command {
            Command::Generate {
                serial_number,
                temperature,
                line_ending,
                ..
            } => {
                assert_eq!(serial_number, Some(300));
                assert_eq!(temperature, Some(10));
                assert_eq!(line_ending, LineEnding::Lf);
            }
            other => panic!("Unexpected command {:?}", other),
        }
    }
}
