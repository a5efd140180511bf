use criterion::{criterion_group, criterion_main, Criterion};

use olfactometer_eeprom::CalibrationTable;
use olfactometer_eeprom_test_data::{counting_calibration_csv, CALIBRATION_CSV};

pub fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Calibration Parsing");

    group.bench_with_input("Sample", &CALIBRATION_CSV, |b, csv| {
        b.iter(|| csv.parse::<CalibrationTable>())
    });
    group.bench_with_input("Full rows", &counting_calibration_csv(6), |b, csv| {
        b.iter(|| csv.parse::<CalibrationTable>())
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
