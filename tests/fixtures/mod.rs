#![allow(dead_code)]

use quantedge_overlay::{Ohlcv, Point, Price, Timestamp};
use serde::{Deserialize, de::DeserializeOwned};

/// OHLCV bar parsed from the hourly fixture CSV.
#[derive(Debug, Clone, Deserialize)]
pub struct RefBar {
    pub time: u64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Ohlcv for RefBar {
    fn open(&self) -> Price {
        self.open
    }

    fn high(&self) -> Price {
        self.high
    }

    fn low(&self) -> Price {
        self.low
    }

    fn close(&self) -> Price {
        self.close
    }

    fn time(&self) -> Timestamp {
        self.time
    }

    fn volume(&self) -> f64 {
        self.volume
    }
}

/// Reference value with timestamp.
#[derive(Debug, Deserialize)]
pub struct RefValue {
    pub time: u64,
    pub expected: f64,
}

/// Reference MACD value with timestamp.
#[derive(Debug, Deserialize)]
pub struct RefMacdValue {
    pub time: u64,
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// Reference BB value with timestamp.
#[derive(Debug, Deserialize)]
pub struct RefBbValue {
    pub time: u64,
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

const OHLCV_PATH: &str = "tests/fixtures/data/synthetic-1h.csv";

/// Load reference OHLCV bars.
pub fn load_reference_ohlcvs() -> Vec<RefBar> {
    load_records(OHLCV_PATH, "invalid OHLCV record")
}

/// Load single-value reference data (SMA, EMA, RSI).
pub fn load_ref_values(path: &str) -> Vec<RefValue> {
    load_records(path, "invalid reference record")
}

/// Load MACD reference data (macd, signal, histogram).
pub fn load_macd_ref(path: &str) -> Vec<RefMacdValue> {
    load_records(path, "invalid MACD reference record")
}

/// Load BB reference data (upper, middle, lower).
pub fn load_bb_ref(path: &str) -> Vec<RefBbValue> {
    load_records(path, "invalid BB reference record")
}

/// Assert two f64 values are within tolerance.
pub fn assert_near(actual: f64, expected: f64, tolerance: f64, context: &str) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= tolerance,
        "{context}: expected {expected:.10}, got {actual:.10}, diff {diff:.2e} > tolerance {tolerance:.2e}"
    );
}

/// Assert a computed line matches reference values point for point,
/// timestamps included.
pub fn assert_line_matches(name: &str, actual: &[Point], reference: &[RefValue], tolerance: f64) {
    assert_eq!(
        actual.len(),
        reference.len(),
        "{name}: expected {} points, got {}",
        reference.len(),
        actual.len()
    );

    for (i, (point, expected)) in actual.iter().zip(reference).enumerate() {
        assert_eq!(point.time, expected.time, "{name}: time mismatch at point {i}");
        assert_near(
            point.value,
            expected.expected,
            tolerance,
            &format!("{name} at point {i} (t={})", point.time),
        );
    }
}

fn load_records<D>(path: &str, expect_msg: &str) -> Vec<D>
where
    D: DeserializeOwned,
{
    let mut rdr =
        csv::Reader::from_path(path).unwrap_or_else(|e| panic!("failed to open {path}: {e}"));

    rdr.deserialize().map(|r| r.expect(expect_msg)).collect()
}
