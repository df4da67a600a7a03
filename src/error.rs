//! Error types for indicator request resolution

use thiserror::Error;

/// A request parameter that cannot be turned into an indicator config.
///
/// Numeric edge cases inside the indicators (too few bars, zero variance,
/// zero average loss) are not errors; they produce empty or well-defined
/// output. Only the untyped request boundary can fail.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParamError {
    /// Window length that is negative, fractional, non-finite, or too large
    #[error("invalid {key}: {value} (expected a positive whole number)")]
    InvalidPeriod { key: &'static str, value: f64 },

    /// Band multiplier that is negative or non-finite
    #[error("invalid stdDev: {value} (expected a positive finite number)")]
    InvalidStdDev { value: f64 },
}
