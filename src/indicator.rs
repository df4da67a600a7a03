use crate::{Ohlcv, Price, Timestamp};

use serde::Serialize;
use std::{
    fmt::{Debug, Display},
    hash::Hash,
};

/// Configuration for a technical [`Indicator`].
///
/// Every indicator has a corresponding config type that holds its parameters
/// (window lengths, band multiplier). Configs are value types: cheap to clone,
/// compare, and hash.
pub trait IndicatorConfig: Sized + PartialEq + Eq + Hash + Display + Debug {
    /// Builder type for constructing this config.
    type Builder: IndicatorConfigBuilder<Self>;

    /// Returns a new builder with default values.
    fn builder() -> Self::Builder;

    /// Minimum number of bars needed before the first output point.
    ///
    /// [`Indicator::compute`] returns an empty series for shorter input.
    fn required_bars(&self) -> usize;
}

/// Builder for an [`IndicatorConfig`].
pub trait IndicatorConfigBuilder<Config>
where
    Config: IndicatorConfig,
{
    /// Builds the config. Panics if required fields are missing.
    #[must_use]
    fn build(self) -> Config;
}

/// A batch technical indicator.
///
/// Each call to [`compute`](Indicator::compute) recomputes the whole output
/// series from the given bars. Indicators hold only their configuration and
/// derived constants, never state from a previous call, so a single instance
/// can be shared freely between threads.
///
/// # Example
///
/// ```
/// use quantedge_overlay::{OhlcvBar, Sma, SmaConfig};
/// use std::num::NonZero;
///
/// let bars: Vec<OhlcvBar> = [10.0, 20.0, 30.0]
///     .iter()
///     .zip(1..)
///     .map(|(&close, time)| OhlcvBar { time, open: close, high: close, low: close, close, volume: 0.0 })
///     .collect();
///
/// let sma = Sma::new(SmaConfig::new(NonZero::new(3).unwrap()));
/// let points = sma.compute(&bars);
///
/// assert_eq!(points.len(), 1);
/// assert_eq!(points[0].time, 3);
/// assert_eq!(points[0].value, 20.0);
/// ```
pub trait Indicator: Sized + Clone + Display + Debug {
    /// Configuration type for this indicator.
    type Config: IndicatorConfig;

    /// Computed output type. [`Point`] for single-line indicators,
    /// a struct for composite ones (e.g. Bollinger Bands).
    type Output: Send + Sync + Debug;

    /// Creates a new indicator from the given config.
    fn new(config: Self::Config) -> Self;

    /// Computes the full output series for `bars`.
    ///
    /// Returns an empty series when there are fewer than
    /// [`required_bars`](IndicatorConfig::required_bars) bars.
    fn compute(&self, bars: &[impl Ohlcv]) -> Vec<Self::Output>;

    /// Configuration this indicator was created with.
    fn config(&self) -> &Self::Config;
}

/// A single `{time, value}` sample of an indicator line.
///
/// `time` is always copied from the bar that anchors the value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub time: Timestamp,
    pub value: Price,
}

impl Point {
    #[inline]
    #[must_use]
    pub fn new(time: Timestamp, value: Price) -> Self {
        Self { time, value }
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.time, self.value)
    }
}
