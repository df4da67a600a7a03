use std::{
    fmt::{Debug, Display},
    num::NonZero,
};

use crate::{
    Indicator, IndicatorConfig, IndicatorConfigBuilder, Ohlcv, Point,
    ohlcv::closes,
    window::RollingSum,
};

/// Default SMA window length.
pub const DEFAULT_SMA_LENGTH: NonZero<usize> = NonZero::new(20).unwrap();

/// Configuration for the Simple Moving Average ([`Sma`]) indicator.
///
/// # Example
///
/// ```rust
/// use quantedge_overlay::{IndicatorConfig, SmaConfig};
/// use std::num::NonZero;
///
/// let config = SmaConfig::new(NonZero::new(20).unwrap());
/// assert_eq!(config.length(), 20);
/// assert_eq!(config.required_bars(), 20);
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct SmaConfig {
    length: usize,
}

impl IndicatorConfig for SmaConfig {
    type Builder = SmaConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        SmaConfigBuilder::new()
    }

    #[inline]
    fn required_bars(&self) -> usize {
        self.length
    }
}

impl SmaConfig {
    /// SMA over closing prices with the given window length.
    #[must_use]
    pub fn new(length: NonZero<usize>) -> Self {
        Self::builder().length(length).build()
    }

    /// Window length (number of bars).
    #[inline]
    #[must_use]
    pub fn length(&self) -> usize {
        self.length
    }
}

impl Default for SmaConfig {
    /// SMA(20).
    fn default() -> Self {
        Self::new(DEFAULT_SMA_LENGTH)
    }
}

impl Display for SmaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SmaConfig({})", self.length)
    }
}

/// Builder for [`SmaConfig`].
///
/// Length must be set before calling [`build`](IndicatorConfigBuilder::build).
pub struct SmaConfigBuilder {
    length: Option<usize>,
}

impl SmaConfigBuilder {
    fn new() -> Self {
        Self { length: None }
    }

    /// Sets the window length.
    #[inline]
    #[must_use]
    pub fn length(mut self, length: NonZero<usize>) -> Self {
        self.length.replace(length.get());
        self
    }
}

impl IndicatorConfigBuilder<SmaConfig> for SmaConfigBuilder {
    #[inline]
    fn build(self) -> SmaConfig {
        SmaConfig {
            length: self.length.expect("length is required"),
        }
    }
}

/// Simple Moving Average (SMA).
///
/// Computes the unweighted mean of the last *n* closes, where *n* is the
/// configured window length, once per full window. Output has
/// `bars.len() - n + 1` points, each anchored at the last bar of its window,
/// or is empty when fewer than *n* bars are given.
///
/// Uses a running sum for O(1) updates per bar.
///
/// # Example
///
/// ```rust
/// use quantedge_overlay::sma;
/// use std::num::NonZero;
/// # use quantedge_overlay::OhlcvBar;
/// # fn bar(close: f64, time: u64) -> OhlcvBar {
/// #     OhlcvBar { time, open: close, high: close, low: close, close, volume: 0.0 }
/// # }
///
/// let bars = [bar(10.0, 1), bar(20.0, 2), bar(30.0, 3), bar(40.0, 4)];
/// let points = sma(&bars, NonZero::new(3).unwrap());
///
/// assert_eq!(points.len(), 2);
/// assert_eq!((points[0].time, points[0].value), (3, 20.0));
/// assert_eq!((points[1].time, points[1].value), (4, 30.0));
/// ```
#[derive(Clone, Debug)]
pub struct Sma {
    config: SmaConfig,
}

impl Indicator for Sma {
    type Config = SmaConfig;
    type Output = Point;

    fn new(config: Self::Config) -> Self {
        Self { config }
    }

    fn compute(&self, bars: &[impl Ohlcv]) -> Vec<Point> {
        let closes = closes(bars);

        RollingSum::new(&closes, self.config.length)
            .map(|window| Point::new(bars[window.end].time(), window.mean()))
            .collect()
    }

    #[inline]
    fn config(&self) -> &SmaConfig {
        &self.config
    }
}

impl Display for Sma {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SMA({})", self.config.length)
    }
}

/// SMA of closing prices over `period` bars.
///
/// See [`Sma`].
#[must_use]
pub fn sma(bars: &[impl Ohlcv], period: NonZero<usize>) -> Vec<Point> {
    Sma::new(SmaConfig::new(period)).compute(bars)
}
