use std::{
    fmt::Display,
    hash::{Hash, Hasher},
    num::NonZero,
};

use serde::Serialize;

use crate::{
    Indicator, IndicatorConfig, IndicatorConfigBuilder, Ohlcv, Price, Timestamp, ohlcv::closes,
    window::RollingSum,
};

/// Default Bollinger Bands window length.
pub const DEFAULT_BB_LENGTH: NonZero<usize> = NonZero::new(20).unwrap();

/// Variance convention used for the band width unless overridden with
/// [`BbConfigBuilder::variance`].
///
/// Switching to [`Variance::Sample`] widens bands on non-constant data by
/// `sqrt(n / (n − 1))`; constant windows collapse to zero width either way.
pub const BOLLINGER_VARIANCE: Variance = Variance::Population;

/// Standard deviation multiplier for Bollinger Bands.
///
/// Wraps a positive, non-NaN `f64`. The constructor panics if the value is
/// zero, negative, or NaN.
///
/// Defaults to `2.0` (the standard Bollinger Bands setting).
///
/// Implements `Eq` and `Hash` via bit-level comparison, which is safe because
/// NaN is rejected at construction.
#[derive(Clone, Copy, Debug)]
pub struct StdDev(f64);

impl StdDev {
    /// Creates a new standard deviation multiplier.
    ///
    /// # Panics
    ///
    /// Panics if `value` is zero, negative, or NaN.
    #[must_use]
    pub fn new(value: f64) -> Self {
        assert!(!value.is_nan(), "std_dev must not be NaN");
        assert!(value > 0.0, "std_dev must be positive");
        Self(value)
    }

    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl PartialEq for StdDev {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for StdDev {}

impl Hash for StdDev {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl Default for StdDev {
    fn default() -> Self {
        Self(2.0)
    }
}

/// Divisor convention for the rolling variance.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub enum Variance {
    /// Mean of squared deviations: divisor `n`.
    Population,
    /// Bessel-corrected: divisor `n − 1` (`n` for a one-bar window).
    Sample,
}

impl Variance {
    #[inline]
    fn divisor(self, length: usize) -> usize {
        match self {
            Self::Population => length,
            Self::Sample => length.saturating_sub(1).max(1),
        }
    }
}

impl Default for Variance {
    fn default() -> Self {
        BOLLINGER_VARIANCE
    }
}

impl Display for Variance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Configuration for the Bollinger Bands ([`Bb`]) indicator.
///
/// # Example
///
/// ```
/// use quantedge_overlay::{BbConfig, IndicatorConfig, IndicatorConfigBuilder};
/// use std::num::NonZero;
///
/// // Default: length 20, 2.0 std devs, population variance
/// let config = BbConfig::builder()
///     .length(NonZero::new(20).unwrap())
///     .build();
///
/// assert_eq!(config.length(), 20);
/// assert_eq!(config, BbConfig::default());
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct BbConfig {
    length: usize,
    std_dev: StdDev,
    variance: Variance,
}

impl IndicatorConfig for BbConfig {
    type Builder = BbConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        BbConfigBuilder::new()
    }

    #[inline]
    fn required_bars(&self) -> usize {
        self.length
    }
}

impl BbConfig {
    /// BB with custom length and multiplier.
    #[must_use]
    pub fn new(length: NonZero<usize>, std_dev: StdDev) -> Self {
        Self::builder().length(length).std_dev(std_dev).build()
    }

    /// Window length (number of bars).
    #[inline]
    #[must_use]
    pub fn length(&self) -> usize {
        self.length
    }

    /// Standard deviation multiplier for the upper and lower bands.
    #[inline]
    #[must_use]
    pub fn std_dev(&self) -> StdDev {
        self.std_dev
    }

    #[inline]
    #[must_use]
    pub fn variance(&self) -> Variance {
        self.variance
    }
}

impl Default for BbConfig {
    /// BB(20, 2σ), the standard Bollinger Bands setting.
    fn default() -> Self {
        Self::new(DEFAULT_BB_LENGTH, StdDev::default())
    }
}

impl Display for BbConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BbConfig({}, {}, {})",
            self.length,
            self.std_dev.value(),
            self.variance
        )
    }
}

/// Builder for [`BbConfig`].
///
/// Defaults: `std_dev` = `2.0`, variance = [`BOLLINGER_VARIANCE`].
/// Length must be set before calling
/// [`build`](IndicatorConfigBuilder::build).
pub struct BbConfigBuilder {
    length: Option<usize>,
    std_dev: StdDev,
    variance: Variance,
}

impl BbConfigBuilder {
    fn new() -> Self {
        Self {
            length: None,
            std_dev: StdDev(2.0),
            variance: BOLLINGER_VARIANCE,
        }
    }

    /// Sets the window length.
    #[inline]
    #[must_use]
    pub fn length(mut self, length: NonZero<usize>) -> Self {
        self.length.replace(length.get());
        self
    }

    #[inline]
    #[must_use]
    pub fn std_dev(mut self, std_dev: StdDev) -> Self {
        self.std_dev = std_dev;
        self
    }

    #[inline]
    #[must_use]
    pub fn variance(mut self, variance: Variance) -> Self {
        self.variance = variance;
        self
    }
}

impl IndicatorConfigBuilder<BbConfig> for BbConfigBuilder {
    #[inline]
    fn build(self) -> BbConfig {
        BbConfig {
            length: self.length.expect("length is required"),
            std_dev: self.std_dev,
            variance: self.variance,
        }
    }
}

/// Bollinger Bands output: upper, middle, and lower bands.
///
/// The middle band is the SMA. Upper and lower bands are offset by
/// `std_dev × σ`, where `σ` is the standard deviation of the window.
///
/// ```text
/// upper  = SMA + k × σ
/// middle = SMA
/// lower  = SMA − k × σ
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BbValue {
    time: Timestamp,
    upper: Price,
    middle: Price,
    lower: Price,
}

impl BbValue {
    /// Time of the anchoring bar.
    #[inline]
    #[must_use]
    pub fn time(&self) -> Timestamp {
        self.time
    }

    /// Upper band: `SMA + k × σ`.
    #[inline]
    #[must_use]
    pub fn upper(&self) -> Price {
        self.upper
    }

    /// Middle band: SMA of the window.
    #[inline]
    #[must_use]
    pub fn middle(&self) -> Price {
        self.middle
    }

    /// Lower band: `SMA − k × σ`.
    #[inline]
    #[must_use]
    pub fn lower(&self) -> Price {
        self.lower
    }

    /// Band width: `upper − lower`.
    ///
    /// Useful for measuring volatility. Narrow width indicates
    /// consolidation (Bollinger squeeze); wide width indicates
    /// high volatility.
    #[inline]
    #[must_use]
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

impl Display for BbValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BB(u: {}, m: {}, l: {})",
            self.upper, self.middle, self.lower
        )
    }
}

/// Bollinger Bands (BB).
///
/// A volatility indicator consisting of three bands: a simple moving average
/// (middle) with upper and lower bands offset by a configurable number of
/// standard deviations.
///
/// The middle band shares the running sum used by [`Sma`](crate::Sma), so it
/// is bit-identical to the SMA of the same length. The variance is the mean
/// squared deviation from that middle over the same window (two passes per
/// window), so it is never negative and a constant window gives exactly zero
/// width. Output length follows the SMA rule.
///
/// # Example
///
/// ```
/// use quantedge_overlay::{Bb, BbConfig};
/// # use quantedge_overlay::OhlcvBar;
/// # fn bar(close: f64, time: u64) -> OhlcvBar {
/// #     OhlcvBar { time, open: close, high: close, low: close, close, volume: 0.0 }
/// # }
///
/// let bb = Bb::new(BbConfig::default());
/// let bars: Vec<_> = (1..=25).map(|t| bar(150.0, t)).collect();
///
/// let bands = bb.compute(&bars);
/// assert_eq!(bands.len(), 6);
/// for value in bands {
///     assert_eq!((value.upper(), value.middle(), value.lower()), (150.0, 150.0, 150.0));
/// }
/// ```
#[derive(Clone, Debug)]
pub struct Bb {
    config: BbConfig,
    variance_divisor: f64,
    std_dev_multiplier: f64,
}

impl Bb {
    /// Two-pass standard deviation of `values` around `mean`.
    fn window_std_dev(&self, values: &[Price], mean: Price) -> f64 {
        let squared_deviations = values.iter().fold(0.0, |acc, &close| {
            let deviation = close - mean;
            deviation.mul_add(deviation, acc)
        });

        (squared_deviations / self.variance_divisor).sqrt()
    }
}

impl Indicator for Bb {
    type Config = BbConfig;
    type Output = BbValue;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            #[allow(clippy::cast_precision_loss)]
            variance_divisor: config.variance.divisor(config.length) as f64,
            std_dev_multiplier: config.std_dev.0,
        }
    }

    fn compute(&self, bars: &[impl Ohlcv]) -> Vec<BbValue> {
        let closes = closes(bars);

        RollingSum::new(&closes, self.config.length)
            .map(|window| {
                let middle = window.mean();
                let offset = if window.constant {
                    0.0
                } else {
                    self.std_dev_multiplier * self.window_std_dev(window.values, middle)
                };

                BbValue {
                    time: bars[window.end].time(),
                    upper: middle + offset,
                    middle,
                    lower: middle - offset,
                }
            })
            .collect()
    }

    #[inline]
    fn config(&self) -> &BbConfig {
        &self.config
    }
}

impl Display for Bb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BB({}, {})", self.config.length, self.std_dev_multiplier)
    }
}

/// Bollinger Bands of closing prices.
///
/// See [`Bb`].
#[must_use]
pub fn bollinger(bars: &[impl Ohlcv], period: NonZero<usize>, std_dev: StdDev) -> Vec<BbValue> {
    Bb::new(BbConfig::new(period, std_dev)).compute(bars)
}
