use std::{fmt::Display, num::NonZero};

use crate::{
    Indicator, IndicatorConfig, IndicatorConfigBuilder, Ohlcv, Point, Price, ohlcv::closes,
};

/// Default RSI length.
pub const DEFAULT_RSI_LENGTH: NonZero<usize> = NonZero::new(14).unwrap();

/// Configuration for the Relative Strength Index ([`Rsi`])
/// indicator.
///
/// RSI uses Wilder's smoothing, which has infinite memory: the
/// SMA seed (first `length` price changes) influences all
/// subsequent values. Output begins at bar `length + 1`.
///
/// # Example
///
/// ```
/// use quantedge_overlay::{IndicatorConfig, RsiConfig};
/// use std::num::NonZero;
///
/// let config = RsiConfig::new(NonZero::new(14).unwrap());
/// assert_eq!(config.length(), 14);
/// assert_eq!(config.required_bars(), 15);
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct RsiConfig {
    length: usize,
}

impl IndicatorConfig for RsiConfig {
    type Builder = RsiConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        RsiConfigBuilder::new()
    }

    /// `length` price changes need `length + 1` bars.
    #[inline]
    fn required_bars(&self) -> usize {
        self.length.saturating_add(1)
    }
}

impl RsiConfig {
    /// RSI over closing prices.
    #[must_use]
    pub fn new(length: NonZero<usize>) -> Self {
        Self::builder().length(length).build()
    }

    /// Number of price changes averaged into the seed.
    #[inline]
    #[must_use]
    pub fn length(&self) -> usize {
        self.length
    }
}

impl Default for RsiConfig {
    /// RSI(14).
    fn default() -> Self {
        Self::new(DEFAULT_RSI_LENGTH)
    }
}

impl Display for RsiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RsiConfig({})", self.length)
    }
}

/// Builder for [`RsiConfig`].
///
/// Length must be set before calling
/// [`build`](IndicatorConfigBuilder::build).
pub struct RsiConfigBuilder {
    length: Option<usize>,
}

impl RsiConfigBuilder {
    #[must_use]
    fn new() -> Self {
        Self { length: None }
    }

    /// Sets the smoothing length.
    #[inline]
    #[must_use]
    pub fn length(mut self, length: NonZero<usize>) -> Self {
        self.length = Some(length.get());
        self
    }
}

impl IndicatorConfigBuilder<RsiConfig> for RsiConfigBuilder {
    #[inline]
    fn build(self) -> RsiConfig {
        let length = self.length.expect("length is required");

        RsiConfig { length }
    }
}

/// Average gain and loss carried across Wilder's recurrence.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct WilderState {
    pub avg_gain: f64,
    pub avg_loss: f64,
}

impl WilderState {
    /// Plain means of the seed gains and losses.
    pub fn seed(changes: &[(Price, Price)]) -> Self {
        #[allow(clippy::cast_precision_loss)]
        let length = changes.len() as f64;
        let (sum_gain, sum_loss) = changes
            .iter()
            .fold((0.0, 0.0), |(g, l), &(gain, loss)| (g + gain, l + loss));

        Self {
            avg_gain: sum_gain / length,
            avg_loss: sum_loss / length,
        }
    }

    /// `avg = (avg × (length − 1) + x) / length` for both averages.
    #[inline]
    #[must_use]
    pub fn step(self, (gain, loss): (Price, Price), length: f64) -> Self {
        let length_minus_one = length - 1.0;

        Self {
            avg_gain: self.avg_gain.mul_add(length_minus_one, gain) / length,
            avg_loss: self.avg_loss.mul_add(length_minus_one, loss) / length,
        }
    }

    /// RSI for the current averages. A zero average loss maps to 100.
    #[inline]
    pub fn rsi(self) -> f64 {
        if self.avg_loss == 0.0 {
            100.0
        } else {
            100.0 - 100.0 / (1.0 + self.avg_gain / self.avg_loss)
        }
    }
}

#[inline]
fn gain_and_loss(prev_price: Price, price: Price) -> (Price, Price) {
    let change = price - prev_price;
    let gain = change.max(0.0);
    let loss = (-change).max(0.0);

    (gain, loss)
}

/// Relative Strength Index (RSI) with Wilder's smoothing.
///
/// Measures the speed and magnitude of recent price changes on
/// a 0–100 scale. Values above 70 are conventionally considered
/// overbought; below 30, oversold.
///
/// The first `length` price changes are averaged with a simple
/// mean (SMA seed). After seeding, gains and losses are smoothed
/// with Wilder's method (`α = 1 / length`):
///
/// ```text
/// avg_gain = (prev_avg_gain × (length − 1) + gain) / length
/// avg_loss = (prev_avg_loss × (length − 1) + loss) / length
/// RSI      = 100 − 100 / (1 + avg_gain / avg_loss)
/// ```
///
/// When `avg_loss` is zero the RSI is 100, so a flat or rising
/// series never produces `NaN`. The first point is anchored at bar
/// index `length`; output has `bars.len() − length` points.
///
/// # Example
///
/// ```
/// use quantedge_overlay::{Rsi, RsiConfig};
/// use std::num::NonZero;
/// # use quantedge_overlay::OhlcvBar;
/// # fn bar(close: f64, time: u64) -> OhlcvBar {
/// #     OhlcvBar { time, open: close, high: close, low: close, close, volume: 0.0 }
/// # }
///
/// let rsi = Rsi::new(RsiConfig::new(NonZero::new(3).unwrap()));
///
/// // Seeding needs 3 price changes (4 bars):
/// // changes = +2, −1, +2 → avg_gain = 4/3, avg_loss = 1/3 → RSI = 80
/// let points = rsi.compute(&[bar(10.0, 1), bar(12.0, 2), bar(11.0, 3), bar(13.0, 4)]);
///
/// assert_eq!(points.len(), 1);
/// assert_eq!(points[0].time, 4);
/// assert!((points[0].value - 80.0).abs() < 1e-9);
/// ```
#[derive(Clone, Debug)]
pub struct Rsi {
    config: RsiConfig,
    length: f64,
}

impl Indicator for Rsi {
    type Config = RsiConfig;
    type Output = Point;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            #[allow(clippy::cast_precision_loss)]
            length: config.length as f64,
        }
    }

    fn compute(&self, bars: &[impl Ohlcv]) -> Vec<Point> {
        let length = self.config.length;
        if bars.len() < self.config.required_bars() {
            return Vec::new();
        }

        let changes: Vec<_> = closes(bars)
            .windows(2)
            .map(|w| gain_and_loss(w[0], w[1]))
            .collect();

        let (seed, rest) = changes.split_at(length);
        let seeded = WilderState::seed(seed);

        // Change `i` ends at bar `i + 1`; the seed ends at bar `length`.
        let values = std::iter::once(seeded.rsi()).chain(rest.iter().scan(
            seeded,
            |state, &change| {
                *state = state.step(change, self.length);
                Some(state.rsi())
            },
        ));

        values
            .zip(&bars[length..])
            .map(|(value, bar)| Point::new(bar.time(), value))
            .collect()
    }

    #[inline]
    fn config(&self) -> &RsiConfig {
        &self.config
    }
}

impl Display for Rsi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RSI({})", self.config.length)
    }
}

/// RSI of closing prices with `period` smoothing.
///
/// See [`Rsi`].
#[must_use]
pub fn rsi(bars: &[impl Ohlcv], period: NonZero<usize>) -> Vec<Point> {
    Rsi::new(RsiConfig::new(period)).compute(bars)
}
