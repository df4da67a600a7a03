use std::{
    fmt::{Debug, Display},
    num::NonZero,
};

use crate::{
    Indicator, IndicatorConfig, IndicatorConfigBuilder, Ohlcv, Point, Price, ohlcv::closes,
};

/// Default EMA window length.
pub const DEFAULT_EMA_LENGTH: NonZero<usize> = NonZero::new(12).unwrap();

/// Configuration for the Exponential Moving Average ([`Ema`])
/// indicator.
///
/// # Example
///
/// ```
/// use quantedge_overlay::{EmaConfig, IndicatorConfig};
/// use std::num::NonZero;
///
/// let config = EmaConfig::new(NonZero::new(20).unwrap());
///
/// assert_eq!(config.length(), 20);
/// assert_eq!(config.required_bars(), 20);
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct EmaConfig {
    length: NonZero<usize>,
}

impl IndicatorConfig for EmaConfig {
    type Builder = EmaConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        EmaConfigBuilder::new()
    }

    #[inline]
    fn required_bars(&self) -> usize {
        self.length.get()
    }
}

impl EmaConfig {
    /// EMA over closing prices with the given window length.
    #[must_use]
    pub fn new(length: NonZero<usize>) -> Self {
        Self::builder().length(length).build()
    }

    /// Window length (number of bars).
    #[inline]
    #[must_use]
    pub fn length(&self) -> usize {
        self.length.get()
    }
}

impl Default for EmaConfig {
    /// EMA(12).
    fn default() -> Self {
        Self::new(DEFAULT_EMA_LENGTH)
    }
}

impl Display for EmaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EmaConfig({})", self.length)
    }
}

/// Builder for [`EmaConfig`].
///
/// Length must be set before calling
/// [`build`](IndicatorConfigBuilder::build).
pub struct EmaConfigBuilder {
    length: Option<NonZero<usize>>,
}

impl EmaConfigBuilder {
    fn new() -> Self {
        Self { length: None }
    }

    /// Sets the indicator window length.
    #[inline]
    #[must_use]
    pub fn length(mut self, length: NonZero<usize>) -> Self {
        self.length.replace(length);
        self
    }
}

impl IndicatorConfigBuilder<EmaConfig> for EmaConfigBuilder {
    #[inline]
    fn build(self) -> EmaConfig {
        EmaConfig {
            length: self.length.expect("length is required"),
        }
    }
}

/// Accumulator carried across the EMA recurrence.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct EmaState {
    pub ema: f64,
}

impl EmaState {
    /// Seeds the recurrence with the simple mean of `seed`.
    ///
    /// The mean is taken around the first value, so a constant seed yields
    /// that value exactly and the recurrence stays on it.
    #[inline]
    pub fn seed(seed: &[Price]) -> Self {
        #[allow(clippy::cast_precision_loss)]
        let length = seed.len() as f64;
        let pivot = seed[0];
        let deviations = seed.iter().fold(0.0, |acc, v| acc + (v - pivot));

        Self {
            ema: pivot + deviations / length,
        }
    }

    /// One step: `ema = (value − ema) × multiplier + ema`.
    #[inline]
    #[must_use]
    pub fn step(self, value: Price, multiplier: f64) -> Self {
        Self {
            ema: multiplier.mul_add(value - self.ema, self.ema),
        }
    }
}

/// Smoothing factor `2 / (length + 1)`.
#[inline]
pub(crate) fn multiplier(length: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let length = length as f64;
    2.0 / (length + 1.0)
}

/// Exponential smoothing over a raw value sequence.
///
/// The first output is the simple mean of the first `period` values (the
/// seed); each following output applies
///
/// ```text
/// ema[i] = (value[i] − ema[i−1]) × k + ema[i−1],   k = 2 / (period + 1)
/// ```
///
/// Output `j` corresponds to input `j + period − 1`, so the result holds
/// `values.len() − period + 1` values, or none when `values` is shorter
/// than `period`.
///
/// # Example
///
/// ```
/// use quantedge_overlay::ema_from_values;
/// use std::num::NonZero;
///
/// // Seed = (2 + 4 + 6) / 3 = 4; k = 0.5 → (8 − 4) × 0.5 + 4 = 6
/// let ema = ema_from_values(&[2.0, 4.0, 6.0, 8.0], NonZero::new(3).unwrap());
/// assert_eq!(ema, vec![4.0, 6.0]);
/// ```
#[must_use]
pub fn ema_from_values(values: &[Price], period: NonZero<usize>) -> Vec<f64> {
    let period = period.get();
    if values.len() < period {
        return Vec::new();
    }

    let (seed, rest) = values.split_at(period);
    let multiplier = multiplier(period);

    let seeded = EmaState::seed(seed);

    std::iter::once(seeded.ema)
        .chain(rest.iter().scan(seeded, |state, &value| {
            *state = state.step(value, multiplier);
            Some(state.ema)
        }))
        .collect()
}

/// Exponential Moving Average (EMA).
///
/// A weighted moving average that gives more weight to recent
/// closes. Uses the standard smoothing factor
/// `α = 2 / (length + 1)` and an SMA seed over the first `length`
/// closes, see [`ema_from_values`].
///
/// Point `j` is anchored at bar `j + length − 1`.
///
/// # Example
///
/// ```
/// use quantedge_overlay::{Ema, EmaConfig};
/// use std::num::NonZero;
/// # use quantedge_overlay::OhlcvBar;
/// # fn bar(close: f64, time: u64) -> OhlcvBar {
/// #     OhlcvBar { time, open: close, high: close, low: close, close, volume: 0.0 }
/// # }
///
/// let ema = Ema::new(EmaConfig::new(NonZero::new(3).unwrap()));
/// let points = ema.compute(&[bar(2.0, 1), bar(4.0, 2), bar(6.0, 3), bar(8.0, 4)]);
///
/// // SMA seed = (2 + 4 + 6) / 3 = 4.0, then 8 × 0.5 + 4 × 0.5 = 6.0
/// assert_eq!((points[0].time, points[0].value), (3, 4.0));
/// assert_eq!((points[1].time, points[1].value), (4, 6.0));
/// ```
#[derive(Clone, Debug)]
pub struct Ema {
    config: EmaConfig,
}

impl Indicator for Ema {
    type Config = EmaConfig;
    type Output = Point;

    fn new(config: Self::Config) -> Self {
        Self { config }
    }

    fn compute(&self, bars: &[impl Ohlcv]) -> Vec<Point> {
        let period = self.config.length;
        let length = period.get();
        if bars.len() < length {
            return Vec::new();
        }

        ema_from_values(&closes(bars), period)
            .into_iter()
            .zip(&bars[length - 1..])
            .map(|(value, bar)| Point::new(bar.time(), value))
            .collect()
    }

    #[inline]
    fn config(&self) -> &EmaConfig {
        &self.config
    }
}

impl Display for Ema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EMA({})", self.config.length)
    }
}

/// EMA of closing prices over `period` bars.
///
/// See [`Ema`].
#[must_use]
pub fn ema(bars: &[impl Ohlcv], period: NonZero<usize>) -> Vec<Point> {
    Ema::new(EmaConfig::new(period)).compute(bars)
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::test_util::{assert_approx, bars, nz};

    mod from_values {
        use super::*;

        #[test]
        fn empty_when_shorter_than_period() {
            assert!(ema_from_values(&[1.0, 2.0], nz(3)).is_empty());
        }

        #[test]
        fn seed_is_simple_mean_not_first_value() {
            let ema = ema_from_values(&[2.0, 4.0, 9.0], nz(3));
            assert_eq!(ema, vec![5.0]);
        }

        #[test]
        fn applies_recurrence_after_seed() {
            // k = 2 / 4 = 0.5
            // seed = 4, then (8 − 4) × 0.5 + 4 = 6, then (2 − 6) × 0.5 + 6 = 4
            let ema = ema_from_values(&[2.0, 4.0, 6.0, 8.0, 2.0], nz(3));
            assert_eq!(ema, vec![4.0, 6.0, 4.0]);
        }

        #[test]
        fn output_length() {
            let values: Vec<f64> = (0..50).map(f64::from).collect();
            assert_eq!(ema_from_values(&values, nz(12)).len(), 39);
        }

        #[test]
        fn period_one_tracks_input() {
            // k = 1 → ema = value
            let ema = ema_from_values(&[3.0, 7.0, 1.0], nz(1));
            assert_eq!(ema, vec![3.0, 7.0, 1.0]);
        }

        #[test]
        fn non_trivial_multiplier() {
            // EMA(4): k = 0.4, seed = (1 + 2 + 3 + 4) / 4 = 2.5
            // next = (10 − 2.5) × 0.4 + 2.5 = 5.5
            let ema = ema_from_values(&[1.0, 2.0, 3.0, 4.0, 10.0], nz(4));
            assert_eq!(ema[0], 2.5);
            assert_approx!(ema[1], 5.5);
        }
    }

    mod state {
        use super::*;

        #[test]
        fn step_moves_towards_value() {
            let state = EmaState { ema: 10.0 }.step(20.0, 0.25);
            assert_eq!(state.ema, 12.5);
        }

        #[test]
        fn step_at_value_is_fixed_point() {
            let state = EmaState { ema: 7.5 }.step(7.5, multiplier(26));
            assert_eq!(state.ema, 7.5);
        }

        #[test]
        fn multiplier_standard_values() {
            assert_eq!(multiplier(3), 0.5);
            assert_approx!(multiplier(12), 2.0 / 13.0);
        }
    }

    mod anchoring {
        use super::*;

        #[test]
        fn anchors_at_seed_end() {
            let points = ema(&bars(&[2.0, 4.0, 6.0, 8.0]), nz(3));
            let times: Vec<_> = points.iter().map(|p| p.time).collect();
            assert_eq!(times, vec![3, 4]);
        }

        #[test]
        fn empty_when_insufficient() {
            assert!(ema(&bars(&[1.0; 5]), nz(6)).is_empty());
        }

        #[test]
        fn constant_prices_yield_constant() {
            let points = ema(&bars(&[150.0; 40]), nz(12));
            assert_eq!(points.len(), 29);
            assert!(points.iter().all(|p| p.value == 150.0));
        }

        #[test]
        fn inexact_constant_prices_yield_exact_price() {
            for price in [100.1, 0.1, 1.7] {
                let points = ema(&bars(&[price; 60]), nz(12));
                assert_eq!(points.len(), 49);
                assert!(points.iter().all(|p| p.value == price), "EMA drifted off {price}");
            }
        }
    }

    mod display {
        use super::*;

        #[test]
        fn formats_correctly() {
            let ema = Ema::new(EmaConfig::new(nz(20)));
            assert_eq!(ema.to_string(), "EMA(20)");
        }

        #[test]
        fn display_config() {
            assert_eq!(EmaConfig::new(nz(9)).to_string(), "EmaConfig(9)");
        }
    }

    mod config {
        use super::*;

        #[test]
        fn default_is_twelve() {
            assert_eq!(EmaConfig::default().length(), 12);
        }

        #[test]
        #[should_panic(expected = "length is required")]
        fn panics_without_length() {
            let _ = EmaConfig::builder().build();
        }
    }
}
