use std::{fmt::Display, num::NonZero};

use serde::Serialize;

use crate::{
    Indicator, IndicatorConfig, IndicatorConfigBuilder, Ohlcv, Price, Timestamp,
    ema::ema_from_values, ohlcv::closes,
};

/// Default fast EMA length.
pub const DEFAULT_MACD_FAST: NonZero<usize> = NonZero::new(12).unwrap();
/// Default slow EMA length.
pub const DEFAULT_MACD_SLOW: NonZero<usize> = NonZero::new(26).unwrap();
/// Default signal EMA length.
pub const DEFAULT_MACD_SIGNAL: NonZero<usize> = NonZero::new(9).unwrap();

/// Configuration for the Moving Average Convergence Divergence
/// ([`Macd`]) indicator.
///
/// # Example
///
/// ```
/// use quantedge_overlay::{IndicatorConfig, MacdConfig};
///
/// let config = MacdConfig::default();
///
/// assert_eq!(config.fast_length(), 12);
/// assert_eq!(config.slow_length(), 26);
/// assert_eq!(config.signal_length(), 9);
/// assert_eq!(config.required_bars(), 34);
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct MacdConfig {
    fast: NonZero<usize>,
    slow: NonZero<usize>,
    signal: NonZero<usize>,
}

impl IndicatorConfig for MacdConfig {
    type Builder = MacdConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        MacdConfigBuilder::new()
    }

    /// `max(fast, slow) + signal − 1`: the longer EMA's seed plus the
    /// signal EMA's seed over the MACD line.
    #[inline]
    fn required_bars(&self) -> usize {
        self.fast
            .max(self.slow)
            .get()
            .saturating_add(self.signal.get() - 1)
    }
}

impl MacdConfig {
    /// MACD over closing prices.
    #[must_use]
    pub fn new(fast: NonZero<usize>, slow: NonZero<usize>, signal: NonZero<usize>) -> Self {
        Self::builder()
            .fast_length(fast)
            .slow_length(slow)
            .signal_length(signal)
            .build()
    }

    #[inline]
    #[must_use]
    pub fn fast_length(&self) -> usize {
        self.fast.get()
    }

    #[inline]
    #[must_use]
    pub fn slow_length(&self) -> usize {
        self.slow.get()
    }

    #[inline]
    #[must_use]
    pub fn signal_length(&self) -> usize {
        self.signal.get()
    }
}

impl Default for MacdConfig {
    /// MACD(12, 26, 9).
    fn default() -> Self {
        Self::new(DEFAULT_MACD_FAST, DEFAULT_MACD_SLOW, DEFAULT_MACD_SIGNAL)
    }
}

impl Display for MacdConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MacdConfig({}, {}, {})", self.fast, self.slow, self.signal)
    }
}

/// Builder for [`MacdConfig`].
///
/// Defaults: fast = 12, slow = 26, signal = 9.
pub struct MacdConfigBuilder {
    fast: NonZero<usize>,
    slow: NonZero<usize>,
    signal: NonZero<usize>,
}

impl MacdConfigBuilder {
    fn new() -> Self {
        Self {
            fast: DEFAULT_MACD_FAST,
            slow: DEFAULT_MACD_SLOW,
            signal: DEFAULT_MACD_SIGNAL,
        }
    }

    #[inline]
    #[must_use]
    pub fn fast_length(mut self, length: NonZero<usize>) -> Self {
        self.fast = length;
        self
    }

    #[inline]
    #[must_use]
    pub fn slow_length(mut self, length: NonZero<usize>) -> Self {
        self.slow = length;
        self
    }

    #[inline]
    #[must_use]
    pub fn signal_length(mut self, length: NonZero<usize>) -> Self {
        self.signal = length;
        self
    }
}

impl IndicatorConfigBuilder<MacdConfig> for MacdConfigBuilder {
    #[inline]
    fn build(self) -> MacdConfig {
        MacdConfig {
            fast: self.fast,
            slow: self.slow,
            signal: self.signal,
        }
    }
}

/// MACD output for one bar.
///
/// ```text
/// macd      = EMA(fast) − EMA(slow)
/// signal    = EMA(signal) of macd
/// histogram = macd − signal
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacdValue {
    time: Timestamp,
    macd: Price,
    signal: Price,
    histogram: Price,
}

impl MacdValue {
    fn new(time: Timestamp, macd: Price, signal: Price) -> Self {
        Self {
            time,
            macd,
            signal,
            histogram: macd - signal,
        }
    }

    /// Time of the anchoring bar.
    #[inline]
    #[must_use]
    pub fn time(&self) -> Timestamp {
        self.time
    }

    /// MACD line: fast EMA minus slow EMA.
    #[inline]
    #[must_use]
    pub fn macd(&self) -> Price {
        self.macd
    }

    /// Signal line: EMA of the MACD line.
    #[inline]
    #[must_use]
    pub fn signal(&self) -> Price {
        self.signal
    }

    /// `macd − signal`.
    #[inline]
    #[must_use]
    pub fn histogram(&self) -> Price {
        self.histogram
    }
}

impl Display for MacdValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "MACD(m: {}, s: {}, h: {})",
            self.macd, self.signal, self.histogram
        )
    }
}

/// Moving Average Convergence Divergence (MACD).
///
/// Built from three [`ema_from_values`] passes: fast and slow EMAs over the
/// closes, then the signal EMA over their difference.
///
/// # Alignment
///
/// An EMA of length *p* is seeded by its first *p* inputs, so its value `j`
/// belongs to input `j + p − 1`. For the fast and slow EMAs over the closes:
///
/// ```text
/// fast[j] ↔ bar j + fast − 1
/// slow[i] ↔ bar i + slow − 1
/// ```
///
/// Both exist from bar `base = max(fast, slow) − 1` on. MACD value `m` at bar
/// `base + m` pairs `fast[m + (base + 1 − fast)]` with
/// `slow[m + (base + 1 − slow)]`; for the usual `fast < slow` that is
/// `fast[m + slow − fast]` with `slow[m]`. The signal EMA adds its own seed,
/// so signal value `s` lands on bar `base + s + signal − 1`.
///
/// # Example
///
/// ```
/// use quantedge_overlay::{Macd, MacdConfig};
/// # use quantedge_overlay::OhlcvBar;
/// # fn bar(close: f64, time: u64) -> OhlcvBar {
/// #     OhlcvBar { time, open: close, high: close, low: close, close, volume: 0.0 }
/// # }
///
/// let bars: Vec<_> = (0..50).map(|i| bar(100.0 + 2.0 * i as f64, i)).collect();
/// let points = Macd::new(MacdConfig::default()).compute(&bars);
///
/// // 50 − (26 + 9 − 1) + 1
/// assert_eq!(points.len(), 17);
/// assert_eq!(points[0].time(), 33);
/// assert!(points.iter().all(|p| p.macd() > 0.0));
/// ```
#[derive(Clone, Debug)]
pub struct Macd {
    config: MacdConfig,
}

impl Macd {
    /// First bar index at which both fast and slow EMA exist.
    #[inline]
    fn base(&self) -> usize {
        self.config.fast.max(self.config.slow).get() - 1
    }

    /// MACD line values, index `m` anchored at bar `base + m`.
    fn macd_line(&self, closes: &[Price], fast: NonZero<usize>, slow: NonZero<usize>) -> Vec<f64> {
        let fast_ema = ema_from_values(closes, fast);
        let slow_ema = ema_from_values(closes, slow);

        let base = self.base();
        let fast_offset = base + 1 - fast.get();
        let slow_offset = base + 1 - slow.get();

        (0..)
            .map_while(|m| {
                let fast_value = fast_ema.get(m + fast_offset)?;
                let slow_value = slow_ema.get(m + slow_offset)?;
                Some(fast_value - slow_value)
            })
            .collect()
    }
}

impl Indicator for Macd {
    type Config = MacdConfig;
    type Output = MacdValue;

    fn new(config: Self::Config) -> Self {
        Self { config }
    }

    fn compute(&self, bars: &[impl Ohlcv]) -> Vec<MacdValue> {
        let MacdConfig { fast, slow, signal } = self.config;
        if bars.len() < self.config.required_bars() {
            return Vec::new();
        }

        let macd_line = self.macd_line(&closes(bars), fast, slow);
        let signal_line = ema_from_values(&macd_line, signal);

        let lag = signal.get() - 1;
        let first_bar = self.base() + lag;

        signal_line
            .into_iter()
            .zip(&macd_line[lag..])
            .zip(&bars[first_bar..])
            .map(|((signal, &macd), bar)| MacdValue::new(bar.time(), macd, signal))
            .collect()
    }

    #[inline]
    fn config(&self) -> &MacdConfig {
        &self.config
    }
}

impl Display for Macd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "MACD({}, {}, {})",
            self.config.fast, self.config.slow, self.config.signal
        )
    }
}

/// MACD of closing prices.
///
/// See [`Macd`].
#[must_use]
pub fn macd(
    bars: &[impl Ohlcv],
    fast: NonZero<usize>,
    slow: NonZero<usize>,
    signal: NonZero<usize>,
) -> Vec<MacdValue> {
    Macd::new(MacdConfig::new(fast, slow, signal)).compute(bars)
}
