use serde::{Deserialize, Serialize};

/// A price value.
///
/// Semantic alias for [`f64`]. Documents intent in function signatures
/// without introducing newtype construction overhead.
pub type Price = f64;

/// Bar timestamp in unix seconds.
///
/// Copied verbatim into every output point anchored at the bar. Must be
/// non-decreasing across a bar slice.
pub type Timestamp = u64;

/// OHLCV bar data used as input to all indicators.
///
/// Implement this on your own kline/candle type to avoid per-call
/// conversion. Indicators accept `&[impl Ohlcv]` and read only
/// [`close`](Ohlcv::close) and [`time`](Ohlcv::time); the remaining
/// fields belong to the bar source.
///
/// # Example
///
/// ```
/// use quantedge_overlay::{Ohlcv, Price, Timestamp};
///
/// struct MyKline {
///     o: f64, h: f64, l: f64, c: f64,
///     ts: u64,
/// }
///
/// impl Ohlcv for MyKline {
///     fn open(&self) -> Price { self.o }
///     fn high(&self) -> Price { self.h }
///     fn low(&self) -> Price { self.l }
///     fn close(&self) -> Price { self.c }
///     fn time(&self) -> Timestamp { self.ts }
/// }
/// ```
pub trait Ohlcv {
    /// Opening price of the bar.
    fn open(&self) -> Price;

    /// Highest price during the bar.
    fn high(&self) -> Price;

    /// Lowest price during the bar.
    fn low(&self) -> Price;

    /// Closing (or latest) price of the bar.
    fn close(&self) -> Price;

    /// Bar timestamp (unix seconds).
    ///
    /// Values must be non-decreasing across a slice. The engine never
    /// reorders or deduplicates bars.
    fn time(&self) -> Timestamp;

    /// Trade volume during the bar. Defaults to `0.0`.
    fn volume(&self) -> f64 {
        0.0
    }
}

/// Plain OHLCV bar, as delivered by the market-data store.
///
/// Serialises as `{"time", "open", "high", "low", "close", "volume"}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OhlcvBar {
    pub time: Timestamp,
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
    #[serde(default)]
    pub volume: f64,
}

impl Ohlcv for OhlcvBar {
    #[inline]
    fn open(&self) -> Price {
        self.open
    }

    #[inline]
    fn high(&self) -> Price {
        self.high
    }

    #[inline]
    fn low(&self) -> Price {
        self.low
    }

    #[inline]
    fn close(&self) -> Price {
        self.close
    }

    #[inline]
    fn time(&self) -> Timestamp {
        self.time
    }

    #[inline]
    fn volume(&self) -> f64 {
        self.volume
    }
}

/// Extracts closing prices, asserting ascending time in debug builds.
pub(crate) fn closes(bars: &[impl Ohlcv]) -> Vec<Price> {
    debug_assert!(
        bars.windows(2).all(|w| w[0].time() <= w[1].time()),
        "bar time must be non-decreasing"
    );

    bars.iter().map(Ohlcv::close).collect()
}
