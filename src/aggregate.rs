//! Computes a chart's indicator list against one bar series and shapes the
//! output for the renderer.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::{
    Bb, BbValue, Ema, IndicatorRequest, IndicatorSpec, Macd, MacdValue, Ohlcv, Point, Rsi, Sma,
};

/// MACD reshaped into three parallel `{time, value}` lines.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MacdSeries {
    pub macd: Vec<Point>,
    pub signal: Vec<Point>,
    pub histogram: Vec<Point>,
}

impl FromIterator<MacdValue> for MacdSeries {
    fn from_iter<I: IntoIterator<Item = MacdValue>>(iter: I) -> Self {
        let mut series = Self::default();
        for value in iter {
            series.macd.push(Point::new(value.time(), value.macd()));
            series.signal.push(Point::new(value.time(), value.signal()));
            series
                .histogram
                .push(Point::new(value.time(), value.histogram()));
        }
        series
    }
}

/// Bollinger Bands reshaped into three parallel `{time, value}` lines.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BandSeries {
    pub upper: Vec<Point>,
    pub middle: Vec<Point>,
    pub lower: Vec<Point>,
}

impl FromIterator<BbValue> for BandSeries {
    fn from_iter<I: IntoIterator<Item = BbValue>>(iter: I) -> Self {
        let mut series = Self::default();
        for value in iter {
            series.upper.push(Point::new(value.time(), value.upper()));
            series.middle.push(Point::new(value.time(), value.middle()));
            series.lower.push(Point::new(value.time(), value.lower()));
        }
        series
    }
}

/// Renderer-ready output of one indicator.
///
/// Serialises untagged: a line is a flat `[{time, value}]` array, composite
/// indicators are an object of named flat arrays
/// (`{macd, signal, histogram}` or `{upper, middle, lower}`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum IndicatorSeries {
    Line(Vec<Point>),
    Macd(MacdSeries),
    Bands(BandSeries),
}

impl IndicatorSeries {
    /// Number of bars with a value.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Line(points) => points.len(),
            Self::Macd(series) => series.macd.len(),
            Self::Bands(series) => series.middle.len(),
        }
    }

    /// `true` while there is not enough history for a first value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn as_line(&self) -> Option<&[Point]> {
        match self {
            Self::Line(points) => Some(points),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_macd(&self) -> Option<&MacdSeries> {
        match self {
            Self::Macd(series) => Some(series),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bands(&self) -> Option<&BandSeries> {
        match self {
            Self::Bands(series) => Some(series),
            _ => None,
        }
    }
}

/// Indicator output keyed by request id.
pub type IndicatorResults = BTreeMap<String, IndicatorSeries>;

impl IndicatorSpec {
    /// Computes this indicator over `bars`.
    #[must_use]
    pub fn compute(&self, bars: &[impl Ohlcv]) -> IndicatorSeries {
        match *self {
            Self::Sma(config) => IndicatorSeries::Line(Sma::new(config).compute(bars)),
            Self::Ema(config) => IndicatorSeries::Line(Ema::new(config).compute(bars)),
            Self::Rsi(config) => IndicatorSeries::Line(Rsi::new(config).compute(bars)),
            Self::Macd(config) => {
                IndicatorSeries::Macd(Macd::new(config).compute(bars).into_iter().collect())
            }
            Self::Bollinger(config) => {
                IndicatorSeries::Bands(Bb::new(config).compute(bars).into_iter().collect())
            }
        }
    }
}

/// Computes every visible request against `bars`.
///
/// Hidden requests produce no entry. A request whose parameters cannot be
/// resolved is logged at `warn` level and produces no entry either; the
/// remaining requests are unaffected. An indicator without enough history
/// maps to an empty series. When two requests share an id the later one
/// wins.
///
/// Nothing is cached: each call recomputes from the full bar slice.
///
/// # Example
///
/// ```
/// use quantedge_overlay::{IndicatorKind, IndicatorRequest, calculate_indicators};
/// # use quantedge_overlay::OhlcvBar;
/// # fn bar(close: f64, time: u64) -> OhlcvBar {
/// #     OhlcvBar { time, open: close, high: close, low: close, close, volume: 0.0 }
/// # }
///
/// let bars: Vec<_> = (1..=60).map(|t| bar(100.0 + t as f64, t)).collect();
/// let requests = [
///     IndicatorRequest::new("sma", IndicatorKind::Sma).param("period", 10.0),
///     IndicatorRequest::new("macd", IndicatorKind::Macd),
///     IndicatorRequest::new("rsi", IndicatorKind::Rsi).visible(false),
/// ];
///
/// let results = calculate_indicators(&bars, &requests);
///
/// assert_eq!(results["sma"].as_line().unwrap().len(), 51);
/// assert_eq!(results["macd"].as_macd().unwrap().signal.len(), 27);
/// assert!(!results.contains_key("rsi"));
/// ```
#[must_use]
pub fn calculate_indicators(bars: &[impl Ohlcv], requests: &[IndicatorRequest]) -> IndicatorResults {
    let mut results = IndicatorResults::new();

    for request in requests {
        if !request.visible {
            debug!(id = %request.id, kind = %request.kind, "skipping hidden indicator");
            continue;
        }

        let spec = match request.resolve() {
            Ok(spec) => spec,
            Err(err) => {
                warn!(
                    id = %request.id,
                    kind = %request.kind,
                    error = %err,
                    "invalid indicator parameters, skipping"
                );
                continue;
            }
        };

        let series = spec.compute(bars);
        trace!(
            id = %request.id,
            indicator = %spec,
            bars = bars.len(),
            points = series.len(),
            "computed indicator"
        );

        results.insert(request.id.clone(), series);
    }

    results
}
