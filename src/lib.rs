//! Technical indicator overlays for price charts.
//!
//! Indicators accept a slice of any type implementing [`Ohlcv`] and
//! return a series with one entry per bar that has enough history.
//! Every entry carries the timestamp of the bar it belongs to, so the
//! output can be drawn directly on top of the price series.
//!
//! Each indicator type ([`Sma`], [`Ema`], [`Rsi`], [`Macd`], [`Bb`])
//! exposes [`new`](Sma::new), [`compute`](Sma::compute), and
//! [`config`](Sma::config) as inherent methods, so no trait import is
//! needed. Import [`Indicator`] only for generic code.
//!
//! Charts that hold a list of untyped indicator requests go through
//! [`calculate_indicators`], which resolves parameters, applies defaults,
//! and shapes the output for rendering.

mod aggregate;
mod bb;
mod ema;
mod error;
mod indicator;
mod macd;
mod ohlcv;
mod request;
mod rsi;
mod sma;
mod window;

pub use crate::indicator::{Indicator, IndicatorConfig, IndicatorConfigBuilder, Point};
pub use crate::ohlcv::{Ohlcv, OhlcvBar, Price, Timestamp};

pub use crate::bb::{
    BOLLINGER_VARIANCE, Bb, BbConfig, BbConfigBuilder, BbValue, DEFAULT_BB_LENGTH, StdDev,
    Variance, bollinger,
};
pub use crate::ema::{DEFAULT_EMA_LENGTH, Ema, EmaConfig, EmaConfigBuilder, ema, ema_from_values};
pub use crate::macd::{
    DEFAULT_MACD_FAST, DEFAULT_MACD_SIGNAL, DEFAULT_MACD_SLOW, Macd, MacdConfig,
    MacdConfigBuilder, MacdValue, macd,
};
pub use crate::rsi::{DEFAULT_RSI_LENGTH, Rsi, RsiConfig, RsiConfigBuilder, rsi};
pub use crate::sma::{DEFAULT_SMA_LENGTH, Sma, SmaConfig, SmaConfigBuilder, sma};

pub use crate::aggregate::{
    BandSeries, IndicatorResults, IndicatorSeries, MacdSeries, calculate_indicators,
};
pub use crate::error::ParamError;
pub use crate::request::{IndicatorKind, IndicatorRequest, IndicatorSpec, param};

macro_rules! impl_indicator_methods {
    ($type:ty, $config:ty, $output:ty) => {
        impl $type {
            /// See [`Indicator::new`].
            #[must_use]
            pub fn new(config: $config) -> Self {
                <Self as Indicator>::new(config)
            }

            /// See [`Indicator::compute`].
            #[must_use]
            pub fn compute(&self, bars: &[impl Ohlcv]) -> Vec<$output> {
                <Self as Indicator>::compute(self, bars)
            }

            /// See [`Indicator::config`].
            #[must_use]
            #[inline]
            pub fn config(&self) -> &$config {
                <Self as Indicator>::config(self)
            }
        }
    };
}

impl_indicator_methods!(Sma, SmaConfig, Point);
impl_indicator_methods!(Ema, EmaConfig, Point);
impl_indicator_methods!(Rsi, RsiConfig, Point);
impl_indicator_methods!(Macd, MacdConfig, MacdValue);
impl_indicator_methods!(Bb, BbConfig, BbValue);

#[cfg(test)]
mod test_util;

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod inherent_methods {
    use super::{
        Bb, BbConfig, Ema, EmaConfig, Macd, MacdConfig, Rsi, RsiConfig, Sma, SmaConfig, StdDev,
    };
    use crate::test_util::{Bar, bars, nz};

    fn series() -> Vec<Bar> {
        bars(&[10.0, 20.0, 15.0, 25.0])
    }

    #[test]
    fn sma_without_indicator_import() {
        let sma = Sma::new(SmaConfig::new(nz(2)));
        let points = sma.compute(&series());
        assert_eq!(points.len(), 3);
        assert_eq!((points[0].time, points[0].value), (2, 15.0));
        assert_eq!(sma.config().length(), 2);
    }

    #[test]
    fn ema_without_indicator_import() {
        let ema = Ema::new(EmaConfig::new(nz(2)));
        assert_eq!(ema.compute(&series()).len(), 3);
        assert_eq!(ema.config().length(), 2);
    }

    #[test]
    fn rsi_without_indicator_import() {
        let rsi = Rsi::new(RsiConfig::new(nz(2)));
        assert_eq!(rsi.compute(&series()).len(), 2);
        assert_eq!(rsi.config().length(), 2);
    }

    #[test]
    fn macd_without_indicator_import() {
        let macd = Macd::new(MacdConfig::new(nz(1), nz(2), nz(2)));
        assert_eq!(macd.compute(&series()).len(), 2);
        assert_eq!(macd.config().slow_length(), 2);
    }

    #[test]
    fn bb_without_indicator_import() {
        let bb = Bb::new(BbConfig::new(nz(2), StdDev::new(2.0)));
        assert_eq!(bb.compute(&series()).len(), 3);
        assert_eq!(bb.config().length(), 2);
    }
}
