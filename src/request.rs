//! Indicator requests as stored by the chart UI, and their resolution into
//! typed indicator configs.

use std::{collections::BTreeMap, fmt::Display, num::NonZero};

use serde::{Deserialize, Serialize};

use crate::{
    BbConfig, EmaConfig, MacdConfig, ParamError, RsiConfig, SmaConfig, StdDev,
    bb::DEFAULT_BB_LENGTH,
    ema::DEFAULT_EMA_LENGTH,
    macd::{DEFAULT_MACD_FAST, DEFAULT_MACD_SIGNAL, DEFAULT_MACD_SLOW},
    rsi::DEFAULT_RSI_LENGTH,
    sma::DEFAULT_SMA_LENGTH,
};

/// Parameter keys understood by [`IndicatorRequest::resolve`].
pub mod param {
    /// Window length for SMA, EMA, RSI and Bollinger Bands.
    pub const PERIOD: &str = "period";
    /// MACD fast EMA length.
    pub const FAST_PERIOD: &str = "fastPeriod";
    /// MACD slow EMA length.
    pub const SLOW_PERIOD: &str = "slowPeriod";
    /// MACD signal EMA length.
    pub const SIGNAL_PERIOD: &str = "signalPeriod";
    /// Bollinger Bands standard deviation multiplier.
    pub const STD_DEV: &str = "stdDev";
}

/// Longest accepted window length.
const MAX_PERIOD: u32 = u32::MAX;

/// Closed set of indicator kinds the engine can compute.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IndicatorKind {
    Sma,
    Ema,
    Rsi,
    Macd,
    Bollinger,
}

impl Display for IndicatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Sma => "SMA",
            Self::Ema => "EMA",
            Self::Rsi => "RSI",
            Self::Macd => "MACD",
            Self::Bollinger => "BOLLINGER",
        };
        f.write_str(name)
    }
}

fn visible_by_default() -> bool {
    true
}

/// One indicator on a chart, as persisted by the UI.
///
/// Deserialises from
///
/// ```json
/// { "id": "macd-1", "type": "MACD", "visible": true,
///   "params": { "fastPeriod": 12, "slowPeriod": 26, "signalPeriod": 9 } }
/// ```
///
/// `visible` defaults to `true` and `params` to empty when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRequest {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: IndicatorKind,
    #[serde(default = "visible_by_default")]
    pub visible: bool,
    #[serde(default)]
    pub params: BTreeMap<String, f64>,
}

impl IndicatorRequest {
    /// Visible request with no parameters (all defaults).
    #[must_use]
    pub fn new(id: impl Into<String>, kind: IndicatorKind) -> Self {
        Self {
            id: id.into(),
            kind,
            visible: true,
            params: BTreeMap::new(),
        }
    }

    /// Sets a named parameter.
    #[must_use]
    pub fn param(mut self, key: &str, value: f64) -> Self {
        self.params.insert(key.to_owned(), value);
        self
    }

    /// Sets visibility.
    #[must_use]
    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Resolves parameters into a typed [`IndicatorSpec`].
    ///
    /// Missing parameters, and parameters set to `0`, take the defaults:
    /// period 20 for SMA and Bollinger Bands, 12 for EMA, 14 for RSI,
    /// 12/26/9 for MACD and a 2.0 multiplier for Bollinger Bands. Keys that
    /// the kind does not use are ignored.
    ///
    /// # Errors
    ///
    /// [`ParamError`] when a present, non-zero parameter is not a valid
    /// window length or multiplier.
    ///
    /// # Example
    ///
    /// ```
    /// use quantedge_overlay::{IndicatorKind, IndicatorRequest, IndicatorSpec, RsiConfig};
    /// use std::num::NonZero;
    ///
    /// let request = IndicatorRequest::new("rsi", IndicatorKind::Rsi).param("period", 7.0);
    /// let spec = request.resolve().unwrap();
    ///
    /// assert_eq!(spec, IndicatorSpec::Rsi(RsiConfig::new(NonZero::new(7).unwrap())));
    /// ```
    pub fn resolve(&self) -> Result<IndicatorSpec, ParamError> {
        let spec = match self.kind {
            IndicatorKind::Sma => {
                IndicatorSpec::Sma(SmaConfig::new(self.period(param::PERIOD, DEFAULT_SMA_LENGTH)?))
            }
            IndicatorKind::Ema => {
                IndicatorSpec::Ema(EmaConfig::new(self.period(param::PERIOD, DEFAULT_EMA_LENGTH)?))
            }
            IndicatorKind::Rsi => {
                IndicatorSpec::Rsi(RsiConfig::new(self.period(param::PERIOD, DEFAULT_RSI_LENGTH)?))
            }
            IndicatorKind::Macd => IndicatorSpec::Macd(MacdConfig::new(
                self.period(param::FAST_PERIOD, DEFAULT_MACD_FAST)?,
                self.period(param::SLOW_PERIOD, DEFAULT_MACD_SLOW)?,
                self.period(param::SIGNAL_PERIOD, DEFAULT_MACD_SIGNAL)?,
            )),
            IndicatorKind::Bollinger => IndicatorSpec::Bollinger(BbConfig::new(
                self.period(param::PERIOD, DEFAULT_BB_LENGTH)?,
                self.std_dev()?,
            )),
        };

        Ok(spec)
    }

    fn period(
        &self,
        key: &'static str,
        default: NonZero<usize>,
    ) -> Result<NonZero<usize>, ParamError> {
        let value = match self.params.get(key) {
            None => return Ok(default),
            Some(&value) if value == 0.0 => return Ok(default),
            Some(&value) => value,
        };

        let invalid = ParamError::InvalidPeriod { key, value };
        if !value.is_finite() || value < 0.0 || value.fract() != 0.0 {
            return Err(invalid);
        }
        if value > f64::from(MAX_PERIOD) {
            return Err(invalid);
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let length = value as usize;

        NonZero::new(length).ok_or(invalid)
    }

    fn std_dev(&self) -> Result<StdDev, ParamError> {
        match self.params.get(param::STD_DEV) {
            None => Ok(StdDev::default()),
            Some(&value) if value == 0.0 => Ok(StdDev::default()),
            Some(&value) if value.is_finite() && value > 0.0 => Ok(StdDev::new(value)),
            Some(&value) => Err(ParamError::InvalidStdDev { value }),
        }
    }
}

/// A resolved indicator: one variant per [`IndicatorKind`], holding its
/// typed config.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub enum IndicatorSpec {
    Sma(SmaConfig),
    Ema(EmaConfig),
    Rsi(RsiConfig),
    Macd(MacdConfig),
    Bollinger(BbConfig),
}

impl IndicatorSpec {
    #[must_use]
    pub fn kind(&self) -> IndicatorKind {
        match self {
            Self::Sma(_) => IndicatorKind::Sma,
            Self::Ema(_) => IndicatorKind::Ema,
            Self::Rsi(_) => IndicatorKind::Rsi,
            Self::Macd(_) => IndicatorKind::Macd,
            Self::Bollinger(_) => IndicatorKind::Bollinger,
        }
    }
}

impl Display for IndicatorSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sma(config) => write!(f, "{config}"),
            Self::Ema(config) => write!(f, "{config}"),
            Self::Rsi(config) => write!(f, "{config}"),
            Self::Macd(config) => write!(f, "{config}"),
            Self::Bollinger(config) => write!(f, "{config}"),
        }
    }
}
