//! Candle geometry
//!
//! Derived per-candle quantities shared by every pattern rule. A
//! [`CandleGeometry`] can only be built from a candle that satisfies the OHLC
//! ordering invariants, so rules that take geometry never see invalid data.

use crate::OHLC;

/// Derived shape of a single valid candle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandleGeometry {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// `|close - open|`
    pub body: f64,
    /// `max(open, close)`
    pub body_top: f64,
    /// `min(open, close)`
    pub body_bottom: f64,
    pub upper_shadow: f64,
    pub lower_shadow: f64,
    /// `high - low`
    pub range: f64,
}

impl CandleGeometry {
    /// Derives the geometry of `candle`, or `None` if the candle is invalid.
    pub fn of<T: OHLC + ?Sized>(candle: &T) -> Option<Self> {
        let (open, high, low, close) = (candle.open(), candle.high(), candle.low(), candle.close());
        if !is_valid_ohlc(open, high, low, close) {
            return None;
        }

        let body_top = open.max(close);
        let body_bottom = open.min(close);

        Some(Self {
            open,
            high,
            low,
            close,
            body: (close - open).abs(),
            body_top,
            body_bottom,
            upper_shadow: high - body_top,
            lower_shadow: body_bottom - low,
            range: high - low,
        })
    }

    #[inline]
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    #[inline]
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// Body as a fraction of the range. `None` for a flat candle.
    #[inline]
    pub fn body_ratio(&self) -> Option<f64> {
        (self.range > 0.0).then(|| self.body / self.range)
    }

    /// Midpoint of the real body.
    #[inline]
    pub fn body_midpoint(&self) -> f64 {
        (self.body_top + self.body_bottom) / 2.0
    }
}

/// Returns true if the candle satisfies the OHLC ordering invariants and
/// every value is finite.
pub fn is_valid<T: OHLC + ?Sized>(candle: &T) -> bool {
    is_valid_ohlc(candle.open(), candle.high(), candle.low(), candle.close())
}

fn is_valid_ohlc(open: f64, high: f64, low: f64, close: f64) -> bool {
    if !(open.is_finite() && high.is_finite() && low.is_finite() && close.is_finite()) {
        return false;
    }
    high >= low && high >= open.max(close) && low <= open.min(close)
}

/// Geometry for every candle of a series, `None` where the candle is invalid.
pub fn classify_all<T: OHLC>(candles: &[T]) -> Vec<Option<CandleGeometry>> {
    candles.iter().map(CandleGeometry::of).collect()
}
