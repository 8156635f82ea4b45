//! Two-candle pattern rules
//!
//! Engulfing, Harami, Piercing Line, Dark Cloud Cover and Tweezers. Each rule
//! takes the previous and current candle of the window.

use super::helpers::{approx_equal, Sided};
use crate::{CandleGeometry, Thresholds};

// ============================================================
// ENGULFING & HARAMI
// ============================================================

/// Engulfing: opposite direction, `curr`'s body contains `prev`'s and is at
/// least `engulfing_min_size` times its size.
pub fn engulfing(prev: &CandleGeometry, curr: &CandleGeometry, t: &Thresholds) -> Sided {
    let contains = curr.body_top >= prev.body_top && curr.body_bottom <= prev.body_bottom;
    if !contains || curr.body < t.engulfing_min_size * prev.body {
        return Sided::NONE;
    }
    Sided {
        bullish: prev.is_bearish() && curr.is_bullish(),
        bearish: prev.is_bullish() && curr.is_bearish(),
    }
}

#[inline]
pub fn is_bullish_engulfing(prev: &CandleGeometry, curr: &CandleGeometry, t: &Thresholds) -> bool {
    engulfing(prev, curr, t).bullish
}

#[inline]
pub fn is_bearish_engulfing(prev: &CandleGeometry, curr: &CandleGeometry, t: &Thresholds) -> bool {
    engulfing(prev, curr, t).bearish
}

/// Harami: opposite direction, `curr`'s body inside the larger `prev` body
/// and at most `1 - engulfing_min_size` of its size.
///
/// Shares the size knob with [`engulfing`] as its complement; the two never
/// match the same pair.
pub fn harami(prev: &CandleGeometry, curr: &CandleGeometry, t: &Thresholds) -> Sided {
    let inside = curr.body_top <= prev.body_top && curr.body_bottom >= prev.body_bottom;
    if !inside || curr.body >= prev.body || curr.body > (1.0 - t.engulfing_min_size) * prev.body {
        return Sided::NONE;
    }
    Sided {
        bullish: prev.is_bearish() && curr.is_bullish(),
        bearish: prev.is_bullish() && curr.is_bearish(),
    }
}

#[inline]
pub fn is_bullish_harami(prev: &CandleGeometry, curr: &CandleGeometry, t: &Thresholds) -> bool {
    harami(prev, curr, t).bullish
}

#[inline]
pub fn is_bearish_harami(prev: &CandleGeometry, curr: &CandleGeometry, t: &Thresholds) -> bool {
    harami(prev, curr, t).bearish
}

// ============================================================
// PIERCING LINE & DARK CLOUD COVER
// ============================================================

/// Piercing Line: bullish candle opening below the prior bearish low and
/// closing above its body midpoint, but below its open.
pub fn is_piercing_line(prev: &CandleGeometry, curr: &CandleGeometry, _t: &Thresholds) -> bool {
    prev.is_bearish()
        && curr.is_bullish()
        && curr.open < prev.low
        && curr.close > prev.body_midpoint()
        && curr.close < prev.open
}

/// Dark Cloud Cover: bearish candle opening above the prior bullish high and
/// closing below its body midpoint, but above its open.
pub fn is_dark_cloud_cover(prev: &CandleGeometry, curr: &CandleGeometry, _t: &Thresholds) -> bool {
    prev.is_bullish()
        && curr.is_bearish()
        && curr.open > prev.high
        && curr.close < prev.body_midpoint()
        && curr.close > prev.open
}

// ============================================================
// TWEEZERS
// ============================================================

/// Tweezer Top: matching highs, bullish then bearish.
pub fn is_tweezer_top(prev: &CandleGeometry, curr: &CandleGeometry, t: &Thresholds) -> bool {
    prev.is_bullish() && curr.is_bearish() && approx_equal(prev.high, curr.high, t.tweezer_tolerance)
}

/// Tweezer Bottom: matching lows, bearish then bullish.
pub fn is_tweezer_bottom(prev: &CandleGeometry, curr: &CandleGeometry, t: &Thresholds) -> bool {
    prev.is_bearish() && curr.is_bullish() && approx_equal(prev.low, curr.low, t.tweezer_tolerance)
}
