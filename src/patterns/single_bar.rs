//! Single-candle pattern rules
//!
//! Doji family, Hammer family, Marubozu, Belt Hold, Spinning Top and High Wave.
//! Every rule is a pure predicate over a valid [`CandleGeometry`].

use super::helpers::{
    is_large_body, is_long_shadow, is_negligible, is_small_body, Sided, HIGH_WAVE_FACTOR,
    SPINNING_TOP_SHADOW_FLOOR,
};
use crate::{CandleGeometry, Thresholds};

// ============================================================
// DOJI FAMILY
// ============================================================

/// Doji: `body / range <= doji_threshold`.
#[inline]
pub fn is_doji(c: &CandleGeometry, t: &Thresholds) -> bool {
    c.body_ratio().is_some_and(|r| r <= t.doji_threshold)
}

/// Long-Legged Doji: doji with long shadows on both sides.
///
/// A doji whose shadow is negligible on one side is a Gravestone or
/// Dragonfly, never Long-Legged.
pub fn is_long_legged_doji(c: &CandleGeometry, t: &Thresholds) -> bool {
    is_doji(c, t)
        && is_long_shadow(c.upper_shadow, c, t)
        && is_long_shadow(c.lower_shadow, c, t)
        && !is_negligible(c.upper_shadow, c, t)
        && !is_negligible(c.lower_shadow, c, t)
}

/// Gravestone Doji: doji, long upper shadow, no lower shadow.
pub fn is_gravestone_doji(c: &CandleGeometry, t: &Thresholds) -> bool {
    is_doji(c, t)
        && is_long_shadow(c.upper_shadow, c, t)
        && !is_negligible(c.upper_shadow, c, t)
        && is_negligible(c.lower_shadow, c, t)
}

/// Dragonfly Doji: doji, long lower shadow, no upper shadow.
pub fn is_dragonfly_doji(c: &CandleGeometry, t: &Thresholds) -> bool {
    is_doji(c, t)
        && is_long_shadow(c.lower_shadow, c, t)
        && !is_negligible(c.lower_shadow, c, t)
        && is_negligible(c.upper_shadow, c, t)
}

// ============================================================
// HAMMER FAMILY
// ============================================================

/// Hammer: small body at the top of the range with a long lower shadow.
pub fn is_hammer(c: &CandleGeometry, t: &Thresholds) -> bool {
    is_small_body(c, t)
        && is_long_shadow(c.lower_shadow, c, t)
        && c.upper_shadow < c.lower_shadow
        && c.upper_shadow <= c.body.max(c.range * t.shadow_tolerance)
}

/// Inverted Hammer: small body at the bottom of the range with a long upper shadow.
pub fn is_inverted_hammer(c: &CandleGeometry, t: &Thresholds) -> bool {
    is_small_body(c, t)
        && is_long_shadow(c.upper_shadow, c, t)
        && c.lower_shadow < c.upper_shadow
        && c.lower_shadow <= c.body.max(c.range * t.shadow_tolerance)
}

/// Shooting Star: same shape as the Inverted Hammer.
///
/// The two differ only by the trend they appear in, which the shape test
/// does not look at, so both labels fire on the same candle.
#[inline]
pub fn is_shooting_star(c: &CandleGeometry, t: &Thresholds) -> bool {
    is_inverted_hammer(c, t)
}

// ============================================================
// MARUBOZU & BELT HOLD
// ============================================================

/// Marubozu: both shadows within `shadow_tolerance` of the range.
pub fn marubozu(c: &CandleGeometry, t: &Thresholds) -> Sided {
    if c.range <= 0.0 {
        return Sided::NONE;
    }
    if !is_negligible(c.upper_shadow, c, t) || !is_negligible(c.lower_shadow, c, t) {
        return Sided::NONE;
    }
    Sided {
        bullish: c.is_bullish(),
        bearish: c.is_bearish(),
    }
}

#[inline]
pub fn is_bullish_marubozu(c: &CandleGeometry, t: &Thresholds) -> bool {
    marubozu(c, t).bullish
}

#[inline]
pub fn is_bearish_marubozu(c: &CandleGeometry, t: &Thresholds) -> bool {
    marubozu(c, t).bearish
}

/// Belt Hold: large body opening at the low (bullish) or high (bearish).
/// The closing-side shadow is unconstrained.
pub fn belt_hold(c: &CandleGeometry, t: &Thresholds) -> Sided {
    if !is_large_body(c, t) {
        return Sided::NONE;
    }
    Sided {
        bullish: c.is_bullish() && is_negligible(c.lower_shadow, c, t),
        bearish: c.is_bearish() && is_negligible(c.upper_shadow, c, t),
    }
}

#[inline]
pub fn is_bullish_belt_hold(c: &CandleGeometry, t: &Thresholds) -> bool {
    belt_hold(c, t).bullish
}

#[inline]
pub fn is_bearish_belt_hold(c: &CandleGeometry, t: &Thresholds) -> bool {
    belt_hold(c, t).bearish
}

// ============================================================
// SPINNING TOP & HIGH WAVE
// ============================================================

/// Spinning Top: small body with both shadows longer than the body.
pub fn is_spinning_top(c: &CandleGeometry, t: &Thresholds) -> bool {
    let floor = c.body * SPINNING_TOP_SHADOW_FLOOR;
    is_small_body(c, t) && c.upper_shadow > floor && c.lower_shadow > floor
}

/// High Wave: small body with very long shadows on both sides.
pub fn is_high_wave(c: &CandleGeometry, t: &Thresholds) -> bool {
    let floor = c.body * t.shadow_ratio * HIGH_WAVE_FACTOR;
    is_small_body(c, t)
        && c.upper_shadow >= floor
        && c.lower_shadow >= floor
        && !is_negligible(c.upper_shadow, c, t)
        && !is_negligible(c.lower_shadow, c, t)
}
