//! Common helper functions for candlestick pattern rules
//!
//! Shape comparisons shared across the single, two and three candle modules.

use crate::{CandleGeometry, Thresholds};

// ============================================================
// FIXED SHAPE FACTORS
// ============================================================

/// Spinning Top: each shadow must exceed `body * SPINNING_TOP_SHADOW_FLOOR`.
pub const SPINNING_TOP_SHADOW_FLOOR: f64 = 1.0;
/// High Wave: each shadow must reach `body * shadow_ratio * HIGH_WAVE_FACTOR`.
pub const HIGH_WAVE_FACTOR: f64 = 1.5;

// ============================================================
// BODY SIZE
// ============================================================

/// Body is small relative to the range (`body <= body_size_ratio * range`).
#[inline]
pub fn is_small_body(c: &CandleGeometry, t: &Thresholds) -> bool {
    c.range > 0.0 && c.body <= c.range * t.body_size_ratio
}

/// Body is a real body, i.e. not small.
#[inline]
pub fn is_real_body(c: &CandleGeometry, t: &Thresholds) -> bool {
    c.range > 0.0 && c.body > c.range * t.body_size_ratio
}

/// Body dominates the range (`body >= (1 - body_size_ratio) * range`).
#[inline]
pub fn is_large_body(c: &CandleGeometry, t: &Thresholds) -> bool {
    c.range > 0.0 && c.body >= c.range * (1.0 - t.body_size_ratio)
}

// ============================================================
// SHADOWS & PRICES
// ============================================================

/// Shadow is long relative to the body (`shadow >= shadow_ratio * body`).
#[inline]
pub fn is_long_shadow(shadow: f64, c: &CandleGeometry, t: &Thresholds) -> bool {
    shadow >= t.shadow_ratio * c.body
}

/// Shadow is negligible relative to the range.
#[inline]
pub fn is_negligible(shadow: f64, c: &CandleGeometry, t: &Thresholds) -> bool {
    shadow <= c.range * t.shadow_tolerance
}

/// Prices equal within `tolerance` of the larger magnitude.
#[inline]
pub fn approx_equal(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance * a.abs().max(b.abs())
}

// ============================================================
// TWO-SIDED RESULTS
// ============================================================

/// Outcome of a rule with a bullish and a bearish variant.
///
/// Both sides are never true at once: each side requires the opposite candle
/// direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sided {
    pub bullish: bool,
    pub bearish: bool,
}

impl Sided {
    pub const NONE: Sided = Sided {
        bullish: false,
        bearish: false,
    };

    #[inline]
    pub fn any(self) -> bool {
        self.bullish || self.bearish
    }
}
