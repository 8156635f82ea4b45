//! Three-candle pattern rules
//!
//! Morning/Evening Star and Three White Soldiers / Three Black Crows.

use super::helpers::{is_real_body, is_small_body};
use crate::{CandleGeometry, Thresholds};

// ============================================================
// STARS
// ============================================================

/// The middle candle of a star: small on its own range, or small next to the
/// first candle's body.
#[inline]
fn is_star_body(first: &CandleGeometry, star: &CandleGeometry, t: &Thresholds) -> bool {
    is_small_body(star, t) || star.body <= first.body * t.body_size_ratio
}

/// Morning Star: long bearish candle, a small body gapping down, then a long
/// bullish candle gapping up and closing above the first body's midpoint.
pub fn is_morning_star(
    first: &CandleGeometry,
    second: &CandleGeometry,
    third: &CandleGeometry,
    t: &Thresholds,
) -> bool {
    first.is_bearish()
        && is_real_body(first, t)
        && is_star_body(first, second, t)
        && second.body_top < first.body_bottom
        && third.is_bullish()
        && is_real_body(third, t)
        && third.body_bottom > second.body_top
        && third.close > first.body_midpoint()
}

/// Evening Star: mirror of [`is_morning_star`].
pub fn is_evening_star(
    first: &CandleGeometry,
    second: &CandleGeometry,
    third: &CandleGeometry,
    t: &Thresholds,
) -> bool {
    first.is_bullish()
        && is_real_body(first, t)
        && is_star_body(first, second, t)
        && second.body_bottom > first.body_top
        && third.is_bearish()
        && is_real_body(third, t)
        && third.body_top < second.body_bottom
        && third.close < first.body_midpoint()
}

// ============================================================
// SOLDIERS & CROWS
// ============================================================

/// `next` continues an advance: bullish, real body, opens within `prev`'s
/// body and closes above it.
#[inline]
fn advances(prev: &CandleGeometry, next: &CandleGeometry, t: &Thresholds) -> bool {
    next.is_bullish()
        && is_real_body(next, t)
        && next.open >= prev.open
        && next.open <= prev.close
        && next.close > prev.close
}

/// `next` continues a decline: bearish, real body, opens within `prev`'s
/// body and closes below it.
#[inline]
fn declines(prev: &CandleGeometry, next: &CandleGeometry, t: &Thresholds) -> bool {
    next.is_bearish()
        && is_real_body(next, t)
        && next.open <= prev.open
        && next.open >= prev.close
        && next.close < prev.close
}

/// Three White Soldiers: three advancing bullish candles.
pub fn is_three_white_soldiers(
    first: &CandleGeometry,
    second: &CandleGeometry,
    third: &CandleGeometry,
    t: &Thresholds,
) -> bool {
    first.is_bullish()
        && is_real_body(first, t)
        && advances(first, second, t)
        && advances(second, third, t)
}

/// Three Black Crows: three declining bearish candles.
pub fn is_three_black_crows(
    first: &CandleGeometry,
    second: &CandleGeometry,
    third: &CandleGeometry,
    t: &Thresholds,
) -> bool {
    first.is_bearish()
        && is_real_body(first, t)
        && declines(first, second, t)
        && declines(second, third, t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Candle;

    fn geometry(o: f64, h: f64, l: f64, c: f64) -> CandleGeometry {
        CandleGeometry::of(&Candle::new(o, h, l, c)).unwrap()
    }

    #[test]
    fn test_morning_star() {
        let t = Thresholds::default();
        let first = geometry(120.0, 125.0, 105.0, 108.0);
        let second = geometry(102.0, 104.0, 100.0, 103.0);
        let third = geometry(108.0, 125.0, 106.0, 122.0);
        assert!(is_morning_star(&first, &second, &third, &t));
        assert!(!is_evening_star(&first, &second, &third, &t));
    }

    #[test]
    fn test_morning_star_needs_recovery() {
        let t = Thresholds::default();
        let first = geometry(120.0, 125.0, 105.0, 108.0);
        let second = geometry(102.0, 104.0, 100.0, 103.0);
        // Closes below the first body's midpoint (114)
        let weak = geometry(104.0, 113.0, 103.0, 112.0);
        assert!(!is_morning_star(&first, &second, &weak, &t));
    }

    #[test]
    fn test_evening_star() {
        let t = Thresholds::default();
        let first = geometry(100.0, 115.0, 95.0, 112.0);
        let second = geometry(117.0, 120.0, 116.0, 118.0);
        let third = geometry(112.0, 114.0, 95.0, 98.0);
        assert!(is_evening_star(&first, &second, &third, &t));
        assert!(!is_morning_star(&first, &second, &third, &t));
    }

    #[test]
    fn test_three_white_soldiers() {
        let t = Thresholds::default();
        let a = geometry(100.0, 106.0, 99.5, 105.0);
        let b = geometry(103.0, 110.0, 102.5, 109.0);
        let c = geometry(107.0, 114.0, 106.5, 113.0);
        assert!(is_three_white_soldiers(&a, &b, &c, &t));
        assert!(!is_three_black_crows(&a, &b, &c, &t));
    }

    #[test]
    fn test_soldiers_reject_doji_like_candle() {
        let t = Thresholds::default();
        let a = geometry(100.0, 106.0, 99.5, 105.0);
        let b = geometry(103.0, 110.0, 102.5, 109.0);
        let tiny = geometry(108.0, 115.0, 103.0, 109.5);
        assert!(!is_three_white_soldiers(&a, &b, &tiny, &t));
    }

    #[test]
    fn test_three_black_crows() {
        let t = Thresholds::default();
        let a = geometry(113.0, 113.5, 106.0, 107.0);
        let b = geometry(109.0, 109.5, 102.0, 103.0);
        let c = geometry(105.0, 105.5, 98.0, 99.0);
        assert!(is_three_black_crows(&a, &b, &c, &t));
    }
}
