//! Candlestick pattern rules
//!
//! [`PatternKind`] is the closed set of supported patterns. The table below
//! maps every kind to its id, display text, directional bias, window size and
//! rule function.
//!
//! # Pattern Categories
//!
//! - **Single-candle (13)**: Doji family, Hammer family, Marubozu, Belt Hold, Spinning Top, High Wave
//! - **Two-candle (8)**: Engulfing, Harami, Piercing Line, Dark Cloud Cover, Tweezers
//! - **Three-candle (4)**: Morning/Evening Star, Three White Soldiers, Three Black Crows

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{CandleGeometry, Direction, PatternError, Thresholds, OHLC};

pub mod helpers;
pub mod single_bar;
pub mod three_bar;
pub mod two_bar;

pub use helpers::Sided;

/// Macro to generate the `PatternKind` enum and its rule table
macro_rules! define_patterns {
    (
        single {
            $( $s:ident => ($s_id:literal, $s_name:literal, $s_short:literal, $s_bias:ident, $s_rule:path) ),* $(,)?
        }
        two {
            $( $d:ident => ($d_id:literal, $d_name:literal, $d_short:literal, $d_bias:ident, $d_rule:path) ),* $(,)?
        }
        three {
            $( $r:ident => ($r_id:literal, $r_name:literal, $r_short:literal, $r_bias:ident, $r_rule:path) ),* $(,)?
        }
    ) => {
        /// Supported candlestick patterns, in rule-definition order
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum PatternKind {
            $($s,)*
            $($d,)*
            $($r,)*
        }

        impl PatternKind {
            /// Every kind, in rule-definition order
            pub const ALL: &'static [PatternKind] = &[
                $(PatternKind::$s,)*
                $(PatternKind::$d,)*
                $(PatternKind::$r,)*
            ];

            /// Stable snake_case identifier
            pub fn id(self) -> &'static str {
                match self {
                    $(Self::$s => $s_id,)*
                    $(Self::$d => $d_id,)*
                    $(Self::$r => $r_id,)*
                }
            }

            /// Human-readable name
            pub fn name(self) -> &'static str {
                match self {
                    $(Self::$s => $s_name,)*
                    $(Self::$d => $d_name,)*
                    $(Self::$r => $r_name,)*
                }
            }

            /// Compact name used in chart labels
            pub fn short_name(self) -> &'static str {
                match self {
                    $(Self::$s => $s_short,)*
                    $(Self::$d => $d_short,)*
                    $(Self::$r => $r_short,)*
                }
            }

            /// Typical direction the pattern signals
            pub fn bias(self) -> Direction {
                match self {
                    $(Self::$s => Direction::$s_bias,)*
                    $(Self::$d => Direction::$d_bias,)*
                    $(Self::$r => Direction::$r_bias,)*
                }
            }

            /// Number of consecutive candles the rule looks at
            pub fn window(self) -> usize {
                match self {
                    $(Self::$s => 1,)*
                    $(Self::$d => 2,)*
                    $(Self::$r => 3,)*
                }
            }

            /// Runs the rule over a window of exactly `self.window()` candles.
            pub(crate) fn evaluate(self, w: &[CandleGeometry], t: &Thresholds) -> bool {
                debug_assert_eq!(w.len(), self.window());
                match self {
                    $(Self::$s => $s_rule(&w[0], t),)*
                    $(Self::$d => $d_rule(&w[0], &w[1], t),)*
                    $(Self::$r => $r_rule(&w[0], &w[1], &w[2], t),)*
                }
            }
        }
    };
}

define_patterns! {
    single {
        Doji => ("doji", "Doji", "Doji", Neutral, single_bar::is_doji),
        LongLeggedDoji => ("long_legged_doji", "Long-Legged Doji", "LL Doji", Neutral, single_bar::is_long_legged_doji),
        GravestoneDoji => ("gravestone_doji", "Gravestone Doji", "Grave Doji", Bearish, single_bar::is_gravestone_doji),
        DragonflyDoji => ("dragonfly_doji", "Dragonfly Doji", "Dfly Doji", Bullish, single_bar::is_dragonfly_doji),
        Hammer => ("hammer", "Hammer", "Hammer", Bullish, single_bar::is_hammer),
        InvertedHammer => ("inverted_hammer", "Inverted Hammer", "Inv Hammer", Bullish, single_bar::is_inverted_hammer),
        ShootingStar => ("shooting_star", "Shooting Star", "Shoot Star", Bearish, single_bar::is_shooting_star),
        MarubozuBull => ("marubozu_bull", "Bullish Marubozu", "Bull Maru", Bullish, single_bar::is_bullish_marubozu),
        MarubozuBear => ("marubozu_bear", "Bearish Marubozu", "Bear Maru", Bearish, single_bar::is_bearish_marubozu),
        BeltHoldBull => ("belt_hold_bull", "Bullish Belt Hold", "Bull Belt", Bullish, single_bar::is_bullish_belt_hold),
        BeltHoldBear => ("belt_hold_bear", "Bearish Belt Hold", "Bear Belt", Bearish, single_bar::is_bearish_belt_hold),
        SpinningTop => ("spinning_top", "Spinning Top", "Spin Top", Neutral, single_bar::is_spinning_top),
        HighWave => ("high_wave", "High Wave", "High Wave", Neutral, single_bar::is_high_wave),
    }
    two {
        EngulfingBull => ("engulfing_bull", "Bullish Engulfing", "Bull Engulf", Bullish, two_bar::is_bullish_engulfing),
        EngulfingBear => ("engulfing_bear", "Bearish Engulfing", "Bear Engulf", Bearish, two_bar::is_bearish_engulfing),
        HaramiBull => ("harami_bull", "Bullish Harami", "Bull Harami", Bullish, two_bar::is_bullish_harami),
        HaramiBear => ("harami_bear", "Bearish Harami", "Bear Harami", Bearish, two_bar::is_bearish_harami),
        PiercingLine => ("piercing_line", "Piercing Line", "Piercing", Bullish, two_bar::is_piercing_line),
        DarkCloudCover => ("dark_cloud_cover", "Dark Cloud Cover", "Dark Cloud", Bearish, two_bar::is_dark_cloud_cover),
        TweezerTop => ("tweezer_top", "Tweezer Top", "Twz Top", Bearish, two_bar::is_tweezer_top),
        TweezerBottom => ("tweezer_bottom", "Tweezer Bottom", "Twz Bottom", Bullish, two_bar::is_tweezer_bottom),
    }
    three {
        MorningStar => ("morning_star", "Morning Star", "Morn Star", Bullish, three_bar::is_morning_star),
        EveningStar => ("evening_star", "Evening Star", "Eve Star", Bearish, three_bar::is_evening_star),
        ThreeWhiteSoldiers => ("three_white_soldiers", "Three White Soldiers", "3 Soldiers", Bullish, three_bar::is_three_white_soldiers),
        ThreeBlackCrows => ("three_black_crows", "Three Black Crows", "3 Crows", Bearish, three_bar::is_three_black_crows),
    }
}

impl PatternKind {
    /// Label glyph for the pattern's bias.
    pub fn glyph(self) -> &'static str {
        match self.bias() {
            Direction::Bullish => "▲",
            Direction::Bearish => "▼",
            Direction::Neutral => "◆",
        }
    }

    /// One label line: glyph followed by the short name.
    pub fn label(self) -> String {
        format!("{} {}", self.glyph(), self.short_name())
    }

    /// Tests the rule against a window of raw candles.
    ///
    /// Returns false if the window has the wrong length or any candle in it
    /// is invalid.
    pub fn matches<T: OHLC>(self, window: &[T], t: &Thresholds) -> bool {
        if window.len() != self.window() {
            return false;
        }
        let shapes: Option<Vec<CandleGeometry>> = window.iter().map(CandleGeometry::of).collect();
        shapes.is_some_and(|shapes| self.evaluate(&shapes, t))
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PatternKind {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PatternKind::ALL
            .iter()
            .copied()
            .find(|k| k.id() == s)
            .ok_or_else(|| PatternError::UnknownPattern(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Candle;

    #[test]
    fn test_table_size_and_windows() {
        assert_eq!(PatternKind::ALL.len(), 25);
        assert_eq!(PatternKind::Doji.window(), 1);
        assert_eq!(PatternKind::TweezerTop.window(), 2);
        assert_eq!(PatternKind::MorningStar.window(), 3);
    }

    #[test]
    fn test_ids_round_trip() {
        for &kind in PatternKind::ALL {
            assert_eq!(kind.id().parse::<PatternKind>().unwrap(), kind);
        }
        assert!("three_white_crows".parse::<PatternKind>().is_err());
    }

    #[test]
    fn test_serde_uses_ids() {
        for &kind in PatternKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.id()));
        }
    }

    #[test]
    fn test_label_line() {
        assert_eq!(PatternKind::Hammer.label(), "▲ Hammer");
        assert_eq!(PatternKind::EveningStar.label(), "▼ Eve Star");
        assert_eq!(PatternKind::Doji.label(), "◆ Doji");
    }

    #[test]
    fn test_matches_raw_window() {
        let t = Thresholds::default();
        let prev = Candle::new(110.0, 112.0, 105.0, 106.0);
        let curr = Candle::new(104.0, 115.0, 103.0, 114.0);
        assert!(PatternKind::EngulfingBull.matches(&[prev, curr], &t));
        assert!(!PatternKind::EngulfingBear.matches(&[prev, curr], &t));
        // Wrong window length
        assert!(!PatternKind::EngulfingBull.matches(&[curr], &t));
    }

    #[test]
    fn test_matches_rejects_invalid_candle() {
        let t = Thresholds::default();
        let prev = Candle::new(110.0, 112.0, 105.0, 106.0);
        // high below close
        let broken = Candle::new(104.0, 110.0, 103.0, 114.0);
        assert!(!PatternKind::EngulfingBull.matches(&[prev, broken], &t));
    }
}
