//! Pattern configuration
//!
//! A [`PatternConfig`] is a partial, serde-friendly value: every threshold is
//! optional and the enabled patterns form an ordered, duplicate-free
//! [`PatternSet`]. [`PatternConfig::thresholds`] resolves it into the concrete
//! [`Thresholds`] every rule receives.
//!
//! # Example
//!
//! ```rust
//! use candlemark::prelude::*;
//!
//! let config = PatternConfig::important().with_doji_threshold(0.05);
//! let merged = config.merge(&PatternConfig::indecision());
//!
//! assert!(merged.enabled.contains(PatternKind::Doji));
//! assert_eq!(merged.thresholds().doji_threshold, 0.05);
//! ```

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{PatternError, PatternKind, Ratio, Result};

// ============================================================
// DEFAULT THRESHOLDS
// ============================================================

/// Doji: `body / range <= DOJI_THRESHOLD`
pub const DEFAULT_DOJI_THRESHOLD: f64 = 0.1;
/// Long shadow: `shadow >= SHADOW_RATIO * body`
pub const DEFAULT_SHADOW_RATIO: f64 = 2.0;
/// Engulfing: `curr.body >= ENGULFING_MIN_SIZE * prev.body` (Harami uses the complement)
pub const DEFAULT_ENGULFING_MIN_SIZE: f64 = 0.8;
/// Negligible shadow: `shadow <= SHADOW_TOLERANCE * range`
pub const DEFAULT_SHADOW_TOLERANCE: f64 = 0.05;
/// Small body: `body <= BODY_SIZE_RATIO * range`
pub const DEFAULT_BODY_SIZE_RATIO: f64 = 0.3;
/// Tweezer: highs (lows) equal within this fraction of the larger price
pub const DEFAULT_TWEEZER_TOLERANCE: f64 = 0.001;

// ============================================================
// RESOLVED THRESHOLDS
// ============================================================

/// Concrete thresholds passed to every rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub doji_threshold: f64,
    pub shadow_ratio: f64,
    pub engulfing_min_size: f64,
    pub shadow_tolerance: f64,
    pub body_size_ratio: f64,
    pub tweezer_tolerance: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            doji_threshold: DEFAULT_DOJI_THRESHOLD,
            shadow_ratio: DEFAULT_SHADOW_RATIO,
            engulfing_min_size: DEFAULT_ENGULFING_MIN_SIZE,
            shadow_tolerance: DEFAULT_SHADOW_TOLERANCE,
            body_size_ratio: DEFAULT_BODY_SIZE_RATIO,
            tweezer_tolerance: DEFAULT_TWEEZER_TOLERANCE,
        }
    }
}

/// Ratio-valued threshold: unset or zero falls back to the default, NaN and
/// infinities are logged and replaced by the default, anything else outside
/// `0.0..=1.0` is logged and clamped into range.
fn resolve_ratio(field: &'static str, value: Option<f64>, default: f64) -> f64 {
    match value {
        None => default,
        Some(v) if v == 0.0 => default,
        Some(v) if !v.is_finite() => {
            warn!(field, value = v, "non-finite threshold, using default");
            default
        }
        Some(v) => match Ratio::new(v) {
            Ok(ratio) => ratio.get(),
            Err(err) => {
                let clamped = v.clamp(0.0, 1.0);
                warn!(field, value = v, clamped, %err, "threshold out of range, clamping");
                clamped
            }
        },
    }
}

/// Multiplier-valued threshold: finite and non-negative. Negative values
/// clamp to zero, non-finite ones fall back to the default.
fn resolve_multiplier(field: &'static str, value: Option<f64>, default: f64) -> f64 {
    match value {
        None => default,
        Some(v) if v == 0.0 => default,
        Some(v) if !v.is_finite() => {
            warn!(field, value = v, "non-finite threshold, using default");
            default
        }
        Some(v) if v < 0.0 => {
            warn!(field, value = v, clamped = 0.0, "negative threshold, clamping");
            0.0
        }
        Some(v) => v,
    }
}

// ============================================================
// PATTERN SET
// ============================================================

/// Ordered, duplicate-free set of pattern kinds.
///
/// Insertion order is kept; inserting a kind already present is a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<PatternKind>", into = "Vec<PatternKind>")]
pub struct PatternSet(Vec<PatternKind>);

impl PatternSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends `kind` unless already present. Returns true if it was added.
    pub fn insert(&mut self, kind: PatternKind) -> bool {
        if self.0.contains(&kind) {
            return false;
        }
        self.0.push(kind);
        true
    }

    #[inline]
    pub fn contains(&self, kind: PatternKind) -> bool {
        self.0.contains(&kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = PatternKind> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[PatternKind] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Ordered union: `self`'s order first, then `other`'s new entries.
    pub fn union(&self, other: &PatternSet) -> PatternSet {
        let mut out = self.clone();
        out.extend(other.iter());
        out
    }
}

impl Extend<PatternKind> for PatternSet {
    fn extend<I: IntoIterator<Item = PatternKind>>(&mut self, iter: I) {
        for kind in iter {
            self.insert(kind);
        }
    }
}

impl FromIterator<PatternKind> for PatternSet {
    fn from_iter<I: IntoIterator<Item = PatternKind>>(iter: I) -> Self {
        let mut set = PatternSet::new();
        set.extend(iter);
        set
    }
}

impl From<Vec<PatternKind>> for PatternSet {
    fn from(kinds: Vec<PatternKind>) -> Self {
        kinds.into_iter().collect()
    }
}

impl From<PatternSet> for Vec<PatternKind> {
    fn from(set: PatternSet) -> Self {
        set.0
    }
}

impl<'a> IntoIterator for &'a PatternSet {
    type Item = PatternKind;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, PatternKind>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter().copied()
    }
}

// ============================================================
// PATTERN CONFIG
// ============================================================

/// Which patterns to detect, threshold overrides, and how detected-pattern
/// text combines with an existing per-candle label.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// Replace (true) or append to (false) an existing candle label.
    pub replace_labels: bool,
    pub enabled: PatternSet,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doji_threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engulfing_min_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_tolerance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_size_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tweezer_tolerance: Option<f64>,
}

impl PatternConfig {
    /// Config enabling exactly `kinds`, default thresholds.
    pub fn with_patterns(kinds: impl IntoIterator<Item = PatternKind>) -> Self {
        Self {
            enabled: kinds.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Config enabling patterns by id (e.g. `"engulfing_bull"`).
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        let kinds = names
            .iter()
            .map(|n| n.as_ref().parse::<PatternKind>())
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::with_patterns(kinds))
    }

    pub fn with_doji_threshold(mut self, value: f64) -> Self {
        self.doji_threshold = Some(value);
        self
    }

    pub fn with_shadow_ratio(mut self, value: f64) -> Self {
        self.shadow_ratio = Some(value);
        self
    }

    pub fn with_engulfing_min_size(mut self, value: f64) -> Self {
        self.engulfing_min_size = Some(value);
        self
    }

    pub fn with_shadow_tolerance(mut self, value: f64) -> Self {
        self.shadow_tolerance = Some(value);
        self
    }

    pub fn with_body_size_ratio(mut self, value: f64) -> Self {
        self.body_size_ratio = Some(value);
        self
    }

    pub fn with_tweezer_tolerance(mut self, value: f64) -> Self {
        self.tweezer_tolerance = Some(value);
        self
    }

    pub fn with_replace_labels(mut self, replace: bool) -> Self {
        self.replace_labels = replace;
        self
    }

    /// Resolves the overrides against the defaults.
    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            doji_threshold: resolve_ratio(
                "doji_threshold",
                self.doji_threshold,
                DEFAULT_DOJI_THRESHOLD,
            ),
            shadow_ratio: resolve_multiplier("shadow_ratio", self.shadow_ratio, DEFAULT_SHADOW_RATIO),
            engulfing_min_size: resolve_ratio(
                "engulfing_min_size",
                self.engulfing_min_size,
                DEFAULT_ENGULFING_MIN_SIZE,
            ),
            shadow_tolerance: resolve_ratio(
                "shadow_tolerance",
                self.shadow_tolerance,
                DEFAULT_SHADOW_TOLERANCE,
            ),
            body_size_ratio: resolve_ratio(
                "body_size_ratio",
                self.body_size_ratio,
                DEFAULT_BODY_SIZE_RATIO,
            ),
            tweezer_tolerance: resolve_ratio(
                "tweezer_tolerance",
                self.tweezer_tolerance,
                DEFAULT_TWEEZER_TOLERANCE,
            ),
        }
    }

    /// Combines two configs: `self`'s scalar fields win where set, enabled
    /// patterns are unioned in `self`'s order, `replace_labels` comes from `self`.
    pub fn merge(&self, other: &PatternConfig) -> PatternConfig {
        PatternConfig {
            replace_labels: self.replace_labels,
            enabled: self.enabled.union(&other.enabled),
            doji_threshold: self.doji_threshold.or(other.doji_threshold),
            shadow_ratio: self.shadow_ratio.or(other.shadow_ratio),
            engulfing_min_size: self.engulfing_min_size.or(other.engulfing_min_size),
            shadow_tolerance: self.shadow_tolerance.or(other.shadow_tolerance),
            body_size_ratio: self.body_size_ratio.or(other.body_size_ratio),
            tweezer_tolerance: self.tweezer_tolerance.or(other.tweezer_tolerance),
        }
    }

    // ===========================================
    // PRESETS
    // ===========================================

    /// Every pattern, in rule-definition order.
    pub fn all() -> Self {
        Self::with_patterns(PatternKind::ALL.iter().copied())
    }

    /// The handful of patterns most worth annotating.
    pub fn important() -> Self {
        use PatternKind::*;
        Self::with_patterns([
            EngulfingBull,
            EngulfingBear,
            Hammer,
            ShootingStar,
            MorningStar,
            EveningStar,
        ])
    }

    /// Patterns with a bullish connotation only.
    pub fn bullish() -> Self {
        Self::with_patterns(PatternKind::ALL.iter().copied().filter(|k| k.bias().is_bullish()))
    }

    /// Patterns with a bearish connotation only.
    pub fn bearish() -> Self {
        Self::with_patterns(PatternKind::ALL.iter().copied().filter(|k| k.bias().is_bearish()))
    }

    pub fn reversal() -> Self {
        use PatternKind::*;
        Self::with_patterns([
            Hammer,
            InvertedHammer,
            ShootingStar,
            EngulfingBull,
            EngulfingBear,
            HaramiBull,
            HaramiBear,
            PiercingLine,
            DarkCloudCover,
            TweezerTop,
            TweezerBottom,
            MorningStar,
            EveningStar,
        ])
    }

    pub fn indecision() -> Self {
        use PatternKind::*;
        Self::with_patterns([
            Doji,
            LongLeggedDoji,
            GravestoneDoji,
            DragonflyDoji,
            SpinningTop,
            HighWave,
        ])
    }

    /// Continuation / strong-trend patterns.
    pub fn trend() -> Self {
        use PatternKind::*;
        Self::with_patterns([
            MarubozuBull,
            MarubozuBear,
            BeltHoldBull,
            BeltHoldBear,
            ThreeWhiteSoldiers,
            ThreeBlackCrows,
        ])
    }

    /// Looks up a preset by name (`"all"`, `"important"`, `"bullish"`, ...).
    pub fn preset(name: &str) -> Result<Self> {
        match name {
            "all" => Ok(Self::all()),
            "important" => Ok(Self::important()),
            "bullish" => Ok(Self::bullish()),
            "bearish" => Ok(Self::bearish()),
            "reversal" => Ok(Self::reversal()),
            "indecision" => Ok(Self::indecision()),
            "trend" => Ok(Self::trend()),
            other => Err(PatternError::InvalidConfig(format!("unknown preset: {other}"))),
        }
    }
}

/// Merges two optional configs; `None` is the identity.
pub fn merge_patterns(a: Option<PatternConfig>, b: Option<PatternConfig>) -> Option<PatternConfig> {
    match (a, b) {
        (None, b) => b,
        (a, None) => a,
        (Some(a), Some(b)) => Some(a.merge(&b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Direction;
    use PatternKind::*;

    #[test]
    fn test_pattern_set_dedup_keeps_order() {
        let set: PatternSet = vec![Hammer, Doji, Hammer, MorningStar, Doji].into();
        assert_eq!(set.as_slice(), &[Hammer, Doji, MorningStar]);
    }

    #[test]
    fn test_pattern_set_union() {
        let a: PatternSet = vec![Hammer, Doji].into();
        let b: PatternSet = vec![Doji, EngulfingBull, Hammer, MorningStar].into();
        assert_eq!(a.union(&b).as_slice(), &[Hammer, Doji, EngulfingBull, MorningStar]);
    }

    #[test]
    fn test_thresholds_defaults_for_unset_and_zero() {
        let config = PatternConfig::default().with_doji_threshold(0.0);
        assert_eq!(config.thresholds(), Thresholds::default());
    }

    #[test]
    fn test_thresholds_override() {
        let t = PatternConfig::default()
            .with_doji_threshold(0.01)
            .with_shadow_ratio(3.0)
            .with_engulfing_min_size(0.5)
            .thresholds();
        assert_eq!(t.doji_threshold, 0.01);
        assert_eq!(t.shadow_ratio, 3.0);
        assert_eq!(t.engulfing_min_size, 0.5);
        assert_eq!(t.body_size_ratio, DEFAULT_BODY_SIZE_RATIO);
    }

    #[test]
    fn test_non_finite_thresholds_fall_back() {
        let t = PatternConfig::default()
            .with_doji_threshold(f64::NAN)
            .with_shadow_tolerance(f64::INFINITY)
            .with_shadow_ratio(f64::NEG_INFINITY)
            .thresholds();
        assert_eq!(t, Thresholds::default());
    }

    #[test]
    fn test_out_of_range_thresholds_clamp() {
        let t = PatternConfig::default()
            .with_doji_threshold(1.5)
            .with_shadow_tolerance(-0.2)
            .with_engulfing_min_size(3.0)
            .with_shadow_ratio(-1.0)
            .thresholds();
        assert_eq!(t.doji_threshold, 1.0);
        assert_eq!(t.shadow_tolerance, 0.0);
        assert_eq!(t.engulfing_min_size, 1.0);
        assert_eq!(t.shadow_ratio, 0.0);
        assert_eq!(t.body_size_ratio, DEFAULT_BODY_SIZE_RATIO);
    }

    #[test]
    fn test_resolution_is_monotonic_past_bounds() {
        let resolved = |v: f64| PatternConfig::default().with_doji_threshold(v).thresholds().doji_threshold;
        let inputs = [-3.0, -0.5, 0.05, 0.5, 0.99, 1.0, 1.5, 40.0];
        for pair in inputs.windows(2) {
            assert!(resolved(pair[0]) <= resolved(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_merge_scalars_and_patterns() {
        let a = PatternConfig::with_patterns([Hammer, Doji])
            .with_doji_threshold(0.02)
            .with_replace_labels(true);
        let b = PatternConfig::with_patterns([Doji, MorningStar])
            .with_doji_threshold(0.5)
            .with_shadow_ratio(4.0);

        let merged = a.merge(&b);
        assert!(merged.replace_labels);
        assert_eq!(merged.enabled.as_slice(), &[Hammer, Doji, MorningStar]);
        assert_eq!(merged.doji_threshold, Some(0.02));
        assert_eq!(merged.shadow_ratio, Some(4.0));
    }

    #[test]
    fn test_merge_identity() {
        let a = PatternConfig::important();
        assert_eq!(merge_patterns(Some(a.clone()), None), Some(a.clone()));
        assert_eq!(merge_patterns(None, Some(a.clone())), Some(a));
        assert_eq!(merge_patterns(None, None), None);
    }

    #[test]
    fn test_bullish_preset_excludes_bearish() {
        let config = PatternConfig::bullish();
        assert!(!config.enabled.contains(ShootingStar));
        assert!(config.enabled.iter().all(|k| k.bias() == Direction::Bullish));
        assert!(config.enabled.contains(Hammer));
        assert!(config.enabled.contains(DragonflyDoji));
        assert_eq!(config.enabled.len(), 11);
    }

    #[test]
    fn test_bearish_preset_excludes_bullish() {
        let config = PatternConfig::bearish();
        assert!(config.enabled.contains(ShootingStar));
        assert!(config.enabled.iter().all(|k| k.bias() == Direction::Bearish));
        assert!(!config.enabled.contains(InvertedHammer));
        assert_eq!(config.enabled.len(), 10);
    }

    #[test]
    fn test_important_is_small() {
        let config = PatternConfig::important();
        assert!(config.enabled.len() <= 6);
        assert!(config.enabled.contains(EngulfingBull));
        assert!(config.enabled.contains(MorningStar));
    }

    #[test]
    fn test_all_preset_matches_table() {
        assert_eq!(PatternConfig::all().enabled.as_slice(), PatternKind::ALL);
    }

    #[test]
    fn test_preset_lookup() {
        assert_eq!(PatternConfig::preset("trend").unwrap(), PatternConfig::trend());
        assert!(PatternConfig::preset("sideways").is_err());
    }

    #[test]
    fn test_from_names() {
        let config = PatternConfig::from_names(&["hammer", "engulfing_bull", "hammer"]).unwrap();
        assert_eq!(config.enabled.as_slice(), &[Hammer, EngulfingBull]);
        assert!(PatternConfig::from_names(&["not_a_pattern"]).is_err());
    }
}
