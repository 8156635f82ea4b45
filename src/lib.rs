//! # candlemark
//!
//! Candlestick pattern classification and chart label placement.
//!
//! The scanner classifies windows of 1-3 OHLC candles into named patterns
//! (Doji, Hammer, Engulfing, Morning Star, ...). The placement engine turns
//! the hits into stacked, non-overlapping text blocks next to each candle.
//!
//! ## Quick Start
//!
//! ```rust
//! use candlemark::prelude::*;
//!
//! let candles = vec![
//!     Candle::new(120.0, 125.0, 105.0, 108.0),
//!     Candle::new(102.0, 104.0, 100.0, 103.0),
//!     Candle::new(108.0, 125.0, 106.0, 122.0),
//! ];
//!
//! let hits = scan(&candles, &PatternConfig::all()).unwrap();
//! assert!(hits[&2].iter().any(|m| m.kind == PatternKind::MorningStar));
//! ```

use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::{debug, trace};

pub mod config;
pub mod geometry;
pub mod params;
pub mod patterns;
pub mod placement;

pub use config::{merge_patterns, PatternConfig, PatternSet, Thresholds};
pub use geometry::CandleGeometry;
pub use patterns::PatternKind;

pub mod prelude {
    pub use crate::{
        // Configuration
        config::{merge_patterns, PatternConfig, PatternSet, Thresholds},
        // Geometry
        geometry::CandleGeometry,
        // Parameters
        params::{ParamMeta, ParamType, Parameterized},
        // Patterns
        patterns::{PatternKind, Sided},
        // Placement
        placement::{Canvas, LabelBlock, LabelPlacer, LabelStyle, Point, Rect, Side},
        // Scanning
        scan,
        scan_parallel,
        // Types
        Candle,
        Direction,
        OHLCExt,
        PatternError,
        PatternHits,
        PatternMatch,
        PatternScanner,
        Ratio,
        Result,
        ScanError,
        ScanResult,
        OHLC,
    };
}

// ============================================================
// ERRORS
// ============================================================

pub type Result<T> = std::result::Result<T, PatternError>;

/// Errors that can occur during pattern detection
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PatternError {
    #[error("Invalid value: {0}")]
    InvalidValue(&'static str),

    #[error("{field} = {value} out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Empty candle series")]
    EmptySeries,

    #[error("Unknown pattern: {0}")]
    UnknownPattern(String),
}

// ============================================================
// VALIDATED TYPES
// ============================================================

/// Normalized value in range 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Ratio(f64);

impl Ratio {
    /// Create a new Ratio, validating the value is in [0.0, 1.0]
    pub fn new(value: f64) -> Result<Self> {
        if value.is_nan() || value.is_infinite() {
            return Err(PatternError::InvalidValue(
                "Ratio cannot be NaN or infinite",
            ));
        }
        if !(0.0..=1.0).contains(&value) {
            return Err(PatternError::OutOfRange {
                field: "Ratio",
                value,
                min: 0.0,
                max: 1.0,
            });
        }
        Ok(Self(value))
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl serde::Serialize for Ratio {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Ratio {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = f64::deserialize(d)?;
        Ratio::new(value).map_err(serde::de::Error::custom)
    }
}

// ============================================================
// OHLC TRAITS
// ============================================================

/// Core OHLC data trait
pub trait OHLC {
    fn open(&self) -> f64;
    fn high(&self) -> f64;
    fn low(&self) -> f64;
    fn close(&self) -> f64;
}

impl<T: OHLC + ?Sized> OHLC for &T {
    fn open(&self) -> f64 {
        (**self).open()
    }

    fn high(&self) -> f64 {
        (**self).high()
    }

    fn low(&self) -> f64 {
        (**self).low()
    }

    fn close(&self) -> f64 {
        (**self).close()
    }
}

/// `(open, high, low, close)`
impl OHLC for (f64, f64, f64, f64) {
    fn open(&self) -> f64 {
        self.0
    }

    fn high(&self) -> f64 {
        self.1
    }

    fn low(&self) -> f64 {
        self.2
    }

    fn close(&self) -> f64 {
        self.3
    }
}

/// Extension trait with validity and geometry for OHLC data
pub trait OHLCExt: OHLC {
    /// True if the candle satisfies `low <= min(open, close)`,
    /// `high >= max(open, close)` and every value is finite.
    #[inline]
    fn is_valid(&self) -> bool {
        geometry::is_valid(self)
    }

    /// Derived geometry, `None` for an invalid candle.
    #[inline]
    fn geometry(&self) -> Option<CandleGeometry> {
        CandleGeometry::of(self)
    }
}

impl<T: OHLC + ?Sized> OHLCExt for T {}

/// A plain OHLC candle
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Candle {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Candle {
    pub const fn new(open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            open,
            high,
            low,
            close,
        }
    }
}

impl OHLC for Candle {
    fn open(&self) -> f64 {
        self.open
    }

    fn high(&self) -> f64 {
        self.high
    }

    fn low(&self) -> f64 {
        self.low
    }

    fn close(&self) -> f64 {
        self.close
    }
}

// ============================================================
// PATTERN MATCH
// ============================================================

/// Direction/bias of a pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Direction {
    Bullish,
    Neutral,
    Bearish,
}

impl Direction {
    #[inline]
    pub fn is_bullish(self) -> bool {
        matches!(self, Direction::Bullish)
    }

    #[inline]
    pub fn is_bearish(self) -> bool {
        matches!(self, Direction::Bearish)
    }
}

/// One detected pattern - Copy, no allocations
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct PatternMatch {
    /// Last candle of the window; the index the match is reported under
    pub index: usize,
    /// First candle of the window
    pub start_index: usize,
    pub kind: PatternKind,
    pub name: &'static str,
}

/// Scan output: candle index to the patterns matched there, in rule order.
/// Indices without matches are absent.
pub type PatternHits = BTreeMap<usize, Vec<PatternMatch>>;

// ============================================================
// PATTERN SCANNER
// ============================================================

/// Applies the enabled rules to every index of a candle series.
#[derive(Debug, Clone)]
pub struct PatternScanner {
    /// Enabled kinds in rule-definition order
    enabled: Vec<PatternKind>,
    thresholds: Thresholds,
}

impl PatternScanner {
    pub fn new(config: &PatternConfig) -> Self {
        Self::with_thresholds(config.enabled.iter(), config.thresholds())
    }

    pub fn with_thresholds(
        kinds: impl IntoIterator<Item = PatternKind>,
        thresholds: Thresholds,
    ) -> Self {
        let requested: PatternSet = kinds.into_iter().collect();
        let enabled = PatternKind::ALL
            .iter()
            .copied()
            .filter(|k| requested.contains(*k))
            .collect();
        Self {
            enabled,
            thresholds,
        }
    }

    pub fn enabled(&self) -> &[PatternKind] {
        &self.enabled
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Scan all candles and group the matches by index.
    ///
    /// Fails only on an empty series. Invalid candles never match.
    pub fn scan<T: OHLC>(&self, candles: &[T]) -> Result<PatternHits> {
        if candles.is_empty() {
            return Err(PatternError::EmptySeries);
        }

        let geometry = geometry::classify_all(candles);
        let mut hits = PatternHits::new();
        if !self.enabled.is_empty() {
            for index in 0..candles.len() {
                let matches = self.matches_at(&geometry, index, 0);
                if !matches.is_empty() {
                    hits.insert(index, matches);
                }
            }
        }

        debug!(
            candles = candles.len(),
            invalid = geometry.iter().filter(|g| g.is_none()).count(),
            rules = self.enabled.len(),
            indices = hits.len(),
            "pattern scan complete"
        );
        Ok(hits)
    }

    /// Detect patterns ending at a single index.
    pub fn scan_at<T: OHLC>(&self, candles: &[T], index: usize) -> Vec<PatternMatch> {
        if index >= candles.len() {
            return Vec::new();
        }
        let base = index.saturating_sub(2);
        let geometry = geometry::classify_all(&candles[base..=index]);
        self.matches_at(&geometry, index - base, base)
    }

    /// Matches ending at `local` within `geometry`, reported at `base + local`.
    fn matches_at(
        &self,
        geometry: &[Option<CandleGeometry>],
        local: usize,
        base: usize,
    ) -> Vec<PatternMatch> {
        let mut results = Vec::new();
        let mut window = Vec::with_capacity(3);

        for &kind in &self.enabled {
            let size = kind.window();
            if local + 1 < size {
                continue;
            }
            let start = local + 1 - size;

            window.clear();
            window.extend(geometry[start..=local].iter().map_while(|g| *g));
            if window.len() != size {
                continue;
            }

            if kind.evaluate(&window, &self.thresholds) {
                trace!(index = base + local, pattern = kind.id(), "pattern matched");
                results.push(PatternMatch {
                    index: base + local,
                    start_index: base + start,
                    kind,
                    name: kind.name(),
                });
            }
        }

        results
    }
}

impl Default for PatternScanner {
    fn default() -> Self {
        Self::new(&PatternConfig::all())
    }
}

/// Scan `candles` with `config`.
pub fn scan<T: OHLC>(candles: &[T], config: &PatternConfig) -> Result<PatternHits> {
    PatternScanner::new(config).scan(candles)
}

// ============================================================
// PARALLEL SCANNING
// ============================================================

/// Result of scanning a single instrument
#[derive(Debug)]
pub struct ScanResult {
    pub symbol: String,
    pub hits: PatternHits,
}

/// Error from scanning a single instrument
#[derive(Debug)]
pub struct ScanError {
    pub symbol: String,
    pub error: PatternError,
}

/// Scan many independent series in parallel. Each series is scanned
/// sequentially on one worker.
pub fn scan_parallel<'a, T, I>(
    scanner: &PatternScanner,
    instruments: I,
) -> (Vec<ScanResult>, Vec<ScanError>)
where
    T: OHLC + Sync + 'a,
    I: IntoParallelIterator<Item = (&'a str, &'a [T])>,
{
    let results: Vec<_> = instruments
        .into_par_iter()
        .map(|(symbol, candles)| {
            scanner
                .scan(candles)
                .map(|hits| ScanResult {
                    symbol: symbol.to_string(),
                    hits,
                })
                .map_err(|error| ScanError {
                    symbol: symbol.to_string(),
                    error,
                })
        })
        .collect();

    let mut successes = Vec::new();
    let mut errors = Vec::new();

    for result in results {
        match result {
            Ok(r) => successes.push(r),
            Err(e) => errors.push(e),
        }
    }

    (successes, errors)
}

// ============================================================
// TESTS
// ============================================================
