//! Parameter metadata for pattern thresholds
//!
//! This module provides metadata about the rule thresholds, enabling:
//! - Grid search optimization
//! - Parameter documentation
//! - Automatic configuration UI generation
//!
//! # Example
//!
//! ```rust
//! use candlemark::params::{ParamMeta, ParamType, Parameterized};
//! use candlemark::prelude::*;
//!
//! for param in Thresholds::param_meta() {
//!   println!("{}: {:?} (default: {})", param.name, param.param_type, param.default);
//! }
//! ```

use std::collections::HashMap;

use crate::{config, PatternError, Ratio, Result, Thresholds};

// ============================================================
// PARAMETER TYPES
// ============================================================

/// Type of parameter value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
  /// Fraction in 0.0..=1.0
  Ratio,
  /// Positive, finite multiplier (e.g. shadow-to-body ratio)
  Multiplier,
}

/// Metadata for a single threshold
#[derive(Debug, Clone)]
pub struct ParamMeta {
  /// Parameter name (e.g., "doji_threshold")
  pub name: &'static str,
  /// Parameter type (Ratio or Multiplier)
  pub param_type: ParamType,
  /// Default value
  pub default: f64,
  /// Range for optimization: (min, max, step)
  pub range: (f64, f64, f64),
  /// Human-readable description
  pub description: &'static str,
}

impl ParamMeta {
  /// Create a new ParamMeta for a Ratio parameter
  pub const fn ratio(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Ratio, default, range, description }
  }

  /// Create a new ParamMeta for a Multiplier parameter
  pub const fn multiplier(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Multiplier, default, range, description }
  }

  /// Generate all values for grid search
  pub fn generate_grid(&self) -> Vec<f64> {
    let (min, max, step) = self.range;
    let mut values = Vec::new();
    let mut v = min;
    while v <= max + f64::EPSILON {
      values.push(v);
      v += step;
    }
    values
  }

  /// Validate a value for this parameter
  pub fn validate(&self, value: f64) -> Result<()> {
    let (min, max, _) = self.range;
    if value < min || value > max {
      return Err(PatternError::OutOfRange { field: self.name, value, min, max });
    }
    match self.param_type {
      ParamType::Ratio => Ratio::new(value).map(|_| ()),
      ParamType::Multiplier => {
        if !value.is_finite() || value <= 0.0 {
          return Err(PatternError::InvalidValue("Multiplier must be finite and > 0"));
        }
        Ok(())
      },
    }
  }
}

// ============================================================
// PARAMETERIZED TRAIT
// ============================================================

/// Trait for values built from named numeric parameters
pub trait Parameterized: Sized {
  /// Returns metadata for all configurable parameters
  fn param_meta() -> &'static [ParamMeta];

  /// Creates a value from a HashMap
  ///
  /// Missing parameters use their default values.
  fn with_params(params: &HashMap<&str, f64>) -> Result<Self>;
}

static THRESHOLD_PARAMS: [ParamMeta; 6] = [
  ParamMeta::ratio(
    "doji_threshold",
    config::DEFAULT_DOJI_THRESHOLD,
    (0.02, 0.2, 0.02),
    "Maximum body-to-range ratio of a doji",
  ),
  ParamMeta::multiplier(
    "shadow_ratio",
    config::DEFAULT_SHADOW_RATIO,
    (1.0, 4.0, 0.5),
    "Minimum shadow-to-body ratio of a long shadow",
  ),
  ParamMeta::ratio(
    "engulfing_min_size",
    config::DEFAULT_ENGULFING_MIN_SIZE,
    (0.5, 1.0, 0.1),
    "Minimum engulfing body relative to the prior body; harami uses the complement",
  ),
  ParamMeta::ratio(
    "shadow_tolerance",
    config::DEFAULT_SHADOW_TOLERANCE,
    (0.01, 0.1, 0.01),
    "Maximum shadow-to-range ratio treated as no shadow",
  ),
  ParamMeta::ratio(
    "body_size_ratio",
    config::DEFAULT_BODY_SIZE_RATIO,
    (0.1, 0.5, 0.05),
    "Maximum body-to-range ratio of a small body",
  ),
  ParamMeta::ratio(
    "tweezer_tolerance",
    config::DEFAULT_TWEEZER_TOLERANCE,
    (0.0005, 0.005, 0.0005),
    "Relative tolerance for matching tweezer highs and lows",
  ),
];

impl Parameterized for Thresholds {
  fn param_meta() -> &'static [ParamMeta] {
    &THRESHOLD_PARAMS
  }

  fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
    Ok(Thresholds {
      doji_threshold: get_ratio(params, "doji_threshold", config::DEFAULT_DOJI_THRESHOLD)?.get(),
      shadow_ratio: get_multiplier(params, "shadow_ratio", config::DEFAULT_SHADOW_RATIO)?,
      engulfing_min_size: get_ratio(
        params,
        "engulfing_min_size",
        config::DEFAULT_ENGULFING_MIN_SIZE,
      )?
      .get(),
      shadow_tolerance: get_ratio(params, "shadow_tolerance", config::DEFAULT_SHADOW_TOLERANCE)?
        .get(),
      body_size_ratio: get_ratio(params, "body_size_ratio", config::DEFAULT_BODY_SIZE_RATIO)?
        .get(),
      tweezer_tolerance: get_ratio(
        params,
        "tweezer_tolerance",
        config::DEFAULT_TWEEZER_TOLERANCE,
      )?
      .get(),
    })
  }
}

// ============================================================
// PARAMETER VALUE HELPERS
// ============================================================

/// Helper to get a Ratio from params with default fallback
pub fn get_ratio(params: &HashMap<&str, f64>, key: &str, default: f64) -> Result<Ratio> {
  let value = params.get(key).copied().unwrap_or(default);
  Ratio::new(value)
}

/// Helper to get a positive multiplier from params with default fallback
pub fn get_multiplier(params: &HashMap<&str, f64>, key: &str, default: f64) -> Result<f64> {
  let value = params.get(key).copied().unwrap_or(default);
  if !value.is_finite() || value <= 0.0 {
    return Err(PatternError::InvalidValue("Multiplier must be finite and > 0"));
  }
  Ok(value)
}

// ============================================================
// TESTS
// ============================================================
