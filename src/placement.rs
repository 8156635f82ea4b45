//! Label placement
//!
//! Turns scan hits into text blocks anchored next to each candle. Blocks are
//! placed left to right; a block that collides with an earlier one is pushed
//! away from its candle (up when above, down when below) until it clears.
//! If one side runs out of canvas the other side is tried. If neither works
//! the block is kept at its preferred spot and flagged as overlapping, so no
//! matched candle ever loses its label.
//!
//! The renderer supplies the pixel bounding box of every candle (wick and
//! body) and the canvas size; styling and drawing are left to it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{PatternConfig, PatternHits};

// ============================================================
// GEOMETRY
// ============================================================

/// Axis-aligned rectangle in pixel space, y growing downwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[inline]
    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    /// True if the interiors overlap. Touching edges do not count.
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// Point in pixel space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Drawable area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
}

impl Canvas {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

// ============================================================
// STYLE
// ============================================================

/// Text metrics and spacing used to size and separate label blocks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelStyle {
    /// Advance width of one character
    pub char_width: f64,
    pub line_height: f64,
    /// Inner padding on every side of the text
    pub padding: f64,
    /// Distance between the candle's wick and its label
    pub gap: f64,
    /// Minimum distance between two stacked labels
    pub spacing: f64,
    /// Furthest a label may be pushed from its anchor before giving up on a side
    pub max_shift: f64,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            char_width: 7.0,
            line_height: 14.0,
            padding: 4.0,
            gap: 4.0,
            spacing: 2.0,
            max_shift: 240.0,
        }
    }
}

// ============================================================
// LABEL BLOCKS
// ============================================================

/// Which side of the candle a label sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Above,
    Below,
}

impl Side {
    #[inline]
    pub fn opposite(self) -> Side {
        match self {
            Side::Above => Side::Below,
            Side::Below => Side::Above,
        }
    }
}

/// A positioned multi-line label for one candle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelBlock {
    pub index: usize,
    /// One line per matched pattern, after any existing label text
    pub lines: Vec<String>,
    pub side: Side,
    /// Wick tip the label belongs to
    pub anchor: Point,
    /// Final box after collision avoidance
    pub rect: Rect,
    /// Set when no collision-free position was found
    pub overlaps: bool,
}

// ============================================================
// PLACER
// ============================================================

/// Places label blocks for scan hits on a fixed canvas.
#[derive(Debug, Clone)]
pub struct LabelPlacer {
    canvas: Canvas,
    style: LabelStyle,
}

impl LabelPlacer {
    pub fn new(canvas: Canvas) -> Self {
        Self::with_style(canvas, LabelStyle::default())
    }

    pub fn with_style(canvas: Canvas, style: LabelStyle) -> Self {
        Self { canvas, style }
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn style(&self) -> &LabelStyle {
        &self.style
    }

    /// Width and height of a block holding `lines`.
    pub fn block_size<S: AsRef<str>>(&self, lines: &[S]) -> (f64, f64) {
        let widest = lines
            .iter()
            .map(|l| l.as_ref().chars().count())
            .max()
            .unwrap_or(0);
        let width = widest as f64 * self.style.char_width + 2.0 * self.style.padding;
        let height = lines.len() as f64 * self.style.line_height + 2.0 * self.style.padding;
        (width, height)
    }

    /// Place one block per hit index. `candles[i]` is the bounding box of
    /// candle `i`. Blocks hold pattern lines only; see
    /// [`place_for`](Self::place_for) to merge existing labels.
    pub fn place(&self, hits: &PatternHits, candles: &[Rect]) -> Vec<LabelBlock> {
        self.place_with_labels(hits, candles, &BTreeMap::new(), true)
    }

    /// Place blocks for a scan made with `config`, combining them with
    /// `existing` labels according to `config.replace_labels`.
    pub fn place_for(
        &self,
        config: &PatternConfig,
        hits: &PatternHits,
        candles: &[Rect],
        existing: &BTreeMap<usize, String>,
    ) -> Vec<LabelBlock> {
        self.place_with_labels(hits, candles, existing, config.replace_labels)
    }

    /// Like [`place`](Self::place), combining pattern lines with existing
    /// per-candle labels: `replace` drops the existing text, otherwise it is
    /// kept as the first line.
    pub fn place_with_labels(
        &self,
        hits: &PatternHits,
        candles: &[Rect],
        existing: &BTreeMap<usize, String>,
        replace: bool,
    ) -> Vec<LabelBlock> {
        let mut blocks: Vec<LabelBlock> = Vec::with_capacity(hits.len());
        let mut placed: Vec<Rect> = Vec::with_capacity(hits.len());

        for (&index, matches) in hits {
            if matches.is_empty() {
                continue;
            }
            let Some(candle) = candles.get(index) else {
                warn!(index, "no candle geometry for pattern hit, label skipped");
                continue;
            };

            let mut lines = Vec::with_capacity(matches.len() + 1);
            if !replace {
                if let Some(text) = existing.get(&index).filter(|t| !t.is_empty()) {
                    lines.push(text.clone());
                }
            }
            lines.extend(matches.iter().map(|m| m.kind.label()));

            let (width, height) = self.block_size(&lines);
            let x = (candle.center_x() - width / 2.0)
                .min(self.canvas.width - width)
                .max(0.0);
            let preferred = self.preferred_side(candle, height);

            let resolved = self
                .resolve(preferred, candle, x, width, height, &placed)
                .map(|rect| (preferred, rect))
                .or_else(|| {
                    let other = preferred.opposite();
                    self.resolve(other, candle, x, width, height, &placed)
                        .map(|rect| (other, rect))
                });

            let (side, rect, overlaps) = match resolved {
                Some((side, rect)) => (side, rect, false),
                None => {
                    let rect = self.fit_vertically(self.initial_rect(
                        preferred, candle, x, width, height,
                    ));
                    let overlaps = placed.iter().any(|p| p.intersects(&rect));
                    debug!(index, overlaps, "no free label position, using best effort");
                    (preferred, rect, overlaps)
                }
            };

            let anchor = match side {
                Side::Above => Point {
                    x: candle.center_x(),
                    y: candle.y,
                },
                Side::Below => Point {
                    x: candle.center_x(),
                    y: candle.bottom(),
                },
            };

            placed.push(rect);
            blocks.push(LabelBlock {
                index,
                lines,
                side,
                anchor,
                rect,
                overlaps,
            });
        }

        debug!(
            blocks = blocks.len(),
            overlapping = blocks.iter().filter(|b| b.overlaps).count(),
            "label placement complete"
        );
        blocks
    }

    /// Above if the block fits there or there is at least as much room above
    /// as below.
    fn preferred_side(&self, candle: &Rect, height: f64) -> Side {
        let space_above = candle.y - self.style.gap;
        let space_below = self.canvas.height - candle.bottom() - self.style.gap;
        if height <= space_above || space_above >= space_below {
            Side::Above
        } else {
            Side::Below
        }
    }

    fn initial_rect(&self, side: Side, candle: &Rect, x: f64, width: f64, height: f64) -> Rect {
        let y = match side {
            Side::Above => candle.y - self.style.gap - height,
            Side::Below => candle.bottom() + self.style.gap,
        };
        Rect::new(x, y, width, height)
    }

    /// Clamp a rect into the canvas' vertical extent, top edge first.
    fn fit_vertically(&self, mut rect: Rect) -> Rect {
        rect.y = rect.y.min(self.canvas.height - rect.height).max(0.0);
        rect
    }

    /// Push the block away from the candle on `side` until it clears every
    /// placed rect. `None` if it leaves the canvas or exceeds `max_shift`.
    fn resolve(
        &self,
        side: Side,
        candle: &Rect,
        x: f64,
        width: f64,
        height: f64,
        placed: &[Rect],
    ) -> Option<Rect> {
        let origin = self.initial_rect(side, candle, x, width, height);
        let mut rect = origin;

        loop {
            if rect.y < 0.0 || rect.bottom() > self.canvas.height {
                return None;
            }
            if (rect.y - origin.y).abs() > self.style.max_shift {
                return None;
            }
            let Some(other) = placed.iter().find(|p| p.intersects(&rect)) else {
                return Some(rect);
            };
            // Each jump clears `other` for good, since y only moves one way
            rect.y = match side {
                Side::Above => other.y - self.style.spacing - height,
                Side::Below => other.bottom() + self.style.spacing,
            };
        }
    }
}
