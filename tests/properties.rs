//! Property tests for rule monotonicity, invalid-candle handling and scan
//! determinism.

use candlemark::patterns::{single_bar, two_bar};
use candlemark::prelude::*;
use proptest::prelude::*;

/// A candle satisfying the OHLC invariants.
fn valid_candle() -> impl Strategy<Value = Candle> {
    (50.0f64..150.0, 50.0f64..150.0, 0.0f64..20.0, 0.0f64..20.0).prop_map(
        |(open, close, up, down)| {
            Candle::new(open, open.max(close) + up, open.min(close) - down, close)
        },
    )
}

/// A candle whose high sits below its body.
fn invalid_candle() -> impl Strategy<Value = Candle> {
    (valid_candle(), 0.01f64..10.0).prop_map(|(c, dip)| {
        Candle::new(c.open, c.open.max(c.close) - dip, c.low.min(c.open.min(c.close) - dip - 1.0), c.close)
    })
}

fn geometry(c: &Candle) -> CandleGeometry {
    CandleGeometry::of(c).expect("strategy yields valid candles")
}

proptest! {
    #[test]
    fn invalid_candle_never_matches(
        bad in invalid_candle(),
        a in valid_candle(),
        b in valid_candle(),
        position in 0usize..3,
    ) {
        let t = Thresholds::default();
        for &kind in PatternKind::ALL {
            let mut window = vec![a, b, a];
            window.truncate(kind.window());
            let slot = position.min(window.len() - 1);
            window[slot] = bad;
            prop_assert!(!kind.matches(&window, &t), "{:?} matched an invalid window", kind);
        }
    }

    #[test]
    fn scan_never_reports_windows_with_invalid_candles(
        mut candles in prop::collection::vec(valid_candle(), 3..30),
        bad in invalid_candle(),
        at in 0usize..30,
    ) {
        let at = at % candles.len();
        candles[at] = bad;
        let hits = scan(&candles, &PatternConfig::all()).unwrap();
        for m in hits.values().flatten() {
            prop_assert!(!(m.start_index..=m.index).contains(&at));
        }
    }

    #[test]
    fn doji_threshold_is_monotonic(
        candle in valid_candle(),
        low in 0.0f64..1.0,
        extra in 0.0f64..1.0,
    ) {
        let g = geometry(&candle);
        let lower = Thresholds { doji_threshold: low, ..Thresholds::default() };
        let higher = Thresholds { doji_threshold: (low + extra).min(1.0), ..Thresholds::default() };
        if single_bar::is_doji(&g, &lower) {
            prop_assert!(single_bar::is_doji(&g, &higher));
        }
    }

    #[test]
    fn marubozu_tolerance_is_monotonic(
        candle in valid_candle(),
        low in 0.0f64..0.5,
        extra in 0.0f64..0.5,
    ) {
        let g = geometry(&candle);
        let tight = Thresholds { shadow_tolerance: low, ..Thresholds::default() };
        let loose = Thresholds { shadow_tolerance: low + extra, ..Thresholds::default() };
        let before = single_bar::marubozu(&g, &tight);
        let after = single_bar::marubozu(&g, &loose);
        prop_assert!(!before.bullish || after.bullish);
        prop_assert!(!before.bearish || after.bearish);
    }

    #[test]
    fn configured_doji_threshold_is_monotonic(
        candles in prop::collection::vec(valid_candle(), 1..20),
        low in -1.0f64..2.0,
        extra in 0.0f64..1.0,
    ) {
        prop_assume!(low != 0.0 && low + extra != 0.0);
        let config = PatternConfig::with_patterns([PatternKind::Doji]);
        let lower = scan(&candles, &config.clone().with_doji_threshold(low)).unwrap();
        let higher = scan(&candles, &config.with_doji_threshold(low + extra)).unwrap();
        for index in lower.keys() {
            prop_assert!(higher.contains_key(index), "index {} lost its doji", index);
        }
    }

    #[test]
    fn configured_shadow_tolerance_is_monotonic(
        candles in prop::collection::vec(valid_candle(), 1..20),
        low in -1.0f64..2.0,
        extra in 0.0f64..1.0,
    ) {
        prop_assume!(low != 0.0 && low + extra != 0.0);
        let config = PatternConfig::with_patterns([PatternKind::MarubozuBull, PatternKind::MarubozuBear]);
        let tight = scan(&candles, &config.clone().with_shadow_tolerance(low)).unwrap();
        let loose = scan(&candles, &config.with_shadow_tolerance(low + extra)).unwrap();
        for (index, matches) in &tight {
            let after: Vec<PatternKind> =
                loose.get(index).map(|ms| ms.iter().map(|m| m.kind).collect()).unwrap_or_default();
            for m in matches {
                prop_assert!(after.contains(&m.kind), "index {} lost {:?}", index, m.kind);
            }
        }
    }

    #[test]
    fn engulfing_and_harami_are_exclusive(
        prev in valid_candle(),
        curr in valid_candle(),
        size in 0.0f64..=1.0,
    ) {
        let (p, c) = (geometry(&prev), geometry(&curr));
        let t = Thresholds { engulfing_min_size: size, ..Thresholds::default() };
        let engulf = two_bar::engulfing(&p, &c, &t);
        let harami = two_bar::harami(&p, &c, &t);

        prop_assert!(!(engulf.any() && harami.any()));
        if engulf.any() {
            prop_assert!(c.body >= size * p.body);
        }
        if harami.any() {
            prop_assert!(c.body <= (1.0 - size) * p.body);
        }
    }

    #[test]
    fn two_sided_rules_pick_one_side(
        prev in valid_candle(),
        curr in valid_candle(),
    ) {
        let t = Thresholds::default();
        let (p, c) = (geometry(&prev), geometry(&curr));
        for sided in [
            single_bar::marubozu(&c, &t),
            single_bar::belt_hold(&c, &t),
            two_bar::engulfing(&p, &c, &t),
            two_bar::harami(&p, &c, &t),
        ] {
            prop_assert!(!(sided.bullish && sided.bearish));
        }
    }

    #[test]
    fn scan_is_deterministic(candles in prop::collection::vec(valid_candle(), 1..40)) {
        let scanner = PatternScanner::default();
        let first = scanner.scan(&candles).unwrap();
        let second = scanner.scan(&candles).unwrap();
        prop_assert_eq!(&first, &second);

        for (index, matches) in &first {
            prop_assert!(!matches.is_empty());
            let order: Vec<usize> = matches
                .iter()
                .map(|m| PatternKind::ALL.iter().position(|k| *k == m.kind).unwrap())
                .collect();
            prop_assert!(order.windows(2).all(|w| w[0] < w[1]), "index {} out of rule order", index);
        }
    }

    #[test]
    fn placement_keeps_every_label(
        candles in prop::collection::vec(valid_candle(), 1..40),
        width in 40.0f64..1200.0,
        height in 40.0f64..800.0,
    ) {
        let hits = scan(&candles, &PatternConfig::all()).unwrap();
        let step = width / candles.len() as f64;
        let boxes: Vec<Rect> = candles
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let top = (200.0 - c.high) / 200.0 * height;
                let bottom = (200.0 - c.low) / 200.0 * height;
                Rect::new(i as f64 * step, top, (step * 0.6).max(1.0), bottom - top)
            })
            .collect();

        let blocks = LabelPlacer::new(Canvas::new(width, height)).place(&hits, &boxes);
        prop_assert_eq!(blocks.len(), hits.len());

        for (j, later) in blocks.iter().enumerate() {
            prop_assert_eq!(later.lines.len(), hits[&later.index].len());
            if later.overlaps {
                continue;
            }
            for earlier in &blocks[..j] {
                prop_assert!(!earlier.rect.intersects(&later.rect));
            }
        }
    }
}
