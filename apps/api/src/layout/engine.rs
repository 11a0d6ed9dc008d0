//! Spiral Placement Engine: assigns every word a size, rotation and position.
//!
//! # Architecture
//! - `compute_layout` is the synchronous, CPU-bound core. One call owns its
//!   occupancy index and PRNG; nothing is shared between calls except the
//!   read-only shape provider.
//! - `run_layout` is the async entry point used by handlers. It moves the work
//!   onto `tokio::task::spawn_blocking` so the scheduler stays responsive.
//!
//! # Placement order
//! Words are visited by descending size, ties broken by input index. Each word
//! draws its rotation from a `StdRng` seeded with `randomSeed`, so identical
//! inputs always produce an identical layout.
//!
//! # Cancellation
//! `Cancellation` is polled before every word and every `CANCEL_CHECK_INTERVAL`
//! spiral samples. A cancelled run still returns a valid partial result.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::layout::geometry::Point;
use crate::layout::normalizer::normalize_sizes;
use crate::layout::occupancy::OccupancyIndex;
use crate::layout::options::{LayoutOptions, PrecisionMode};
use crate::layout::result::{collect, DropReason, LayoutResult, Word};
use crate::layout::shape::{MeasureSpec, ShapeProvider};
use crate::layout::spiral::Spiral;
use crate::layout::LayoutError;

/// Spiral samples between two cancellation checks.
pub const CANCEL_CHECK_INTERVAL: u64 = 256;

// ────────────────────────────────────────────────────────────────────────────
// Input types
// ────────────────────────────────────────────────────────────────────────────

/// One input word. `value` is accepted as an alias of `weight`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordInput {
    pub text: String,
    #[serde(alias = "value")]
    pub weight: f64,
}

impl WordInput {
    pub fn new(text: impl Into<String>, weight: f64) -> Self {
        Self {
            text: text.into(),
            weight,
        }
    }
}

/// Per-request cancellation signal: an optional deadline and an optional
/// shared abort flag.
#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    deadline: Option<Instant>,
    flag: Option<Arc<AtomicBool>>,
}

impl Cancellation {
    /// Cancels once `timeout` has elapsed from now.
    pub fn after(timeout: Duration) -> Self {
        Self {
            deadline: Some(Instant::now() + timeout),
            flag: None,
        }
    }

    /// Cancels once `flag` is set to `true` by another thread.
    pub fn with_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.flag = Some(flag);
        self
    }

    pub fn is_cancelled(&self) -> bool {
        if let Some(flag) = &self.flag {
            if flag.load(Ordering::Relaxed) {
                return true;
            }
        }
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Public entry points
// ────────────────────────────────────────────────────────────────────────────

/// Runs `compute_layout` on the blocking pool.
///
/// Takes owned data to satisfy `spawn_blocking`'s `'static` bound.
pub async fn run_layout(
    words: Vec<WordInput>,
    options: LayoutOptions,
    provider: Arc<dyn ShapeProvider>,
    cancel: Cancellation,
) -> Result<LayoutResult, AppError> {
    let result = tokio::task::spawn_blocking(move || {
        compute_layout(&words, &options, provider.as_ref(), &cancel)
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in layout: {e}")))??;
    Ok(result)
}

/// Lays out `words` on the canvas described by `options`.
///
/// Validation failures return `LayoutError::Validation` before any placement.
/// Unmeasurable words, oversize words and spiral exhaustion only drop the
/// word concerned. Cancellation yields `timed_out = true` with every word not
/// yet placed marked `Dropped`.
pub fn compute_layout(
    words: &[WordInput],
    options: &LayoutOptions,
    provider: &dyn ShapeProvider,
    cancel: &Cancellation,
) -> Result<LayoutResult, LayoutError> {
    options.validate()?;
    if let Some(i) = words.iter().position(|w| w.text.is_empty()) {
        return Err(LayoutError::Validation(format!("word {i} has empty text")));
    }
    let weights: Vec<f64> = words.iter().map(|w| w.weight).collect();
    let sizes = normalize_sizes(&weights, options.scale_mode, options.font_size_range)?;

    let started = Instant::now();
    let mut state: Vec<Word> = words
        .iter()
        .zip(&sizes)
        .enumerate()
        .map(|(i, (w, &size))| {
            let color = (i % options.color_count as usize) as u32;
            Word::pending(i, w.text.clone(), w.weight, size, color)
        })
        .collect();

    let order = placement_order(&sizes);
    let mut engine = Engine::new(options, provider);
    let mut timed_out = false;

    for &i in &order {
        if cancel.is_cancelled() {
            timed_out = true;
            break;
        }
        let word = &mut state[i];
        match engine.place(word, cancel) {
            Outcome::Placed => {}
            Outcome::Dropped(reason) => {
                debug!(index = i, text = %word.text, ?reason, "Word dropped");
                word.drop_with(reason);
            }
            Outcome::Cancelled => {
                timed_out = true;
                break;
            }
        }
    }

    let result = collect(state, timed_out);
    if timed_out {
        warn!(
            placed = result.stats.placed_count,
            total = words.len(),
            "Layout cancelled; returning partial result"
        );
    }
    info!(
        words = words.len(),
        placed = result.stats.placed_count,
        dropped = result.stats.dropped_count,
        density = result.stats.density,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Layout complete"
    );
    Ok(result)
}

/// Indices sorted by descending size, ties by ascending index.
pub(crate) fn placement_order(sizes: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..sizes.len()).collect();
    order.sort_by(|&a, &b| sizes[b].total_cmp(&sizes[a]).then(a.cmp(&b)));
    order
}

// ────────────────────────────────────────────────────────────────────────────
// Engine internals
// ────────────────────────────────────────────────────────────────────────────

enum Outcome {
    Placed,
    Dropped(DropReason),
    Cancelled,
}

struct Engine<'a> {
    options: &'a LayoutOptions,
    provider: &'a dyn ShapeProvider,
    spec: MeasureSpec,
    index: OccupancyIndex,
    rng: StdRng,
    origin: Point,
    max_radius: f64,
}

impl<'a> Engine<'a> {
    fn new(options: &'a LayoutOptions, provider: &'a dyn ShapeProvider) -> Self {
        let origin = options.spiral_origin();
        let mask_cell_px = options.mask_cell_px as f64;
        Self {
            options,
            provider,
            spec: MeasureSpec {
                font: options.font_family,
                weight: options.font_weight,
                precision: options.precision_mode,
                padding_px: options.padding_px as f64,
                mask_cell_px,
            },
            index: OccupancyIndex::new(options.placement_bounds(), mask_cell_px, origin),
            rng: StdRng::seed_from_u64(options.random_seed),
            origin,
            max_radius: options.max_spiral_radius_multiplier * options.canvas_diagonal(),
        }
    }

    fn draw_rotation(&mut self) -> f64 {
        let [lo, hi] = self.options.rotation_range_deg;
        match self.options.rotation_steps {
            Some(1) => lo,
            Some(steps) => {
                let k = self.rng.gen_range(0..steps);
                lo + (hi - lo) * k as f64 / (steps - 1) as f64
            }
            None if hi > lo => self.rng.gen_range(lo..=hi),
            None => lo,
        }
    }

    /// Moves `word` from `Pending` to `Placed`, or reports why it cannot be.
    fn place(&mut self, word: &mut Word, cancel: &Cancellation) -> Outcome {
        // Drawn before measuring so a failed word still consumes its draw.
        let rotation = self.draw_rotation();
        word.rotation_deg = rotation;

        let shape = match self
            .provider
            .measure(&word.text, &self.spec, word.normalized_size, rotation)
        {
            Ok(shape) => shape,
            Err(e) => {
                debug!(index = word.index, error = %e, "Shape provider failed");
                return Outcome::Dropped(DropReason::ShapeError);
            }
        };

        let bounds = self.options.placement_bounds();
        if shape.bounds.width() > bounds.width() || shape.bounds.height() > bounds.height() {
            return Outcome::Dropped(DropReason::TooLarge);
        }

        let aspect = self.options.width as f64 / self.options.height as f64;
        let spiral = Spiral::new(
            self.options.spiral,
            self.options.spiral_angle_step,
            self.options.spiral_growth,
            aspect,
            self.max_radius,
        );
        let snap = match self.options.precision_mode {
            PrecisionMode::Mask => Some(self.spec.mask_cell_px),
            PrecisionMode::Bbox => None,
        };

        let mut last: Option<Point> = None;
        for (k, offset) in (0u64..).zip(spiral) {
            if k > 0 && k % CANCEL_CHECK_INTERVAL == 0 && cancel.is_cancelled() {
                return Outcome::Cancelled;
            }
            let offset = match snap {
                Some(c) => Point::new((offset.x / c).round() * c, (offset.y / c).round() * c),
                None => offset,
            };
            if last == Some(offset) {
                continue;
            }
            last = Some(offset);

            let anchor = Point::new(self.origin.x + offset.x, self.origin.y + offset.y);
            let placed_bounds = shape.bounds.translate(anchor.x, anchor.y);
            if !bounds.contains_rect(&placed_bounds) {
                continue;
            }
            if self.index.test(&shape, anchor) {
                continue;
            }

            let area = match self.options.precision_mode {
                PrecisionMode::Bbox => shape.bounds.area(),
                PrecisionMode::Mask => shape.ink_area,
            };
            word.place(anchor, placed_bounds, area);
            self.index.insert(shape, anchor);
            return Outcome::Placed;
        }
        Outcome::Dropped(DropReason::SpiralExhausted)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::geometry::Rect;
    use crate::layout::options::{ScaleMode, SpiralKind};
    use crate::layout::result::WordStatus;
    use crate::layout::shape::{MetricShapeProvider, Shape, ShapeError};
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn words(pairs: &[(&str, f64)]) -> Vec<WordInput> {
        pairs.iter().map(|(t, w)| WordInput::new(*t, *w)).collect()
    }

    fn scenario_a_options() -> LayoutOptions {
        LayoutOptions {
            width: 200,
            height: 200,
            scale_mode: ScaleMode::Linear,
            font_size_range: [10.0, 40.0],
            random_seed: 42,
            ..Default::default()
        }
    }

    fn try_run(words: &[WordInput], options: &LayoutOptions) -> Result<LayoutResult, LayoutError> {
        compute_layout(words, options, &MetricShapeProvider, &Cancellation::default())
    }

    fn run(words: &[WordInput], options: &LayoutOptions) -> LayoutResult {
        try_run(words, options).unwrap()
    }

    /// Re-measures a placed word exactly as the engine did.
    fn placed_shape(word: &Word, options: &LayoutOptions) -> Shape {
        let spec = MeasureSpec {
            font: options.font_family,
            weight: options.font_weight,
            precision: options.precision_mode,
            padding_px: options.padding_px as f64,
            mask_cell_px: options.mask_cell_px as f64,
        };
        MetricShapeProvider
            .measure(&word.text, &spec, word.normalized_size, word.rotation_deg)
            .unwrap()
    }

    /// Rebuilds an index from scratch, checking each placed word against all
    /// earlier ones with the same predicate the engine uses.
    fn assert_no_overlap(result: &LayoutResult, options: &LayoutOptions) {
        let mut index = OccupancyIndex::new(
            options.placement_bounds(),
            options.mask_cell_px as f64,
            options.spiral_origin(),
        );
        for w in result.words.iter().filter(|w| w.status == WordStatus::Placed) {
            let shape = placed_shape(w, options);
            let anchor = w.position.unwrap();
            assert!(!index.test(&shape, anchor), "word {} overlaps an earlier word", w.index);
            index.insert(shape, anchor);
        }
    }

    /// Absolute lattice cells covered by a word's mask. Anchors sit on the
    /// lattice anchored at the spiral origin, so the rounding is exact.
    fn occupied_cells(shape: &Shape, anchor: Point, options: &LayoutOptions) -> HashSet<(i64, i64)> {
        let c = options.mask_cell_px as f64;
        let origin = options.spiral_origin();
        let col = ((anchor.x - origin.x) / c).round() as i64;
        let row = ((anchor.y - origin.y) / c).round() as i64;
        let mask = shape.mask.as_ref().unwrap();
        let mut cells = HashSet::new();
        for r in 0..mask.rows {
            for k in 0..mask.cols {
                if mask.get(k, r) {
                    cells.insert((col + mask.col0 + k as i64, row + mask.row0 + r as i64));
                }
            }
        }
        cells
    }

    /// Compares every pair of placed words directly, without going through
    /// the grid index: colliders in bbox mode, cell sets in mask mode.
    fn assert_pairwise_disjoint(result: &LayoutResult, options: &LayoutOptions) {
        let placed: Vec<(usize, Shape, Point)> = result
            .words
            .iter()
            .filter(|w| w.status == WordStatus::Placed)
            .map(|w| (w.index, placed_shape(w, options), w.position.unwrap()))
            .collect();
        match options.precision_mode {
            PrecisionMode::Bbox => {
                let rects: Vec<Rect> = placed
                    .iter()
                    .map(|(_, s, p)| s.collider.translate(p.x, p.y))
                    .collect();
                for i in 0..rects.len() {
                    for j in i + 1..rects.len() {
                        assert!(
                            !rects[i].intersects(&rects[j]),
                            "words {} and {} overlap",
                            placed[i].0,
                            placed[j].0
                        );
                    }
                }
            }
            PrecisionMode::Mask => {
                let cells: Vec<HashSet<(i64, i64)>> = placed
                    .iter()
                    .map(|(_, s, p)| occupied_cells(s, *p, options))
                    .collect();
                for i in 0..cells.len() {
                    for j in i + 1..cells.len() {
                        assert!(
                            cells[i].is_disjoint(&cells[j]),
                            "words {} and {} share mask cells",
                            placed[i].0,
                            placed[j].0
                        );
                    }
                }
            }
        }
    }

    fn assert_in_bounds(result: &LayoutResult, options: &LayoutOptions) {
        let bounds = options.placement_bounds();
        for w in &result.words {
            if let Some(b) = w.bounds {
                assert!(bounds.contains_rect(&b), "word {} at {b:?} leaves {bounds:?}", w.index);
            }
        }
    }

    #[test]
    #[should_panic(expected = "overlap")]
    fn test_pairwise_check_flags_stacked_words() {
        let options = LayoutOptions {
            precision_mode: PrecisionMode::Bbox,
            ..Default::default()
        };
        let anchor = Point::new(400.0, 300.0);
        let stacked: Vec<Word> = (0..2)
            .map(|i| {
                let mut w = Word::pending(i, "same".to_string(), 1.0, 30.0, 0);
                let shape = placed_shape(&w, &options);
                w.place(anchor, shape.bounds.translate(anchor.x, anchor.y), shape.bounds.area());
                w
            })
            .collect();
        assert_pairwise_disjoint(&collect(stacked, false), &options);
    }

    // ── scenarios ───────────────────────────────────────────────────────────

    #[test]
    fn test_scenario_a_sizes_and_placement() {
        let input = words(&[("alpha", 10.0), ("beta", 5.0), ("gamma", 1.0)]);
        let options = scenario_a_options();
        let result = run(&input, &options);

        assert!((result.words[0].normalized_size - 40.0).abs() < 1e-9);
        assert!((result.words[1].normalized_size - (10.0 + 30.0 * 4.0 / 9.0)).abs() < 1e-9);
        assert!((result.words[2].normalized_size - 10.0).abs() < 1e-9);
        assert!(result.words.iter().all(|w| w.status == WordStatus::Placed));
        assert_eq!(result.stats.placed_count, 3);

        // The largest word is visited first and lands on the radius-0 sample.
        assert_eq!(result.placements[0].text, "alpha");
        assert_eq!((result.placements[0].x, result.placements[0].y), (100.0, 100.0));
        assert_no_overlap(&result, &options);
        assert_pairwise_disjoint(&result, &options);
    }

    #[test]
    fn test_scenario_a_is_a_stable_fixture() {
        let input = words(&[("alpha", 10.0), ("beta", 5.0), ("gamma", 1.0)]);
        let options = scenario_a_options();
        let result = run(&input, &options);
        let pinned: Vec<(&str, f64, f64, f64)> = result
            .placements
            .iter()
            .map(|p| (p.text.as_str(), p.x, p.y, p.rotation_deg))
            .collect();
        assert_eq!(
            pinned,
            vec![
                ("alpha", 100.0, 100.0, 0.0),
                ("beta", 80.0, 64.0, 45.0),
                ("gamma", 110.0, 124.0, 0.0),
            ]
        );

        let first = serde_json::to_string(&result).unwrap();
        for _ in 0..3 {
            assert_eq!(serde_json::to_string(&run(&input, &options)).unwrap(), first);
        }
    }

    #[test]
    fn test_scenario_b_tiny_canvas_many_words() {
        let input: Vec<WordInput> = (0..1000)
            .map(|i| WordInput::new(format!("word{i}"), 1.0 + (i % 37) as f64))
            .collect();
        let options = LayoutOptions {
            width: 50,
            height: 50,
            ..Default::default()
        };
        let started = Instant::now();
        let result = run(&input, &options);
        assert!(started.elapsed() < Duration::from_secs(30));

        assert_eq!(result.words.len(), 1000);
        assert!(result.stats.dropped_count > result.stats.placed_count);
        assert_eq!(result.stats.placed_count + result.stats.dropped_count, 1000);
        assert!(!result.timed_out);
        assert_no_overlap(&result, &options);
        assert_pairwise_disjoint(&result, &options);
        assert_in_bounds(&result, &options);
    }

    #[test]
    fn test_scenario_c_single_word_at_centre() {
        for precision in [PrecisionMode::Bbox, PrecisionMode::Mask] {
            let options = LayoutOptions {
                width: 300,
                height: 201,
                precision_mode: precision,
                ..Default::default()
            };
            let result = run(&words(&[("solo", 0.25)]), &options);
            let w = &result.words[0];
            assert_eq!(w.status, WordStatus::Placed);
            assert_eq!(w.normalized_size, 60.0);
            assert_eq!(w.position, Some(Point::new(150.0, 100.5)));
        }
    }

    // ── graceful degradation ────────────────────────────────────────────────

    #[test]
    fn test_word_larger_than_canvas_is_dropped_others_placed() {
        let input = words(&[("enormousword", 100.0), ("ok", 1.0)]);
        let options = LayoutOptions {
            width: 120,
            height: 120,
            font_size_range: [12.0, 200.0],
            rotation_steps: Some(1),
            ..Default::default()
        };
        let result = run(&input, &options);
        assert_eq!(result.words[0].status, WordStatus::Dropped);
        assert_eq!(result.words[0].drop_reason, Some(DropReason::TooLarge));
        assert_eq!(result.words[1].status, WordStatus::Placed);
        assert_eq!(result.dropped, vec!["enormousword".to_string()]);
    }

    #[test]
    fn test_unmeasurable_word_is_dropped_and_run_continues() {
        let input = words(&[("   ", 5.0), ("fine", 3.0)]);
        let result = run(&input, &LayoutOptions::default());
        assert_eq!(result.words[0].drop_reason, Some(DropReason::ShapeError));
        assert_eq!(result.words[1].status, WordStatus::Placed);
    }

    struct FailingProvider;

    impl ShapeProvider for FailingProvider {
        fn measure(&self, text: &str, spec: &MeasureSpec, size: f64, rot: f64) -> Result<Shape, ShapeError> {
            if text == "boom" {
                return Err(ShapeError::NoGlyphs);
            }
            MetricShapeProvider.measure(text, spec, size, rot)
        }
    }

    #[test]
    fn test_custom_provider_failure_is_isolated() {
        let input = words(&[("boom", 9.0), ("calm", 4.0), ("quiet", 1.0)]);
        let result = compute_layout(
            &input,
            &LayoutOptions::default(),
            &FailingProvider,
            &Cancellation::default(),
        )
        .unwrap();
        assert_eq!(result.stats.dropped_count, 1);
        assert_eq!(result.stats.placed_count, 2);
    }

    #[test]
    fn test_crowded_canvas_exhausts_spiral() {
        let input: Vec<WordInput> = (0..60).map(|i| WordInput::new("MMMM", 1.0 + i as f64)).collect();
        let options = LayoutOptions {
            width: 120,
            height: 80,
            font_size_range: [18.0, 20.0],
            rotation_steps: Some(1),
            ..Default::default()
        };
        let result = run(&input, &options);
        assert!(result
            .words
            .iter()
            .any(|w| w.drop_reason == Some(DropReason::SpiralExhausted)));
        assert_no_overlap(&result, &options);
        assert_pairwise_disjoint(&result, &options);
    }

    // ── validation ──────────────────────────────────────────────────────────

    #[test]
    fn test_empty_words_rejected() {
        let err = compute_layout(
            &[],
            &LayoutOptions::default(),
            &MetricShapeProvider,
            &Cancellation::default(),
        )
        .unwrap_err();
        assert!(matches!(err, LayoutError::Validation(_)));
    }

    #[test]
    fn test_empty_text_rejected() {
        let err = try_run(&words(&[("a", 1.0), ("", 2.0)]), &LayoutOptions::default())
            .unwrap_err();
        assert!(err.to_string().contains("word 1"), "got {err}");
    }

    #[test]
    fn test_negative_weight_rejected() {
        assert!(try_run(&words(&[("a", -1.0)]), &LayoutOptions::default()).is_err());
    }

    #[test]
    fn test_zero_height_rejected() {
        let options = LayoutOptions {
            height: 0,
            ..Default::default()
        };
        assert!(try_run(&words(&[("a", 1.0)]), &options).is_err());
    }

    // ── ordering / rotation ─────────────────────────────────────────────────

    #[test]
    fn test_placement_order_descending_with_stable_ties() {
        assert_eq!(placement_order(&[10.0, 30.0, 10.0, 30.0, 20.0]), vec![1, 3, 4, 0, 2]);
    }

    #[test]
    fn test_rotation_steps_produce_discrete_angles() {
        let input: Vec<WordInput> = (0..30).map(|i| WordInput::new(format!("w{i}"), 1.0)).collect();
        let options = LayoutOptions {
            rotation_range_deg: [-60.0, 60.0],
            rotation_steps: Some(5),
            ..Default::default()
        };
        let result = run(&input, &options);
        for w in &result.words {
            assert!(
                [-60.0, -30.0, 0.0, 30.0, 60.0].contains(&w.rotation_deg),
                "unexpected angle {}",
                w.rotation_deg
            );
        }
    }

    #[test]
    fn test_continuous_rotation_stays_in_range() {
        let input: Vec<WordInput> = (0..30).map(|i| WordInput::new(format!("w{i}"), 1.0)).collect();
        let options = LayoutOptions {
            rotation_range_deg: [-30.0, 30.0],
            rotation_steps: None,
            ..Default::default()
        };
        let result = run(&input, &options);
        assert!(result.words.iter().all(|w| (-30.0..=30.0).contains(&w.rotation_deg)));
        assert!(result.words.iter().any(|w| w.rotation_deg != result.words[0].rotation_deg));
    }

    #[test]
    fn test_different_seeds_change_rotations() {
        let input: Vec<WordInput> = (0..20).map(|i| WordInput::new(format!("w{i}"), 1.0)).collect();
        let a = run(&input, &LayoutOptions { random_seed: 1, ..Default::default() });
        let b = run(&input, &LayoutOptions { random_seed: 2, ..Default::default() });
        let rot = |r: &LayoutResult| r.words.iter().map(|w| w.rotation_deg).collect::<Vec<_>>();
        assert_ne!(rot(&a), rot(&b));
    }

    // ── spiral / clipping ───────────────────────────────────────────────────

    #[test]
    fn test_rectangular_spiral_places_without_overlap() {
        let input: Vec<WordInput> = (0..40).map(|i| WordInput::new(format!("rect{i}"), 1.0 + i as f64)).collect();
        let options = LayoutOptions {
            spiral: SpiralKind::Rectangular,
            width: 400,
            height: 300,
            ..Default::default()
        };
        let result = run(&input, &options);
        assert!(result.stats.placed_count > 20);
        assert_no_overlap(&result, &options);
        assert_pairwise_disjoint(&result, &options);
        assert_in_bounds(&result, &options);
    }

    #[test]
    fn test_clipping_allows_edges_past_canvas() {
        let options = LayoutOptions {
            width: 100,
            height: 100,
            allow_clipping: true,
            origin: Some(Point::new(0.0, 50.0)),
            font_size_range: [20.0, 20.0],
            rotation_steps: Some(1),
            precision_mode: PrecisionMode::Bbox,
            ..Default::default()
        };
        let result = run(&words(&[("edge", 1.0)]), &options);
        let b = result.words[0].bounds.unwrap();
        assert!(b.min_x < 0.0, "clipped word should start left of the canvas");
        assert!(options.placement_bounds().contains_rect(&b));
        assert_eq!(result.words[0].position, Some(Point::new(0.0, 50.0)));
    }

    // ── cancellation ────────────────────────────────────────────────────────

    #[test]
    fn test_pre_cancelled_flag_returns_partial_result() {
        let flag = Arc::new(AtomicBool::new(true));
        let cancel = Cancellation::default().with_flag(flag);
        let result = compute_layout(
            &words(&[("a", 1.0), ("b", 2.0)]),
            &LayoutOptions::default(),
            &MetricShapeProvider,
            &cancel,
        )
        .unwrap();
        assert!(result.timed_out);
        assert_eq!(result.stats.placed_count, 0);
        assert!(result
            .words
            .iter()
            .all(|w| w.drop_reason == Some(DropReason::Cancelled)));
    }

    #[test]
    fn test_expired_deadline_returns_partial_result() {
        let input: Vec<WordInput> = (0..500).map(|i| WordInput::new(format!("w{i}"), 1.0)).collect();
        let result = compute_layout(
            &input,
            &LayoutOptions::default(),
            &MetricShapeProvider,
            &Cancellation::after(Duration::ZERO),
        )
        .unwrap();
        assert!(result.timed_out);
        assert_eq!(result.stats.placed_count + result.stats.dropped_count, 500);
    }

    #[tokio::test]
    async fn test_run_layout_on_blocking_pool() {
        let result = run_layout(
            words(&[("async", 2.0), ("layout", 1.0)]),
            LayoutOptions::default(),
            Arc::new(MetricShapeProvider),
            Cancellation::after(Duration::from_secs(10)),
        )
        .await
        .unwrap();
        assert_eq!(result.stats.placed_count, 2);
    }

    #[tokio::test]
    async fn test_run_layout_maps_validation_error() {
        let err = run_layout(
            vec![],
            LayoutOptions::default(),
            Arc::new(MetricShapeProvider),
            Cancellation::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    // ── properties ──────────────────────────────────────────────────────────

    fn word_list() -> impl Strategy<Value = Vec<WordInput>> {
        prop::collection::vec(("[a-zA-Z]{1,9}", 0.5f64..100.0), 1..25)
            .prop_map(|v| v.into_iter().map(|(t, w)| WordInput::new(t, w)).collect())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_layout_invariants(
            input in word_list(),
            seed in any::<u64>(),
            mask in any::<bool>(),
            w in 80u32..400,
            h in 80u32..400,
        ) {
            let options = LayoutOptions {
                width: w,
                height: h,
                random_seed: seed,
                precision_mode: if mask { PrecisionMode::Mask } else { PrecisionMode::Bbox },
                rotation_range_deg: [-45.0, 45.0],
                rotation_steps: None,
                ..Default::default()
            };
            let result = run(&input, &options);
            prop_assert_eq!(result.words.len(), input.len());
            prop_assert_eq!(result.stats.placed_count + result.stats.dropped_count, input.len());
            assert_no_overlap(&result, &options);
            assert_pairwise_disjoint(&result, &options);
            assert_in_bounds(&result, &options);
            prop_assert!(result.stats.density >= 0.0 && result.stats.density <= 1.0);

            for a in &result.words {
                for b in &result.words {
                    if a.raw_weight > b.raw_weight {
                        prop_assert!(a.normalized_size >= b.normalized_size);
                    }
                }
            }

            let again = run(&input, &options);
            prop_assert_eq!(result, again);
        }
    }

    #[test]
    fn test_bounds_helper_catches_outside() {
        let b = Rect::from_size(10.0, 10.0);
        assert!(!b.contains_rect(&Rect::new(5.0, 5.0, 11.0, 6.0)));
    }
}
