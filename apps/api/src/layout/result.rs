//! Layout Result Collector: per-word final states plus aggregate statistics.
//!
//! `LayoutResult` is the only thing the engine hands to renderers. It is built
//! once at the end of a run and never mutated afterwards.

use serde::{Deserialize, Serialize};

use crate::layout::geometry::{Point, Rect};

// ────────────────────────────────────────────────────────────────────────────
// Per-word state
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WordStatus {
    Pending,
    Placed,
    Dropped,
}

/// Why a word ended up `Dropped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DropReason {
    /// The spiral passed its radius limit without finding a free spot.
    SpiralExhausted,
    /// The footprint is larger than the placement bounds at this rotation.
    TooLarge,
    /// The shape provider could not measure the word.
    ShapeError,
    /// The run was cancelled before the word was placed.
    Cancelled,
}

/// A word's state. Identity is `index`, its position in the input list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    pub index: usize,
    pub text: String,
    pub raw_weight: f64,
    pub normalized_size: f64,
    pub rotation_deg: f64,
    /// Anchor (centre of the line box) once placed.
    pub position: Option<Point>,
    pub color_index: u32,
    pub status: WordStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drop_reason: Option<DropReason>,
    /// Absolute ink bounding box once placed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Rect>,
    /// Area credited to the word for density (bbox or ink area by precision mode).
    #[serde(skip)]
    pub(crate) footprint_area: f64,
}

impl Word {
    pub fn pending(index: usize, text: String, raw_weight: f64, size: f64, color_index: u32) -> Self {
        Self {
            index,
            text,
            raw_weight,
            normalized_size: size,
            rotation_deg: 0.0,
            position: None,
            color_index,
            status: WordStatus::Pending,
            drop_reason: None,
            bounds: None,
            footprint_area: 0.0,
        }
    }

    /// Terminal transition to `Placed`.
    pub fn place(&mut self, anchor: Point, bounds: Rect, footprint_area: f64) {
        debug_assert_eq!(self.status, WordStatus::Pending);
        self.status = WordStatus::Placed;
        self.position = Some(anchor);
        self.bounds = Some(bounds);
        self.footprint_area = footprint_area;
    }

    /// Terminal transition to `Dropped`.
    pub fn drop_with(&mut self, reason: DropReason) {
        debug_assert_eq!(self.status, WordStatus::Pending);
        self.status = WordStatus::Dropped;
        self.drop_reason = Some(reason);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Output contract
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub index: usize,
    pub text: String,
    pub size: f64,
    pub rotation_deg: f64,
    pub x: f64,
    pub y: f64,
    pub color_index: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl From<Rect> for BoundingBox {
    fn from(r: Rect) -> Self {
        Self {
            x: r.min_x,
            y: r.min_y,
            width: r.width(),
            height: r.height(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutStats {
    pub placed_count: usize,
    pub dropped_count: usize,
    pub bounding_box: Option<BoundingBox>,
    /// Placed area / bounding-box area, in [0, 1].
    pub density: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutResult {
    /// Every word in input order.
    pub words: Vec<Word>,
    /// Placed words in input order.
    pub placements: Vec<Placement>,
    /// Texts of dropped words in input order.
    pub dropped: Vec<String>,
    pub stats: LayoutStats,
    /// True when the run was cancelled; the layout is valid but partial.
    pub timed_out: bool,
}

/// Builds the final result from terminal word states.
///
/// Words still `Pending` (only possible after cancellation) are marked
/// `Dropped` here so the output never contains a non-terminal state.
pub fn collect(mut words: Vec<Word>, timed_out: bool) -> LayoutResult {
    words.sort_by_key(|w| w.index);
    for w in words.iter_mut().filter(|w| w.status == WordStatus::Pending) {
        w.drop_with(DropReason::Cancelled);
    }

    let placements: Vec<Placement> = words
        .iter()
        .filter_map(|w| {
            let p = w.position?;
            Some(Placement {
                index: w.index,
                text: w.text.clone(),
                size: w.normalized_size,
                rotation_deg: w.rotation_deg,
                x: p.x,
                y: p.y,
                color_index: w.color_index,
            })
        })
        .collect();
    let dropped: Vec<String> = words
        .iter()
        .filter(|w| w.status == WordStatus::Dropped)
        .map(|w| w.text.clone())
        .collect();

    let enclosing = words
        .iter()
        .filter_map(|w| w.bounds)
        .reduce(|a, b| a.union(&b));
    let placed_area: f64 = words.iter().map(|w| w.footprint_area).sum();
    let density = match enclosing {
        Some(r) if r.area() > 0.0 => (placed_area / r.area()).clamp(0.0, 1.0),
        _ => 0.0,
    };

    LayoutResult {
        stats: LayoutStats {
            placed_count: placements.len(),
            dropped_count: dropped.len(),
            bounding_box: enclosing.map(BoundingBox::from),
            density,
        },
        words,
        placements,
        dropped,
        timed_out,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
