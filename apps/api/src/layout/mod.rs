// Word-cloud layout engine.
// Sizes words from their weights, then places each one along a spiral until it
// fits without overlapping anything already placed.
// CPU-bound placement must run inside tokio::task::spawn_blocking (see engine::run_layout).

pub mod engine;
pub mod font_metrics;
pub mod geometry;
pub mod normalizer;
pub mod occupancy;
pub mod options;
pub mod result;
pub mod shape;
pub mod spiral;

use thiserror::Error;

// Re-export the public API consumed by handlers and the renderer.
pub use engine::{run_layout, Cancellation, WordInput};
pub use options::LayoutOptions;
pub use result::LayoutResult;
pub use shape::{MetricShapeProvider, ShapeProvider};

/// Errors that abort a layout before any word is placed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("{0}")]
    Validation(String),
}
