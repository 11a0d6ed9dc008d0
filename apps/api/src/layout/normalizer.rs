//! Size Normalizer: maps raw weights onto the configured font-size range.

use crate::layout::options::ScaleMode;
use crate::layout::LayoutError;

impl ScaleMode {
    fn apply(&self, w: f64) -> f64 {
        match self {
            ScaleMode::Linear => w,
            ScaleMode::Sqrt => w.sqrt(),
            ScaleMode::Log => w.ln(),
        }
    }
}

/// Returns one font size per weight, in input order.
///
/// `t = (f(w) - f(min)) / (f(max) - f(min))` with `f` chosen by `mode`, then
/// `size = min_size + t * (max_size - min_size)`. When every weight is equal
/// all words get `max_size`.
pub fn normalize_sizes(
    weights: &[f64],
    mode: ScaleMode,
    size_range: [f64; 2],
) -> Result<Vec<f64>, LayoutError> {
    if weights.is_empty() {
        return Err(LayoutError::Validation(
            "word list must not be empty".to_string(),
        ));
    }
    if let Some((i, w)) = weights
        .iter()
        .enumerate()
        .find(|(_, w)| !w.is_finite() || **w <= 0.0)
    {
        return Err(LayoutError::Validation(format!(
            "word {i} has weight {w}; weights must be finite and > 0"
        )));
    }
    let [min_size, max_size] = size_range;
    if !(min_size > 0.0 && max_size >= min_size) {
        return Err(LayoutError::Validation(format!(
            "invalid size range [{min_size}, {max_size}]"
        )));
    }

    let min_w = weights.iter().copied().fold(f64::INFINITY, f64::min);
    let max_w = weights.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max_w == min_w {
        return Ok(vec![max_size; weights.len()]);
    }

    let lo = mode.apply(min_w);
    let span = mode.apply(max_w) - lo;
    Ok(weights
        .iter()
        .map(|&w| {
            let t = ((mode.apply(w) - lo) / span).clamp(0.0, 1.0);
            min_size + t * (max_size - min_size)
        })
        .collect())
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
