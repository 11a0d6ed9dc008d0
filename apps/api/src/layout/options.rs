//! Typed layout options with defaults and up-front validation.
//!
//! Field names serialize in camelCase so the JSON body matches what clients of
//! the original service already send (`width`, `height`, `fontSizeRange`, ...).

use serde::{Deserialize, Serialize};

use crate::layout::font_metrics::{FontFamily, FontWeight};
use crate::layout::geometry::{Point, Rect};
use crate::layout::LayoutError;

// ────────────────────────────────────────────────────────────────────────────
// Enumerated settings
// ────────────────────────────────────────────────────────────────────────────

/// Monotonic transform applied to weights before mapping them onto the size range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScaleMode {
    Linear,
    #[default]
    Sqrt,
    Log,
}

/// How finely overlap is tested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PrecisionMode {
    /// Axis-aligned bounding rectangles only.
    Bbox,
    /// Per-cell occupancy masks of the rotated glyph boxes.
    #[default]
    Mask,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SpiralKind {
    #[default]
    Archimedean,
    Rectangular,
}

// ────────────────────────────────────────────────────────────────────────────
// LayoutOptions
// ────────────────────────────────────────────────────────────────────────────

/// Fraction of each canvas dimension a clipped word may extend past each edge.
pub const CLIP_INFLATE_RATIO: f64 = 0.25;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutOptions {
    pub width: u32,
    pub height: u32,
    pub scale_mode: ScaleMode,
    /// `[min, max]` font size in px.
    pub font_size_range: [f64; 2],
    /// `[lo, hi]` rotation range in degrees.
    pub rotation_range_deg: [f64; 2],
    /// Number of evenly spaced angles across `rotation_range_deg`.
    /// `None` draws continuously from the range.
    pub rotation_steps: Option<u32>,
    pub precision_mode: PrecisionMode,
    pub padding_px: u32,
    pub max_spiral_radius_multiplier: f64,
    pub random_seed: u64,
    pub cancel_after_ms: Option<u64>,
    pub font_family: FontFamily,
    pub font_weight: FontWeight,
    pub spiral: SpiralKind,
    /// Radians advanced per Archimedean sample.
    pub spiral_angle_step: f64,
    /// Pixels of radius gained per radian (Archimedean) or per ring step
    /// multiplier (rectangular).
    pub spiral_growth: f64,
    /// Spiral start; defaults to the canvas centre.
    pub origin: Option<Point>,
    pub allow_clipping: bool,
    /// Side of one occupancy-mask cell in px (mask mode only).
    pub mask_cell_px: u32,
    /// Palette length the renderer will index into.
    pub color_count: u32,
}

impl Default for LayoutOptions {
    /// 800×600, sqrt scale, 10–60px, three rotations across 0–90°, padding 1.
    /// See `LayoutOptions::d3_cloud` for the advanced endpoint's settings.
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            scale_mode: ScaleMode::Sqrt,
            font_size_range: [10.0, 60.0],
            rotation_range_deg: [0.0, 90.0],
            rotation_steps: Some(3),
            precision_mode: PrecisionMode::Mask,
            padding_px: 1,
            max_spiral_radius_multiplier: 1.5,
            random_seed: 0,
            cancel_after_ms: None,
            font_family: FontFamily::Arial,
            font_weight: FontWeight::Normal,
            spiral: SpiralKind::Archimedean,
            spiral_angle_step: 0.1,
            spiral_growth: 1.0,
            origin: None,
            allow_clipping: false,
            mask_cell_px: 2,
            color_count: 5,
        }
    }
}

impl LayoutOptions {
    /// Settings of the d3-cloud style renderer behind `/api/wordcloud/advanced`:
    /// linear 12–60px sizing, continuous rotation in ±30°, padding 2, bold.
    pub fn d3_cloud() -> Self {
        Self {
            scale_mode: ScaleMode::Linear,
            font_size_range: [12.0, 60.0],
            rotation_range_deg: [-30.0, 30.0],
            rotation_steps: None,
            padding_px: 2,
            font_weight: FontWeight::Bold,
            ..Self::default()
        }
    }

    /// Rejects every option combination the engine cannot honor.
    /// Runs before any placement work so nothing is partially computed.
    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.width == 0 || self.height == 0 {
            return Err(LayoutError::Validation(format!(
                "canvas dimensions must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        let [min_size, max_size] = self.font_size_range;
        if !(min_size.is_finite() && max_size.is_finite()) || min_size <= 0.0 {
            return Err(LayoutError::Validation(format!(
                "fontSizeRange must be finite with min > 0, got [{min_size}, {max_size}]"
            )));
        }
        if max_size < min_size {
            return Err(LayoutError::Validation(format!(
                "fontSizeRange max ({max_size}) must be >= min ({min_size})"
            )));
        }
        let [lo, hi] = self.rotation_range_deg;
        if !(lo.is_finite() && hi.is_finite()) || hi < lo {
            return Err(LayoutError::Validation(format!(
                "rotationRangeDeg must be finite with lo <= hi, got [{lo}, {hi}]"
            )));
        }
        if self.rotation_steps == Some(0) {
            return Err(LayoutError::Validation(
                "rotationSteps must be at least 1".to_string(),
            ));
        }
        if !(self.max_spiral_radius_multiplier.is_finite() && self.max_spiral_radius_multiplier > 0.0)
        {
            return Err(LayoutError::Validation(format!(
                "maxSpiralRadiusMultiplier must be > 0, got {}",
                self.max_spiral_radius_multiplier
            )));
        }
        if !(self.spiral_angle_step.is_finite() && self.spiral_angle_step > 0.0) {
            return Err(LayoutError::Validation(format!(
                "spiralAngleStep must be > 0, got {}",
                self.spiral_angle_step
            )));
        }
        if !(self.spiral_growth.is_finite() && self.spiral_growth > 0.0) {
            return Err(LayoutError::Validation(format!(
                "spiralGrowth must be > 0, got {}",
                self.spiral_growth
            )));
        }
        if self.mask_cell_px == 0 {
            return Err(LayoutError::Validation(
                "maskCellPx must be at least 1".to_string(),
            ));
        }
        if self.color_count == 0 {
            return Err(LayoutError::Validation(
                "colorCount must be at least 1".to_string(),
            ));
        }
        if let Some(origin) = self.origin {
            if !self.canvas().contains_point(origin) {
                return Err(LayoutError::Validation(format!(
                    "origin ({}, {}) lies outside the {}x{} canvas",
                    origin.x, origin.y, self.width, self.height
                )));
            }
        }
        Ok(())
    }

    pub fn canvas(&self) -> Rect {
        Rect::from_size(self.width as f64, self.height as f64)
    }

    /// Region a placed word's bounding box must stay within.
    pub fn placement_bounds(&self) -> Rect {
        let canvas = self.canvas();
        if self.allow_clipping {
            let dx = canvas.width() * CLIP_INFLATE_RATIO;
            let dy = canvas.height() * CLIP_INFLATE_RATIO;
            Rect::new(-dx, -dy, canvas.max_x + dx, canvas.max_y + dy)
        } else {
            canvas
        }
    }

    pub fn spiral_origin(&self) -> Point {
        self.origin
            .unwrap_or_else(|| Point::new(self.width as f64 / 2.0, self.height as f64 / 2.0))
    }

    pub fn canvas_diagonal(&self) -> f64 {
        (self.width as f64).hypot(self.height as f64)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
