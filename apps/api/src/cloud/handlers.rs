//! Axum route handlers for the layout and word-cloud API.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::cloud::svg::{render_svg, SvgStyle, DEFAULT_BACKGROUND, DEFAULT_COLOR_SCHEME};
use crate::config::Config;
use crate::errors::AppError;
use crate::layout::{run_layout, Cancellation, LayoutOptions, LayoutResult, WordInput};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LayoutRequest {
    pub words: Vec<WordInput>,
    #[serde(default)]
    pub options: LayoutOptions,
}

#[derive(Debug, Deserialize)]
pub struct WordCloudRequest {
    pub words: Vec<WordInput>,
    #[serde(default)]
    pub options: WordCloudOptions,
}

/// Same body as `WordCloudRequest`; options are overlaid on the d3-cloud preset.
#[derive(Debug, Deserialize)]
pub struct AdvancedWordCloudRequest {
    pub words: Vec<WordInput>,
    #[serde(default)]
    pub options: Map<String, Value>,
}

/// Layout options plus presentation settings, all in one flat object.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordCloudOptions {
    #[serde(flatten)]
    pub layout: LayoutOptions,
    #[serde(default = "default_background")]
    pub background_color: String,
    #[serde(default = "default_color_scheme")]
    pub color_scheme: Vec<String>,
}

impl Default for WordCloudOptions {
    fn default() -> Self {
        Self {
            layout: LayoutOptions::default(),
            background_color: default_background(),
            color_scheme: default_color_scheme(),
        }
    }
}

impl WordCloudOptions {
    /// Applies the request's option keys on top of `base`.
    fn overlaid(base: LayoutOptions, overrides: Map<String, Value>) -> Result<Self, AppError> {
        let preset = Self {
            layout: base,
            ..Self::default()
        };
        let mut merged = serde_json::to_value(preset).map_err(|e| AppError::Internal(e.into()))?;
        if let Value::Object(map) = &mut merged {
            map.extend(overrides);
        }
        serde_json::from_value(merged)
            .map_err(|e| AppError::Validation(format!("invalid options: {e}")))
    }
}

fn default_background() -> String {
    DEFAULT_BACKGROUND.to_string()
}

fn default_color_scheme() -> Vec<String> {
    DEFAULT_COLOR_SCHEME.iter().map(|c| c.to_string()).collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/layout
///
/// Runs the placement engine and returns the full `LayoutResult`.
pub async fn handle_layout(
    State(state): State<AppState>,
    payload: Result<Json<LayoutRequest>, JsonRejection>,
) -> Result<Json<LayoutResult>, AppError> {
    let Json(request) = payload?;
    let result = layout(&state, request.words, request.options).await?;
    Ok(Json(result))
}

/// POST /api/wordcloud
///
/// Lays the words out and renders them as an SVG document.
pub async fn handle_wordcloud(
    State(state): State<AppState>,
    payload: Result<Json<WordCloudRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = payload?;
    render_cloud(&state, request.words, request.options).await
}

/// POST /api/wordcloud/advanced
///
/// Same as `/api/wordcloud` but starts from the d3-cloud preset: linear
/// 12–60px sizes, continuous ±30° rotation, padding 2, bold type.
pub async fn handle_wordcloud_advanced(
    State(state): State<AppState>,
    payload: Result<Json<AdvancedWordCloudRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = payload?;
    let options = WordCloudOptions::overlaid(LayoutOptions::d3_cloud(), request.options)?;
    render_cloud(&state, request.words, options).await
}

// ────────────────────────────────────────────────────────────────────────────
// Shared plumbing
// ────────────────────────────────────────────────────────────────────────────

async fn render_cloud(
    state: &AppState,
    words: Vec<WordInput>,
    options: WordCloudOptions,
) -> Result<impl IntoResponse, AppError> {
    let WordCloudOptions {
        layout: mut options,
        background_color,
        color_scheme,
    } = options;

    let style = SvgStyle {
        width: options.width,
        height: options.height,
        background_color,
        color_scheme,
        font_family: options.font_family,
        font_weight: options.font_weight,
    };
    style.validate()?;
    // Colour indices must address the palette actually used for rendering.
    options.color_count = style.color_scheme.len() as u32;

    let result = layout(state, words, options).await?;
    let svg = render_svg(&result, &style);
    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg))
}

/// Sets the abort flag when dropped, so a client disconnect stops the
/// blocking layout task at its next cancellation check.
struct AbortOnDrop(Arc<AtomicBool>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

async fn layout(
    state: &AppState,
    words: Vec<WordInput>,
    options: LayoutOptions,
) -> Result<LayoutResult, AppError> {
    check_limits(&state.config, &words, &options)?;

    let timeout_ms = effective_timeout_ms(&state.config, options.cancel_after_ms);
    let flag = Arc::new(AtomicBool::new(false));
    let cancel = Cancellation::after(Duration::from_millis(timeout_ms)).with_flag(flag.clone());
    let _guard = AbortOnDrop(flag);

    info!(
        words = words.len(),
        width = options.width,
        height = options.height,
        timeout_ms,
        "Layout requested"
    );
    run_layout(words, options, state.shapes.clone(), cancel).await
}

/// The request may shorten the server timeout but never extend it.
fn effective_timeout_ms(config: &Config, requested: Option<u64>) -> u64 {
    requested.map_or(config.layout_timeout_ms, |ms| ms.min(config.layout_timeout_ms))
}

fn check_limits(config: &Config, words: &[WordInput], options: &LayoutOptions) -> Result<(), AppError> {
    if words.len() > config.max_words {
        return Err(AppError::Validation(format!(
            "too many words: {} (limit {})",
            words.len(),
            config.max_words
        )));
    }
    if options.width > config.max_canvas_px || options.height > config.max_canvas_px {
        return Err(AppError::Validation(format!(
            "canvas {}x{} exceeds the {}px limit",
            options.width, options.height, config.max_canvas_px
        )));
    }
    Ok(())
}
