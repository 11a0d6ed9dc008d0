use std::sync::Arc;

use crate::config::Config;
use crate::layout::{MetricShapeProvider, ShapeProvider};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable glyph measurement. Default: MetricShapeProvider (static font tables).
    pub shapes: Arc<dyn ShapeProvider>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            shapes: Arc::new(MetricShapeProvider),
        }
    }
}
