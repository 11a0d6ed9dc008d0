// HTTP-facing word-cloud surface: request handlers plus the SVG renderer.

pub mod handlers;
pub mod svg;
