//! SVG rendering of a finished layout.
//!
//! Each placement becomes one `<text>` element centred on its anchor. The
//! anchor is the middle of the line box, which is exactly what
//! `dominant-baseline="central"` aligns to, so the rendered glyphs land on the
//! footprint the engine reserved.

use crate::errors::AppError;
use crate::layout::font_metrics::{FontFamily, FontWeight};
use crate::layout::LayoutResult;

/// Five-colour d3 category palette used when the request names none.
pub const DEFAULT_COLOR_SCHEME: [&str; 5] = ["#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd"];
pub const DEFAULT_BACKGROUND: &str = "#ffffff";

/// Presentation settings that do not influence placement.
#[derive(Debug, Clone)]
pub struct SvgStyle {
    pub width: u32,
    pub height: u32,
    pub background_color: String,
    pub color_scheme: Vec<String>,
    pub font_family: FontFamily,
    pub font_weight: FontWeight,
}

impl SvgStyle {
    /// Rejects colours that could break out of an attribute value.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.color_scheme.is_empty() {
            return Err(AppError::Validation("colorScheme must not be empty".to_string()));
        }
        for color in std::iter::once(&self.background_color).chain(&self.color_scheme) {
            if !is_safe_color(color) {
                return Err(AppError::Validation(format!("invalid colour '{color}'")));
            }
        }
        Ok(())
    }
}

fn is_safe_color(color: &str) -> bool {
    !color.is_empty()
        && color.len() <= 64
        && color
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "#(),.% -".contains(c))
}

pub fn render_svg(result: &LayoutResult, style: &SvgStyle) -> String {
    let mut out = String::with_capacity(256 + result.placements.len() * 160);
    out.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = style.width,
        h = style.height,
    ));
    out.push_str(&format!(
        r#"<rect width="100%" height="100%" fill="{}"/>"#,
        style.background_color
    ));
    out.push_str(&format!(
        r#"<g font-family="{}" font-weight="{}" text-anchor="middle" dominant-baseline="central">"#,
        style.font_family.css_name(),
        style.font_weight.css_value(),
    ));

    for p in &result.placements {
        let fill = &style.color_scheme[p.color_index as usize % style.color_scheme.len()];
        out.push_str(&format!(
            r#"<text font-size="{}" fill="{}" transform="translate({},{}) rotate({})">{}</text>"#,
            num(p.size),
            fill,
            num(p.x),
            num(p.y),
            num(p.rotation_deg),
            escape_xml(&p.text),
        ));
    }

    out.push_str("</g></svg>");
    out
}

/// Two decimals, without trailing zeros.
fn num(v: f64) -> String {
    let rounded = (v * 100.0).round() / 100.0;
    if rounded == 0.0 {
        "0".to_string()
    } else {
        rounded.to_string()
    }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}
