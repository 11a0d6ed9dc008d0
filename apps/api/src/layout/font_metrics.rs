//! Static font-metric tables for the word-cloud font families.
//!
//! Advance widths are in em units (relative to font size), taken from the
//! standard AFM metrics of each face. They are an approximation of what a
//! browser or SVG rasterizer will draw; the padding option absorbs the
//! residual error.
//!
//! All tables cover ASCII 0x20..=0x7E (95 printable characters).
//! Index = (char as usize) - 32.

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Font family / weight enums
// ────────────────────────────────────────────────────────────────────────────

/// Font families the shape provider has metrics for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FontFamily {
    /// Arial / Helvetica metrics. The original service always drew with Arial.
    #[default]
    Arial,
    TimesNewRoman,
    /// Monospaced: every glyph advances 0.6em.
    CourierNew,
}

impl FontFamily {
    /// CSS `font-family` value for renderers.
    pub fn css_name(&self) -> &'static str {
        match self {
            FontFamily::Arial => "Arial, Helvetica, sans-serif",
            FontFamily::TimesNewRoman => "'Times New Roman', Times, serif",
            FontFamily::CourierNew => "'Courier New', Courier, monospace",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

impl FontWeight {
    /// Horizontal widening applied to regular advances for this weight.
    pub fn width_factor(&self) -> f64 {
        match self {
            FontWeight::Normal => 1.0,
            FontWeight::Bold => 1.06,
        }
    }

    pub fn css_value(&self) -> &'static str {
        match self {
            FontWeight::Normal => "normal",
            FontWeight::Bold => "bold",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Vertical glyph bands
// ────────────────────────────────────────────────────────────────────────────

/// Line box ascent in em: the anchor sits in the middle of a 1em line box,
/// so the baseline is `ASCENT - 0.5` em below the anchor.
pub const LINE_ASCENT_EM: f64 = 0.75;

/// Vertical extent of a glyph relative to the baseline, in em.
/// `top` is above the baseline, `bottom` is negative when the glyph descends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphBand {
    pub top: f64,
    pub bottom: f64,
}

const CAP: GlyphBand = GlyphBand { top: 0.72, bottom: 0.0 };
const X_HEIGHT: GlyphBand = GlyphBand { top: 0.52, bottom: 0.0 };
const DESCENDER: GlyphBand = GlyphBand { top: 0.52, bottom: -0.21 };
const TALL_DESCENDER: GlyphBand = GlyphBand { top: 0.72, bottom: -0.21 };
const BRACKET: GlyphBand = GlyphBand { top: 0.75, bottom: -0.21 };
const MID: GlyphBand = GlyphBand { top: 0.55, bottom: 0.18 };
const HIGH: GlyphBand = GlyphBand { top: 0.72, bottom: 0.45 };
const LOW: GlyphBand = GlyphBand { top: 0.12, bottom: -0.15 };

/// Returns the vertical band a character occupies, or `None` for characters
/// that leave no ink (whitespace and control characters).
pub fn glyph_band(c: char) -> Option<GlyphBand> {
    if c.is_whitespace() || c.is_control() {
        return None;
    }
    let band = match c {
        'A'..='Z' | '0'..='9' => CAP,
        'b' | 'd' | 'f' | 'h' | 'i' | 'k' | 'l' | 't' => CAP,
        'g' | 'p' | 'q' | 'y' => DESCENDER,
        'j' => TALL_DESCENDER,
        'a' | 'c' | 'e' | 'm' | 'n' | 'o' | 'r' | 's' | 'u' | 'v' | 'w' | 'x' | 'z' => X_HEIGHT,
        '(' | ')' | '[' | ']' | '{' | '}' | '|' | '/' | '\\' | '$' | '@' => BRACKET,
        '-' | '+' | '=' | '~' | '<' | '>' => MID,
        '\'' | '"' | '`' | '^' | '*' => HIGH,
        '.' | ',' | '_' => LOW,
        '!' | '?' | '#' | '%' | '&' | ':' | ';' => CAP,
        // Anything outside ASCII gets the full line box.
        _ => BRACKET,
    };
    Some(band)
}

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// Static character-width table for a font family.
///
/// `widths[i]` = advance of ASCII character `(i + 32)` at 1em.
///
/// Width array slot layout:
/// ```text
/// [0]=sp  [1]=!   [2]="   [3]=#   [4]=$   [5]=%   [6]=&   [7]='
/// [8]=(   [9]=)   [10]=*  [11]=+  [12]=,  [13]=-  [14]=.  [15]=/
/// [16..25]=0-9
/// [26]=:  [27]=;  [28]=<  [29]==  [30]=>  [31]=?  [32]=@
/// [33..58]=A-Z
/// [59]=[  [60]=\  [61]=]  [62]=^  [63]=_  [64]=`
/// [65..90]=a-z
/// [91]={  [92]=|  [93]=}  [94]=~
/// ```
pub struct FontMetricTable {
    widths: [f32; 95],
    /// Fallback advance for non-ASCII characters.
    pub average_char_width: f32,
}

impl FontMetricTable {
    /// Advance width of a single character in em units.
    pub fn char_width(&self, c: char) -> f64 {
        let code = c as usize;
        if (32..=126).contains(&code) {
            self.widths[code - 32] as f64
        } else {
            self.average_char_width as f64
        }
    }

    /// Measures the rendered width of a string in em units.
    pub fn measure_str(&self, s: &str) -> f64 {
        s.chars().map(|c| self.char_width(c)).sum()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Static width tables  (95 ASCII printable characters each)
// ────────────────────────────────────────────────────────────────────────────

static ARIAL_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.278, 0.355, 0.556, 0.556, 0.889, 0.667, 0.191, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.278, 0.278, 0.584, 0.584, 0.584, 0.556, 1.015,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.667, 0.667, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.500, 0.667, 0.556, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.278, 0.278, 0.278, 0.469, 0.556, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.556, 0.500, 0.556, 0.556, 0.278, 0.556, 0.556, 0.222, 0.222, 0.500, 0.222, 0.833,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.556, 0.556, 0.556, 0.556, 0.333, 0.500, 0.278, 0.556, 0.500, 0.722, 0.500, 0.500, 0.500,
        // {      |      }      ~
        0.334, 0.260, 0.334, 0.584,
    ],
    average_char_width: 0.55,
};

static TIMES_NEW_ROMAN_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.250, 0.333, 0.408, 0.500, 0.500, 0.833, 0.778, 0.180, 0.333, 0.333, 0.500, 0.564, 0.250, 0.333, 0.250, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.500, 0.500, 0.500, 0.500, 0.500, 0.500, 0.500, 0.500, 0.500, 0.500,
        // :      ;      <      =      >      ?      @
        0.278, 0.278, 0.564, 0.564, 0.564, 0.444, 0.921,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.722, 0.667, 0.667, 0.722, 0.611, 0.556, 0.722, 0.722, 0.333, 0.389, 0.722, 0.611, 0.889,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.722, 0.556, 0.722, 0.667, 0.556, 0.611, 0.722, 0.722, 0.944, 0.722, 0.722, 0.611,
        // [      \      ]      ^      _      `
        0.333, 0.278, 0.333, 0.469, 0.500, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.444, 0.500, 0.444, 0.500, 0.444, 0.333, 0.500, 0.500, 0.278, 0.278, 0.500, 0.278, 0.778,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.500, 0.500, 0.500, 0.500, 0.333, 0.389, 0.278, 0.500, 0.500, 0.722, 0.500, 0.500, 0.444,
        // {      |      }      ~
        0.480, 0.200, 0.480, 0.541,
    ],
    average_char_width: 0.50,
};

static COURIER_NEW_TABLE: FontMetricTable = FontMetricTable {
    widths: [0.600; 95],
    average_char_width: 0.60,
};

/// Returns the static metric table for a given font family.
pub fn get_metrics(font: &FontFamily) -> &'static FontMetricTable {
    match font {
        FontFamily::Arial => &ARIAL_TABLE,
        FontFamily::TimesNewRoman => &TIMES_NEW_ROMAN_TABLE,
        FontFamily::CourierNew => &COURIER_NEW_TABLE,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_str_empty_returns_zero() {
        assert_eq!(get_metrics(&FontFamily::Arial).measure_str(""), 0.0);
    }

    #[test]
    fn test_measure_str_ascii_characters() {
        let metrics = get_metrics(&FontFamily::Arial);
        // "alpha" = a(0.556) + l(0.222) + p(0.556) + h(0.556) + a(0.556) = 2.446
        let width = metrics.measure_str("alpha");
        assert!(
            (width - 2.446).abs() < 1e-4,
            "alpha width should be ~2.446, got {width}"
        );
    }

    #[test]
    fn test_measure_str_non_ascii_falls_back() {
        let metrics = get_metrics(&FontFamily::TimesNewRoman);
        let width = metrics.measure_str("é");
        assert!((width - metrics.average_char_width as f64).abs() < 1e-6);
    }

    #[test]
    fn test_courier_is_monospaced() {
        let metrics = get_metrics(&FontFamily::CourierNew);
        assert_eq!(metrics.measure_str("iiii"), metrics.measure_str("WWWW"));
    }

    #[test]
    fn test_all_fonts_accessible() {
        for font in [
            FontFamily::Arial,
            FontFamily::TimesNewRoman,
            FontFamily::CourierNew,
        ] {
            assert!(get_metrics(&font).measure_str("Hello") > 0.0);
        }
    }

    #[test]
    fn test_glyph_band_whitespace_has_no_ink() {
        assert!(glyph_band(' ').is_none());
        assert!(glyph_band('\t').is_none());
        assert!(glyph_band('\u{0007}').is_none());
    }

    #[test]
    fn test_glyph_band_descenders_reach_below_baseline() {
        let g = glyph_band('g').unwrap();
        let a = glyph_band('a').unwrap();
        let h = glyph_band('h').unwrap();
        assert!(g.bottom < 0.0);
        assert_eq!(a.bottom, 0.0);
        assert!(h.top > a.top, "ascender should be taller than x-height");
    }

    #[test]
    fn test_bands_fit_inside_line_box() {
        for c in (32u8..=126).map(char::from).chain(['é', '字']) {
            if let Some(b) = glyph_band(c) {
                assert!(b.top <= LINE_ASCENT_EM, "{c:?} top {}", b.top);
                assert!(b.bottom >= LINE_ASCENT_EM - 1.0, "{c:?} bottom {}", b.bottom);
                assert!(b.top > b.bottom);
            }
        }
    }
}
