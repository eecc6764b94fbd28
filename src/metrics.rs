// Deterministic font metrics
// Approximates a font by a fixed advance per grapheme, which keeps layout
// reproducible for snapshots and headless rendering.

use crate::draw_context::{FontSpec, TextMetrics};
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, Copy)]
pub struct ApproxMetrics {
    /// Advance width per grapheme, as a fraction of the font size
    pub advance: f64,
    /// Line height, as a multiple of the font size
    pub line_height: f64,
    /// Descent, as a fraction of the font size
    pub descent: f64,
}

impl Default for ApproxMetrics {
    fn default() -> Self {
        ApproxMetrics {
            advance: 0.6,
            line_height: 1.2,
            descent: 0.2,
        }
    }
}

impl TextMetrics for ApproxMetrics {
    fn text_width(&self, text: &str, font: &FontSpec) -> f64 {
        let graphemes = text.graphemes(true).count() as f64;
        let bold = if font.bold { 1.1 } else { 1.0 };
        graphemes * font.size as f64 * self.advance * bold
    }

    fn font_height(&self, size: u16) -> f64 {
        size as f64 * self.line_height
    }

    fn font_descent(&self, font: &FontSpec) -> f64 {
        font.size as f64 * self.descent
    }
}
