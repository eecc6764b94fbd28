// Drawing backend traits - abstract over SVG, FLTK and recorded pictures
use crate::geometry::{Point, Rect};

/// A concrete font selection
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FontSpec {
    /// Font family list, e.g. `"Times New Roman", Times, serif`
    pub family: Option<String>,
    /// Pixel size
    pub size: u16,
    pub bold: bool,
    pub italic: bool,
}

impl FontSpec {
    pub fn new(family: Option<&str>, size: u16) -> Self {
        FontSpec {
            family: family.map(str::to_string),
            size,
            bold: false,
            italic: false,
        }
    }

    pub fn with_style(mut self, bold: bool, italic: bool) -> Self {
        self.bold = bold;
        self.italic = italic;
        self
    }

    /// The same style with another family, used for per-run overrides
    pub fn with_family(&self, family: Option<&str>) -> Self {
        match family {
            Some(name) => FontSpec {
                family: Some(name.to_string()),
                ..self.clone()
            },
            None => self.clone(),
        }
    }

    pub fn scaled(&self, factor: f64) -> Self {
        FontSpec {
            size: ((self.size as f64) * factor).round().max(1.0) as u16,
            ..self.clone()
        }
    }
}

/// Text measurement, the only backend capability layout needs
pub trait TextMetrics {
    fn text_width(&self, text: &str, font: &FontSpec) -> f64;
    /// Line height for a font of the given pixel size
    fn font_height(&self, size: u16) -> f64;
    /// Glyph descent below the baseline (height of the tail in 'q')
    fn font_descent(&self, font: &FontSpec) -> f64;
}

pub trait DrawContext: TextMetrics {
    fn set_color(&mut self, color: u32);
    fn set_font(&mut self, font: &FontSpec);
    /// Draw text with its baseline at `y`
    fn draw_text(&mut self, text: &str, x: f64, y: f64);
    fn draw_rect_filled(&mut self, rect: Rect);
    fn draw_rect_outline(&mut self, rect: Rect, line_width: f64);
    fn draw_polyline(&mut self, points: &[Point], line_width: f64);
    fn fill_polygon(&mut self, points: &[Point]);
    /// Draw a loaded image resource stretched into `rect`
    fn draw_image(&mut self, location: &str, rect: Rect);
    fn push_clip(&mut self, rect: Rect);
    fn pop_clip(&mut self);
}
