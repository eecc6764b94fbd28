// SVG-based DrawContext implementation
// Generates SVG markup from help screen rendering; used by the CLI and tests

use crate::color::to_css;
use crate::draw_context::{DrawContext, FontSpec, TextMetrics};
use crate::geometry::{Point, Rect};
use crate::metrics::ApproxMetrics;
use std::fmt::Write;

/// SVG-based drawing context that generates SVG markup
pub struct SvgDrawContext {
    svg_content: String,
    current_color: u32,
    current_font: FontSpec,
    metrics: ApproxMetrics,
    clip_stack: Vec<String>,
    next_clip_id: usize,
}

impl SvgDrawContext {
    /// Create a new SVG drawing context
    pub fn new(width: f64, height: f64) -> Self {
        Self::with_metrics(width, height, ApproxMetrics::default())
    }

    pub fn with_metrics(width: f64, height: f64, metrics: ApproxMetrics) -> Self {
        let mut svg_content = String::new();
        // Writing into a String cannot fail
        let _ = writeln!(
            svg_content,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{:.0}" height="{:.0}" viewBox="0 0 {:.0} {:.0}">"#,
            width, height, width, height
        );
        SvgDrawContext {
            svg_content,
            current_color: 0x000000FF,
            current_font: FontSpec::new(None, 14),
            metrics,
            clip_stack: Vec::new(),
            next_clip_id: 0,
        }
    }

    /// Get the generated SVG content
    pub fn finish(mut self) -> String {
        self.svg_content.push_str("</svg>\n");
        self.svg_content
    }

    fn clip_attr(&self) -> String {
        match self.clip_stack.last() {
            Some(id) => format!(r#" clip-path="url(#{})""#, id),
            None => String::new(),
        }
    }

    fn points_attr(points: &[Point]) -> String {
        points
            .iter()
            .map(|p| format!("{:.1},{:.1}", p.x, p.y))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Escape XML text
    fn escape_xml(text: &str) -> String {
        text.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&apos;")
    }
}

impl TextMetrics for SvgDrawContext {
    fn text_width(&self, text: &str, font: &FontSpec) -> f64 {
        self.metrics.text_width(text, font)
    }

    fn font_height(&self, size: u16) -> f64 {
        self.metrics.font_height(size)
    }

    fn font_descent(&self, font: &FontSpec) -> f64 {
        self.metrics.font_descent(font)
    }
}

impl DrawContext for SvgDrawContext {
    fn set_color(&mut self, color: u32) {
        self.current_color = color;
    }

    fn set_font(&mut self, font: &FontSpec) {
        self.current_font = font.clone();
    }

    fn draw_text(&mut self, text: &str, x: f64, y: f64) {
        if text.trim().is_empty() {
            return;
        }
        let family = self
            .current_font
            .family
            .clone()
            .unwrap_or_else(|| "serif".to_string());
        let weight = if self.current_font.bold { "bold" } else { "normal" };
        let style = if self.current_font.italic { "italic" } else { "normal" };
        let line = format!(
            r#"  <text x="{:.1}" y="{:.1}" fill="{}" font-family="{}" font-size="{}" font-weight="{}" font-style="{}"{}>{}</text>"#,
            x,
            y,
            to_css(self.current_color),
            Self::escape_xml(&family),
            self.current_font.size,
            weight,
            style,
            self.clip_attr(),
            Self::escape_xml(text)
        );
        self.svg_content.push_str(&line);
        self.svg_content.push('\n');
    }

    fn draw_rect_filled(&mut self, rect: Rect) {
        let line = format!(
            r#"  <rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}"{}/>"#,
            rect.x,
            rect.y,
            rect.w,
            rect.h,
            to_css(self.current_color),
            self.clip_attr()
        );
        self.svg_content.push_str(&line);
        self.svg_content.push('\n');
    }

    fn draw_rect_outline(&mut self, rect: Rect, line_width: f64) {
        let line = format!(
            r#"  <rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="none" stroke="{}" stroke-width="{}"{}/>"#,
            rect.x,
            rect.y,
            rect.w,
            rect.h,
            to_css(self.current_color),
            line_width,
            self.clip_attr()
        );
        self.svg_content.push_str(&line);
        self.svg_content.push('\n');
    }

    fn draw_polyline(&mut self, points: &[Point], line_width: f64) {
        if points.len() < 2 {
            return;
        }
        let line = format!(
            r#"  <polyline points="{}" fill="none" stroke="{}" stroke-width="{}"{}/>"#,
            Self::points_attr(points),
            to_css(self.current_color),
            line_width,
            self.clip_attr()
        );
        self.svg_content.push_str(&line);
        self.svg_content.push('\n');
    }

    fn fill_polygon(&mut self, points: &[Point]) {
        if points.len() < 3 {
            return;
        }
        let line = format!(
            r#"  <polygon points="{}" fill="{}"{}/>"#,
            Self::points_attr(points),
            to_css(self.current_color),
            self.clip_attr()
        );
        self.svg_content.push_str(&line);
        self.svg_content.push('\n');
    }

    fn draw_image(&mut self, location: &str, rect: Rect) {
        let line = format!(
            r#"  <image href="{}" x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}"{}/>"#,
            Self::escape_xml(location),
            rect.x,
            rect.y,
            rect.w,
            rect.h,
            self.clip_attr()
        );
        self.svg_content.push_str(&line);
        self.svg_content.push('\n');
    }

    fn push_clip(&mut self, rect: Rect) {
        let id = format!("clip-{}", self.next_clip_id);
        self.next_clip_id += 1;
        let defs = format!(
            "  <defs>\n    <clipPath id=\"{}\">\n      <rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\"/>\n    </clipPath>\n  </defs>\n",
            id, rect.x, rect.y, rect.w, rect.h
        );
        self.svg_content.push_str(&defs);
        self.clip_stack.push(id);
    }

    fn pop_clip(&mut self) {
        self.clip_stack.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_svg_context_creation() {
        let ctx = SvgDrawContext::new(400.0, 300.0);
        let svg = ctx.finish();
        assert!(svg.contains(r#"width="400""#));
        assert!(svg.contains(r#"height="300""#));
        assert!(svg.ends_with("</svg>\n"));
    }

    #[test]
    fn test_draw_text() {
        let mut ctx = SvgDrawContext::new(200.0, 100.0);
        ctx.set_color(0x000000FF);
        ctx.set_font(&FontSpec::new(Some("Times"), 14).with_style(true, false));
        ctx.draw_text("Hello World", 10.0, 20.0);
        let svg = ctx.finish();
        assert!(svg.contains("Hello World"));
        assert!(svg.contains(r#"x="10.0""#));
        assert!(svg.contains(r#"font-weight="bold""#));
    }

    #[test]
    fn test_clip_applies_to_following_shapes() {
        let mut ctx = SvgDrawContext::new(200.0, 100.0);
        ctx.push_clip(Rect::new(0.0, 0.0, 50.0, 50.0));
        ctx.draw_rect_filled(Rect::new(10.0, 10.0, 100.0, 100.0));
        ctx.pop_clip();
        ctx.draw_rect_filled(Rect::new(0.0, 0.0, 5.0, 5.0));
        let svg = ctx.finish();
        assert_eq!(svg.matches(r#"clip-path="url(#clip-0)""#).count(), 1);
    }

    #[test]
    fn test_xml_escaping() {
        let mut ctx = SvgDrawContext::new(200.0, 100.0);
        ctx.draw_text("<test> & \"quote\"", 0.0, 10.0);
        let svg = ctx.finish();
        assert!(svg.contains("&lt;test&gt; &amp; &quot;quote&quot;"));
    }
}
