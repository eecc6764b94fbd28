// Plain word-wrapped text
use crate::draw_context::{DrawContext, FontSpec, TextMetrics};
use crate::geometry::Rect;

pub struct Paragraph {
    pub text: String,
    pub font: FontSpec,
    pub color: u32,
    /// Wrap width; 0 means one line per explicit line break
    pub max_width: f64,
    pub bounds: Rect,
    lines: Vec<String>,
}

impl Paragraph {
    pub fn new(text: &str, font: FontSpec, color: u32, metrics: &dyn TextMetrics) -> Self {
        let mut paragraph = Paragraph {
            text: text.to_string(),
            font,
            color,
            max_width: 0.0,
            bounds: Rect::default(),
            lines: Vec::new(),
        };
        paragraph.fix_layout(metrics);
        paragraph
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn set_max_width(&mut self, width: f64, metrics: &dyn TextMetrics) {
        self.max_width = width;
        self.fix_layout(metrics);
    }

    pub fn fix_layout(&mut self, metrics: &dyn TextMetrics) {
        self.lines.clear();
        let mut widest: f64 = 0.0;
        for paragraph in self.text.split('\n') {
            let mut line = String::new();
            for word in paragraph.split_whitespace() {
                let candidate = if line.is_empty() {
                    word.to_string()
                } else {
                    format!("{line} {word}")
                };
                if self.max_width > 0.0
                    && !line.is_empty()
                    && metrics.text_width(&candidate, &self.font) > self.max_width
                {
                    widest = widest.max(metrics.text_width(&line, &self.font));
                    self.lines.push(std::mem::replace(&mut line, word.to_string()));
                } else {
                    line = candidate;
                }
            }
            widest = widest.max(metrics.text_width(&line, &self.font));
            self.lines.push(line);
        }

        let width = if self.max_width > 0.0 {
            self.max_width
        } else {
            widest
        };
        let height = self.lines.len() as f64 * metrics.font_height(self.font.size);
        self.bounds.w = width;
        self.bounds.h = height;
    }

    pub fn render(&self, ctx: &mut dyn DrawContext) {
        let line_height = ctx.font_height(self.font.size);
        let descent = ctx.font_descent(&self.font);
        ctx.set_font(&self.font);
        ctx.set_color(self.color);
        for (i, line) in self.lines.iter().enumerate() {
            let baseline = self.bounds.y + (i + 1) as f64 * line_height - descent;
            ctx.draw_text(line, self.bounds.x, baseline);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::ApproxMetrics;
    use crate::svg::SvgDrawContext;

    fn para(text: &str) -> (Paragraph, ApproxMetrics) {
        let metrics = ApproxMetrics::default();
        let p = Paragraph::new(text, FontSpec::new(None, 10), 0xFFFFFFFF, &metrics);
        (p, metrics)
    }

    #[test]
    fn test_unbounded_is_natural_width() {
        let (p, _) = para("hello world");
        assert_eq!(p.lines(), ["hello world"]);
        assert_eq!(p.bounds.w, 66.0);
        assert_eq!(p.bounds.h, 12.0);
    }

    #[test]
    fn test_wraps_greedily() {
        let (mut p, metrics) = para("one two three four");
        p.set_max_width(50.0, &metrics);
        assert_eq!(p.lines(), ["one two", "three", "four"]);
        assert_eq!(p.bounds.w, 50.0);
        assert_eq!(p.bounds.h, 36.0);
    }

    #[test]
    fn test_newline_forces_break() {
        let (p, _) = para("a\nb c");
        assert_eq!(p.lines(), ["a", "b c"]);
    }

    #[test]
    fn test_render_baselines() {
        let (p, _) = para("x\ny");
        let mut svg = SvgDrawContext::new(20.0, 30.0);
        p.render(&mut svg);
        let out = svg.finish();
        assert!(out.contains(r#"y="10.0""#));
        assert!(out.contains(r#"y="22.0""#));
    }
}
