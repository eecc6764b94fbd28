// Recorded display lists
// A Picture is composited once and replayed (scaled and cropped) on every
// render call, so diagram layout never has to repaint the script.

use crate::draw_context::{DrawContext, FontSpec, TextMetrics};
use crate::geometry::{Point, Rect};

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Rect {
        rect: Rect,
        color: u32,
    },
    Outline {
        rect: Rect,
        color: u32,
        width: f64,
    },
    Text {
        text: String,
        origin: Point,
        font: FontSpec,
        color: u32,
    },
    Polyline {
        points: Vec<Point>,
        color: u32,
        width: f64,
    },
    Polygon {
        points: Vec<Point>,
        color: u32,
    },
    Image {
        location: String,
        rect: Rect,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Picture {
    commands: Vec<DrawCommand>,
    extent: Point,
}

impl Picture {
    pub fn new(commands: Vec<DrawCommand>, extent: Point) -> Self {
        Picture { commands, extent }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn extent(&self) -> Point {
        self.extent
    }

    /// Replay the picture at `origin`, scaled by `scale` and cropped to `crop`
    /// (in already-scaled pixels)
    pub fn replay(&self, ctx: &mut dyn DrawContext, origin: Point, scale: f64, crop: Point) {
        let map = |p: Point| origin + p * scale;
        let map_rect = |r: &Rect| r.scaled(scale).translated(origin);

        ctx.push_clip(Rect::from_origin_extent(origin, crop));
        for command in &self.commands {
            match command {
                DrawCommand::Rect { rect, color } => {
                    ctx.set_color(*color);
                    ctx.draw_rect_filled(map_rect(rect));
                }
                DrawCommand::Outline { rect, color, width } => {
                    ctx.set_color(*color);
                    ctx.draw_rect_outline(map_rect(rect), width * scale);
                }
                DrawCommand::Text {
                    text,
                    origin: at,
                    font,
                    color,
                } => {
                    ctx.set_color(*color);
                    ctx.set_font(&font.scaled(scale));
                    let p = map(*at);
                    ctx.draw_text(text, p.x, p.y);
                }
                DrawCommand::Polyline {
                    points,
                    color,
                    width,
                } => {
                    let mapped: Vec<Point> = points.iter().map(|p| map(*p)).collect();
                    ctx.set_color(*color);
                    ctx.draw_polyline(&mapped, width * scale);
                }
                DrawCommand::Polygon { points, color } => {
                    let mapped: Vec<Point> = points.iter().map(|p| map(*p)).collect();
                    ctx.set_color(*color);
                    ctx.fill_polygon(&mapped);
                }
                DrawCommand::Image { location, rect } => {
                    ctx.draw_image(location, map_rect(rect));
                }
            }
        }
        ctx.pop_clip();
    }
}

/// DrawContext that records commands instead of drawing them
pub struct Recorder<'a> {
    metrics: &'a dyn TextMetrics,
    commands: Vec<DrawCommand>,
    color: u32,
    font: FontSpec,
}

impl<'a> Recorder<'a> {
    pub fn new(metrics: &'a dyn TextMetrics) -> Self {
        Recorder {
            metrics,
            commands: Vec::new(),
            color: 0x000000FF,
            font: FontSpec::default(),
        }
    }

    pub fn finish(self, extent: Point) -> Picture {
        Picture::new(self.commands, extent)
    }

    fn color(&self) -> u32 {
        self.color
    }
}

impl TextMetrics for Recorder<'_> {
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

impl DrawContext for Recorder<'_> {
    fn set_color(&mut self, color: u32) {
        self.color = color;
    }

    fn set_font(&mut self, font: &FontSpec) {
        self.font = font.clone();
    }

    fn draw_text(&mut self, text: &str, x: f64, y: f64) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            origin: Point::new(x, y),
            font: self.font.clone(),
            color: self.color(),
        });
    }

    fn draw_rect_filled(&mut self, rect: Rect) {
        self.commands.push(DrawCommand::Rect {
            rect,
            color: self.color(),
        });
    }

    fn draw_rect_outline(&mut self, rect: Rect, line_width: f64) {
        self.commands.push(DrawCommand::Outline {
            rect,
            color: self.color(),
            width: line_width,
        });
    }

    fn draw_polyline(&mut self, points: &[Point], line_width: f64) {
        self.commands.push(DrawCommand::Polyline {
            points: points.to_vec(),
            color: self.color(),
            width: line_width,
        });
    }

    fn fill_polygon(&mut self, points: &[Point]) {
        self.commands.push(DrawCommand::Polygon {
            points: points.to_vec(),
            color: self.color(),
        });
    }

    fn draw_image(&mut self, location: &str, rect: Rect) {
        self.commands.push(DrawCommand::Image {
            location: location.to_string(),
            rect,
        });
    }

    // Pictures are cropped as a whole on replay
    fn push_clip(&mut self, _rect: Rect) {}

    fn pop_clip(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::ApproxMetrics;
    use crate::svg::SvgDrawContext;

    #[test]
    fn test_recorder_captures_state() {
        let metrics = ApproxMetrics::default();
        let mut rec = Recorder::new(&metrics);
        rec.set_color(0xFF000080);
        rec.draw_rect_filled(Rect::new(0.0, 0.0, 1.0, 1.0));
        rec.set_font(&FontSpec::new(None, 12));
        rec.draw_text("x", 1.0, 2.0);
        let picture = rec.finish(Point::new(1.0, 1.0));
        assert_eq!(picture.commands().len(), 2);
        assert_eq!(
            picture.commands()[0],
            DrawCommand::Rect {
                rect: Rect::new(0.0, 0.0, 1.0, 1.0),
                color: 0xFF000080,
            }
        );
    }

    #[test]
    fn test_replay_scales_and_offsets() {
        let metrics = ApproxMetrics::default();
        let mut rec = Recorder::new(&metrics);
        rec.set_color(0x000000FF);
        rec.draw_rect_filled(Rect::new(1.0, 2.0, 3.0, 4.0));
        let picture = rec.finish(Point::new(10.0, 10.0));

        let mut svg = SvgDrawContext::new(100.0, 100.0);
        picture.replay(&mut svg, Point::new(10.0, 20.0), 2.0, Point::new(20.0, 20.0));
        let out = svg.finish();
        assert!(out.contains(r#"<rect x="12.0" y="24.0" width="6.0" height="8.0""#));
        assert!(out.contains(r#"clip-path="url(#clip-0)""#));
    }
}
