// Diagram arrows
use crate::draw_context::DrawContext;
use crate::geometry::{Point, Rect};
use crate::theme::Theme;
use std::f64::consts::PI;

/// Arrow from an annotation (or a script element) to an anchor. Rebuilt on
/// every diagram layout.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramArrow {
    pub start: Point,
    pub end: Point,
    /// Both ends lie inside the script
    pub internal: bool,
    /// Draw the head at `start` instead of `end`
    pub reverse: bool,
    /// Length of the elbow segments; 0 draws a straight line
    pub detour: f64,
    pub padding: f64,
    pub color: u32,
    pub bounds: Rect,
}

/// Stroke and head of an arrow in absolute coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct ArrowPath {
    pub stroke: Vec<Point>,
    pub head: [Point; 3],
}

impl DiagramArrow {
    pub fn new(
        start: Point,
        end: Point,
        internal: bool,
        reverse: bool,
        detour: f64,
        color: u32,
        theme: &Theme,
    ) -> Self {
        DiagramArrow {
            start,
            end,
            internal,
            reverse,
            detour,
            padding: theme.arrow_padding + detour,
            color,
            bounds: Rect::default(),
        }
    }

    pub fn fix_layout(&mut self) {
        let extent = (self.end - self.start).abs() + Point::new(2.0 * self.padding, 2.0 * self.padding);
        let origin = self.start.min(self.end) - Point::new(self.padding, self.padding);
        self.bounds = Rect::from_origin_extent(origin, extent);
    }

    pub fn translate(&mut self, delta: Point) {
        self.start = self.start + delta;
        self.end = self.end + delta;
        self.bounds = self.bounds.translated(delta);
    }

    pub fn path(&self, head_size: f64) -> ArrowPath {
        let b = self.bounds;
        let p = self.padding;
        let rightward = self.start.x < self.end.x;
        let downward = self.start.y < self.end.y;
        let mut start = Point::new(
            if rightward { p } else { b.w - p },
            if downward { p } else { b.h - p },
        );
        let mut end = Point::new(
            if rightward { b.w - p } else { p },
            if downward { b.h - p } else { p },
        );
        if self.reverse {
            std::mem::swap(&mut start, &mut end);
        }

        let step = |theta: f64, length: f64| Point::new(length * theta.cos(), length * theta.sin());
        let mut theta = (end - start).theta();
        let mut stroke = vec![start];
        if self.detour > 0.0 {
            let mut at = start;
            if !self.internal {
                at = at + step(theta, self.detour);
                stroke.push(at);
            }
            theta -= PI / 2.0;
            at = at + step(theta, self.detour);
            stroke.push(at);
            theta += PI;
            stroke.push(end - step(theta, self.detour));
        }
        let tip = end;
        let end = end - step(theta, head_size);
        stroke.push(end);

        let mut head = [tip; 3];
        for (i, corner) in head.iter_mut().enumerate() {
            *corner = end + step(theta + i as f64 * 2.0 / 3.0 * PI, head_size);
        }

        let origin = b.origin();
        ArrowPath {
            stroke: stroke.into_iter().map(|q| origin + q).collect(),
            head: head.map(|q| origin + q),
        }
    }

    pub fn render(&self, ctx: &mut dyn DrawContext, theme: &Theme) {
        let path = self.path(theme.arrow_head_size);
        ctx.set_color(self.color);
        ctx.draw_polyline(&path.stroke, theme.arrow_line_width);
        ctx.fill_polygon(&path.head);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::BLACK;
    use crate::svg::SvgDrawContext;

    fn arrow(start: Point, end: Point, internal: bool, reverse: bool, detour: f64) -> DiagramArrow {
        let mut arrow = DiagramArrow::new(start, end, internal, reverse, detour, BLACK, &Theme::default());
        arrow.fix_layout();
        arrow
    }

    fn rounded(points: &[Point]) -> Vec<(f64, f64)> {
        points
            .iter()
            .map(|p| ((p.x * 10.0).round() / 10.0, (p.y * 10.0).round() / 10.0))
            .collect()
    }

    #[test]
    fn test_bounds_are_padded() {
        let a = arrow(Point::new(100.0, 50.0), Point::new(20.0, 10.0), false, false, 4.0);
        assert_eq!(a.padding, 9.0);
        assert_eq!(a.bounds, Rect::new(11.0, 1.0, 98.0, 58.0));
    }

    #[test]
    fn test_straight_arrow_path() {
        let a = arrow(Point::ZERO, Point::new(100.0, 0.0), false, false, 0.0);
        let path = a.path(5.0);
        assert_eq!(rounded(&path.stroke), vec![(0.0, 0.0), (95.0, 0.0)]);
        assert_eq!(
            rounded(&path.head),
            vec![(100.0, 0.0), (92.5, 4.3), (92.5, -4.3)]
        );
    }

    #[test]
    fn test_reverse_moves_head_to_start() {
        let a = arrow(Point::ZERO, Point::new(100.0, 0.0), false, true, 0.0);
        let path = a.path(5.0);
        assert_eq!(rounded(&path.stroke), vec![(100.0, 0.0), (5.0, 0.0)]);
        assert_eq!(rounded(&path.head[..1]), vec![(0.0, 0.0)]);
    }

    #[test]
    fn test_detour_adds_elbow() {
        let outside = arrow(Point::ZERO, Point::new(100.0, 0.0), false, false, 10.0);
        assert_eq!(outside.path(5.0).stroke.len(), 5);
        let internal = arrow(Point::ZERO, Point::new(100.0, 0.0), true, false, 10.0);
        let stroke = rounded(&internal.path(5.0).stroke);
        assert_eq!(stroke.len(), 4);
        // elbow goes up first, approaches the end from above
        assert_eq!(stroke[1], (0.0, -10.0));
        assert_eq!(stroke[2], (100.0, -10.0));
    }

    #[test]
    fn test_render_svg() {
        let a = arrow(Point::ZERO, Point::new(100.0, 0.0), false, false, 0.0);
        let mut svg = SvgDrawContext::new(120.0, 20.0);
        a.render(&mut svg, &Theme::default());
        insta::assert_snapshot!(svg.finish(), @r##"
        <svg xmlns="http://www.w3.org/2000/svg" width="120" height="20" viewBox="0 0 120 20">
          <polyline points="0.0,0.0 95.0,0.0" fill="none" stroke="#000000" stroke-width="3"/>
          <polygon points="100.0,0.0 92.5,4.3 92.5,-4.3" fill="#000000"/>
        </svg>
        "##);
    }
}
