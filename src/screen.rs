// Help screen root
// A thumbnail in the top left corner, a header next to it, and top-level
// boxes stacked below. Box content never overlaps the thumbnail or header.

use crate::draw_context::DrawContext;
use crate::geometry::{Point, Rect};
use crate::help_box::{BoxFrame, ScreenClamp};
use crate::node::{LayoutCx, LayoutNode, NodeKind};
use crate::theme::Theme;
use std::fmt::Write;
use std::path::Path;

pub struct HelpScreen {
    pub bounds: Rect,
    pub thumbnail: Option<LayoutNode>,
    pub header: Option<LayoutNode>,
    /// Top-level boxes, in document order
    pub children: Vec<LayoutNode>,
}

impl HelpScreen {
    pub fn new(theme: &Theme) -> Self {
        HelpScreen {
            bounds: Rect::new(0.0, 0.0, theme.screen_width - theme.padding, 0.0),
            thumbnail: None,
            header: None,
            children: Vec::new(),
        }
    }

    /// All top-level nodes: thumbnail, header, then the boxes
    pub fn nodes(&self) -> impl Iterator<Item = &LayoutNode> {
        self.thumbnail
            .iter()
            .chain(self.header.iter())
            .chain(self.children.iter())
    }

    fn nodes_mut(&mut self) -> impl Iterator<Item = &mut LayoutNode> {
        self.thumbnail
            .iter_mut()
            .chain(self.header.iter_mut())
            .chain(self.children.iter_mut())
    }

    pub fn fix_layout(&mut self, cx: LayoutCx<'_>) {
        let theme = cx.theme;
        let padding = theme.padding;
        let vertical_padding = theme.vertical_padding;
        let origin = self.bounds.origin();
        let mut min_top = f64::NEG_INFINITY;

        let thumbnail = self.thumbnail.as_mut().map(|thumbnail| {
            thumbnail.set_position(origin);
            thumbnail.fix_layout(cx);
            min_top = thumbnail.bottom() + padding;
            thumbnail.bounds()
        });

        if let Some(header) = &mut self.header {
            let left = thumbnail.map_or(origin.x, |t| t.right()) + padding;
            header.set_left(left);
            header.set_width(self.bounds.right() - left - padding, cx);
            let line_height = header.first_line_height(cx.metrics);
            let top = match thumbnail {
                Some(t) => {
                    origin.y + vertical_padding + (t.h - vertical_padding) / 2.0
                        - line_height / 2.0
                }
                None => origin.y + vertical_padding,
            };
            header.set_top(top);
            min_top = min_top.max(header.bottom() + padding);
        }

        let clamp = ScreenClamp {
            width: self.bounds.w,
            min_top,
        };
        let mut next_y = vertical_padding;
        for child in &mut self.children {
            child.set_position(origin + Point::new(0.0, next_y));
            match &mut child.kind {
                NodeKind::Box(b) => b.fix_layout(
                    cx,
                    BoxFrame {
                        clamp: Some(clamp),
                        row_height: None,
                    },
                ),
                _ => child.fix_layout(cx),
            }
            next_y += child.height() + vertical_padding;
        }
        self.bounds.h = next_y - vertical_padding;
    }

    /// Record a finished image load anywhere on the screen
    pub fn image_loaded(&mut self, slot: usize, location: &Path, cx: LayoutCx<'_>) -> bool {
        self.nodes_mut()
            .any(|node| node.image_loaded(slot, location, cx))
    }

    pub fn render(&self, ctx: &mut dyn DrawContext, theme: &Theme) {
        ctx.set_color(theme.background_color);
        ctx.draw_rect_filled(self.bounds);
        for node in self.nodes() {
            node.render(ctx, theme);
        }
    }

    /// Indented dump of the laid-out tree
    pub fn describe(&self) -> String {
        let b = self.bounds;
        let mut out = String::new();
        let _ = writeln!(
            out,
            "screen ({:.0}, {:.0}) {:.0}x{:.0}",
            b.x, b.y, b.w, b.h
        );
        for node in self.nodes() {
            node.describe(1, &mut out);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{self, BoxColor};
    use crate::draw_context::FontSpec;
    use crate::help_box::HelpBox;
    use crate::metrics::ApproxMetrics;
    use crate::paragraph::Paragraph;
    use crate::svg::SvgDrawContext;

    fn text(s: &str, size: u16, metrics: &ApproxMetrics) -> LayoutNode {
        let font = FontSpec::new(None, size);
        LayoutNode::new(NodeKind::Paragraph(Paragraph::new(s, font, color::WHITE, metrics)))
    }

    fn boxed(color: BoxColor, is_thumbnail: bool, child: LayoutNode) -> LayoutNode {
        let mut b = HelpBox::new(color, is_thumbnail);
        b.children.push(child);
        LayoutNode::new(NodeKind::Box(b))
    }

    fn sample(metrics: &ApproxMetrics, theme: &Theme) -> HelpScreen {
        let mut screen = HelpScreen::new(theme);
        screen.thumbnail = Some(boxed(BoxColor::Blue, true, text("icon", 10, metrics)));
        screen.header = Some(text("Title", 20, metrics));
        screen
            .children
            .push(boxed(BoxColor::Gray, false, text("one", 10, metrics)));
        screen
            .children
            .push(boxed(BoxColor::Gray, false, text("two", 10, metrics)));
        screen
    }

    #[test]
    fn test_header_sits_beside_thumbnail() {
        let metrics = ApproxMetrics::default();
        let theme = Theme::default();
        let mut screen = sample(&metrics, &theme);
        screen.fix_layout(LayoutCx::new(&metrics, &theme));

        let header = screen.header.as_ref().unwrap();
        // thumbnail is 54 wide and 42 high
        assert_eq!(header.left(), 69.0);
        assert_eq!(header.width(), 557.0 - 69.0 - 15.0);
        // 10 + (42 - 10) / 2 - 24 / 2
        assert_eq!(header.top(), 14.0);
    }

    #[test]
    fn test_box_content_clears_thumbnail() {
        let metrics = ApproxMetrics::default();
        let theme = Theme::default();
        let mut screen = sample(&metrics, &theme);
        screen.fix_layout(LayoutCx::new(&metrics, &theme));

        let first = &screen.children[0];
        assert_eq!(first.top(), 10.0);
        let content = first.children().next().unwrap();
        assert_eq!(content.top(), 57.0);
        assert_eq!(first.width(), 557.0);
        assert_eq!(screen.bounds.h, 136.0);
    }

    #[test]
    fn test_describe_after_layout() {
        let metrics = ApproxMetrics::default();
        let theme = Theme::default();
        let mut screen = sample(&metrics, &theme);
        screen.fix_layout(LayoutCx::new(&metrics, &theme));
        insta::assert_snapshot!(screen.describe(), @r"
        screen (0, 0) 557x136
          thumbnail (0, 0) 54x42
            paragraph (15, 15) 24x12
          paragraph (69, 14) 473x24
          box (0, 10) 557x74
            paragraph (15, 57) 527x12
          box (0, 94) 557x42
            paragraph (15, 109) 527x12
        ");
    }

    #[test]
    fn test_layout_is_idempotent() {
        let metrics = ApproxMetrics::default();
        let theme = Theme::default();
        let cx = LayoutCx::new(&metrics, &theme);
        let mut screen = sample(&metrics, &theme);
        screen.fix_layout(cx);
        let first = screen.describe();
        screen.fix_layout(cx);
        assert_eq!(screen.describe(), first);
    }

    #[test]
    fn test_without_thumbnail_or_header() {
        let metrics = ApproxMetrics::default();
        let theme = Theme::default();
        let mut screen = HelpScreen::new(&theme);
        screen
            .children
            .push(boxed(BoxColor::Black, false, text("solo", 10, &metrics)));
        screen.fix_layout(LayoutCx::new(&metrics, &theme));
        let content = screen.children[0].children().next().unwrap();
        assert_eq!(content.top(), 25.0);
        assert_eq!(screen.bounds.h, 42.0);
    }

    #[test]
    fn test_render_paints_background_first() {
        let metrics = ApproxMetrics::default();
        let theme = Theme::default();
        let mut screen = sample(&metrics, &theme);
        screen.fix_layout(LayoutCx::new(&metrics, &theme));
        let mut svg = SvgDrawContext::new(screen.bounds.w, screen.bounds.h);
        screen.render(&mut svg, &theme);
        let out = svg.finish();
        let background = out.find("#dcdcdc").unwrap();
        let title = out.find(">Title</text>").unwrap();
        assert!(background < title);
    }
}
