// Box and container layout
// Widths are assigned top-down, then text is reflowed, then heights are
// fixed bottom-up. Top-level boxes additionally keep their content clear of
// the thumbnail and header.

use crate::color::BoxColor;
use crate::draw_context::DrawContext;
use crate::geometry::{Point, Rect};
use crate::node::{LayoutCx, LayoutNode, NodeKind};
use crate::theme::Theme;

pub struct HelpBox {
    pub color: BoxColor,
    pub is_thumbnail: bool,
    pub children: Vec<LayoutNode>,
    pub bounds: Rect,
}

/// What a container offers a child during the width pass
pub enum ParentSlot<'a> {
    Row {
        width: f64,
        used_width: &'a mut f64,
        denominator: &'a mut f64,
    },
    Box {
        width: f64,
    },
    Column {
        width: f64,
    },
}

/// Constraints for a top-level box placed on the help screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenClamp {
    /// Width of the screen
    pub width: f64,
    /// Lowest allowed top edge for content (below thumbnail and header)
    pub min_top: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoxFrame {
    pub clamp: Option<ScreenClamp>,
    /// Height of the enclosing row, if the box sits directly in one
    pub row_height: Option<f64>,
}

/// Top-down width pass for one node and its subtree
pub fn fix_width(node: &mut LayoutNode, parent: ParentSlot<'_>, cx: LayoutCx<'_>) {
    if node.is_thumbnail() {
        return;
    }

    if node.takes_width() {
        match parent {
            ParentSlot::Row {
                width,
                used_width,
                denominator,
            } if node.relative_width.is_some() => {
                let weight = node.relative_width.unwrap_or(0.0);
                if weight != 0.0 {
                    let max_width = weight / *denominator * (width - *used_width);
                    if node.is_text() && node.width() <= max_width {
                        // short text keeps its natural width
                        *used_width += node.width();
                        *denominator -= weight;
                        node.relative_width = Some(0.0);
                    } else {
                        node.set_width(max_width, cx);
                    }
                }
            }
            ParentSlot::Box { width } => node.set_width(width - 2.0 * cx.theme.padding, cx),
            ParentSlot::Row { width, .. } | ParentSlot::Column { width } => {
                node.set_width(width, cx)
            }
        }
    }

    match &mut node.kind {
        NodeKind::Alignment(a) if a.is_row() => {
            let width = a.bounds.w;
            let mut used_width = a.used_width();
            let mut denominator = a.relative_width_denominator();
            for child in &mut a.children {
                let slot = ParentSlot::Row {
                    width,
                    used_width: &mut used_width,
                    denominator: &mut denominator,
                };
                fix_width(child, slot, cx);
            }
        }
        NodeKind::Alignment(a) => {
            let width = a.bounds.w;
            for child in &mut a.children {
                fix_width(child, ParentSlot::Column { width }, cx);
            }
        }
        NodeKind::Box(b) => {
            let width = b.bounds.w;
            for child in &mut b.children {
                fix_width(child, ParentSlot::Box { width }, cx);
            }
        }
        _ => {}
    }
}

/// Re-wrap every text node below `node` at its assigned width, after
/// laying out the widgets it contains
pub fn reflow_text(node: &mut LayoutNode, cx: LayoutCx<'_>) {
    for child in node.children_mut() {
        reflow_text(child, cx);
    }
    if node.is_text() {
        for widget in node.children_mut() {
            widget.fix_layout(cx);
        }
        let width = node.width();
        node.set_width(width, cx);
    }
}

/// Bottom-up height pass
pub fn fix_height(node: &mut LayoutNode, row_height: Option<f64>, cx: LayoutCx<'_>) {
    match &mut node.kind {
        NodeKind::Alignment(a) if a.is_row() => {
            // boxes stretch to the row, so everything else goes first
            for child in a.children.iter_mut().filter(|c| !c.is_box()) {
                fix_height(child, None, cx);
            }
            a.fix_layout();
            let height = a.bounds.h;
            for child in a.children.iter_mut().filter(|c| c.is_box()) {
                fix_height(child, Some(height), cx);
            }
            a.fix_layout();
        }
        NodeKind::Alignment(a) => {
            for child in &mut a.children {
                fix_height(child, None, cx);
            }
            a.fix_layout();
        }
        NodeKind::Box(b) => b.fix_layout(
            cx,
            BoxFrame {
                clamp: None,
                row_height,
            },
        ),
        NodeKind::Diagram(d) => d.fix_layout(cx),
        _ => {}
    }
}

impl HelpBox {
    pub fn new(color: BoxColor, is_thumbnail: bool) -> Self {
        HelpBox {
            color,
            is_thumbnail,
            children: Vec::new(),
            bounds: Rect::default(),
        }
    }

    pub fn fix_children_extents(&mut self, cx: LayoutCx<'_>) {
        if !self.is_thumbnail {
            let width = self.bounds.w;
            for child in &mut self.children {
                fix_width(child, ParentSlot::Box { width }, cx);
            }
        }
        for child in &mut self.children {
            reflow_text(child, cx);
        }
        for child in &mut self.children {
            fix_height(child, None, cx);
        }
    }

    pub fn fix_layout(&mut self, cx: LayoutCx<'_>, frame: BoxFrame) {
        let padding = cx.theme.padding;
        if let Some(clamp) = frame.clamp {
            self.bounds.w = clamp.width;
        }
        self.fix_children_extents(cx);

        let origin = self.bounds.origin();
        let right = self.bounds.right();
        let mut width: f64 = 0.0;
        let mut height: f64 = 0.0;
        for child in &mut self.children {
            child.set_position(origin + child.shift + Point::new(padding, padding));
            if let Some(clamp) = frame.clamp {
                if child.right() > right {
                    let clamped = right - padding - child.left();
                    child.set_width(clamped, cx);
                }
                if child.top() < clamp.min_top {
                    child.set_top(clamp.min_top);
                }
            }
            width = width.max(child.right() - origin.x);
            height = height.max(child.bottom() - origin.y);
        }

        if self.is_thumbnail {
            self.bounds.w = width + padding;
        }
        self.bounds.h = match frame.row_height {
            Some(row_height) => (height + padding).max(row_height),
            None => height + padding,
        };
    }

    pub fn render(&self, ctx: &mut dyn DrawContext, theme: &Theme) {
        ctx.set_color(self.color.fill());
        ctx.draw_rect_filled(self.bounds);
        ctx.set_color(self.color.border());
        ctx.draw_rect_outline(self.bounds, theme.box_border_width);
        for child in &self.children {
            child.render(ctx, theme);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::{Alignment, Orientation};
    use crate::color::WHITE;
    use crate::draw_context::FontSpec;
    use crate::metrics::ApproxMetrics;
    use crate::paragraph::Paragraph;

    fn weighted_box(weight: f64) -> LayoutNode {
        let mut node = LayoutNode::new(NodeKind::Box(HelpBox::new(BoxColor::Gray, false)));
        node.relative_width = Some(weight);
        node
    }

    fn text(words: &str, metrics: &ApproxMetrics) -> LayoutNode {
        let p = Paragraph::new(words, FontSpec::new(None, 10), WHITE, metrics);
        let mut node = LayoutNode::new(NodeKind::Paragraph(p));
        node.relative_width = Some(1.0);
        node
    }

    #[test]
    fn test_row_shares_remaining_width() {
        let metrics = ApproxMetrics::default();
        let theme = Theme::default();
        let cx = LayoutCx::new(&metrics, &theme);

        let mut row = Alignment::new(Orientation::Row, 10.0);
        row.children = vec![weighted_box(1.0), weighted_box(1.0), weighted_box(2.0)];
        let mut node = LayoutNode::new(NodeKind::Alignment(row));
        node.relative_width = Some(1.0);

        fix_width(&mut node, ParentSlot::Column { width: 400.0 }, cx);
        let widths: Vec<f64> = node.children().map(|c| c.width()).collect();
        assert_eq!(widths, vec![95.0, 95.0, 190.0]);
    }

    #[test]
    fn test_short_text_keeps_natural_width() {
        let metrics = ApproxMetrics::default();
        let theme = Theme::default();
        let cx = LayoutCx::new(&metrics, &theme);

        let mut row = Alignment::new(Orientation::Row, 0.0);
        row.children = vec![text("hi", &metrics), weighted_box(1.0)];
        let mut node = LayoutNode::new(NodeKind::Alignment(row));

        fix_width(&mut node, ParentSlot::Column { width: 200.0 }, cx);
        let children: Vec<&LayoutNode> = node.children().collect();
        assert_eq!(children[0].width(), 12.0);
        assert_eq!(children[0].relative_width, Some(0.0));
        // the box takes everything the text left over
        assert_eq!(children[1].width(), 188.0);
    }

    #[test]
    fn test_box_children_lose_padding() {
        let metrics = ApproxMetrics::default();
        let theme = Theme::default();
        let cx = LayoutCx::new(&metrics, &theme);

        let mut outer = HelpBox::new(BoxColor::Blue, false);
        outer.bounds = Rect::new(0.0, 0.0, 300.0, 0.0);
        outer.children.push(text("a b c", &metrics));
        outer.fix_layout(cx, BoxFrame::default());

        let child = &outer.children[0];
        assert_eq!(child.width(), 270.0);
        assert_eq!(child.position(), Point::new(15.0, 15.0));
        assert_eq!(outer.bounds.h, 15.0 + 12.0 + 15.0);
    }

    #[test]
    fn test_clamp_keeps_content_below_reserved_area() {
        let metrics = ApproxMetrics::default();
        let theme = Theme::default();
        let cx = LayoutCx::new(&metrics, &theme);

        let mut top = HelpBox::new(BoxColor::Gray, false);
        top.bounds = Rect::new(0.0, 10.0, 0.0, 0.0);
        top.children.push(text("clamped", &metrics));
        let frame = BoxFrame {
            clamp: Some(ScreenClamp {
                width: 557.0,
                min_top: 80.0,
            }),
            row_height: None,
        };
        top.fix_layout(cx, frame);
        assert_eq!(top.bounds.w, 557.0);
        assert_eq!(top.children[0].top(), 80.0);
        assert_eq!(top.bounds.h, 70.0 + 12.0 + 15.0);

        // a second pass lands in the same place
        top.fix_layout(cx, frame);
        assert_eq!(top.children[0].top(), 80.0);
    }

    #[test]
    fn test_thumbnail_sizes_to_content() {
        let metrics = ApproxMetrics::default();
        let theme = Theme::default();
        let cx = LayoutCx::new(&metrics, &theme);

        let mut thumb = HelpBox::new(BoxColor::Blue, true);
        thumb.bounds = Rect::new(0.0, 0.0, 999.0, 0.0);
        thumb.children.push(text("icon", &metrics));
        thumb.fix_layout(cx, BoxFrame::default());
        assert_eq!(thumb.children[0].width(), 24.0);
        assert_eq!(thumb.bounds.w, 15.0 + 24.0 + 15.0);
    }

    #[test]
    fn test_box_in_row_matches_row_height() {
        let metrics = ApproxMetrics::default();
        let theme = Theme::default();
        let cx = LayoutCx::new(&metrics, &theme);

        let mut row = Alignment::new(Orientation::Row, 15.0);
        row.children = vec![text("one\ntwo\nthree", &metrics), weighted_box(1.0)];
        let mut node = LayoutNode::new(NodeKind::Alignment(row));

        fix_width(&mut node, ParentSlot::Column { width: 400.0 }, cx);
        fix_height(&mut node, None, cx);
        let children: Vec<&LayoutNode> = node.children().collect();
        assert_eq!(children[1].width(), 400.0 - 15.0 - 30.0);
        assert_eq!(children[1].left(), 45.0);
        assert_eq!(children[1].height(), 36.0);
        assert_eq!(node.height(), 36.0);
    }
}
