// Layout nodes
// Every element of a help screen is a LayoutNode. The variant set is closed;
// shared capabilities (position, extent, children, layout, render) dispatch on
// the kind. All bounds are absolute screen coordinates.

use crate::alignment::Alignment;
use crate::diagram::ScriptDiagram;
use crate::draw_context::{DrawContext, TextMetrics};
use crate::geometry::{Point, Rect};
use crate::help_box::{BoxFrame, HelpBox};
use crate::image::ImageNode;
use crate::paragraph::Paragraph;
use crate::rich_text::RichText;
use crate::script::{PaintOptions, Script};
use crate::theme::Theme;
use std::fmt::Write;
use std::path::Path;

/// Everything a layout pass needs besides the tree itself
#[derive(Clone, Copy)]
pub struct LayoutCx<'a> {
    pub metrics: &'a dyn TextMetrics,
    pub theme: &'a Theme,
}

impl<'a> LayoutCx<'a> {
    pub fn new(metrics: &'a dyn TextMetrics, theme: &'a Theme) -> Self {
        LayoutCx { metrics, theme }
    }
}

/// Arrow options carried by an annotation callout
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationSpec {
    pub reverse: bool,
    pub detour: f64,
    pub horizontal: bool,
    pub color: Option<u32>,
}

pub enum NodeKind {
    Box(HelpBox),
    Alignment(Alignment),
    Paragraph(Paragraph),
    RichText(RichText),
    Diagram(Box<ScriptDiagram>),
    Image(ImageNode),
    Menu(Script),
}

pub struct LayoutNode {
    /// `None`: never takes part in width sharing. `Some(0.0)`: fixed width.
    /// `Some(w)`: proportional share of the remaining row width.
    pub relative_width: Option<f64>,
    /// Pixel offset added after the container positions the node
    pub shift: Point,
    pub annotation: Option<AnnotationSpec>,
    pub kind: NodeKind,
}

impl LayoutNode {
    pub fn new(kind: NodeKind) -> Self {
        LayoutNode {
            relative_width: None,
            shift: Point::ZERO,
            annotation: None,
            kind,
        }
    }

    pub fn bounds(&self) -> Rect {
        match &self.kind {
            NodeKind::Box(b) => b.bounds,
            NodeKind::Alignment(a) => a.bounds,
            NodeKind::Paragraph(p) => p.bounds,
            NodeKind::RichText(r) => r.bounds,
            NodeKind::Diagram(d) => d.bounds,
            NodeKind::Image(i) => i.bounds,
            NodeKind::Menu(m) => m.full_bounds(),
        }
    }

    pub fn position(&self) -> Point {
        self.bounds().origin()
    }

    pub fn extent(&self) -> Point {
        self.bounds().extent()
    }

    pub fn width(&self) -> f64 {
        self.bounds().w
    }

    pub fn height(&self) -> f64 {
        self.bounds().h
    }

    pub fn left(&self) -> f64 {
        self.bounds().left()
    }

    pub fn top(&self) -> f64 {
        self.bounds().top()
    }

    pub fn right(&self) -> f64 {
        self.bounds().right()
    }

    pub fn bottom(&self) -> f64 {
        self.bounds().bottom()
    }

    /// Bounds including everything drawn outside the node's own box
    pub fn full_bounds(&self) -> Rect {
        match &self.kind {
            NodeKind::Diagram(d) => d.full_bounds(),
            _ => self.children().fold(self.bounds(), |acc, child| {
                acc.union(&child.full_bounds())
            }),
        }
    }

    /// Translate the node and everything it owns
    pub fn move_by(&mut self, delta: Point) {
        if delta == Point::ZERO {
            return;
        }
        match &mut self.kind {
            NodeKind::Box(b) => {
                b.bounds = b.bounds.translated(delta);
                b.children.iter_mut().for_each(|c| c.move_by(delta));
            }
            NodeKind::Alignment(a) => {
                a.bounds = a.bounds.translated(delta);
                a.children.iter_mut().for_each(|c| c.move_by(delta));
            }
            NodeKind::Paragraph(p) => p.bounds = p.bounds.translated(delta),
            NodeKind::RichText(r) => r.move_by(delta),
            NodeKind::Diagram(d) => d.move_by(delta),
            NodeKind::Image(i) => i.bounds = i.bounds.translated(delta),
            NodeKind::Menu(m) => m.translate(delta),
        }
    }

    pub fn set_position(&mut self, position: Point) {
        let delta = position - self.position();
        self.move_by(delta);
    }

    pub fn set_left(&mut self, left: f64) {
        self.move_by(Point::new(left - self.left(), 0.0));
    }

    pub fn set_top(&mut self, top: f64) {
        self.move_by(Point::new(0.0, top - self.top()));
    }

    pub fn set_bottom(&mut self, bottom: f64) {
        self.move_by(Point::new(0.0, bottom - self.bottom()));
    }

    /// Change the width; text nodes take it as their wrap width and reflow
    pub fn set_width(&mut self, width: f64, cx: LayoutCx<'_>) {
        match &mut self.kind {
            NodeKind::Box(b) => b.bounds.w = width,
            NodeKind::Alignment(a) => a.bounds.w = width,
            NodeKind::Paragraph(p) => p.set_max_width(width, cx.metrics),
            NodeKind::RichText(r) => r.set_max_width(width, cx.metrics),
            NodeKind::Diagram(d) => d.bounds.w = width,
            NodeKind::Image(i) => i.bounds.w = width,
            NodeKind::Menu(_) => {}
        }
    }

    /// Nodes whose width is assigned by their container
    pub fn takes_width(&self) -> bool {
        !matches!(self.kind, NodeKind::Image(_) | NodeKind::Menu(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, NodeKind::Paragraph(_) | NodeKind::RichText(_))
    }

    pub fn is_box(&self) -> bool {
        matches!(self.kind, NodeKind::Box(_))
    }

    pub fn is_thumbnail(&self) -> bool {
        matches!(&self.kind, NodeKind::Box(b) if b.is_thumbnail)
    }

    pub fn children(&self) -> Box<dyn Iterator<Item = &LayoutNode> + '_> {
        match &self.kind {
            NodeKind::Box(b) => Box::new(b.children.iter()),
            NodeKind::Alignment(a) => Box::new(a.children.iter()),
            NodeKind::RichText(r) => Box::new(r.widgets().iter()),
            NodeKind::Diagram(d) => Box::new(d.annotations()),
            _ => Box::new(std::iter::empty()),
        }
    }

    pub fn children_mut(&mut self) -> Box<dyn Iterator<Item = &mut LayoutNode> + '_> {
        match &mut self.kind {
            NodeKind::Box(b) => Box::new(b.children.iter_mut()),
            NodeKind::Alignment(a) => Box::new(a.children.iter_mut()),
            NodeKind::RichText(r) => Box::new(r.widgets_mut().iter_mut()),
            NodeKind::Diagram(d) => Box::new(d.annotations_mut()),
            _ => Box::new(std::iter::empty()),
        }
    }

    /// Lay out the node on its own, outside any container pass
    pub fn fix_layout(&mut self, cx: LayoutCx<'_>) {
        match &mut self.kind {
            NodeKind::Box(b) => b.fix_layout(cx, BoxFrame::default()),
            NodeKind::Alignment(a) => a.fix_layout(),
            NodeKind::Paragraph(p) => p.fix_layout(cx.metrics),
            NodeKind::RichText(r) => r.fix_layout(cx.metrics),
            NodeKind::Diagram(d) => d.fix_layout(cx),
            NodeKind::Image(_) | NodeKind::Menu(_) => {}
        }
    }

    /// Height of the first text line, used to center arrows and headers on it
    pub fn first_line_height(&self, metrics: &dyn TextMetrics) -> f64 {
        match &self.kind {
            NodeKind::RichText(r) => r.first_line_height(metrics),
            NodeKind::Paragraph(p) => metrics.font_height(p.font.size),
            _ => self.height(),
        }
    }

    /// Record a finished image load. Returns true when the slot was found.
    pub fn image_loaded(&mut self, slot: usize, location: &Path, cx: LayoutCx<'_>) -> bool {
        match &mut self.kind {
            NodeKind::Image(image) if image.slot == slot => {
                image.set_loaded(location);
                true
            }
            NodeKind::Diagram(d) => d.image_loaded(slot, location, cx),
            _ => self
                .children_mut()
                .any(|child| child.image_loaded(slot, location, cx)),
        }
    }

    pub fn render(&self, ctx: &mut dyn DrawContext, theme: &Theme) {
        match &self.kind {
            NodeKind::Box(b) => b.render(ctx, theme),
            NodeKind::Alignment(a) => a.children.iter().for_each(|c| c.render(ctx, theme)),
            NodeKind::Paragraph(p) => p.render(ctx),
            NodeKind::RichText(r) => r.render(ctx, theme),
            NodeKind::Diagram(d) => d.render(ctx, theme),
            NodeKind::Image(i) => i.render(ctx),
            NodeKind::Menu(m) => m.paint(ctx, theme, PaintOptions::default()),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            NodeKind::Box(b) if b.is_thumbnail => "thumbnail",
            NodeKind::Box(_) => "box",
            NodeKind::Alignment(a) if a.is_row() => "row",
            NodeKind::Alignment(_) => "column",
            NodeKind::Paragraph(_) => "paragraph",
            NodeKind::RichText(_) => "rich-text",
            NodeKind::Diagram(_) => "diagram",
            NodeKind::Image(_) => "image",
            NodeKind::Menu(_) => "menu",
        }
    }

    /// Indented one-line-per-node dump of the tree with final bounds
    pub fn describe(&self, depth: usize, out: &mut String) {
        let b = self.bounds();
        let _ = writeln!(
            out,
            "{:indent$}{} ({:.0}, {:.0}) {:.0}x{:.0}",
            "",
            self.kind_name(),
            b.x,
            b.y,
            b.w,
            b.h,
            indent = depth * 2
        );
        for child in self.children() {
            child.describe(depth + 1, out);
        }
    }
}
