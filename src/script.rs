// Script element trees
// A Script is the already-laid-out rendering of a block script (or a menu)
// handed over by the block renderer. Diagrams only need its geometry, the
// anchor tags on its elements, and a way to paint it.

use crate::color::{self, with_alpha};
use crate::document::DocElement;
use crate::draw_context::{DrawContext, FontSpec};
use crate::geometry::{Point, Rect};
use crate::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Hat,
    Command,
    Reporter,
    Predicate,
    Argument,
    Label,
    Menu,
    MenuItem,
    MenuLine,
    Other,
}

impl ElementKind {
    pub fn is_block(self) -> bool {
        matches!(
            self,
            ElementKind::Hat | ElementKind::Command | ElementKind::Reporter | ElementKind::Predicate
        )
    }

    /// Elements whose arrows attach at their right edge, level with the label
    pub fn is_command_shaped(self) -> bool {
        matches!(
            self,
            ElementKind::Hat | ElementKind::Command | ElementKind::MenuItem
        )
    }
}

/// Which anchor list an id is looked up in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorAttr {
    Annotation,
    Menu,
    Bubble,
    ArrowStart,
    ArrowEnd,
}

/// Annotation linkage attached to a script element
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnchorTags {
    pub annotation: Vec<u32>,
    pub menu: Vec<u32>,
    pub bubble: Vec<u32>,
    pub arrow_start: Vec<u32>,
    pub arrow_end: Vec<u32>,
    pub arrow_reverse: bool,
    pub arrow_detour: f64,
    pub arrow_color: Option<u32>,
    pub highlight: bool,
    pub ghost: bool,
}

impl AnchorTags {
    pub fn from_element(element: &DocElement) -> Self {
        let ids = |key: &str| element.attr(key).map(parse_id_list).unwrap_or_default();
        AnchorTags {
            annotation: ids("annotation"),
            menu: ids("menu"),
            bubble: ids("bubble"),
            arrow_start: ids("arrow-start"),
            arrow_end: ids("arrow-end"),
            arrow_reverse: element.attr("arrow-reverse").is_some_and(|v| v != "false"),
            arrow_detour: element.number_attr("arrow-detour").unwrap_or(0.0),
            arrow_color: element.attr("arrow-color").and_then(color::parse_color),
            highlight: element.flag_attr("highlight"),
            ghost: element.flag_attr("ghost"),
        }
    }

    pub fn ids(&self, attr: AnchorAttr) -> &[u32] {
        match attr {
            AnchorAttr::Annotation => &self.annotation,
            AnchorAttr::Menu => &self.menu,
            AnchorAttr::Bubble => &self.bubble,
            AnchorAttr::ArrowStart => &self.arrow_start,
            AnchorAttr::ArrowEnd => &self.arrow_end,
        }
    }
}

/// Parse a comma separated id list such as `"1,3"`; junk entries are dropped
pub fn parse_id_list(value: &str) -> Vec<u32> {
    value
        .split(',')
        .filter_map(|part| part.trim().parse::<u32>().ok())
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScriptElement {
    pub kind: ElementKind,
    /// Bounds in script-container coordinates
    pub bounds: Rect,
    pub label: Option<String>,
    pub color: u32,
    pub tags: AnchorTags,
    pub children: Vec<ScriptElement>,
}

impl ScriptElement {
    pub fn new(kind: ElementKind, bounds: Rect) -> Self {
        ScriptElement {
            kind,
            bounds,
            label: None,
            color: color::BLACK,
            tags: AnchorTags::default(),
            children: Vec::new(),
        }
    }

    pub fn full_bounds(&self) -> Rect {
        self.children
            .iter()
            .fold(self.bounds, |acc, child| acc.union(&child.full_bounds()))
    }

    pub fn translate(&mut self, delta: Point) {
        self.bounds = self.bounds.translated(delta);
        for child in &mut self.children {
            child.translate(delta);
        }
    }

    /// Vertical center of the first part (the label row of a C-shaped
    /// block), or of the element itself
    pub fn label_center_y(&self) -> f64 {
        if self.kind.is_block() {
            if let Some(first) = self.children.first() {
                return first.bounds.center().y;
            }
        }
        self.bounds.center().y
    }

    /// Depth-first search for the first element tagged with `id`
    pub fn find(&self, attr: AnchorAttr, id: u32) -> Option<&ScriptElement> {
        if self.tags.ids(attr).contains(&id) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(attr, id))
    }

    fn paint(&self, ctx: &mut dyn DrawContext, theme: &Theme, options: PaintOptions) {
        let options = if self.tags.ghost {
            PaintOptions {
                alpha: options.alpha * theme.ghost_alpha,
                ..options
            }
        } else {
            options
        };
        let tint = |c: u32| {
            if options.alpha < 1.0 {
                with_alpha(c, options.alpha)
            } else {
                c
            }
        };

        if self.tags.highlight {
            paint_highlight(ctx, self.full_bounds(), theme, options);
        }

        match self.kind {
            ElementKind::Hat
            | ElementKind::Command
            | ElementKind::Reporter
            | ElementKind::Predicate
            | ElementKind::Menu => {
                ctx.set_color(tint(self.color));
                ctx.draw_rect_filled(self.bounds);
                ctx.set_color(tint(darker(self.color)));
                ctx.draw_rect_outline(self.bounds, 1.0);
            }
            ElementKind::Argument => {
                ctx.set_color(tint(color::WHITE));
                ctx.draw_rect_filled(self.bounds);
                ctx.set_color(tint(darker(self.color)));
                ctx.draw_rect_outline(self.bounds, 1.0);
            }
            ElementKind::MenuLine => {
                let y = self.bounds.center().y;
                ctx.set_color(tint(self.color));
                ctx.draw_polyline(
                    &[
                        Point::new(self.bounds.left(), y),
                        Point::new(self.bounds.right(), y),
                    ],
                    1.0,
                );
            }
            ElementKind::MenuItem => {
                ctx.set_color(tint(self.color));
                ctx.draw_rect_filled(self.bounds);
            }
            ElementKind::Label | ElementKind::Other => {}
        }

        if let Some(label) = &self.label {
            let font = label_font(self.kind, theme);
            let descent = ctx.font_descent(&font);
            let text_color = match self.kind {
                ElementKind::Argument => color::BLACK,
                ElementKind::MenuItem => theme.menu_text_color,
                _ => color::WHITE,
            };
            ctx.set_font(&font);
            ctx.set_color(tint(text_color));
            let x = self.bounds.left() + text_inset(self.kind, theme);
            ctx.draw_text(label, x, self.bounds.bottom() - descent);
        }

        for child in &self.children {
            child.paint(ctx, theme, options);
        }
    }
}

fn label_font(kind: ElementKind, theme: &Theme) -> FontSpec {
    match kind {
        ElementKind::MenuItem => theme.menu_font(),
        _ => theme.block_font(),
    }
}

fn text_inset(kind: ElementKind, theme: &Theme) -> f64 {
    match kind {
        ElementKind::MenuItem => theme.menu_item_padding,
        ElementKind::Argument => 3.0,
        _ => 0.0,
    }
}

fn darker(c: u32) -> u32 {
    let (r, g, b, _) = color::components(c);
    let scale = |v: u8| ((v as f64) * 0.7) as u8;
    color::rgb(scale(r), scale(g), scale(b))
}

/// Options for a single script paint pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaintOptions {
    /// Soft, blurred highlight edges; diagrams composite with crisp edges
    pub blurred_shadows: bool,
    pub alpha: f64,
}

impl Default for PaintOptions {
    fn default() -> Self {
        PaintOptions {
            blurred_shadows: true,
            alpha: 1.0,
        }
    }
}

fn paint_highlight(ctx: &mut dyn DrawContext, bounds: Rect, theme: &Theme, options: PaintOptions) {
    let border = theme.highlight_border;
    if options.blurred_shadows {
        // fade outwards in one-pixel rings
        let rings = 5;
        for ring in 0..rings {
            let alpha = options.alpha * (1.0 - ring as f64 / rings as f64);
            ctx.set_color(with_alpha(theme.highlight_color, alpha));
            ctx.draw_rect_outline(bounds.expanded(border + ring as f64), 1.0);
        }
    } else {
        ctx.set_color(with_alpha(theme.highlight_color, options.alpha));
        ctx.draw_rect_outline(bounds.expanded(border / 2.0), border);
    }
}

/// Whether the root of a script is a block stack or a menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptKind {
    Blocks,
    Menu,
}

/// An anchor found by scanning a script
#[derive(Debug, Clone, Copy)]
pub struct Anchor<'a> {
    pub element: &'a ScriptElement,
    /// The element is the top block of its stack
    pub is_top: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    pub kind: ScriptKind,
    pub root: ScriptElement,
    /// Display scale requested by the document
    pub scale: f64,
}

impl Script {
    pub fn new(kind: ScriptKind, root: ScriptElement) -> Self {
        Script {
            kind,
            root,
            scale: 1.0,
        }
    }

    pub fn full_bounds(&self) -> Rect {
        self.root.full_bounds()
    }

    pub fn translate(&mut self, delta: Point) {
        self.root.translate(delta);
    }

    pub fn set_position(&mut self, position: Point) {
        let delta = position - self.full_bounds().origin();
        self.translate(delta);
    }

    pub fn set_top(&mut self, top: f64) {
        let delta = top - self.full_bounds().top();
        self.translate(Point::new(0.0, delta));
    }

    pub fn find_anchor(&self, attr: AnchorAttr, id: u32) -> Option<Anchor<'_>> {
        self.root.find(attr, id).map(|element| Anchor {
            element,
            is_top: self.kind == ScriptKind::Blocks && std::ptr::eq(element, &self.root),
        })
    }

    pub fn paint(&self, ctx: &mut dyn DrawContext, theme: &Theme, options: PaintOptions) {
        self.root.paint(ctx, theme, options);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::ApproxMetrics;
    use crate::picture::{DrawCommand, Recorder};

    fn sample() -> Script {
        let mut top = ScriptElement::new(ElementKind::Command, Rect::new(0.0, 0.0, 80.0, 20.0));
        let mut label = ScriptElement::new(ElementKind::Label, Rect::new(4.0, 4.0, 30.0, 12.0));
        label.label = Some("move".to_string());
        let mut arg = ScriptElement::new(ElementKind::Argument, Rect::new(40.0, 3.0, 20.0, 14.0));
        arg.tags.annotation = vec![2];
        let mut next = ScriptElement::new(ElementKind::Command, Rect::new(0.0, 20.0, 90.0, 20.0));
        next.tags.annotation = vec![1, 3];
        top.children = vec![label, arg, next];
        Script::new(ScriptKind::Blocks, top)
    }

    #[test]
    fn test_parse_id_list() {
        assert_eq!(parse_id_list("1, 2,x,4"), vec![1, 2, 4]);
        assert!(parse_id_list("").is_empty());
    }

    #[test]
    fn test_find_anchor_and_top() {
        let script = sample();
        let first = script.find_anchor(AnchorAttr::Annotation, 1).unwrap();
        assert_eq!(first.element.bounds.top(), 20.0);
        assert!(!first.is_top);
        assert!(script.find_anchor(AnchorAttr::Annotation, 3).is_some());
        assert!(script.find_anchor(AnchorAttr::Annotation, 4).is_none());

        let mut tagged_top = sample();
        tagged_top.root.tags.bubble = vec![1];
        assert!(tagged_top.find_anchor(AnchorAttr::Bubble, 1).unwrap().is_top);
    }

    #[test]
    fn test_label_center_uses_first_part() {
        let script = sample();
        assert_eq!(script.root.label_center_y(), 10.0);
        assert_eq!(script.full_bounds(), Rect::new(0.0, 0.0, 90.0, 40.0));
    }

    #[test]
    fn test_set_top_moves_whole_tree() {
        let mut script = sample();
        script.set_top(15.0);
        assert_eq!(script.full_bounds().top(), 15.0);
        assert_eq!(script.root.children[2].bounds.top(), 35.0);
    }

    #[test]
    fn test_crisp_highlight_is_single_outline() {
        let metrics = ApproxMetrics::default();
        let theme = Theme::default();
        let mut script = sample();
        script.root.children[1].tags.highlight = true;
        let mut rec = Recorder::new(&metrics);
        script.paint(
            &mut rec,
            &theme,
            PaintOptions {
                blurred_shadows: false,
                alpha: 1.0,
            },
        );
        let highlights = rec
            .finish(Point::ZERO)
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::Outline { color, .. } if *color == theme.highlight_color))
            .count();
        assert_eq!(highlights, 1);
    }
}
