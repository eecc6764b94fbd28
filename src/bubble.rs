// Speech bubbles showing example values next to a script
use crate::color::{self, rgb};
use crate::draw_context::DrawContext;
use crate::geometry::{Point, Rect};
use crate::node::{LayoutCx, LayoutNode};
use crate::theme::Theme;
use std::path::Path;

const SLOT_INSET: f64 = 3.0;

/// What a bubble shows
pub enum BubbleValue {
    Node(Box<LayoutNode>),
    Bool(bool),
    Text(String),
}

pub struct Bubble {
    pub content: BubbleValue,
    /// Body plus tail
    pub bounds: Rect,
    tail: f64,
}

impl Bubble {
    pub fn new(mut content: BubbleValue, cx: LayoutCx<'_>) -> Self {
        if let BubbleValue::Node(node) = &mut content {
            node.fix_layout(cx);
        }
        let padding = cx.theme.bubble_padding;
        let inner = content_extent(&content, cx);
        let tail = 2.0 * padding;
        let mut bubble = Bubble {
            content,
            bounds: Rect::new(0.0, 0.0, inner.x + 2.0 * padding, inner.y + 2.0 * padding + tail),
            tail,
        };
        bubble.set_position(Point::ZERO, cx.theme);
        bubble
    }

    pub fn body(&self) -> Rect {
        Rect::new(self.bounds.x, self.bounds.y, self.bounds.w, self.bounds.h - self.tail)
    }

    pub fn set_position(&mut self, position: Point, theme: &Theme) {
        self.bounds.x = position.x;
        self.bounds.y = position.y;
        if let BubbleValue::Node(node) = &mut self.content {
            let padding = theme.bubble_padding;
            node.set_position(position + Point::new(padding, padding));
        }
    }

    pub fn image_loaded(&mut self, slot: usize, location: &Path, cx: LayoutCx<'_>) -> bool {
        match &mut self.content {
            BubbleValue::Node(node) => node.image_loaded(slot, location, cx),
            _ => false,
        }
    }

    pub fn render(&self, ctx: &mut dyn DrawContext, theme: &Theme) {
        let body = self.body();
        let tail = [
            Point::new(body.left() + 2.0 * theme.bubble_padding + self.tail, body.bottom()),
            Point::new(body.left() + theme.bubble_padding, self.bounds.bottom()),
            Point::new(body.left() + 2.0 * theme.bubble_padding, body.bottom()),
        ];
        ctx.set_color(theme.bubble_color);
        ctx.draw_rect_filled(body);
        ctx.fill_polygon(&tail);
        ctx.set_color(theme.bubble_border_color);
        ctx.draw_rect_outline(body, theme.bubble_border_width);
        ctx.draw_polyline(&tail, theme.bubble_border_width);

        let inner = body.origin() + Point::new(theme.bubble_padding, theme.bubble_padding);
        match &self.content {
            BubbleValue::Node(node) => node.render(ctx, theme),
            BubbleValue::Bool(value) => {
                let font = theme.block_font();
                let label = if *value { "true" } else { "false" };
                let slot = Rect::new(
                    inner.x,
                    inner.y,
                    ctx.text_width(label, &font) + 2.0 * SLOT_INSET,
                    ctx.font_height(font.size) + SLOT_INSET,
                );
                let fill = if *value { rgb(0, 200, 0) } else { rgb(200, 0, 0) };
                ctx.set_color(fill);
                ctx.draw_rect_filled(slot);
                let descent = ctx.font_descent(&font);
                ctx.set_font(&font);
                ctx.set_color(color::WHITE);
                ctx.draw_text(label, slot.x + SLOT_INSET, slot.bottom() - descent);
            }
            BubbleValue::Text(text) => {
                let font = theme.block_font();
                let baseline = inner.y + ctx.font_height(font.size) - ctx.font_descent(&font);
                ctx.set_font(&font);
                ctx.set_color(color::BLACK);
                ctx.draw_text(text, inner.x, baseline);
            }
        }
    }
}

fn content_extent(content: &BubbleValue, cx: LayoutCx<'_>) -> Point {
    let font = cx.theme.block_font();
    let line_height = cx.metrics.font_height(font.size);
    match content {
        BubbleValue::Node(node) => node.extent(),
        BubbleValue::Bool(value) => {
            let label = if *value { "true" } else { "false" };
            Point::new(
                cx.metrics.text_width(label, &font) + 2.0 * SLOT_INSET,
                line_height + SLOT_INSET,
            )
        }
        BubbleValue::Text(text) => Point::new(cx.metrics.text_width(text, &font), line_height),
    }
}
