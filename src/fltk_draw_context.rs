// FLTK drawing backend
// Screen coordinates are translated by the widget origin and scroll offset.

use crate::color;
use crate::draw_context::{DrawContext, FontSpec, TextMetrics};
use crate::geometry::{Point, Rect};
use fltk::{draw as fltk_draw, enums::*, image::SharedImage, prelude::*};
use std::collections::HashMap;

/// Loaded images keyed by location; `None` marks a location that failed
pub type ImageCache = HashMap<String, Option<SharedImage>>;

fn fltk_font(font: &FontSpec) -> Font {
    let family = font.family.as_deref().unwrap_or("serif").to_ascii_lowercase();
    let sans = family.contains("helvetica")
        || family.contains("arial")
        || family.starts_with("sans");
    let mono = family.contains("courier") || family.contains("mono");
    match (sans, mono, font.bold, font.italic) {
        (_, true, false, false) => Font::Courier,
        (_, true, true, false) => Font::CourierBold,
        (_, true, false, true) => Font::CourierItalic,
        (_, true, true, true) => Font::CourierBoldItalic,
        (true, _, false, false) => Font::Helvetica,
        (true, _, true, false) => Font::HelveticaBold,
        (true, _, false, true) => Font::HelveticaItalic,
        (true, _, true, true) => Font::HelveticaBoldItalic,
        (false, _, false, false) => Font::Times,
        (false, _, true, false) => Font::TimesBold,
        (false, _, false, true) => Font::TimesItalic,
        (false, _, true, true) => Font::TimesBoldItalic,
    }
}

fn select_font(font: &FontSpec) {
    fltk_draw::set_font(fltk_font(font), font.size as i32);
}

/// Text measurement through FLTK's font engine, used to lay out screens
/// that are shown in the viewer
#[derive(Debug, Clone, Copy, Default)]
pub struct FltkMetrics;

impl TextMetrics for FltkMetrics {
    fn text_width(&self, text: &str, font: &FontSpec) -> f64 {
        select_font(font);
        fltk_draw::width(text)
    }

    fn font_height(&self, size: u16) -> f64 {
        fltk_draw::set_font(Font::Times, size as i32);
        fltk_draw::height() as f64
    }

    fn font_descent(&self, font: &FontSpec) -> f64 {
        select_font(font);
        fltk_draw::descent() as f64
    }
}

/// FLTK implementation of DrawContext
pub struct FltkDrawContext<'a> {
    offset: Point,
    images: &'a mut ImageCache,
}

impl<'a> FltkDrawContext<'a> {
    /// `offset` is added to every coordinate before drawing
    pub fn new(offset: Point, images: &'a mut ImageCache) -> Self {
        FltkDrawContext { offset, images }
    }

    fn at(&self, x: f64, y: f64) -> (f64, f64) {
        (x + self.offset.x, y + self.offset.y)
    }

    fn pixels(&self, rect: Rect) -> (i32, i32, i32, i32) {
        let (x, y) = self.at(rect.x, rect.y);
        (
            x.round() as i32,
            y.round() as i32,
            rect.w.round() as i32,
            rect.h.round() as i32,
        )
    }
}

impl TextMetrics for FltkDrawContext<'_> {
    fn text_width(&self, text: &str, font: &FontSpec) -> f64 {
        FltkMetrics.text_width(text, font)
    }

    fn font_height(&self, size: u16) -> f64 {
        FltkMetrics.font_height(size)
    }

    fn font_descent(&self, font: &FontSpec) -> f64 {
        FltkMetrics.font_descent(font)
    }
}

impl DrawContext for FltkDrawContext<'_> {
    fn set_color(&mut self, color: u32) {
        let (r, g, b, _) = color::components(color);
        fltk_draw::set_draw_color(Color::from_rgb(r, g, b));
    }

    fn set_font(&mut self, font: &FontSpec) {
        select_font(font);
    }

    fn draw_text(&mut self, text: &str, x: f64, y: f64) {
        let (x, y) = self.at(x, y);
        fltk_draw::draw_text2(text, x.round() as i32, y.round() as i32, 0, 0, Align::Left);
    }

    fn draw_rect_filled(&mut self, rect: Rect) {
        let (x, y, w, h) = self.pixels(rect);
        fltk_draw::draw_rectf(x, y, w, h);
    }

    fn draw_rect_outline(&mut self, rect: Rect, line_width: f64) {
        let (x, y, w, h) = self.pixels(rect);
        fltk_draw::set_line_style(LineStyle::Solid, line_width.round() as i32);
        fltk_draw::draw_rect(x, y, w, h);
        fltk_draw::set_line_style(LineStyle::Solid, 0);
    }

    fn draw_polyline(&mut self, points: &[Point], line_width: f64) {
        fltk_draw::set_line_style(LineStyle::Solid | LineStyle::CapRound, line_width.round() as i32);
        fltk_draw::begin_line();
        for p in points {
            let (x, y) = self.at(p.x, p.y);
            fltk_draw::vertex(x, y);
        }
        fltk_draw::end_line();
        fltk_draw::set_line_style(LineStyle::Solid, 0);
    }

    fn fill_polygon(&mut self, points: &[Point]) {
        fltk_draw::begin_complex_polygon();
        for p in points {
            let (x, y) = self.at(p.x, p.y);
            fltk_draw::vertex(x, y);
        }
        fltk_draw::end_complex_polygon();
    }

    fn draw_image(&mut self, location: &str, rect: Rect) {
        let (x, y, w, h) = self.pixels(rect);
        let entry = self
            .images
            .entry(location.to_string())
            .or_insert_with(|| match SharedImage::load(location) {
                Ok(image) => Some(image),
                Err(err) => {
                    log::warn!("cannot decode image {location}: {err}");
                    None
                }
            });
        if let Some(image) = entry {
            image.scale(w, h, false, true);
            image.draw(x, y, w, h);
        }
    }

    fn push_clip(&mut self, rect: Rect) {
        let (x, y, w, h) = self.pixels(rect);
        fltk_draw::push_clip(x, y, w, h);
    }

    fn pop_clip(&mut self) {
        fltk_draw::pop_clip();
    }
}
