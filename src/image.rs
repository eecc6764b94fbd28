// Inline images
use crate::draw_context::DrawContext;
use crate::geometry::Rect;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub enum ImageState {
    Pending,
    Loaded(PathBuf),
}

/// An image of fixed size whose pixels arrive after the screen is built
#[derive(Debug, Clone, PartialEq)]
pub struct ImageNode {
    /// Load slot assigned by the loader, unique per screen
    pub slot: usize,
    pub src: String,
    pub bounds: Rect,
    pub state: ImageState,
}

impl ImageNode {
    pub fn new(slot: usize, src: &str, width: f64, height: f64) -> Self {
        ImageNode {
            slot,
            src: src.to_string(),
            bounds: Rect::new(0.0, 0.0, width, height),
            state: ImageState::Pending,
        }
    }

    pub fn set_loaded(&mut self, location: &Path) {
        self.state = ImageState::Loaded(location.to_path_buf());
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, ImageState::Loaded(_))
    }

    pub fn render(&self, ctx: &mut dyn DrawContext) {
        if let ImageState::Loaded(location) = &self.state {
            ctx.draw_image(&location.to_string_lossy(), self.bounds);
        }
    }
}
