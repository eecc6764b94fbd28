// Library exports for helpscreen

pub mod alignment;
pub mod arrow;
pub mod bubble;
pub mod color;
pub mod config;
pub mod diagram;
pub mod document;
pub mod draw_context;
pub mod error;
#[cfg(feature = "viewer")]
pub mod fltk_draw_context;
pub mod geometry;
pub mod help_box;
pub mod image;
pub mod loader;
pub mod menu;
pub mod metrics;
pub mod node;
pub mod outline;
pub mod paragraph;
pub mod picture;
pub mod placeholder;
pub mod resources;
pub mod rich_text;
pub mod screen;
pub mod script;
pub mod svg;
pub mod theme;
pub mod translate;
