use crate::color::{rgb, WHITE};
use crate::draw_context::FontSpec;
use serde::{Deserialize, Serialize};

/// Visual constants for help screens.
///
/// The pixel values are tuned by eye; change them only together with the
/// help content that relies on them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub screen_width: f64,
    pub padding: f64,
    pub vertical_padding: f64,
    pub font_family: String,
    pub background_color: u32,
    pub default_text_color: u32,

    pub text_size: u16,
    pub small_text_size: u16,

    pub box_border_width: f64,

    pub diagram_margin: f64,
    pub diagram_padding: f64,
    /// Smallest downward nudge applied to an annotation; smaller ones keep
    /// the arrow straight
    pub min_annotation_adjustment: f64,

    pub arrow_head_size: f64,
    pub arrow_line_width: f64,
    pub arrow_padding: f64,

    pub highlight_color: u32,
    pub highlight_border: f64,
    pub ghost_alpha: f64,

    pub bubble_padding: f64,
    pub bubble_border_width: f64,
    pub bubble_color: u32,
    pub bubble_border_color: u32,

    pub menu_font_size: u16,
    pub menu_item_padding: f64,
    pub menu_color: u32,
    pub menu_text_color: u32,
    pub menu_offset_x: f64,
    pub menu_offset_y: f64,

    pub block_font_size: u16,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            screen_width: 572.0,
            padding: 15.0,
            vertical_padding: 10.0,
            font_family: "\"Times New Roman\", Times, serif".to_string(),
            background_color: rgb(220, 220, 220),
            default_text_color: WHITE,

            text_size: 20,
            small_text_size: 16,

            box_border_width: 1.0,

            diagram_margin: 30.0,
            diagram_padding: 5.0,
            min_annotation_adjustment: 3.0,

            arrow_head_size: 5.0,
            arrow_line_width: 3.0,
            arrow_padding: 5.0,

            highlight_color: rgb(0, 255, 0),
            highlight_border: 2.0,
            ghost_alpha: 0.2,

            bubble_padding: 5.0,
            bubble_border_width: 3.0,
            bubble_color: WHITE,
            bubble_border_color: rgb(140, 140, 140),

            menu_font_size: 12,
            menu_item_padding: 4.0,
            menu_color: rgb(255, 255, 255),
            menu_text_color: rgb(0, 0, 0),
            menu_offset_x: -10.0,
            menu_offset_y: 5.0,

            block_font_size: 10,
        }
    }
}

impl Theme {
    /// Font for a paragraph-like element
    pub fn text_font(&self, family: Option<&str>, small: bool, bold: bool, italic: bool) -> FontSpec {
        let size = if small {
            self.small_text_size
        } else {
            self.text_size
        };
        FontSpec::new(Some(family.unwrap_or(&self.font_family)), size).with_style(bold, italic)
    }

    pub fn menu_font(&self) -> FontSpec {
        FontSpec::new(Some("sans-serif"), self.menu_font_size)
    }

    pub fn block_font(&self) -> FontSpec {
        FontSpec::new(Some("Helvetica, Arial, sans-serif"), self.block_font_size).with_style(true, false)
    }
}
