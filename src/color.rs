// Colors are packed as 0xRRGGBBAA, the same layout the draw backends expect

pub const BLACK: u32 = 0x000000FF;
pub const WHITE: u32 = 0xFFFFFFFF;

pub fn rgb(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8) | 0xFF
}

pub fn components(color: u32) -> (u8, u8, u8, u8) {
    (
        ((color >> 24) & 0xFF) as u8,
        ((color >> 16) & 0xFF) as u8,
        ((color >> 8) & 0xFF) as u8,
        (color & 0xFF) as u8,
    )
}

/// Scale the alpha channel of a color by `alpha` (0.0 - 1.0)
pub fn with_alpha(color: u32, alpha: f64) -> u32 {
    let (r, g, b, a) = components(color);
    let a = ((a as f64) * alpha.clamp(0.0, 1.0)).round() as u32;
    ((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8) | a
}

/// Parse a color attribute from a help document.
///
/// Accepts a handful of names, `#rrggbb` and `r,g,b` (optionally wrapped
/// in `rgb(...)`).
pub fn parse_color(value: &str) -> Option<u32> {
    let value = value.trim();
    match value.to_ascii_lowercase().as_str() {
        "white" => return Some(WHITE),
        "black" => return Some(BLACK),
        "gray" | "grey" => return Some(rgb(133, 138, 140)),
        "blue" => return Some(rgb(214, 225, 235)),
        "red" => return Some(rgb(255, 0, 0)),
        "green" => return Some(rgb(0, 255, 0)),
        _ => {}
    }

    if let Some(hex) = value.strip_prefix('#') {
        if hex.len() == 6 {
            let packed = u32::from_str_radix(hex, 16).ok()?;
            return Some((packed << 8) | 0xFF);
        }
        return None;
    }

    let inner = value
        .strip_prefix("rgb(")
        .and_then(|v| v.strip_suffix(')'))
        .unwrap_or(value);
    let parts: Vec<u8> = inner
        .split(',')
        .map(|p| p.trim().parse::<u8>())
        .collect::<Result<_, _>>()
        .ok()?;
    match parts.as_slice() {
        [r, g, b] => Some(rgb(*r, *g, *b)),
        _ => None,
    }
}

/// Render a color as an SVG/CSS color string
pub fn to_css(color: u32) -> String {
    let (r, g, b, a) = components(color);
    if a == 0xFF {
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    } else {
        format!("rgba({}, {}, {}, {:.2})", r, g, b, a as f32 / 255.0)
    }
}

/// Palette of the three help box flavors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoxColor {
    Blue,
    Black,
    #[default]
    Gray,
}

impl BoxColor {
    pub fn from_name(name: Option<&str>) -> Self {
        match name {
            Some("blue") => BoxColor::Blue,
            Some("black") => BoxColor::Black,
            _ => BoxColor::Gray,
        }
    }

    pub fn fill(self) -> u32 {
        match self {
            BoxColor::Blue => rgb(214, 225, 235),
            BoxColor::Black => rgb(50, 52, 54),
            BoxColor::Gray => rgb(133, 138, 140),
        }
    }

    pub fn border(self) -> u32 {
        match self {
            BoxColor::Blue | BoxColor::Black => rgb(153, 156, 158),
            BoxColor::Gray => rgb(183, 186, 188),
        }
    }

    /// Default text color for content placed inside a box of this color
    pub fn text_color(self) -> u32 {
        match self {
            BoxColor::Blue => BLACK,
            _ => WHITE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_named_and_hex() {
        assert_eq!(parse_color("white"), Some(WHITE));
        assert_eq!(parse_color("#ff0000"), Some(0xFF0000FF));
        assert_eq!(parse_color("10, 20, 30"), Some(rgb(10, 20, 30)));
        assert_eq!(parse_color("rgb(1,2,3)"), Some(rgb(1, 2, 3)));
        assert_eq!(parse_color("#fff"), None);
        assert_eq!(parse_color("mauve-ish"), None);
    }

    #[test]
    fn test_box_palette() {
        assert_eq!(BoxColor::from_name(Some("blue")).text_color(), BLACK);
        assert_eq!(BoxColor::from_name(None), BoxColor::Gray);
        assert_eq!(BoxColor::Black.fill(), rgb(50, 52, 54));
    }

    #[test]
    fn test_css_output() {
        assert_eq!(to_css(0x00FF00FF), "#00ff00");
        assert_eq!(to_css(with_alpha(0x000000FF, 0.5)), "rgba(0, 0, 0, 0.50)");
    }
}
