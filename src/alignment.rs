// Row and column containers
use crate::geometry::{Point, Rect};
use crate::node::LayoutNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Row,
    Column,
}

pub struct Alignment {
    pub orientation: Orientation,
    /// Gap between consecutive children
    pub padding: f64,
    pub children: Vec<LayoutNode>,
    pub bounds: Rect,
}

impl Alignment {
    pub fn new(orientation: Orientation, padding: f64) -> Self {
        Alignment {
            orientation,
            padding,
            children: Vec::new(),
            bounds: Rect::default(),
        }
    }

    pub fn is_row(&self) -> bool {
        self.orientation == Orientation::Row
    }

    /// Pixel width already claimed by the gaps and by children that do not
    /// share the remaining width
    pub fn used_width(&self) -> f64 {
        let gaps = self.padding * self.children.len().saturating_sub(1) as f64;
        gaps + self
            .children
            .iter()
            .map(|child| match child.relative_width {
                Some(weight) if weight != 0.0 => 0.0,
                _ => child.width(),
            })
            .sum::<f64>()
    }

    /// Sum of the children's relative width weights
    pub fn relative_width_denominator(&self) -> f64 {
        self.children
            .iter()
            .map(|child| child.relative_width.unwrap_or(0.0))
            .sum()
    }

    /// Stack the children from the origin (tops aligned in a row, lefts
    /// aligned in a column), then apply their shifts. The extent reaches
    /// the far edges of the children.
    pub fn fix_layout(&mut self) {
        let origin = self.bounds.origin();
        let mut cursor = 0.0;
        let mut far = origin;
        for child in &mut self.children {
            let slot = match self.orientation {
                Orientation::Row => Point::new(cursor, 0.0),
                Orientation::Column => Point::new(0.0, cursor),
            };
            child.set_position(origin + slot);
            cursor += match self.orientation {
                Orientation::Row => child.width(),
                Orientation::Column => child.height(),
            } + self.padding;
            child.move_by(child.shift);
            let bounds = child.full_bounds();
            far = Point::new(far.x.max(bounds.right()), far.y.max(bounds.bottom()));
        }
        self.bounds = Rect::from_origin_extent(origin, far - origin);
    }
}
