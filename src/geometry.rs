// Geometry primitives shared by all layout passes
// Coordinates are in (fractional) pixels, y grows downward

use std::ops::{Add, Mul, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn abs(self) -> Self {
        Point::new(self.x.abs(), self.y.abs())
    }

    /// Component-wise minimum
    pub fn min(self, other: Point) -> Self {
        Point::new(self.x.min(other.x), self.y.min(other.y))
    }

    /// Angle of the vector in radians, measured from the positive x axis
    pub fn theta(self) -> f64 {
        self.y.atan2(self.x)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, factor: f64) -> Point {
        Point::new(self.x * factor, self.y * factor)
    }
}

/// Axis-aligned rectangle, stored as origin plus extent
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Rect { x, y, w, h }
    }

    pub fn from_origin_extent(origin: Point, extent: Point) -> Self {
        Rect::new(origin.x, origin.y, extent.x, extent.y)
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn extent(&self) -> Point {
        Point::new(self.w, self.h)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    pub fn right_center(&self) -> Point {
        Point::new(self.right(), self.y + self.h / 2.0)
    }

    pub fn bottom_center(&self) -> Point {
        Point::new(self.x + self.w / 2.0, self.bottom())
    }

    pub fn translated(&self, delta: Point) -> Rect {
        Rect::new(self.x + delta.x, self.y + delta.y, self.w, self.h)
    }

    /// Grow the rectangle by `amount` on every side
    pub fn expanded(&self, amount: f64) -> Rect {
        Rect::new(
            self.x - amount,
            self.y - amount,
            self.w + 2.0 * amount,
            self.h + 2.0 * amount,
        )
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let left = self.left().min(other.left());
        let top = self.top().min(other.top());
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(left, top, right - left, bottom - top)
    }

    pub fn scaled(&self, factor: f64) -> Rect {
        Rect::new(
            self.x * factor,
            self.y * factor,
            self.w * factor,
            self.h * factor,
        )
    }
}
