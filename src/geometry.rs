//! Signed desktop geometry.
//!
//! Desktop coordinates are signed because secondary monitors may sit left of
//! or above the primary one. Right and bottom edges are exclusive: a rect at
//! `x = 180` with `width = 220` ends at `right() == 400`, which is exactly
//! where a neighbour starting at `x = 400` begins.

use std::ops::Sub;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_parts(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn contains(&self, point: Point) -> bool {
        !self.is_empty()
            && point.x >= self.x
            && point.x < self.right()
            && point.y >= self.y
            && point.y < self.bottom()
    }

    pub fn with_origin(&self, origin: Point) -> Self {
        Self::from_parts(origin, self.size())
    }

    /// Shrink the rect by `amount` on every side.
    pub fn inset(&self, amount: i32) -> Self {
        let twice = amount.saturating_mul(2);
        Self::new(
            self.x.saturating_add(amount),
            self.y.saturating_add(amount),
            self.width.saturating_sub(twice).max(0),
            self.height.saturating_sub(twice).max(0),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exclusive_edges_line_up_with_neighbours() {
        let left = Rect::new(180, 0, 220, 220);
        let right = Rect::new(400, 0, 220, 220);
        assert_eq!(left.right(), right.x);
        assert!(!left.contains(Point::new(400, 10)));
        assert!(right.contains(Point::new(400, 10)));
    }

    #[test]
    fn inset_never_goes_negative() {
        let r = Rect::new(0, 0, 10, 4);
        assert_eq!(r.inset(3), Rect::new(3, 3, 4, 0));
        assert!(r.inset(3).is_empty());
    }

    #[test]
    fn inset_saturates_at_the_coordinate_limit() {
        let r = Rect::new(i32::MAX, i32::MIN, 240, 240);
        assert_eq!(r.inset(10), Rect::new(i32::MAX, i32::MIN + 10, 220, 220));
        assert!(!r.inset(10).contains(Point::new(1500, 900)));
    }

    #[test]
    fn empty_rect_contains_nothing() {
        let r = Rect::new(5, 5, 0, 10);
        assert!(!r.contains(Point::new(5, 5)));
    }
}
