//! Pixel geometry: [`Point`] and [`Range`].
//!
//! Coordinates are image coordinates: X grows right, Y grows down. A
//! [`Range`] doubles as the image rectangle and owns the conversion between
//! points and flat row-major indices used by every per-pixel array.

use std::fmt;
use std::ops::{Add, Sub};

// ---------------------------------------------------------------------------
// Point
// ---------------------------------------------------------------------------

/// A 2D integer pixel coordinate.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// Origin (0, 0).
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// Create a new point.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Return a point shifted by (dx, dy).
    #[inline]
    pub const fn shift(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// All eight neighbours, clockwise starting from the one above.
    #[inline]
    pub fn neighbors_8(self) -> [Point; 8] {
        [
            Self::new(self.x, self.y - 1),
            Self::new(self.x + 1, self.y - 1),
            Self::new(self.x + 1, self.y),
            Self::new(self.x + 1, self.y + 1),
            Self::new(self.x, self.y + 1),
            Self::new(self.x - 1, self.y + 1),
            Self::new(self.x - 1, self.y),
            Self::new(self.x - 1, self.y - 1),
        ]
    }

    /// Whether the step `self -> to` changes both the row and the column.
    #[inline]
    pub fn is_diagonal_to(self, to: Point) -> bool {
        self.x != to.x && self.y != to.y
    }

    /// Whether `other` is one of the eight neighbours of `self`.
    #[inline]
    pub fn is_adjacent_8(self, other: Point) -> bool {
        self != other && (self.x - other.x).abs() <= 1 && (self.y - other.y).abs() <= 1
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for Point {
    #[inline]
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl Add for Point {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

// ---------------------------------------------------------------------------
// Range
// ---------------------------------------------------------------------------

/// A half-open rectangle \[min, max). `min` is inclusive, `max` is exclusive.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Range {
    pub min: Point,
    pub max: Point,
}

impl Range {
    /// Create a new range from two corners and auto-canonicalize so that
    /// `min` ≤ `max` on each axis.
    #[inline]
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self {
            min: Point::new(x0.min(x1), y0.min(y1)),
            max: Point::new(x0.max(x1), y0.max(y1)),
        }
    }

    /// The image rectangle `[0, width) × [0, height)`. Both sides must fit
    /// in an `i32`, which every [`GrayImage`](crate::GrayImage) guarantees.
    #[inline]
    pub fn with_size(width: usize, height: usize) -> Self {
        Self::new(0, 0, width as i32, height as i32)
    }

    /// The square window of half-size `delta` centered on `p`, clipped to
    /// `self`.
    #[inline]
    pub fn around(self, p: Point, delta: i32) -> Self {
        let delta = delta.max(0);
        self.intersect(Self::new(
            p.x - delta,
            p.y - delta,
            p.x + delta + 1,
            p.y + delta + 1,
        ))
    }

    /// Width of the range.
    #[inline]
    pub fn width(self) -> i32 {
        self.max.x - self.min.x
    }

    /// Height of the range.
    #[inline]
    pub fn height(self) -> i32 {
        self.max.y - self.min.y
    }

    /// Total number of pixels in the range.
    #[inline]
    pub fn len(self) -> usize {
        if self.is_empty() {
            return 0;
        }
        (self.width() as usize) * (self.height() as usize)
    }

    /// Whether the range has zero or negative area.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.min.x >= self.max.x || self.min.y >= self.max.y
    }

    /// Whether `p` is inside the half-open range.
    #[inline]
    pub fn contains(self, p: Point) -> bool {
        p.x >= self.min.x && p.x < self.max.x && p.y >= self.min.y && p.y < self.max.y
    }

    /// Intersection of two ranges. Non-overlapping ranges give the zero
    /// (empty) range.
    #[inline]
    pub fn intersect(self, other: Range) -> Self {
        let r = Self {
            min: Point::new(self.min.x.max(other.min.x), self.min.y.max(other.min.y)),
            max: Point::new(self.max.x.min(other.max.x), self.max.y.min(other.max.y)),
        };
        if r.is_empty() { Self::default() } else { r }
    }

    /// Flat row-major index of `p`, or `None` if `p` is outside the range.
    #[inline]
    pub fn index_of(self, p: Point) -> Option<usize> {
        if !self.contains(p) {
            return None;
        }
        let x = (p.x - self.min.x) as usize;
        let y = (p.y - self.min.y) as usize;
        Some(y * self.width() as usize + x)
    }

    /// Inverse of [`index_of`](Range::index_of).
    #[inline]
    pub fn point_at(self, idx: usize) -> Point {
        let w = self.width().max(1) as usize;
        Point::new(
            (idx % w) as i32 + self.min.x,
            (idx / w) as i32 + self.min.y,
        )
    }

    /// Clamp `p` onto the nearest pixel inside the range. The range must not
    /// be empty.
    #[inline]
    pub fn clamp(self, p: Point) -> Point {
        Point::new(
            p.x.clamp(self.min.x, self.max.x - 1),
            p.y.clamp(self.min.y, self.max.y - 1),
        )
    }

    /// Row-major iterator over every point in the range.
    #[inline]
    pub fn iter(self) -> RangeIter {
        RangeIter {
            range: self,
            cur: self.min,
        }
    }
}

impl IntoIterator for Range {
    type Item = Point;
    type IntoIter = RangeIter;
    #[inline]
    fn into_iter(self) -> RangeIter {
        self.iter()
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}-{})", self.min, self.max)
    }
}

// ---------------------------------------------------------------------------
// RangeIter
// ---------------------------------------------------------------------------

/// Row-major iterator over the points in a [`Range`].
#[derive(Clone, Debug)]
pub struct RangeIter {
    range: Range,
    cur: Point,
}

impl Iterator for RangeIter {
    type Item = Point;

    #[inline]
    fn next(&mut self) -> Option<Point> {
        if self.cur.y >= self.range.max.y || self.range.is_empty() {
            return None;
        }
        let p = self.cur;
        self.cur.x += 1;
        if self.cur.x >= self.range.max.x {
            self.cur.x = self.range.min.x;
            self.cur.y += 1;
        }
        Some(p)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.range.is_empty() || self.cur.y >= self.range.max.y {
            return (0, Some(0));
        }
        let w = self.range.width() as usize;
        let remaining_in_row = (self.range.max.x - self.cur.x) as usize;
        let remaining_rows = (self.range.max.y - self.cur.y - 1) as usize;
        let total = remaining_in_row + remaining_rows * w;
        (total, Some(total))
    }
}

impl ExactSizeIterator for RangeIter {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_arithmetic() {
        let a = Point::new(1, 2);
        let b = Point::new(3, 4);
        assert_eq!(a + b, Point::new(4, 6));
        assert_eq!(b - a, Point::new(2, 2));
        assert_eq!(a.shift(-1, 1), Point::new(0, 3));
    }

    #[test]
    fn diagonal_and_adjacency() {
        let p = Point::new(5, 5);
        assert!(p.is_diagonal_to(Point::new(6, 4)));
        assert!(!p.is_diagonal_to(Point::new(6, 5)));
        for n in p.neighbors_8() {
            assert!(p.is_adjacent_8(n));
        }
        assert!(!p.is_adjacent_8(p));
        assert!(!p.is_adjacent_8(Point::new(7, 5)));
    }

    #[test]
    fn index_round_trip_matches_row_major_order() {
        let r = Range::with_size(7, 3);
        for (i, p) in r.iter().enumerate() {
            assert_eq!(r.index_of(p), Some(i));
            assert_eq!(r.point_at(i), p);
        }
        assert_eq!(r.index_of(Point::new(7, 0)), None);
        assert_eq!(r.index_of(Point::new(-1, 0)), None);
    }

    #[test]
    fn around_is_clipped_to_the_image() {
        let r = Range::with_size(10, 10);
        assert_eq!(r.around(Point::new(5, 5), 2), Range::new(3, 3, 8, 8));
        assert_eq!(r.around(Point::new(0, 9), 3), Range::new(0, 6, 4, 10));
        assert_eq!(r.around(Point::new(4, 4), 3).len(), 49);
    }

    #[test]
    fn clamp_snaps_to_border() {
        let r = Range::with_size(4, 4);
        assert_eq!(r.clamp(Point::new(-3, 9)), Point::new(0, 3));
        assert_eq!(r.clamp(Point::new(2, 1)), Point::new(2, 1));
    }

    #[test]
    fn range_intersect_no_overlap_returns_empty() {
        let a = Range::new(0, 0, 2, 2);
        let b = Range::new(5, 5, 7, 7);
        let c = a.intersect(b);
        assert!(c.is_empty());
        assert_eq!(c, Range::default());
    }

    #[test]
    fn range_iter_size_hint_is_exact() {
        let r = Range::new(1, 1, 4, 3);
        let mut it = r.iter();
        assert_eq!(it.len(), 6);
        it.next();
        assert_eq!(it.len(), 5);
        assert_eq!(it.count(), 5);
    }
}
