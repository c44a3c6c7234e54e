//! Geometric primitives and small numeric helpers.
//!
//! Provides:
//! - `Point` and the axis-aligned `Rectangle` value type
//! - The `HasBBox` trait implemented by every page element
//! - Bound computation over rectangle sets
//! - Statistical mode used for dominant glyph sizes

use std::hash::{Hash, Hasher};

use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// Small epsilon for floating-point comparisons.
pub const EPSILON: f64 = 1e-9;

/// A rectangle as a plain `(left, bottom, right, top)` tuple.
pub type Rect = (f64, f64, f64, f64);

/// Compares two floats for approximate equality.
#[inline]
pub fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

/// A 2D point in page space (y grows upwards).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle.
///
/// Coordinates are normalized on construction so that `left <= right` and
/// `bottom <= top`. Rectangles are immutable values: every operation returns
/// a new rectangle. Equality and hashing compare the four coordinates
/// exactly, which is what the whitespace extractor relies on when testing
/// for shared edges.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Rectangle {
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
    pub top: f64,
}

impl Rectangle {
    pub fn new(left: f64, bottom: f64, right: f64, top: f64) -> Self {
        Self {
            left: left.min(right),
            bottom: bottom.min(top),
            right: left.max(right),
            top: bottom.max(top),
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn centroid(&self) -> Point {
        Point::new(
            (self.left + self.right) / 2.0,
            (self.bottom + self.top) / 2.0,
        )
    }

    /// True when the rectangle has no positive width or height.
    pub fn is_degenerate(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    /// Strict overlap: rectangles sharing only an edge do not overlap.
    pub fn overlaps_hard(&self, other: &Self) -> bool {
        if self.left >= other.right || other.left >= self.right {
            return false;
        }
        if self.top <= other.bottom || other.top <= self.bottom {
            return false;
        }
        true
    }

    /// True when `other` lies inside `self` (edges may coincide).
    pub fn contains(&self, other: &Self) -> bool {
        other.right <= self.right
            && other.left >= self.left
            && other.top <= self.top
            && other.bottom >= self.bottom
    }

    /// True when the rectangles touch or overlap and share at least one
    /// edge coordinate.
    pub fn is_adjacent_to(&self, other: &Self) -> bool {
        if self.left > other.right || other.left > self.right {
            return false;
        }
        if self.top < other.bottom || other.top < self.bottom {
            return false;
        }
        self.left == other.right
            || self.right == other.left
            || self.bottom == other.top
            || self.top == other.bottom
    }

    /// Area of the intersection, 0 when the rectangles are disjoint.
    pub fn overlapping_area(&self, other: &Self) -> f64 {
        let w = self.right.min(other.right) - self.left.max(other.left);
        let h = self.top.min(other.top) - self.bottom.max(other.bottom);
        if w > 0.0 && h > 0.0 { w * h } else { 0.0 }
    }

    /// Smallest rectangle enclosing both.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            left: self.left.min(other.left),
            bottom: self.bottom.min(other.bottom),
            right: self.right.max(other.right),
            top: self.top.max(other.top),
        }
    }

    fn key(&self) -> [OrderedFloat<f64>; 4] {
        [
            OrderedFloat(self.left),
            OrderedFloat(self.bottom),
            OrderedFloat(self.right),
            OrderedFloat(self.top),
        ]
    }
}

impl PartialEq for Rectangle {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Rectangle {}

impl Hash for Rectangle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl From<Rect> for Rectangle {
    fn from((left, bottom, right, top): Rect) -> Self {
        Self::new(left, bottom, right, top)
    }
}

impl std::fmt::Display for Rectangle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({:.3},{:.3})-({:.3},{:.3})",
            self.left, self.bottom, self.right, self.top
        )
    }
}

/// Trait for objects that have a bounding box.
pub trait HasBBox {
    fn bbox(&self) -> Rectangle;

    fn width(&self) -> f64 {
        self.bbox().width()
    }

    fn height(&self) -> f64 {
        self.bbox().height()
    }

    fn centroid(&self) -> Point {
        self.bbox().centroid()
    }
}

impl HasBBox for Rectangle {
    fn bbox(&self) -> Rectangle {
        *self
    }
}

impl<T: HasBBox> HasBBox for &T {
    fn bbox(&self) -> Rectangle {
        (*self).bbox()
    }
}

/// Bounding rectangle of a set of rectangles, `None` when the set is empty.
pub fn get_bound<I>(rects: I) -> Option<Rectangle>
where
    I: IntoIterator<Item = Rectangle>,
{
    rects.into_iter().reduce(|acc, r| acc.union(&r))
}

/// Statistical mode of a sequence of values.
///
/// The most frequent value wins; ties go to the value seen first. NaN values
/// are ignored. Returns `None` when no finite value is present.
pub fn mode<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let mut counts: IndexMap<OrderedFloat<f64>, usize> = IndexMap::new();
    for v in values.into_iter().filter(|v| !v.is_nan()) {
        *counts.entry(OrderedFloat(v)).or_insert(0) += 1;
    }
    let mut best: Option<(OrderedFloat<f64>, usize)> = None;
    for (value, count) in counts {
        match best {
            Some((_, c)) if c >= count => {}
            _ => best = Some((value, count)),
        }
    }
    best.map(|(v, _)| v.into_inner())
}
