//! Straight-skeleton vertex primitives.
//!
//! A vertex joins two consecutive polygon edges. Its angle bisector ray is
//! the path the vertex travels when the polygon shrinks; two neighbouring
//! rays meeting marks an edge collapse. For clockwise rings the rays point
//! into the polygon.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use super::path::Line;
use crate::utils::{EPSILON, Point, approx_eq};

/// Angle bisector of a valid vertex.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bisector {
    /// Half of the angle between the two edges, in `[0, pi)`.
    pub angle: f64,
    /// Ray from the shared point along the bisector.
    pub ray: Line,
}

impl Bisector {
    pub fn slope(&self) -> f64 {
        (self.ray.to.y - self.ray.from.y) / (self.ray.to.x - self.ray.from.x)
    }

    pub fn intercept(&self) -> f64 {
        self.ray.to.y - self.slope() * self.ray.to.x
    }

    fn is_vertical(&self) -> bool {
        approx_eq(self.ray.to.x, self.ray.from.x, EPSILON)
    }

    /// True when `p` lies on the forward side of the ray along both axes.
    fn is_ahead(&self, p: Point) -> bool {
        let o = self.ray.from;
        let (dx, dy) = (self.ray.to.x - o.x, self.ray.to.y - o.y);
        let ahead = |delta: f64, d: f64| {
            if d.abs() < EPSILON {
                delta.abs() < 1e-6
            } else {
                delta / d >= -EPSILON
            }
        };
        ahead(p.x - o.x, dx) && ahead(p.y - o.y, dy)
    }
}

/// Two consecutive edges sharing a point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub left_edge: Line,
    pub right_edge: Line,
    bisector: Option<Bisector>,
}

/// Signed difference of the edge direction angles, mapped to `[0, 2pi)`.
fn interior_angle(left: &Line, right: &Line) -> f64 {
    let a = (left.from.y - left.to.y).atan2(left.from.x - left.to.x)
        - (right.from.y - right.to.y).atan2(right.from.x - right.to.x);
    let sign = if a > 0.0 {
        1.0
    } else if a < 0.0 {
        -1.0
    } else {
        0.0
    };
    let angle = sign * PI - a;
    if angle < 0.0 { angle + 2.0 * PI } else { angle }
}

impl Vertex {
    /// Builds a vertex. It is valid only when `left_edge` ends where
    /// `right_edge` starts; invalid vertices carry no bisector.
    pub fn new(left_edge: Line, right_edge: Line) -> Self {
        let bisector = (left_edge.to == right_edge.from).then(|| {
            let angle = interior_angle(&left_edge, &right_edge) / 2.0;
            let (sin, cos) = angle.sin_cos();
            let dx = left_edge.from.x - left_edge.to.x;
            let dy = left_edge.from.y - left_edge.to.y;
            let origin = left_edge.to;
            let end = Point::new(
                cos * dx - sin * dy + origin.x,
                sin * dx + cos * dy + origin.y,
            );
            Bisector {
                angle,
                ray: Line::new(origin, end),
            }
        });
        Self {
            left_edge,
            right_edge,
            bisector,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.bisector.is_some()
    }

    /// The shared point of both edges.
    pub fn point(&self) -> Point {
        self.left_edge.to
    }

    pub fn bisector(&self) -> Option<&Bisector> {
        self.bisector.as_ref()
    }

    /// Point where both bisector rays meet.
    ///
    /// `None` when either vertex is invalid, the rays are parallel, or the
    /// meeting point lies behind one of the ray origins.
    pub fn intersection(&self, other: &Vertex) -> Option<Point> {
        let (a, b) = (self.bisector.as_ref()?, other.bisector.as_ref()?);

        let point = match (a.is_vertical(), b.is_vertical()) {
            (true, true) => return None,
            (true, false) => {
                let x = a.ray.from.x;
                Point::new(x, b.slope() * x + b.intercept())
            }
            (false, true) => {
                let x = b.ray.from.x;
                Point::new(x, a.slope() * x + a.intercept())
            }
            (false, false) => {
                let (ma, mb) = (a.slope(), b.slope());
                if approx_eq(ma, mb, EPSILON) {
                    return None;
                }
                let x = (b.intercept() - a.intercept()) / (ma - mb);
                Point::new(x, ma * x + a.intercept())
            }
        };

        (point.x.is_finite() && point.y.is_finite() && a.is_ahead(point) && b.is_ahead(point))
            .then_some(point)
    }
}

/// Distance from `point` to the infinite line through `line`.
///
/// A degenerate line measures the distance to its single point.
pub fn distance_point_to_line(line: &Line, point: Point) -> f64 {
    let dy = line.to.y - line.from.y;
    let dx = line.to.x - line.from.x;
    let denominator = dx.hypot(dy);
    if denominator == 0.0 {
        return line.from.distance(&point);
    }
    (dy * point.x - dx * point.y + line.to.x * line.from.y - line.to.y * line.from.x).abs()
        / denominator
}

/// Shoelace sum of a ring, positive for clockwise rings.
fn ring_orientation(ring: &[Point]) -> f64 {
    ring.iter()
        .zip(ring.iter().cycle().skip(1))
        .map(|(a, b)| (b.x - a.x) * (b.y + a.y))
        .sum()
}

/// Vertices of a closed ring, oriented clockwise.
///
/// The ring lists each corner once. Vertex `i` joins the edge arriving at
/// corner `i` and the edge leaving it. Rings with fewer than three corners
/// have no vertices.
pub fn polygon_vertices(ring: &[Point]) -> Vec<Vertex> {
    let n = ring.len();
    if n < 3 {
        return Vec::new();
    }
    let mut ring = ring.to_vec();
    if ring_orientation(&ring) < 0.0 {
        ring.reverse();
    }
    (0..n)
        .map(|i| {
            let prev = ring[(i + n - 1) % n];
            let next = ring[(i + 1) % n];
            Vertex::new(Line::new(prev, ring[i]), Line::new(ring[i], next))
        })
        .collect()
}

/// Two neighbouring bisectors meeting: the edge between the vertices
/// collapses at `point`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollapseEvent {
    pub vertex: usize,
    pub neighbour: usize,
    pub point: Point,
    /// Distance from `point` to the left edge of `vertex`.
    pub distance: f64,
}

/// Candidate collapse events, nearest first.
///
/// Each vertex is intersected with both neighbours and keeps the nearer
/// meeting point.
pub fn collapse_events(vertices: &[Vertex]) -> Vec<CollapseEvent> {
    let n = vertices.len();
    if n < 3 {
        return Vec::new();
    }
    let mut events: Vec<CollapseEvent> = (0..n)
        .filter_map(|i| {
            let v = &vertices[i];
            [(i + n - 1) % n, (i + 1) % n]
                .into_iter()
                .filter_map(|j| {
                    let point = v.intersection(&vertices[j])?;
                    Some(CollapseEvent {
                        vertex: i,
                        neighbour: j,
                        point,
                        distance: distance_point_to_line(&v.left_edge, point),
                    })
                })
                .min_by(|a, b| a.distance.total_cmp(&b.distance))
        })
        .collect();
    events.sort_by(|a, b| a.distance.total_cmp(&b.distance).then(a.vertex.cmp(&b.vertex)));
    events
}
