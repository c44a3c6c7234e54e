//! Vector paths: commands, bounding boxes, orientation and simplification.
//!
//! A path is a list of drawing commands as produced by a content-stream
//! interpreter. Paths feed the X-Y cut (as obstacles with a bounding box)
//! and the straight-skeleton helpers (as polygon rings).

use serde::{Deserialize, Serialize};

use crate::error::{Result, SegError};
use crate::utils::{EPSILON, HasBBox, Point, Rectangle, get_bound};

/// A straight segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub from: Point,
    pub to: Point,
}

impl Line {
    pub const fn new(from: Point, to: Point) -> Self {
        Self { from, to }
    }

    pub fn reversed(&self) -> Self {
        Self::new(self.to, self.from)
    }

    pub fn bounding_box(&self) -> Rectangle {
        Rectangle::new(self.from.x, self.from.y, self.to.x, self.to.y)
    }
}

/// One drawing command.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PathCommand {
    Move {
        to: Point,
    },
    Line {
        from: Point,
        to: Point,
    },
    /// Cubic Bezier curve.
    Bezier {
        start: Point,
        c1: Point,
        c2: Point,
        end: Point,
    },
    Close,
}

impl PathCommand {
    pub fn start_point(&self) -> Option<Point> {
        match *self {
            Self::Move { to } => Some(to),
            Self::Line { from, .. } => Some(from),
            Self::Bezier { start, .. } => Some(start),
            Self::Close => None,
        }
    }

    pub fn end_point(&self) -> Option<Point> {
        match *self {
            Self::Move { to } => Some(to),
            Self::Line { to, .. } => Some(to),
            Self::Bezier { end, .. } => Some(end),
            Self::Close => None,
        }
    }

    /// Line or Bezier.
    pub fn is_drawing(&self) -> bool {
        matches!(self, Self::Line { .. } | Self::Bezier { .. })
    }

    /// Tight bounding box of a line or curve. Moves and closes draw nothing.
    pub fn bounding_box(&self) -> Option<Rectangle> {
        match *self {
            Self::Line { from, to } => Some(Line::new(from, to).bounding_box()),
            Self::Bezier { start, c1, c2, end } => Some(bezier_bounding_box(start, c1, c2, end)),
            Self::Move { .. } | Self::Close => None,
        }
    }

    /// The command traversed backwards. Moves and closes are unchanged.
    pub fn reversed(&self) -> Self {
        match *self {
            Self::Line { from, to } => Self::Line { from: to, to: from },
            Self::Bezier { start, c1, c2, end } => Self::Bezier {
                start: end,
                c1: c2,
                c2: c1,
                end: start,
            },
            other => other,
        }
    }

    /// Straight segments approximating the command.
    fn segments(&self) -> Vec<Line> {
        match *self {
            Self::Line { from, to } => vec![Line::new(from, to)],
            Self::Bezier { start, c1, c2, end } => flatten_bezier(start, c1, c2, end).to_vec(),
            Self::Move { .. } | Self::Close => Vec::new(),
        }
    }
}

/// Point on a cubic Bezier curve, `0 <= t <= 1`.
pub fn bezier_point(start: Point, c1: Point, c2: Point, end: Point, t: f64) -> Point {
    let u = 1.0 - t;
    let blend = |p0: f64, p1: f64, p2: f64, p3: f64| {
        u * u * u * p0 + 3.0 * t * u * u * p1 + 3.0 * t * t * u * p2 + t * t * t * p3
    };
    Point::new(
        blend(start.x, c1.x, c2.x, end.x),
        blend(start.y, c1.y, c2.y, end.y),
    )
}

/// Approximates a cubic Bezier curve with five segments, sampled at
/// t = 0.2, 0.4, 0.6 and 0.8.
pub fn flatten_bezier(start: Point, c1: Point, c2: Point, end: Point) -> [Line; 5] {
    let p = |t| bezier_point(start, c1, c2, end, t);
    let (p20, p40, p60, p80) = (p(0.2), p(0.4), p(0.6), p(0.8));
    [
        Line::new(start, p20),
        Line::new(p20, p40),
        Line::new(p40, p60),
        Line::new(p60, p80),
        Line::new(p80, end),
    ]
}

/// Parameters in (0, 1) where one coordinate of the curve is extremal.
fn bezier_extrema(p0: f64, p1: f64, p2: f64, p3: f64) -> Vec<f64> {
    // derivative / 3 = a t^2 + b t + c
    let a = -p0 + 3.0 * p1 - 3.0 * p2 + p3;
    let b = 2.0 * (p0 - 2.0 * p1 + p2);
    let c = p1 - p0;

    let mut roots = Vec::with_capacity(2);
    if a.abs() < EPSILON {
        if b.abs() >= EPSILON {
            roots.push(-c / b);
        }
    } else {
        let disc = b * b - 4.0 * a * c;
        if disc >= 0.0 {
            let sq = disc.sqrt();
            roots.push((-b + sq) / (2.0 * a));
            roots.push((-b - sq) / (2.0 * a));
        }
    }
    roots.retain(|t| *t > 0.0 && *t < 1.0);
    roots
}

/// Tight bounding box of a cubic Bezier curve.
pub fn bezier_bounding_box(start: Point, c1: Point, c2: Point, end: Point) -> Rectangle {
    let ts = bezier_extrema(start.x, c1.x, c2.x, end.x)
        .into_iter()
        .chain(bezier_extrema(start.y, c1.y, c2.y, end.y));
    let mut bound = Rectangle::new(start.x, start.y, end.x, end.y);
    for t in ts {
        let p = bezier_point(start, c1, c2, end, t);
        bound = bound.union(&Rectangle::new(p.x, p.y, p.x, p.y));
    }
    bound
}

/// A vector path on a page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PagePath {
    pub commands: Vec<PathCommand>,
}

impl PagePath {
    pub fn new(commands: Vec<PathCommand>) -> Self {
        Self { commands }
    }

    /// Closed polygon through `points`.
    pub fn polygon(points: &[Point]) -> Self {
        let mut commands = Vec::with_capacity(points.len() + 1);
        if let Some(&first) = points.first() {
            commands.push(PathCommand::Move { to: first });
        }
        for pair in points.windows(2) {
            commands.push(PathCommand::Line {
                from: pair[0],
                to: pair[1],
            });
        }
        if let (Some(&first), Some(&last)) = (points.first(), points.last())
            && points.len() > 1
            && first != last
        {
            commands.push(PathCommand::Line {
                from: last,
                to: first,
            });
        }
        commands.push(PathCommand::Close);
        Self { commands }
    }

    fn drawing(&self) -> impl DoubleEndedIterator<Item = &PathCommand> {
        self.commands.iter().filter(|c| c.is_drawing())
    }

    fn has_bezier(&self) -> bool {
        self.commands
            .iter()
            .any(|c| matches!(c, PathCommand::Bezier { .. }))
    }

    /// Box enclosing every line and curve, `None` when the path draws
    /// nothing.
    pub fn bounding_box(&self) -> Option<Rectangle> {
        get_bound(self.commands.iter().filter_map(PathCommand::bounding_box))
    }

    /// Only vertical straight lines.
    pub fn is_vertical_line(&self) -> bool {
        self.is_axis_line(|l| l.from.x == l.to.x)
    }

    /// Only horizontal straight lines.
    pub fn is_horizontal_line(&self) -> bool {
        self.is_axis_line(|l| l.from.y == l.to.y)
    }

    fn is_axis_line(&self, aligned: impl Fn(&Line) -> bool) -> bool {
        if self.has_bezier() {
            return false;
        }
        let mut lines = self.commands.iter().filter_map(|c| match *c {
            PathCommand::Line { from, to } => Some(Line::new(from, to)),
            _ => None,
        });
        let Some(first) = lines.next() else {
            return false;
        };
        aligned(&first) && lines.all(|l| aligned(&l))
    }

    /// True when the path has a close command, or when its lines and curves
    /// form a connected chain ending where it started.
    pub fn is_closed(&self) -> bool {
        if self.commands.iter().any(|c| matches!(c, PathCommand::Close)) {
            return true;
        }
        let drawing: Vec<&PathCommand> = self.drawing().collect();
        if drawing.len() < 2 {
            return false;
        }
        if drawing[0].start_point() != drawing[drawing.len() - 1].end_point() {
            return false;
        }
        drawing
            .windows(2)
            .all(|pair| pair[0].end_point() == pair[1].start_point())
    }

    /// Sum over edges of `(x2 - x1) * (y2 + y1)`, curves flattened.
    /// `None` for open paths.
    pub fn shoelace_sum(&self) -> Option<f64> {
        if !self.is_closed() {
            return None;
        }
        Some(
            self.commands
                .iter()
                .flat_map(PathCommand::segments)
                .map(|l| (l.to.x - l.from.x) * (l.to.y + l.from.y))
                .sum(),
        )
    }

    pub fn is_clockwise(&self) -> bool {
        self.shoelace_sum().is_some_and(|s| s > 0.0)
    }

    pub fn is_counter_clockwise(&self) -> bool {
        self.shoelace_sum().is_some_and(|s| s < 0.0)
    }

    /// The path traversed backwards.
    ///
    /// # Errors
    /// `SegError::InvalidPath` when the path has more than one move or more
    /// than one close.
    pub fn reversed(&self) -> Result<Self> {
        let moves: Vec<&PathCommand> = self
            .commands
            .iter()
            .filter(|c| matches!(c, PathCommand::Move { .. }))
            .collect();
        if moves.len() > 1 {
            return Err(SegError::InvalidPath("cannot reverse several sub-paths"));
        }
        let closes = self
            .commands
            .iter()
            .filter(|c| matches!(c, PathCommand::Close))
            .count();
        if closes > 1 {
            return Err(SegError::InvalidPath("cannot reverse several closes"));
        }

        let drawing: Vec<PathCommand> = self.drawing().rev().map(PathCommand::reversed).collect();
        let mut commands = Vec::with_capacity(self.commands.len());
        match (moves.first(), drawing.first().and_then(PathCommand::start_point)) {
            (Some(_), Some(start)) => commands.push(PathCommand::Move { to: start }),
            (Some(&&m), None) => commands.push(m),
            (None, _) => {}
        }
        commands.extend(drawing);
        if closes == 1 {
            commands.push(PathCommand::Close);
        }
        Ok(Self { commands })
    }

    pub fn to_clockwise(&self) -> Result<Self> {
        if self.is_clockwise() {
            return Ok(self.clone());
        }
        self.reversed()
    }

    pub fn to_counter_clockwise(&self) -> Result<Self> {
        if self.is_counter_clockwise() {
            return Ok(self.clone());
        }
        self.reversed()
    }

    /// Mean of the start and end points of every line and curve.
    pub fn centroid(&self) -> Option<Point> {
        let points: Vec<Point> = self
            .drawing()
            .flat_map(|c| [c.start_point(), c.end_point()])
            .flatten()
            .collect();
        if points.is_empty() {
            return None;
        }
        let n = points.len() as f64;
        Some(Point::new(
            points.iter().map(|p| p.x).sum::<f64>() / n,
            points.iter().map(|p| p.y).sum::<f64>() / n,
        ))
    }

    /// Splits the path where a command does not continue from the previous
    /// one, and after every close. Closed sub-paths that do not end where
    /// they start get a closing line.
    pub fn sub_paths(&self) -> Vec<PagePath> {
        let mut parts: Vec<Vec<PathCommand>> = Vec::new();
        let mut current: Vec<PathCommand> = Vec::new();

        for &command in &self.commands {
            let Some(previous_end) = current.last().and_then(PathCommand::end_point) else {
                current.push(command);
                if matches!(command, PathCommand::Close) {
                    parts.push(std::mem::take(&mut current));
                }
                continue;
            };
            match command {
                PathCommand::Close => {
                    current.push(command);
                    parts.push(std::mem::take(&mut current));
                }
                _ if command.start_point() == Some(previous_end) => current.push(command),
                _ => {
                    parts.push(std::mem::take(&mut current));
                    current.push(command);
                }
            }
        }
        if !current.is_empty() {
            parts.push(current);
        }

        parts
            .into_iter()
            .map(|mut commands| {
                let closed = commands.iter().any(|c| matches!(c, PathCommand::Close));
                let ends: Vec<Point> = commands
                    .iter()
                    .filter(|c| !matches!(c, PathCommand::Close))
                    .flat_map(|c| [c.start_point(), c.end_point()])
                    .flatten()
                    .collect();
                if closed
                    && let (Some(&first), Some(&last)) = (ends.first(), ends.last())
                    && first != last
                {
                    let at = commands.len() - 1;
                    commands.insert(at, PathCommand::Line { from: last, to: first });
                }
                PagePath { commands }
            })
            .collect()
    }

    /// Polygon ring: the start of every segment, curves flattened. The
    /// closing point is not repeated.
    pub fn ring(&self) -> Vec<Point> {
        let mut points: Vec<Point> = self
            .commands
            .iter()
            .flat_map(PathCommand::segments)
            .map(|l| l.from)
            .collect();
        let last_end = self.drawing().last().and_then(PathCommand::end_point);
        if let Some(end) = last_end
            && points.first() != Some(&end)
        {
            points.push(end);
        }
        points
    }
}

impl HasBBox for PagePath {
    /// Callers filter paths without a bounding box beforehand; those report
    /// an empty rectangle at the origin.
    fn bbox(&self) -> Rectangle {
        self.bounding_box().unwrap_or_default()
    }
}

fn distance_to_line_sq(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        let (ex, ey) = (p.x - a.x, p.y - a.y);
        return ex * ex + ey * ey;
    }
    let cross = dx * (p.y - a.y) - dy * (p.x - a.x);
    cross * cross / len_sq
}

fn simplify_range(points: &[Point], first: usize, last: usize, tol_sq: f64, keep: &mut Vec<usize>) {
    if last <= first + 1 {
        return;
    }
    let (a, b) = (points[first], points[last]);
    let mut max = 0.0;
    let mut farthest = first;
    for (i, &p) in points.iter().enumerate().take(last).skip(first + 1) {
        let d = distance_to_line_sq(p, a, b);
        if d > max {
            max = d;
            farthest = i;
        }
    }
    if max > tol_sq {
        keep.push(farthest);
        simplify_range(points, first, farthest, tol_sq, keep);
        simplify_range(points, farthest, last, tol_sq, keep);
    }
}

/// Ramer-Douglas-Peucker reduction of a polyline.
///
/// Points closer than `tolerance` to the simplified line are dropped. The
/// first and last points are always kept. A ring whose last point repeats
/// the first is simplified against its last distinct point.
pub fn simplify(points: &[Point], tolerance: f64) -> Vec<Point> {
    if points.len() < 3 || !tolerance.is_finite() {
        return points.to_vec();
    }
    let tol_sq = tolerance * tolerance;
    if tol_sq <= f64::from(f32::EPSILON) {
        return points.to_vec();
    }

    let mut last = points.len() - 1;
    while last > 0 && points[0] == points[last] {
        last -= 1;
    }

    let mut keep = vec![0, last, points.len() - 1];
    simplify_range(points, 0, last, tol_sq, &mut keep);
    keep.sort_unstable();
    keep.dedup();
    keep.into_iter().map(|i| points[i]).collect()
}
