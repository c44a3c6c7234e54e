//! Distance measures and nearest-neighbour search.

use crate::error::{Result, SegError};
use crate::utils::Point;

/// Euclidean distance between two points.
pub fn euclidean(a: Point, b: Point) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Manhattan (city block) distance between two points.
pub fn manhattan(a: Point, b: Point) -> f64 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

/// Finds the candidate nearest to `element`.
///
/// `candidate_point` and `pivot_point` project candidates and the reference
/// element to points; `distance` compares them. Candidates equal to the
/// element itself are skipped, and the first candidate wins on ties.
///
/// Returns the index and distance of the nearest candidate, or `None` when
/// every candidate equals the element.
///
/// # Errors
/// `SegError::EmptyInput` when `candidates` is empty.
pub fn find_index_nearest<T, P, Q, D>(
    element: &T,
    candidates: &[T],
    candidate_point: P,
    pivot_point: Q,
    distance: D,
) -> Result<Option<(usize, f64)>>
where
    T: PartialEq,
    P: Fn(&T) -> Point,
    Q: Fn(&T) -> Point,
    D: Fn(Point, Point) -> f64,
{
    if candidates.is_empty() {
        return Err(SegError::EmptyInput("nearest-neighbour candidates"));
    }

    let pivot = pivot_point(element);
    let mut best: Option<(usize, f64)> = None;
    for (i, candidate) in candidates.iter().enumerate() {
        if candidate == element {
            continue;
        }
        let d = distance(candidate_point(candidate), pivot);
        if best.is_none_or(|(_, bd)| d < bd) {
            best = Some((i, d));
        }
    }
    Ok(best)
}
