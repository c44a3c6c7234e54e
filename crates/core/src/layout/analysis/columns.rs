//! Column boundary detection on top of the whitespace cover.
//!
//! Tall whitespace rectangles flanked by text are column separators. The
//! candidates are filtered by shape and textual support, stretched
//! vertically until a word blocks them, and finally merged when nothing
//! separates two neighbours.

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use super::whitespace::{WhitespaceCover, WhitespaceExtractor};
use crate::error::Result;
use crate::layout::elements::Word;
use crate::layout::params::{ColumnParams, WhitespaceParams};
use crate::utils::Rectangle;

/// Counts of words directly left and right of a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SideSupport {
    pub left: usize,
    pub right: usize,
}

/// Words ending within `adjacency_gap` left of `candidate` and starting
/// within `adjacency_gap` right of it. Only words vertically overlapping the
/// candidate count.
pub fn side_support(candidate: &Rectangle, words: &[Word], params: &ColumnParams) -> SideSupport {
    let gap = params.adjacency_gap;
    let mut support = SideSupport::default();
    for word in words {
        let b = &word.bbox;
        if b.top <= candidate.bottom || b.bottom >= candidate.top {
            continue;
        }
        let left_gap = candidate.left - b.right;
        if (0.0..=gap).contains(&left_gap) {
            support.left += 1;
        }
        let right_gap = b.left - candidate.right;
        if (0.0..=gap).contains(&right_gap) {
            support.right += 1;
        }
    }
    support
}

/// Keeps the whitespace rectangles that look like column separators.
pub fn column_candidates(
    whitespace: &[Rectangle],
    words: &[Word],
    params: &ColumnParams,
) -> Vec<Rectangle> {
    whitespace
        .iter()
        .filter(|w| {
            if w.height() / w.width() < params.min_aspect_ratio {
                return false;
            }
            let SideSupport { left, right } = side_support(w, words, params);
            trace!(candidate = %w, left, right, "column support");
            if left == 0 && right < params.lone_side_support {
                return false;
            }
            if right == 0 && left < params.lone_side_support {
                return false;
            }
            left >= params.min_support || right >= params.min_support
        })
        .copied()
        .collect()
}

fn is_blocked(words: &[Word], x: f64, y: f64) -> bool {
    words.iter().any(|w| {
        let b = &w.bbox;
        b.top > y && b.bottom < y && b.left < x && b.right > x
    })
}

/// Stretches one strip vertically inside `content` until a word blocks its
/// centre line.
fn stretch_strip(strip: Rectangle, words: &[Word], content: &Rectangle, step: f64) -> Rectangle {
    let x = strip.centroid().x;

    let mut start = strip.bottom;
    let mut y = strip.bottom;
    while y > content.bottom {
        if is_blocked(words, x, y) {
            break;
        }
        start = y;
        y -= step;
    }

    let mut end = strip.top;
    let mut y = strip.top;
    while y < content.top {
        if is_blocked(words, x, y) {
            break;
        }
        end = y;
        y += step;
    }

    Rectangle::new(strip.left, start, strip.right, end)
}

/// Adjusts the height of a column candidate.
///
/// The candidate is cut into a left third, a centred two-thirds and a right
/// third strip. Each strip is stretched independently and the tallest one
/// is returned.
pub fn adjust_height(
    candidate: &Rectangle,
    words: &[Word],
    content: &Rectangle,
    params: &ColumnParams,
) -> Rectangle {
    let third = candidate.width() / 3.0;
    let mid = candidate.centroid().x;
    let strips = [
        Rectangle::new(candidate.left, candidate.bottom, candidate.left + third, candidate.top),
        Rectangle::new(mid - third, candidate.bottom, mid + third, candidate.top),
        Rectangle::new(candidate.right - third, candidate.bottom, candidate.right, candidate.top),
    ];

    let mut best: Option<Rectangle> = None;
    for strip in strips {
        let stretched = stretch_strip(strip, words, content, params.scan_step);
        if best.is_none_or(|b| stretched.height() > b.height()) {
            best = Some(stretched);
        }
    }
    best.unwrap_or(*candidate)
}

/// Merges neighbouring boundaries with no word between them and drops
/// boundaries shorter than `min_height`.
///
/// Boundaries are sorted left to right. A merged boundary spans from the
/// left one's left edge and bottom to the right one's right edge and top.
pub fn filter_combinations(
    boundaries: &[Rectangle],
    words: &[Word],
    params: &ColumnParams,
) -> Vec<Rectangle> {
    let mut slots: Vec<Option<Rectangle>> = boundaries
        .iter()
        .copied()
        .sorted_by(|a, b| a.left.total_cmp(&b.left))
        .map(Some)
        .collect();

    for i in 0..slots.len().saturating_sub(1) {
        let (Some(current), Some(next)) = (slots[i], slots[i + 1]) else {
            continue;
        };
        if current.height() < params.min_height {
            slots[i] = None;
            continue;
        }
        let separated = words
            .iter()
            .any(|w| w.bbox.left > current.right && w.bbox.right < next.left);
        if !separated {
            trace!(%current, %next, "merging boundaries");
            slots[i + 1] = Some(Rectangle::new(
                current.left,
                current.bottom,
                next.right,
                next.top,
            ));
            slots[i] = None;
        }
    }

    if let Some(last) = slots.last_mut()
        && last.is_some_and(|r| r.height() < params.min_height)
    {
        *last = None;
    }

    slots.into_iter().flatten().collect()
}

/// Output of every stage of column detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnLayout {
    pub whitespace: WhitespaceCover,
    pub candidates: Vec<Rectangle>,
    pub adjusted: Vec<Rectangle>,
    pub boundaries: Vec<Rectangle>,
}

/// Runs whitespace extraction and the column refinement passes.
#[derive(Debug, Clone, Default)]
pub struct ColumnSegmenter {
    extractor: WhitespaceExtractor,
    params: ColumnParams,
}

impl ColumnSegmenter {
    pub fn new(whitespace: WhitespaceParams, params: ColumnParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            extractor: WhitespaceExtractor::new(whitespace)?,
            params,
        })
    }

    #[instrument(skip_all, fields(words = words.len()))]
    pub fn segment(&self, words: &[Word]) -> Result<ColumnLayout> {
        let whitespace = self.extractor.extract_from_words(words)?;
        let candidates = column_candidates(&whitespace.rectangles, words, &self.params);
        let adjusted: Vec<Rectangle> = candidates
            .iter()
            .map(|c| adjust_height(c, words, &whitespace.bound, &self.params))
            .collect();
        let boundaries = filter_combinations(&adjusted, words, &self.params);
        debug!(
            whitespace = whitespace.rectangles.len(),
            candidates = candidates.len(),
            boundaries = boundaries.len(),
            "column detection finished"
        );
        Ok(ColumnLayout {
            whitespace,
            candidates,
            adjusted,
            boundaries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(rect: (f64, f64, f64, f64)) -> Word {
        Word::new("w", Rectangle::from(rect))
    }

    /// Lines of words on both sides of a gap at x in [100, 120].
    fn two_sided(lines: usize, left: bool, right: bool) -> Vec<Word> {
        let mut words = Vec::new();
        for i in 0..lines {
            let y = 10.0 + i as f64 * 15.0;
            if left {
                words.push(word((40.0, y, 95.0, y + 10.0)));
            }
            if right {
                words.push(word((125.0, y, 180.0, y + 10.0)));
            }
        }
        words
    }

    #[test]
    fn squat_candidates_are_rejected() {
        let params = ColumnParams::default();
        let words = two_sided(10, true, true);
        let squat = Rectangle::new(100.0, 10.0, 120.0, 35.0);
        assert!(column_candidates(&[squat], &words, &params).is_empty());
    }

    #[test]
    fn support_counts_nearby_words_only() {
        let params = ColumnParams::default();
        let mut words = two_sided(5, true, true);
        words.push(word((0.0, 10.0, 30.0, 20.0)));
        let gap = Rectangle::new(100.0, 0.0, 120.0, 200.0);
        assert_eq!(side_support(&gap, &words, &params), SideSupport { left: 5, right: 5 });
    }

    #[test]
    fn one_sided_gap_needs_heavy_support() {
        let params = ColumnParams::default();
        let gap = Rectangle::new(100.0, 0.0, 120.0, 200.0);
        assert!(column_candidates(&[gap], &two_sided(7, true, false), &params).is_empty());
        assert_eq!(
            column_candidates(&[gap], &two_sided(8, true, false), &params),
            vec![gap]
        );
    }

    #[test]
    fn two_sided_gap_needs_four_words() {
        let params = ColumnParams::default();
        let gap = Rectangle::new(100.0, 0.0, 120.0, 200.0);
        assert!(column_candidates(&[gap], &two_sided(3, true, true), &params).is_empty());
        assert_eq!(
            column_candidates(&[gap], &two_sided(4, true, true), &params),
            vec![gap]
        );
    }

    #[test]
    fn height_adjustment_stops_at_blocking_word() {
        let params = ColumnParams::default();
        let content = Rectangle::new(0.0, 0.0, 200.0, 100.0);
        // blocks the left and centre strips above y = 80
        let words = vec![word((102.0, 80.0, 118.0, 90.0))];
        let candidate = Rectangle::new(100.0, 40.0, 130.0, 60.0);
        let adjusted = adjust_height(&candidate, &words, &content, &params);
        // the right strip (x centre 125) is never blocked
        assert_eq!(adjusted, Rectangle::new(120.0, 1.0, 130.0, 99.0));
    }

    #[test]
    fn neighbours_without_words_between_merge() {
        let params = ColumnParams::default();
        let a = Rectangle::new(100.0, 0.0, 110.0, 50.0);
        let b = Rectangle::new(120.0, 10.0, 130.0, 60.0);
        let c = Rectangle::new(200.0, 0.0, 210.0, 60.0);
        let words = vec![word((150.0, 0.0, 180.0, 10.0))];
        let out = filter_combinations(&[c, b, a], &words, &params);
        assert_eq!(out, vec![Rectangle::new(100.0, 0.0, 130.0, 60.0), c]);
    }

    #[test]
    fn short_boundaries_are_dropped() {
        let params = ColumnParams {
            min_height: 30.0,
            ..Default::default()
        };
        let short = Rectangle::new(100.0, 0.0, 110.0, 20.0);
        let tall = Rectangle::new(200.0, 0.0, 210.0, 60.0);
        let last_short = Rectangle::new(300.0, 0.0, 310.0, 10.0);
        let words = vec![
            word((150.0, 0.0, 180.0, 10.0)),
            word((250.0, 0.0, 280.0, 10.0)),
        ];
        assert_eq!(
            filter_combinations(&[short, tall, last_short], &words, &params),
            vec![tall]
        );
    }
}
