//! Maximal whitespace rectangle extraction.
//!
//! Best-first branch-and-bound over the continuous page plane: the queue is
//! seeded with the whole bound, the best-scoring candidate is popped, and it
//! is either accepted as whitespace or split around the obstacle nearest to
//! its centre. Accepted rectangles are fed back as obstacles so later
//! candidates cannot re-cover them.
//!
//! Known obstacles of queued entries are updated lazily: when a rectangle is
//! accepted it is appended to every queued entry it overlaps, but scores are
//! computed once at construction and never refreshed.

use std::collections::BinaryHeap;

use indexmap::{IndexMap, IndexSet};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use super::distance::{euclidean, find_index_nearest};
use crate::error::{Result, SegError};
use crate::layout::elements::{Word, dominant_glyph_size};
use crate::layout::params::WhitespaceParams;
use crate::utils::{Point, Rectangle, get_bound};

/// A candidate rectangle with the obstacles known to overlap it.
#[derive(Debug, Clone)]
pub struct QueueEntry {
    bound: Rectangle,
    quality: f64,
    obstacles: IndexSet<Rectangle>,
}

impl QueueEntry {
    pub fn new<I>(bound: Rectangle, obstacles: I) -> Self
    where
        I: IntoIterator<Item = Rectangle>,
    {
        Self {
            bound,
            quality: Self::score(&bound),
            obstacles: obstacles.into_iter().collect(),
        }
    }

    /// Scoring function `Q(r) = area * height / 4`.
    ///
    /// Tall rectangles are preferred while wide ones can still win.
    pub fn score(r: &Rectangle) -> f64 {
        r.area() * r.height() / 4.0
    }

    pub fn bound(&self) -> Rectangle {
        self.bound
    }

    pub fn quality(&self) -> f64 {
        self.quality
    }

    pub fn obstacles(&self) -> &IndexSet<Rectangle> {
        &self.obstacles
    }

    /// Records an accepted whitespace rectangle as an obstacle. The score is
    /// left untouched.
    pub fn add_whitespace(&mut self, rect: Rectangle) {
        self.obstacles.insert(rect);
    }

    /// Known obstacle whose centroid is nearest to the entry's centroid.
    ///
    /// Obstacles centred exactly on the entry are never chosen.
    pub fn pivot(&self) -> Option<Rectangle> {
        let centroids: Vec<Point> = self.obstacles.iter().map(Rectangle::centroid).collect();
        find_index_nearest(&self.bound.centroid(), &centroids, |p| *p, |p| *p, euclidean)
            .ok()
            .flatten()
            .and_then(|(idx, _)| self.obstacles.get_index(idx).copied())
    }

    /// True when the entry may be accepted as whitespace.
    ///
    /// An entry without known obstacles is empty. Otherwise no single page
    /// obstacle may cover more than `fuzziness` of the smaller of the two
    /// areas, and all obstacles together must cover less than `fuzziness` of
    /// the entry.
    pub fn is_empty_enough<'a, I>(&self, page_obstacles: I, fuzziness: f64) -> bool
    where
        I: IntoIterator<Item = &'a Rectangle>,
    {
        if self.obstacles.is_empty() {
            return true;
        }
        let area = self.bound.area();
        let mut covered = 0.0;
        for o in page_obstacles {
            let overlap = self.bound.overlapping_area(o);
            if overlap > area.min(o.area()) * fuzziness {
                return false;
            }
            covered += overlap;
        }
        covered < area * fuzziness
    }
}

/// Heap key for queue entries.
///
/// BinaryHeap is a max-heap: higher quality pops first, and among equal
/// qualities the entry enqueued first wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HeapKey {
    quality: OrderedFloat<f64>,
    seq: u64,
    slot: usize,
}

impl PartialOrd for HeapKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.quality
            .cmp(&other.quality)
            .then(other.seq.cmp(&self.seq))
    }
}

/// Result of a whitespace extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhitespaceCover {
    /// Bound the search ran in.
    pub bound: Rectangle,
    /// Accepted whitespace rectangles, in acceptance order.
    pub rectangles: Vec<Rectangle>,
    /// Number of entries dequeued.
    pub iterations: usize,
    /// True when the iteration budget ran out before the search finished.
    pub exhausted: bool,
}

/// Extracts maximal whitespace rectangles between obstacles.
#[derive(Debug, Clone, Default)]
pub struct WhitespaceExtractor {
    params: WhitespaceParams,
}

impl WhitespaceExtractor {
    pub fn new(params: WhitespaceParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &WhitespaceParams {
        &self.params
    }

    /// Runs the search inside `bound`.
    ///
    /// Degenerate obstacles are dropped. Sub-rectangles must be strictly
    /// wider than `min_width` and strictly taller than `min_height` to be
    /// explored.
    pub fn extract<I>(
        &self,
        bound: Rectangle,
        obstacles: I,
        min_width: f64,
        min_height: f64,
    ) -> WhitespaceCover
    where
        I: IntoIterator<Item = Rectangle>,
    {
        let obstacles: IndexSet<Rectangle> = obstacles
            .into_iter()
            .filter(|o| !o.is_degenerate())
            .collect();
        if bound.is_degenerate() {
            debug!(%bound, "degenerate bound, no whitespace");
            return WhitespaceCover {
                bound,
                rectangles: Vec::new(),
                iterations: 0,
                exhausted: false,
            };
        }
        Search::new(&self.params, bound, obstacles, min_width, min_height).run()
    }

    /// Runs the search over a page's words.
    ///
    /// The bound is the box enclosing all words, and the minimum
    /// sub-rectangle size is `min_size_factor` times the modal glyph size.
    ///
    /// # Errors
    /// `SegError::EmptyInput` when no word has a positive area.
    pub fn extract_from_words(&self, words: &[Word]) -> Result<WhitespaceCover> {
        let words: Vec<Word> = words
            .iter()
            .filter(|w| !w.bbox.is_degenerate())
            .cloned()
            .collect();
        let bound = get_bound(words.iter().map(|w| w.bbox)).ok_or(SegError::EmptyInput("words"))?;
        let (glyph_w, glyph_h) =
            dominant_glyph_size(&words).ok_or(SegError::EmptyInput("glyph sizes"))?;
        let factor = self.params.min_size_factor;
        Ok(self.extract(
            bound,
            words.iter().map(|w| w.bbox),
            glyph_w * factor,
            glyph_h * factor,
        ))
    }
}

/// What happened to a dequeued entry.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Step {
    Accepted(Rectangle),
    Held(Rectangle),
    Split(Rectangle),
    /// Already covered, or no obstacle to split around.
    Dropped(Rectangle),
}

/// State owned by a single extraction.
struct Search<'p> {
    params: &'p WhitespaceParams,
    bound: Rectangle,
    min_width: f64,
    min_height: f64,
    /// Page obstacles plus every accepted rectangle.
    obstacles: IndexSet<Rectangle>,
    entries: Vec<QueueEntry>,
    heap: BinaryHeap<HeapKey>,
    /// Bounds currently queued, mapped to their entry slot.
    queued: IndexMap<Rectangle, usize>,
    hold: Vec<usize>,
    selected: Vec<Rectangle>,
    seq: u64,
}

impl<'p> Search<'p> {
    fn new(
        params: &'p WhitespaceParams,
        bound: Rectangle,
        obstacles: IndexSet<Rectangle>,
        min_width: f64,
        min_height: f64,
    ) -> Self {
        let root = QueueEntry::new(bound, obstacles.iter().copied());
        let mut search = Self {
            params,
            bound,
            min_width,
            min_height,
            obstacles,
            entries: Vec::new(),
            heap: BinaryHeap::new(),
            queued: IndexMap::new(),
            hold: Vec::new(),
            selected: Vec::new(),
            seq: 0,
        };
        let slot = search.alloc(root);
        search.enqueue(slot);
        search
    }

    fn alloc(&mut self, entry: QueueEntry) -> usize {
        self.entries.push(entry);
        self.entries.len() - 1
    }

    /// Queues an entry unless one with the same bound is already queued.
    fn enqueue(&mut self, slot: usize) -> bool {
        let entry = &self.entries[slot];
        if self.queued.contains_key(&entry.bound) {
            return false;
        }
        self.queued.insert(entry.bound, slot);
        self.heap.push(HeapKey {
            quality: OrderedFloat(entry.quality),
            seq: self.seq,
            slot,
        });
        self.seq += 1;
        true
    }

    fn touches_border(&self, r: &Rectangle) -> bool {
        r.bottom == self.bound.bottom
            || r.top == self.bound.top
            || r.left == self.bound.left
            || r.right == self.bound.right
    }

    fn run(mut self) -> WhitespaceCover {
        let mut iterations = 0;
        let mut exhausted = false;

        while !self.heap.is_empty() {
            if iterations >= self.params.max_iterations {
                exhausted = true;
                warn!(
                    iterations,
                    accepted = self.selected.len(),
                    "whitespace search budget exhausted, returning partial cover"
                );
                break;
            }
            iterations += 1;

            match self.step() {
                Some(Step::Accepted(bound))
                    if self.selected.len() >= self.params.max_rectangles =>
                {
                    debug!(%bound, "rectangle cap reached");
                    break;
                }
                Some(Step::Held(bound)) => {
                    trace!(%bound, held = self.hold.len(), "holding isolated whitespace");
                }
                Some(Step::Split(bound) | Step::Dropped(bound)) => {
                    trace!(%bound, "entry not accepted");
                }
                Some(Step::Accepted(_)) => {}
                None => break,
            }
        }

        debug!(
            iterations,
            accepted = self.selected.len(),
            "whitespace search finished"
        );
        WhitespaceCover {
            bound: self.bound,
            rectangles: self.selected,
            iterations,
            exhausted,
        }
    }

    /// Pops and processes the best queued entry.
    fn step(&mut self) -> Option<Step> {
        let key = self.heap.pop()?;
        let slot = key.slot;
        let bound = self.entries[slot].bound;
        self.queued.swap_remove(&bound);

        if !self.entries[slot].is_empty_enough(&self.obstacles, self.params.fuzziness) {
            return Some(match self.entries[slot].pivot() {
                Some(pivot) => {
                    self.split(slot, bound, pivot);
                    Step::Split(bound)
                }
                None => Step::Dropped(bound),
            });
        }

        if self.selected.iter().any(|s| s.contains(&bound)) {
            return Some(Step::Dropped(bound));
        }

        // Whitespace grows from the border and from accepted rectangles;
        // isolated voids wait on the hold list.
        if !self.touches_border(&bound) && !self.selected.iter().any(|s| s.is_adjacent_to(&bound)) {
            self.hold.push(slot);
            return Some(Step::Held(bound));
        }

        self.selected.push(bound);
        debug!(%bound, count = self.selected.len(), "accepted whitespace");
        if self.selected.len() >= self.params.max_rectangles {
            return Some(Step::Accepted(bound));
        }

        self.obstacles.insert(bound);
        self.entries[slot].obstacles = IndexSet::new();

        for held in std::mem::take(&mut self.hold) {
            self.enqueue(held);
        }

        for (queued_bound, &queued_slot) in &self.queued {
            if bound.overlaps_hard(queued_bound) {
                self.entries[queued_slot].add_whitespace(bound);
            }
        }
        Some(Step::Accepted(bound))
    }

    /// Splits `b` into the parts right of, left of, below and above `pivot`.
    fn split(&mut self, slot: usize, b: Rectangle, pivot: Rectangle) {
        let parent = std::mem::take(&mut self.entries[slot].obstacles);
        let (min_w, min_h) = (self.min_width, self.min_height);
        let keep = |r: &Rectangle| r.width() > min_w && r.height() > min_h;

        let mut parts = Vec::with_capacity(4);
        let right = Rectangle::new(pivot.right, b.bottom, b.right, b.top);
        if b.right > pivot.right && keep(&right) {
            parts.push(right);
        }
        let left = Rectangle::new(b.left, b.bottom, pivot.left, b.top);
        if b.left < pivot.left && keep(&left) {
            parts.push(left);
        }
        let below = Rectangle::new(b.left, b.bottom, b.right, pivot.bottom);
        if b.bottom < pivot.bottom && keep(&below) {
            parts.push(below);
        }
        let above = Rectangle::new(b.left, pivot.top, b.right, b.top);
        if b.top > pivot.top && keep(&above) {
            parts.push(above);
        }

        trace!(%b, %pivot, parts = parts.len(), "split");
        for r in parts {
            if self.queued.contains_key(&r) {
                continue;
            }
            let entry = QueueEntry::new(r, parent.iter().filter(|o| r.overlaps_hard(o)).copied());
            let child = self.alloc(entry);
            self.enqueue(child);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(r: (f64, f64, f64, f64)) -> Rectangle {
        Rectangle::from(r)
    }

    #[test]
    fn score_prefers_tall_rectangles() {
        let tall = rect((0.0, 0.0, 10.0, 40.0));
        let wide = rect((0.0, 0.0, 40.0, 10.0));
        assert_eq!(QueueEntry::score(&tall), 400.0 * 40.0 / 4.0);
        assert!(QueueEntry::score(&tall) > QueueEntry::score(&wide));
    }

    #[test]
    fn heap_pops_best_quality_then_oldest() {
        let mut heap = BinaryHeap::new();
        for (seq, q) in [(0, 5.0), (1, 9.0), (2, 9.0), (3, 1.0)] {
            heap.push(HeapKey {
                quality: OrderedFloat(q),
                seq,
                slot: seq as usize,
            });
        }
        let order: Vec<usize> = std::iter::from_fn(|| heap.pop().map(|k| k.slot)).collect();
        assert_eq!(order, vec![1, 2, 0, 3]);
    }

    #[test]
    fn empty_enough_tolerates_small_overlaps() {
        let entry = QueueEntry::new(rect((0.0, 0.0, 10.0, 10.0)), [rect((9.5, 0.0, 20.0, 1.0))]);
        let page = [rect((9.5, 0.0, 20.0, 1.0))];
        // overlap 0.5 <= min(100, 10.5) * 0.15
        assert!(entry.is_empty_enough(&page, 0.15));

        let page = [rect((5.0, 0.0, 20.0, 10.0))];
        assert!(!entry.is_empty_enough(&page, 0.15));
    }

    #[test]
    fn empty_enough_bounds_the_total_overlap() {
        let entry = QueueEntry::new(rect((0.0, 0.0, 10.0, 10.0)), [rect((-10.0, 0.0, 1.0, 10.0))]);
        // each obstacle alone stays under its own threshold, the sum does not
        let page = [
            rect((-10.0, 0.0, 1.0, 100.0)),
            rect((9.0, -90.0, 20.0, 10.0)),
        ];
        assert!(!entry.is_empty_enough(&page, 0.15));
    }

    #[test]
    fn entry_without_known_obstacles_is_empty() {
        let entry = QueueEntry::new(rect((0.0, 0.0, 10.0, 10.0)), []);
        let page = [rect((0.0, 0.0, 10.0, 10.0))];
        assert!(entry.is_empty_enough(&page, 0.15));
    }

    #[test]
    fn add_whitespace_keeps_score() {
        let mut entry = QueueEntry::new(rect((0.0, 0.0, 10.0, 10.0)), []);
        let before = entry.quality();
        entry.add_whitespace(rect((0.0, 0.0, 5.0, 5.0)));
        entry.add_whitespace(rect((0.0, 0.0, 5.0, 5.0)));
        assert_eq!(entry.quality(), before);
        assert_eq!(entry.obstacles().len(), 1);
    }

    #[test]
    fn pivot_is_nearest_obstacle() {
        let entry = QueueEntry::new(
            rect((0.0, 0.0, 100.0, 100.0)),
            [
                rect((0.0, 0.0, 10.0, 10.0)),
                rect((45.0, 45.0, 55.0, 60.0)),
                rect((90.0, 90.0, 100.0, 100.0)),
            ],
        );
        assert_eq!(entry.pivot(), Some(rect((45.0, 45.0, 55.0, 60.0))));
        assert_eq!(QueueEntry::new(rect((0.0, 0.0, 1.0, 1.0)), []).pivot(), None);
    }

    #[test]
    fn pivot_skips_obstacles_centred_on_the_entry() {
        let entry = QueueEntry::new(
            rect((0.0, 0.0, 100.0, 100.0)),
            [rect((40.0, 40.0, 60.0, 60.0)), rect((0.0, 0.0, 10.0, 10.0))],
        );
        assert_eq!(entry.pivot(), Some(rect((0.0, 0.0, 10.0, 10.0))));

        // an obstacle covering the whole entry shares its centroid
        let full = QueueEntry::new(rect((0.0, 0.0, 10.0, 10.0)), [rect((0.0, 0.0, 10.0, 10.0))]);
        assert_eq!(full.pivot(), None);
    }

    /// A search over `(0,0)-(100,100)` whose queue holds exactly `entries`.
    fn queued_search<'p>(
        params: &'p WhitespaceParams,
        entries: &[(Rectangle, Vec<Rectangle>)],
    ) -> Search<'p> {
        let bound = rect((0.0, 0.0, 100.0, 100.0));
        let mut search = Search::new(params, bound, IndexSet::new(), 1.0, 1.0);
        search.entries.clear();
        search.heap.clear();
        search.queued.clear();
        for (r, known) in entries {
            let slot = search.alloc(QueueEntry::new(*r, known.iter().copied()));
            search.enqueue(slot);
        }
        search
    }

    #[test]
    fn isolated_void_waits_for_a_neighbour() {
        let params = WhitespaceParams::default();
        let void = rect((40.0, 40.0, 60.0, 60.0));
        let edge = rect((60.0, 45.0, 100.0, 55.0));
        let sliver = rect((80.0, 50.0, 90.0, 52.0));
        let mut search = queued_search(
            &params,
            &[(void, Vec::new()), (edge, Vec::new()), (sliver, Vec::new())],
        );

        // scores: void 2000, edge 1000, sliver 10
        assert_eq!(search.step(), Some(Step::Held(void)));
        assert_eq!(search.hold.len(), 1);
        assert!(!search.queued.contains_key(&void));

        assert_eq!(search.step(), Some(Step::Accepted(edge)));
        assert!(search.hold.is_empty());
        assert!(search.queued.contains_key(&void));

        assert_eq!(search.step(), Some(Step::Accepted(void)));
        assert_eq!(search.selected, vec![edge, void]);
    }

    #[test]
    fn accepted_whitespace_becomes_known_to_queued_entries() {
        let params = WhitespaceParams::default();
        let edge = rect((60.0, 45.0, 100.0, 55.0));
        let sliver = rect((80.0, 50.0, 90.0, 52.0));
        let apart = rect((0.0, 0.0, 5.0, 5.0));
        let mut search = queued_search(
            &params,
            &[(edge, Vec::new()), (sliver, Vec::new()), (apart, Vec::new())],
        );

        assert_eq!(search.step(), Some(Step::Accepted(edge)));
        let known = |search: &Search<'_>, r: &Rectangle| {
            search.entries[search.queued[r]].obstacles().clone()
        };
        assert!(known(&search, &sliver).contains(&edge));
        assert!(known(&search, &apart).is_empty());
        let sliver_quality = search.entries[search.queued[&sliver]].quality();
        assert_eq!(sliver_quality, QueueEntry::score(&sliver));

        // scores: apart 31.25, sliver 10. The sliver lies inside accepted
        // whitespace and has nothing left to split into.
        assert_eq!(search.step(), Some(Step::Accepted(apart)));
        assert_eq!(search.step(), Some(Step::Split(sliver)));
        assert_eq!(search.step(), None);
    }

    #[test]
    fn empty_obstacle_set_accepts_the_bound() {
        let extractor = WhitespaceExtractor::default();
        let bound = rect((0.0, 0.0, 50.0, 20.0));
        let cover = extractor.extract(bound, Vec::new(), 1.0, 1.0);
        assert_eq!(cover.rectangles, vec![bound]);
        assert_eq!(cover.iterations, 1);
        assert!(!cover.exhausted);
    }

    #[test]
    fn degenerate_obstacles_are_ignored() {
        let extractor = WhitespaceExtractor::default();
        let bound = rect((0.0, 0.0, 50.0, 20.0));
        let cover = extractor.extract(bound, vec![rect((10.0, 0.0, 10.0, 20.0))], 1.0, 1.0);
        assert_eq!(cover.rectangles, vec![bound]);
    }

    #[test]
    fn degenerate_bound_yields_nothing() {
        let extractor = WhitespaceExtractor::default();
        let cover = extractor.extract(rect((0.0, 0.0, 0.0, 20.0)), Vec::new(), 1.0, 1.0);
        assert!(cover.rectangles.is_empty());
    }
}
