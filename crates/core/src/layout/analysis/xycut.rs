//! Recursive X-Y cut page segmentation.
//!
//! Items are projected onto one axis, the projection is split where the gap
//! between consecutive items exceeds the dominant glyph size, and every
//! group is cut again along the other axis. Leaves of the resulting tree are
//! the page's blocks; their traversal order is the reading order.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use crate::error::{Result, SegError};
use crate::layout::elements::{TextBlock, Word, dominant_glyph_size};
use crate::layout::params::{CutOrientation, XYCutParams};
use crate::utils::{HasBBox, Rectangle, get_bound};

/// A node of the block tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum XYNode<T> {
    /// A block: items in input order with their enclosing box.
    Leaf { bbox: Rectangle, items: Vec<T> },
    /// A cut: children in creation order, lost items last.
    Node {
        bbox: Rectangle,
        orientation: CutOrientation,
        children: Vec<XYNode<T>>,
    },
}

impl<T> XYNode<T> {
    pub fn bbox(&self) -> Rectangle {
        match self {
            Self::Leaf { bbox, .. } | Self::Node { bbox, .. } => *bbox,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf { .. })
    }

    /// Leaves in reading order.
    ///
    /// Under every node, leaf children come first in creation order, then
    /// the remaining children left to right below a vertical cut or top to
    /// bottom below a horizontal cut.
    pub fn leaves(&self) -> Vec<&XYNode<T>> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a XYNode<T>>) {
        let (orientation, children) = match self {
            Self::Leaf { .. } => {
                out.push(self);
                return;
            }
            Self::Node {
                orientation,
                children,
                ..
            } => (*orientation, children),
        };

        out.extend(children.iter().filter(|c| c.is_leaf()));

        let mut nodes: Vec<&XYNode<T>> = children.iter().filter(|c| !c.is_leaf()).collect();
        match orientation {
            CutOrientation::Vertical => {
                nodes.sort_by(|a, b| a.bbox().left.total_cmp(&b.bbox().left));
            }
            CutOrientation::Horizontal => {
                nodes.sort_by(|a, b| b.bbox().top.total_cmp(&a.bbox().top));
            }
        }
        for node in nodes {
            node.collect_leaves(out);
        }
    }

    /// Items of every leaf, in reading order.
    pub fn items(&self) -> Vec<&T> {
        self.leaves()
            .into_iter()
            .flat_map(|leaf| match leaf {
                Self::Leaf { items, .. } => items.iter().collect::<Vec<_>>(),
                Self::Node { .. } => Vec::new(),
            })
            .collect()
    }

    pub fn depth(&self) -> usize {
        match self {
            Self::Leaf { .. } => 1,
            Self::Node { children, .. } => {
                1 + children.iter().map(XYNode::depth).max().unwrap_or(0)
            }
        }
    }
}

fn span(r: &Rectangle, orientation: CutOrientation) -> (f64, f64) {
    match orientation {
        CutOrientation::Vertical => (r.left, r.right),
        CutOrientation::Horizontal => (r.bottom, r.top),
    }
}

/// X-Y cut segmenter with resolved thresholds.
#[derive(Debug, Clone, PartialEq)]
pub struct XYCut {
    pub minimum_width: f64,
    pub dominant_font_width: f64,
    pub dominant_font_height: f64,
    pub first_cut: CutOrientation,
}

impl XYCut {
    pub fn new(
        minimum_width: f64,
        dominant_font_width: f64,
        dominant_font_height: f64,
        first_cut: CutOrientation,
    ) -> Self {
        Self {
            minimum_width,
            dominant_font_width,
            dominant_font_height,
            first_cut,
        }
    }

    /// Resolves `params` against a page's words. Missing dominant sizes are
    /// the modal glyph width and height.
    pub fn for_words(params: &XYCutParams, words: &[Word]) -> Result<Self> {
        params.validate()?;
        let (width, height) = match (params.dominant_font_width, params.dominant_font_height) {
            (Some(w), Some(h)) => (w, h),
            (w, h) => {
                let (gw, gh) =
                    dominant_glyph_size(words).ok_or(SegError::EmptyInput("words"))?;
                (w.unwrap_or(gw), h.unwrap_or(gh))
            }
        };
        Ok(Self::new(params.minimum_width, width, height, params.first_cut))
    }

    /// Resolves `params` when no glyphs are available. Both dominant sizes
    /// must be set.
    pub fn from_params(params: &XYCutParams) -> Result<Self> {
        params.validate()?;
        let width = params
            .dominant_font_width
            .ok_or_else(|| SegError::invalid("dominant_font_width", "required without words"))?;
        let height = params
            .dominant_font_height
            .ok_or_else(|| SegError::invalid("dominant_font_height", "required without words"))?;
        Ok(Self::new(params.minimum_width, width, height, params.first_cut))
    }

    fn dominant(&self, orientation: CutOrientation) -> f64 {
        match orientation {
            CutOrientation::Vertical => self.dominant_font_width,
            CutOrientation::Horizontal => self.dominant_font_height,
        }
    }

    /// Builds the block tree over `items`.
    ///
    /// # Errors
    /// `SegError::EmptyInput` when `items` is empty.
    #[instrument(skip_all, fields(items = items.len()))]
    pub fn build<T: HasBBox + Clone>(&self, items: &[T]) -> Result<XYNode<T>> {
        if items.is_empty() {
            return Err(SegError::EmptyInput("items"));
        }
        let boxes: Vec<Rectangle> = items.iter().map(HasBBox::bbox).collect();
        let indices: Vec<usize> = (0..items.len()).collect();
        let tree = self.cut(items, &boxes, indices, self.first_cut, 0);
        debug!(
            leaves = tree.leaves().len(),
            depth = tree.depth(),
            "x-y cut finished"
        );
        Ok(tree)
    }

    /// Cuts words into text blocks in reading order.
    pub fn text_blocks(&self, words: &[Word]) -> Result<Vec<TextBlock>> {
        let tree = self.build(words)?;
        Ok(tree
            .leaves()
            .into_iter()
            .filter_map(|leaf| match leaf {
                XYNode::Leaf { items, .. } => TextBlock::from_words(items),
                XYNode::Node { .. } => None,
            })
            .collect())
    }

    fn leaf<T: Clone>(items: &[T], boxes: &[Rectangle], indices: &[usize]) -> XYNode<T> {
        XYNode::Leaf {
            bbox: get_bound(indices.iter().map(|&i| boxes[i])).unwrap_or_default(),
            items: indices.iter().map(|&i| items[i].clone()).collect(),
        }
    }

    fn cut<T: Clone>(
        &self,
        items: &[T],
        boxes: &[Rectangle],
        indices: Vec<usize>,
        orientation: CutOrientation,
        mut level: u32,
    ) -> XYNode<T> {
        if indices.len() <= 1 {
            return Self::leaf(items, boxes, &indices);
        }
        if orientation == CutOrientation::Vertical {
            let width = get_bound(indices.iter().map(|&i| boxes[i]))
                .map(|b| b.width())
                .unwrap_or_default();
            if width <= self.minimum_width {
                return Self::leaf(items, boxes, &indices);
            }
        }

        let projections = self.project(boxes, &indices, orientation);
        trace!(?orientation, level, items = indices.len(), projections = projections.len(), "cut");

        if orientation == CutOrientation::Horizontal && projections.len() == 1 {
            // One extra level of leniency, then give up on this branch.
            if level >= 1 {
                return Self::leaf(items, boxes, &indices);
            }
            level += 1;
        }

        let mut assigned = vec![false; indices.len()];
        let mut children = Vec::new();
        for (p0, p1) in projections {
            let group: Vec<usize> = indices
                .iter()
                .enumerate()
                .filter(|&(pos, &i)| {
                    let (start, end) = span(&boxes[i], orientation);
                    let inside = start >= p0 && end <= p1;
                    if inside {
                        assigned[pos] = true;
                    }
                    inside
                })
                .map(|(_, &i)| i)
                .collect();
            if !group.is_empty() {
                children.push(self.cut(items, boxes, group, orientation.flip(), level));
            }
        }

        for (pos, &i) in indices.iter().enumerate() {
            if !assigned[pos] {
                trace!(item = i, "lost item kept as its own block");
                children.push(Self::leaf(items, boxes, &[i]));
            }
        }

        XYNode::Node {
            bbox: get_bound(children.iter().map(XYNode::bbox)).unwrap_or_default(),
            orientation,
            children,
        }
    }

    /// Projection spans of the items along the cut axis.
    ///
    /// Items are walked in order of their start coordinate. A span grows
    /// while the next item overlaps it or is no further than the dominant
    /// glyph size away, and for vertical cuts while the span is narrower
    /// than `minimum_width`. A trailing item separated by a wider gap closes
    /// no span of its own.
    fn project(
        &self,
        boxes: &[Rectangle],
        indices: &[usize],
        orientation: CutOrientation,
    ) -> Vec<(f64, f64)> {
        let mut sorted: Vec<(f64, f64)> = indices
            .iter()
            .map(|&i| span(&boxes[i], orientation))
            .collect();
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

        let dominant = self.dominant(orientation);
        let last = sorted.len() - 1;
        let mut projections = Vec::new();
        let (mut p0, mut p1) = sorted[0];

        for (i, &(start, end)) in sorted.iter().enumerate().skip(1) {
            if start <= p1 {
                p1 = p1.max(end);
            } else if start - p1 <= dominant {
                p1 = end;
            } else if orientation == CutOrientation::Vertical && p1 - p0 < self.minimum_width {
                p1 = end;
            } else if i != last {
                projections.push((p0, p1));
                (p0, p1) = (start, end);
            }

            if i == last {
                projections.push((p0, p1));
            }
        }
        projections
    }
}
