//! High-level segmentation API.
//!
//! Provides page-level entry points over already extracted page geometry:
//! - `segment_whitespace()` - maximal whitespace rectangles
//! - `segment_columns()` - whitespace plus column boundaries
//! - `segment_blocks()` - X-Y cut text blocks in reading order
//! - `segment_paths()` - X-Y cut blocks over vector paths
//! - `analyze_page()` / `analyze_pages()` - everything, pages in parallel

use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{Result, SegError};
use crate::geometry::PagePath;
use crate::layout::{
    ColumnLayout, ColumnSegmenter, SegmentationParams, TextBlock, WhitespaceCover,
    WhitespaceExtractor, Word, XYCut, XYNode,
};
use crate::utils::Rectangle;

pub(crate) fn default_thread_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Geometry of one page as delivered by a text extractor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageGeometry {
    /// Zero-based page index.
    pub page_number: usize,
    /// Page box. Only used as the search area of pages without words.
    pub bound: Option<Rectangle>,
    pub words: Vec<Word>,
    pub paths: Vec<PagePath>,
}

impl PageGeometry {
    pub fn new(words: Vec<Word>) -> Self {
        Self {
            words,
            ..Default::default()
        }
    }

    /// True when at least one word has a positive area.
    pub fn has_words(&self) -> bool {
        self.words.iter().any(|w| !w.bbox.is_degenerate())
    }

    fn drawn_paths(&self) -> Vec<PagePath> {
        self.paths
            .iter()
            .filter(|p| p.bounding_box().is_some())
            .cloned()
            .collect()
    }
}

/// Everything computed for one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageAnalysis {
    pub page_number: usize,
    /// `None` for pages without words.
    pub columns: Option<ColumnLayout>,
    pub blocks: Vec<TextBlock>,
    pub path_blocks: Vec<Rectangle>,
}

/// Whitespace cover of a page.
///
/// The search area is the box enclosing the words. A page without words of
/// positive area but with a known bound is one whitespace rectangle.
///
/// # Errors
/// `SegError::EmptyInput` when the page has neither such words nor a bound.
pub fn segment_whitespace(
    page: &PageGeometry,
    params: &SegmentationParams,
) -> Result<WhitespaceCover> {
    let extractor = WhitespaceExtractor::new(params.whitespace.clone())?;
    match page.bound {
        Some(bound) if !page.has_words() => Ok(extractor.extract(bound, Vec::new(), 0.0, 0.0)),
        _ => extractor.extract_from_words(&page.words),
    }
}

/// Whitespace cover and column boundaries of a page.
pub fn segment_columns(page: &PageGeometry, params: &SegmentationParams) -> Result<ColumnLayout> {
    ColumnSegmenter::new(params.whitespace.clone(), params.columns.clone())?.segment(&page.words)
}

/// Text blocks of a page in reading order.
pub fn segment_blocks(page: &PageGeometry, params: &SegmentationParams) -> Result<Vec<TextBlock>> {
    XYCut::for_words(&params.xycut, &page.words)?.text_blocks(&page.words)
}

/// Blocks of a page's vector paths in reading order.
///
/// Dominant glyph sizes fall back to the page's words when not set.
///
/// # Errors
/// `SegError::EmptyInput` when no path draws anything, and
/// `SegError::InvalidParameter` when dominant sizes are neither set nor
/// derivable from words.
pub fn segment_paths(page: &PageGeometry, params: &SegmentationParams) -> Result<Vec<Rectangle>> {
    let paths = page.drawn_paths();
    if paths.is_empty() {
        return Err(SegError::EmptyInput("paths"));
    }
    let cut = if !page.has_words() {
        XYCut::from_params(&params.xycut)?
    } else {
        XYCut::for_words(&params.xycut, &page.words)?
    };
    let tree: XYNode<PagePath> = cut.build(&paths)?;
    Ok(tree.leaves().into_iter().map(XYNode::bbox).collect())
}

/// Runs every segmentation on one page.
///
/// Pages without words of positive area get no columns or text blocks;
/// pages whose paths cannot be cut get no path blocks.
#[instrument(skip_all, fields(page = page.page_number, words = page.words.len()))]
pub fn analyze_page(page: &PageGeometry, params: &SegmentationParams) -> Result<PageAnalysis> {
    params.validate()?;

    let (columns, blocks) = if !page.has_words() {
        (None, Vec::new())
    } else {
        (
            Some(segment_columns(page, params)?),
            segment_blocks(page, params)?,
        )
    };

    let path_blocks = match segment_paths(page, params) {
        Ok(blocks) => blocks,
        Err(SegError::EmptyInput(_)) => Vec::new(),
        Err(SegError::InvalidParameter { name, .. }) if !page.has_words() => {
            debug!(name, "no dominant glyph size for paths, skipping path blocks");
            Vec::new()
        }
        Err(e) => return Err(e),
    };

    Ok(PageAnalysis {
        page_number: page.page_number,
        columns,
        blocks,
        path_blocks,
    })
}

/// Analyzes pages in parallel, results in input order.
///
/// `threads` defaults to the available parallelism.
pub fn analyze_pages(
    pages: &[PageGeometry],
    params: &SegmentationParams,
    threads: Option<usize>,
) -> Result<Vec<PageAnalysis>> {
    params.validate()?;
    let thread_count = threads.unwrap_or_else(default_thread_count).max(1);
    let pool = ThreadPoolBuilder::new()
        .num_threads(thread_count)
        .build()
        .map_err(|e| SegError::ThreadPool(e.to_string()))?;

    let mut results: Vec<(usize, Result<PageAnalysis>)> = pool.install(|| {
        pages
            .par_iter()
            .enumerate()
            .map(|(idx, page)| (idx, analyze_page(page, params)))
            .collect()
    });

    results.sort_by_key(|(idx, _)| *idx);
    results.into_iter().map(|(_, result)| result).collect()
}
