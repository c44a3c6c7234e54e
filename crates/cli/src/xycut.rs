//! xycut - Segment pages into blocks with the recursive X-Y cut
//!
//! Reads page geometry as JSON (one page or a list of pages) and writes the
//! text blocks of every page in reading order. With `--paths` the vector
//! paths are cut instead of the words; with `--analyze` every segmentation
//! runs and pages are processed in parallel.

mod common;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use pagecut_core::api::{PageGeometry, analyze_pages, segment_blocks, segment_paths};
use pagecut_core::layout::{
    BlocksOrderer, CutOrientation, FontSizeOrderer, SegmentationParams, TextBlock, TopDownOrderer,
};
use pagecut_core::utils::Rectangle;
use serde::Serialize;
use tracing::info;

/// Orientation of the first cut.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum FirstCut {
    /// Separate rows first
    Horizontal,
    /// Separate columns first
    Vertical,
}

impl From<FirstCut> for CutOrientation {
    fn from(cut: FirstCut) -> Self {
        match cut {
            FirstCut::Horizontal => CutOrientation::Horizontal,
            FirstCut::Vertical => CutOrientation::Vertical,
        }
    }
}

/// Order of the blocks in the output.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum BlockOrder {
    /// Leaf order of the cut tree (default)
    #[default]
    Tree,
    /// Ascending average font size
    FontSize,
    /// Top to bottom, then left to right
    TopDown,
}

impl BlockOrder {
    fn apply(self, blocks: Vec<TextBlock>) -> Vec<TextBlock> {
        match self {
            Self::Tree => blocks,
            Self::FontSize => FontSizeOrderer.order(blocks),
            Self::TopDown => TopDownOrderer.order(blocks),
        }
    }
}

/// Segment pages into blocks with the recursive X-Y cut.
#[derive(Parser, Debug)]
#[command(name = "xycut")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// One or more page geometry JSON files, or "-" for stdin
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Use debug logging level
    #[arg(short = 'd', long, action = ArgAction::SetTrue)]
    debug: bool,

    /// Path to file where output is written, or "-" for stdout
    #[arg(short = 'o', long, default_value = "-")]
    outfile: String,

    /// JSON file with segmentation parameters
    #[arg(short = 'p', long)]
    params: Option<PathBuf>,

    // === Cut options ===
    /// Blocks narrower than this are never cut vertically
    #[arg(short = 'w', long = "minimum-width")]
    minimum_width: Option<f64>,

    /// Dominant glyph width (default: modal glyph width of the page)
    #[arg(long = "font-width")]
    font_width: Option<f64>,

    /// Dominant glyph height (default: modal glyph height of the page)
    #[arg(long = "font-height")]
    font_height: Option<f64>,

    /// Orientation of the cut applied to the whole page
    #[arg(short = 'F', long = "first-cut", value_enum)]
    first_cut: Option<FirstCut>,

    // === Output options ===
    /// Order of the text blocks
    #[arg(short = 'O', long, value_enum, default_value = "tree")]
    order: BlockOrder,

    /// Cut the vector paths instead of the words
    #[arg(long, action = ArgAction::SetTrue, conflicts_with = "analyze")]
    paths: bool,

    /// Run every segmentation and write the full page analysis
    #[arg(short = 'a', long, action = ArgAction::SetTrue)]
    analyze: bool,

    /// Worker threads for --analyze (default: available parallelism)
    #[arg(short = 't', long)]
    threads: Option<usize>,
}

impl Args {
    fn segmentation_params(&self) -> Result<SegmentationParams> {
        let mut params = common::load_params(self.params.as_deref())?;
        let xy = &mut params.xycut;
        if let Some(v) = self.minimum_width {
            xy.minimum_width = v;
        }
        if self.font_width.is_some() {
            xy.dominant_font_width = self.font_width;
        }
        if self.font_height.is_some() {
            xy.dominant_font_height = self.font_height;
        }
        if let Some(cut) = self.first_cut {
            xy.first_cut = cut.into();
        }
        params.validate().context("invalid parameters")?;
        Ok(params)
    }
}

#[derive(Serialize)]
struct PageBlocks {
    page_number: usize,
    blocks: Vec<TextBlock>,
}

#[derive(Serialize)]
struct PagePathBlocks {
    page_number: usize,
    blocks: Vec<Rectangle>,
}

fn text_blocks(
    pages: &[PageGeometry],
    params: &SegmentationParams,
    order: BlockOrder,
) -> Result<Vec<PageBlocks>> {
    pages
        .iter()
        .map(|page| {
            let blocks = if !page.has_words() {
                Vec::new()
            } else {
                segment_blocks(page, params)
                    .with_context(|| format!("failed to cut page {}", page.page_number))?
            };
            Ok(PageBlocks {
                page_number: page.page_number,
                blocks: order.apply(blocks),
            })
        })
        .collect()
}

fn path_blocks(
    pages: &[PageGeometry],
    params: &SegmentationParams,
) -> Result<Vec<PagePathBlocks>> {
    pages
        .iter()
        .map(|page| {
            let blocks = segment_paths(page, params)
                .with_context(|| format!("failed to cut the paths of page {}", page.page_number))?;
            Ok(PagePathBlocks {
                page_number: page.page_number,
                blocks,
            })
        })
        .collect()
}

fn main() -> Result<()> {
    let args = Args::parse();
    common::init_logging(args.debug);

    let params = args.segmentation_params()?;
    let pages = common::read_pages(&args.files)?;

    if args.analyze {
        let mut analyses = analyze_pages(&pages, &params, args.threads)?;
        for analysis in &mut analyses {
            analysis.blocks = args.order.apply(std::mem::take(&mut analysis.blocks));
        }
        info!(pages = analyses.len(), "page analysis done");
        common::write_json(&args.outfile, &analyses)
    } else if args.paths {
        let blocks = path_blocks(&pages, &params)?;
        info!(pages = blocks.len(), "path cut done");
        common::write_json(&args.outfile, &blocks)
    } else {
        let blocks = text_blocks(&pages, &params, args.order)?;
        info!(pages = blocks.len(), "x-y cut done");
        common::write_json(&args.outfile, &blocks)
    }
}
