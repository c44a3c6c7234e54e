//! wscover - Find the whitespace cover and column boundaries of pages
//!
//! Reads page geometry as JSON (one page or a list of pages) and writes the
//! maximal whitespace rectangles of every page, optionally refined into
//! column boundaries.

mod common;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use pagecut_core::api::{PageGeometry, segment_columns, segment_whitespace};
use pagecut_core::layout::{ColumnLayout, SegmentationParams, WhitespaceCover};
use serde::Serialize;
use tracing::info;

/// Find the maximal whitespace rectangles of pages.
#[derive(Parser, Debug)]
#[command(name = "wscover")]
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

    // === Whitespace options ===
    /// Share of a candidate's area that obstacles may cover
    #[arg(short = 'f', long)]
    fuzziness: Option<f64>,

    /// Maximum number of rectangles per page
    #[arg(short = 'n', long = "max-rectangles")]
    max_rectangles: Option<usize>,

    /// Maximum number of queue pops per page
    #[arg(long = "max-iterations")]
    max_iterations: Option<usize>,

    /// Minimum rectangle size relative to the dominant glyph size
    #[arg(long = "min-size-factor")]
    min_size_factor: Option<f64>,

    // === Column options ===
    /// Also derive column boundaries from the cover
    #[arg(short = 'c', long, action = ArgAction::SetTrue)]
    columns: bool,

    /// Minimum height-to-width ratio of a column candidate
    #[arg(long = "min-aspect-ratio")]
    min_aspect_ratio: Option<f64>,

    /// Minimum height of a column boundary
    #[arg(long = "min-height")]
    min_height: Option<f64>,
}

impl Args {
    fn segmentation_params(&self) -> Result<SegmentationParams> {
        let mut params = common::load_params(self.params.as_deref())?;
        let ws = &mut params.whitespace;
        if let Some(v) = self.fuzziness {
            ws.fuzziness = v;
        }
        if let Some(v) = self.max_rectangles {
            ws.max_rectangles = v;
        }
        if let Some(v) = self.max_iterations {
            ws.max_iterations = v;
        }
        if let Some(v) = self.min_size_factor {
            ws.min_size_factor = v;
        }
        if let Some(v) = self.min_aspect_ratio {
            params.columns.min_aspect_ratio = v;
        }
        if let Some(v) = self.min_height {
            params.columns.min_height = v;
        }
        params.validate().context("invalid parameters")?;
        Ok(params)
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum PageOutput {
    Whitespace {
        page_number: usize,
        whitespace: WhitespaceCover,
    },
    Columns {
        page_number: usize,
        #[serde(flatten)]
        layout: ColumnLayout,
    },
}

fn process_page(
    page: &PageGeometry,
    params: &SegmentationParams,
    columns: bool,
) -> Result<PageOutput> {
    let output = if columns {
        PageOutput::Columns {
            page_number: page.page_number,
            layout: segment_columns(page, params)?,
        }
    } else {
        PageOutput::Whitespace {
            page_number: page.page_number,
            whitespace: segment_whitespace(page, params)?,
        }
    };
    Ok(output)
}

fn main() -> Result<()> {
    let args = Args::parse();
    common::init_logging(args.debug);

    let params = args.segmentation_params()?;
    let pages = common::read_pages(&args.files)?;

    let outputs = pages
        .iter()
        .map(|page| {
            process_page(page, &params, args.columns)
                .with_context(|| format!("failed to segment page {}", page.page_number))
        })
        .collect::<Result<Vec<_>>>()?;

    info!(pages = outputs.len(), "whitespace cover done");
    common::write_json(&args.outfile, &outputs)
}
