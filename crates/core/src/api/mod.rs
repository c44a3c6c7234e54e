//! High-level API module for page segmentation.
//!
//! # Example
//!
//! ```ignore
//! use pagecut_core::api::{PageGeometry, analyze_pages};
//! use pagecut_core::layout::SegmentationParams;
//!
//! let pages: Vec<PageGeometry> = serde_json::from_str(&input)?;
//! let results = analyze_pages(&pages, &SegmentationParams::default(), None)?;
//! ```

pub mod high_level;

// Re-export for convenience
pub use high_level::{
    PageAnalysis, PageGeometry, analyze_page, analyze_pages, segment_blocks, segment_columns,
    segment_paths, segment_whitespace,
};
