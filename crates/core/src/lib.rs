//! pagecut - page segmentation for extracted PDF geometry.
//!
//! Finds maximal whitespace rectangles, column boundaries and reading-order
//! text blocks from word and path bounding boxes produced upstream by a PDF
//! text extractor.

pub mod api;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod utils;

// Re-export high_level at the crate root
pub use api::high_level;

pub use error::{Result, SegError};
