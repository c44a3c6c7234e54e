//! Layout analysis for page segmentation.
//!
//! This module contains:
//! - Page elements (letters, words, text lines, text blocks)
//! - Segmentation parameters
//! - Whitespace, column and X-Y cut algorithms
//! - Reading-order heuristics

pub mod analysis;
pub mod elements;
pub mod ordering;
pub mod params;

// Re-export params
pub use params::*;

// Re-export element types
pub use elements::*;

// Re-export analysis types and functions
pub use analysis::*;

pub use ordering::{BlocksOrderer, FontSizeOrderer, TopDownOrderer};
