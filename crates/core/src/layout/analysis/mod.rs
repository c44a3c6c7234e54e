//! Page segmentation algorithms.
//!
//! Contains:
//! - Maximal whitespace rectangle extraction
//! - Column boundary detection on top of the whitespace cover
//! - Recursive X-Y cut block segmentation
//! - Nearest-neighbour helpers shared by the above

mod columns;
mod distance;
mod whitespace;
mod xycut;

pub use columns::{
    ColumnLayout, ColumnSegmenter, SideSupport, adjust_height, column_candidates,
    filter_combinations, side_support,
};
pub use distance::{euclidean, find_index_nearest, manhattan};
pub use whitespace::{QueueEntry, WhitespaceCover, WhitespaceExtractor};
pub use xycut::{XYCut, XYNode};
