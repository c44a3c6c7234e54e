//! Segmentation parameters.
//!
//! The constants below were tuned empirically on real documents. They are
//! exposed so callers can adapt them to unusual layouts instead of relying on
//! hard-coded literals.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SegError};

/// Parameters for the maximal whitespace rectangle extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WhitespaceParams {
    /// Fraction of a candidate's area that obstacles may cover while the
    /// candidate still counts as empty. Also scales the pairwise overlap
    /// threshold.
    pub fuzziness: f64,

    /// Maximum number of whitespace rectangles returned.
    pub max_rectangles: usize,

    /// Upper bound on dequeued entries before the search gives up and
    /// returns what it has.
    pub max_iterations: usize,

    /// Minimum sub-rectangle size, relative to the modal glyph width and
    /// height on the page.
    pub min_size_factor: f64,
}

impl Default for WhitespaceParams {
    fn default() -> Self {
        Self {
            fuzziness: 0.15,
            max_rectangles: 30,
            max_iterations: 100_000,
            min_size_factor: 1.25,
        }
    }
}

impl WhitespaceParams {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.fuzziness) {
            return Err(SegError::invalid(
                "fuzziness",
                format!("{} is not in [0, 1]", self.fuzziness),
            ));
        }
        if self.max_rectangles == 0 {
            return Err(SegError::invalid("max_rectangles", "must be at least 1"));
        }
        if self.max_iterations == 0 {
            return Err(SegError::invalid("max_iterations", "must be at least 1"));
        }
        if !(self.min_size_factor >= 0.0) {
            return Err(SegError::invalid(
                "min_size_factor",
                format!("{} is negative", self.min_size_factor),
            ));
        }
        Ok(())
    }
}

/// Parameters for column boundary extraction, height adjustment and
/// combination filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnParams {
    /// Candidates with `height / width` below this ratio are too squat to
    /// separate columns.
    pub min_aspect_ratio: f64,

    /// A word counts as adjacent content when its gap to the candidate is at
    /// most this distance.
    pub adjacency_gap: f64,

    /// A candidate with no content on one side survives only when the other
    /// side has at least this many adjacent words.
    pub lone_side_support: usize,

    /// Adjacent words required on at least one side to accept a candidate.
    pub min_support: usize,

    /// Step of the vertical scan used by height adjustment.
    pub scan_step: f64,

    /// Lower bound on final column height. 0 keeps every column.
    pub min_height: f64,
}

impl Default for ColumnParams {
    fn default() -> Self {
        Self {
            min_aspect_ratio: 1.5,
            adjacency_gap: 10.0,
            lone_side_support: 8,
            min_support: 4,
            scan_step: 1.0,
            min_height: 0.0,
        }
    }
}

impl ColumnParams {
    pub fn validate(&self) -> Result<()> {
        if !(self.scan_step > 0.0) {
            return Err(SegError::invalid(
                "scan_step",
                format!("{} is not positive", self.scan_step),
            ));
        }
        if !(self.adjacency_gap >= 0.0) {
            return Err(SegError::invalid(
                "adjacency_gap",
                format!("{} is negative", self.adjacency_gap),
            ));
        }
        if !(self.min_aspect_ratio >= 0.0) {
            return Err(SegError::invalid(
                "min_aspect_ratio",
                format!("{} is negative", self.min_aspect_ratio),
            ));
        }
        Ok(())
    }
}

/// Orientation of an X-Y cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CutOrientation {
    /// Cuts along vertical lines, separating items left to right.
    Vertical,
    /// Cuts along horizontal lines, separating items bottom to top.
    Horizontal,
}

impl CutOrientation {
    pub const fn flip(self) -> Self {
        match self {
            Self::Vertical => Self::Horizontal,
            Self::Horizontal => Self::Vertical,
        }
    }
}

/// Parameters for the recursive X-Y cut.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct XYCutParams {
    /// Blocks narrower than this are never cut vertically.
    pub minimum_width: f64,

    /// Horizontal gaps up to this size do not cause a vertical cut. `None`
    /// derives it from the modal glyph width of the words being cut.
    pub dominant_font_width: Option<f64>,

    /// Vertical gaps up to this size do not cause a horizontal cut. `None`
    /// derives it from the modal glyph height of the words being cut.
    pub dominant_font_height: Option<f64>,

    /// Orientation of the cut applied to the whole page.
    pub first_cut: CutOrientation,
}

impl Default for XYCutParams {
    fn default() -> Self {
        Self {
            minimum_width: 0.0,
            dominant_font_width: None,
            dominant_font_height: None,
            first_cut: CutOrientation::Horizontal,
        }
    }
}

impl XYCutParams {
    pub fn validate(&self) -> Result<()> {
        if !(self.minimum_width >= 0.0) {
            return Err(SegError::invalid(
                "minimum_width",
                format!("{} is negative", self.minimum_width),
            ));
        }
        for (name, value) in [
            ("dominant_font_width", self.dominant_font_width),
            ("dominant_font_height", self.dominant_font_height),
        ] {
            if let Some(v) = value
                && !(v >= 0.0)
            {
                return Err(SegError::invalid(name, format!("{v} is negative")));
            }
        }
        Ok(())
    }
}

/// All segmentation parameters, as loaded by the command line tools.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationParams {
    pub whitespace: WhitespaceParams,
    pub columns: ColumnParams,
    pub xycut: XYCutParams,
}

impl SegmentationParams {
    pub fn validate(&self) -> Result<()> {
        self.whitespace.validate()?;
        self.columns.validate()?;
        self.xycut.validate()
    }
}
