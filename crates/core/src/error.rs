//! Error types for the pagecut segmentation engine.

use thiserror::Error;

/// Primary error type for segmentation operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SegError {
    #[error("empty input: {0} must not be empty")]
    EmptyInput(&'static str),

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("invalid path: {0}")]
    InvalidPath(&'static str),

    #[error("thread pool error: {0}")]
    ThreadPool(String),
}

impl SegError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Convenience Result type alias for SegError.
pub type Result<T> = std::result::Result<T, SegError>;
