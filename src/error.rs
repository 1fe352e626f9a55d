//! Error types.

use thiserror::Error;

/// Errors raised while building or drawing a scene.
///
/// Pool sizing and unknown draw classes indicate a coding defect in the
/// caller and are never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// A draw pool was configured with zero initial objects.
    #[error("draw pool '{0}' must be created with a pool size greater than zero")]
    InvalidPoolSize(String),
    /// A draw pool was configured to grow by zero objects.
    #[error("draw pool '{0}' must be created with a step size greater than zero")]
    InvalidStepSize(String),
    /// A draw call named a class no pool was registered for.
    #[error("unknown draw class '{0}'")]
    UnknownDrawClass(String),
    /// The GPU surface failed to create or use a resource.
    #[error("surface error: {0}")]
    Surface(String),
}

impl From<String> for RenderError {
    fn from(message: String) -> Self {
        RenderError::Surface(message)
    }
}

/// Errors raised while parsing a region string such as `chr1:100-200`.
#[derive(Error, Debug)]
pub enum RegionError {
    /// The string is not of the form `name:start-end`.
    #[error("invalid region format: expected 'name:start-end', got '{0}'")]
    InvalidFormat(String),
    /// A coordinate is not an unsigned integer.
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(#[from] std::num::ParseIntError),
    /// The end lies before the start, or the 1-indexed start is zero.
    #[error("invalid genomic coordinates: {start}-{end}")]
    InvalidRange {
        /// Start coordinate as given.
        start: u64,
        /// End coordinate as given.
        end: u64,
    },
}

/// Errors raised while loading a [`StyleConfig`](crate::style::StyleConfig).
#[derive(Error, Debug)]
pub enum StyleError {
    /// A color string is not a 24-bit hex code.
    #[error("{0} is not a valid hex code")]
    InvalidHex(String),
    /// The theme document is not valid JSON for a style config.
    #[error("invalid style config: {0}")]
    Json(#[from] serde_json::Error),
}
