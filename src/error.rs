use thiserror::Error;

/// Errors returned by the labeling, trial, and estimation routines in this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Grid has zero rows or zero columns.
    #[error("empty input")]
    EmptyInput,

    /// Grid is not square. Labeling only accepts N×N lattices.
    #[error("invalid shape: expected a square grid, found {rows}x{cols}")]
    InvalidShape {
        /// Number of rows.
        rows: usize,
        /// Number of columns.
        cols: usize,
    },

    /// Rows of different lengths, or a flat buffer of the wrong length.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Expected length.
        expected: usize,
        /// Found length.
        found: usize,
    },

    /// Invalid parameter value.
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Human-readable explanation.
        message: &'static str,
    },

    /// Algorithm name did not match any known labeler.
    #[error("unknown algorithm: {0}")]
    UnknownAlgorithm(String),

    /// Sigmoid fit did not produce a usable estimate.
    #[error("curve fit failed: {0}")]
    FitFailed(String),
}

/// Result type used by this crate.
pub type Result<T> = std::result::Result<T, Error>;
