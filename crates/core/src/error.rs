//! Error types for terroir

use thiserror::Error;

/// Main error type for terroir operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Raster size mismatch: expected ({er}, {ec}), got ({ar}, {ac})")]
    SizeMismatch { er: usize, ec: usize, ar: usize, ac: usize },

    #[error("Series length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// Too few valid samples to interpolate a series.
    #[error("Insufficient data: {valid} valid samples, at least {required} required")]
    InsufficientData { valid: usize, required: usize },

    /// Smoothing window wider than the series it is applied to.
    #[error("Smoothing window of {window} samples exceeds series length {len}")]
    WindowTooLarge { window: usize, len: usize },

    /// The reference series failed landmark extraction; nothing can be ranked.
    #[error("Reference series unusable: {0}")]
    ReferenceUnusable(#[source] Box<Error>),

    /// Ranking ran to completion but nothing cleared the similarity threshold.
    #[error("No match found: {evaluated} candidates evaluated, none scored >= {threshold}")]
    NoMatchFound { evaluated: usize, threshold: f64 },

    #[error("Algorithm error: {0}")]
    Algorithm(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error rejects a single series rather than the whole run.
    ///
    /// `InsufficientData` and `WindowTooLarge` are handled identically by
    /// callers: the offending candidate is skipped.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Error::InsufficientData { .. } | Error::WindowTooLarge { .. })
    }
}

/// Result type alias for terroir operations
pub type Result<T> = std::result::Result<T, Error>;
