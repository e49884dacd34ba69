//! Error types for cellseg-filter

use thiserror::Error;

/// Errors that can occur during filtering operations
#[derive(Debug, Error)]
pub enum FilterError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] cellseg_core::Error),

    /// Invalid kernel
    #[error("invalid kernel: {0}")]
    InvalidKernel(String),

    /// Invalid parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// Sample too large for an integer histogram
    #[error("histogram range too large: sample {value} exceeds {limit} bins")]
    HistogramRange { value: f32, limit: usize },
}

/// Result type for filtering operations
pub type FilterResult<T> = Result<T, FilterError>;
