//! Error types for cellseg-region

use thiserror::Error;

/// Errors that can occur during region processing operations
#[derive(Debug, Error)]
pub enum RegionError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] cellseg_core::Error),

    /// Morphology error
    #[error("morphology error: {0}")]
    Morph(#[from] cellseg_morph::MorphError),

    /// Filter error
    #[error("filter error: {0}")]
    Filter(#[from] cellseg_filter::FilterError),

    /// Invalid parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// Shape prior does not match the feature extractor
    #[error("shape prior dimension mismatch: expected {expected}, got {actual}")]
    PriorDimension { expected: usize, actual: usize },

    /// Region id not present in the graph
    #[error("unknown region: {0}")]
    UnknownRegion(u32),

    /// Border id not present in the graph
    #[error("unknown border id: {0}")]
    UnknownBorder(u32),

    /// The two regions do not share a border
    #[error("regions {0} and {1} are not adjacent")]
    NotAdjacent(u32, u32),

    /// Graph bookkeeping disagrees with the label image
    #[error("graph invariant violated: {0}")]
    GraphInvariant(String),
}

/// Result type for region operations
pub type RegionResult<T> = Result<T, RegionError>;
