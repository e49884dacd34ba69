//! cellseg-filter - Image filtering operations
//!
//! This crate provides the filtering stages of the segmentation pipeline:
//!
//! - Convolution with arbitrary and separable kernels
//! - Gaussian blur with reflected borders
//! - Exact Euclidean distance transform of a binary mask
//! - Histogram threshold selection (RC, Murphy RC, Otsu)

pub mod convolve;
pub mod distance;
mod error;
pub mod kernel;
pub mod threshold;

pub use error::{FilterError, FilterResult};
pub use kernel::Kernel;

pub use convolve::{BorderMode, convolve, convolve_sep, gaussian_blur};
pub use distance::distance_transform_edt;
pub use threshold::{
    MAX_HISTOGRAM_BINS, full_histogram, murphy_rc_threshold, otsu_threshold, rc_threshold,
};
