//! cellseg-morph - Morphological operations for segmentation
//!
//! This crate provides the morphology primitives the watershed pipeline is
//! built from:
//!
//! - Structuring elements (SEL) for defining operation neighborhoods
//! - Grayscale dilation, erosion and the morphological gradient
//! - Regional minima detection (watershed seeds)

mod error;
pub mod extrema;
pub mod grayscale;
pub mod sel;

pub use error::{MorphError, MorphResult};
pub use sel::{Sel, SelElement};

pub use extrema::regional_minima;
pub use grayscale::{dilate_gray, erode_gray, gradient_gray};
