//! cellseg - Nucleus segmentation for fluorescence microscopy
//!
//! Segments an intensity image in four stages:
//!
//! 1. A topographic surface mixing distance-to-background and gradient cues
//! 2. A seeded watershed producing an over-segmentation
//! 3. A region adjacency graph with border bookkeeping
//! 4. Greedy merging of regions whose union is a more plausible shape and
//!    whose shared border is weak
//!
//! # Example
//!
//! ```
//! use cellseg::FloatImage;
//! use cellseg::region::{HullFeatures, SegmentOptions, ShapePrior, greedy_merge};
//!
//! let img = FloatImage::new_with_value(32, 32, 10.0).unwrap();
//! let prior = ShapePrior::isotropic(vec![1.0, 1.2, 0.3, 200.0, 50.0], 1e-2).unwrap();
//! let (labels, report) = greedy_merge(&img, prior, HullFeatures, &SegmentOptions::new()).unwrap();
//! assert_eq!(labels.max_label(), 0);
//! assert_eq!(report.merge_count(), 0);
//! ```

// Re-export core types (primary data structures used everywhere)
pub use cellseg_core::*;

// Re-export domain crates as modules to avoid name conflicts
pub use cellseg_filter as filter;
pub use cellseg_morph as morph;
pub use cellseg_region as region;
