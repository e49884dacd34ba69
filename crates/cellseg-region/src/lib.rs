//! cellseg-region - Region segmentation and merging for cellseg
//!
//! This crate turns an intensity image into a labeled segmentation:
//!
//! - **Connected component analysis** - Labeling connected regions of a mask
//! - **Topographic surface** - Distance-to-background damped by the gradient
//! - **Watershed segmentation** - Seeded flooding into an over-segmentation
//! - **Border graph** - Region adjacency with per-border pixel bookkeeping
//! - **Region merging** - Greedy merging driven by a shape prior and
//!   gradient contrast
//!
//! # Examples
//!
//! ## Labeling connected components
//!
//! ```
//! use cellseg_core::BinaryImage;
//! use cellseg_region::{ConnectivityType, label_connected_components};
//!
//! let mut mask = BinaryImage::new(10, 10).unwrap();
//! mask.set(1, 1, true).unwrap();
//! mask.set(2, 1, true).unwrap();
//! mask.set(7, 7, true).unwrap();
//!
//! let (_, count) = label_connected_components(&mask, ConnectivityType::FourWay).unwrap();
//! assert_eq!(count, 2);
//! ```
//!
//! ## Merging regions
//!
//! ```
//! use cellseg_core::{FloatImage, LabelImage};
//! use cellseg_region::{
//!     BorderGraph, BorderOptions, HullFeatures, MergeOptions, RegionMerger, ShapeFeatures,
//!     ShapePrior,
//! };
//!
//! let labels = LabelImage::from_data(4, 2, vec![1, 1, 2, 2, 1, 1, 2, 2]).unwrap();
//! let graph = BorderGraph::build(labels, &BorderOptions::default()).unwrap();
//! let gradient = FloatImage::new_with_value(4, 2, 1.0).unwrap();
//! let prior = ShapePrior::isotropic(vec![0.0; HullFeatures.dimension()], 1.0).unwrap();
//!
//! let mut merger =
//!     RegionMerger::new(graph, gradient, prior, HullFeatures, MergeOptions::default()).unwrap();
//! let report = merger.run().unwrap();
//! assert_eq!(report.initial_regions, 2);
//! ```

pub mod border;
pub mod conncomp;
mod error;
pub mod merge;
pub mod prior;
pub mod shape;
pub mod surface;
pub mod watershed;

pub use error::{RegionError, RegionResult};

pub use border::{BorderGraph, BorderOptions, MergeOutcome};
pub use conncomp::{ConnectivityType, label_connected_components};
pub use merge::{
    MergeOptions, MergeReport, MergeStep, RegionMerger, SegmentOptions, StepOutcome, StopReason,
    greedy_merge,
};
pub use prior::ShapePrior;
pub use shape::{HullFeatures, ShapeFeatures};
pub use surface::{Surface, SurfaceOptions, build_surface};
pub use watershed::{Flood, Segmentation, WatershedOptions, seeded_watershed, segment_watershed};
