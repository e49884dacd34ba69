//! cellseg core - Basic data structures for nucleus segmentation
//!
//! This crate provides the 2-D grids shared by every stage of the
//! segmentation pipeline:
//!
//! - [`Image`] - Row-major 2-D grid, generic over the sample type
//! - [`GrayImage`] - 8-bit topographic surfaces
//! - [`FloatImage`] - Intensity, gradient and distance maps
//! - [`LabelImage`] - Region labelings and border-id grids (0 = background)
//! - [`BinaryImage`] - Foreground masks and watershed-line masks
//!
//! # Example
//!
//! ```
//! use cellseg_core::LabelImage;
//!
//! let mut labels = LabelImage::from_data(3, 1, vec![1, 2, 2]).unwrap();
//! assert_eq!(labels.replace_label(2, 1), 2);
//! assert_eq!(labels.region_count(), 1);
//! ```

pub mod error;
pub mod image;

pub use error::{Error, Result};
pub use image::{BinaryImage, FloatImage, GrayImage, Image, LabelImage};
