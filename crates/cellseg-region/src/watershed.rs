//! Watershed segmentation
//!
//! This module provides the seeded watershed flood and the segmenter that
//! turns a foreground mask and topographic surface into an initial
//! over-segmentation.
//!
//! The flood is a priority flood over an 8-bit surface: one FIFO per gray
//! level, always draining the lowest non-empty level first. A pixel takes
//! the label of the front that reaches it first; a pixel that touches a
//! differently labeled pixel when it is claimed lies on a watershed line.

use crate::conncomp::{ConnectivityType, label_connected_components};
use crate::error::RegionResult;
use cellseg_core::{BinaryImage, GrayImage, LabelImage};
use cellseg_morph::regional_minima;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Options for watershed segmentation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatershedOptions {
    /// Connectivity used for seeds, flooding and line detection
    pub connectivity: ConnectivityType,
}

impl WatershedOptions {
    /// Create new options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set connectivity type
    pub fn with_connectivity(mut self, connectivity: ConnectivityType) -> Self {
        self.connectivity = connectivity;
        self
    }
}

/// Result of a seeded flood
#[derive(Debug, Clone)]
pub struct Flood {
    /// Region label of every flooded pixel (0 = never reached)
    pub labels: LabelImage,
    /// Pixels claimed while touching a different region
    pub lines: BinaryImage,
}

/// Initial over-segmentation produced by [`segment_watershed`]
#[derive(Debug, Clone)]
pub struct Segmentation {
    /// Region ids `1..=region_count`, 0 = background
    pub labels: LabelImage,
    /// Watershed-line pixels inside the foreground
    pub lines: BinaryImage,
    /// Number of regions
    pub region_count: u32,
}

/// One FIFO per gray level
struct LevelQueue {
    levels: Vec<VecDeque<(usize, u32)>>,
    current: usize,
}

impl LevelQueue {
    fn new() -> Self {
        Self {
            levels: (0..=u8::MAX as usize).map(|_| VecDeque::new()).collect(),
            current: 0,
        }
    }

    /// Queue a pixel; levels below the one being drained join it
    fn push(&mut self, level: u8, index: usize, label: u32) {
        let level = (level as usize).max(self.current);
        self.levels[level].push_back((index, label));
    }

    fn pop(&mut self) -> Option<(usize, u32)> {
        while self.current < self.levels.len() {
            if let Some(entry) = self.levels[self.current].pop_front() {
                return Some(entry);
            }
            self.current += 1;
        }
        None
    }
}

/// Flood `surface` from the nonzero pixels of `markers`
///
/// When `mask` is given, unmasked pixels are never flooded. Marker pixels
/// keep their label.
pub fn seeded_watershed(
    surface: &GrayImage,
    markers: &LabelImage,
    mask: Option<&BinaryImage>,
    options: &WatershedOptions,
) -> RegionResult<Flood> {
    surface.check_same_size(markers)?;
    if let Some(m) = mask {
        surface.check_same_size(m)?;
    }
    let offsets = options.connectivity.to_sel().neighbor_offsets();
    let inside = |i: usize| mask.is_none_or(|m| m.data()[i]);
    let levels = surface.data();

    let mut labels = markers.clone();
    let mut lines = BinaryImage::new(surface.width(), surface.height())?;
    let mut queue = LevelQueue::new();

    for i in 0..levels.len() {
        let label = labels.data()[i];
        if label == 0 {
            continue;
        }
        for &(dx, dy) in &offsets {
            if let Some(j) = surface.offset_index(i, dx, dy)
                && labels.data()[j] == 0
                && inside(j)
            {
                queue.push(levels[j], j, label);
            }
        }
    }

    while let Some((i, label)) = queue.pop() {
        if labels.data()[i] != 0 {
            continue;
        }
        labels.data_mut()[i] = label;
        for &(dx, dy) in &offsets {
            let Some(j) = surface.offset_index(i, dx, dy) else {
                continue;
            };
            match labels.data()[j] {
                0 if inside(j) => queue.push(levels[j], j, label),
                0 => {}
                other if other != label => lines.data_mut()[i] = true,
                _ => {}
            }
        }
    }

    Ok(Flood { labels, lines })
}

/// Over-segment the foreground of `mask` by flooding `surface`
///
/// Seeds are the regional minima of `surface` inside the mask, labeled
/// 1..N by connected components. The flood never leaves the mask. Every
/// connected piece of the mask holds at least one regional minimum, so every
/// foreground pixel ends up in exactly one region and every background pixel
/// stays 0.
///
/// An empty mask yields an all-zero labeling with no regions.
pub fn segment_watershed(
    mask: &BinaryImage,
    surface: &GrayImage,
    options: &WatershedOptions,
) -> RegionResult<Segmentation> {
    mask.check_same_size(surface)?;
    let (width, height) = mask.dimensions();
    if !mask.any() {
        debug!("watershed: empty foreground, no regions");
        return Ok(Segmentation {
            labels: LabelImage::new(width, height)?,
            lines: BinaryImage::new(width, height)?,
            region_count: 0,
        });
    }

    let sel = options.connectivity.to_sel();
    let minima = regional_minima(surface, Some(mask), &sel)?;
    let (markers, seeds) = label_connected_components(&minima, options.connectivity)?;
    let Flood { labels, lines } = seeded_watershed(surface, &markers, Some(mask), options)?;

    debug!("watershed: {seeds} seeds, {} line pixels", lines.count());

    Ok(Segmentation {
        labels,
        lines,
        region_count: seeds,
    })
}
