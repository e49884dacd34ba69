//! Label image helpers
//!
//! A region is the set of pixels sharing a nonzero label. Nothing about a
//! region is stored separately; footprints and masks are derived on demand.

use super::{BinaryImage, LabelImage};
use std::collections::BTreeSet;

impl LabelImage {
    /// Largest label present (0 for an all-background image)
    pub fn max_label(&self) -> u32 {
        self.data().iter().copied().max().unwrap_or(0)
    }

    /// Distinct nonzero labels, in ascending order
    pub fn labels(&self) -> BTreeSet<u32> {
        self.data().iter().copied().filter(|&v| v != 0).collect()
    }

    /// Number of distinct nonzero labels
    pub fn region_count(&self) -> usize {
        self.labels().len()
    }

    /// Rewrite every pixel labeled `from` to `to`
    ///
    /// Returns the number of rewritten pixels.
    pub fn replace_label(&mut self, from: u32, to: u32) -> usize {
        let mut count = 0;
        for v in self.data_mut().iter_mut().filter(|v| **v == from) {
            *v = to;
            count += 1;
        }
        count
    }

    /// Linear indices of all pixels carrying `label`
    pub fn footprint(&self, label: u32) -> Vec<usize> {
        self.data()
            .iter()
            .enumerate()
            .filter_map(|(i, &v)| (v == label).then_some(i))
            .collect()
    }

    /// Binary mask of the pixels carrying `label`
    pub fn region_mask(&self, label: u32) -> BinaryImage {
        self.map(|v| v == label)
    }

    /// Binary mask of all nonzero pixels
    pub fn foreground(&self) -> BinaryImage {
        self.map(|v| v != 0)
    }
}
