//! Connected component analysis
//!
//! This module labels connected components of a binary mask with a two-pass
//! scan and a union-find over provisional labels. Final labels are
//! consecutive, assigned 1.. in raster order of each component's first
//! pixel.

use crate::error::RegionResult;
use cellseg_core::{BinaryImage, LabelImage};
use cellseg_morph::Sel;
use serde::{Deserialize, Serialize};

/// Connectivity type for component analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectivityType {
    /// 4-way connectivity (up, down, left, right)
    #[default]
    FourWay,
    /// 8-way connectivity (includes diagonals)
    EightWay,
}

impl ConnectivityType {
    /// The 3x3 structuring element describing this connectivity
    pub fn to_sel(self) -> Sel {
        match self {
            ConnectivityType::FourWay => Sel::cross(),
            ConnectivityType::EightWay => Sel::square(),
        }
    }

    /// Neighbors already visited by a raster scan
    fn backward_offsets(self) -> &'static [(i32, i32)] {
        match self {
            ConnectivityType::FourWay => &[(-1, 0), (0, -1)],
            ConnectivityType::EightWay => &[(-1, 0), (-1, -1), (0, -1), (1, -1)],
        }
    }
}

/// Disjoint sets over provisional labels; slot 0 is unused
struct UnionFind {
    parent: Vec<u32>,
}

impl UnionFind {
    fn new() -> Self {
        Self { parent: vec![0] }
    }

    fn make_set(&mut self) -> u32 {
        let id = self.parent.len() as u32;
        self.parent.push(id);
        id
    }

    fn find(&mut self, mut x: u32) -> u32 {
        while self.parent[x as usize] != x {
            let grandparent = self.parent[self.parent[x as usize] as usize];
            self.parent[x as usize] = grandparent;
            x = grandparent;
        }
        x
    }

    fn union(&mut self, a: u32, b: u32) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            let (lo, hi) = (ra.min(rb), ra.max(rb));
            self.parent[hi as usize] = lo;
        }
    }
}

/// Label all connected components in a binary mask
///
/// Returns the label image (0 = background) and the number of components.
pub fn label_connected_components(
    mask: &BinaryImage,
    connectivity: ConnectivityType,
) -> RegionResult<(LabelImage, u32)> {
    let mut labels = LabelImage::new(mask.width(), mask.height())?;
    let offsets = connectivity.backward_offsets();
    let fg = mask.data();
    let mut sets = UnionFind::new();

    {
        let data = labels.data_mut();
        for i in 0..fg.len() {
            if !fg[i] {
                continue;
            }
            let mut current = 0;
            for &(dx, dy) in offsets {
                let Some(j) = mask.offset_index(i, dx, dy) else {
                    continue;
                };
                let other = data[j];
                if other == 0 {
                    continue;
                }
                if current == 0 {
                    current = other;
                } else {
                    sets.union(current, other);
                }
            }
            data[i] = if current == 0 { sets.make_set() } else { current };
        }
    }

    let mut remap = vec![0u32; sets.parent.len()];
    let mut count = 0;
    for v in labels.data_mut().iter_mut().filter(|v| **v != 0) {
        let root = sets.find(*v) as usize;
        if remap[root] == 0 {
            count += 1;
            remap[root] = count;
        }
        *v = remap[root];
    }

    Ok((labels, count))
}
