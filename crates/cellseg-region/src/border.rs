//! Region adjacency and border bookkeeping
//!
//! [`BorderGraph`] owns a label image together with everything needed to
//! merge regions without rescanning it: a border-id grid, the symmetric
//! neighbor sets, the pair <-> border-id maps and the pixel list of every
//! border. All maps are ordered so iteration, and therefore tie-breaking in
//! the merge loop, is deterministic.

use crate::error::{RegionError, RegionResult};
use cellseg_core::LabelImage;
use cellseg_morph::Sel;
use std::collections::{BTreeMap, BTreeSet};

/// Options for border graph construction
#[derive(Debug, Clone, Default)]
pub struct BorderOptions {
    /// Neighborhood that decides adjacency (default: 3x3 cross)
    pub sel: Sel,
    /// Label treated like background when building the graph
    pub background: Option<u32>,
}

impl BorderOptions {
    /// Create new options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the adjacency neighborhood
    pub fn with_sel(mut self, sel: Sel) -> Self {
        self.sel = sel;
        self
    }

    /// Ignore pixels carrying `label`
    pub fn with_background(mut self, label: u32) -> Self {
        self.background = Some(label);
        self
    }
}

/// What a call to [`BorderGraph::merge_regions`] changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Surviving region (the lower id)
    pub kept: u32,
    /// Region rewritten to `kept`
    pub absorbed: u32,
    /// Border that separated the two regions, now retired
    pub border: u32,
    /// Borders of `absorbed` folded into an existing border of `kept`
    pub retired: Vec<u32>,
}

#[inline]
fn ordered(a: u32, b: u32) -> (u32, u32) {
    (a.min(b), a.max(b))
}

/// Adjacency graph of the regions of a label image
#[derive(Debug, Clone)]
pub struct BorderGraph {
    labels: LabelImage,
    borders: LabelImage,
    neighbours: BTreeMap<u32, BTreeSet<u32>>,
    pair_to_border: BTreeMap<(u32, u32), u32>,
    border_to_pair: BTreeMap<u32, (u32, u32)>,
    border_pixels: BTreeMap<u32, Vec<usize>>,
    next_border: u32,
    background: Option<u32>,
}

impl BorderGraph {
    /// Build the graph of `labels`
    ///
    /// A pixel is a border pixel when one of its SE neighbors carries a
    /// different foreground label. Border ids are handed out 1.. in the order
    /// pairs are first seen during a raster scan. A pixel next to several
    /// regions keeps the id of the last pair examined.
    pub fn build(labels: LabelImage, options: &BorderOptions) -> RegionResult<Self> {
        let offsets = options.sel.neighbor_offsets();
        if offsets.is_empty() {
            return Err(RegionError::InvalidParameters(
                "adjacency SE has no neighbors".into(),
            ));
        }
        let background = options.background;
        let is_region = |v: u32| v != 0 && Some(v) != background;

        let mut borders = LabelImage::new(labels.width(), labels.height())?;
        let mut neighbours: BTreeMap<u32, BTreeSet<u32>> = BTreeMap::new();
        let mut pair_to_border = BTreeMap::new();
        let mut border_to_pair = BTreeMap::new();
        let mut next_border = 1;

        let values = labels.data();
        for (i, &v) in values.iter().enumerate() {
            if !is_region(v) {
                continue;
            }
            neighbours.entry(v).or_default();
            for &(dx, dy) in &offsets {
                let Some(j) = labels.offset_index(i, dx, dy) else {
                    continue;
                };
                let other = values[j];
                if !is_region(other) || other == v {
                    continue;
                }
                let pair = ordered(v, other);
                let id = *pair_to_border.entry(pair).or_insert_with(|| {
                    let id = next_border;
                    next_border += 1;
                    border_to_pair.insert(id, pair);
                    id
                });
                borders.data_mut()[i] = id;
                neighbours.entry(v).or_default().insert(other);
                neighbours.entry(other).or_default().insert(v);
            }
        }

        let mut border_pixels: BTreeMap<u32, Vec<usize>> =
            border_to_pair.keys().map(|&id| (id, Vec::new())).collect();
        for (i, &id) in borders.data().iter().enumerate() {
            if id != 0 {
                border_pixels.entry(id).or_default().push(i);
            }
        }

        Ok(Self {
            labels,
            borders,
            neighbours,
            pair_to_border,
            border_to_pair,
            border_pixels,
            next_border,
            background,
        })
    }

    /// The current label image
    pub fn labels(&self) -> &LabelImage {
        &self.labels
    }

    /// The border-id grid (0 = not a border pixel)
    pub fn borders(&self) -> &LabelImage {
        &self.borders
    }

    /// Consume the graph and return the label image
    pub fn into_labels(self) -> LabelImage {
        self.labels
    }

    /// Label excluded from the graph, if any
    pub fn background(&self) -> Option<u32> {
        self.background
    }

    /// Live region ids, ascending
    pub fn regions(&self) -> impl Iterator<Item = u32> + '_ {
        self.neighbours.keys().copied()
    }

    /// Number of live regions
    pub fn region_count(&self) -> usize {
        self.neighbours.len()
    }

    /// Whether `region` is a live region
    pub fn contains_region(&self, region: u32) -> bool {
        self.neighbours.contains_key(&region)
    }

    /// Neighbors of `region`
    pub fn neighbours(&self, region: u32) -> Option<&BTreeSet<u32>> {
        self.neighbours.get(&region)
    }

    /// Number of live borders
    pub fn border_count(&self) -> usize {
        self.border_to_pair.len()
    }

    /// Live borders and their region pairs, ascending by pair
    pub fn edges(&self) -> impl Iterator<Item = ((u32, u32), u32)> + '_ {
        self.pair_to_border.iter().map(|(&pair, &id)| (pair, id))
    }

    /// Border id between two regions, in either order
    pub fn border_id(&self, a: u32, b: u32) -> Option<u32> {
        self.pair_to_border.get(&ordered(a, b)).copied()
    }

    /// Region pair `(low, high)` separated by `border`
    pub fn border_pair(&self, border: u32) -> Option<(u32, u32)> {
        self.border_to_pair.get(&border).copied()
    }

    /// Linear indices of the pixels tagged with `border`
    pub fn border_pixels(&self, border: u32) -> &[usize] {
        self.border_pixels.get(&border).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Borders touching `region`
    pub fn incident_borders(&self, region: u32) -> Vec<u32> {
        self.neighbours
            .get(&region)
            .into_iter()
            .flatten()
            .filter_map(|&n| self.border_id(region, n))
            .collect()
    }

    /// The id the next new border would receive
    pub fn next_border_id(&self) -> u32 {
        self.next_border
    }

    /// Merge two adjacent regions into the lower id
    ///
    /// The label image, border grid and maps are patched in place: the
    /// shared border is cleared, the absorbed region's neighbors are moved
    /// to the survivor, and each of its borders is either re-keyed to the
    /// survivor or folded into the survivor's existing border with the same
    /// neighbor.
    pub fn merge_regions(&mut self, a: u32, b: u32) -> RegionResult<MergeOutcome> {
        for r in [a, b] {
            if !self.contains_region(r) {
                return Err(RegionError::UnknownRegion(r));
            }
        }
        let (kept, absorbed) = ordered(a, b);
        let border = self
            .border_id(kept, absorbed)
            .ok_or(RegionError::NotAdjacent(kept, absorbed))?;

        self.labels.replace_label(absorbed, kept);

        self.pair_to_border.remove(&(kept, absorbed));
        self.border_to_pair.remove(&border);
        for i in self.border_pixels.remove(&border).unwrap_or_default() {
            self.borders.data_mut()[i] = 0;
        }

        let moved = self.neighbours.remove(&absorbed).unwrap_or_default();
        let mut retired = Vec::new();
        for n in moved.into_iter().filter(|&n| n != kept) {
            if let Some(set) = self.neighbours.get_mut(&n) {
                set.remove(&absorbed);
                set.insert(kept);
            }
            self.neighbours.entry(kept).or_default().insert(n);

            let Some(old) = self.pair_to_border.remove(&ordered(absorbed, n)) else {
                continue;
            };
            self.border_to_pair.remove(&old);
            let pair = ordered(kept, n);
            if let Some(&existing) = self.pair_to_border.get(&pair) {
                let pixels = self.border_pixels.remove(&old).unwrap_or_default();
                for &i in &pixels {
                    self.borders.data_mut()[i] = existing;
                }
                self.border_pixels.entry(existing).or_default().extend(pixels);
                retired.push(old);
            } else {
                self.pair_to_border.insert(pair, old);
                self.border_to_pair.insert(old, pair);
            }
        }
        if let Some(set) = self.neighbours.get_mut(&kept) {
            set.remove(&absorbed);
        }

        Ok(MergeOutcome {
            kept,
            absorbed,
            border,
            retired,
        })
    }

    /// Check every bookkeeping invariant against the label image
    ///
    /// Verifies that the node set equals the labels present, neighbor sets
    /// are symmetric and free of dangling ids, every adjacency has exactly
    /// one border whose maps agree, and the border grid matches the per
    /// border pixel lists.
    pub fn validate(&self) -> RegionResult<()> {
        let fail = |msg: String| Err(RegionError::GraphInvariant(msg));

        let mut present = self.labels.labels();
        if let Some(bg) = self.background {
            present.remove(&bg);
        }
        let nodes: BTreeSet<u32> = self.neighbours.keys().copied().collect();
        if present != nodes {
            return fail(format!("nodes {nodes:?} differ from labels {present:?}"));
        }

        for (&r, set) in &self.neighbours {
            for &n in set {
                if n == r {
                    return fail(format!("region {r} lists itself"));
                }
                if !self.neighbours.get(&n).is_some_and(|s| s.contains(&r)) {
                    return fail(format!("{r} -> {n} is not symmetric"));
                }
                if r < n && !self.pair_to_border.contains_key(&(r, n)) {
                    return fail(format!("adjacent pair ({r}, {n}) has no border"));
                }
            }
        }

        if self.pair_to_border.len() != self.border_to_pair.len() {
            return fail("pair and border maps differ in size".into());
        }
        for (&(a, b), &id) in &self.pair_to_border {
            if self.border_to_pair.get(&id) != Some(&(a, b)) {
                return fail(format!("border {id} does not map back to ({a}, {b})"));
            }
            if a >= b || !self.neighbours.get(&a).is_some_and(|s| s.contains(&b)) {
                return fail(format!("border {id} joins non-adjacent ({a}, {b})"));
            }
            if id >= self.next_border {
                return fail(format!("border {id} was never allocated"));
            }
        }

        let mut seen = 0;
        for (&id, pixels) in &self.border_pixels {
            if !self.border_to_pair.contains_key(&id) {
                return fail(format!("retired border {id} still owns pixels"));
            }
            if let Some(&i) = pixels.iter().find(|&&i| self.borders.data()[i] != id) {
                return fail(format!("pixel {i} is listed under border {id}"));
            }
            seen += pixels.len();
        }
        let tagged = self.borders.data().iter().filter(|&&v| v != 0).count();
        if seen != tagged {
            return fail(format!("{tagged} tagged border pixels, {seen} listed"));
        }

        Ok(())
    }
}
