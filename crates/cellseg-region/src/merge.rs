//! Statistical region merging
//!
//! [`RegionMerger`] repeatedly merges the pair of adjacent regions with the
//! highest score until no score reaches the threshold `beta`. The score of a
//! border between regions `c0` and `c1` is the product of two ratios:
//!
//! - shape: `exp(ln 2 + logS(c0 | c1) - logS(c0) - logS(c1))`, with the log
//!   odds clamped to `[-clamp, clamp]`, where `logS` is the prior
//!   log-likelihood of a mask's shape features
//! - gradient: mean gradient over the two regions, averaged, divided by the
//!   mean gradient over the border pixels
//!
//! Ties go to the lowest region pair. Scores are cached per border and
//! dropped for every border of the surviving region after each merge.

use crate::border::{BorderGraph, BorderOptions, MergeOutcome};
use crate::error::{RegionError, RegionResult};
use crate::prior::ShapePrior;
use crate::shape::ShapeFeatures;
use crate::surface::{SurfaceOptions, build_surface};
use crate::watershed::{WatershedOptions, segment_watershed};
use cellseg_core::{BinaryImage, FloatImage, LabelImage};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f64::consts::LN_2;

/// Options for the greedy merge loop
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeOptions {
    /// Stop once the best score falls below this value
    pub beta: f64,
    /// Upper bound on the number of merges
    pub max_merges: Option<usize>,
    /// Bound on the absolute shape log odds
    pub log_odds_clamp: f64,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            beta: 1.2,
            max_merges: None,
            log_odds_clamp: 100.0,
        }
    }
}

impl MergeOptions {
    /// Create new options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the stopping threshold
    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    /// Stop after at most `limit` merges
    pub fn with_max_merges(mut self, limit: usize) -> Self {
        self.max_merges = Some(limit);
        self
    }

    /// Set the log-odds clamp
    pub fn with_log_odds_clamp(mut self, clamp: f64) -> Self {
        self.log_odds_clamp = clamp;
        self
    }

    fn validate(&self) -> RegionResult<()> {
        if self.beta.is_nan() {
            return Err(RegionError::InvalidParameters("beta is NaN".into()));
        }
        if !(self.log_odds_clamp.is_finite() && self.log_odds_clamp > 0.0) {
            return Err(RegionError::InvalidParameters(format!(
                "log-odds clamp must be positive and finite, got {}",
                self.log_odds_clamp
            )));
        }
        Ok(())
    }
}

/// Options for the whole intensity-to-labels pipeline
#[derive(Debug, Clone, Default)]
pub struct SegmentOptions {
    pub surface: SurfaceOptions,
    pub watershed: WatershedOptions,
    pub border: BorderOptions,
    pub merge: MergeOptions,
}

impl SegmentOptions {
    /// Create new options with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_surface(mut self, surface: SurfaceOptions) -> Self {
        self.surface = surface;
        self
    }

    pub fn with_watershed(mut self, watershed: WatershedOptions) -> Self {
        self.watershed = watershed;
        self
    }

    pub fn with_border(mut self, border: BorderOptions) -> Self {
        self.border = border;
        self
    }

    pub fn with_merge(mut self, merge: MergeOptions) -> Self {
        self.merge = merge;
        self
    }
}

/// One applied merge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergeStep {
    /// Border that was removed
    pub border: u32,
    /// Surviving region
    pub kept: u32,
    /// Region folded into `kept`
    pub absorbed: u32,
    /// Score that selected the border
    pub score: f64,
}

/// Why the merge loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The best score was below `beta`
    BelowThreshold,
    /// No two regions touch any more
    NoBorders,
    /// `max_merges` was reached
    MergeLimit,
}

/// Outcome of a single call to [`RegionMerger::step`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    Merged(MergeStep),
    Stopped(StopReason),
}

/// History of a merge run
#[derive(Debug, Clone, PartialEq)]
pub struct MergeReport {
    /// Merges in the order they were applied
    pub steps: Vec<MergeStep>,
    /// Regions before the first merge
    pub initial_regions: usize,
    /// Regions after the last merge
    pub final_regions: usize,
    pub stop: StopReason,
}

impl MergeReport {
    /// Number of merges applied
    pub fn merge_count(&self) -> usize {
        self.steps.len()
    }
}

/// Greedy merger over a [`BorderGraph`]
pub struct RegionMerger<F> {
    graph: BorderGraph,
    gradient: FloatImage,
    prior: ShapePrior,
    features: F,
    options: MergeOptions,
    scores: BTreeMap<u32, f64>,
    lines: Option<BinaryImage>,
}

impl<F: ShapeFeatures> RegionMerger<F> {
    /// Create a merger over an existing graph
    ///
    /// # Errors
    ///
    /// Returns `RegionError::Core` if `gradient` and the label image differ
    /// in size, `RegionError::PriorDimension` if the prior does not match
    /// the feature extractor, and `RegionError::InvalidParameters` for bad
    /// options.
    pub fn new(
        graph: BorderGraph,
        gradient: FloatImage,
        prior: ShapePrior,
        features: F,
        options: MergeOptions,
    ) -> RegionResult<Self> {
        graph.labels().check_same_size(&gradient)?;
        if features.dimension() != prior.dimension() {
            return Err(RegionError::PriorDimension {
                expected: prior.dimension(),
                actual: features.dimension(),
            });
        }
        options.validate()?;
        Ok(Self {
            graph,
            gradient,
            prior,
            features,
            options,
            scores: BTreeMap::new(),
            lines: None,
        })
    }

    /// Segment an intensity image and prepare to merge its regions
    ///
    /// Builds the surface, runs the watershed and the border graph, and
    /// keeps the surface gradient for the gradient term.
    pub fn from_intensity(
        intensity: &FloatImage,
        prior: ShapePrior,
        features: F,
        options: &SegmentOptions,
    ) -> RegionResult<Self> {
        let surface = build_surface(intensity, &options.surface)?;
        let segmentation = segment_watershed(&surface.mask, &surface.surface, &options.watershed)?;
        debug!("merger: {} initial regions", segmentation.region_count);
        let graph = BorderGraph::build(segmentation.labels, &options.border)?;
        let mut merger = Self::new(graph, surface.gradient, prior, features, options.merge)?;
        merger.lines = Some(segmentation.lines);
        Ok(merger)
    }

    pub fn graph(&self) -> &BorderGraph {
        &self.graph
    }

    /// The current label image
    pub fn labels(&self) -> &LabelImage {
        self.graph.labels()
    }

    pub fn gradient(&self) -> &FloatImage {
        &self.gradient
    }

    pub fn prior(&self) -> &ShapePrior {
        &self.prior
    }

    pub fn options(&self) -> &MergeOptions {
        &self.options
    }

    /// Watershed lines, when built with [`RegionMerger::from_intensity`]
    pub fn lines(&self) -> Option<&BinaryImage> {
        self.lines.as_ref()
    }

    /// Consume the merger and return the label image
    pub fn into_labels(self) -> LabelImage {
        self.graph.into_labels()
    }

    fn log_shape(&self, mask: &BinaryImage) -> RegionResult<f64> {
        self.prior.log_likelihood(&self.features.extract(mask))
    }

    /// Shape term of the score for two regions
    pub fn shape_ratio(&self, c0: u32, c1: u32) -> RegionResult<f64> {
        for r in [c0, c1] {
            if !self.graph.contains_region(r) {
                return Err(RegionError::UnknownRegion(r));
            }
        }
        let labels = self.graph.labels();
        let s0 = self.log_shape(&labels.region_mask(c0))?;
        let s1 = self.log_shape(&labels.region_mask(c1))?;
        let union = self.log_shape(&labels.map(|v| v == c0 || v == c1))?;

        let clamp = self.options.log_odds_clamp;
        let log_r = LN_2 + union - s0 - s1;
        Ok(log_r.clamp(-clamp, clamp).exp())
    }

    /// Gradient term of the score for a border
    ///
    /// A border without pixels is neutral (1). A border of zero gradient
    /// scores infinity against a textured interior and 1 against a flat one.
    pub fn gradient_ratio(&self, border: u32) -> RegionResult<f64> {
        let (c0, c1) = self
            .graph
            .border_pair(border)
            .ok_or(RegionError::UnknownBorder(border))?;
        let labels = self.graph.labels();
        let Some(edge) = self.gradient.mean_over(self.graph.border_pixels(border)) else {
            return Ok(1.0);
        };
        let m0 = self.gradient.mean_over(&labels.footprint(c0)).unwrap_or(0.0);
        let m1 = self.gradient.mean_over(&labels.footprint(c1)).unwrap_or(0.0);
        let interior = (m0 + m1) / 2.0;

        if edge == 0.0 {
            return Ok(if interior > 0.0 { f64::INFINITY } else { 1.0 });
        }
        Ok(interior / edge)
    }

    /// Merge score of a border
    pub fn score(&self, border: u32) -> RegionResult<f64> {
        let (c0, c1) = self
            .graph
            .border_pair(border)
            .ok_or(RegionError::UnknownBorder(border))?;
        Ok(self.shape_ratio(c0, c1)? * self.gradient_ratio(border)?)
    }

    /// Highest-scoring live border and its score
    ///
    /// Scans pairs in ascending order and only replaces the incumbent on a
    /// strictly higher score. NaN scores never win. Returns `None` when no
    /// border has a comparable score.
    pub fn best_edge(&mut self) -> RegionResult<Option<(u32, f64)>> {
        let edges: Vec<u32> = self.graph.edges().map(|(_, id)| id).collect();
        let mut best: Option<(u32, f64)> = None;
        for id in edges {
            let score = match self.scores.get(&id) {
                Some(&s) => s,
                None => {
                    let s = self.score(id)?;
                    self.scores.insert(id, s);
                    s
                }
            };
            if score.is_nan() {
                continue;
            }
            if best.is_none_or(|(_, b)| score > b) {
                best = Some((id, score));
            }
        }
        Ok(best)
    }

    /// Merge the two regions separated by `border`
    pub fn merge(&mut self, border: u32) -> RegionResult<MergeOutcome> {
        let (c0, c1) = self
            .graph
            .border_pair(border)
            .ok_or(RegionError::UnknownBorder(border))?;
        let outcome = self.graph.merge_regions(c0, c1)?;

        self.scores.remove(&outcome.border);
        for id in &outcome.retired {
            self.scores.remove(id);
        }
        for id in self.graph.incident_borders(outcome.kept) {
            self.scores.remove(&id);
        }
        Ok(outcome)
    }

    /// Apply the best merge if its score reaches `beta`
    pub fn step(&mut self) -> RegionResult<StepOutcome> {
        let Some((border, score)) = self.best_edge()? else {
            let reason = if self.graph.border_count() == 0 {
                StopReason::NoBorders
            } else {
                StopReason::BelowThreshold
            };
            return Ok(StepOutcome::Stopped(reason));
        };
        if score < self.options.beta {
            return Ok(StepOutcome::Stopped(StopReason::BelowThreshold));
        }

        let outcome = self.merge(border)?;
        Ok(StepOutcome::Merged(MergeStep {
            border,
            kept: outcome.kept,
            absorbed: outcome.absorbed,
            score,
        }))
    }

    /// Merge until no border scores at least `beta`
    pub fn run(&mut self) -> RegionResult<MergeReport> {
        let initial_regions = self.graph.region_count();
        let mut steps = Vec::new();

        let stop = loop {
            if self.options.max_merges.is_some_and(|limit| steps.len() >= limit) {
                warn!("merge: stopping at the limit of {} merges", steps.len());
                break StopReason::MergeLimit;
            }
            match self.step()? {
                StepOutcome::Merged(step) => {
                    debug!(
                        "merge: border {} joins region {} into {} (score {:.4})",
                        step.border, step.absorbed, step.kept, step.score
                    );
                    steps.push(step);
                }
                StepOutcome::Stopped(reason) => break reason,
            }
        };

        let final_regions = self.graph.region_count();
        info!(
            "merge: {} merges, {initial_regions} -> {final_regions} regions, stopped: {stop:?}",
            steps.len()
        );

        Ok(MergeReport {
            steps,
            initial_regions,
            final_regions,
            stop,
        })
    }
}

/// Segment an intensity image and greedily merge the watershed regions
///
/// Returns the final labels together with the merge history.
pub fn greedy_merge<F: ShapeFeatures>(
    intensity: &FloatImage,
    prior: ShapePrior,
    features: F,
    options: &SegmentOptions,
) -> RegionResult<(LabelImage, MergeReport)> {
    let mut merger = RegionMerger::from_intensity(intensity, prior, features, options)?;
    let report = merger.run()?;
    Ok((merger.into_labels(), report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::HullFeatures;

    /// Always reports the prior mean, so every shape term is exactly 2
    struct AtMean(Vec<f64>);

    impl ShapeFeatures for AtMean {
        fn dimension(&self) -> usize {
            self.0.len()
        }

        fn extract(&self, _mask: &BinaryImage) -> Vec<f64> {
            self.0.clone()
        }
    }

    fn at_mean() -> (ShapePrior, AtMean) {
        let mean = vec![1.0, 2.0];
        (ShapePrior::isotropic(mean.clone(), 1.0).unwrap(), AtMean(mean))
    }

    #[rustfmt::skip]
    fn strip() -> LabelImage {
        LabelImage::from_data(6, 1, vec![1, 1, 2, 2, 3, 3]).unwrap()
    }

    fn flat() -> FloatImage {
        FloatImage::new_with_value(6, 1, 1.0).unwrap()
    }

    fn merger(
        labels: LabelImage,
        gradient: FloatImage,
        options: MergeOptions,
    ) -> RegionMerger<AtMean> {
        let (prior, features) = at_mean();
        let graph = BorderGraph::build(labels, &BorderOptions::default()).unwrap();
        RegionMerger::new(graph, gradient, prior, features, options).unwrap()
    }

    #[test]
    fn test_shape_ratio_at_mean() {
        let m = merger(strip(), flat(), MergeOptions::default());
        assert!((m.shape_ratio(1, 2).unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_gradient_ratio() {
        let gradient = FloatImage::from_data(6, 1, vec![4.0, 2.0, 2.0, 4.0, 4.0, 4.0]).unwrap();
        let m = merger(strip(), gradient, MergeOptions::default());
        let b12 = m.graph().border_id(1, 2).unwrap();
        // Regions average 3, border pixels 1 and 2 average 2
        assert!((m.gradient_ratio(b12).unwrap() - 1.5).abs() < 1e-12);
        assert!((m.score(b12).unwrap() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_border_gradient() {
        let gradient = FloatImage::from_data(6, 1, vec![4.0, 0.0, 0.0, 4.0, 4.0, 4.0]).unwrap();
        let m = merger(strip(), gradient, MergeOptions::default());
        let b12 = m.graph().border_id(1, 2).unwrap();
        assert_eq!(m.gradient_ratio(b12).unwrap(), f64::INFINITY);

        let m = merger(strip(), FloatImage::new(6, 1).unwrap(), MergeOptions::default());
        assert_eq!(m.gradient_ratio(b12).unwrap(), 1.0);
    }

    #[test]
    fn test_log_odds_clamped() {
        // A single feature far from the mean for each part but not the union
        struct Split;
        impl ShapeFeatures for Split {
            fn dimension(&self) -> usize {
                1
            }
            fn extract(&self, mask: &BinaryImage) -> Vec<f64> {
                vec![if mask.count() > 2 { 0.0 } else { 1e6 }]
            }
        }
        let prior = ShapePrior::isotropic(vec![0.0], 1.0).unwrap();
        let graph = BorderGraph::build(strip(), &BorderOptions::default()).unwrap();
        let gradient = FloatImage::new_with_value(6, 1, 1.0).unwrap();
        let options = MergeOptions::new().with_log_odds_clamp(10.0);
        let m = RegionMerger::new(graph, gradient, prior, Split, options).unwrap();
        assert!((m.shape_ratio(1, 2).unwrap() - 10f64.exp()).abs() < 1e-6);
    }

    #[test]
    fn test_ties_go_to_lowest_pair() {
        let m = &mut merger(strip(), flat(), MergeOptions::default());
        let (border, score) = m.best_edge().unwrap().unwrap();
        assert_eq!(m.graph().border_pair(border), Some((1, 2)));
        assert!((score - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_run_merges_everything() {
        let mut m = merger(strip(), flat(), MergeOptions::default());
        let report = m.run().unwrap();
        assert_eq!(report.merge_count(), 2);
        assert_eq!(report.initial_regions, 3);
        assert_eq!(report.final_regions, 1);
        assert_eq!(report.stop, StopReason::NoBorders);
        assert_eq!(m.labels().data(), &[1; 6]);
        m.graph().validate().unwrap();
    }

    #[test]
    fn test_merge_limit() {
        let options = MergeOptions::new().with_max_merges(1);
        let mut m = merger(strip(), flat(), options);
        let report = m.run().unwrap();
        assert_eq!(report.merge_count(), 1);
        assert_eq!(report.stop, StopReason::MergeLimit);
        assert_eq!(m.graph().region_count(), 2);
    }

    #[test]
    fn test_high_beta_keeps_regions() {
        let options = MergeOptions::new().with_beta(1e12);
        let mut m = merger(strip(), flat(), options);
        let report = m.run().unwrap();
        assert_eq!(report.merge_count(), 0);
        assert_eq!(report.stop, StopReason::BelowThreshold);
        assert_eq!(m.into_labels(), strip());
    }

    #[test]
    fn test_new_rejects_mismatches() {
        let graph = BorderGraph::build(strip(), &BorderOptions::default()).unwrap();
        let prior = ShapePrior::isotropic(vec![0.0; 2], 1.0).unwrap();
        let gradient = FloatImage::new(6, 1).unwrap();
        assert!(matches!(
            RegionMerger::new(
                graph.clone(),
                gradient.clone(),
                prior.clone(),
                HullFeatures,
                MergeOptions::default(),
            ),
            Err(RegionError::PriorDimension { expected: 2, actual: 5 })
        ));

        let (prior, features) = at_mean();
        assert!(matches!(
            RegionMerger::new(
                graph.clone(),
                FloatImage::new(5, 1).unwrap(),
                prior.clone(),
                features,
                MergeOptions::default(),
            ),
            Err(RegionError::Core(_))
        ));

        let (_, features) = at_mean();
        let options = MergeOptions::new().with_log_odds_clamp(0.0);
        assert!(RegionMerger::new(graph, gradient, prior, features, options).is_err());
    }

    #[test]
    fn test_merge_options_json() {
        let options: MergeOptions = serde_json::from_str(r#"{ "beta": 2.0 }"#).unwrap();
        assert_eq!(options.beta, 2.0);
        assert_eq!(options.max_merges, None);
        assert_eq!(options.log_odds_clamp, 100.0);
    }
}
