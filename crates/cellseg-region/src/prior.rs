//! Gaussian shape prior
//!
//! The prior is supplied by the caller, typically estimated from a set of
//! hand-segmented nuclei, and is only evaluated here.

use crate::error::{RegionError, RegionResult};
use serde::{Deserialize, Serialize};

/// Mean and inverse covariance of the expected shape features
///
/// Deserializing validates the same way [`ShapePrior::new`] does:
///
/// ```
/// use cellseg_region::ShapePrior;
///
/// let json = r#"{ "mean": [1.0, 2.0], "inv_covariance": [1.0, 0.0, 0.0, 1.0] }"#;
/// let prior: ShapePrior = serde_json::from_str(json).unwrap();
/// assert_eq!(prior.dimension(), 2);
///
/// let short = r#"{ "mean": [1.0, 2.0], "inv_covariance": [1.0] }"#;
/// assert!(serde_json::from_str::<ShapePrior>(short).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawShapePrior")]
pub struct ShapePrior {
    mean: Vec<f64>,
    /// Row-major `d x d`
    inv_covariance: Vec<f64>,
}

#[derive(Deserialize)]
struct RawShapePrior {
    mean: Vec<f64>,
    inv_covariance: Vec<f64>,
}

impl TryFrom<RawShapePrior> for ShapePrior {
    type Error = RegionError;

    fn try_from(raw: RawShapePrior) -> RegionResult<Self> {
        Self::new(raw.mean, raw.inv_covariance)
    }
}

impl ShapePrior {
    /// Create a prior from a mean vector and a row-major inverse covariance
    ///
    /// # Errors
    ///
    /// Returns `RegionError::PriorDimension` if the matrix is not
    /// `mean.len()` squared, and `RegionError::InvalidParameters` for an
    /// empty mean or non-finite entries.
    pub fn new(mean: Vec<f64>, inv_covariance: Vec<f64>) -> RegionResult<Self> {
        let d = mean.len();
        if d == 0 {
            return Err(RegionError::InvalidParameters("empty shape prior".into()));
        }
        if inv_covariance.len() != d * d {
            return Err(RegionError::PriorDimension {
                expected: d * d,
                actual: inv_covariance.len(),
            });
        }
        if mean.iter().chain(&inv_covariance).any(|v| !v.is_finite()) {
            return Err(RegionError::InvalidParameters(
                "shape prior has non-finite entries".into(),
            ));
        }
        Ok(Self {
            mean,
            inv_covariance,
        })
    }

    /// A prior with independent features of equal precision
    pub fn isotropic(mean: Vec<f64>, precision: f64) -> RegionResult<Self> {
        let d = mean.len();
        let mut inv = vec![0.0; d * d];
        for i in 0..d {
            inv[i * d + i] = precision;
        }
        Self::new(mean, inv)
    }

    /// Feature dimensionality
    pub fn dimension(&self) -> usize {
        self.mean.len()
    }

    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    pub fn inv_covariance(&self) -> &[f64] {
        &self.inv_covariance
    }

    /// Quadratic form `(f - mean)' S^-1 (f - mean)`
    pub fn mahalanobis_sq(&self, features: &[f64]) -> RegionResult<f64> {
        let d = self.dimension();
        if features.len() != d {
            return Err(RegionError::PriorDimension {
                expected: d,
                actual: features.len(),
            });
        }
        let diff: Vec<f64> = features.iter().zip(&self.mean).map(|(f, m)| f - m).collect();
        let q: f64 = self
            .inv_covariance
            .chunks_exact(d)
            .zip(&diff)
            .map(|(row, di)| di * row.iter().zip(&diff).map(|(a, dj)| a * dj).sum::<f64>())
            .sum();
        Ok(q)
    }

    /// Shape log-likelihood `-0.5 * sqrt(q)`, never positive
    ///
    /// A negative quadratic form, possible with an indefinite matrix, counts
    /// as zero.
    pub fn log_likelihood(&self, features: &[f64]) -> RegionResult<f64> {
        let q = self.mahalanobis_sq(features)?;
        let q = if q < 0.0 { 0.0 } else { q };
        Ok(-0.5 * q.sqrt())
    }
}
