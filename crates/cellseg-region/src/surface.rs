//! Topographic surface construction
//!
//! The flood surface mixes shape and edge cues: the distance to the
//! background is damped where the intensity gradient is strong, inverted so
//! that object centers become basins, blurred, and quantized to 8 bits.

use crate::error::{RegionError, RegionResult};
use cellseg_core::{BinaryImage, FloatImage, GrayImage};
use cellseg_filter::{distance_transform_edt, gaussian_blur, murphy_rc_threshold};
use cellseg_morph::{Sel, gradient_gray};
use log::{debug, warn};

/// Options for building the topographic surface
#[derive(Debug, Clone)]
pub struct SurfaceOptions {
    /// Foreground threshold; computed with Murphy's RC method when `None`
    pub threshold: Option<f32>,
    /// Sigma of the blur applied to the inverted distance surface
    pub blur_factor: f32,
    /// Sigma of the blur applied to the intensity before thresholding
    pub mask_sigma: f32,
    /// Neighborhood of the morphological gradient
    pub gradient_sel: Sel,
}

impl Default for SurfaceOptions {
    fn default() -> Self {
        Self {
            threshold: None,
            blur_factor: 3.0,
            mask_sigma: 4.0,
            gradient_sel: Sel::cross(),
        }
    }
}

impl SurfaceOptions {
    /// Create new options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a fixed foreground threshold
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = Some(threshold);
        self
    }

    /// Set the surface blur sigma
    pub fn with_blur_factor(mut self, sigma: f32) -> Self {
        self.blur_factor = sigma;
        self
    }

    /// Set the mask smoothing sigma
    pub fn with_mask_sigma(mut self, sigma: f32) -> Self {
        self.mask_sigma = sigma;
        self
    }

    /// Set the gradient structuring element
    pub fn with_gradient_sel(mut self, sel: Sel) -> Self {
        self.gradient_sel = sel;
        self
    }
}

/// Everything the later stages need from the intensity image
#[derive(Debug, Clone)]
pub struct Surface {
    /// Foreground mask
    pub mask: BinaryImage,
    /// 8-bit topographic surface to flood
    pub surface: GrayImage,
    /// Morphological gradient of the intensity
    pub gradient: FloatImage,
    /// Threshold that produced the mask
    pub threshold: f32,
}

/// Build the mask, gradient and flood surface of an intensity image
///
/// Intensities are expected in gray-level units; the automatic threshold
/// works on their integer histogram.
pub fn build_surface(intensity: &FloatImage, options: &SurfaceOptions) -> RegionResult<Surface> {
    for (name, sigma) in [
        ("blur_factor", options.blur_factor),
        ("mask_sigma", options.mask_sigma),
    ] {
        if !sigma.is_finite() || sigma < 0.0 {
            return Err(RegionError::InvalidParameters(format!(
                "{name} must be finite and non-negative, got {sigma}"
            )));
        }
    }

    let threshold = match options.threshold {
        Some(t) => t,
        None => murphy_rc_threshold(intensity, false)? as f32,
    };

    let smoothed = gaussian_blur(intensity, options.mask_sigma)?;
    let mask = smoothed.map(|v| v > threshold);
    let gradient = gradient_gray(intensity, &options.gradient_sel)?;
    let distance = distance_transform_edt(&mask)?;

    let gmax = gradient.max_value();
    let weighted = if gmax > 0.0 {
        distance.zip_map(&gradient, |d, g| d * (1.0 - g / gmax).exp())?
    } else {
        warn!("surface: flat gradient, using unweighted distance");
        distance
    };

    let dmax = weighted.max_value();
    let basins = gaussian_blur(&weighted.map(|d| dmax - d), options.blur_factor)?;
    let surface = basins.rescale_to_gray();

    debug!(
        "surface: threshold {threshold}, {} foreground pixels, max gradient {gmax}",
        mask.count()
    );

    Ok(Surface {
        mask,
        surface,
        gradient,
        threshold,
    })
}
