//! Convolution operations
//!
//! Implements floating-point image convolution with arbitrary kernels and
//! the separable Gaussian blur used to smooth intensity images and
//! topographic surfaces.

use crate::{FilterError, FilterResult, Kernel};
use cellseg_core::FloatImage;

/// How samples outside the image are synthesized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderMode {
    /// Mirror about the edge, repeating the edge pixel (`d c b a | a b c d`)
    #[default]
    Reflect,
    /// Repeat the nearest edge pixel (`a a a a | a b c d`)
    Replicate,
}

impl BorderMode {
    /// Map a possibly out-of-range coordinate into `0..len`
    #[inline]
    fn resolve(self, pos: i64, len: i64) -> usize {
        match self {
            BorderMode::Replicate => pos.clamp(0, len - 1) as usize,
            BorderMode::Reflect => {
                let period = 2 * len;
                let p = pos.rem_euclid(period);
                (if p < len { p } else { period - 1 - p }) as usize
            }
        }
    }
}

/// Convolve a floating-point image with a kernel
///
/// Each output pixel is the weighted sum of the kernel applied to the
/// corresponding neighborhood of the input.
pub fn convolve(img: &FloatImage, kernel: &Kernel, border: BorderMode) -> FilterResult<FloatImage> {
    let w = img.width() as i64;
    let h = img.height() as i64;
    let kw = kernel.width() as i64;
    let kh = kernel.height() as i64;
    let cx = kernel.center_x() as i64;
    let cy = kernel.center_y() as i64;
    let kdata = kernel.data();
    let src = img.data();

    let mut out = FloatImage::new(img.width(), img.height())?;
    let dst = out.data_mut();

    for y in 0..h {
        for x in 0..w {
            let mut sum = 0.0f32;
            for ky in 0..kh {
                let sy = border.resolve(y + ky - cy, h);
                for kx in 0..kw {
                    let sx = border.resolve(x + kx - cx, w);
                    sum += src[sy * w as usize + sx] * kdata[(ky * kw + kx) as usize];
                }
            }
            dst[(y * w + x) as usize] = sum;
        }
    }

    Ok(out)
}

/// Convolve with a horizontal kernel followed by a vertical kernel
pub fn convolve_sep(
    img: &FloatImage,
    kernel_x: &Kernel,
    kernel_y: &Kernel,
    border: BorderMode,
) -> FilterResult<FloatImage> {
    let tmp = convolve(img, kernel_x, border)?;
    convolve(&tmp, kernel_y, border)
}

/// Apply an isotropic Gaussian blur with reflected borders
///
/// A `sigma` of zero returns a copy of the input.
pub fn gaussian_blur(img: &FloatImage, sigma: f32) -> FilterResult<FloatImage> {
    if sigma == 0.0 {
        return Ok(img.clone());
    }
    if sigma.is_nan() || sigma < 0.0 {
        return Err(FilterError::InvalidParameters(format!(
            "sigma must be non-negative, got {sigma}"
        )));
    }
    let kx = Kernel::gaussian_1d(sigma)?;
    let ky = kx.transposed();
    convolve_sep(img, &kx, &ky, BorderMode::Reflect)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> FloatImage {
        let data = (0..25).map(|v| v as f32).collect();
        FloatImage::from_data(5, 5, data).unwrap()
    }

    #[test]
    fn test_border_resolve() {
        assert_eq!(BorderMode::Reflect.resolve(-1, 4), 0);
        assert_eq!(BorderMode::Reflect.resolve(-2, 4), 1);
        assert_eq!(BorderMode::Reflect.resolve(4, 4), 3);
        assert_eq!(BorderMode::Reflect.resolve(9, 4), 1);
        assert_eq!(BorderMode::Replicate.resolve(-3, 4), 0);
        assert_eq!(BorderMode::Replicate.resolve(7, 4), 3);
    }

    #[test]
    fn test_identity_kernel() {
        let img = ramp();
        let k = Kernel::from_slice(1, 1, &[1.0]).unwrap();
        let out = convolve(&img, &k, BorderMode::Replicate).unwrap();
        assert_eq!(out, img);
    }

    #[test]
    fn test_gaussian_preserves_constant() {
        let img = FloatImage::new_with_value(7, 5, 42.0).unwrap();
        let out = gaussian_blur(&img, 2.0).unwrap();
        for &v in out.data() {
            assert!((v - 42.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_gaussian_preserves_mass_with_reflection() {
        let mut img = FloatImage::new(21, 21).unwrap();
        img.set(10, 10, 100.0).unwrap();
        let out = gaussian_blur(&img, 1.5).unwrap();
        let total: f32 = out.data().iter().sum();
        assert!((total - 100.0).abs() < 1e-2);
        assert!(out.get(10, 10).unwrap() > out.get(12, 10).unwrap());
    }

    #[test]
    fn test_gaussian_zero_sigma_is_copy() {
        let img = ramp();
        assert_eq!(gaussian_blur(&img, 0.0).unwrap(), img);
        assert!(gaussian_blur(&img, -1.0).is_err());
    }
}
