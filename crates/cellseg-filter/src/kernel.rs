//! Convolution kernels
//!
//! Defines kernel structures for image convolution operations. A kernel is a
//! small row-major grid of weights with an origin; separable filters are
//! expressed as a 1-row kernel and its transpose.

use crate::{FilterError, FilterResult};

/// Truncation of the Gaussian support, in standard deviations
pub const GAUSSIAN_TRUNCATE: f32 = 4.0;

/// A 2D convolution kernel
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    /// Width of the kernel
    width: u32,
    /// Height of the kernel
    height: u32,
    /// X coordinate of the center
    cx: u32,
    /// Y coordinate of the center
    cy: u32,
    /// Kernel data (row-major order)
    data: Vec<f32>,
}

impl Kernel {
    /// Create a new all-zero kernel with a centered origin.
    pub fn new(width: u32, height: u32) -> FilterResult<Self> {
        if width == 0 || height == 0 {
            return Err(FilterError::InvalidKernel(format!(
                "dimensions must be positive, got {width}x{height}"
            )));
        }
        Ok(Self {
            width,
            height,
            cx: width / 2,
            cy: height / 2,
            data: vec![0.0; (width * height) as usize],
        })
    }

    /// Create a kernel from a slice of row-major values.
    pub fn from_slice(width: u32, height: u32, data: &[f32]) -> FilterResult<Self> {
        let mut kernel = Self::new(width, height)?;
        if data.len() != kernel.data.len() {
            return Err(FilterError::InvalidKernel(format!(
                "expected {} values, got {}",
                kernel.data.len(),
                data.len()
            )));
        }
        kernel.data.copy_from_slice(data);
        Ok(kernel)
    }

    /// Create a box (averaging) kernel.
    ///
    /// All values are `1/(size*size)`.
    pub fn box_kernel(size: u32) -> FilterResult<Self> {
        let mut kernel = Self::new(size, size)?;
        let v = 1.0 / (size * size) as f32;
        kernel.data.fill(v);
        Ok(kernel)
    }

    /// Create a normalized horizontal 1-D Gaussian kernel.
    ///
    /// The support is truncated at [`GAUSSIAN_TRUNCATE`] standard deviations,
    /// giving `2 * round(4 * sigma) + 1` taps.
    pub fn gaussian_1d(sigma: f32) -> FilterResult<Self> {
        if sigma.is_nan() || sigma <= 0.0 || sigma.is_infinite() {
            return Err(FilterError::InvalidKernel(format!(
                "sigma must be positive and finite, got {sigma}"
            )));
        }
        let radius = (GAUSSIAN_TRUNCATE * sigma + 0.5) as u32;
        let size = 2 * radius + 1;
        let denom = 2.0 * sigma * sigma;
        let data: Vec<f32> = (0..size)
            .map(|i| {
                let x = i as f32 - radius as f32;
                (-x * x / denom).exp()
            })
            .collect();
        let mut kernel = Self::from_slice(size, 1, &data)?;
        kernel.normalize();
        Ok(kernel)
    }

    /// Get the kernel width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the kernel height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the center X coordinate.
    #[inline]
    pub fn center_x(&self) -> u32 {
        self.cx
    }

    /// Get the center Y coordinate.
    #[inline]
    pub fn center_y(&self) -> u32 {
        self.cy
    }

    /// Get the kernel data.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Get a value at (x, y).
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.data[(y * self.width + x) as usize])
    }

    /// Set a value at (x, y); out-of-range positions are ignored.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: f32) {
        if x < self.width && y < self.height {
            self.data[(y * self.width + x) as usize] = value;
        }
    }

    /// Normalize the kernel so that values sum to 1.
    ///
    /// A kernel whose sum is near zero is left unchanged.
    pub fn normalize(&mut self) {
        let sum = self.sum();
        if sum.abs() < 1e-6 {
            return;
        }
        for v in &mut self.data {
            *v /= sum;
        }
    }

    /// Get the sum of all kernel values.
    pub fn sum(&self) -> f32 {
        self.data.iter().sum()
    }

    /// Swap rows and columns (a horizontal kernel becomes vertical).
    pub fn transposed(&self) -> Self {
        let mut data = vec![0.0; self.data.len()];
        for y in 0..self.height {
            for x in 0..self.width {
                data[(x * self.height + y) as usize] = self.data[(y * self.width + x) as usize];
            }
        }
        Self {
            width: self.height,
            height: self.width,
            cx: self.cy,
            cy: self.cx,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gaussian_1d_shape() {
        let k = Kernel::gaussian_1d(1.0).unwrap();
        assert_eq!(k.width(), 9);
        assert_eq!(k.height(), 1);
        assert_eq!(k.center_x(), 4);
        assert!((k.sum() - 1.0).abs() < 1e-5);
        // Symmetric and peaked at the center
        assert_eq!(k.get(0, 0), k.get(8, 0));
        assert!(k.get(4, 0).unwrap() > k.get(3, 0).unwrap());
    }

    #[test]
    fn test_gaussian_rejects_bad_sigma() {
        assert!(Kernel::gaussian_1d(0.0).is_err());
        assert!(Kernel::gaussian_1d(-1.0).is_err());
        assert!(Kernel::gaussian_1d(f32::NAN).is_err());
    }

    #[test]
    fn test_transposed() {
        let k = Kernel::from_slice(3, 1, &[1.0, 2.0, 3.0]).unwrap();
        let t = k.transposed();
        assert_eq!((t.width(), t.height()), (1, 3));
        assert_eq!(t.center_y(), 1);
        assert_eq!(t.get(0, 2), Some(3.0));
    }

    #[test]
    fn test_box_kernel() {
        let k = Kernel::box_kernel(3).unwrap();
        assert!((k.sum() - 1.0).abs() < 1e-6);
    }
}
