//! Image - generic 2-D grid
//!
//! `Image<T>` stores one sample per pixel in row-major order with no
//! padding. The pixel at (x, y) is at index `y * width + x`. Every pipeline
//! stage works on one of the aliases defined here, so coordinates, shape
//! checks and neighbor arithmetic are shared rather than re-implemented per
//! sample type.
//!
//! See [`float`], [`label`] and [`binary`] for the sample-specific helpers.
//!
//! # Examples
//!
//! ```
//! use cellseg_core::FloatImage;
//!
//! let mut img = FloatImage::new(100, 100).unwrap();
//! img.set(10, 20, 0.5).unwrap();
//! assert_eq!(img.get(10, 20), Some(0.5));
//! assert_eq!(img.get(100, 0), None);
//! ```

pub mod binary;
pub mod float;
pub mod label;

use crate::error::{Error, Result};

/// 8-bit image (topographic surfaces)
pub type GrayImage = Image<u8>;

/// Floating-point image (intensity, gradient, distance)
pub type FloatImage = Image<f32>;

/// Integer label image; 0 is reserved for background
pub type LabelImage = Image<u32>;

/// Binary mask
pub type BinaryImage = Image<bool>;

/// Row-major 2-D grid of samples
#[derive(Debug, Clone, PartialEq)]
pub struct Image<T> {
    /// Width in pixels
    width: u32,
    /// Height in pixels
    height: u32,
    /// Pixel data (row-major, no padding)
    data: Vec<T>,
}

impl<T: Copy + Default> Image<T> {
    /// Create a new image with every pixel set to `T::default()`
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidDimension` if width or height is 0.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Self::new_with_value(width, height, T::default())
    }
}

impl<T: Copy> Image<T> {
    /// Create a new image with all pixels set to the specified value
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidDimension` if width or height is 0.
    pub fn new_with_value(width: u32, height: u32, value: T) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }

        let size = (width as usize) * (height as usize);
        Ok(Image {
            width,
            height,
            data: vec![value; size],
        })
    }

    /// Create an image from row-major data
    ///
    /// # Errors
    ///
    /// Returns an error if dimensions are invalid or data length doesn't match.
    pub fn from_data(width: u32, height: u32, data: Vec<T>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }

        let expected_size = (width as usize) * (height as usize);
        if data.len() != expected_size {
            return Err(Error::InvalidParameter(format!(
                "data length {} doesn't match {}x{} = {}",
                data.len(),
                width,
                height,
                expected_size
            )));
        }

        Ok(Image {
            width,
            height,
            data,
        })
    }

    /// Create an image from an array shape in `[rows, cols]` order
    ///
    /// This is the entry point for callers holding n-dimensional buffers:
    /// anything that is not exactly two-dimensional is rejected.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidDimensionality` if `shape.len() != 2`, and the
    /// errors of [`Image::from_data`] otherwise.
    ///
    /// # Examples
    ///
    /// ```
    /// use cellseg_core::{Error, FloatImage};
    ///
    /// let img = FloatImage::from_shape(&[2, 3], vec![0.0; 6]).unwrap();
    /// assert_eq!(img.dimensions(), (3, 2));
    ///
    /// let err = FloatImage::from_shape(&[2, 3, 1], vec![0.0; 6]).unwrap_err();
    /// assert!(matches!(err, Error::InvalidDimensionality(3)));
    /// ```
    pub fn from_shape(shape: &[usize], data: Vec<T>) -> Result<Self> {
        let &[rows, cols] = shape else {
            return Err(Error::InvalidDimensionality(shape.len()));
        };
        let height = u32::try_from(rows)
            .map_err(|_| Error::InvalidParameter(format!("row count {rows} too large")))?;
        let width = u32::try_from(cols)
            .map_err(|_| Error::InvalidParameter(format!("column count {cols} too large")))?;
        Self::from_data(width, height, data)
    }

    /// Get the image width in pixels
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the image height in pixels
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the image dimensions as (width, height)
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of pixels
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false for a constructed image; present for API symmetry
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Linear index of (x, y), or `None` if out of range
    #[inline]
    pub fn index_of(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some((y as usize) * (self.width as usize) + (x as usize))
    }

    /// Coordinates (x, y) of a linear index
    #[inline]
    pub fn coords_of(&self, index: usize) -> (u32, u32) {
        let w = self.width as usize;
        ((index % w) as u32, (index / w) as u32)
    }

    /// Linear index of the pixel at `(dx, dy)` from `index`, if in bounds
    #[inline]
    pub fn offset_index(&self, index: usize, dx: i32, dy: i32) -> Option<usize> {
        let (x, y) = self.coords_of(index);
        let nx = x as i64 + dx as i64;
        let ny = y as i64 + dy as i64;
        if nx < 0 || ny < 0 || nx >= self.width as i64 || ny >= self.height as i64 {
            return None;
        }
        Some((ny as usize) * (self.width as usize) + (nx as usize))
    }

    /// Get the pixel value at (x, y), or `None` if out of range
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Option<T> {
        self.index_of(x, y).map(|idx| self.data[idx])
    }

    /// Set the pixel value at (x, y)
    ///
    /// # Errors
    ///
    /// Returns `Error::IndexOutOfBounds` if coordinates are out of range.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: T) -> Result<()> {
        let idx = self.index_of(x, y).ok_or(Error::IndexOutOfBounds {
            index: (y as usize) * (self.width as usize) + (x as usize),
            len: self.data.len(),
        })?;
        self.data[idx] = value;
        Ok(())
    }

    /// Set the pixel value at (x, y) without bounds checking
    ///
    /// # Panics
    ///
    /// Panics if the linear index is out of range.
    #[inline]
    pub fn set_unchecked(&mut self, x: u32, y: u32, value: T) {
        let idx = (y as usize) * (self.width as usize) + (x as usize);
        self.data[idx] = value;
    }

    /// Get raw access to the pixel data
    #[inline]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Get mutable access to the pixel data
    #[inline]
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Set all pixels to the specified value
    pub fn set_all(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Apply `f` to every pixel, producing a same-sized image
    pub fn map<U: Copy>(&self, f: impl Fn(T) -> U) -> Image<U> {
        Image {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    /// Combine two same-sized images pixel by pixel
    ///
    /// # Errors
    ///
    /// Returns `Error::DimensionMismatch` if the sizes differ.
    pub fn zip_map<U: Copy, V: Copy>(
        &self,
        other: &Image<U>,
        f: impl Fn(T, U) -> V,
    ) -> Result<Image<V>> {
        self.check_same_size(other)?;
        Ok(Image {
            width: self.width,
            height: self.height,
            data: self
                .data
                .iter()
                .zip(other.data())
                .map(|(&a, &b)| f(a, b))
                .collect(),
        })
    }

    /// Check that `other` has the same dimensions as `self`
    ///
    /// # Errors
    ///
    /// Returns `Error::DimensionMismatch` if the sizes differ.
    pub fn check_same_size<U: Copy>(&self, other: &Image<U>) -> Result<()> {
        if self.dimensions() != other.dimensions() {
            return Err(Error::DimensionMismatch {
                expected: self.dimensions(),
                actual: other.dimensions(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_zero_size() {
        assert!(matches!(
            LabelImage::new(0, 5),
            Err(Error::InvalidDimension { width: 0, height: 5 })
        ));
    }

    #[test]
    fn test_from_data_length_mismatch() {
        assert!(FloatImage::from_data(2, 2, vec![0.0; 3]).is_err());
    }

    #[test]
    fn test_from_shape_rows_cols() {
        let img = LabelImage::from_shape(&[2, 3], vec![0, 1, 2, 3, 4, 5]).unwrap();
        assert_eq!(img.width(), 3);
        assert_eq!(img.height(), 2);
        assert_eq!(img.get(2, 1), Some(5));
    }

    #[test]
    fn test_from_shape_rejects_other_ranks() {
        for shape in [&[6usize][..], &[1, 2, 3][..], &[][..]] {
            let err = LabelImage::from_shape(shape, vec![0; 6]).unwrap_err();
            assert!(matches!(err, Error::InvalidDimensionality(n) if n == shape.len()));
        }
    }

    #[test]
    fn test_offset_index_bounds() {
        let img = GrayImage::new(3, 3).unwrap();
        let center = img.index_of(1, 1).unwrap();
        assert_eq!(img.offset_index(center, -1, 0), Some(3));
        assert_eq!(img.offset_index(center, 1, 1), Some(8));
        assert_eq!(img.offset_index(0, -1, 0), None);
        assert_eq!(img.offset_index(8, 0, 1), None);
    }

    #[test]
    fn test_set_out_of_bounds() {
        let mut img = BinaryImage::new(2, 2).unwrap();
        assert!(img.set(2, 0, true).is_err());
        img.set(1, 1, true).unwrap();
        assert_eq!(img.get(1, 1), Some(true));
    }

    #[test]
    fn test_zip_map_mismatch() {
        let a = FloatImage::new(2, 2).unwrap();
        let b = FloatImage::new(3, 2).unwrap();
        assert!(matches!(
            a.zip_map(&b, |x, y| x + y),
            Err(Error::DimensionMismatch { .. })
        ));
    }
}
