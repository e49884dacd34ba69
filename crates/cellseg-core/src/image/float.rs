//! Floating-point image helpers

use super::{FloatImage, GrayImage};

impl FloatImage {
    /// Minimum and maximum pixel values
    pub fn min_max(&self) -> (f32, f32) {
        self.data()
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }

    /// Maximum pixel value
    pub fn max_value(&self) -> f32 {
        self.min_max().1
    }

    /// Mean value over a set of linear pixel indices
    ///
    /// Returns `None` when `indices` is empty.
    pub fn mean_over(&self, indices: &[usize]) -> Option<f64> {
        if indices.is_empty() {
            return None;
        }
        let data = self.data();
        let sum: f64 = indices.iter().map(|&i| data[i] as f64).sum();
        Some(sum / indices.len() as f64)
    }

    /// Linearly rescale the value range onto `0..=255`
    ///
    /// The minimum maps to 0 and the maximum to 255. A constant image maps
    /// to all zeros.
    pub fn rescale_to_gray(&self) -> GrayImage {
        let (lo, hi) = self.min_max();
        let range = hi - lo;
        if range <= 0.0 || !range.is_finite() {
            return self.map(|_| 0u8);
        }
        let scale = 255.0 / range;
        self.map(|v| ((v - lo) * scale).round().clamp(0.0, 255.0) as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_max() {
        let img = FloatImage::from_data(3, 1, vec![2.0, -1.0, 5.0]).unwrap();
        assert_eq!(img.min_max(), (-1.0, 5.0));
        assert_eq!(img.max_value(), 5.0);
    }

    #[test]
    fn test_mean_over() {
        let img = FloatImage::from_data(4, 1, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(img.mean_over(&[1, 3]), Some(3.0));
        assert_eq!(img.mean_over(&[]), None);
    }

    #[test]
    fn test_rescale_to_gray() {
        let img = FloatImage::from_data(3, 1, vec![10.0, 15.0, 20.0]).unwrap();
        let gray = img.rescale_to_gray();
        assert_eq!(gray.data(), &[0, 128, 255]);
    }

    #[test]
    fn test_rescale_constant_image() {
        let img = FloatImage::new_with_value(2, 2, 7.0).unwrap();
        assert!(img.rescale_to_gray().data().iter().all(|&v| v == 0));
    }
}
