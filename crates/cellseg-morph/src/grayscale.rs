//! Grayscale morphological operations
//!
//! Implements erosion, dilation and the morphological gradient for
//! floating-point images with an arbitrary structuring element.
//!
//! # Algorithm
//!
//! - **Dilation**: Computes the maximum pixel value in the SE neighborhood
//! - **Erosion**: Computes the minimum pixel value in the SE neighborhood
//! - **Gradient**: Dilation minus erosion, highlighting edges
//!
//! Neighborhood positions falling outside the image are ignored, which is
//! equivalent to padding with the neutral element of each operation.

use crate::{MorphError, MorphResult, Sel};
use cellseg_core::FloatImage;

fn check_sel(sel: &Sel) -> MorphResult<Vec<(i32, i32)>> {
    let offsets: Vec<(i32, i32)> = sel.hit_offsets().collect();
    if offsets.is_empty() {
        return Err(MorphError::InvalidSel("no hit elements".into()));
    }
    Ok(offsets)
}

fn rank_gray(
    img: &FloatImage,
    sel: &Sel,
    init: f32,
    pick: impl Fn(f32, f32) -> f32,
) -> MorphResult<FloatImage> {
    let offsets = check_sel(sel)?;
    let mut out = FloatImage::new(img.width(), img.height())?;
    let src = img.data();

    for (i, dst) in out.data_mut().iter_mut().enumerate() {
        let mut acc = init;
        for &(dx, dy) in &offsets {
            if let Some(j) = img.offset_index(i, dx, dy) {
                acc = pick(acc, src[j]);
            }
        }
        *dst = acc;
    }

    Ok(out)
}

/// Dilate a grayscale image
///
/// Dilation computes the maximum pixel value in the SE neighborhood,
/// which expands bright regions and shrinks dark regions.
pub fn dilate_gray(img: &FloatImage, sel: &Sel) -> MorphResult<FloatImage> {
    rank_gray(img, sel, f32::NEG_INFINITY, f32::max)
}

/// Erode a grayscale image
///
/// Erosion computes the minimum pixel value in the SE neighborhood,
/// which shrinks bright regions and expands dark regions.
pub fn erode_gray(img: &FloatImage, sel: &Sel) -> MorphResult<FloatImage> {
    rank_gray(img, sel, f32::INFINITY, f32::min)
}

/// Grayscale morphological gradient (dilation - erosion)
///
/// Highlights edges and boundaries in the image. The result is
/// non-negative whenever the SE contains its own origin.
pub fn gradient_gray(img: &FloatImage, sel: &Sel) -> MorphResult<FloatImage> {
    let dilated = dilate_gray(img, sel)?;
    let eroded = erode_gray(img, sel)?;
    Ok(dilated.zip_map(&eroded, |d, e| d - e)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_image() -> FloatImage {
        // Left half 0, right half 10
        let mut img = FloatImage::new(6, 3).unwrap();
        for y in 0..3 {
            for x in 3..6 {
                img.set_unchecked(x, y, 10.0);
            }
        }
        img
    }

    #[test]
    fn test_dilate_erode_step() {
        let img = step_image();
        let sel = Sel::cross();
        let d = dilate_gray(&img, &sel).unwrap();
        let e = erode_gray(&img, &sel).unwrap();
        assert_eq!(d.get(2, 1), Some(10.0));
        assert_eq!(d.get(1, 1), Some(0.0));
        assert_eq!(e.get(3, 1), Some(0.0));
        assert_eq!(e.get(4, 1), Some(10.0));
    }

    #[test]
    fn test_gradient_marks_edge_only() {
        let img = step_image();
        let g = gradient_gray(&img, &Sel::cross()).unwrap();
        for y in 0..3 {
            assert_eq!(g.get(0, y), Some(0.0));
            assert_eq!(g.get(2, y), Some(10.0));
            assert_eq!(g.get(3, y), Some(10.0));
            assert_eq!(g.get(5, y), Some(0.0));
        }
    }

    #[test]
    fn test_gradient_flat_image_is_zero() {
        let img = FloatImage::new_with_value(4, 4, 3.5).unwrap();
        let g = gradient_gray(&img, &Sel::square()).unwrap();
        assert_eq!(g.max_value(), 0.0);
    }

    #[test]
    fn test_empty_sel_rejected() {
        let img = FloatImage::new(2, 2).unwrap();
        let sel = Sel::new(3, 3).unwrap();
        assert!(dilate_gray(&img, &sel).is_err());
    }
}
