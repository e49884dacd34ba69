//! Synthetic fixtures shared by the regression tests

use cellseg_core::{FloatImage, LabelImage};

/// A bright disc on a dark background
#[derive(Debug, Clone, Copy)]
pub struct Disc {
    pub cx: f32,
    pub cy: f32,
    pub radius: f32,
    pub intensity: f32,
}

impl Disc {
    pub fn new(cx: f32, cy: f32, radius: f32, intensity: f32) -> Self {
        Self {
            cx,
            cy,
            radius,
            intensity,
        }
    }
}

/// Render flat discs over a constant background
///
/// Overlapping discs take the brighter value, so two touching discs form a
/// single dumbbell-shaped foreground component.
pub fn disc_image(width: u32, height: u32, background: f32, discs: &[Disc]) -> FloatImage {
    let mut img = FloatImage::new_with_value(width, height, background)
        .expect("fixture dimensions are nonzero");
    for y in 0..height {
        for x in 0..width {
            let mut v = background;
            for d in discs {
                let dx = x as f32 - d.cx;
                let dy = y as f32 - d.cy;
                if dx * dx + dy * dy <= d.radius * d.radius {
                    v = v.max(d.intensity);
                }
            }
            img.set_unchecked(x, y, v);
        }
    }
    img
}

/// Two side-by-side rectangles labeled 1 (columns `0..split`) and 2
/// (columns `split..width`), optionally framed by a background margin
pub fn two_blocks(width: u32, height: u32, split: u32, margin: u32) -> LabelImage {
    let mut labels = LabelImage::new(width, height).expect("fixture dimensions are nonzero");
    for y in margin..height.saturating_sub(margin) {
        for x in margin..width.saturating_sub(margin) {
            let label = if x < split { 1 } else { 2 };
            labels.set_unchecked(x, y, label);
        }
    }
    labels
}

/// A grid of `cols` x `rows` equal tiles labeled 1.. in raster order
pub fn tiles(tile: u32, cols: u32, rows: u32) -> LabelImage {
    let mut labels =
        LabelImage::new(tile * cols, tile * rows).expect("fixture dimensions are nonzero");
    for y in 0..tile * rows {
        for x in 0..tile * cols {
            labels.set_unchecked(x, y, (y / tile) * cols + x / tile + 1);
        }
    }
    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_blocks() {
        let labels = two_blocks(10, 6, 5, 1);
        assert_eq!(labels.get(0, 0), Some(0));
        assert_eq!(labels.get(4, 2), Some(1));
        assert_eq!(labels.get(5, 2), Some(2));
        assert_eq!(labels.footprint(1).len(), 4 * 4);
    }

    #[test]
    fn test_tiles() {
        let labels = tiles(2, 3, 2);
        assert_eq!(labels.region_count(), 6);
        assert_eq!(labels.get(5, 3), Some(6));
    }

    #[test]
    fn test_disc_image() {
        let img = disc_image(9, 9, 1.0, &[Disc::new(4.0, 4.0, 2.0, 10.0)]);
        assert_eq!(img.get(4, 4), Some(10.0));
        assert_eq!(img.get(0, 0), Some(1.0));
    }
}
