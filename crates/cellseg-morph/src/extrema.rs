//! Regional extrema
//!
//! A regional minimum is a connected plateau of equal value none of whose
//! neighbors is lower. Plateaus are grown with the SE neighborhood, so the
//! choice of SE decides both plateau connectivity and which neighbors are
//! compared.

use crate::{MorphResult, Sel};
use cellseg_core::{BinaryImage, GrayImage};

/// Find the regional minima of an 8-bit surface
///
/// When `mask` is given, only masked pixels take part: plateaus never grow
/// through unmasked pixels and unmasked neighbors are not compared.
///
/// Returns a binary image with every pixel of every regional minimum set.
pub fn regional_minima(
    surface: &GrayImage,
    mask: Option<&BinaryImage>,
    sel: &Sel,
) -> MorphResult<BinaryImage> {
    if let Some(m) = mask {
        surface.check_same_size(m)?;
    }
    let offsets = sel.neighbor_offsets();
    let inside = |i: usize| mask.is_none_or(|m| m.data()[i]);

    let values = surface.data();
    let mut minima = BinaryImage::new(surface.width(), surface.height())?;
    let mut visited = vec![false; values.len()];
    let mut plateau = Vec::new();
    let mut stack = Vec::new();

    for start in 0..values.len() {
        if visited[start] || !inside(start) {
            continue;
        }
        let level = values[start];
        let mut is_minimum = true;
        plateau.clear();
        stack.push(start);
        visited[start] = true;

        while let Some(i) = stack.pop() {
            plateau.push(i);
            for &(dx, dy) in &offsets {
                let Some(j) = surface.offset_index(i, dx, dy) else {
                    continue;
                };
                if !inside(j) {
                    continue;
                }
                if values[j] < level {
                    is_minimum = false;
                } else if values[j] == level && !visited[j] {
                    visited[j] = true;
                    stack.push(j);
                }
            }
        }

        if is_minimum {
            let data = minima.data_mut();
            for &i in &plateau {
                data[i] = true;
            }
        }
    }

    Ok(minima)
}
