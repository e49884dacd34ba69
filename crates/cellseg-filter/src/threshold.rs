//! Global threshold selection
//!
//! Histogram-based threshold pickers for separating fluorescent objects from
//! background. Samples are binned at integer resolution: each value is
//! rounded to the nearest integer and negative values fall into bin 0.
//! Images with samples beyond [`MAX_HISTOGRAM_BINS`] are rejected.
//!
//! - [`rc_threshold`]: Ridler-Calvard iterative selection
//! - [`murphy_rc_threshold`]: RC run on the inverted image, which behaves
//!   better on images dominated by dark background
//! - [`otsu_threshold`]: maximal between-class variance

use crate::{FilterError, FilterResult};
use cellseg_core::FloatImage;

/// Largest histogram size, enough for 16-bit intensities
pub const MAX_HISTOGRAM_BINS: usize = 1 << 16;

/// Histogram with one bin per integer value `0..=max`
pub fn full_histogram(img: &FloatImage) -> FilterResult<Vec<u64>> {
    let bin = |v: f32| v.round().max(0.0) as usize;
    let max = img.data().iter().copied().fold(0.0f32, f32::max);
    if !max.is_finite() || bin(max) >= MAX_HISTOGRAM_BINS {
        return Err(FilterError::HistogramRange {
            value: max,
            limit: MAX_HISTOGRAM_BINS,
        });
    }
    let mut hist = vec![0u64; bin(max) + 1];
    for &v in img.data() {
        hist[bin(v)] += 1;
    }
    Ok(hist)
}

/// Ridler-Calvard threshold
///
/// Iterates `t <- (mean below t + mean above t) / 2` starting from the
/// brightest occupied bin. With `remove_zeros`, zero-valued pixels are left
/// out of the histogram; an all-zero image then yields 0.
pub fn rc_threshold(img: &FloatImage, remove_zeros: bool) -> FilterResult<f64> {
    let mut hist = full_histogram(img)?;
    if remove_zeros {
        if hist[0] as usize == img.len() {
            return Ok(0.0);
        }
        hist[0] = 0;
    }
    let n = hist.len();

    // Prefix sums below-or-at t, suffix sums at-or-above t
    let mut below_mass = vec![0.0f64; n];
    let mut below_count = vec![0.0f64; n];
    let mut above_mass = vec![0.0f64; n + 1];
    let mut above_count = vec![0.0f64; n + 1];
    let (mut m, mut c) = (0.0, 0.0);
    for t in 0..n {
        m += t as f64 * hist[t] as f64;
        c += hist[t] as f64;
        below_mass[t] = m;
        below_count[t] = c;
    }
    for t in (0..n).rev() {
        above_mass[t] = above_mass[t + 1] + t as f64 * hist[t] as f64;
        above_count[t] = above_count[t + 1] + hist[t] as f64;
    }

    let Some(max_t) = hist.iter().rposition(|&h| h != 0) else {
        return Ok(0.0);
    };

    let mut res = max_t as f64;
    let mut t = 0usize;
    while (t as f64) < res.min(max_t as f64) {
        // Empty lower class (possible after zero removal): keep iterating
        if below_count[t] > 0.0 && above_count[t + 1] > 0.0 {
            res = (below_mass[t] / below_count[t] + above_mass[t + 1] / above_count[t + 1]) / 2.0;
        }
        t += 1;
    }
    Ok(res)
}

/// Murphy's adaptation of the RC threshold
///
/// Computes `max - rc(max - img)`.
pub fn murphy_rc_threshold(img: &FloatImage, remove_zeros: bool) -> FilterResult<f64> {
    let pmax = img.max_value();
    let inverted = img.map(|v| pmax - v);
    Ok(pmax as f64 - rc_threshold(&inverted, remove_zeros)?)
}

/// Otsu threshold
///
/// Returns the bin that maximizes the between-class variance of the
/// histogram split `[0, t]` / `(t, max]`.
pub fn otsu_threshold(img: &FloatImage, remove_zeros: bool) -> FilterResult<u32> {
    let mut hist: Vec<f64> = full_histogram(img)?.into_iter().map(|h| h as f64).collect();
    if remove_zeros {
        hist[0] = 0.0;
    }
    let ng = hist.len();
    let upper_count: f64 = hist[1..].iter().sum();
    if upper_count == 0.0 {
        return Ok(0);
    }

    let mut n_b = vec![0.0; ng];
    let mut acc = 0.0;
    for (t, &h) in hist.iter().enumerate() {
        acc += h;
        n_b[t] = acc;
    }
    let total = acc;
    let n_o: Vec<f64> = n_b.iter().map(|&b| total - b).collect();

    let mut mu_b = 0.0;
    let mut mu_o = hist
        .iter()
        .enumerate()
        .skip(1)
        .map(|(t, &h)| t as f64 * h)
        .sum::<f64>()
        / upper_count;
    let mut best = n_b[0] * n_o[0] * (mu_b - mu_o) * (mu_b - mu_o);
    let mut best_t = 0u32;

    for t in 1..ng {
        if n_b[t] == 0.0 {
            continue;
        }
        if n_o[t] == 0.0 {
            break;
        }
        let tf = t as f64;
        mu_b = (mu_b * n_b[t - 1] + tf * hist[t]) / n_b[t];
        mu_o = (mu_o * n_o[t - 1] - tf * hist[t]) / n_o[t];
        let between = n_b[t] * n_o[t] * (mu_b - mu_o) * (mu_b - mu_o);
        if between > best {
            best = between;
            best_t = t as u32;
        }
    }
    Ok(best_t)
}
