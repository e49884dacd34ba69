//! Euclidean distance transform
//!
//! Exact squared-distance transform by lower envelopes of parabolas
//! (Felzenszwalb & Huttenlocher), run once along columns and once along
//! rows, followed by a square root.

use crate::FilterResult;
use cellseg_core::{BinaryImage, FloatImage};

/// One-dimensional squared distance transform of sampled function `f`
///
/// `v` and `z` are scratch buffers of length `n` and `n + 1`.
fn edt_1d(f: &[f64], d: &mut [f64], v: &mut [usize], z: &mut [f64]) {
    let n = f.len();
    if n == 0 {
        return;
    }
    let mut k = 0usize;
    v[0] = 0;
    z[0] = f64::NEG_INFINITY;
    z[1] = f64::INFINITY;

    let intersect = |q: usize, p: usize| {
        let (qf, pf) = (q as f64, p as f64);
        ((f[q] + qf * qf) - (f[p] + pf * pf)) / (2.0 * qf - 2.0 * pf)
    };

    for q in 1..n {
        // z[0] is -inf, so k never underflows
        let mut s = intersect(q, v[k]);
        while s <= z[k] {
            k -= 1;
            s = intersect(q, v[k]);
        }
        k += 1;
        v[k] = q;
        z[k] = s;
        z[k + 1] = f64::INFINITY;
    }

    k = 0;
    for (q, out) in d.iter_mut().enumerate() {
        let qf = q as f64;
        while z[k + 1] < qf {
            k += 1;
        }
        let dv = qf - v[k] as f64;
        *out = dv * dv + f[v[k]];
    }
}

/// Distance of every foreground pixel to the nearest background pixel
///
/// Background pixels get 0. If the mask has no background pixel at all,
/// distances are measured to the nearest position just outside the image
/// frame instead.
pub fn distance_transform_edt(mask: &BinaryImage) -> FilterResult<FloatImage> {
    let w = mask.width() as usize;
    let h = mask.height() as usize;
    let mut out = FloatImage::new(mask.width(), mask.height())?;

    if mask.all() {
        for (i, dst) in out.data_mut().iter_mut().enumerate() {
            let x = i % w;
            let y = i / w;
            let d = (x + 1).min(w - x).min(y + 1).min(h - y);
            *dst = d as f32;
        }
        return Ok(out);
    }

    // Larger than any squared distance inside the image
    let far = (w * w + h * h) as f64 + 1.0;
    let mut grid: Vec<f64> = mask
        .data()
        .iter()
        .map(|&fg| if fg { far } else { 0.0 })
        .collect();

    let n = w.max(h);
    let mut f = vec![0.0; n];
    let mut d = vec![0.0; n];
    let mut v = vec![0usize; n];
    let mut z = vec![0.0; n + 1];

    for x in 0..w {
        for y in 0..h {
            f[y] = grid[y * w + x];
        }
        edt_1d(&f[..h], &mut d[..h], &mut v, &mut z);
        for y in 0..h {
            grid[y * w + x] = d[y];
        }
    }

    for y in 0..h {
        let row = &mut grid[y * w..(y + 1) * w];
        f[..w].copy_from_slice(row);
        edt_1d(&f[..w], &mut d[..w], &mut v, &mut z);
        row.copy_from_slice(&d[..w]);
    }

    for (dst, &sq) in out.data_mut().iter_mut().zip(&grid) {
        *dst = sq.sqrt() as f32;
    }
    Ok(out)
}
