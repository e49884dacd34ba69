//! Shape descriptors of binary masks
//!
//! The merge score only needs a fixed-length feature vector per mask, so the
//! extractor sits behind the [`ShapeFeatures`] trait. [`HullFeatures`] is
//! the default implementation, built on the convex hull of the mask's pixel
//! squares.

use cellseg_core::BinaryImage;
use std::f64::consts::PI;

/// Fixed-length numeric description of a binary mask
pub trait ShapeFeatures {
    /// Length of every vector returned by [`ShapeFeatures::extract`]
    fn dimension(&self) -> usize;

    /// Describe the set pixels of `mask`
    fn extract(&self, mask: &BinaryImage) -> Vec<f64>;
}

impl<T: ShapeFeatures + ?Sized> ShapeFeatures for &T {
    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    fn extract(&self, mask: &BinaryImage) -> Vec<f64> {
        (**self).extract(mask)
    }
}

/// Convex-hull shape and size descriptors
///
/// Produces, in order:
///
/// 0. hull fraction: pixel count over hull area
/// 1. hull shape factor: `perimeter^2 / (4 pi area)` of the hull
/// 2. eccentricity of the pixel second moments
/// 3. hull area
/// 4. hull perimeter
///
/// An empty mask yields all zeros.
#[derive(Debug, Clone, Copy, Default)]
pub struct HullFeatures;

impl HullFeatures {
    /// Number of features produced
    pub const DIMENSION: usize = 5;
}

impl ShapeFeatures for HullFeatures {
    fn dimension(&self) -> usize {
        Self::DIMENSION
    }

    fn extract(&self, mask: &BinaryImage) -> Vec<f64> {
        let count = mask.count();
        if count == 0 {
            return vec![0.0; Self::DIMENSION];
        }

        let mut corners = Vec::with_capacity(count * 4);
        let mut moments = Moments::default();
        for (i, _) in mask.data().iter().enumerate().filter(|&(_, &set)| set) {
            let (x, y) = mask.coords_of(i);
            let (x, y) = (x as i64, y as i64);
            corners.extend([(x, y), (x + 1, y), (x, y + 1), (x + 1, y + 1)]);
            moments.add(x as f64, y as f64);
        }

        let hull = convex_hull(corners);
        let area = polygon_area(&hull);
        let perimeter = polygon_perimeter(&hull);

        vec![
            count as f64 / area,
            perimeter * perimeter / (4.0 * PI * area),
            moments.eccentricity(),
            area,
            perimeter,
        ]
    }
}

#[derive(Debug, Default)]
struct Moments {
    n: f64,
    sx: f64,
    sy: f64,
    sxx: f64,
    syy: f64,
    sxy: f64,
}

impl Moments {
    fn add(&mut self, x: f64, y: f64) {
        self.n += 1.0;
        self.sx += x;
        self.sy += y;
        self.sxx += x * x;
        self.syy += y * y;
        self.sxy += x * y;
    }

    fn eccentricity(&self) -> f64 {
        let mx = self.sx / self.n;
        let my = self.sy / self.n;
        let mu20 = self.sxx / self.n - mx * mx;
        let mu02 = self.syy / self.n - my * my;
        let mu11 = self.sxy / self.n - mx * my;

        let half_sum = (mu20 + mu02) / 2.0;
        let root = (((mu20 - mu02) / 2.0).powi(2) + mu11 * mu11).sqrt();
        let major = half_sum + root;
        let minor = (half_sum - root).max(0.0);
        if major <= f64::EPSILON {
            return 0.0;
        }
        (1.0 - minor / major).max(0.0).sqrt()
    }
}

fn cross(o: (i64, i64), a: (i64, i64), b: (i64, i64)) -> i64 {
    (a.0 - o.0) * (b.1 - o.1) - (a.1 - o.1) * (b.0 - o.0)
}

/// One chain of Andrew's monotone chain algorithm
fn half_hull<'a>(points: impl Iterator<Item = &'a (i64, i64)>) -> Vec<(i64, i64)> {
    let mut chain: Vec<(i64, i64)> = Vec::new();
    for &p in points {
        while chain.len() >= 2 && cross(chain[chain.len() - 2], chain[chain.len() - 1], p) <= 0 {
            chain.pop();
        }
        chain.push(p);
    }
    chain
}

/// Counter-clockwise convex hull without collinear points
fn convex_hull(mut points: Vec<(i64, i64)>) -> Vec<(i64, i64)> {
    points.sort_unstable();
    points.dedup();
    if points.len() < 3 {
        return points;
    }
    let mut lower = half_hull(points.iter());
    let mut upper = half_hull(points.iter().rev());
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

fn polygon_area(poly: &[(i64, i64)]) -> f64 {
    if poly.len() < 3 {
        return 0.0;
    }
    let twice: i64 = (0..poly.len())
        .map(|i| {
            let (a, b) = (poly[i], poly[(i + 1) % poly.len()]);
            a.0 * b.1 - b.0 * a.1
        })
        .sum();
    twice.abs() as f64 / 2.0
}

fn polygon_perimeter(poly: &[(i64, i64)]) -> f64 {
    if poly.len() < 2 {
        return 0.0;
    }
    (0..poly.len())
        .map(|i| {
            let (a, b) = (poly[i], poly[(i + 1) % poly.len()]);
            (((b.0 - a.0).pow(2) + (b.1 - a.1).pow(2)) as f64).sqrt()
        })
        .sum()
}
