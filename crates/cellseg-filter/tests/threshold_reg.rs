//! Threshold selection regression test
//!
//! Run with:
//! ```
//! cargo test -p cellseg-filter --test threshold_reg
//! ```

use cellseg_core::FloatImage;
use cellseg_filter::{
    FilterError, MAX_HISTOGRAM_BINS, full_histogram, murphy_rc_threshold, otsu_threshold,
    rc_threshold,
};
use cellseg_test::RegParams;
use cellseg_test::synth::{Disc, disc_image};

#[test]
fn threshold_reg() {
    let mut rp = RegParams::new("threshold");

    // Dim background, two bright nuclei
    let img = disc_image(
        64,
        48,
        12.0,
        &[Disc::new(18.0, 24.0, 10.0, 160.0), Disc::new(46.0, 24.0, 8.0, 140.0)],
    );
    let hist = full_histogram(&img).unwrap();
    rp.compare_values(161.0, hist.len() as f64, 0.0);
    rp.compare_values(img.len() as f64, hist.iter().sum::<u64>() as f64, 0.0);

    let rc = rc_threshold(&img, false).unwrap();
    let murphy = murphy_rc_threshold(&img, false).unwrap();
    let otsu = otsu_threshold(&img, false).unwrap() as f64;
    rp.note(format!("rc {rc}, murphy {murphy}, otsu {otsu}"));
    for (name, t) in [("rc", rc), ("murphy", murphy), ("otsu", otsu)] {
        rp.check(t >= 12.0 && t < 140.0, &format!("{name} threshold separates the classes"));
    }

    // Every nucleus pixel lies above the automatic threshold
    let above = img.data().iter().filter(|&&v| v as f64 > murphy).count();
    let nuclei = img.data().iter().filter(|&&v| v > 12.0).count();
    rp.compare_values(nuclei as f64, above as f64, 0.0);

    // Degenerate images
    let zeros = FloatImage::new(8, 8).unwrap();
    rp.compare_values(0.0, rc_threshold(&zeros, true).unwrap(), 0.0);
    rp.compare_values(0.0, otsu_threshold(&zeros, false).unwrap() as f64, 0.0);
    let flat = FloatImage::new_with_value(8, 8, 30.0).unwrap();
    rp.compare_values(30.0, murphy_rc_threshold(&flat, false).unwrap(), 0.0);

    // One saturated outlier beyond the 16-bit range
    let mut hot = FloatImage::new_with_value(8, 8, 1.0).unwrap();
    hot.set(0, 0, 1e12).unwrap();
    rp.check(
        matches!(
            murphy_rc_threshold(&hot, false),
            Err(FilterError::HistogramRange { limit: MAX_HISTOGRAM_BINS, .. })
        ),
        "oversized histogram is rejected",
    );

    assert!(rp.cleanup(), "threshold regression test failed");
}
