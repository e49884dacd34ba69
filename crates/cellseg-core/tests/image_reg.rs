//! Image container regression test
//!
//! Run with:
//! ```
//! cargo test -p cellseg-core --test image_reg
//! ```

use cellseg_core::{Error, FloatImage, GrayImage, LabelImage};
use cellseg_test::RegParams;

#[test]
fn image_reg() {
    let mut rp = RegParams::new("image");

    // -----------------------------------------------------------
    // Shapes from [rows, cols] buffers
    // -----------------------------------------------------------
    let img = FloatImage::from_shape(&[3, 4], (0..12).map(|v| v as f32).collect()).unwrap();
    rp.compare_values(4.0, img.width() as f64, 0.0);
    rp.compare_values(3.0, img.height() as f64, 0.0);
    rp.compare_values(6.0, img.get(2, 1).unwrap() as f64, 0.0);
    rp.check(
        matches!(
            FloatImage::from_shape(&[2, 2, 3], vec![0.0; 12]),
            Err(Error::InvalidDimensionality(3))
        ),
        "3-D buffers are rejected",
    );
    rp.check(
        matches!(
            LabelImage::from_shape(&[12], vec![0; 12]),
            Err(Error::InvalidDimensionality(1))
        ),
        "1-D buffers are rejected",
    );

    // -----------------------------------------------------------
    // Rescaling to 8 bits
    // -----------------------------------------------------------
    let gray = img.rescale_to_gray();
    rp.compare_values(0.0, gray.get(0, 0).unwrap() as f64, 0.0);
    rp.compare_values(255.0, gray.get(3, 2).unwrap() as f64, 0.0);
    let flat = FloatImage::new_with_value(3, 3, 7.0).unwrap().rescale_to_gray();
    rp.compare_images(&GrayImage::new(3, 3).unwrap(), &flat);

    // -----------------------------------------------------------
    // Label bookkeeping
    // -----------------------------------------------------------
    let mut labels = LabelImage::from_shape(&[2, 3], vec![1, 1, 2, 3, 3, 2]).unwrap();
    rp.compare_values(3.0, labels.region_count() as f64, 0.0);
    let ones = labels.footprint(1);
    let threes = labels.footprint(3);
    rp.compare_values(2.0, labels.replace_label(3, 1) as f64, 0.0);
    let mut union = [ones, threes].concat();
    union.sort_unstable();
    rp.check(labels.footprint(1) == union, "relabeled footprint is the union");
    rp.compare_values(2.0, labels.region_count() as f64, 0.0);
    // Label 2 sits at indices 2 and 5, where the ramp holds 2 and 5
    rp.compare_values(3.5, img.mean_over(&labels.footprint(2)).unwrap(), 1e-9);

    assert!(rp.cleanup(), "image regression test failed");
}
