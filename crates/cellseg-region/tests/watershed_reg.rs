//! Watershed regression test
//!
//! Drives the surface builder and the segmenter on synthetic nuclei.
//!
//! Run with:
//! ```
//! cargo test -p cellseg-region --test watershed_reg
//! ```

use cellseg_core::{BinaryImage, FloatImage, GrayImage, LabelImage};
use cellseg_region::{
    ConnectivityType, SurfaceOptions, WatershedOptions, build_surface, seeded_watershed,
    segment_watershed,
};
use cellseg_test::RegParams;
use cellseg_test::synth::{Disc, disc_image};

#[test]
fn watershed_reg() {
    let mut rp = RegParams::new("watershed");

    // -----------------------------------------------------------
    // Two separate nuclei
    // -----------------------------------------------------------
    let img = disc_image(
        48,
        32,
        10.0,
        &[Disc::new(10.0, 16.0, 8.0, 200.0), Disc::new(38.0, 16.0, 8.0, 200.0)],
    );
    let options = SurfaceOptions::new().with_threshold(100.0);
    let surface = build_surface(&img, &options).unwrap();
    rp.check(surface.mask.get(10, 16).unwrap(), "left center is foreground");
    rp.check(!surface.mask.get(24, 16).unwrap(), "gap is background");

    let seg = segment_watershed(&surface.mask, &surface.surface, &WatershedOptions::default())
        .unwrap();
    rp.note(format!("{} regions", seg.region_count));
    rp.check(seg.region_count >= 2, "one or more regions per nucleus");
    rp.compare_values(
        seg.region_count as f64,
        seg.labels.region_count() as f64,
        0.0,
    );
    let left = seg.labels.get(10, 16).unwrap();
    let right = seg.labels.get(38, 16).unwrap();
    rp.check(left != 0 && right != 0 && left != right, "centers are distinct regions");
    rp.check(
        seg.labels
            .data()
            .iter()
            .zip(surface.mask.data())
            .all(|(&v, &m)| (v != 0) == m),
        "labels cover exactly the mask",
    );
    rp.check(
        seg.lines
            .data()
            .iter()
            .zip(seg.labels.data())
            .all(|(&line, &v)| !line || v != 0),
        "lines lie on labeled pixels",
    );

    // -----------------------------------------------------------
    // Touching nuclei are split at the neck
    // -----------------------------------------------------------
    let img = disc_image(
        40,
        24,
        10.0,
        &[Disc::new(12.0, 12.0, 8.0, 200.0), Disc::new(26.0, 12.0, 8.0, 200.0)],
    );
    let surface = build_surface(&img, &SurfaceOptions::new().with_threshold(100.0)).unwrap();
    let seg = segment_watershed(&surface.mask, &surface.surface, &WatershedOptions::default())
        .unwrap();
    let left = seg.labels.get(12, 12).unwrap();
    let right = seg.labels.get(26, 12).unwrap();
    rp.check(left != 0 && right != 0 && left != right, "dumbbell halves are distinct");
    rp.compare_values(
        surface.mask.count() as f64,
        seg.labels.foreground().count() as f64,
        0.0,
    );

    // -----------------------------------------------------------
    // Empty foreground
    // -----------------------------------------------------------
    let dark = FloatImage::new_with_value(16, 16, 5.0).unwrap();
    let surface = build_surface(&dark, &SurfaceOptions::new().with_threshold(100.0)).unwrap();
    let seg = segment_watershed(&surface.mask, &surface.surface, &WatershedOptions::default())
        .unwrap();
    rp.compare_values(0.0, seg.region_count as f64, 0.0);
    rp.compare_images(&LabelImage::new(16, 16).unwrap(), &seg.labels);

    // -----------------------------------------------------------
    // Flooding a masked plateau reaches every connected pixel
    // -----------------------------------------------------------
    let flat = GrayImage::new_with_value(8, 8, 7).unwrap();
    let mut markers = LabelImage::new(8, 8).unwrap();
    markers.set(0, 0, 1).unwrap();
    markers.set(7, 7, 2).unwrap();
    let mut mask = BinaryImage::new_with_value(8, 8, true).unwrap();
    mask.set(4, 4, false).unwrap();
    let options = WatershedOptions::new().with_connectivity(ConnectivityType::EightWay);
    let flood = seeded_watershed(&flat, &markers, Some(&mask), &options).unwrap();
    rp.compare_values(63.0, flood.labels.foreground().count() as f64, 0.0);
    rp.compare_values(0.0, flood.labels.get(4, 4).unwrap() as f64, 0.0);
    rp.check(flood.lines.any(), "the two fronts meet");

    assert!(rp.cleanup(), "watershed regression test failed");
}
