//! cellseg-test - Regression test framework for cellseg
//!
//! Every crate's `tests/*_reg.rs` drives a [`RegParams`] that records value
//! and image comparisons and reports all failures at the end, instead of
//! stopping at the first mismatching assertion.
//!
//! # Usage
//!
//! ```ignore
//! use cellseg_test::RegParams;
//!
//! let mut rp = RegParams::new("watershed");
//! rp.compare_values(2.0, regions as f64, 0.0);
//! assert!(rp.cleanup());
//! ```
//!
//! # Environment Variables
//!
//! - `REGTEST_MODE`: Set to "compare" (default) or "display"
//! - `RUST_LOG`: Library log level, picked up by [`init_logging`]

mod params;
pub mod synth;

pub use params::{RegParams, RegTestMode};

/// Route `log` output from the library crates to stderr
///
/// Safe to call from every test; only the first call installs the logger.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
