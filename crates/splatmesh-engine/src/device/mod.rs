//! GPU device acquisition.
//!
//! The splat vertex stage only needs a device and a queue; surfaces and
//! presentation belong to the host renderer. [`HeadlessGpu`] covers tools and
//! tests that have no window.

mod gpu;

pub use gpu::{DeviceInit, HeadlessGpu};
