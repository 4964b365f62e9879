//! Splatmesh engine crate.
//!
//! This crate owns the vertex-program synthesis for Gaussian splat rendering
//! and the per-scene transform model the generated program reads.
//!
//! - `shader` builds WGSL source plus the matching uniform table.
//! - `scene` holds the per-scene descriptors and turns them into uniform arrays.
//! - `packing` mirrors the texture layouts produced by the upload pipeline.
//! - `vertex` evaluates the generated vertex stage on the CPU.
//! - `render` and `device` bind the program to wgpu.

pub mod device;
pub mod logging;
pub mod packing;
pub mod render;
pub mod scene;
pub mod shader;
pub mod vertex;
