//! Per-scene state consumed by the splat vertex program.
//!
//! A splat mesh holds up to [`MAX_SCENES`] scenes. Each splat carries the index
//! of its owning scene (see `packing::encode_scene_indexes`), and the vertex
//! program looks up that scene's transform, opacity, visibility and room
//! bounds in uniform arrays sized to `MAX_SCENES`.

mod descriptor;
mod uniforms;

pub use descriptor::{SceneOptions, SplatScene};
pub use uniforms::SceneUniformArrays;

/// Upper bound on scenes per splat mesh. Sizes every per-scene uniform array.
///
/// Must stay a multiple of four: scalar per-scene arrays are packed four to a
/// `vec4` in the uniform block.
pub const MAX_SCENES: usize = 32;

const _: () = assert!(MAX_SCENES % 4 == 0);
