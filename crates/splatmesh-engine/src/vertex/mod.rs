//! CPU evaluation of the splat vertex program.
//!
//! [`VertexStage`] runs the same per-splat steps as the generated WGSL against
//! [`DataTexture`](crate::packing::DataTexture)s and
//! [`UniformValues`](crate::shader::UniformValues). The culling and shading
//! predicates are exposed on their own so they can be checked in isolation.

mod cull;
mod shading;
mod stage;

use glam::Vec4;

pub use cull::{frustum_discards, ray_intersects_aabb, room_discards, scene_effect_discards};
pub use shading::{fade_in_factor, sh_view_dependent_color, SH_C1, SH_C2};
pub use stage::{StageTextures, VertexInput, VertexOutput, VertexStage};

/// Clip-space margin: splats are kept while `|x|, |y|, |z| <= FRUSTUM_MARGIN * w`.
pub const FRUSTUM_MARGIN: f32 = 1.2;

/// Scenes at or below this opacity are culled when per-scene effects are compiled in.
pub const MIN_SCENE_OPACITY: f32 = 0.01;

/// Width of the fade-in falloff band, in world units.
pub const FADE_DISTANCE: f32 = 0.75;

/// Clip position emitted for discarded splats. Lies beyond the far plane.
pub const DISCARDED_POSITION: Vec4 = Vec4::new(0.0, 0.0, 2.0, 1.0);
