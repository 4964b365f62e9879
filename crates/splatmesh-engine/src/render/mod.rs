//! wgpu binding of the generated vertex program.
//!
//! The host renderer owns the render pass, the fragment stage and the pipeline.
//! This module supplies everything on the vertex side of it:
//! - a shader module and bind group layout derived from the program's uniform table
//! - the uniform buffer, written from [`UniformValues`](crate::shader::UniformValues)
//! - packed splat textures uploaded as GPU textures
//! - the billboard quad and per-instance splat index buffers
//!
//! Bind group 0 is laid out as: uniform block at binding 0, textures from
//! binding 1 in uniform-table name order.

mod ctx;
mod layout;
mod stage;
mod textures;

pub use ctx::RenderCtx;
pub use layout::{
    bind_group_layout_entries, vertex_buffer_layouts, QuadVertex, SplatInstance, QUAD_INDICES, QUAD_VERTICES,
};
pub use stage::SplatVertexStage;
pub use textures::{GpuDataTexture, SplatTextureSet};
