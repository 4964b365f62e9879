use std::borrow::Cow;
use std::num::NonZeroU64;

use bytemuck::{Pod, Zeroable};

use crate::shader::{SplatProgram, TextureSample, UniformBlockLayout, UniformTable, UNIFORM_BLOCK_BINDING};

// ── vertex buffers ────────────────────────────────────────────────────────

/// Billboard corner, `@location(0)`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 3],
}

impl QuadVertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
}

/// One splat per instance, `@location(1)`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Pod, Zeroable)]
pub struct SplatInstance {
    pub splat_index: u32,
}

impl SplatInstance {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Uint32];
}

pub const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex { position: [-1.0, -1.0, 0.0] },
    QuadVertex { position: [1.0, -1.0, 0.0] },
    QuadVertex { position: [1.0, 1.0, 0.0] },
    QuadVertex { position: [-1.0, 1.0, 0.0] },
];

pub const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

static VERTEX_BUFFERS: [wgpu::VertexBufferLayout<'static>; 2] = [
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<QuadVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &QuadVertex::ATTRS,
    },
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<SplatInstance>() as u64,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &SplatInstance::ATTRS,
    },
];

/// Slot 0: quad corners (per vertex). Slot 1: splat indexes (per instance).
pub fn vertex_buffer_layouts() -> &'static [wgpu::VertexBufferLayout<'static>] {
    &VERTEX_BUFFERS
}

// ── bind group 0 ──────────────────────────────────────────────────────────

pub(super) fn uniform_block_min_size(layout: &UniformBlockLayout) -> Option<NonZeroU64> {
    NonZeroU64::new(layout.size() as u64)
}

/// Bind group 0 layout entries for the program that owns `table`.
pub fn bind_group_layout_entries(table: &UniformTable) -> Vec<wgpu::BindGroupLayoutEntry> {
    let block = UniformBlockLayout::from_table(table);

    let mut entries = vec![wgpu::BindGroupLayoutEntry {
        binding: UNIFORM_BLOCK_BINDING,
        visibility: wgpu::ShaderStages::VERTEX,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: uniform_block_min_size(&block),
        },
        count: None,
    }];

    entries.extend(table.texture_bindings().into_iter().map(|binding| {
        let sample_type = match binding.sample {
            TextureSample::Uint => wgpu::TextureSampleType::Uint,
            // Loaded with textureLoad only; 32-bit float formats are not filterable.
            TextureSample::Float => wgpu::TextureSampleType::Float { filterable: false },
        };
        wgpu::BindGroupLayoutEntry {
            binding: binding.binding,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Texture {
                sample_type,
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        }
    }));

    entries
}

impl SplatProgram {
    /// WGSL shader module descriptor for this program.
    pub fn shader_module_descriptor(&self) -> wgpu::ShaderModuleDescriptor<'_> {
        wgpu::ShaderModuleDescriptor {
            label: Some("splatmesh vertex shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(self.source())),
        }
    }
}
