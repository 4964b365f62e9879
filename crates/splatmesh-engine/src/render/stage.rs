use anyhow::{ensure, Context, Result};
use wgpu::util::DeviceExt;

use crate::shader::{SplatProgram, UniformValues, VariantKey, VERTEX_ENTRY_POINT};

use super::layout::{bind_group_layout_entries, vertex_buffer_layouts, SplatInstance, QUAD_INDICES, QUAD_VERTICES};
use super::textures::SplatTextureSet;
use super::RenderCtx;

/// GPU resources for the vertex side of a splat pipeline.
///
/// Resources are created lazily for the program passed to [`ensure`](Self::ensure)
/// and rebuilt when a different variant comes in.
#[derive(Default)]
pub struct SplatVertexStage {
    variant: Option<VariantKey>,
    shader: Option<wgpu::ShaderModule>,
    bind_group_layout: Option<wgpu::BindGroupLayout>,
    pipeline_layout: Option<wgpu::PipelineLayout>,

    uniform_buffer: Option<wgpu::Buffer>,
    bind_group: Option<wgpu::BindGroup>,

    quad_vbo: Option<wgpu::Buffer>,
    quad_ibo: Option<wgpu::Buffer>,

    instance_vbo: Option<wgpu::Buffer>,
    instance_capacity: usize,
    instance_count: u32,
}

impl SplatVertexStage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the shader module, layouts and uniform buffer for `program`.
    ///
    /// No-op when they already exist for the same variant.
    pub fn ensure(&mut self, ctx: RenderCtx<'_>, program: &SplatProgram) {
        let key = program.config().variant_key();
        if self.variant.as_ref() == Some(&key) && self.shader.is_some() {
            return;
        }

        let shader = ctx.device.create_shader_module(program.shader_module_descriptor());

        let entries = bind_group_layout_entries(program.uniforms());
        let bind_group_layout = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("splatmesh vertex bgl"),
            entries: &entries,
        });

        let pipeline_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("splatmesh pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let uniform_buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("splatmesh uniforms"),
            size: program.block_layout().size() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        log::debug!(
            "vertex stage resources created ({} bytes of uniforms, {} bindings)",
            program.block_layout().size(),
            entries.len()
        );

        self.variant = Some(key);
        self.shader = Some(shader);
        self.bind_group_layout = Some(bind_group_layout);
        self.pipeline_layout = Some(pipeline_layout);
        self.uniform_buffer = Some(uniform_buffer);

        // Bound against the previous layout.
        self.bind_group = None;
        self.ensure_static_buffers(ctx);
    }

    fn ensure_static_buffers(&mut self, ctx: RenderCtx<'_>) {
        if self.quad_vbo.is_some() && self.quad_ibo.is_some() {
            return;
        }

        self.quad_vbo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("splatmesh quad vbo"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        }));

        self.quad_ibo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("splatmesh quad ibo"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        }));
    }

    fn check_variant(&self, program: &SplatProgram) -> Result<()> {
        ensure!(
            self.variant.as_ref() == Some(&program.config().variant_key()),
            "vertex stage was not ensured for this program variant"
        );
        Ok(())
    }

    /// Uploads `values` into the uniform buffer.
    pub fn write(&self, ctx: RenderCtx<'_>, program: &SplatProgram, values: &UniformValues) -> Result<()> {
        self.check_variant(program)?;
        ensure!(
            values.table() == program.uniforms(),
            "uniform values belong to a different program variant"
        );
        let ubo = self.uniform_buffer.as_ref().context("uniform buffer missing")?;
        ctx.queue.write_buffer(ubo, 0, &program.block_layout().write(values));
        Ok(())
    }

    /// Binds the uniform buffer and `textures` into bind group 0.
    pub fn bind(&mut self, ctx: RenderCtx<'_>, program: &SplatProgram, textures: &SplatTextureSet) -> Result<()> {
        self.check_variant(program)?;
        let bgl = self.bind_group_layout.as_ref().context("bind group layout missing")?;
        let ubo = self.uniform_buffer.as_ref().context("uniform buffer missing")?;

        let mut entries = vec![wgpu::BindGroupEntry {
            binding: crate::shader::UNIFORM_BLOCK_BINDING,
            resource: ubo.as_entire_binding(),
        }];
        for binding in program.uniforms().texture_bindings() {
            let view = textures
                .view(binding.name)
                .with_context(|| format!("no texture for `{}`", binding.name))?;
            entries.push(wgpu::BindGroupEntry {
                binding: binding.binding,
                resource: wgpu::BindingResource::TextureView(view),
            });
        }

        self.bind_group = Some(ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("splatmesh vertex bind group"),
            layout: bgl,
            entries: &entries,
        }));
        Ok(())
    }

    /// Uploads the splat indexes to draw, in draw order.
    pub fn write_instances(&mut self, ctx: RenderCtx<'_>, splat_indexes: &[u32]) {
        self.ensure_instance_capacity(ctx, splat_indexes.len());
        self.instance_count = splat_indexes.len() as u32;
        if splat_indexes.is_empty() {
            return;
        }
        let Some(instance_vbo) = self.instance_vbo.as_ref() else { return };
        ctx.queue.write_buffer(instance_vbo, 0, bytemuck::cast_slice(splat_indexes));
    }

    fn ensure_instance_capacity(&mut self, ctx: RenderCtx<'_>, required_instances: usize) {
        if required_instances <= self.instance_capacity && self.instance_vbo.is_some() {
            return;
        }

        let new_cap = required_instances.next_power_of_two().max(1024);
        let new_size = (new_cap * std::mem::size_of::<SplatInstance>()) as u64;

        self.instance_vbo = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("splatmesh instance vbo"),
            size: new_size,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.instance_capacity = new_cap;
    }

    /// Pipeline layout for a caller-built render pipeline.
    pub fn pipeline_layout(&self) -> Option<&wgpu::PipelineLayout> {
        self.pipeline_layout.as_ref()
    }

    /// Vertex state for a caller-built render pipeline.
    pub fn vertex_state(&self) -> Option<wgpu::VertexState<'_>> {
        Some(wgpu::VertexState {
            module: self.shader.as_ref()?,
            entry_point: Some(VERTEX_ENTRY_POINT),
            compilation_options: Default::default(),
            buffers: vertex_buffer_layouts(),
        })
    }

    /// Records the instanced draw. The pass must use a pipeline built from
    /// [`vertex_state`](Self::vertex_state) and [`pipeline_layout`](Self::pipeline_layout).
    pub fn draw(&self, rpass: &mut wgpu::RenderPass<'_>) {
        if self.instance_count == 0 {
            return;
        }
        let Some(bind_group) = self.bind_group.as_ref() else { return };
        let Some(quad_vbo) = self.quad_vbo.as_ref() else { return };
        let Some(quad_ibo) = self.quad_ibo.as_ref() else { return };
        let Some(instance_vbo) = self.instance_vbo.as_ref() else { return };

        rpass.set_bind_group(0, bind_group, &[]);
        rpass.set_vertex_buffer(0, quad_vbo.slice(..));
        rpass.set_vertex_buffer(1, instance_vbo.slice(..));
        rpass.set_index_buffer(quad_ibo.slice(..), wgpu::IndexFormat::Uint16);
        rpass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, 0..self.instance_count);
    }
}
