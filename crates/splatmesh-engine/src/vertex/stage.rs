use anyhow::{bail, ensure, Result};
use glam::{Mat4, UVec2, Vec2, Vec3, Vec4};

use crate::packing::{data_texel_coord, decode_center, unpack_rgba8, DataTexture, ShLayout, ShPrecision, ShTextures};
use crate::shader::{build_uniform_table, SplatShaderConfig, UniformValues, DEFAULT_DATA_TEXTURE_SIZE};

use super::cull::{frustum_discards, room_discards, scene_effect_discards};
use super::shading::{fade_in_factor, sh_view_dependent_color};
use super::DISCARDED_POSITION;

/// Per-vertex attributes: billboard corner and instance splat index.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct VertexInput {
    pub position: Vec3,
    pub splat_index: u32,
}

/// Values handed to the fragment stage.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct VertexOutput {
    pub clip_position: Vec4,
    pub color: Vec4,
    pub local_position: Vec2,
    pub scene_index: u32,
}

impl VertexOutput {
    /// The output of a culled splat: sentinel position, everything else zero.
    pub const DISCARDED: Self = Self {
        clip_position: DISCARDED_POSITION,
        color: Vec4::ZERO,
        local_position: Vec2::ZERO,
        scene_index: 0,
    };

    #[inline]
    pub fn is_discarded(&self) -> bool {
        *self == Self::DISCARDED
    }
}

/// Textures bound to a [`VertexStage`].
#[derive(Debug, Copy, Clone)]
pub struct StageTextures<'a> {
    pub centers_colors: &'a DataTexture<u32>,
    /// Required when the variant reads scene indexes.
    pub scene_indexes: Option<&'a DataTexture<u32>>,
    /// Required when the variant compiles SH in.
    pub sh: Option<&'a ShTextures>,
}

/// The vertex program of one variant, evaluated on the CPU.
#[derive(Debug)]
pub struct VertexStage<'a> {
    config: &'a SplatShaderConfig,
    uniforms: &'a UniformValues,
    textures: StageTextures<'a>,
}

impl<'a> VertexStage<'a> {
    /// Binds uniforms and textures to the variant described by `config`.
    ///
    /// Fails when the bindings do not satisfy what the variant reads.
    pub fn new(config: &'a SplatShaderConfig, uniforms: &'a UniformValues, textures: StageTextures<'a>) -> Result<Self> {
        config.validate()?;
        ensure!(
            *uniforms.table() == build_uniform_table(config),
            "uniform values were created for a different program variant"
        );
        ensure!(
            !config.uses_scene_indexes() || textures.scene_indexes.is_some(),
            "variant reads scene indexes but no scene index texture is bound"
        );

        if config.max_sh_degree >= 1 {
            let Some(sh) = textures.sh else {
                bail!("variant compiles SH degree {} but no SH textures are bound", config.max_sh_degree);
            };
            ensure!(
                sh.degree() == config.max_sh_degree,
                "SH textures packed for degree {}, variant compiled for {}",
                sh.degree(),
                config.max_sh_degree
            );
            let multi = uniforms.int("sh_multi_texture_mode").unwrap_or(0) != 0;
            let eight_bit = uniforms.int("sh_8bit_mode").unwrap_or(0) != 0;
            ensure!(
                multi == (sh.layout() == ShLayout::MultiTexture)
                    && eight_bit == (sh.precision() == ShPrecision::Uint8),
                "SH mode uniforms disagree with the bound SH textures"
            );
            ensure!(
                uniforms.uvec2("sh_texture_size").map(|s| s.to_array()) == Some(sh.size()),
                "sh_texture_size does not match the bound SH textures"
            );
        }

        Ok(Self { config, uniforms, textures })
    }

    fn size(&self, name: &str) -> UVec2 {
        self.uniforms.uvec2(name).unwrap_or(DEFAULT_DATA_TEXTURE_SIZE)
    }

    fn mat4(&self, name: &str) -> Mat4 {
        self.uniforms.mat4(name).unwrap_or(Mat4::IDENTITY)
    }

    fn scene_transform(&self, scene_index: u32) -> Mat4 {
        self.uniforms.mat4_at("transforms", scene_index as usize).unwrap_or(Mat4::IDENTITY)
    }

    /// Runs the vertex program for one vertex.
    pub fn run(&self, vin: VertexInput) -> VertexOutput {
        let config = self.config;
        let u = self.uniforms;
        let splat_index = vin.splat_index;

        let centers_size = self.size("centers_colors_texture_size");
        let sampled = self.textures.centers_colors.load(data_texel_coord(splat_index, centers_size.x));
        let splat_center = decode_center(sampled);

        let scene_index = match (config.uses_scene_indexes(), self.textures.scene_indexes) {
            (true, Some(tex)) => tex.load(data_texel_coord(splat_index, self.size("scene_indexes_texture_size").x))[0],
            _ => 0,
        };
        let camera_position = u.vec3("camera_position").unwrap_or(Vec3::ZERO);

        if config.use_room_clipping {
            let world_center = if config.dynamic_mode {
                self.scene_transform(scene_index).transform_point3(splat_center)
            } else {
                splat_center
            };
            let i = scene_index as usize;
            let aabb_min = u.vec3_at("aabb_mins", i).unwrap_or(Vec3::splat(-1.0));
            let aabb_max = u.vec3_at("aabb_maxs", i).unwrap_or(Vec3::ONE);
            if room_discards(world_center, camera_position, aabb_min, aabb_max) {
                return VertexOutput::DISCARDED;
            }
        }

        if config.enable_optional_effects {
            let i = scene_index as usize;
            let opacity = u.float_at("scene_opacity", i).unwrap_or(1.0);
            let visible = u.int_at("scene_visibility", i).unwrap_or(1) != 0;
            if scene_effect_discards(opacity, visible) {
                return VertexOutput::DISCARDED;
            }
        }

        let model_view = if config.dynamic_mode {
            self.mat4("model_view_matrix") * self.scene_transform(scene_index)
        } else {
            self.mat4("model_view_matrix")
        };
        let clip_center = self.mat4("projection_matrix") * model_view * splat_center.extend(1.0);
        if frustum_discards(clip_center) {
            return VertexOutput::DISCARDED;
        }

        let mut color = Vec4::from_array(unpack_rgba8(sampled[0]));

        let sh_degree = u.int("sh_degree").unwrap_or(0).clamp(0, i32::from(config.max_sh_degree)) as u8;
        if let (true, Some(sh)) = (sh_degree >= 1, self.textures.sh) {
            let view_dir = if config.dynamic_mode {
                let m_transform = self.mat4("model_matrix") * self.scene_transform(scene_index);
                let local_camera = m_transform.inverse().transform_point3(camera_position);
                (splat_center - local_camera).normalize()
            } else {
                (splat_center - camera_position).normalize()
            };
            let rgb = sh_view_dependent_color(color.truncate(), &sh.fetch(splat_index), sh_degree, view_dir);
            color = rgb.extend(color.w);
        }

        if config.fade_in && u.int("fade_in_complete").unwrap_or(0) == 0 {
            let scene_center = u.vec3("scene_center").unwrap_or(Vec3::ZERO);
            let start = u.float("visible_region_fade_start_radius").unwrap_or(0.0);
            color.w *= fade_in_factor((splat_center - scene_center).length(), start);
        }

        VertexOutput {
            clip_position: clip_center,
            color,
            local_position: vin.position.truncate(),
            scene_index: if config.use_room_clipping { scene_index } else { 0 },
        }
    }
}
