//! WGSL text of the splat vertex program, one constant or generator per fragment.
//!
//! Bodies are raw text; `program::FRAGMENTS` decides which of them are emitted
//! and in what order. Main-entry fragments are indented for a body nested one
//! level deep, SH fragments two levels.

use std::fmt::Write as _;

use crate::packing::SH_8BIT_COMPRESSION_RANGE;
use crate::vertex::{FADE_DISTANCE, FRUSTUM_MARGIN, MIN_SCENE_OPACITY};

use super::uniforms::{build_uniform_table, UniformBlockLayout, UNIFORM_BLOCK_BINDING};
use super::SplatShaderConfig;

// ── declarations ──────────────────────────────────────────────────────────

pub(super) fn uniform_block(config: &SplatShaderConfig) -> String {
    let table = build_uniform_table(config);
    let layout = UniformBlockLayout::from_table(&table);

    let mut out = String::from("struct SplatUniforms {\n");
    for member in layout.members() {
        let _ = writeln!(out, "    {}: {},", member.name, member.kind.wgsl_type());
    }
    out.push_str("}\n\n");
    let _ = writeln!(
        out,
        "@group(0) @binding({UNIFORM_BLOCK_BINDING}) var<uniform> u: SplatUniforms;"
    );
    out
}

pub(super) fn texture_bindings(config: &SplatShaderConfig) -> String {
    let table = build_uniform_table(config);
    let mut out = String::new();
    for binding in table.texture_bindings() {
        let kind = table.get(binding.name).map(|d| d.kind.wgsl_type()).unwrap_or_default();
        let _ = writeln!(out, "@group(0) @binding({}) var {}: {};", binding.binding, binding.name, kind);
    }
    out
}

pub(super) fn custom_declarations(config: &SplatShaderConfig) -> String {
    let mut out = config.custom_declarations.trim_end().to_owned();
    out.push('\n');
    out
}

pub(super) const IO_STRUCTS: &str = r#"struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) splat_index: u32,
}

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
    @location(1) local_position: vec2<f32>,
    @location(2) @interpolate(flat) scene_index: u32,
}
"#;

pub(super) fn constants(_config: &SplatShaderConfig) -> String {
    format!(
        r#"const SH_C1: f32 = 0.4886025119029199;
const SH_C2 = array<f32, 5>(1.0925484, -1.0925484, 0.3153916, -1.0925484, 0.5462742);

const SH_8BIT_COMPRESSION_RANGE: f32 = {range:.1};
const SH_8BIT_COMPRESSION_HALF_RANGE: f32 = SH_8BIT_COMPRESSION_RANGE / 2.0;

const FRUSTUM_MARGIN: f32 = {margin:.1};
const MIN_SCENE_OPACITY: f32 = {opacity:.2};
const FADE_DISTANCE: f32 = {fade:.2};
const DISCARDED_POSITION = vec4<f32>(0.0, 0.0, 2.0, 1.0);
"#,
        range = SH_8BIT_COMPRESSION_RANGE,
        margin = FRUSTUM_MARGIN,
        opacity = MIN_SCENE_OPACITY,
        fade = FADE_DISTANCE,
    )
}

pub(super) const HELPERS: &str = r#"fn unpack_rgba(packed: u32) -> vec4<f32> {
    return unpack4x8unorm(packed);
}

fn data_coord(texel: u32, size: vec2<u32>) -> vec2<i32> {
    return vec2<i32>(i32(texel % size.x), i32(texel / size.x));
}

fn discarded_output() -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = DISCARDED_POSITION;
    out.color = vec4<f32>(0.0);
    out.local_position = vec2<f32>(0.0);
    out.scene_index = 0u;
    return out;
}
"#;

pub(super) const RAY_AABB: &str = r#"fn ray_intersects_aabb(ray_origin: vec3<f32>, ray_dir: vec3<f32>, scene_index: u32) -> vec2<f32> {
    let t_min = (u.aabb_mins[scene_index] - ray_origin) / ray_dir;
    let t_max = (u.aabb_maxs[scene_index] - ray_origin) / ray_dir;
    let t1 = min(t_min, t_max);
    let t2 = max(t_min, t_max);
    let t_near = max(max(t1.x, t1.y), t1.z);
    let t_far = min(min(t2.x, t2.y), t2.z);
    return vec2<f32>(t_near, t_far);
}
"#;

pub(super) const MAT4_INVERSE: &str = r#"fn inverse_mat4(m: mat4x4<f32>) -> mat4x4<f32> {
    let a00 = m[0][0]; let a01 = m[0][1]; let a02 = m[0][2]; let a03 = m[0][3];
    let a10 = m[1][0]; let a11 = m[1][1]; let a12 = m[1][2]; let a13 = m[1][3];
    let a20 = m[2][0]; let a21 = m[2][1]; let a22 = m[2][2]; let a23 = m[2][3];
    let a30 = m[3][0]; let a31 = m[3][1]; let a32 = m[3][2]; let a33 = m[3][3];

    let b00 = a00 * a11 - a01 * a10;
    let b01 = a00 * a12 - a02 * a10;
    let b02 = a00 * a13 - a03 * a10;
    let b03 = a01 * a12 - a02 * a11;
    let b04 = a01 * a13 - a03 * a11;
    let b05 = a02 * a13 - a03 * a12;
    let b06 = a20 * a31 - a21 * a30;
    let b07 = a20 * a32 - a22 * a30;
    let b08 = a20 * a33 - a23 * a30;
    let b09 = a21 * a32 - a22 * a31;
    let b10 = a21 * a33 - a23 * a31;
    let b11 = a22 * a33 - a23 * a32;

    let inv_det = 1.0 / (b00 * b11 - b01 * b10 + b02 * b09 + b03 * b08 - b04 * b07 + b05 * b06);

    return mat4x4<f32>(
        vec4<f32>(
            a11 * b11 - a12 * b10 + a13 * b09,
            a02 * b10 - a01 * b11 - a03 * b09,
            a31 * b05 - a32 * b04 + a33 * b03,
            a22 * b04 - a21 * b05 - a23 * b03,
        ) * inv_det,
        vec4<f32>(
            a12 * b08 - a10 * b11 - a13 * b07,
            a00 * b11 - a02 * b08 + a03 * b07,
            a32 * b02 - a30 * b05 - a33 * b01,
            a20 * b05 - a22 * b02 + a23 * b01,
        ) * inv_det,
        vec4<f32>(
            a10 * b10 - a11 * b08 + a13 * b06,
            a01 * b08 - a00 * b10 - a03 * b06,
            a30 * b04 - a31 * b02 + a33 * b00,
            a21 * b02 - a20 * b04 - a23 * b00,
        ) * inv_det,
        vec4<f32>(
            a11 * b07 - a10 * b09 - a12 * b06,
            a00 * b09 - a01 * b07 + a02 * b06,
            a31 * b01 - a30 * b03 - a32 * b00,
            a20 * b03 - a21 * b01 + a22 * b00,
        ) * inv_det,
    );
}
"#;

// ── main entry ────────────────────────────────────────────────────────────

pub(super) const MAIN_PROLOGUE: &str = r#"@vertex
fn vs_main(vin: VertexInput) -> VertexOutput {
    let splat_index = vin.splat_index;
    let odd_offset = splat_index & 1u;
    let double_odd_offset = odd_offset * 2u;
    let nearest_even_index = splat_index - odd_offset;
    let f_odd_offset = f32(odd_offset);

    let sampled_center_color = textureLoad(centers_colors_texture, data_coord(splat_index, u.centers_colors_texture_size), 0);
    let splat_center = bitcast<vec3<f32>>(sampled_center_color.yzw);
"#;

pub(super) const SCENE_INDEX_FETCH: &str = r#"
    let scene_index = textureLoad(scene_indexes_texture, data_coord(splat_index, u.scene_indexes_texture_size), 0).r;
"#;

pub(super) const ROOM_CENTER_STATIC: &str = r#"
    let world_splat_center = vec4<f32>(splat_center, 1.0);
"#;

pub(super) const ROOM_CENTER_DYNAMIC: &str = r#"
    let world_splat_center = u.transforms[scene_index] * vec4<f32>(splat_center, 1.0);
"#;

pub(super) const ROOM_CLIP: &str = r#"    let ray_dir = normalize(world_splat_center.xyz - u.camera_position);
    let intersections = ray_intersects_aabb(u.camera_position, ray_dir, scene_index);
    let t_near = intersections.x;
    let t_far = intersections.y;

    // Outside the room, or the room is behind the camera.
    let point_distance = length(world_splat_center.xyz - u.camera_position);
    if (point_distance < t_near || t_near > t_far || t_far < 0.0) {
        return discarded_output();
    }
"#;

pub(super) const SCENE_EFFECTS: &str = r#"
    let scene_opacity = u.scene_opacity[scene_index / 4u][scene_index % 4u];
    let scene_visible = u.scene_visibility[scene_index / 4u][scene_index % 4u];
    if (scene_opacity <= MIN_SCENE_OPACITY || scene_visible == 0) {
        return discarded_output();
    }
"#;

pub(super) const MODEL_VIEW_DYNAMIC: &str = r#"
    let scene_transform = u.transforms[scene_index];
    let transform_model_view = u.model_view_matrix * scene_transform;
"#;

pub(super) const MODEL_VIEW_STATIC: &str = r#"
    let transform_model_view = u.model_view_matrix;
"#;

pub(super) const FRUSTUM_CLIP: &str = r#"
    let view_center = transform_model_view * vec4<f32>(splat_center, 1.0);
    let clip_center = u.projection_matrix * view_center;

    let clip_bound = FRUSTUM_MARGIN * clip_center.w;
    if (clip_center.z < -clip_bound || clip_center.z > clip_bound
        || clip_center.x < -clip_bound || clip_center.x > clip_bound
        || clip_center.y < -clip_bound || clip_center.y > clip_bound) {
        return discarded_output();
    }

    var color = unpack_rgba(sampled_center_color.x);
"#;

// ── spherical harmonics ───────────────────────────────────────────────────

pub(super) const SH_OPEN: &str = r#"
    if (u.sh_degree >= 1) {
"#;

pub(super) const SH_VIEW_DIR_DYNAMIC: &str = r#"        let m_transform = u.model_matrix * scene_transform;
        let local_camera = inverse_mat4(m_transform) * vec4<f32>(u.camera_position, 1.0);
        let world_view_dir = normalize(splat_center - local_camera.xyz);
"#;

pub(super) const SH_VIEW_DIR_STATIC: &str = r#"        let world_view_dir = normalize(splat_center - u.camera_position);
"#;

pub(super) const SH_DEGREE1_FETCH: &str = r#"
        var sh1: vec3<f32>;
        var sh2: vec3<f32>;
        var sh3: vec3<f32>;

        if (u.sh_multi_texture_mode == 0) {
            // Two splats share five texels; odd splats start two texels in.
            let sh_texel = (nearest_even_index / 2u) * 5u + double_odd_offset;
            let sampled_sh_0123 = textureLoad(sh_texture, data_coord(sh_texel, u.sh_texture_size), 0);
            let sampled_sh_4567 = textureLoad(sh_texture, data_coord(sh_texel + 1u, u.sh_texture_size), 0);
            let sampled_sh_891011 = textureLoad(sh_texture, data_coord(sh_texel + 2u, u.sh_texture_size), 0);
            sh1 = sampled_sh_0123.rgb * (1.0 - f_odd_offset) + vec3<f32>(sampled_sh_0123.ba, sampled_sh_4567.r) * f_odd_offset;
            sh2 = vec3<f32>(sampled_sh_0123.a, sampled_sh_4567.rg) * (1.0 - f_odd_offset) + sampled_sh_4567.gba * f_odd_offset;
            sh3 = vec3<f32>(sampled_sh_4567.ba, sampled_sh_891011.r) * (1.0 - f_odd_offset) + sampled_sh_891011.rgb * f_odd_offset;
        } else {
            let sampled_sh_01_r = textureLoad(sh_texture_r, data_coord(splat_index * 2u, u.sh_texture_size), 0).rg;
            let sampled_sh_23_r = textureLoad(sh_texture_r, data_coord(splat_index * 2u + 1u, u.sh_texture_size), 0).rg;
            let sampled_sh_01_g = textureLoad(sh_texture_g, data_coord(splat_index * 2u, u.sh_texture_size), 0).rg;
            let sampled_sh_23_g = textureLoad(sh_texture_g, data_coord(splat_index * 2u + 1u, u.sh_texture_size), 0).rg;
            let sampled_sh_01_b = textureLoad(sh_texture_b, data_coord(splat_index * 2u, u.sh_texture_size), 0).rg;
            let sampled_sh_23_b = textureLoad(sh_texture_b, data_coord(splat_index * 2u + 1u, u.sh_texture_size), 0).rg;
            sh1 = vec3<f32>(sampled_sh_01_r, sampled_sh_23_r.r);
            sh2 = vec3<f32>(sampled_sh_01_g, sampled_sh_23_g.r);
            sh3 = vec3<f32>(sampled_sh_01_b, sampled_sh_23_b.r);
        }
"#;

pub(super) const SH_DEGREE2_FETCH: &str = r#"
        var sh1: vec3<f32>;
        var sh2: vec3<f32>;
        var sh3: vec3<f32>;

        var sampled_sh_0123: vec4<f32>;
        var sampled_sh_4567: vec4<f32>;
        var sampled_sh_891011: vec4<f32>;
        var sampled_sh_0123_r: vec4<f32>;
        var sampled_sh_0123_g: vec4<f32>;
        var sampled_sh_0123_b: vec4<f32>;

        if (u.sh_multi_texture_mode == 0) {
            sampled_sh_0123 = textureLoad(sh_texture, data_coord(splat_index * 6u, u.sh_texture_size), 0);
            sampled_sh_4567 = textureLoad(sh_texture, data_coord(splat_index * 6u + 1u, u.sh_texture_size), 0);
            sampled_sh_891011 = textureLoad(sh_texture, data_coord(splat_index * 6u + 2u, u.sh_texture_size), 0);
            sh1 = sampled_sh_0123.rgb;
            sh2 = vec3<f32>(sampled_sh_0123.a, sampled_sh_4567.rg);
            sh3 = vec3<f32>(sampled_sh_4567.ba, sampled_sh_891011.r);
        } else {
            sampled_sh_0123_r = textureLoad(sh_texture_r, data_coord(splat_index * 2u, u.sh_texture_size), 0);
            sampled_sh_0123_g = textureLoad(sh_texture_g, data_coord(splat_index * 2u, u.sh_texture_size), 0);
            sampled_sh_0123_b = textureLoad(sh_texture_b, data_coord(splat_index * 2u, u.sh_texture_size), 0);
            sh1 = sampled_sh_0123_r.rgb;
            sh2 = sampled_sh_0123_g.rgb;
            sh3 = sampled_sh_0123_b.rgb;
        }
"#;

pub(super) const SH_DEGREE1_ACCUMULATE: &str = r#"
        if (u.sh_8bit_mode == 1) {
            sh1 = sh1 * SH_8BIT_COMPRESSION_RANGE - vec3<f32>(SH_8BIT_COMPRESSION_HALF_RANGE);
            sh2 = sh2 * SH_8BIT_COMPRESSION_RANGE - vec3<f32>(SH_8BIT_COMPRESSION_HALF_RANGE);
            sh3 = sh3 * SH_8BIT_COMPRESSION_RANGE - vec3<f32>(SH_8BIT_COMPRESSION_HALF_RANGE);
        }
        let x = world_view_dir.x;
        let y = world_view_dir.y;
        let z = world_view_dir.z;
        color = vec4<f32>(color.rgb + SH_C1 * (-sh1 * y + sh2 * z - sh3 * x), color.a);
"#;

pub(super) const SH_DEGREE2_ACCUMULATE: &str = r#"
        if (u.sh_degree >= 2) {
            let xx = x * x;
            let yy = y * y;
            let zz = z * z;
            let xy = x * y;
            let yz = y * z;
            let xz = x * z;

            var sh4: vec3<f32>;
            var sh5: vec3<f32>;
            var sh6: vec3<f32>;
            var sh7: vec3<f32>;
            var sh8: vec3<f32>;

            if (u.sh_multi_texture_mode == 0) {
                let sampled_sh_12131415 = textureLoad(sh_texture, data_coord(splat_index * 6u + 3u, u.sh_texture_size), 0);
                let sampled_sh_16171819 = textureLoad(sh_texture, data_coord(splat_index * 6u + 4u, u.sh_texture_size), 0);
                let sampled_sh_20212223 = textureLoad(sh_texture, data_coord(splat_index * 6u + 5u, u.sh_texture_size), 0);
                sh4 = sampled_sh_891011.gba;
                sh5 = sampled_sh_12131415.rgb;
                sh6 = vec3<f32>(sampled_sh_12131415.a, sampled_sh_16171819.rg);
                sh7 = vec3<f32>(sampled_sh_16171819.ba, sampled_sh_20212223.r);
                sh8 = sampled_sh_20212223.gba;
            } else {
                let sampled_sh_4567_r = textureLoad(sh_texture_r, data_coord(splat_index * 2u + 1u, u.sh_texture_size), 0);
                let sampled_sh_4567_g = textureLoad(sh_texture_g, data_coord(splat_index * 2u + 1u, u.sh_texture_size), 0);
                let sampled_sh_4567_b = textureLoad(sh_texture_b, data_coord(splat_index * 2u + 1u, u.sh_texture_size), 0);
                sh4 = vec3<f32>(sampled_sh_0123_r.a, sampled_sh_4567_r.rg);
                sh5 = vec3<f32>(sampled_sh_4567_r.ba, sampled_sh_0123_g.a);
                sh6 = sampled_sh_4567_g.rgb;
                sh7 = vec3<f32>(sampled_sh_4567_g.a, sampled_sh_0123_b.a, sampled_sh_4567_b.r);
                sh8 = sampled_sh_4567_b.gba;
            }

            if (u.sh_8bit_mode == 1) {
                sh4 = sh4 * SH_8BIT_COMPRESSION_RANGE - vec3<f32>(SH_8BIT_COMPRESSION_HALF_RANGE);
                sh5 = sh5 * SH_8BIT_COMPRESSION_RANGE - vec3<f32>(SH_8BIT_COMPRESSION_HALF_RANGE);
                sh6 = sh6 * SH_8BIT_COMPRESSION_RANGE - vec3<f32>(SH_8BIT_COMPRESSION_HALF_RANGE);
                sh7 = sh7 * SH_8BIT_COMPRESSION_RANGE - vec3<f32>(SH_8BIT_COMPRESSION_HALF_RANGE);
                sh8 = sh8 * SH_8BIT_COMPRESSION_RANGE - vec3<f32>(SH_8BIT_COMPRESSION_HALF_RANGE);
            }

            let sh_degree2 = (SH_C2[0] * xy) * sh4
                + (SH_C2[1] * yz) * sh5
                + (SH_C2[2] * (2.0 * zz - xx - yy)) * sh6
                + (SH_C2[3] * xz) * sh7
                + (SH_C2[4] * (xx - yy)) * sh8;
            color = vec4<f32>(color.rgb + sh_degree2, color.a);
        }
"#;

pub(super) const SH_CLOSE: &str = r#"
        color = vec4<f32>(clamp(color.rgb, vec3<f32>(0.0), vec3<f32>(1.0)), color.a);
    }
"#;

// ── tail ──────────────────────────────────────────────────────────────────

pub(super) const FADE_IN: &str = r#"
    if (u.fade_in_complete == 0) {
        let center_dist = length(splat_center - u.scene_center);
        let beyond_start = step(u.visible_region_fade_start_radius, center_dist);
        let fade = (1.0 - beyond_start)
            + (1.0 - clamp((center_dist - u.visible_region_fade_start_radius) / FADE_DISTANCE, 0.0, 1.0)) * beyond_start;
        color.a = color.a * fade;
    }
"#;

pub(super) const OUTPUT_BEGIN: &str = r#"
    var out: VertexOutput;
    out.clip_position = clip_center;
    out.color = color;
    out.local_position = vin.position.xy;
    out.scene_index = 0u;
"#;

pub(super) const OUTPUT_SCENE_INDEX: &str = r#"    out.scene_index = scene_index;
"#;

pub(super) const OUTPUT_END: &str = r#"    return out;
}
"#;
