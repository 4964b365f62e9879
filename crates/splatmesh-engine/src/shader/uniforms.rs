use std::collections::BTreeMap;

use anyhow::{bail, Result};
use glam::{Mat4, UVec2, Vec2, Vec3};

use crate::scene::MAX_SCENES;

use super::SplatShaderConfig;

/// Default pixel dimensions assumed for every packed data texture.
pub const DEFAULT_DATA_TEXTURE_SIZE: UVec2 = UVec2::new(1024, 1024);

// ── kinds ─────────────────────────────────────────────────────────────────

/// Component type a data texture is sampled as.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TextureSample {
    Uint,
    Float,
}

/// Semantic type of a uniform.
///
/// Array lengths are element counts; scalar arrays are packed four per `vec4`
/// in the uniform block.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum UniformKind {
    Float,
    Int,
    Vec2,
    UVec2,
    Vec3,
    Mat4,
    FloatArray(usize),
    IntArray(usize),
    Vec3Array(usize),
    Mat4Array(usize),
    Texture(TextureSample),
}

impl UniformKind {
    #[inline]
    pub fn is_texture(self) -> bool {
        matches!(self, UniformKind::Texture(_))
    }

    /// WGSL type used for this uniform.
    pub fn wgsl_type(self) -> String {
        match self {
            UniformKind::Float => "f32".into(),
            UniformKind::Int => "i32".into(),
            UniformKind::Vec2 => "vec2<f32>".into(),
            UniformKind::UVec2 => "vec2<u32>".into(),
            UniformKind::Vec3 => "vec3<f32>".into(),
            UniformKind::Mat4 => "mat4x4<f32>".into(),
            UniformKind::FloatArray(n) => format!("array<vec4<f32>, {}>", n.div_ceil(4)),
            UniformKind::IntArray(n) => format!("array<vec4<i32>, {}>", n.div_ceil(4)),
            UniformKind::Vec3Array(n) => format!("array<vec3<f32>, {n}>"),
            UniformKind::Mat4Array(n) => format!("array<mat4x4<f32>, {n}>"),
            UniformKind::Texture(TextureSample::Uint) => "texture_2d<u32>".into(),
            UniformKind::Texture(TextureSample::Float) => "texture_2d<f32>".into(),
        }
    }

    /// `(align, size)` in bytes under the uniform address-space layout rules.
    ///
    /// Returns `None` for textures, which are not block members.
    pub fn block_layout(self) -> Option<(usize, usize)> {
        match self {
            UniformKind::Float | UniformKind::Int => Some((4, 4)),
            UniformKind::Vec2 | UniformKind::UVec2 => Some((8, 8)),
            UniformKind::Vec3 => Some((16, 12)),
            UniformKind::Mat4 => Some((16, 64)),
            UniformKind::FloatArray(n) | UniformKind::IntArray(n) => Some((16, n.div_ceil(4) * 16)),
            UniformKind::Vec3Array(n) => Some((16, n * 16)),
            UniformKind::Mat4Array(n) => Some((16, n * 64)),
            UniformKind::Texture(_) => None,
        }
    }
}

// ── values ────────────────────────────────────────────────────────────────

/// A uniform value. Textures carry no value here; they are bound separately.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    Vec2(Vec2),
    UVec2(UVec2),
    Vec3(Vec3),
    Mat4(Mat4),
    FloatArray(Vec<f32>),
    IntArray(Vec<i32>),
    Vec3Array(Vec<Vec3>),
    Mat4Array(Vec<Mat4>),
    Texture,
}

impl UniformValue {
    /// Returns `true` if this value can be stored in a uniform of `kind`.
    pub fn matches(&self, kind: UniformKind) -> bool {
        match (self, kind) {
            (UniformValue::Float(_), UniformKind::Float)
            | (UniformValue::Int(_), UniformKind::Int)
            | (UniformValue::Vec2(_), UniformKind::Vec2)
            | (UniformValue::UVec2(_), UniformKind::UVec2)
            | (UniformValue::Vec3(_), UniformKind::Vec3)
            | (UniformValue::Mat4(_), UniformKind::Mat4)
            | (UniformValue::Texture, UniformKind::Texture(_)) => true,
            (UniformValue::FloatArray(v), UniformKind::FloatArray(n)) => v.len() == n,
            (UniformValue::IntArray(v), UniformKind::IntArray(n)) => v.len() == n,
            (UniformValue::Vec3Array(v), UniformKind::Vec3Array(n)) => v.len() == n,
            (UniformValue::Mat4Array(v), UniformKind::Mat4Array(n)) => v.len() == n,
            _ => false,
        }
    }
}

/// Type and default value of one uniform.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformDescriptor {
    pub kind: UniformKind,
    pub default: UniformValue,
}

impl UniformDescriptor {
    fn new(kind: UniformKind, default: UniformValue) -> Self {
        debug_assert!(default.matches(kind));
        Self { kind, default }
    }

    fn texture(sample: TextureSample) -> Self {
        Self::new(UniformKind::Texture(sample), UniformValue::Texture)
    }
}

// ── table ─────────────────────────────────────────────────────────────────

/// Name -> descriptor map for one program variant.
///
/// Iteration order is the name order, which also fixes the member order of the
/// generated uniform block and the texture binding slots.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UniformTable {
    entries: BTreeMap<&'static str, UniformDescriptor>,
}

/// A texture uniform and the binding slot it occupies in group 0.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TextureBinding {
    pub name: &'static str,
    pub binding: u32,
    pub sample: TextureSample,
}

/// Binding slot of the uniform block in group 0. Textures follow from slot 1.
pub const UNIFORM_BLOCK_BINDING: u32 = 0;

impl UniformTable {
    fn insert(&mut self, name: &'static str, desc: UniformDescriptor) {
        self.entries.insert(name, desc);
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&UniformDescriptor> {
        self.entries.get(name)
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &UniformDescriptor)> + '_ {
        self.entries.iter().map(|(name, desc)| (*name, desc))
    }

    /// Non-texture entries, in block member order.
    pub fn block_members(&self) -> impl Iterator<Item = (&'static str, &UniformDescriptor)> + '_ {
        self.iter().filter(|(_, desc)| !desc.kind.is_texture())
    }

    /// Texture entries with their binding slots.
    pub fn texture_bindings(&self) -> Vec<TextureBinding> {
        self.iter()
            .filter_map(|(name, desc)| match desc.kind {
                UniformKind::Texture(sample) => Some((name, sample)),
                _ => None,
            })
            .enumerate()
            .map(|(i, (name, sample))| TextureBinding {
                name,
                binding: UNIFORM_BLOCK_BINDING + 1 + i as u32,
                sample,
            })
            .collect()
    }
}

/// Uniforms every variant declares, whether or not the vertex stage reads them.
///
/// Projection helpers (`focal`, `viewport`, ...) are consumed by the covariance
/// and fragment stages that are assembled on top of this program.
pub const BASE_UNIFORMS: &[&str] = &[
    "basis_viewport",
    "camera_position",
    "centers_colors_texture",
    "centers_colors_texture_size",
    "current_time",
    "fade_in_complete",
    "first_render_time",
    "focal",
    "inverse_focal_adjustment",
    "model_matrix",
    "model_view_matrix",
    "ortho_zoom",
    "orthographic_mode",
    "point_cloud_mode_enabled",
    "projection_matrix",
    "scene_center",
    "sh_8bit_mode",
    "sh_degree",
    "sh_multi_texture_mode",
    "sh_texture",
    "sh_texture_b",
    "sh_texture_g",
    "sh_texture_r",
    "sh_texture_size",
    "splat_scale",
    "viewport",
    "visible_region_fade_start_radius",
    "visible_region_radius",
];

/// Builds the uniform table matching the program generated for `config`.
pub fn build_uniform_table(config: &SplatShaderConfig) -> UniformTable {
    use UniformDescriptor as D;
    use UniformKind as K;
    use UniformValue as V;

    let mut table = UniformTable::default();

    table.insert("centers_colors_texture", D::texture(TextureSample::Uint));
    table.insert("sh_texture", D::texture(TextureSample::Float));
    table.insert("sh_texture_r", D::texture(TextureSample::Float));
    table.insert("sh_texture_g", D::texture(TextureSample::Float));
    table.insert("sh_texture_b", D::texture(TextureSample::Float));

    table.insert("model_view_matrix", D::new(K::Mat4, V::Mat4(Mat4::IDENTITY)));
    table.insert("projection_matrix", D::new(K::Mat4, V::Mat4(Mat4::IDENTITY)));
    table.insert("model_matrix", D::new(K::Mat4, V::Mat4(Mat4::IDENTITY)));
    table.insert("camera_position", D::new(K::Vec3, V::Vec3(Vec3::ZERO)));
    table.insert("focal", D::new(K::Vec2, V::Vec2(Vec2::ZERO)));
    table.insert("ortho_zoom", D::new(K::Float, V::Float(1.0)));
    table.insert("orthographic_mode", D::new(K::Int, V::Int(0)));
    table.insert("inverse_focal_adjustment", D::new(K::Float, V::Float(1.0)));
    table.insert("viewport", D::new(K::Vec2, V::Vec2(Vec2::ZERO)));
    table.insert("basis_viewport", D::new(K::Vec2, V::Vec2(Vec2::ZERO)));

    table.insert("centers_colors_texture_size", D::new(K::UVec2, V::UVec2(DEFAULT_DATA_TEXTURE_SIZE)));
    table.insert("sh_texture_size", D::new(K::UVec2, V::UVec2(DEFAULT_DATA_TEXTURE_SIZE)));
    table.insert("sh_degree", D::new(K::Int, V::Int(i32::from(config.max_sh_degree))));
    table.insert("sh_8bit_mode", D::new(K::Int, V::Int(0)));
    table.insert("sh_multi_texture_mode", D::new(K::Int, V::Int(0)));

    table.insert("visible_region_radius", D::new(K::Float, V::Float(0.0)));
    table.insert("visible_region_fade_start_radius", D::new(K::Float, V::Float(0.0)));
    table.insert("first_render_time", D::new(K::Float, V::Float(0.0)));
    table.insert("current_time", D::new(K::Float, V::Float(0.0)));
    table.insert("fade_in_complete", D::new(K::Int, V::Int(0)));
    table.insert("scene_center", D::new(K::Vec3, V::Vec3(Vec3::ZERO)));

    table.insert("splat_scale", D::new(K::Float, V::Float(config.splat_scale)));
    table.insert("point_cloud_mode_enabled", D::new(K::Int, V::Int(0)));

    if config.uses_scene_indexes() {
        table.insert("scene_indexes_texture", D::texture(TextureSample::Uint));
        table.insert("scene_indexes_texture_size", D::new(K::UVec2, V::UVec2(DEFAULT_DATA_TEXTURE_SIZE)));
    }

    if config.enable_optional_effects {
        table.insert(
            "scene_opacity",
            D::new(K::FloatArray(MAX_SCENES), V::FloatArray(vec![1.0; MAX_SCENES])),
        );
        table.insert(
            "scene_visibility",
            D::new(K::IntArray(MAX_SCENES), V::IntArray(vec![1; MAX_SCENES])),
        );
    }

    if config.dynamic_mode {
        table.insert(
            "transforms",
            D::new(K::Mat4Array(MAX_SCENES), V::Mat4Array(vec![Mat4::IDENTITY; MAX_SCENES])),
        );
    }

    if config.use_room_clipping {
        table.insert(
            "aabb_mins",
            D::new(K::Vec3Array(MAX_SCENES), V::Vec3Array(vec![Vec3::splat(-1.0); MAX_SCENES])),
        );
        table.insert(
            "aabb_maxs",
            D::new(K::Vec3Array(MAX_SCENES), V::Vec3Array(vec![Vec3::ONE; MAX_SCENES])),
        );
    }

    table
}

// ── block layout ──────────────────────────────────────────────────────────

/// Byte placement of one member of the uniform block.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BlockMember {
    pub name: &'static str,
    pub kind: UniformKind,
    pub offset: usize,
    pub size: usize,
}

/// Member offsets of the generated `SplatUniforms` struct.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformBlockLayout {
    members: Vec<BlockMember>,
    size: usize,
}

impl UniformBlockLayout {
    pub fn from_table(table: &UniformTable) -> Self {
        let mut members = Vec::new();
        let mut offset = 0usize;
        let mut max_align = 16usize;

        for (name, desc) in table.block_members() {
            let Some((align, size)) = desc.kind.block_layout() else { continue };
            offset = offset.next_multiple_of(align);
            members.push(BlockMember { name, kind: desc.kind, offset, size });
            offset += size;
            max_align = max_align.max(align);
        }

        Self { members, size: offset.next_multiple_of(max_align) }
    }

    /// Total block size in bytes, including tail padding.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn members(&self) -> &[BlockMember] {
        &self.members
    }

    pub fn member(&self, name: &str) -> Option<&BlockMember> {
        self.members.iter().find(|m| m.name == name)
    }

    /// Serializes `values` into the block's byte image.
    pub fn write(&self, values: &UniformValues) -> Vec<u8> {
        let mut bytes = vec![0u8; self.size];
        for member in &self.members {
            let Some(value) = values.get(member.name) else { continue };
            let dst = &mut bytes[member.offset..member.offset + member.size];
            write_value(dst, value);
        }
        bytes
    }
}

fn put(dst: &mut [u8], at: usize, src: &[u8]) {
    dst[at..at + src.len()].copy_from_slice(src);
}

fn write_value(dst: &mut [u8], value: &UniformValue) {
    match value {
        UniformValue::Float(v) => put(dst, 0, bytemuck::bytes_of(v)),
        UniformValue::Int(v) => put(dst, 0, bytemuck::bytes_of(v)),
        UniformValue::Vec2(v) => put(dst, 0, bytemuck::bytes_of(v)),
        UniformValue::UVec2(v) => put(dst, 0, bytemuck::bytes_of(v)),
        UniformValue::Vec3(v) => put(dst, 0, bytemuck::bytes_of(v)),
        UniformValue::Mat4(m) => put(dst, 0, bytemuck::bytes_of(m)),
        // vec4-packed scalars are contiguous, so element i lands at i * 4.
        UniformValue::FloatArray(v) => put(dst, 0, bytemuck::cast_slice(v)),
        UniformValue::IntArray(v) => put(dst, 0, bytemuck::cast_slice(v)),
        UniformValue::Vec3Array(v) => {
            for (i, e) in v.iter().enumerate() {
                put(dst, i * 16, bytemuck::bytes_of(e));
            }
        }
        UniformValue::Mat4Array(v) => put(dst, 0, bytemuck::cast_slice(v)),
        UniformValue::Texture => {}
    }
}

// ── live values ───────────────────────────────────────────────────────────

/// Current values for a program variant's uniforms.
///
/// Starts from the table defaults; assignments are checked against the table.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformValues {
    table: UniformTable,
    values: BTreeMap<&'static str, UniformValue>,
}

impl UniformValues {
    pub fn new(table: &UniformTable) -> Self {
        let values = table.iter().map(|(name, desc)| (name, desc.default.clone())).collect();
        Self { table: table.clone(), values }
    }

    #[inline]
    pub fn table(&self) -> &UniformTable {
        &self.table
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&UniformValue> {
        self.values.get(name)
    }

    /// Assigns `value` to the uniform `name`.
    ///
    /// Fails if the variant does not declare `name` or the value does not fit its kind.
    pub fn set(&mut self, name: &str, value: UniformValue) -> Result<()> {
        let Some((&key, desc)) = self.table.entries.get_key_value(name) else {
            bail!("uniform `{name}` is not declared by this program variant");
        };
        if !value.matches(desc.kind) {
            bail!("uniform `{name}` expects {:?}, got {:?}", desc.kind, value);
        }
        self.values.insert(key, value);
        Ok(())
    }

    pub fn float(&self, name: &str) -> Option<f32> {
        match self.get(name)? {
            UniformValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn int(&self, name: &str) -> Option<i32> {
        match self.get(name)? {
            UniformValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn uvec2(&self, name: &str) -> Option<UVec2> {
        match self.get(name)? {
            UniformValue::UVec2(v) => Some(*v),
            _ => None,
        }
    }

    pub fn vec3(&self, name: &str) -> Option<Vec3> {
        match self.get(name)? {
            UniformValue::Vec3(v) => Some(*v),
            _ => None,
        }
    }

    pub fn mat4(&self, name: &str) -> Option<Mat4> {
        match self.get(name)? {
            UniformValue::Mat4(v) => Some(*v),
            _ => None,
        }
    }

    pub fn float_at(&self, name: &str, index: usize) -> Option<f32> {
        match self.get(name)? {
            UniformValue::FloatArray(v) => v.get(index).copied(),
            _ => None,
        }
    }

    pub fn int_at(&self, name: &str, index: usize) -> Option<i32> {
        match self.get(name)? {
            UniformValue::IntArray(v) => v.get(index).copied(),
            _ => None,
        }
    }

    pub fn vec3_at(&self, name: &str, index: usize) -> Option<Vec3> {
        match self.get(name)? {
            UniformValue::Vec3Array(v) => v.get(index).copied(),
            _ => None,
        }
    }

    pub fn mat4_at(&self, name: &str, index: usize) -> Option<Mat4> {
        match self.get(name)? {
            UniformValue::Mat4Array(v) => v.get(index).copied(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_features() -> SplatShaderConfig {
        SplatShaderConfig {
            dynamic_mode: true,
            enable_optional_effects: true,
            max_sh_degree: 2,
            use_room_clipping: true,
            ..SplatShaderConfig::default()
        }
    }

    #[test]
    fn base_table_has_exactly_base_set() {
        let table = build_uniform_table(&SplatShaderConfig::default());
        let names: Vec<_> = table.iter().map(|(n, _)| n).collect();
        assert_eq!(names, BASE_UNIFORMS);
    }

    #[test]
    fn feature_uniforms_follow_flags() {
        let effects = build_uniform_table(&SplatShaderConfig {
            enable_optional_effects: true,
            ..SplatShaderConfig::default()
        });
        assert!(effects.contains("scene_opacity"));
        assert!(effects.contains("scene_visibility"));
        assert!(effects.contains("scene_indexes_texture"));
        assert!(!effects.contains("transforms"));
        assert!(!effects.contains("aabb_mins"));

        let rooms = build_uniform_table(&SplatShaderConfig {
            use_room_clipping: true,
            ..SplatShaderConfig::default()
        });
        assert!(rooms.contains("aabb_mins"));
        assert!(rooms.contains("aabb_maxs"));
        assert!(rooms.contains("scene_indexes_texture_size"));
        assert!(!rooms.contains("scene_opacity"));
    }

    #[test]
    fn defaults_follow_config() {
        let config = SplatShaderConfig { max_sh_degree: 2, splat_scale: 0.5, ..SplatShaderConfig::default() };
        let table = build_uniform_table(&config);
        assert_eq!(table.get("sh_degree").map(|d| &d.default), Some(&UniformValue::Int(2)));
        assert_eq!(table.get("splat_scale").map(|d| &d.default), Some(&UniformValue::Float(0.5)));
        assert_eq!(
            table.get("centers_colors_texture_size").map(|d| &d.default),
            Some(&UniformValue::UVec2(UVec2::new(1024, 1024)))
        );
    }

    #[test]
    fn texture_bindings_follow_block() {
        let table = build_uniform_table(&all_features());
        let bindings = table.texture_bindings();
        let names: Vec<_> = bindings.iter().map(|b| b.name).collect();
        assert_eq!(
            names,
            [
                "centers_colors_texture",
                "scene_indexes_texture",
                "sh_texture",
                "sh_texture_b",
                "sh_texture_g",
                "sh_texture_r",
            ]
        );
        let slots: Vec<_> = bindings.iter().map(|b| b.binding).collect();
        assert_eq!(slots, [1, 2, 3, 4, 5, 6]);
        assert_eq!(bindings[1].sample, TextureSample::Uint);
    }

    #[test]
    fn layout_respects_alignment() {
        let table = build_uniform_table(&all_features());
        let layout = UniformBlockLayout::from_table(&table);
        for m in layout.members() {
            let (align, size) = m.kind.block_layout().unwrap();
            assert_eq!(m.offset % align, 0, "{} misaligned", m.name);
            assert_eq!(m.size, size);
        }
        assert_eq!(layout.size() % 16, 0);
        for pair in layout.members().windows(2) {
            assert!(pair[0].offset + pair[0].size <= pair[1].offset);
        }
    }

    #[test]
    fn layout_packs_scalar_after_vec3() {
        // camera_position (vec3) is followed by centers_colors_texture_size (vec2, align 8),
        // which cannot use the vec3's 4-byte tail.
        let table = build_uniform_table(&SplatShaderConfig::default());
        let layout = UniformBlockLayout::from_table(&table);
        let cam = layout.member("camera_position").unwrap();
        let size = layout.member("centers_colors_texture_size").unwrap();
        assert_eq!(size.offset, cam.offset + 16);
        let time = layout.member("current_time").unwrap();
        assert_eq!(time.offset, size.offset + 8);
    }

    #[test]
    fn write_places_values_at_offsets() {
        let table = build_uniform_table(&all_features());
        let layout = UniformBlockLayout::from_table(&table);
        let mut values = UniformValues::new(&table);
        values.set("ortho_zoom", UniformValue::Float(2.5)).unwrap();
        let mut opacity = vec![1.0; MAX_SCENES];
        opacity[5] = 0.25;
        values.set("scene_opacity", UniformValue::FloatArray(opacity)).unwrap();
        let mut mins = vec![Vec3::splat(-1.0); MAX_SCENES];
        mins[2] = Vec3::new(7.0, 8.0, 9.0);
        values.set("aabb_mins", UniformValue::Vec3Array(mins)).unwrap();

        let bytes = layout.write(&values);
        assert_eq!(bytes.len(), layout.size());

        let read_f32 = |at: usize| f32::from_le_bytes(bytes[at..at + 4].try_into().unwrap());

        let zoom = layout.member("ortho_zoom").unwrap().offset;
        assert_eq!(read_f32(zoom), 2.5);

        let opacity = layout.member("scene_opacity").unwrap().offset;
        assert_eq!(read_f32(opacity + 5 * 4), 0.25);
        assert_eq!(read_f32(opacity + 4 * 4), 1.0);

        let mins = layout.member("aabb_mins").unwrap().offset;
        assert_eq!(read_f32(mins + 2 * 16 + 8), 9.0);

        let transforms = layout.member("transforms").unwrap().offset;
        assert_eq!(read_f32(transforms + 64 * 3), 1.0); // [3][0][0] of identity
        assert_eq!(read_f32(transforms + 64 * 3 + 4), 0.0);
    }

    #[test]
    fn set_rejects_unknown_and_mistyped() {
        let table = build_uniform_table(&SplatShaderConfig::default());
        let mut values = UniformValues::new(&table);
        assert!(values.set("transforms", UniformValue::Mat4Array(vec![])).is_err());
        assert!(values.set("sh_degree", UniformValue::Float(1.0)).is_err());
        assert!(values.set("sh_degree", UniformValue::Int(1)).is_ok());
        assert_eq!(values.int("sh_degree"), Some(1));
    }

    #[test]
    fn set_rejects_wrong_array_length() {
        let table = build_uniform_table(&all_features());
        let mut values = UniformValues::new(&table);
        let err = values.set("scene_opacity", UniformValue::FloatArray(vec![1.0; 3]));
        assert!(err.is_err());
    }

    #[test]
    fn fresh_tables_are_equal() {
        let config = all_features();
        assert_eq!(build_uniform_table(&config), build_uniform_table(&config));
    }
}
