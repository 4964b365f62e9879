use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};

use super::config::{SplatShaderConfig, VariantKey};
use super::fragment::ShaderFragment;
use super::uniforms::{build_uniform_table, UniformBlockLayout, UniformTable};
use super::wgsl;

/// Entry point of the generated vertex stage.
pub const VERTEX_ENTRY_POINT: &str = "vs_main";

// ── predicates ────────────────────────────────────────────────────────────

fn always(_: &SplatShaderConfig) -> bool {
    true
}

fn has_custom_declarations(c: &SplatShaderConfig) -> bool {
    !c.custom_declarations.trim().is_empty()
}

fn scene_indexed(c: &SplatShaderConfig) -> bool {
    c.uses_scene_indexes()
}

fn rooms(c: &SplatShaderConfig) -> bool {
    c.use_room_clipping
}

fn rooms_static(c: &SplatShaderConfig) -> bool {
    c.use_room_clipping && !c.dynamic_mode
}

fn rooms_dynamic(c: &SplatShaderConfig) -> bool {
    c.use_room_clipping && c.dynamic_mode
}

fn effects(c: &SplatShaderConfig) -> bool {
    c.enable_optional_effects
}

fn dynamic(c: &SplatShaderConfig) -> bool {
    c.dynamic_mode
}

fn not_dynamic(c: &SplatShaderConfig) -> bool {
    !c.dynamic_mode
}

fn sh(c: &SplatShaderConfig) -> bool {
    c.max_sh_degree >= 1
}

fn sh_dynamic(c: &SplatShaderConfig) -> bool {
    c.max_sh_degree >= 1 && c.dynamic_mode
}

fn sh_static(c: &SplatShaderConfig) -> bool {
    c.max_sh_degree >= 1 && !c.dynamic_mode
}

fn sh_degree1_only(c: &SplatShaderConfig) -> bool {
    c.max_sh_degree == 1
}

fn sh_degree2(c: &SplatShaderConfig) -> bool {
    c.max_sh_degree >= 2
}

fn fade_in(c: &SplatShaderConfig) -> bool {
    c.fade_in
}

// ── fragment order ────────────────────────────────────────────────────────

/// Every fragment of the vertex program, in emission order.
pub static FRAGMENTS: &[ShaderFragment] = &[
    ShaderFragment::generated("uniform_block", always, wgsl::uniform_block),
    ShaderFragment::generated("texture_bindings", always, wgsl::texture_bindings),
    ShaderFragment::generated("custom_declarations", has_custom_declarations, wgsl::custom_declarations),
    ShaderFragment::fixed("io_structs", always, wgsl::IO_STRUCTS),
    ShaderFragment::generated("constants", always, wgsl::constants),
    ShaderFragment::fixed("helpers", always, wgsl::HELPERS),
    ShaderFragment::fixed("ray_aabb", rooms, wgsl::RAY_AABB),
    ShaderFragment::fixed("mat4_inverse", sh_dynamic, wgsl::MAT4_INVERSE),
    ShaderFragment::fixed("main_prologue", always, wgsl::MAIN_PROLOGUE),
    ShaderFragment::fixed("scene_index_fetch", scene_indexed, wgsl::SCENE_INDEX_FETCH),
    ShaderFragment::fixed("room_center_static", rooms_static, wgsl::ROOM_CENTER_STATIC),
    ShaderFragment::fixed("room_center_dynamic", rooms_dynamic, wgsl::ROOM_CENTER_DYNAMIC),
    ShaderFragment::fixed("room_clip", rooms, wgsl::ROOM_CLIP),
    ShaderFragment::fixed("scene_effects", effects, wgsl::SCENE_EFFECTS),
    ShaderFragment::fixed("model_view_dynamic", dynamic, wgsl::MODEL_VIEW_DYNAMIC),
    ShaderFragment::fixed("model_view_static", not_dynamic, wgsl::MODEL_VIEW_STATIC),
    ShaderFragment::fixed("frustum_clip", always, wgsl::FRUSTUM_CLIP),
    ShaderFragment::fixed("sh_open", sh, wgsl::SH_OPEN),
    ShaderFragment::fixed("sh_view_dir_dynamic", sh_dynamic, wgsl::SH_VIEW_DIR_DYNAMIC),
    ShaderFragment::fixed("sh_view_dir_static", sh_static, wgsl::SH_VIEW_DIR_STATIC),
    ShaderFragment::fixed("sh_degree1_fetch", sh_degree1_only, wgsl::SH_DEGREE1_FETCH),
    ShaderFragment::fixed("sh_degree2_fetch", sh_degree2, wgsl::SH_DEGREE2_FETCH),
    ShaderFragment::fixed("sh_degree1_accumulate", sh, wgsl::SH_DEGREE1_ACCUMULATE),
    ShaderFragment::fixed("sh_degree2_accumulate", sh_degree2, wgsl::SH_DEGREE2_ACCUMULATE),
    ShaderFragment::fixed("sh_close", sh, wgsl::SH_CLOSE),
    ShaderFragment::fixed("fade_in", fade_in, wgsl::FADE_IN),
    ShaderFragment::fixed("output_begin", always, wgsl::OUTPUT_BEGIN),
    ShaderFragment::fixed("output_scene_index", rooms, wgsl::OUTPUT_SCENE_INDEX),
    ShaderFragment::fixed("output_end", always, wgsl::OUTPUT_END),
];

/// All fragments, active or not.
#[inline]
pub fn fragments() -> &'static [ShaderFragment] {
    FRAGMENTS
}

/// Looks up a fragment by name.
pub fn fragment(name: &str) -> Option<&'static ShaderFragment> {
    FRAGMENTS.iter().find(|f| f.name == name)
}

/// Fragments emitted for `config`, in order.
pub fn active_fragments(config: &SplatShaderConfig) -> impl Iterator<Item = &'static ShaderFragment> + '_ {
    FRAGMENTS.iter().filter(move |f| f.is_active(config))
}

/// Concatenates the active fragments. Pure function of `config`.
pub fn compose(config: &SplatShaderConfig) -> String {
    let mut source = String::new();
    for fragment in active_fragments(config) {
        if !source.is_empty() && !source.ends_with("\n\n") && fragment_starts_item(fragment) {
            source.push('\n');
        }
        source.push_str(&fragment.render(config));
    }
    source
}

// Top-level declarations are separated by a blank line; main-body pieces carry their own spacing.
fn fragment_starts_item(fragment: &ShaderFragment) -> bool {
    matches!(
        fragment.name,
        "uniform_block"
            | "texture_bindings"
            | "custom_declarations"
            | "io_structs"
            | "constants"
            | "helpers"
            | "ray_aabb"
            | "mat4_inverse"
            | "main_prologue"
    )
}

// ── program ───────────────────────────────────────────────────────────────

/// A synthesized vertex program and the uniforms it declares.
#[derive(Debug, Clone, PartialEq)]
pub struct SplatProgram {
    config: SplatShaderConfig,
    source: String,
    uniforms: UniformTable,
    layout: UniformBlockLayout,
}

impl SplatProgram {
    /// Builds the program for `config`.
    ///
    /// Fails only if the configuration is out of range (SH degree above 2).
    pub fn build(config: &SplatShaderConfig) -> Result<Self> {
        config.validate().context("invalid splat shader configuration")?;

        let source = compose(config);
        let uniforms = build_uniform_table(config);
        let layout = UniformBlockLayout::from_table(&uniforms);

        log::debug!(
            "built splat vertex program (dynamic={}, effects={}, sh={}, rooms={}, fade_in={}): {} bytes, {} uniforms",
            config.dynamic_mode,
            config.enable_optional_effects,
            config.max_sh_degree,
            config.use_room_clipping,
            config.fade_in,
            source.len(),
            uniforms.len(),
        );

        Ok(Self { config: config.clone(), source, uniforms, layout })
    }

    #[inline]
    pub fn config(&self) -> &SplatShaderConfig {
        &self.config
    }

    /// WGSL source text.
    #[inline]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[inline]
    pub fn uniforms(&self) -> &UniformTable {
        &self.uniforms
    }

    #[inline]
    pub fn block_layout(&self) -> &UniformBlockLayout {
        &self.layout
    }
}

// ── cache ─────────────────────────────────────────────────────────────────

/// Memoizes built programs per variant.
#[derive(Debug, Default)]
pub struct ProgramCache {
    programs: HashMap<VariantKey, Arc<SplatProgram>>,
}

impl ProgramCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached program for `config`, building it on first use.
    pub fn get_or_build(&mut self, config: &SplatShaderConfig) -> Result<Arc<SplatProgram>> {
        let key = config.variant_key();
        if let Some(program) = self.programs.get(&key) {
            log::debug!("splat program cache hit");
            return Ok(Arc::clone(program));
        }
        let program = Arc::new(SplatProgram::build(config)?);
        self.programs.insert(key, Arc::clone(&program));
        Ok(program)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.programs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    pub fn clear(&mut self) {
        self.programs.clear();
    }
}
