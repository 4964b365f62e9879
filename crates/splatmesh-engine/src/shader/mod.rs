//! Vertex-program synthesis.
//!
//! A program variant is described by a [`SplatShaderConfig`]. The WGSL source is
//! an ordered list of [`ShaderFragment`]s, each guarded by a predicate over the
//! configuration, concatenated by one composition function. The uniform table
//! for the same configuration is built alongside and drives both the generated
//! uniform block and the texture bindings, so the two cannot drift apart.
//!
//! Flags in the configuration change which code exists. SH degree, 8-bit SH and
//! the SH texture layout are plain uniforms inside a variant (see [`RuntimeShading`]).

mod config;
mod fragment;
mod program;
mod uniforms;
mod wgsl;

pub use config::{RuntimeShading, SplatShaderConfig, VariantKey, MAX_SH_DEGREE};
pub use fragment::{FragmentBody, ShaderFragment};
pub use program::{
    active_fragments, compose, fragment, fragments, ProgramCache, SplatProgram, FRAGMENTS,
    VERTEX_ENTRY_POINT,
};
pub use uniforms::{
    build_uniform_table, BlockMember, TextureBinding, TextureSample, UniformBlockLayout,
    UniformDescriptor, UniformKind, UniformTable, UniformValue, UniformValues, BASE_UNIFORMS,
    DEFAULT_DATA_TEXTURE_SIZE, UNIFORM_BLOCK_BINDING,
};

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    /// Every combination of compile-time flags.
    fn all_configs() -> Vec<SplatShaderConfig> {
        let mut out = Vec::new();
        for bits in 0u32..32 {
            for degree in 0..=MAX_SH_DEGREE {
                out.push(SplatShaderConfig {
                    dynamic_mode: bits & 1 != 0,
                    enable_optional_effects: bits & 2 != 0,
                    use_room_clipping: bits & 4 != 0,
                    fade_in: bits & 8 != 0,
                    custom_declarations: if bits & 16 != 0 {
                        "const CUSTOM_TINT: f32 = 0.5;".into()
                    } else {
                        String::new()
                    },
                    max_sh_degree: degree,
                    ..SplatShaderConfig::default()
                });
            }
        }
        out
    }

    fn is_ident(c: char) -> bool {
        c.is_ascii_alphanumeric() || c == '_'
    }

    /// Names read through the uniform block (`u.name`).
    fn block_references(source: &str) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        let chars: Vec<char> = source.chars().collect();
        for i in 0..chars.len().saturating_sub(1) {
            if chars[i] == 'u' && chars[i + 1] == '.' && (i == 0 || !is_ident(chars[i - 1])) {
                let name: String = chars[i + 2..].iter().take_while(|c| is_ident(**c)).collect();
                names.insert(name);
            }
        }
        names
    }

    /// Texture names passed to `textureLoad`.
    fn texture_references(source: &str) -> BTreeSet<String> {
        source
            .split("textureLoad(")
            .skip(1)
            .map(|rest| rest.chars().take_while(|c| is_ident(*c)).collect())
            .collect()
    }

    #[test]
    fn synthesis_is_deterministic() {
        for config in all_configs() {
            let a = SplatProgram::build(&config).unwrap();
            let b = SplatProgram::build(&config).unwrap();
            assert_eq!(a.source(), b.source());
            assert_eq!(a.uniforms(), b.uniforms());
        }
    }

    #[test]
    fn every_variant_parses_and_validates() {
        let mut validator = naga::valid::Validator::new(naga::valid::ValidationFlags::all(), naga::valid::Capabilities::all());
        for config in all_configs() {
            let program = SplatProgram::build(&config).unwrap();
            let source = program.source();
            let module = naga::front::wgsl::parse_str(source)
                .unwrap_or_else(|e| panic!("{config:?}\n{}", e.emit_to_string(source)));
            validator
                .validate(&module)
                .unwrap_or_else(|e| panic!("{config:?}\n{}", e.emit_to_string(source)));
            assert!(module
                .entry_points
                .iter()
                .any(|ep| ep.name == VERTEX_ENTRY_POINT && ep.stage == naga::ShaderStage::Vertex));
        }
    }

    #[test]
    fn referenced_uniforms_are_declared() {
        for config in all_configs() {
            let program = SplatProgram::build(&config).unwrap();
            let table = program.uniforms();
            for name in block_references(program.source()) {
                let desc = table.get(&name).unwrap_or_else(|| panic!("`u.{name}` undeclared for {config:?}"));
                assert!(!desc.kind.is_texture());
            }
            for name in texture_references(program.source()) {
                let desc = table.get(&name).unwrap_or_else(|| panic!("texture `{name}` undeclared for {config:?}"));
                assert!(desc.kind.is_texture());
            }
        }
    }

    #[test]
    fn declared_uniforms_are_used_or_base() {
        for config in all_configs() {
            let program = SplatProgram::build(&config).unwrap();
            let mut used = block_references(program.source());
            used.extend(texture_references(program.source()));
            for (name, _) in program.uniforms().iter() {
                assert!(
                    used.contains(name) || BASE_UNIFORMS.contains(&name),
                    "`{name}` declared but unused for {config:?}"
                );
            }
        }
    }

    #[test]
    fn every_declared_uniform_appears_in_source() {
        for config in all_configs() {
            let program = SplatProgram::build(&config).unwrap();
            for (name, desc) in program.uniforms().iter() {
                let decl = if desc.kind.is_texture() {
                    format!("var {name}: {};", desc.kind.wgsl_type())
                } else {
                    format!("    {name}: {},", desc.kind.wgsl_type())
                };
                assert!(program.source().contains(&decl), "missing declaration `{decl}`");
            }
        }
    }

    #[test]
    fn braces_and_parens_balance() {
        for config in all_configs() {
            let source = compose(&config);
            let count = |c: char| source.chars().filter(|x| *x == c).count();
            assert_eq!(count('{'), count('}'), "{config:?}");
            assert_eq!(count('('), count(')'), "{config:?}");
        }
    }

    #[test]
    fn single_entry_point() {
        for config in all_configs() {
            let source = compose(&config);
            assert_eq!(source.matches("@vertex").count(), 1);
            assert!(source.contains(&format!("fn {VERTEX_ENTRY_POINT}(")));
            assert!(source.trim_end().ends_with("return out;\n}"));
        }
    }

    #[test]
    fn coarse_flags_gate_code_paths() {
        let base = compose(&SplatShaderConfig::default());
        assert!(!base.contains("scene_indexes_texture"));
        assert!(!base.contains("ray_intersects_aabb"));
        assert!(!base.contains("u.sh_degree"));
        assert!(base.contains("let transform_model_view = u.model_view_matrix;"));

        let rooms = compose(&SplatShaderConfig { use_room_clipping: true, ..Default::default() });
        assert!(rooms.contains("fn ray_intersects_aabb("));
        assert!(rooms.contains("out.scene_index = scene_index;"));
        assert!(rooms.contains("let world_splat_center = vec4<f32>(splat_center, 1.0);"));

        let dynamic_rooms = compose(&SplatShaderConfig {
            use_room_clipping: true,
            dynamic_mode: true,
            ..Default::default()
        });
        assert!(dynamic_rooms.contains("u.transforms[scene_index] * vec4<f32>(splat_center, 1.0)"));
        assert!(dynamic_rooms.contains("u.model_view_matrix * scene_transform"));
    }

    #[test]
    fn sh_fragments_follow_degree() {
        let deg1 = SplatShaderConfig { max_sh_degree: 1, ..Default::default() };
        let names: Vec<_> = active_fragments(&deg1).map(|f| f.name).collect();
        assert!(names.contains(&"sh_degree1_fetch"));
        assert!(!names.contains(&"sh_degree2_fetch"));
        assert!(!names.contains(&"mat4_inverse"));

        let deg2 = SplatShaderConfig { max_sh_degree: 2, dynamic_mode: true, ..Default::default() };
        let names: Vec<_> = active_fragments(&deg2).map(|f| f.name).collect();
        assert!(names.contains(&"sh_degree2_fetch"));
        assert!(names.contains(&"sh_degree2_accumulate"));
        assert!(names.contains(&"mat4_inverse"));
        assert!(!names.contains(&"sh_degree1_fetch"));
    }

    #[test]
    fn fragment_order_is_stable() {
        let config = SplatShaderConfig {
            dynamic_mode: true,
            enable_optional_effects: true,
            use_room_clipping: true,
            fade_in: true,
            max_sh_degree: 2,
            ..Default::default()
        };
        let source = compose(&config);
        let pos = |needle: &str| source.find(needle).unwrap_or_else(|| panic!("missing {needle}"));
        assert!(pos("let scene_index") < pos("let ray_dir"));
        assert!(pos("let ray_dir") < pos("let scene_opacity"));
        assert!(pos("let scene_opacity") < pos("let clip_center"));
        assert!(pos("let clip_center") < pos("if (u.sh_degree >= 1)"));
        assert!(pos("if (u.sh_degree >= 2)") < pos("if (u.fade_in_complete == 0)"));
        assert!(pos("if (u.fade_in_complete == 0)") < pos("var out: VertexOutput;\n    out.clip_position = clip_center"));
    }

    #[test]
    fn fragment_names_are_unique() {
        let names: BTreeSet<_> = fragments().iter().map(|f| f.name).collect();
        assert_eq!(names.len(), fragments().len());

        let full = SplatShaderConfig {
            dynamic_mode: true,
            enable_optional_effects: true,
            use_room_clipping: true,
            fade_in: true,
            max_sh_degree: 2,
            custom_declarations: "const EXTRA: f32 = 1.0;".into(),
            ..Default::default()
        };
        let inactive: Vec<_> = fragments()
            .iter()
            .filter(|f| !f.is_active(&full))
            .map(|f| f.name)
            .collect();
        assert_eq!(inactive, ["room_center_static", "model_view_static", "sh_view_dir_static", "sh_degree1_fetch"]);
    }

    #[test]
    fn custom_declarations_follow_bindings() {
        let config = SplatShaderConfig {
            custom_declarations: "const CUSTOM_TINT: f32 = 0.5;\n\n".into(),
            ..Default::default()
        };
        let source = compose(&config);
        let custom = source.find("const CUSTOM_TINT").unwrap();
        assert!(source.find("var centers_colors_texture").unwrap() < custom);
        assert!(custom < source.find("struct VertexInput").unwrap());

        let blank = SplatShaderConfig { custom_declarations: "  \n".into(), ..Default::default() };
        assert_eq!(compose(&blank), compose(&SplatShaderConfig::default()));
    }

    #[test]
    fn fade_in_is_composable() {
        let plain = compose(&SplatShaderConfig::default());
        let faded = compose(&SplatShaderConfig { fade_in: true, ..Default::default() });
        assert!(!plain.contains("fade_in_complete == 0"));
        assert!(faded.contains("fade_in_complete == 0"));
        assert!(faded.contains("const FADE_DISTANCE: f32 = 0.75;"));
        assert_eq!(faded.len(), plain.len() + fragment("fade_in").unwrap().render(&SplatShaderConfig::default()).len());
    }

    #[test]
    fn constants_carry_reference_values() {
        let source = compose(&SplatShaderConfig::default());
        assert!(source.contains("const SH_8BIT_COMPRESSION_RANGE: f32 = 3.0;"));
        assert!(source.contains("const FRUSTUM_MARGIN: f32 = 1.2;"));
        assert!(source.contains("const MIN_SCENE_OPACITY: f32 = 0.01;"));
        assert!(source.contains("const DISCARDED_POSITION = vec4<f32>(0.0, 0.0, 2.0, 1.0);"));
    }

    #[test]
    fn invalid_degree_is_rejected() {
        let config = SplatShaderConfig { max_sh_degree: 3, ..Default::default() };
        assert!(SplatProgram::build(&config).is_err());
    }

    #[test]
    fn cache_reuses_programs() {
        let mut cache = ProgramCache::new();
        let config = SplatShaderConfig { max_sh_degree: 1, ..Default::default() };
        let a = cache.get_or_build(&config).unwrap();
        let b = cache.get_or_build(&config).unwrap();
        assert!(std::sync::Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);

        let c = cache.get_or_build(&SplatShaderConfig::default()).unwrap();
        assert!(!std::sync::Arc::ptr_eq(&a, &c));
        assert_eq!(cache.len(), 2);

        assert!(cache.get_or_build(&SplatShaderConfig { max_sh_degree: 9, ..Default::default() }).is_err());
        assert_eq!(cache.len(), 2);
    }
}
