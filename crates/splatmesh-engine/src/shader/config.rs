use anyhow::{ensure, Result};

use crate::packing::{ShLayout, ShPrecision};

use super::uniforms::{UniformValue, UniformValues};

/// Highest spherical-harmonics degree the program generator supports.
pub const MAX_SH_DEGREE: u8 = 2;

/// Compile-time switches for one vertex-program variant.
///
/// Each distinct configuration produces a distinct program; flags that only
/// pick a branch inside a compiled program live in [`RuntimeShading`].
#[derive(Debug, Clone, PartialEq)]
pub struct SplatShaderConfig {
    /// Per-scene transforms are read from the `transforms` uniform array.
    pub dynamic_mode: bool,
    /// Per-scene opacity/visibility culling.
    pub enable_optional_effects: bool,
    /// Highest SH degree compiled in (`0..=2`).
    pub max_sh_degree: u8,
    /// Extra WGSL declarations inserted after the generated bindings.
    pub custom_declarations: String,
    /// Ray/AABB clipping against per-scene room bounds.
    pub use_room_clipping: bool,
    /// Distance-based alpha fade applied until `fade_in_complete` is set.
    pub fade_in: bool,
    /// Default value of the `splat_scale` uniform.
    pub splat_scale: f32,
}

impl Default for SplatShaderConfig {
    fn default() -> Self {
        Self {
            dynamic_mode: false,
            enable_optional_effects: false,
            max_sh_degree: 0,
            custom_declarations: String::new(),
            use_room_clipping: false,
            fade_in: false,
            splat_scale: 1.0,
        }
    }
}

impl SplatShaderConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.max_sh_degree <= MAX_SH_DEGREE,
            "spherical harmonics degree {} exceeds supported maximum {}",
            self.max_sh_degree,
            MAX_SH_DEGREE
        );
        ensure!(self.splat_scale.is_finite(), "splat scale must be finite");
        Ok(())
    }

    /// Any feature that needs the owning scene of a splat.
    #[inline]
    pub fn uses_scene_indexes(&self) -> bool {
        self.dynamic_mode || self.enable_optional_effects || self.use_room_clipping
    }

    /// Hashable identity of the compiled variant.
    pub fn variant_key(&self) -> VariantKey {
        VariantKey {
            dynamic_mode: self.dynamic_mode,
            enable_optional_effects: self.enable_optional_effects,
            max_sh_degree: self.max_sh_degree,
            custom_declarations: self.custom_declarations.clone(),
            use_room_clipping: self.use_room_clipping,
            fade_in: self.fade_in,
            splat_scale_bits: self.splat_scale.to_bits(),
        }
    }
}

/// Cache key for compiled program variants.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariantKey {
    pub dynamic_mode: bool,
    pub enable_optional_effects: bool,
    pub max_sh_degree: u8,
    pub custom_declarations: String,
    pub use_room_clipping: bool,
    pub fade_in: bool,
    pub splat_scale_bits: u32,
}

/// SH switches resolved inside a compiled variant through uniforms.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RuntimeShading {
    /// Requested SH degree; clamped to the variant's compiled maximum.
    pub sh_degree: u8,
    pub precision: ShPrecision,
    pub layout: ShLayout,
}

impl Default for RuntimeShading {
    fn default() -> Self {
        Self {
            sh_degree: 0,
            precision: ShPrecision::Float32,
            layout: ShLayout::SingleTexture,
        }
    }
}

impl RuntimeShading {
    /// Writes `sh_degree`, `sh_8bit_mode` and `sh_multi_texture_mode`.
    pub fn apply(&self, config: &SplatShaderConfig, values: &mut UniformValues) -> Result<()> {
        let degree = self.sh_degree.min(config.max_sh_degree);
        if degree != self.sh_degree {
            log::debug!(
                "requested SH degree {} clamped to compiled maximum {}",
                self.sh_degree,
                config.max_sh_degree
            );
        }
        values.set("sh_degree", UniformValue::Int(i32::from(degree)))?;
        values.set(
            "sh_8bit_mode",
            UniformValue::Int(i32::from(self.precision == ShPrecision::Uint8)),
        )?;
        values.set(
            "sh_multi_texture_mode",
            UniformValue::Int(i32::from(self.layout == ShLayout::MultiTexture)),
        )?;
        Ok(())
    }
}
