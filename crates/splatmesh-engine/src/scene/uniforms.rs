use anyhow::Result;
use glam::{Mat4, Vec3};

use crate::shader::{UniformValue, UniformValues};

use super::{SplatScene, MAX_SCENES};

/// Per-scene uniform arrays, each exactly [`MAX_SCENES`] long.
///
/// Slots past the last scene hold the uniform table defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneUniformArrays {
    pub opacity: Vec<f32>,
    pub visibility: Vec<i32>,
    pub transforms: Vec<Mat4>,
    pub aabb_mins: Vec<Vec3>,
    pub aabb_maxs: Vec<Vec3>,
}

impl Default for SceneUniformArrays {
    fn default() -> Self {
        Self {
            opacity: vec![1.0; MAX_SCENES],
            visibility: vec![1; MAX_SCENES],
            transforms: vec![Mat4::IDENTITY; MAX_SCENES],
            aabb_mins: vec![Vec3::splat(-1.0); MAX_SCENES],
            aabb_maxs: vec![Vec3::ONE; MAX_SCENES],
        }
    }
}

impl SceneUniformArrays {
    /// Collects the per-scene state of `scenes`, indexed by scene position.
    ///
    /// At most [`MAX_SCENES`] scenes fit; extra scenes are dropped with a warning.
    pub fn from_scenes(scenes: &[SplatScene]) -> Self {
        debug_assert!(scenes.len() <= MAX_SCENES, "{} scenes exceed MAX_SCENES", scenes.len());
        if scenes.len() > MAX_SCENES {
            log::warn!(
                "splat mesh has {} scenes, only the first {MAX_SCENES} are uploaded",
                scenes.len()
            );
        }

        let mut out = Self::default();
        for (i, scene) in scenes.iter().take(MAX_SCENES).enumerate() {
            if !scene.transform_is_current() {
                log::warn!("scene {i} uploaded with a stale transform; call update_transform after mutating it");
            }
            out.opacity[i] = scene.opacity;
            out.visibility[i] = i32::from(scene.visible);
            out.transforms[i] = scene.transform();
            out.aabb_mins[i] = scene.aabb_min;
            out.aabb_maxs[i] = scene.aabb_max;
        }
        out
    }
}

impl UniformValues {
    /// Writes the per-scene arrays this program variant declares; the rest are skipped.
    pub fn apply_scenes(&mut self, scenes: &SceneUniformArrays) -> Result<()> {
        let entries = [
            ("scene_opacity", UniformValue::FloatArray(scenes.opacity.clone())),
            ("scene_visibility", UniformValue::IntArray(scenes.visibility.clone())),
            ("transforms", UniformValue::Mat4Array(scenes.transforms.clone())),
            ("aabb_mins", UniformValue::Vec3Array(scenes.aabb_mins.clone())),
            ("aabb_maxs", UniformValue::Vec3Array(scenes.aabb_maxs.clone())),
        ];
        for (name, value) in entries {
            if self.table().contains(name) {
                self.set(name, value)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use glam::Quat;

    use super::*;
    use crate::scene::SceneOptions;
    use crate::shader::{build_uniform_table, SplatShaderConfig};

    fn scene_at(x: f32) -> SplatScene {
        SplatScene::new(Vec3::new(x, 0.0, 0.0), Quat::IDENTITY, Vec3::ONE)
    }

    #[test]
    fn arrays_are_padded_with_defaults() {
        let hidden = SplatScene::with_options(
            Vec3::ZERO,
            Quat::IDENTITY,
            Vec3::ONE,
            SceneOptions {
                opacity: 0.5,
                visible: false,
                aabb_min: Vec3::splat(-3.0),
                aabb_max: Vec3::splat(3.0),
                is_room: true,
                ..SceneOptions::default()
            },
        );
        let arrays = SceneUniformArrays::from_scenes(&[scene_at(2.0), hidden]);

        assert_eq!(arrays.opacity.len(), MAX_SCENES);
        assert_eq!(arrays.opacity[1], 0.5);
        assert_eq!(arrays.visibility[..3], [1, 0, 1]);
        assert_eq!(arrays.transforms[0].w_axis.x, 2.0);
        assert_eq!(arrays.transforms[2], Mat4::IDENTITY);
        assert_eq!(arrays.aabb_maxs[1], Vec3::splat(3.0));
        assert_eq!(arrays.aabb_mins[5], Vec3::splat(-1.0));
    }

    #[test]
    fn stale_transform_is_uploaded_as_is() {
        let mut scene = scene_at(1.0);
        scene.position = Vec3::new(9.0, 0.0, 0.0);
        let arrays = SceneUniformArrays::from_scenes(&[scene]);
        assert_eq!(arrays.transforms[0].w_axis.x, 1.0);
    }

    #[test]
    fn apply_only_sets_declared_arrays() {
        let config = SplatShaderConfig { dynamic_mode: true, ..SplatShaderConfig::default() };
        let mut values = UniformValues::new(&build_uniform_table(&config));
        let arrays = SceneUniformArrays::from_scenes(&[scene_at(0.0), scene_at(4.0)]);
        values.apply_scenes(&arrays).unwrap();

        assert_eq!(values.mat4_at("transforms", 1).map(|m| m.w_axis.x), Some(4.0));
        assert!(values.get("scene_opacity").is_none());
        assert!(values.get("aabb_mins").is_none());
    }

    #[test]
    fn apply_all_features() {
        let config = SplatShaderConfig {
            dynamic_mode: true,
            enable_optional_effects: true,
            use_room_clipping: true,
            ..SplatShaderConfig::default()
        };
        let mut values = UniformValues::new(&build_uniform_table(&config));
        let mut scene = scene_at(0.0);
        scene.opacity = 0.0;
        values.apply_scenes(&SceneUniformArrays::from_scenes(&[scene])).unwrap();

        assert_eq!(values.float_at("scene_opacity", 0), Some(0.0));
        assert_eq!(values.int_at("scene_visibility", 0), Some(1));
        assert_eq!(values.vec3_at("aabb_maxs", 0), Some(Vec3::ZERO));
        assert_eq!(values.vec3_at("aabb_maxs", 1), Some(Vec3::ONE));
    }
}
