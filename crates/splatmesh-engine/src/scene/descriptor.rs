use glam::{Mat4, Quat, Vec3};

/// Optional per-scene attributes, with the defaults a freshly attached scene gets.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SceneOptions {
    /// Splats with alpha below this threshold are dropped by the upload pipeline.
    pub minimum_alpha: f32,
    /// Scene opacity in `0..=1`. Scenes at or below 0.01 are culled when effects are enabled.
    pub opacity: f32,
    pub visible: bool,
    /// Room bounding box (only read when room clipping is compiled in).
    pub aabb_min: Vec3,
    pub aabb_max: Vec3,
    /// Whether the scene is an enclosing clipping volume rather than free-floating geometry.
    pub is_room: bool,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            minimum_alpha: 1.0,
            opacity: 1.0,
            visible: true,
            aabb_min: Vec3::ZERO,
            aabb_max: Vec3::ZERO,
            is_room: false,
        }
    }
}

/// Transform and visibility state for one scene of a splat mesh.
///
/// `transform` is derived from `position`, `orientation` and `scale` and is
/// never recomputed implicitly: after mutating any of the three, call
/// [`SplatScene::update_transform`] before the scene is uploaded.
#[derive(Debug, Clone, PartialEq)]
pub struct SplatScene {
    pub position: Vec3,
    /// Unit quaternion; callers are responsible for normalization.
    pub orientation: Quat,
    /// Per-axis scale, may be non-uniform.
    pub scale: Vec3,
    pub minimum_alpha: f32,
    pub opacity: f32,
    pub visible: bool,
    pub aabb_min: Vec3,
    pub aabb_max: Vec3,
    pub is_room: bool,
    transform: Mat4,
}

impl SplatScene {
    /// Creates a scene with default options.
    pub fn new(position: Vec3, orientation: Quat, scale: Vec3) -> Self {
        Self::with_options(position, orientation, scale, SceneOptions::default())
    }

    pub fn with_options(position: Vec3, orientation: Quat, scale: Vec3, options: SceneOptions) -> Self {
        Self {
            position,
            orientation,
            scale,
            minimum_alpha: options.minimum_alpha,
            opacity: options.opacity,
            visible: options.visible,
            aabb_min: options.aabb_min,
            aabb_max: options.aabb_max,
            is_room: options.is_room,
            transform: compose(position, orientation, scale),
        }
    }

    /// Local-to-world transform as of the last [`update_transform`](Self::update_transform).
    #[inline]
    pub fn transform(&self) -> Mat4 {
        self.transform
    }

    /// Recomputes `transform` as translate * rotate * scale.
    pub fn update_transform(&mut self) {
        self.transform = compose(self.position, self.orientation, self.scale);
    }

    /// Returns `true` if `transform` matches the current position/orientation/scale.
    ///
    /// A `false` result means a mutation was not followed by `update_transform`.
    pub fn transform_is_current(&self) -> bool {
        self.transform == compose(self.position, self.orientation, self.scale)
    }

    /// Copies position, orientation, scale and transform from `other`.
    ///
    /// Opacity, visibility, room bounds and `minimum_alpha` are left untouched.
    pub fn copy_transform_data(&mut self, other: &SplatScene) {
        self.position = other.position;
        self.orientation = other.orientation;
        self.scale = other.scale;
        self.transform = other.transform;
    }
}

#[inline]
fn compose(position: Vec3, orientation: Quat, scale: Vec3) -> Mat4 {
    Mat4::from_scale_rotation_translation(scale, orientation, position)
}
