use glam::{Vec2, Vec3, Vec4};

use super::{FRUSTUM_MARGIN, MIN_SCENE_OPACITY};

/// Returns `true` if `clip` lies outside the frustum enlarged by [`FRUSTUM_MARGIN`].
#[inline]
pub fn frustum_discards(clip: Vec4) -> bool {
    let bound = FRUSTUM_MARGIN * clip.w;
    clip.z < -bound || clip.z > bound || clip.x < -bound || clip.x > bound || clip.y < -bound || clip.y > bound
}

/// Slab test of a ray against an axis-aligned box.
///
/// Returns `(t_near, t_far)`; the ray hits the box when `t_near <= t_far`.
/// Zero direction components produce infinite slab bounds.
pub fn ray_intersects_aabb(origin: Vec3, dir: Vec3, aabb_min: Vec3, aabb_max: Vec3) -> Vec2 {
    let t_min = (aabb_min - origin) / dir;
    let t_max = (aabb_max - origin) / dir;
    let t1 = t_min.min(t_max);
    let t2 = t_min.max(t_max);
    Vec2::new(t1.max_element(), t2.min_element())
}

/// Room clipping: discard a splat that is not inside the room as seen from `camera`.
///
/// The splat survives when the camera ray through it enters the box before
/// reaching it and the box is not entirely behind the camera. Splats past the
/// far wall are kept.
pub fn room_discards(world_center: Vec3, camera: Vec3, aabb_min: Vec3, aabb_max: Vec3) -> bool {
    let to_splat = world_center - camera;
    let t = ray_intersects_aabb(camera, to_splat.normalize(), aabb_min, aabb_max);
    let (t_near, t_far) = (t.x, t.y);
    to_splat.length() < t_near || t_near > t_far || t_far < 0.0
}

/// Per-scene effect gate.
#[inline]
pub fn scene_effect_discards(opacity: f32, visible: bool) -> bool {
    opacity <= MIN_SCENE_OPACITY || !visible
}
