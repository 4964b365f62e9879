use glam::Vec3;

use crate::packing::ShCoefficients;

use super::FADE_DISTANCE;

/// Real SH basis constant for degree 1.
pub const SH_C1: f32 = 0.488_602_52;

/// Real SH basis constants for the five degree-2 terms
/// `xy`, `yz`, `2z² - x² - y²`, `xz`, `x² - y²`.
pub const SH_C2: [f32; 5] = [1.092_548_4, -1.092_548_4, 0.315_391_6, -1.092_548_4, 0.546_274_2];

/// Adds the view-dependent SH contribution to `base` and clamps to `[0, 1]`.
///
/// `view_dir` must be normalized. Degree 0 returns `base` untouched.
pub fn sh_view_dependent_color(base: Vec3, sh: &ShCoefficients, degree: u8, view_dir: Vec3) -> Vec3 {
    if degree == 0 {
        return base;
    }
    let Vec3 { x, y, z } = view_dir;
    let mut color = base + SH_C1 * (-sh[0] * y + sh[1] * z - sh[2] * x);

    if degree >= 2 {
        let (xx, yy, zz) = (x * x, y * y, z * z);
        let (xy, yz, xz) = (x * y, y * z, x * z);
        color += (SH_C2[0] * xy) * sh[3]
            + (SH_C2[1] * yz) * sh[4]
            + (SH_C2[2] * (2.0 * zz - xx - yy)) * sh[5]
            + (SH_C2[3] * xz) * sh[6]
            + (SH_C2[4] * (xx - yy)) * sh[7];
    }
    color.clamp(Vec3::ZERO, Vec3::ONE)
}

/// Alpha multiplier of the fade-in effect at `distance` from the scene center.
///
/// 1 inside `fade_start_radius`, 0 beyond `fade_start_radius + FADE_DISTANCE`,
/// linear in between.
pub fn fade_in_factor(distance: f32, fade_start_radius: f32) -> f32 {
    let beyond_start = if distance < fade_start_radius { 0.0 } else { 1.0 };
    let falloff = 1.0 - ((distance - fade_start_radius) / FADE_DISTANCE).clamp(0.0, 1.0);
    (1.0 - beyond_start) + falloff * beyond_start
}
