use anyhow::{ensure, Result};
use glam::Vec3;

use super::texture::{DataTexture, Texel};

/// Full value range covered by 8-bit SH coefficients, centered on zero.
pub const SH_8BIT_COMPRESSION_RANGE: f32 = 3.0;
const SH_8BIT_COMPRESSION_HALF_RANGE: f32 = SH_8BIT_COMPRESSION_RANGE / 2.0;

/// Degree-1 and degree-2 SH coefficients of one splat, one RGB vector per
/// basis function (`sh1..sh8`). Degree 1 uses the first three.
pub type ShCoefficients = [Vec3; 8];

/// How SH coefficients are spread over textures.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum ShLayout {
    /// One RGBA texture, coefficients contiguous per splat.
    #[default]
    SingleTexture,
    /// Three textures (`sh_texture_r/g/b`), two texels per splat each.
    MultiTexture,
}

/// Storage precision of SH components.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum ShPrecision {
    #[default]
    Float32,
    /// Unorm bytes, expanded with `value * RANGE - RANGE / 2`.
    Uint8,
}

/// Quantizes `value` in `[-RANGE/2, RANGE/2]` to a byte. Values outside are clamped.
pub fn compress_8bit(value: f32) -> u8 {
    let unit = (value + SH_8BIT_COMPRESSION_HALF_RANGE) / SH_8BIT_COMPRESSION_RANGE;
    (unit.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Expands a normalized (`byte / 255`) sample back to a coefficient.
#[inline]
pub fn decompress_8bit(normalized: f32) -> f32 {
    normalized * SH_8BIT_COMPRESSION_RANGE - SH_8BIT_COMPRESSION_HALF_RANGE
}

// ── slot mapping ──────────────────────────────────────────────────────────

/// (texture plane, float offset in the splat's block) for each component of
/// `sh1..sh8` in the per-channel layout at degree 2.
const MULTI_TEXTURE_SLOTS: [[(usize, u32); 3]; 8] = [
    [(0, 0), (0, 1), (0, 2)],
    [(1, 0), (1, 1), (1, 2)],
    [(2, 0), (2, 1), (2, 2)],
    [(0, 3), (0, 4), (0, 5)],
    [(0, 6), (0, 7), (1, 3)],
    [(1, 4), (1, 5), (1, 6)],
    [(1, 7), (2, 3), (2, 4)],
    [(2, 5), (2, 6), (2, 7)],
];

const MULTI_TEXTURE_STRIDE: u32 = 2;
const SINGLE_TEXTURE_DEGREE2_STRIDE: u32 = 6;

#[inline]
fn coefficient_count(degree: u8) -> usize {
    if degree >= 2 { 8 } else { 3 }
}

/// Where component `channel` of coefficient `k` of `splat_index` is stored:
/// `(plane, linear texel, texel component)`.
fn slot(layout: ShLayout, degree: u8, channels: u32, splat_index: u32, k: usize, channel: usize) -> (usize, u32, u32) {
    match layout {
        ShLayout::SingleTexture if degree >= 2 => {
            let f = (3 * k + channel) as u32;
            (0, splat_index * SINGLE_TEXTURE_DEGREE2_STRIDE + f / 4, f % 4)
        }
        ShLayout::SingleTexture => {
            // Pairs of splats share 5 texels (2.5 per splat); the odd splat starts at float 10.
            let f = (splat_index & 1) * 10 + (3 * k + channel) as u32;
            (0, (splat_index / 2) * 5 + f / 4, f % 4)
        }
        ShLayout::MultiTexture => {
            let (plane, f) = MULTI_TEXTURE_SLOTS[k][channel];
            (plane, splat_index * MULTI_TEXTURE_STRIDE + f / channels, f % channels)
        }
    }
}

// ── textures ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum Planes {
    Float(Vec<DataTexture<f32>>),
    Byte(Vec<DataTexture<u8>>),
}

/// SH textures for a set of splats, in one of the two layouts.
#[derive(Debug, Clone, PartialEq)]
pub struct ShTextures {
    layout: ShLayout,
    precision: ShPrecision,
    degree: u8,
    planes: Planes,
}

fn texel_count(layout: ShLayout, degree: u8, splat_count: u32) -> u32 {
    match layout {
        ShLayout::SingleTexture if degree >= 2 => splat_count * SINGLE_TEXTURE_DEGREE2_STRIDE,
        ShLayout::SingleTexture => splat_count.div_ceil(2) * 5,
        ShLayout::MultiTexture => splat_count * MULTI_TEXTURE_STRIDE,
    }
}

fn plane_shape(layout: ShLayout, degree: u8) -> (usize, u32) {
    match layout {
        ShLayout::SingleTexture => (1, 4),
        // Degree 1 needs only 4 floats per splat per plane, stored as RG texels.
        ShLayout::MultiTexture if degree >= 2 => (3, 4),
        ShLayout::MultiTexture => (3, 2),
    }
}

fn build_planes<T: Texel>(
    coefficients: &[ShCoefficients],
    degree: u8,
    layout: ShLayout,
    width: u32,
    encode: impl Fn(f32) -> T,
) -> Result<Vec<DataTexture<T>>> {
    let (plane_count, channels) = plane_shape(layout, degree);
    let texels = texel_count(layout, degree, coefficients.len() as u32);
    let mut planes = (0..plane_count)
        .map(|_| DataTexture::with_texel_count(texels, width, channels))
        .collect::<Result<Vec<DataTexture<T>>>>()?;

    for (i, coeffs) in coefficients.iter().enumerate() {
        for (k, rgb) in coeffs.iter().take(coefficient_count(degree)).enumerate() {
            for (channel, value) in rgb.to_array().into_iter().enumerate() {
                let (plane, texel, component) = slot(layout, degree, channels, i as u32, k, channel);
                planes[plane].set(texel, component, encode(value));
            }
        }
    }
    Ok(planes)
}

impl ShTextures {
    /// Packs `coefficients` (one entry per splat) for a program compiled at `degree`.
    pub fn pack(
        coefficients: &[ShCoefficients],
        degree: u8,
        layout: ShLayout,
        precision: ShPrecision,
        width: u32,
    ) -> Result<Self> {
        ensure!((1..=2).contains(&degree), "SH textures need degree 1 or 2, got {degree}");
        ensure!(width > 0, "SH texture width must be non-zero");

        let planes = match precision {
            ShPrecision::Float32 => Planes::Float(build_planes(coefficients, degree, layout, width, |v| v)?),
            ShPrecision::Uint8 => Planes::Byte(build_planes(coefficients, degree, layout, width, compress_8bit)?),
        };
        Ok(Self { layout, precision, degree, planes })
    }

    #[inline]
    pub fn layout(&self) -> ShLayout {
        self.layout
    }

    #[inline]
    pub fn precision(&self) -> ShPrecision {
        self.precision
    }

    #[inline]
    pub fn degree(&self) -> u8 {
        self.degree
    }

    /// Value of the `sh_texture_size` uniform.
    pub fn size(&self) -> [u32; 2] {
        match &self.planes {
            Planes::Float(p) => p[0].size(),
            Planes::Byte(p) => p[0].size(),
        }
    }

    /// Components per texel: 2 for per-channel degree-1 textures, otherwise 4.
    pub fn channels(&self) -> u32 {
        plane_shape(self.layout, self.degree).1
    }

    /// Number of textures (1 for the single layout, 3 for per-channel).
    pub fn plane_count(&self) -> usize {
        match &self.planes {
            Planes::Float(p) => p.len(),
            Planes::Byte(p) => p.len(),
        }
    }

    /// Raw bytes of texture `plane`.
    pub fn plane_bytes(&self, plane: usize) -> Option<&[u8]> {
        match &self.planes {
            Planes::Float(p) => p.get(plane).map(DataTexture::as_bytes),
            Planes::Byte(p) => p.get(plane).map(DataTexture::as_bytes),
        }
    }

    /// Samples linear texel `texel` of `plane` the way `textureLoad` sees it.
    fn sample(&self, plane: usize, texel: u32) -> [f32; 4] {
        match &self.planes {
            Planes::Float(p) => p[plane].load_normalized(texel),
            Planes::Byte(p) => p[plane].load_normalized(texel),
        }
    }

    fn expand(&self, v: Vec3) -> Vec3 {
        match self.precision {
            ShPrecision::Float32 => v,
            ShPrecision::Uint8 => v * SH_8BIT_COMPRESSION_RANGE - Vec3::splat(SH_8BIT_COMPRESSION_HALF_RANGE),
        }
    }

    /// Fetches and decodes the coefficients of `splat_index` with the same
    /// texel selection, odd/even blend and 8-bit expansion as the vertex program.
    ///
    /// Coefficients above the packed degree are zero.
    pub fn fetch(&self, splat_index: u32) -> ShCoefficients {
        let mut sh = [Vec3::ZERO; 8];
        let v3 = |a: f32, b: f32, c: f32| Vec3::new(a, b, c);

        match (self.layout, self.degree >= 2) {
            (ShLayout::SingleTexture, false) => {
                let odd_offset = splat_index & 1;
                let nearest_even_index = splat_index - odd_offset;
                let f_odd = odd_offset as f32;
                let base = (nearest_even_index / 2) * 5 + odd_offset * 2;
                let t0 = self.sample(0, base);
                let t1 = self.sample(0, base + 1);
                let t2 = self.sample(0, base + 2);
                sh[0] = v3(t0[0], t0[1], t0[2]) * (1.0 - f_odd) + v3(t0[2], t0[3], t1[0]) * f_odd;
                sh[1] = v3(t0[3], t1[0], t1[1]) * (1.0 - f_odd) + v3(t1[1], t1[2], t1[3]) * f_odd;
                sh[2] = v3(t1[2], t1[3], t2[0]) * (1.0 - f_odd) + v3(t2[0], t2[1], t2[2]) * f_odd;
            }
            (ShLayout::SingleTexture, true) => {
                let base = splat_index * SINGLE_TEXTURE_DEGREE2_STRIDE;
                let t: Vec<[f32; 4]> = (0..6).map(|i| self.sample(0, base + i)).collect();
                sh[0] = v3(t[0][0], t[0][1], t[0][2]);
                sh[1] = v3(t[0][3], t[1][0], t[1][1]);
                sh[2] = v3(t[1][2], t[1][3], t[2][0]);
                sh[3] = v3(t[2][1], t[2][2], t[2][3]);
                sh[4] = v3(t[3][0], t[3][1], t[3][2]);
                sh[5] = v3(t[3][3], t[4][0], t[4][1]);
                sh[6] = v3(t[4][2], t[4][3], t[5][0]);
                sh[7] = v3(t[5][1], t[5][2], t[5][3]);
            }
            (ShLayout::MultiTexture, false) => {
                let base = splat_index * MULTI_TEXTURE_STRIDE;
                for (plane, out) in sh.iter_mut().take(3).enumerate() {
                    let a = self.sample(plane, base);
                    let b = self.sample(plane, base + 1);
                    *out = v3(a[0], a[1], b[0]);
                }
            }
            (ShLayout::MultiTexture, true) => {
                let base = splat_index * MULTI_TEXTURE_STRIDE;
                let [r0, g0, b0] = [0, 1, 2].map(|p| self.sample(p, base));
                let [r1, g1, b1] = [0, 1, 2].map(|p| self.sample(p, base + 1));
                sh[0] = v3(r0[0], r0[1], r0[2]);
                sh[1] = v3(g0[0], g0[1], g0[2]);
                sh[2] = v3(b0[0], b0[1], b0[2]);
                sh[3] = v3(r0[3], r1[0], r1[1]);
                sh[4] = v3(r1[2], r1[3], g0[3]);
                sh[5] = v3(g1[0], g1[1], g1[2]);
                sh[6] = v3(g1[3], b0[3], b1[0]);
                sh[7] = v3(b1[1], b1[2], b1[3]);
            }
        }

        let count = coefficient_count(self.degree);
        for v in sh.iter_mut().take(count) {
            *v = self.expand(*v);
        }
        sh
    }
}
