use anyhow::Result;
use glam::Vec3;

use super::addressing::splat_texel;
use super::texture::DataTexture;

/// Texels per splat in the center/color texture.
pub const CENTER_COLOR_STRIDE: u32 = 1;

/// Packs four 8-bit channels into one word, red in the low byte.
#[inline]
pub fn pack_rgba8(rgba: [u8; 4]) -> u32 {
    u32::from_le_bytes(rgba)
}

/// Inverse of [`pack_rgba8`], normalized to `0..=1` (`unpack4x8unorm`).
#[inline]
pub fn unpack_rgba8(packed: u32) -> [f32; 4] {
    packed.to_le_bytes().map(|b| f32::from(b) / 255.0)
}

/// Quantizes a normalized color to 8-bit channels (clamped, round-to-nearest).
pub fn quantize_color(color: [f32; 4]) -> [u8; 4] {
    color.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
}

/// One center/color texel: `[color, x bits, y bits, z bits]`.
#[inline]
pub fn encode_center_color(center: Vec3, rgba: [u8; 4]) -> [u32; 4] {
    [pack_rgba8(rgba), center.x.to_bits(), center.y.to_bits(), center.z.to_bits()]
}

/// Splat center from a center/color texel; bit-exact.
#[inline]
pub fn decode_center(texel: [u32; 4]) -> Vec3 {
    Vec3::new(f32::from_bits(texel[1]), f32::from_bits(texel[2]), f32::from_bits(texel[3]))
}

/// Normalized color from a center/color texel.
#[inline]
pub fn decode_color(texel: [u32; 4]) -> [f32; 4] {
    unpack_rgba8(texel[0])
}

/// Builds an RGBA32Uint center/color texture, one texel per splat.
pub fn encode_center_colors(splats: &[(Vec3, [u8; 4])], width: u32) -> Result<DataTexture<u32>> {
    let count = splats.len() as u32 * CENTER_COLOR_STRIDE;
    let mut texture = DataTexture::with_texel_count(count, width, 4)?;
    for (i, (center, rgba)) in splats.iter().enumerate() {
        let texel = splat_texel(i as u32, CENTER_COLOR_STRIDE, 0);
        for (c, word) in encode_center_color(*center, *rgba).into_iter().enumerate() {
            texture.set(texel, c as u32, word);
        }
    }
    Ok(texture)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_round_trip_is_bit_exact() {
        let centers = [
            Vec3::new(0.1, -2.5e-7, 12345.678),
            Vec3::new(-0.0, f32::MIN_POSITIVE, f32::MAX),
            Vec3::new(1.0 / 3.0, -1.0 / 7.0, 1e-38),
        ];
        for center in centers {
            let decoded = decode_center(encode_center_color(center, [0; 4]));
            assert_eq!(decoded.x.to_bits(), center.x.to_bits());
            assert_eq!(decoded.y.to_bits(), center.y.to_bits());
            assert_eq!(decoded.z.to_bits(), center.z.to_bits());
        }
    }

    #[test]
    fn color_round_trip_within_one_step() {
        let colors = [[0.0, 0.5, 1.0, 0.25], [0.123, 0.456, 0.789, 0.999], [0.002, 0.998, 0.5, 0.0]];
        for color in colors {
            let decoded = decode_color(encode_center_color(Vec3::ZERO, quantize_color(color)));
            for (a, b) in color.iter().zip(decoded) {
                assert!((a - b).abs() <= 1.0 / 255.0, "{a} vs {b}");
            }
        }
    }

    #[test]
    fn red_is_low_byte() {
        assert_eq!(pack_rgba8([0x11, 0x22, 0x33, 0x44]), 0x4433_2211);
        assert_eq!(unpack_rgba8(0xff00_00ff), [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn texture_holds_one_texel_per_splat() {
        let splats = [
            (Vec3::new(1.0, 2.0, 3.0), [255, 0, 0, 255]),
            (Vec3::new(4.0, 5.0, 6.0), [0, 255, 0, 128]),
            (Vec3::new(7.0, 8.0, 9.0), [0, 0, 255, 0]),
        ];
        let texture = encode_center_colors(&splats, 2).unwrap();
        assert_eq!(texture.size(), [2, 2]);
        let texel = texture.load_texel(2);
        assert_eq!(decode_center(texel), Vec3::new(7.0, 8.0, 9.0));
        assert_eq!(decode_color(texel), [0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn zero_width_is_an_error() {
        assert!(encode_center_colors(&[(Vec3::ZERO, [0; 4])], 0).is_err());
    }
}
