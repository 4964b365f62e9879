/// Integer texel coordinate in a data texture.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct TexelCoord {
    pub x: u32,
    pub y: u32,
}

impl TexelCoord {
    #[inline]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Linear texel index of slot `offset` in the block of `splat_index`.
#[inline]
pub fn splat_texel(splat_index: u32, stride: u32, offset: u32) -> u32 {
    splat_index * stride + offset
}

/// Row-major coordinate of linear texel `texel` in a texture `width` texels wide.
///
/// Matches `data_coord` in the generated program.
#[inline]
pub fn data_texel_coord(texel: u32, width: u32) -> TexelCoord {
    debug_assert!(width > 0);
    TexelCoord::new(texel % width, texel / width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_row_is_identity() {
        assert_eq!(data_texel_coord(0, 1024), TexelCoord::new(0, 0));
        assert_eq!(data_texel_coord(1023, 1024), TexelCoord::new(1023, 0));
    }

    #[test]
    fn wraps_to_next_row() {
        assert_eq!(data_texel_coord(1024, 1024), TexelCoord::new(0, 1));
        assert_eq!(data_texel_coord(2 * 1024 + 7, 1024), TexelCoord::new(7, 2));
    }

    #[test]
    fn stride_and_offset_select_block_slot() {
        assert_eq!(splat_texel(10, 6, 3), 63);
        assert_eq!(data_texel_coord(splat_texel(200, 6, 5), 1000), TexelCoord::new(205, 1));
    }

    #[test]
    fn odd_width_rows() {
        assert_eq!(data_texel_coord(10, 3), TexelCoord::new(1, 3));
    }
}
