use anyhow::{ensure, Result};
use bytemuck::Pod;

use super::addressing::{data_texel_coord, TexelCoord};

/// A texel component type and the value a shader load produces from it.
pub trait Texel: Pod + Default {
    /// Component as seen through a float texture view.
    fn normalized(self) -> f32;
}

impl Texel for f32 {
    #[inline]
    fn normalized(self) -> f32 {
        self
    }
}

impl Texel for u8 {
    #[inline]
    fn normalized(self) -> f32 {
        f32::from(self) / 255.0
    }
}

impl Texel for u32 {
    #[inline]
    fn normalized(self) -> f32 {
        self as f32
    }
}

/// Row-major texel buffer with 1 to 4 components per texel.
///
/// Stands in for a GPU data texture: `load` behaves like `textureLoad`, with
/// absent components reading as zero.
#[derive(Debug, Clone, PartialEq)]
pub struct DataTexture<T> {
    width: u32,
    height: u32,
    channels: u32,
    data: Vec<T>,
}

impl<T: Texel> DataTexture<T> {
    /// Allocates a zeroed texture large enough for `texel_count` texels.
    ///
    /// Fails on a zero width or a channel count outside `1..=4`.
    pub fn with_texel_count(texel_count: u32, width: u32, channels: u32) -> Result<Self> {
        ensure!(width > 0, "data texture width must be non-zero");
        ensure!((1..=4).contains(&channels), "data textures hold 1 to 4 channels, got {channels}");
        let height = texel_count.div_ceil(width).max(1);
        Ok(Self {
            width,
            height,
            channels,
            data: vec![T::default(); (width * height * channels) as usize],
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn channels(&self) -> u32 {
        self.channels
    }

    /// `[width, height]`, the value of the matching `*_texture_size` uniform.
    #[inline]
    pub fn size(&self) -> [u32; 2] {
        [self.width, self.height]
    }

    /// Raw component data, ready for `queue.write_texture`.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    #[inline]
    fn base(&self, texel: u32) -> usize {
        (texel * self.channels) as usize
    }

    /// Writes component `channel` of linear texel `texel`.
    pub fn set(&mut self, texel: u32, channel: u32, value: T) {
        debug_assert!(channel < self.channels);
        let at = self.base(texel) + channel as usize;
        self.data[at] = value;
    }

    /// Loads the texel at `coord`. Out-of-range coordinates read as zero.
    pub fn load(&self, coord: TexelCoord) -> [T; 4] {
        let mut out = [T::default(); 4];
        if coord.x >= self.width || coord.y >= self.height {
            return out;
        }
        let base = self.base(coord.y * self.width + coord.x);
        for (c, slot) in out.iter_mut().enumerate().take(self.channels as usize) {
            *slot = self.data[base + c];
        }
        out
    }

    /// Loads linear texel `texel` through the row-major addressing rule.
    #[inline]
    pub fn load_texel(&self, texel: u32) -> [T; 4] {
        self.load(data_texel_coord(texel, self.width))
    }

    /// Loads linear texel `texel` as normalized floats.
    pub fn load_normalized(&self, texel: u32) -> [f32; 4] {
        self.load_texel(texel).map(Texel::normalized)
    }
}
