//! CPU-side mirror of the packed splat textures.
//!
//! The upload pipeline stores splat attributes in 2-D textures used as flat
//! arrays. Every fetch in the vertex program goes through the same addressing
//! rule: a splat's `stride`-sized block starts at texel `index * stride`, and
//! texel `t` lives at `(t % width, t / width)` in row-major order. The encoders
//! here produce exactly that layout and the decoders read it back the way the
//! shader does.

mod addressing;
mod center_color;
mod scene_index;
mod sh;
mod texture;

pub use addressing::{data_texel_coord, splat_texel, TexelCoord};
pub use center_color::{
    decode_center, decode_color, encode_center_color, encode_center_colors, pack_rgba8, quantize_color,
    unpack_rgba8, CENTER_COLOR_STRIDE,
};
pub use scene_index::encode_scene_indexes;
pub use sh::{
    compress_8bit, decompress_8bit, ShCoefficients, ShLayout, ShPrecision, ShTextures,
    SH_8BIT_COMPRESSION_RANGE,
};
pub use texture::{DataTexture, Texel};
