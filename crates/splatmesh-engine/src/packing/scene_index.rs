use anyhow::Result;

use super::addressing::splat_texel;
use super::texture::DataTexture;

/// Builds the single-channel R32Uint scene-index texture, one texel per splat.
pub fn encode_scene_indexes(scene_indexes: &[u32], width: u32) -> Result<DataTexture<u32>> {
    let mut texture = DataTexture::with_texel_count(scene_indexes.len() as u32, width, 1)?;
    for (i, scene) in scene_indexes.iter().enumerate() {
        texture.set(splat_texel(i as u32, 1, 0), 0, *scene);
    }
    Ok(texture)
}
