use anyhow::{ensure, Result};
use glam::UVec2;

use crate::packing::{DataTexture, ShLayout, ShPrecision, ShTextures, Texel};
use crate::shader::{UniformValue, UniformValues};

use super::RenderCtx;

/// A packed data texture resident on the GPU.
pub struct GpuDataTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub size: [u32; 2],
}

impl GpuDataTexture {
    /// Creates a texture of `format` and uploads `bytes` (tightly packed rows).
    pub fn from_bytes(
        ctx: RenderCtx<'_>,
        label: &str,
        format: wgpu::TextureFormat,
        size: [u32; 2],
        bytes_per_texel: u32,
        bytes: &[u8],
    ) -> Result<Self> {
        let [width, height] = size;
        ensure!(width > 0 && height > 0, "texture `{label}` has zero size");
        ensure!(
            bytes.len() as u64 == u64::from(width) * u64::from(height) * u64::from(bytes_per_texel),
            "texture `{label}`: {} bytes do not fill {width}x{height} texels",
            bytes.len()
        );

        let extent = wgpu::Extent3d { width, height, depth_or_array_layers: 1 };
        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        ctx.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytes,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * bytes_per_texel),
                rows_per_image: Some(height),
            },
            extent,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Ok(Self { texture, view, size })
    }

    /// Uploads a CPU [`DataTexture`] as `format`.
    pub fn from_data<T: Texel>(
        ctx: RenderCtx<'_>,
        label: &str,
        format: wgpu::TextureFormat,
        data: &DataTexture<T>,
    ) -> Result<Self> {
        let bytes_per_texel = data.channels() * std::mem::size_of::<T>() as u32;
        Self::from_bytes(ctx, label, format, data.size(), bytes_per_texel, data.as_bytes())
    }
}

fn sh_format(sh: &ShTextures) -> (wgpu::TextureFormat, u32) {
    match (sh.precision(), sh.channels()) {
        (ShPrecision::Float32, 2) => (wgpu::TextureFormat::Rg32Float, 8),
        (ShPrecision::Float32, _) => (wgpu::TextureFormat::Rgba32Float, 16),
        (ShPrecision::Uint8, 2) => (wgpu::TextureFormat::Rg8Unorm, 2),
        (ShPrecision::Uint8, _) => (wgpu::TextureFormat::Rgba8Unorm, 4),
    }
}

const SH_PLANE_NAMES: [&str; 3] = ["sh_texture_r", "sh_texture_g", "sh_texture_b"];

/// All textures a program variant binds.
///
/// Bindings the data does not provide (unused SH layout, no scene indexes)
/// are filled with 1x1 placeholders so one bind group layout serves every
/// runtime mode of the variant.
pub struct SplatTextureSet {
    centers_colors: GpuDataTexture,
    scene_indexes: Option<GpuDataTexture>,
    sh: Vec<GpuDataTexture>,
    sh_layout: Option<ShLayout>,
    placeholder_uint: GpuDataTexture,
    placeholder_float: GpuDataTexture,
}

impl SplatTextureSet {
    pub fn upload(
        ctx: RenderCtx<'_>,
        centers_colors: &DataTexture<u32>,
        scene_indexes: Option<&DataTexture<u32>>,
        sh: Option<&ShTextures>,
    ) -> Result<Self> {
        ensure!(centers_colors.channels() == 4, "centers/colors texture must have 4 channels");

        let centers_colors = GpuDataTexture::from_data(
            ctx,
            "splatmesh centers colors",
            wgpu::TextureFormat::Rgba32Uint,
            centers_colors,
        )?;

        let scene_indexes = scene_indexes
            .map(|data| {
                ensure!(data.channels() == 1, "scene index texture must have 1 channel");
                GpuDataTexture::from_data(ctx, "splatmesh scene indexes", wgpu::TextureFormat::R32Uint, data)
            })
            .transpose()?;

        let mut sh_planes = Vec::new();
        if let Some(sh) = sh {
            let (format, bytes_per_texel) = sh_format(sh);
            for plane in 0..sh.plane_count() {
                let Some(bytes) = sh.plane_bytes(plane) else { continue };
                let label = match sh.layout() {
                    ShLayout::SingleTexture => "sh_texture",
                    ShLayout::MultiTexture => SH_PLANE_NAMES[plane],
                };
                sh_planes.push(GpuDataTexture::from_bytes(ctx, label, format, sh.size(), bytes_per_texel, bytes)?);
            }
        }

        let placeholder_uint = GpuDataTexture::from_bytes(
            ctx,
            "splatmesh placeholder uint",
            wgpu::TextureFormat::R32Uint,
            [1, 1],
            4,
            &[0; 4],
        )?;
        let placeholder_float = GpuDataTexture::from_bytes(
            ctx,
            "splatmesh placeholder float",
            wgpu::TextureFormat::Rgba8Unorm,
            [1, 1],
            4,
            &[0; 4],
        )?;

        log::debug!(
            "uploaded splat textures: centers {:?}, scene indexes {}, {} SH plane(s)",
            centers_colors.size,
            scene_indexes.is_some(),
            sh_planes.len()
        );

        Ok(Self {
            centers_colors,
            scene_indexes,
            sh: sh_planes,
            sh_layout: sh.map(ShTextures::layout),
            placeholder_uint,
            placeholder_float,
        })
    }

    fn sh_plane(&self, layout: ShLayout, plane: usize) -> &wgpu::TextureView {
        match self.sh.get(plane) {
            Some(texture) if self.sh_layout == Some(layout) => &texture.view,
            _ => &self.placeholder_float.view,
        }
    }

    /// View bound to the texture uniform `name`.
    pub fn view(&self, name: &str) -> Option<&wgpu::TextureView> {
        let view = match name {
            "centers_colors_texture" => &self.centers_colors.view,
            "scene_indexes_texture" => match &self.scene_indexes {
                Some(texture) => &texture.view,
                None => &self.placeholder_uint.view,
            },
            "sh_texture" => self.sh_plane(ShLayout::SingleTexture, 0),
            "sh_texture_r" => self.sh_plane(ShLayout::MultiTexture, 0),
            "sh_texture_g" => self.sh_plane(ShLayout::MultiTexture, 1),
            "sh_texture_b" => self.sh_plane(ShLayout::MultiTexture, 2),
            _ => return None,
        };
        Some(view)
    }

    /// Writes the `*_texture_size` uniforms the variant declares.
    pub fn apply_sizes(&self, values: &mut UniformValues) -> Result<()> {
        let mut sizes = vec![("centers_colors_texture_size", self.centers_colors.size)];
        if let Some(texture) = &self.scene_indexes {
            sizes.push(("scene_indexes_texture_size", texture.size));
        }
        if let Some(texture) = self.sh.first() {
            sizes.push(("sh_texture_size", texture.size));
        }
        for (name, size) in sizes {
            if values.table().contains(name) {
                values.set(name, UniformValue::UVec2(UVec2::from_array(size)))?;
            }
        }
        Ok(())
    }
}
