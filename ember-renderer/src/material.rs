//! Texture loading, fallback substitution, and the material descriptor set
//! layout (C10 half of §4.10: "Materials: for each of `{albedo, normal,
//! specular}` ... substitute the fallback ... and warn").

use crate::error::EngineError;
use ember_rhi::{
    BufferDescriptor, BufferMemoryPreference, BufferUsage, DescriptorSetLayout,
    DescriptorSetLayoutBinding, DescriptorType, Device, FilterMode, ImageLayout, SamplerDescriptor,
    ShaderStages, Texture, TextureDescriptor, TextureDimension, TextureFormat, TextureUsage,
};
use std::path::Path;

/// Which of the three combined-image-sampler slots a texture fills. Drives
/// both the GPU format (color data is sRGB, data maps are linear) and the
/// fallback pixel value (§4.10: "albedo=white, normal={128,128,255,255},
/// specular=black").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureKind {
    Albedo,
    Normal,
    Specular,
}

impl TextureKind {
    fn format(self) -> TextureFormat {
        match self {
            TextureKind::Albedo => TextureFormat::Rgba8Srgb,
            TextureKind::Normal | TextureKind::Specular => TextureFormat::Rgba8Unorm,
        }
    }

    fn fallback_pixel(self) -> [u8; 4] {
        match self {
            TextureKind::Albedo => [255, 255, 255, 255],
            TextureKind::Normal => [128, 128, 255, 255],
            TextureKind::Specular => [0, 0, 0, 255],
        }
    }
}

/// `{ 0: albedo, 1: normal, 2: specular }`, all `CombinedImageSampler`,
/// fragment-stage only (§4.10's descriptor-set layout for a mesh's material).
/// Exposed separately from [`material_descriptor_set_layout`] because
/// `GraphicsPipelineDescriptor::set_layouts` wants the raw binding list, not
/// a constructed `DescriptorSetLayout` handle.
pub fn material_set_bindings() -> [DescriptorSetLayoutBinding; 3] {
    [0u32, 1, 2].map(|binding| DescriptorSetLayoutBinding {
        binding,
        descriptor_type: DescriptorType::CombinedImageSampler,
        count: 1,
        stages: ShaderStages::FRAGMENT,
    })
}

pub fn material_descriptor_set_layout(
    device: &dyn Device,
) -> Result<Box<dyn DescriptorSetLayout>, EngineError> {
    device
        .create_descriptor_set_layout(&material_set_bindings())
        .map_err(EngineError::from)
}

/// Samples every material texture in this engine: linear filtering, repeat
/// addressing, anisotropy requested at the device's reported maximum (the
/// backend clamps and warns per §4.3).
pub fn create_material_sampler(device: &dyn Device) -> Result<Box<dyn ember_rhi::Sampler>, EngineError> {
    device
        .create_sampler(&SamplerDescriptor {
            label: Some("material_sampler"),
            mag_filter: FilterMode::Linear,
            min_filter: FilterMode::Linear,
            anisotropy_clamp: Some(16.0),
            ..Default::default()
        })
        .map_err(EngineError::from)
}

/// Loads the texture at `path` (if given) and decodes it to RGBA8; on a
/// missing path or a decode failure, logs and substitutes the fallback
/// texel for `kind` (§4.10, `TextureLoadFailed` is recoverable).
pub fn load_or_fallback(
    device: &dyn Device,
    path: Option<&Path>,
    kind: TextureKind,
) -> Result<Box<dyn Texture>, EngineError> {
    let decoded = path.and_then(|p| match image::open(p) {
        Ok(img) => {
            let rgba = img.to_rgba8();
            let (w, h) = rgba.dimensions();
            Some((rgba.into_raw(), w, h))
        }
        Err(e) => {
            log::warn!("texture load failed for {}: {e}, using fallback", p.display());
            None
        }
    });

    match decoded {
        Some((pixels, width, height)) => upload_rgba(device, &pixels, width, height, kind.format()),
        None => {
            let pixel = kind.fallback_pixel();
            upload_rgba(device, &pixel, 1, 1, kind.format())
        }
    }
}

fn mip_level_count(width: u32, height: u32) -> u32 {
    (32 - width.max(height).max(1).leading_zeros()).max(1)
}

/// `create_texture(pixels, w, h, format)` (§4.3): allocates the image with
/// `⌊log₂ max(w,h)⌋ + 1` mip levels, uploads the base level via a staging
/// buffer, then generates the remaining levels with successive linear
/// blits. Finishes every level in `ShaderReadOnly`.
fn upload_rgba(
    device: &dyn Device,
    pixels: &[u8],
    width: u32,
    height: u32,
    format: TextureFormat,
) -> Result<Box<dyn Texture>, EngineError> {
    let mip_levels = mip_level_count(width, height);
    let texture = device
        .create_texture(&TextureDescriptor {
            label: Some("material_texture"),
            size: (width, height, 1),
            format,
            usage: TextureUsage::TEXTURE_BINDING | TextureUsage::COPY_DST | TextureUsage::COPY_SRC,
            dimension: TextureDimension::D2,
            mip_level_count: mip_levels,
        })
        .map_err(EngineError::from)?;

    let staging = device
        .create_buffer(&BufferDescriptor {
            label: Some("texture_staging"),
            size: pixels.len() as u64,
            usage: BufferUsage::CopySrc,
            memory: BufferMemoryPreference::HostVisible,
        })
        .map_err(EngineError::from)?;
    device.write_buffer(staging.as_ref(), 0, pixels).map_err(EngineError::from)?;

    let mut encoder = device.create_command_encoder().map_err(EngineError::from)?;
    encoder.pipeline_barrier_texture_mip(texture.as_ref(), 0, ImageLayout::Undefined, ImageLayout::TransferDst);
    encoder.copy_buffer_to_texture(staging.as_ref(), 0, texture.as_ref(), 0, (0, 0, 0), (width, height, 1));
    generate_mips(encoder.as_mut(), texture.as_ref(), width, height, mip_levels);

    let command_buffer = encoder.finish().map_err(EngineError::from)?;
    let queue = device.queue().map_err(EngineError::from)?;
    let fence = device.create_fence(false).map_err(EngineError::from)?;
    queue
        .submit(&[command_buffer.as_ref()], &[], &[], Some(fence.as_ref()))
        .map_err(EngineError::from)?;
    fence.wait(u64::MAX).map_err(EngineError::from)?;

    Ok(texture)
}

/// Walks the mip chain one level at a time: the freshly-written level
/// becomes the blit source for the next, then is finalized to
/// `ShaderReadOnly` once nothing reads it as a source anymore.
fn generate_mips(
    encoder: &mut dyn ember_rhi::CommandEncoder,
    texture: &dyn Texture,
    width: u32,
    height: u32,
    mip_levels: u32,
) {
    if mip_levels <= 1 {
        encoder.pipeline_barrier_texture_mip(texture, 0, ImageLayout::TransferDst, ImageLayout::ShaderReadOnly);
        return;
    }

    let (mut src_w, mut src_h) = (width.max(1), height.max(1));
    for level in 1..mip_levels {
        let dst_w = (src_w / 2).max(1);
        let dst_h = (src_h / 2).max(1);

        encoder.pipeline_barrier_texture_mip(texture, level - 1, ImageLayout::TransferDst, ImageLayout::TransferSrc);
        encoder.pipeline_barrier_texture_mip(texture, level, ImageLayout::Undefined, ImageLayout::TransferDst);
        encoder.blit_texture_mip(texture, level - 1, level, (src_w, src_h), (dst_w, dst_h));
        encoder.pipeline_barrier_texture_mip(texture, level - 1, ImageLayout::TransferSrc, ImageLayout::ShaderReadOnly);

        src_w = dst_w;
        src_h = dst_h;
    }
    encoder.pipeline_barrier_texture_mip(texture, mip_levels - 1, ImageLayout::TransferDst, ImageLayout::ShaderReadOnly);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mip_level_count_matches_floor_log2_plus_one() {
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(512, 256), 10);
        assert_eq!(mip_level_count(1024, 1024), 11);
        assert_eq!(mip_level_count(3, 5), 3);
    }

    #[test]
    fn fallback_pixels_match_spec_values() {
        assert_eq!(TextureKind::Albedo.fallback_pixel(), [255, 255, 255, 255]);
        assert_eq!(TextureKind::Normal.fallback_pixel(), [128, 128, 255, 255]);
        assert_eq!(TextureKind::Specular.fallback_pixel(), [0, 0, 0, 255]);
    }
}
