//! Geometry pass: fills the G-buffer (position/normal/albedo/specular/depth).
//! Spec §4.7 table, row "Geometry".

use super::{create_attachment_images, PassExtent};
use crate::error::EngineError;
use ember_rhi::{
    ClearColor, ColorAttachment, CommandEncoder, DepthStencilAttachment, Device, LoadOp,
    RenderPass, RenderPassDescriptor, StoreOp, Texture, TextureFormat, TextureUsage,
};

/// Attachment formats in the fixed order the spec table lists them: position,
/// normal, albedo, specular, depth. `R8Unorm` stands in for the spec's "spec
/// R8 sRGB", `ember_rhi::TextureFormat` has no non-linear single-channel
/// format and sRGB decoding is meaningless for a scalar specular factor.
pub const POSITION_FORMAT: TextureFormat = TextureFormat::Rgba32Float;
pub const NORMAL_FORMAT: TextureFormat = TextureFormat::Rgba16Float;
pub const ALBEDO_FORMAT: TextureFormat = TextureFormat::Rgba8Srgb;
pub const SPECULAR_FORMAT: TextureFormat = TextureFormat::R8Unorm;
pub const DEPTH_FORMAT: TextureFormat = TextureFormat::D32Float;

struct GBufferImages {
    position: Box<dyn Texture>,
    normal: Box<dyn Texture>,
    albedo: Box<dyn Texture>,
    specular: Box<dyn Texture>,
    depth: Box<dyn Texture>,
}

/// Writes the G-buffer. Attachments are CLEAR/STORE, UNDEFINED ->
/// SHADER_READ_ONLY (depth -> DEPTH_READ_ONLY), one set of images per
/// swapchain image (spec §4.7).
pub struct GeometryPass {
    images: Vec<GBufferImages>,
    extent: PassExtent,
}

impl GeometryPass {
    pub fn new(device: &dyn Device, image_count: u32, extent: (u32, u32)) -> Result<Self, EngineError> {
        let images = Self::build_images(device, image_count, extent)?;
        Ok(Self { images, extent: PassExtent::new(extent.0, extent.1) })
    }

    fn build_images(
        device: &dyn Device,
        image_count: u32,
        extent: (u32, u32),
    ) -> Result<Vec<GBufferImages>, EngineError> {
        let usage = TextureUsage::TEXTURE_BINDING;
        let position = create_attachment_images(device, "gbuffer_position", image_count, extent, POSITION_FORMAT, usage)?;
        let normal = create_attachment_images(device, "gbuffer_normal", image_count, extent, NORMAL_FORMAT, usage)?;
        let albedo = create_attachment_images(device, "gbuffer_albedo", image_count, extent, ALBEDO_FORMAT, usage)?;
        let specular = create_attachment_images(device, "gbuffer_specular", image_count, extent, SPECULAR_FORMAT, usage)?;
        let depth = create_attachment_images(device, "gbuffer_depth", image_count, extent, DEPTH_FORMAT, usage)?;
        Ok(position
            .into_iter()
            .zip(normal)
            .zip(albedo)
            .zip(specular)
            .zip(depth)
            .map(|((((position, normal), albedo), specular), depth)| GBufferImages {
                position,
                normal,
                albedo,
                specular,
                depth,
            })
            .collect())
    }

    /// `resize(extent)`: destroy and recreate attachment images at the new
    /// size, preserving usage/format (spec §4.7).
    pub fn resize(&mut self, device: &dyn Device, image_count: u32, extent: (u32, u32)) -> Result<(), EngineError> {
        self.images = Self::build_images(device, image_count, extent)?;
        self.extent = PassExtent::new(extent.0, extent.1);
        Ok(())
    }

    pub fn extent(&self) -> (u32, u32) {
        self.extent.as_tuple()
    }

    pub fn albedo_texture(&self, image_index: usize) -> &dyn Texture {
        self.images[image_index].albedo.as_ref()
    }

    pub fn position_texture(&self, image_index: usize) -> &dyn Texture {
        self.images[image_index].position.as_ref()
    }

    pub fn normal_texture(&self, image_index: usize) -> &dyn Texture {
        self.images[image_index].normal.as_ref()
    }

    pub fn specular_texture(&self, image_index: usize) -> &dyn Texture {
        self.images[image_index].specular.as_ref()
    }

    pub fn depth_texture(&self, image_index: usize) -> &dyn Texture {
        self.images[image_index].depth.as_ref()
    }

    /// `begin(cmd, clear_color, clear_depth)`: dynamic viewport/scissor are
    /// set by the caller (`Engine` owns that, since it is identical across
    /// every pass); clear depth is `0.0` (reversed-Z, spec §4.7).
    pub fn begin(
        &self,
        encoder: &mut dyn CommandEncoder,
        image_index: usize,
    ) -> Result<Box<dyn RenderPass>, EngineError> {
        let images = &self.images[image_index];
        let desc = RenderPassDescriptor {
            label: Some("geometry_pass"),
            color_attachments: vec![
                color_attachment(images.position.as_ref()),
                color_attachment(images.normal.as_ref()),
                color_attachment(images.albedo.as_ref()),
                color_attachment(images.specular.as_ref()),
            ],
            depth_stencil_attachment: Some(DepthStencilAttachment {
                texture: images.depth.as_ref(),
                depth_load_op: LoadOp::Clear,
                depth_store_op: StoreOp::Store,
                stencil_load_op: LoadOp::Clear,
                stencil_store_op: StoreOp::DontCare,
                clear_depth: 0.0,
            }),
        };
        encoder.begin_render_pass(desc).map_err(EngineError::from)
    }
}

fn color_attachment(texture: &dyn Texture) -> ColorAttachment<'_> {
    ColorAttachment {
        texture,
        load_op: LoadOp::Clear,
        store_op: StoreOp::Store,
        clear_value: Some(ClearColor { r: 0.0, g: 0.0, b: 0.0, a: 0.0 }),
        initial_layout: None,
    }
}
