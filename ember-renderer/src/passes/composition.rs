//! Composition pass: lighting, reads the G-buffer + scene UBO and writes one
//! color attachment via a fullscreen triangle. Spec §4.7 table, row
//! "Composition".

use super::{create_attachment_images, PassExtent};
use crate::error::EngineError;
use ember_rhi::{
    ClearColor, ColorAttachment, CommandEncoder, Device, LoadOp, RenderPass, RenderPassDescriptor,
    StoreOp, Texture, TextureFormat, TextureUsage,
};

pub const COLOR_FORMAT: TextureFormat = TextureFormat::Rgba8Srgb;

/// CLEAR/STORE, UNDEFINED -> SHADER_READ_ONLY. Output is read by the skybox
/// pass (LOAD) and, in the no-skybox/no-UI case, by the swapchain copy.
pub struct CompositionPass {
    images: Vec<Box<dyn Texture>>,
    extent: PassExtent,
}

impl CompositionPass {
    pub fn new(device: &dyn Device, image_count: u32, extent: (u32, u32)) -> Result<Self, EngineError> {
        let images = create_attachment_images(
            device,
            "composition_color",
            image_count,
            extent,
            COLOR_FORMAT,
            TextureUsage::TEXTURE_BINDING,
        )?;
        Ok(Self { images, extent: PassExtent::new(extent.0, extent.1) })
    }

    pub fn resize(&mut self, device: &dyn Device, image_count: u32, extent: (u32, u32)) -> Result<(), EngineError> {
        self.images = create_attachment_images(
            device,
            "composition_color",
            image_count,
            extent,
            COLOR_FORMAT,
            TextureUsage::TEXTURE_BINDING,
        )?;
        self.extent = PassExtent::new(extent.0, extent.1);
        Ok(())
    }

    pub fn extent(&self) -> (u32, u32) {
        self.extent.as_tuple()
    }

    pub fn color_texture(&self, image_index: usize) -> &dyn Texture {
        self.images[image_index].as_ref()
    }

    pub fn begin(
        &self,
        encoder: &mut dyn CommandEncoder,
        image_index: usize,
    ) -> Result<Box<dyn RenderPass>, EngineError> {
        let desc = RenderPassDescriptor {
            label: Some("composition_pass"),
            color_attachments: vec![ColorAttachment {
                texture: self.images[image_index].as_ref(),
                load_op: LoadOp::Clear,
                store_op: StoreOp::Store,
                clear_value: Some(ClearColor { r: 0.0, g: 0.0, b: 0.0, a: 1.0 }),
                initial_layout: None,
            }],
            depth_stencil_attachment: None,
        };
        encoder.begin_render_pass(desc).map_err(EngineError::from)
    }
}
