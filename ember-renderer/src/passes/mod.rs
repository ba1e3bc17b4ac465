//! Render pass / framebuffer graph (C7): the four fixed pass factories from
//! spec §4.7 (Geometry, Composition, Skybox, UI), each built directly on
//! `ember_rhi::CommandEncoder::begin_render_pass` over attachment images the
//! pass owns itself. See DESIGN.md's "Render-pass graph" entry for the
//! grounding (`lumelite-renderer`'s gbuffer/light_pass/present module split).

pub mod composition;
pub mod geometry;
pub mod skybox;
pub mod ui;

pub use composition::CompositionPass;
pub use geometry::GeometryPass;
pub use skybox::SkyboxPass;
pub use ui::UiPass;

use crate::error::EngineError;
use ember_rhi::{Device, Texture, TextureDescriptor, TextureDimension, TextureFormat, TextureUsage};

/// Allocate one attachment image per swapchain image, matching spec §4.7's
/// "`add_attachment` ... allocating one image per swapchain image". Keeping
/// `image_count` images (rather than `frames_in_flight`) avoids a pass
/// writing into an attachment that a prior frame's still-in-flight
/// presentation is reading.
pub(crate) fn create_attachment_images(
    device: &dyn Device,
    label: &'static str,
    image_count: u32,
    extent: (u32, u32),
    format: TextureFormat,
    usage: TextureUsage,
) -> Result<Vec<Box<dyn Texture>>, EngineError> {
    (0..image_count.max(1))
        .map(|_| {
            device
                .create_texture(&TextureDescriptor {
                    label: Some(label),
                    size: (extent.0.max(1), extent.1.max(1), 1),
                    format,
                    usage: usage | TextureUsage::RENDER_ATTACHMENT,
                    dimension: TextureDimension::D2,
                    mip_level_count: 1,
                })
                .map_err(EngineError::from)
        })
        .collect()
}

/// Shared extent bookkeeping every owned-attachment pass needs for `resize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassExtent {
    pub width: u32,
    pub height: u32,
}

impl PassExtent {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width: width.max(1), height: height.max(1) }
    }

    pub fn as_tuple(self) -> (u32, u32) {
        (self.width, self.height)
    }
}
