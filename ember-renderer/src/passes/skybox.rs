//! Skybox pass: blends an environment mesh over the already-composed image.
//! Spec §4.7 table, row "Skybox", LOAD/STORE, SHADER_READ_ONLY ->
//! SHADER_READ_ONLY, no images owned by this pass (it writes back into the
//! composition pass's output).

use crate::error::EngineError;
use ember_rhi::{
    ColorAttachment, CommandEncoder, ImageLayout, LoadOp, RenderPass, RenderPassDescriptor,
    StoreOp, Texture,
};

pub struct SkyboxPass;

impl SkyboxPass {
    pub fn new() -> Self {
        Self
    }

    /// `target` is the composition pass's output image for this swapchain
    /// index, known to already be in `ShaderReadOnly` (the composition pass's
    /// final layout). LOAD preserves it; the pass only blends the
    /// environment mesh on top.
    pub fn begin(
        &self,
        encoder: &mut dyn CommandEncoder,
        target: &dyn Texture,
    ) -> Result<Box<dyn RenderPass>, EngineError> {
        let desc = RenderPassDescriptor {
            label: Some("skybox_pass"),
            color_attachments: vec![ColorAttachment {
                texture: target,
                load_op: LoadOp::Load,
                store_op: StoreOp::Store,
                clear_value: None,
                initial_layout: Some(ImageLayout::ShaderReadOnly),
            }],
            depth_stencil_attachment: None,
        };
        encoder.begin_render_pass(desc).map_err(EngineError::from)
    }
}

impl Default for SkyboxPass {
    fn default() -> Self {
        Self::new()
    }
}
