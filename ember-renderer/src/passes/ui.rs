//! UI pass: swapchain color, CLEAR/STORE, UNDEFINED -> PRESENT_SRC. Spec
//! §4.7 table, row "UI", `is_ui=true`: framebuffers reference the swapchain
//! image view directly instead of an owned attachment image, so this pass
//! owns nothing and its "resize" is simply tracking the current extent for
//! property 8 (swapchain rebuild invariance).

use crate::error::EngineError;
use ember_rhi::{
    ClearColor, ColorAttachment, CommandEncoder, LoadOp, RenderPass, RenderPassDescriptor,
    StoreOp, Texture,
};

pub struct UiPass {
    width: u32,
    height: u32,
}

impl UiPass {
    pub fn new(extent: (u32, u32)) -> Self {
        Self { width: extent.0.max(1), height: extent.1.max(1) }
    }

    /// Called whenever the swapchain is rebuilt (spec §4.5: "framebuffers of
    /// all UI-attached passes are rebuilt at the new surface extent").
    /// Nothing is actually reallocated since this pass owns no images.
    pub fn resize(&mut self, extent: (u32, u32)) {
        self.width = extent.0.max(1);
        self.height = extent.1.max(1);
    }

    pub fn extent(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn begin(
        &self,
        encoder: &mut dyn CommandEncoder,
        swapchain_image: &dyn Texture,
    ) -> Result<Box<dyn RenderPass>, EngineError> {
        let desc = RenderPassDescriptor {
            label: Some("ui_pass"),
            color_attachments: vec![ColorAttachment {
                texture: swapchain_image,
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
