//! Draw recorder (C9): bind a mesh's material set, bind its vertex/index
//! buffers, push the model matrix, issue one indexed draw. No batching or
//! sorting, the entity list's order is the draw order (§4.9, stated
//! non-goal). Grounded on `lumelite-renderer/src/gbuffer/mod.rs`'s per-mesh
//! encode loop, with the donor's per-draw uniform buffer replaced by a push
//! constant per this engine's convention (§4.8).

use crate::math::Mat4;
use crate::model::Model;
use ember_rhi::{IndexFormat, RenderPass, ShaderStages};

/// Records one `draw_indexed` per mesh of `model`. `pass` must already have
/// its pipeline bound and set 0 (the per-pass global/camera set) bound by
/// the caller; this function only binds set 1 (material) per mesh.
pub fn render_model(model: &Model, matrix: &Mat4, pass: &mut dyn RenderPass) {
    let bytes = matrix.to_bytes();

    for mesh in &model.meshes {
        pass.bind_descriptor_set(1, mesh.material_descriptor_set.as_ref(), &[]);
        pass.set_vertex_buffer(0, mesh.vertex_array.vertex_buffer.as_ref(), 0);
        pass.set_index_buffer(mesh.vertex_array.index_buffer.as_ref(), 0, IndexFormat::Uint32);
        pass.push_constants(ShaderStages::VERTEX, 0, &bytes);
        pass.draw_indexed(mesh.vertex_array.index_count, 1, 0, 0, 0);
    }
}
