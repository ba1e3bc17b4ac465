//! Vertex layout (spec §3): interleaved `{ position, normal, uv, tangent }`.
//! Indices are 32-bit unsigned.

use ember_rhi::{Buffer, VertexAttribute, VertexBinding, VertexFormat, VertexInputDescriptor, VertexInputRate};

#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub tangent: [f32; 3],
}

impl Vertex {
    pub const STRIDE: u32 = std::mem::size_of::<Vertex>() as u32;

    /// The vertex input description every pipeline in this engine shares:
    /// one binding, four attributes at their struct offsets.
    pub fn input_descriptor() -> VertexInputDescriptor {
        VertexInputDescriptor {
            bindings: vec![VertexBinding {
                binding: 0,
                stride: Self::STRIDE,
                input_rate: VertexInputRate::Vertex,
            }],
            attributes: vec![
                VertexAttribute { location: 0, binding: 0, format: VertexFormat::Float32x3, offset: 0 },
                VertexAttribute { location: 1, binding: 0, format: VertexFormat::Float32x3, offset: 12 },
                VertexAttribute { location: 2, binding: 0, format: VertexFormat::Float32x2, offset: 24 },
                VertexAttribute { location: 3, binding: 0, format: VertexFormat::Float32x3, offset: 32 },
            ],
        }
    }
}

/// `{ vertex_buffer, index_buffer, index_count }`, owned by a `Mesh` (spec §3).
pub struct VertexArray {
    pub vertex_buffer: Box<dyn Buffer>,
    pub index_buffer: Box<dyn Buffer>,
    pub index_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stride_matches_four_interleaved_attributes() {
        assert_eq!(Vertex::STRIDE, (3 + 3 + 2 + 3) * 4);
    }
}
