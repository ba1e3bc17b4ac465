//! Scene uniform: spec §3 "Scene uniform". Written once per frame, consumed
//! by the composition pass.

use crate::math::Vec3;

/// std140-ish layout: vec3 fields are padded to 16 bytes so the struct can be
/// `bytemuck::Pod`-cast straight into the composition pass's uniform buffer
/// without a manual packer. `_pad*` fields exist only for that alignment.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniform {
    pub ambient: f32,
    pub specular_strength: f32,
    pub specular_shininess: f32,
    pub _padding: f32,
    pub camera_pos: [f32; 3],
    pub _pad_camera: f32,
    pub sun_dir: [f32; 3],
    pub _pad_sun_dir: f32,
    pub sun_pos: [f32; 3],
    pub _pad_sun_pos: f32,
}

impl SceneUniform {
    pub fn new(
        ambient: f32,
        specular_strength: f32,
        specular_shininess: f32,
        camera_pos: Vec3,
        sun_dir: Vec3,
        sun_pos: Vec3,
    ) -> Self {
        Self {
            ambient,
            specular_strength,
            specular_shininess,
            _padding: 0.0,
            camera_pos: [camera_pos.x, camera_pos.y, camera_pos.z],
            _pad_camera: 0.0,
            sun_dir: [sun_dir.x, sun_dir.y, sun_dir.z],
            _pad_sun_dir: 0.0,
            sun_pos: [sun_pos.x, sun_pos.y, sun_pos.z],
            _pad_sun_pos: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_is_a_multiple_of_16_bytes() {
        // std140 uniform blocks must round to a 16-byte stride.
        assert_eq!(std::mem::size_of::<SceneUniform>() % 16, 0);
    }
}
