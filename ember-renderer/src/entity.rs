//! Entity (instance): spec §3. `matrix` is always derived, never authoritative;
//! see SPEC_FULL.md §9 Open Question resolution (a).

use crate::math::{Mat4, Quat, Vec3};

pub type EntityId = u64;

#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    pub model_index: usize,
    pub position: Vec3,
    /// Euler angles in radians, applied pitch(X) then yaw(Y) then roll(Z) at
    /// quaternion-compose time, see `compose_matrix`.
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Entity {
    pub fn new(id: EntityId, name: impl Into<String>, model_index: usize, position: Vec3) -> Self {
        Self {
            id,
            name: name.into(),
            model_index,
            position,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn set_rotation(&mut self, rotation: Vec3) {
        self.rotation = rotation;
    }

    /// Add a rotation delta directly to the authoritative Euler vector. There
    /// is no gizmo-matrix-to-rotation decomposition anywhere in this crate
    /// (SPEC_FULL.md §9): deltas are always composed against the stored
    /// Euler angles, never derived by subtracting two absolute rotations.
    pub fn rotate_by(&mut self, delta: Vec3) {
        self.rotation = self.rotation + delta;
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
    }

    /// Test property 9: `translate(pos) * rotate_y(rot.y) * rotate_x(rot.x) *
    /// rotate_z(rot.z) * scale(scale)`, recomputed fresh every call, there is
    /// no cached `matrix` field to go stale or to decompose.
    pub fn compose_matrix(&self) -> Mat4 {
        let r = Quat::from_euler_yxz(self.rotation.x, self.rotation.y, self.rotation.z);
        let t = Mat4::translation(self.position);
        let s = Mat4::scale(self.scale);
        t.mul(&r.to_mat4()).mul(&s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_transform_is_identity_matrix() {
        let e = Entity::new(0, "cube", 0, Vec3::ZERO);
        assert_eq!(e.compose_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn translation_only_matches_translation_matrix() {
        let mut e = Entity::new(0, "cube", 0, Vec3::new(1.0, 2.0, 3.0));
        e.set_scale(Vec3::ONE);
        assert_eq!(e.compose_matrix(), Mat4::translation(Vec3::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn scale_only_matches_scale_matrix() {
        let mut e = Entity::new(0, "cube", 0, Vec3::ZERO);
        e.set_scale(Vec3::new(2.0, 2.0, 2.0));
        assert_eq!(e.compose_matrix(), Mat4::scale(Vec3::new(2.0, 2.0, 2.0)));
    }
}
