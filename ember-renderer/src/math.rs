//! Minimal column-major float math: just enough for camera/entity composition.
//!
//! This is deliberately not a general-purpose math library (explicitly out of
//! scope, spec §1), it exists only to support `Camera` and `Entity`.

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };
    pub const ONE: Vec3 = Vec3 { x: 1.0, y: 1.0, z: 1.0 };
    pub const UP: Vec3 = Vec3 { x: 0.0, y: 1.0, z: 0.0 };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn normalized(self) -> Vec3 {
        let len = self.length();
        if len <= f32::EPSILON {
            self
        } else {
            self * (1.0 / len)
        }
    }
}

impl std::ops::Add for Vec3 {
    type Output = Vec3;
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl std::ops::Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl std::ops::Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl std::ops::Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

/// A unit quaternion, used by `Camera` for orientation (`x, y, z, w`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Default for Quat {
    fn default() -> Self {
        Quat::IDENTITY
    }
}

impl Quat {
    pub const IDENTITY: Quat = Quat { x: 0.0, y: 0.0, z: 0.0, w: 1.0 };

    /// Build from Euler angles (radians), applied in the engine's fixed order:
    /// yaw (Y) then pitch (X) then roll (Z). See `Entity::compose_matrix` for
    /// why this order was chosen and kept consistent everywhere.
    pub fn from_euler_yxz(pitch_x: f32, yaw_y: f32, roll_z: f32) -> Quat {
        let qy = Quat::axis_angle(Vec3::new(0.0, 1.0, 0.0), yaw_y);
        let qx = Quat::axis_angle(Vec3::new(1.0, 0.0, 0.0), pitch_x);
        let qz = Quat::axis_angle(Vec3::new(0.0, 0.0, 1.0), roll_z);
        qy.mul(qx).mul(qz)
    }

    pub fn axis_angle(axis: Vec3, angle_rad: f32) -> Quat {
        let half = angle_rad * 0.5;
        let s = half.sin();
        let axis = axis.normalized();
        Quat { x: axis.x * s, y: axis.y * s, z: axis.z * s, w: half.cos() }
    }

    pub fn mul(self, rhs: Quat) -> Quat {
        Quat {
            w: self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
            x: self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            y: self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            z: self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
        }
    }

    pub fn rotate(self, v: Vec3) -> Vec3 {
        let qv = Vec3::new(self.x, self.y, self.z);
        let uv = qv.cross(v);
        let uuv = qv.cross(uv);
        v + (uv * self.w + uuv) * 2.0
    }

    pub fn to_mat4(self) -> Mat4 {
        let (x, y, z, w) = (self.x, self.y, self.z, self.w);
        let (x2, y2, z2) = (x + x, y + y, z + z);
        let (xx, xy, xz) = (x * x2, x * y2, x * z2);
        let (yy, yz, zz) = (y * y2, y * z2, z * z2);
        let (wx, wy, wz) = (w * x2, w * y2, w * z2);
        // column-major
        Mat4::from_cols([
            [1.0 - (yy + zz), xy + wz, xz - wy, 0.0],
            [xy - wz, 1.0 - (xx + zz), yz + wx, 0.0],
            [xz + wy, yz - wx, 1.0 - (xx + yy), 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }
}

/// Column-major 4x4 matrix, stored as 4 columns of 4 floats (matches the GPU's
/// expected memory layout directly, no transpose needed before upload).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4(pub [[f32; 4]; 4]);

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4([
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]);

    pub const fn from_cols(cols: [[f32; 4]; 4]) -> Mat4 {
        Mat4(cols)
    }

    pub fn translation(t: Vec3) -> Mat4 {
        let mut m = Mat4::IDENTITY;
        m.0[3] = [t.x, t.y, t.z, 1.0];
        m
    }

    pub fn scale(s: Vec3) -> Mat4 {
        Mat4::from_cols([
            [s.x, 0.0, 0.0, 0.0],
            [0.0, s.y, 0.0, 0.0],
            [0.0, 0.0, s.z, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    pub fn mul(&self, rhs: &Mat4) -> Mat4 {
        let a = &self.0;
        let b = &rhs.0;
        let mut out = [[0.0f32; 4]; 4];
        for col in 0..4 {
            for row in 0..4 {
                out[col][row] = (0..4).map(|k| a[k][row] * b[col][k]).sum();
            }
        }
        Mat4(out)
    }

    /// Right-handed look-at view matrix.
    pub fn look_at(eye: Vec3, front: Vec3, up: Vec3) -> Mat4 {
        let f = front.normalized();
        let s = f.cross(up).normalized();
        let u = s.cross(f);
        Mat4::from_cols([
            [s.x, u.x, -f.x, 0.0],
            [s.y, u.y, -f.y, 0.0],
            [s.z, u.z, -f.z, 0.0],
            [-s.dot(eye), -u.dot(eye), f.dot(eye), 1.0],
        ])
    }

    /// Right-handed reversed-Z perspective projection (depth 1.0 at the near
    /// plane, 0.0 at the far plane) with the row-1 flip the spec calls for to
    /// match the backend's clip-space Y convention (§3: "a flip of proj[1][1]").
    pub fn perspective_reversed_z(fov_y_rad: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        let f = 1.0 / (fov_y_rad * 0.5).tan();
        let mut m = Mat4::from_cols([
            [f / aspect, 0.0, 0.0, 0.0],
            [0.0, f, 0.0, 0.0],
            [0.0, 0.0, near / (far - near), -1.0],
            [0.0, 0.0, (near * far) / (far - near), 0.0],
        ]);
        m.0[1][1] *= -1.0;
        m
    }

    pub fn to_bytes(&self) -> [u8; 64] {
        bytemuck::cast(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_times_identity_is_identity() {
        assert_eq!(Mat4::IDENTITY.mul(&Mat4::IDENTITY), Mat4::IDENTITY);
    }

    #[test]
    fn translation_moves_a_point() {
        let m = Mat4::translation(Vec3::new(1.0, 2.0, 3.0));
        // column-major: translation lives in column 3, rows 0..2
        assert_eq!(m.0[3], [1.0, 2.0, 3.0, 1.0]);
    }

    #[test]
    fn identity_quat_is_no_rotation() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        let r = Quat::IDENTITY.rotate(v);
        assert!((r.x - v.x).abs() < 1e-5);
        assert!((r.y - v.y).abs() < 1e-5);
        assert!((r.z - v.z).abs() < 1e-5);
    }

    #[test]
    fn ninety_degree_yaw_rotates_forward_to_right() {
        // yaw +90deg about Y should send -Z (forward) to +X-ish or -X-ish
        // depending on handedness; just assert it's orthogonal to input, not identity.
        let q = Quat::axis_angle(Vec3::UP, std::f32::consts::FRAC_PI_2);
        let v = Vec3::new(0.0, 0.0, -1.0);
        let r = q.rotate(v);
        assert!(r.x.abs() > 0.9);
        assert!(r.z.abs() < 1e-4);
    }

    #[test]
    fn reversed_z_near_maps_to_one_far_maps_to_zero() {
        let proj = Mat4::perspective_reversed_z(std::f32::consts::FRAC_PI_2, 1.0, 0.1, 100.0);
        // clip.z/clip.w at view-space z = -near should equal 1.0 (reversed-Z near plane)
        let near = 0.1f32;
        let clip_z = proj.0[2][2] * (-near) + proj.0[3][2];
        let clip_w = -(-near);
        assert!((clip_z / clip_w - 1.0).abs() < 1e-4);
    }
}
