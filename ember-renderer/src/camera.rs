//! Camera: spec §3 "Camera" data model.

use crate::math::{Mat4, Quat, Vec3};

#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub position: Vec3,
    pub orientation: Quat,
    pub roll: f32,
    pub fov_y_rad: f32,
    pub near: f32,
    pub far: f32,
    pub width: u32,
    pub height: u32,
    view: Mat4,
    proj: Mat4,
}

impl Camera {
    pub fn new(position: Vec3, fov_y_rad: f32, width: u32, height: u32) -> Self {
        let mut camera = Self {
            position,
            orientation: Quat::IDENTITY,
            roll: 0.0,
            fov_y_rad,
            near: 0.1,
            far: 1000.0,
            width,
            height,
            view: Mat4::IDENTITY,
            proj: Mat4::IDENTITY,
        };
        camera.update_view();
        camera.update_projection(width, height);
        camera
    }

    /// Forward/right/up are derived from `orientation`, never stored
    /// independently (spec §3: "front/right/up (derived)").
    pub fn front(&self) -> Vec3 {
        self.orientation.rotate(Vec3::new(0.0, 0.0, -1.0))
    }

    pub fn right(&self) -> Vec3 {
        self.orientation.rotate(Vec3::new(1.0, 0.0, 0.0))
    }

    pub fn up(&self) -> Vec3 {
        self.orientation.rotate(Vec3::UP)
    }

    /// `engine_update_camera_view`, recompute the view matrix from the
    /// current position/orientation.
    pub fn update_view(&mut self) {
        self.view = Mat4::look_at(self.position, self.front(), self.up());
    }

    /// `engine_update_camera_projection(w, h)`, recompute the reversed-Z
    /// projection for a new aspect ratio (e.g. after a swapchain resize).
    pub fn update_projection(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
        let aspect = self.width as f32 / self.height as f32;
        self.proj = Mat4::perspective_reversed_z(self.fov_y_rad, aspect, self.near, self.far);
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    pub fn proj(&self) -> Mat4 {
        self.proj
    }

    pub fn view_proj(&self) -> Mat4 {
        self.proj.mul(&self.view)
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.update_view();
    }

    pub fn set_orientation(&mut self, orientation: Quat) {
        self.orientation = orientation;
        self.update_view();
    }
}
