//! Look-at camera used by the headless surface
//!
//! Cameras are either placed at a scene fixture and aimed at a fixed point,
//! or orbit a look-at point given distance, azimuth and elevation the way an
//! interactive viewer does.

use glam::{Mat4, Vec3};

/// Pinhole camera in a z-up world
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    /// Camera position
    pub eye: Vec3,
    /// Point the camera looks at
    pub target: Vec3,
    /// Up vector
    pub up: Vec3,
    /// Render target aspect ratio
    pub aspect: f32,
    /// Field of view in radians
    pub fovy: f32,
    /// Near clipping plane distance
    pub znear: f32,
    /// Far clipping plane distance
    pub zfar: f32,
}

impl Camera {
    /// Create a camera at `eye` looking at `target`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn looking_at(eye: Vec3, target: Vec3, width: u32, height: u32) -> Self {
        Self {
            eye,
            target,
            up: Vec3::Z,
            aspect: width as f32 / height.max(1) as f32,
            fovy: 45.0f32.to_radians(),
            znear: 0.01,
            zfar: 50.0,
        }
    }

    /// Place the camera on a sphere around `lookat`.
    ///
    /// Azimuth is measured in degrees around +z from +x, elevation in degrees
    /// above the horizontal plane; negative elevation looks down.
    pub fn orbit(&mut self, lookat: Vec3, distance: f32, azimuth: f32, elevation: f32) {
        let (az, el) = (azimuth.to_radians(), elevation.to_radians());
        let forward = Vec3::new(el.cos() * az.cos(), el.cos() * az.sin(), el.sin());
        self.target = lookat;
        self.eye = lookat - forward * distance;
    }

    /// Unit vector from the eye toward the target.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        (self.target - self.eye).normalize_or_zero()
    }

    /// Unit vector pointing to the right of the image.
    #[must_use]
    pub fn right(&self) -> Vec3 {
        self.forward().cross(self.up).normalize_or_zero()
    }

    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    /// Computes a view projection matrix from the camera parameters
    #[must_use]
    pub fn build_view_projection_matrix(&self) -> Mat4 {
        let proj = Mat4::perspective_rh(self.fovy, self.aspect, self.znear, self.zfar);
        proj * self.view_matrix()
    }
}

/// Which point of view `read_pixels` renders from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraMode {
    /// The orbiting viewer camera.
    Free,
    /// A camera fixture declared by the scene, by index.
    Fixed(usize),
}
