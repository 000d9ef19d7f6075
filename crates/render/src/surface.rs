use crate::error::RenderError;
use crate::frame::Frame;
use sim::{Simulator, Vec3};

/// Offscreen render target with the scene modifiers used for domain
/// randomization.
///
/// Appearance, camera and light edits live on the surface, not in the
/// simulator; [`RenderSurface::read_pixels`] combines them with the body poses
/// the simulator reports at that moment.
pub trait RenderSurface {
    /// Names of every surface whose appearance can be randomized.
    fn surface_names(&self) -> Vec<String>;

    /// # Errors
    /// Returns [`RenderError::UnknownSurface`] for an unknown name.
    fn randomize_surface(&mut self, name: &str, rng: &mut fastrand::Rng) -> Result<(), RenderError>;

    /// # Errors
    /// Returns [`RenderError::UnknownCamera`] for an unknown name.
    fn set_camera_pos(&mut self, name: &str, pos: Vec3) -> Result<(), RenderError>;

    /// # Errors
    /// Returns [`RenderError::UnknownLight`] for an unknown name.
    fn set_light_castshadow(&mut self, name: &str, castshadow: bool) -> Result<(), RenderError>;

    /// # Errors
    /// Returns [`RenderError::UnknownLight`] for an unknown name.
    fn set_light_pos(&mut self, name: &str, pos: Vec3) -> Result<(), RenderError>;

    /// Render from the scene camera with the given index.
    ///
    /// # Errors
    /// Returns [`RenderError::NoSuchFixedCamera`] if the index is out of range.
    fn use_fixed_camera(&mut self, index: usize) -> Result<(), RenderError>;

    /// Render from the orbiting viewer camera.
    fn use_free_camera(&mut self);

    /// Aim the viewer camera; angles are in degrees.
    fn setup_view(&mut self, lookat: Vec3, distance: f32, azimuth: f32, elevation: f32);

    /// Render the current simulator state.
    ///
    /// # Errors
    /// Fails if the selected camera no longer exists.
    fn read_pixels(&self, sim: &dyn Simulator) -> Result<Frame, RenderError>;
}
