#![deny(clippy::all, clippy::pedantic)]
//! # Offscreen Rendering
//!
//! The [`RenderSurface`] trait is what the task layer needs from a renderer:
//! per-surface appearance randomization, movable cameras and lights, and
//! pixel read-back of the current simulator state. [`HeadlessSurface`] is a
//! CPU implementation producing [`Frame`]s that can be saved as PNG.

pub mod camera;
pub mod error;
pub mod frame;
pub mod headless;
pub mod surface;
pub mod texture;

pub use camera::{Camera, CameraMode};
pub use error::RenderError;
pub use frame::Frame;
pub use headless::{HeadlessSurface, Light, MAX_PIXELS};
pub use surface::RenderSurface;
pub use texture::Texture;
