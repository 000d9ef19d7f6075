//! Captured RGB frames.

use crate::error::RenderError;
use image::{ImageFormat, Rgb, RgbImage};
use std::path::Path;

/// A rendered RGB image, row-major with the origin at the top-left.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    image: RgbImage,
}

impl Frame {
    pub(crate) fn new(width: u32, height: u32, background: [u8; 3]) -> Self {
        Self {
            image: RgbImage::from_pixel(width, height, Rgb(background)),
        }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Packed RGB bytes, `width * height * 3` long.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// # Panics
    /// Panics if the coordinates are outside the frame.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        self.image.get_pixel(x, y).0
    }

    pub(crate) fn put(&mut self, x: u32, y: u32, rgb: [u8; 3]) {
        self.image.put_pixel(x, y, Rgb(rgb));
    }

    /// Write the frame as a PNG file.
    ///
    /// # Errors
    /// Returns [`RenderError::Image`] if encoding or writing fails.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), RenderError> {
        self.image.save_with_format(path, ImageFormat::Png)?;
        Ok(())
    }
}
