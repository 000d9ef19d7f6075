use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("unknown surface `{0}`")]
    UnknownSurface(String),

    #[error("unknown camera `{0}`")]
    UnknownCamera(String),

    #[error("unknown light `{0}`")]
    UnknownLight(String),

    #[error("fixed camera {index} out of range ({count} cameras)")]
    NoSuchFixedCamera { index: usize, count: usize },

    #[error("frame size {width}x{height} is empty")]
    EmptyFrame { width: u32, height: u32 },

    #[error("frame size {width}x{height} exceeds {max} pixels")]
    FrameTooLarge { width: u32, height: u32, max: u64 },

    #[error("failed to write image: {0}")]
    Image(#[from] image::ImageError),
}
