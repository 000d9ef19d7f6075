use render::RenderError;
use sim::SimError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnvError {
    #[error(transparent)]
    Sim(#[from] SimError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("action must have {expected} elements, got {got}")]
    ActionShape { expected: usize, got: usize },

    #[error("reward batch mismatch: {achieved} achieved goals, {desired} desired goals")]
    BatchMismatch { achieved: usize, desired: usize },

    #[error("invalid task configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to parse task configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("scene must be initialized before it can be reset")]
    Uninitialized,
}
