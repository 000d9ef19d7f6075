use thiserror::Error;

/// Errors raised by simulator lookups and state edits.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("unknown joint `{0}`")]
    UnknownJoint(String),
    #[error("unknown site `{0}`")]
    UnknownSite(String),
    #[error("unknown body `{0}`")]
    UnknownBody(String),
    #[error("unknown mocap body `{0}`")]
    UnknownMocap(String),
    #[error("unknown actuator index {0}")]
    UnknownActuator(usize),
    #[error("unknown geom `{0}`")]
    UnknownGeom(String),
    #[error("`{name}` expects {expected} values, got {got}")]
    ShapeMismatch {
        name: String,
        expected: usize,
        got: usize,
    },
    #[error("state snapshot does not match the model: {0}")]
    StateMismatch(&'static str),
    #[error("invalid model: {0}")]
    InvalidModel(String),
}
