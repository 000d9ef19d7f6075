//! The simulator contract consumed by tasks, helpers and renderers.
//!
//! Every accessor returns owned values; nothing hands out references into
//! live simulator buffers, so callers can do arithmetic on the result without
//! aliasing the state that the next step mutates.

use crate::error::SimError;
use crate::types::{Mat3, Quat, Vec3};

/// Actuator description as seen by control helpers.
#[derive(Clone, Debug, PartialEq)]
pub struct ActuatorInfo {
    pub name: String,
    /// Joint driven by this actuator.
    pub joint: String,
    /// Relative actuators interpret control as an offset from the current
    /// joint position rather than an absolute target.
    pub relative: bool,
}

/// A weld constraint pinning a body to a mocap body.
#[derive(Clone, Debug, PartialEq)]
pub struct WeldInfo {
    pub mocap: String,
    pub body: String,
}

/// Renderable primitive in world coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct GeomInfo {
    pub name: String,
    pub pos: Vec3,
    pub radius: f32,
    pub rgba: [f32; 4],
}

/// A named point of view or light source declared by the scene.
#[derive(Clone, Debug, PartialEq)]
pub struct Fixture {
    pub name: String,
    pub pos: Vec3,
}

/// Full snapshot of the mutable simulation state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimState {
    pub time: f32,
    pub qpos: Vec<f32>,
    pub qvel: Vec<f32>,
    pub ctrl: Vec<f32>,
    pub mocap_pos: Vec<Vec3>,
    pub mocap_quat: Vec<Quat>,
    pub weld_offsets: Vec<Vec3>,
    /// Grasped free body and its offset from the grip site, if any.
    pub grasp: Option<(usize, Vec3)>,
    pub prev_aperture: f32,
}

/// Named-access interface to a rigid-body simulator.
pub trait Simulator {
    /// Duration of one physics tick in seconds.
    fn timestep(&self) -> f32;

    /// Advances physics by one tick.
    fn step(&mut self);

    /// Re-derives poses, site frames and velocities after manual edits.
    fn forward(&mut self);

    fn get_state(&self) -> SimState;

    /// # Errors
    /// Returns [`SimError::StateMismatch`] if the snapshot was taken from a
    /// differently shaped model.
    fn set_state(&mut self, state: &SimState) -> Result<(), SimError>;

    /// Joint names in model order.
    fn joint_names(&self) -> Vec<String>;

    /// # Errors
    /// Returns [`SimError::UnknownJoint`] for an unknown name.
    fn joint_qpos(&self, name: &str) -> Result<Vec<f32>, SimError>;

    /// # Errors
    /// Unknown names and wrong lengths are rejected.
    fn set_joint_qpos(&mut self, name: &str, value: &[f32]) -> Result<(), SimError>;

    /// # Errors
    /// Returns [`SimError::UnknownJoint`] for an unknown name.
    fn joint_qvel(&self, name: &str) -> Result<Vec<f32>, SimError>;

    /// # Errors
    /// Unknown names and wrong lengths are rejected.
    fn set_joint_qvel(&mut self, name: &str, value: &[f32]) -> Result<(), SimError>;

    /// Site names in model order.
    fn site_names(&self) -> Vec<String>;

    /// World position of a site.
    ///
    /// # Errors
    /// Returns [`SimError::UnknownSite`] for an unknown name.
    fn site_xpos(&self, name: &str) -> Result<Vec3, SimError>;

    /// World rotation matrix of a site.
    ///
    /// # Errors
    /// Returns [`SimError::UnknownSite`] for an unknown name.
    fn site_xmat(&self, name: &str) -> Result<Mat3, SimError>;

    /// Linear velocity of a site in world coordinates.
    ///
    /// # Errors
    /// Returns [`SimError::UnknownSite`] for an unknown name.
    fn site_xvelp(&self, name: &str) -> Result<Vec3, SimError>;

    /// Angular velocity of a site in world coordinates.
    ///
    /// # Errors
    /// Returns [`SimError::UnknownSite`] for an unknown name.
    fn site_xvelr(&self, name: &str) -> Result<Vec3, SimError>;

    /// Site position relative to its parent body (a model parameter).
    ///
    /// # Errors
    /// Returns [`SimError::UnknownSite`] for an unknown name.
    fn site_pos(&self, name: &str) -> Result<Vec3, SimError>;

    /// # Errors
    /// Returns [`SimError::UnknownSite`] for an unknown name.
    fn set_site_pos(&mut self, name: &str, pos: Vec3) -> Result<(), SimError>;

    /// # Errors
    /// Returns [`SimError::UnknownBody`] for an unknown name.
    fn body_xpos(&self, name: &str) -> Result<Vec3, SimError>;

    /// # Errors
    /// Returns [`SimError::UnknownBody`] for an unknown name.
    fn body_xquat(&self, name: &str) -> Result<Quat, SimError>;

    /// Mocap body names in model order.
    fn mocap_names(&self) -> Vec<String>;

    /// # Errors
    /// Returns [`SimError::UnknownMocap`] for an unknown name.
    fn mocap_pos(&self, name: &str) -> Result<Vec3, SimError>;

    /// # Errors
    /// Returns [`SimError::UnknownMocap`] for an unknown name.
    fn mocap_quat(&self, name: &str) -> Result<Quat, SimError>;

    /// # Errors
    /// Returns [`SimError::UnknownMocap`] for an unknown name.
    fn set_mocap_pos(&mut self, name: &str, pos: Vec3) -> Result<(), SimError>;

    /// Sets the mocap orientation; the simulator normalizes it.
    ///
    /// # Errors
    /// Returns [`SimError::UnknownMocap`] for an unknown name.
    fn set_mocap_quat(&mut self, name: &str, quat: Quat) -> Result<(), SimError>;

    fn welds(&self) -> Vec<WeldInfo>;

    /// Zeroes the relative pose held by every weld constraint.
    fn reset_welds(&mut self);

    fn actuators(&self) -> Vec<ActuatorInfo>;

    /// # Errors
    /// Returns [`SimError::UnknownActuator`] for an out-of-range index.
    fn set_ctrl(&mut self, index: usize, value: f32) -> Result<(), SimError>;

    /// Renderable geoms at their current world positions.
    fn geoms(&self) -> Vec<GeomInfo>;

    /// Sites that carry a visual marker, at their current world positions.
    fn visible_sites(&self) -> Vec<GeomInfo>;

    fn cameras(&self) -> Vec<Fixture>;

    fn lights(&self) -> Vec<Fixture>;
}
