use crate::config::{JointInit, TaskConfig};
use crate::driver::StepInfo;
use crate::error::EnvError;
use crate::observation::Observation;
use render::Frame;
use sim::Vec3;

/// Lifecycle hooks a goal-conditioned task exposes to [`GoalEnv`](crate::GoalEnv).
///
/// The driver calls `initialize_scene` once, then per episode `reset_scene`
/// until it reports success followed by `sample_goal`, and per step
/// `apply_action`, `step_simulation`, `apply_step_side_effects`,
/// `build_observation`, `check_success` and `compute_reward`.
pub trait GoalTask {
    fn config(&self) -> &TaskConfig;

    /// Apply the initial joint positions and settle the scene.
    ///
    /// # Errors
    /// Fails on unknown joints or malformed positions.
    fn initialize_scene(&mut self, initial_qpos: &[JointInit]) -> Result<(), EnvError>;

    /// Restore the initial scene and re-randomize it. Returns whether the
    /// new scene is usable.
    ///
    /// # Errors
    /// Fails if the scene was never initialized or a simulator edit fails.
    fn reset_scene(&mut self, rng: &mut fastrand::Rng) -> Result<bool, EnvError>;

    /// Draw a fresh goal.
    fn sample_goal(&mut self, rng: &mut fastrand::Rng) -> Vec3;

    fn goal(&self) -> Vec3;

    fn set_goal(&mut self, goal: Vec3);

    /// # Errors
    /// Fails if the simulator rejects the resulting command.
    fn apply_action(&mut self, action: [f32; 4]) -> Result<(), EnvError>;

    /// Advance physics by one environment step.
    fn step_simulation(&mut self);

    /// # Errors
    /// Fails if a simulator edit fails.
    fn apply_step_side_effects(&mut self) -> Result<(), EnvError>;

    /// # Errors
    /// Fails on simulator lookups of unknown names.
    fn build_observation(&self) -> Result<Observation, EnvError>;

    fn check_success(&self, achieved: Vec3, desired: Vec3) -> f32;

    fn compute_reward(&self, achieved: Vec3, desired: Vec3, info: &StepInfo) -> f32;

    /// Move the goal marker to the current goal.
    ///
    /// # Errors
    /// Fails if the scene has no goal marker.
    fn render_goal_marker(&mut self) -> Result<(), EnvError>;

    /// Pixels from the fixed camera, or `None` without a render surface.
    ///
    /// # Errors
    /// Fails if the surface cannot render.
    fn capture_frame(&mut self) -> Result<Option<Frame>, EnvError>;
}
