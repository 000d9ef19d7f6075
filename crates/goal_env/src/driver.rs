//! # Episode Driver
//!
//! [`GoalEnv`] owns a [`GoalTask`] and the random generator and runs the
//! reset/step protocol of a goal-conditioned environment by calling the
//! task's hooks in a fixed order.

use crate::error::EnvError;
use crate::observation::{Observation, ObservationSpace};
use crate::task::GoalTask;
use render::Frame;
use sim::Vec3;

pub const ACTION_SIZE: usize = 4;

/// Per-step diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StepInfo {
    pub is_success: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StepResult {
    pub observation: Observation,
    pub reward: f32,
    /// Goal tasks never terminate on their own.
    pub terminated: bool,
    /// The episode reached its step limit.
    pub truncated: bool,
    pub info: StepInfo,
}

pub struct GoalEnv<T: GoalTask> {
    task: T,
    rng: fastrand::Rng,
    elapsed_steps: usize,
}

impl<T: GoalTask> GoalEnv<T> {
    /// Initialize the task's scene and draw a first goal.
    ///
    /// # Errors
    /// Propagates failures of scene initialization.
    pub fn new(mut task: T, seed: u64) -> Result<Self, EnvError> {
        let mut rng = fastrand::Rng::with_seed(seed);
        let initial_qpos = task.config().initial_qpos.clone();
        task.initialize_scene(&initial_qpos)?;
        let goal = task.sample_goal(&mut rng);
        task.set_goal(goal);
        tracing::info!(
            seed,
            has_object = task.config().has_object,
            block_gripper = task.config().block_gripper,
            "goal environment ready"
        );
        Ok(Self {
            task,
            rng,
            elapsed_steps: 0,
        })
    }

    /// Reseed the random generator used for resets and goals.
    pub fn seed(&mut self, seed: u64) {
        self.rng.seed(seed);
    }

    /// Start a new episode.
    ///
    /// # Errors
    /// Propagates failures of the task's reset hooks.
    pub fn reset(&mut self) -> Result<Observation, EnvError> {
        let mut attempts = 0usize;
        while !self.task.reset_scene(&mut self.rng)? {
            attempts += 1;
            tracing::warn!(attempts, "scene reset rejected, retrying");
        }
        let goal = self.task.sample_goal(&mut self.rng);
        self.task.set_goal(goal);
        self.elapsed_steps = 0;
        tracing::debug!(goal = ?goal, "episode reset");
        self.task.build_observation()
    }

    /// Advance one step with `action`, clipped to `[-1, 1]`.
    ///
    /// # Errors
    /// Returns [`EnvError::ActionShape`] unless `action` has 4 elements, and
    /// propagates failures of the task's step hooks.
    pub fn step(&mut self, action: &[f32]) -> Result<StepResult, EnvError> {
        let action: [f32; ACTION_SIZE] = action.try_into().map_err(|_| EnvError::ActionShape {
            expected: ACTION_SIZE,
            got: action.len(),
        })?;
        let action = action.map(|a| a.clamp(-1.0, 1.0));

        self.task.apply_action(action)?;
        self.task.step_simulation();
        self.task.apply_step_side_effects()?;
        let observation = self.task.build_observation()?;

        let info = StepInfo {
            is_success: self
                .task
                .check_success(observation.achieved_goal, observation.desired_goal),
        };
        let reward = self
            .task
            .compute_reward(observation.achieved_goal, observation.desired_goal, &info);
        self.elapsed_steps += 1;
        let truncated = self.elapsed_steps >= self.task.config().max_episode_steps;
        tracing::trace!(step = self.elapsed_steps, reward, success = info.is_success, "step");

        Ok(StepResult {
            observation,
            reward,
            terminated: false,
            truncated,
            info,
        })
    }

    /// Show the goal marker and capture the fixed camera.
    ///
    /// # Errors
    /// Propagates failures of the task's render hooks.
    pub fn render(&mut self) -> Result<Option<Frame>, EnvError> {
        self.task.render_goal_marker()?;
        self.task.capture_frame()
    }

    /// # Errors
    /// Fails if the current observation cannot be built.
    pub fn observation_space(&self) -> Result<ObservationSpace, EnvError> {
        Ok(ObservationSpace::of(&self.task.build_observation()?))
    }

    #[must_use]
    pub const fn action_size(&self) -> usize {
        ACTION_SIZE
    }

    #[must_use]
    pub fn goal(&self) -> Vec3 {
        self.task.goal()
    }

    #[must_use]
    pub fn elapsed_steps(&self) -> usize {
        self.elapsed_steps
    }

    #[must_use]
    pub fn task(&self) -> &T {
        &self.task
    }

    pub fn task_mut(&mut self) -> &mut T {
        &mut self.task
    }

    pub fn into_task(self) -> T {
        self.task
    }
}
