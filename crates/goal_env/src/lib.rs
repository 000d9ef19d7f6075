#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Goal-Conditioned Manipulation Environments
//!
//! This crate turns a [`Simulator`](sim::Simulator) into a goal-conditioned
//! reinforcement-learning environment.
//!
//! ## Key Components
//!
//! -   **[`TaskConfig`]:** typed task settings with `reach`, `push` and
//!     `pick_and_place` presets, loadable from JSON.
//! -   **[`ManipulationTask`]:** translates 4-d actions into gripper commands,
//!     builds observations, samples goals and scores them.
//! -   **[`GoalEnv`]:** the episode driver calling a [`GoalTask`]'s hooks in a
//!     fixed order with a seedable random generator.
//! -   **[`reward`]:** goal distance, sparse/dense reward and success.

pub mod config;
pub mod driver;
pub mod error;
pub mod manipulation;
pub mod observation;
pub mod reward;
pub mod task;

pub use config::{JointInit, RewardType, TaskConfig};
pub use driver::{GoalEnv, StepInfo, StepResult, ACTION_SIZE};
pub use error::EnvError;
pub use manipulation::{compose_command, ManipulationTask};
pub use observation::{Observation, ObservationSpace};
pub use task::GoalTask;
